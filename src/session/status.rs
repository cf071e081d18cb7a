use std::fmt;

/// One-line progress summary redrawn in place after every key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    pub last_key: Option<u32>,
    pub frame_index: usize,
    pub labels: usize,
}

/// Printable form of a key code's low byte: `x`, `^M`, `^?` or `\x85`.
pub fn describe_key(code: u32) -> String {
    let byte = (code & 0xFF) as u8;
    match byte {
        0x20..=0x7E | 0xA0..=0xFF => char::from(byte).to_string(),
        0x00..=0x1F => format!("^{}", char::from(byte + 0x40)),
        0x7F => "^?".to_string(),
        _ => format!("\\x{byte:02x}"),
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_key {
            Some(code) => write!(f, "Pressed key {} ", describe_key(code))?,
            None => write!(f, "q quit | b back | any other key labels the frame | ")?,
        }
        write!(f, "frame={:04} labels={:04}", self.frame_index, self.labels)
    }
}
