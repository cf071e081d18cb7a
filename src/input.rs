//! Keyboard input from the controlling terminal.

use crate::log_debug;
use crate::session::{KeyInput, KeySource};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Blocks on crossterm events until a key with a byte representation arrives.
#[derive(Debug, Default)]
pub struct CrosstermKeys;

impl CrosstermKeys {
    pub fn new() -> Self {
        Self
    }
}

impl KeySource for CrosstermKeys {
    fn wait_key(&mut self) -> Result<KeyInput> {
        loop {
            let event = event::read().context("failed to read terminal input")?;
            if let Some(input) = key_input_for(&event) {
                return Ok(input);
            }
        }
    }
}

/// Translate a terminal event into session input; `None` means keep waiting.
pub fn key_input_for(event: &Event) -> Option<KeyInput> {
    match event {
        Event::Key(key) => key_code_for(key),
        Event::Resize(_, _) => Some(KeyInput::Resize),
        _ => None,
    }
}

fn key_code_for(key: &KeyEvent) -> Option<KeyInput> {
    if matches!(key.kind, KeyEventKind::Release | KeyEventKind::Repeat) {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let code = match key.code {
        KeyCode::Char('c') | KeyCode::Char('C') if ctrl => return Some(KeyInput::Interrupt),
        KeyCode::Char(c) if ctrl && c.is_ascii_alphabetic() => {
            u32::from(c.to_ascii_uppercase() as u8 & 0x1F)
        }
        KeyCode::Char(c) => u32::from(c),
        KeyCode::Enter => 13,
        KeyCode::Tab => 9,
        KeyCode::Backspace => 8,
        KeyCode::Esc => 27,
        KeyCode::Delete => 127,
        other => {
            log_debug(&format!("ignoring key without a byte value: {other:?}"));
            return None;
        }
    };
    Some(KeyInput::Code(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn plain_characters_map_to_code_points() {
        let event = press(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(key_input_for(&event), Some(KeyInput::Code(u32::from('x'))));
        let event = press(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(key_input_for(&event), Some(KeyInput::Code(u32::from('Q'))));
    }

    #[test]
    fn ctrl_c_interrupts() {
        let event = press(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_input_for(&event), Some(KeyInput::Interrupt));
    }

    #[test]
    fn ctrl_letters_become_control_codes() {
        let event = press(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(key_input_for(&event), Some(KeyInput::Code(1)));
        let event = press(KeyCode::Char('Z'), KeyModifiers::CONTROL);
        assert_eq!(key_input_for(&event), Some(KeyInput::Code(26)));
    }

    #[test]
    fn named_keys_use_ascii_codes() {
        let cases = [
            (KeyCode::Enter, 13),
            (KeyCode::Tab, 9),
            (KeyCode::Backspace, 8),
            (KeyCode::Esc, 27),
            (KeyCode::Delete, 127),
        ];
        for (code, expected) in cases {
            let event = press(code, KeyModifiers::NONE);
            assert_eq!(key_input_for(&event), Some(KeyInput::Code(expected)));
        }
    }

    #[test]
    fn keys_without_byte_value_are_skipped() {
        assert_eq!(key_input_for(&press(KeyCode::Up, KeyModifiers::NONE)), None);
        assert_eq!(key_input_for(&press(KeyCode::F(5), KeyModifiers::NONE)), None);
    }

    fn key_of_kind(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn only_presses_label_frames() {
        assert_eq!(
            key_input_for(&key_of_kind(KeyEventKind::Press)),
            Some(KeyInput::Code(u32::from('x')))
        );
        assert_eq!(key_input_for(&key_of_kind(KeyEventKind::Release)), None);
        assert_eq!(key_input_for(&key_of_kind(KeyEventKind::Repeat)), None);
    }

    #[test]
    fn resize_requests_redraw() {
        assert_eq!(key_input_for(&Event::Resize(80, 24)), Some(KeyInput::Resize));
        assert_eq!(key_input_for(&Event::FocusGained), None);
    }
}
