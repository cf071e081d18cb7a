//! Per-frame labels in visiting order.

/// Turn a raw key code into its label character. Only the low byte counts.
pub fn label_for_key(code: u32) -> char {
    char::from((code & 0xFF) as u8)
}

/// Ordered list of one label per visited frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSequence {
    labels: Vec<char>,
}

impl LabelSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: char) {
        self.labels.push(label);
    }

    /// Drop the newest label. Returns `false` if there was nothing to drop.
    pub fn remove_last(&mut self) -> bool {
        self.labels.pop().is_some()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.labels.iter().copied()
    }

    /// `(frame number, label)` pairs with 1-based frame numbers.
    pub fn rows(&self) -> impl Iterator<Item = (usize, char)> + '_ {
        self.iter().enumerate().map(|(i, label)| (i + 1, label))
    }
}

impl FromIterator<char> for LabelSequence {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}
