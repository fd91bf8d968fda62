/// Byte-exact comparison against the last observed canonical text.
///
/// Starts empty, so the first observation always reports a change.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    previous: String,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_changed(&self, text: &str) -> bool {
        text != self.previous
    }

    pub fn update(&mut self, text: String) {
        self.previous = text;
    }

    /// Compare, then replace the stored text whether or not it changed.
    pub fn observe(&mut self, text: String) -> bool {
        let changed = self.is_changed(&text);
        self.update(text);
        changed
    }

    pub fn previous(&self) -> &str {
        &self.previous
    }
}
