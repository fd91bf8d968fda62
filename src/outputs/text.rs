use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Messages kept in a `TextBlock` history. Older ones are dropped first.
pub const MAX_HISTORY: usize = 1_000;

/// Settable text surface that receives one message per applied completion.
pub trait ResultSink: Send {
    fn set_text(&mut self, message: &str);
}

#[derive(Debug, Default)]
struct TextBlockInner {
    current: Option<String>,
    history: VecDeque<String>,
}

/// Shared on-screen text block. Clones observe the same content.
#[derive(Debug, Clone, Default)]
pub struct TextBlock {
    inner: Arc<Mutex<TextBlockInner>>,
}

impl TextBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> Option<String> {
        self.lock().current.clone()
    }

    /// The last `MAX_HISTORY` messages, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.lock().history.iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TextBlockInner> {
        // A poisoned block still holds valid strings
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ResultSink for TextBlock {
    fn set_text(&mut self, message: &str) {
        let mut inner = self.lock();
        inner.current = Some(message.to_string());
        if inner.history.len() >= MAX_HISTORY {
            inner.history.pop_front();
        }
        inner.history.push_back(message.to_string());
    }
}

/// Prints each message to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ResultSink for ConsoleSink {
    fn set_text(&mut self, message: &str) {
        println!("[NARRATOR] {}", message);
    }
}
