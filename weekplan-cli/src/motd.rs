//! Message-of-the-day list: one message per line of a text file.

use std::path::Path;
use tracing::warn;

use weekplan_core::LinearCongruentialRng;

#[derive(Debug, Clone, Default)]
pub struct MessageOfTheDay {
    messages: Vec<String>,
}

impl MessageOfTheDay {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Missing or unreadable files give an empty list.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::new(raw.lines().map(str::to_string).collect()),
            Err(e) => {
                warn!(path = %path.display(), "no messages of the day: {e}");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Random message, empty when there are none.
    pub fn pick(&self, rng: &mut LinearCongruentialRng) -> &str {
        rng.choose(&self.messages).map(String::as_str).unwrap_or("")
    }
}
