//! Anki helper placeholder.
//!
//! Turning study notes into question/answer cards is not implemented. The
//! helper only confirms that notes were received so the page can show an
//! acknowledgement; it never parses the notes into cards.

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnkiReceipt {
    pub line_count: usize,
}

impl AnkiReceipt {
    pub fn message(&self) -> String {
        let noun = if self.line_count == 1 { "line" } else { "lines" };
        format!(
            "Received {} note {noun}. Card generation is not available yet.",
            self.line_count
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnkiHelper;

impl AnkiHelper {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when there is nothing to acknowledge.
    #[tracing::instrument(skip(self, notes), fields(notes_len = notes.len()))]
    pub fn acknowledge(&self, notes: &str) -> Option<AnkiReceipt> {
        let line_count = notes.lines().filter(|line| !line.trim().is_empty()).count();
        if line_count == 0 {
            return None;
        }
        info!(line_count, "anki notes received; card generation not implemented");
        Some(AnkiReceipt { line_count })
    }
}
