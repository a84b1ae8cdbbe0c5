//! Per-task edit session.
//!
//! `Viewing -> Editing -> Viewing`. The session remembers the persisted
//! text so that a cancel, direct or from the save prompt, can put it back.

use crate::task::MAX_TASK_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    task_id: u64,
    original: String,
    draft: String,
}

impl EditSession {
    pub fn begin(task_id: u64, original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            task_id,
            draft: original.clone(),
            original,
        }
    }

    pub fn task_id(&self) -> u64 {
        self.task_id
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft, keeping at most `MAX_TASK_LEN` characters.
    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.chars().take(MAX_TASK_LEN).collect();
    }

    /// Put the persisted text back into the draft.
    pub fn restore(&mut self) {
        self.draft = self.original.clone();
    }
}
