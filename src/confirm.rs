//! Confirmation gate for destructive or overwrite-prone actions.
//!
//! The gate holds at most one pending action. Resolving it takes the
//! action out, so a second answer for the same prompt (an Enter key
//! racing a click) finds nothing and is ignored.

use crate::error::{Error, Result};
use crate::task::TaskFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Delete { id: u64 },
    Save { id: u64, text: String },
    Clear { scope: TaskFilter },
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::Delete { .. } => "Are you sure you want to delete this task?".to_string(),
            PendingAction::Save { .. } => {
                "Are you sure you want to save changes to this task?".to_string()
            }
            PendingAction::Clear { scope } => match scope {
                TaskFilter::All => "Are you sure you want to clear all tasks?".to_string(),
                TaskFilter::InProgress => {
                    "Are you sure you want to clear all in-progress tasks?".to_string()
                }
                TaskFilter::Completed => {
                    "Are you sure you want to clear all completed tasks?".to_string()
                }
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
}

impl From<bool> for Decision {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Decision::Confirm
        } else {
            Decision::Cancel
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub prompt: String,
    pub action: PendingAction,
}

#[derive(Debug, Default)]
pub struct ConfirmGate {
    pending: Option<PendingConfirmation>,
}

impl ConfirmGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `action` until it is answered; returns the prompt to show.
    pub fn open(&mut self, action: PendingAction) -> Result<&str> {
        if self.pending.is_some() {
            return Err(Error::ConfirmationPending);
        }
        let prompt = action.prompt();
        let pending = self.pending.insert(PendingConfirmation { prompt, action });
        Ok(pending.prompt.as_str())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.pending.as_ref().map(|pending| pending.prompt.as_str())
    }

    /// Take the pending action; `None` when already resolved.
    pub fn resolve(&mut self, decision: Decision) -> Option<(PendingAction, Decision)> {
        self.pending
            .take()
            .map(|pending| (pending.action, decision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_resolution_is_ignored() {
        let mut gate = ConfirmGate::new();
        gate.open(PendingAction::Delete { id: 3 }).unwrap();

        let first = gate.resolve(Decision::Confirm);
        assert_eq!(first, Some((PendingAction::Delete { id: 3 }, Decision::Confirm)));
        assert_eq!(gate.resolve(Decision::Cancel), None);
        assert!(!gate.is_pending());
    }

    #[test]
    fn only_one_prompt_at_a_time() {
        let mut gate = ConfirmGate::new();
        let prompt = gate.open(PendingAction::Clear { scope: TaskFilter::Completed }).unwrap();
        assert_eq!(prompt, "Are you sure you want to clear all completed tasks?");

        let err = gate.open(PendingAction::Delete { id: 1 }).unwrap_err();
        assert!(matches!(err, Error::ConfirmationPending));
        assert_eq!(
            gate.prompt(),
            Some("Are you sure you want to clear all completed tasks?")
        );
    }

    #[test]
    fn prompts_per_action() {
        assert_eq!(
            PendingAction::Save { id: 1, text: "x".into() }.prompt(),
            "Are you sure you want to save changes to this task?"
        );
        assert_eq!(
            PendingAction::Clear { scope: TaskFilter::InProgress }.prompt(),
            "Are you sure you want to clear all in-progress tasks?"
        );
        assert_eq!(
            PendingAction::Clear { scope: TaskFilter::All }.prompt(),
            "Are you sure you want to clear all tasks?"
        );
    }
}
