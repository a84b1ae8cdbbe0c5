//! Single-line text input shared by the new-task box and the edit row.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::MAX_TASK_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Submit,
    Leave,
}

#[derive(Debug, Clone, Default)]
pub struct LineInput {
    value: String,
    invalid: bool,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the content, keeping at most `MAX_TASK_LEN` characters.
    pub fn set(&mut self, value: &str) {
        self.value = value.chars().take(MAX_TASK_LEN).collect();
        self.invalid = false;
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.invalid = false;
    }

    /// Flag the last submit as rejected; the next key clears the flag.
    pub fn mark_invalid(&mut self) {
        self.invalid = true;
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        self.invalid = false;

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('u') {
                self.value.clear();
            }
            return InputAction::None;
        }

        match key.code {
            KeyCode::Enter => return InputAction::Submit,
            KeyCode::Esc => return InputAction::Leave,
            KeyCode::Backspace => {
                self.value.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                if self.value.chars().count() < MAX_TASK_LEN {
                    self.value.push(ch);
                }
            }
            _ => {}
        }
        InputAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(input: &mut LineInput, text: &str) {
        for ch in text.chars() {
            input.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_and_backspace() {
        let mut input = LineInput::new();
        type_text(&mut input, "milkk");
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "milk");
        assert_eq!(input.handle_key(key(KeyCode::Enter)), InputAction::Submit);
        assert_eq!(input.handle_key(key(KeyCode::Esc)), InputAction::Leave);
    }

    #[test]
    fn input_is_capped() {
        let mut input = LineInput::new();
        type_text(&mut input, &"a".repeat(MAX_TASK_LEN + 5));
        assert_eq!(input.value().chars().count(), MAX_TASK_LEN);
    }

    #[test]
    fn ctrl_u_clears() {
        let mut input = LineInput::new();
        type_text(&mut input, "draft");
        input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn any_key_resets_invalid_flag() {
        let mut input = LineInput::new();
        input.mark_invalid();
        assert!(input.is_invalid());
        input.handle_key(key(KeyCode::Char('x')));
        assert!(!input.is_invalid());
    }
}
