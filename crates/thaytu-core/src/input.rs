use std::fmt;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// What the send control shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendAffordance {
    Ready,
    Busy,
}

impl fmt::Display for SendAffordance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendAffordance::Ready => f.write_str("Gửi"),
            SendAffordance::Busy => f.write_str("Đợi Thầy"),
        }
    }
}

/// The text input and send control.
///
/// While pending both are disabled: edits are dropped and the send control
/// shows its busy affordance.
#[derive(Debug, Clone)]
pub struct InputController {
    text: String,
    cursor: usize, // in chars
    pending: bool,
    focused: bool,
}

impl Default for InputController {
    fn default() -> Self {
        Self::new()
    }
}

impl InputController {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            pending: false,
            focused: true,
        }
    }

    /// Enable or disable input. Safe to call repeatedly with the same value.
    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn is_enabled(&self) -> bool {
        !self.pending
    }

    pub fn affordance(&self) -> SendAffordance {
        if self.pending {
            SendAffordance::Busy
        } else {
            SendAffordance::Ready
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Replace the whole text, cursor at the end. Ignored while pending.
    pub fn set_text(&mut self, text: &str) {
        if self.pending {
            return;
        }
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    /// Take the trimmed text if there is any, leaving the field empty
    pub fn take_submission(&mut self) -> Option<String> {
        if self.pending {
            return None;
        }
        let message = self.text.trim();
        if message.is_empty() {
            return None;
        }
        let message = message.to_string();
        self.clear();
        Some(message)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        if self.pending || c.is_control() {
            return;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.pending || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_pos);
    }

    pub fn delete(&mut self) {
        if self.pending {
            return;
        }
        let char_count = self.text.chars().count();
        if self.cursor < char_count {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let char_count = self.text.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}
