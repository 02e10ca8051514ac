use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// What a field accepts. Answers allow digits and a leading minus sign so
/// that a wrong negative guess can still be recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Text { max_len: usize },
    Answer,
}

/// A sign and the ten digits of the largest possible answer.
const ANSWER_MAX_LEN: usize = 11;

pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
    kind: InputKind,
}

impl LineInput {
    pub fn new(text: &str, kind: InputKind) -> Self {
        let mut input = Self {
            text: String::new(),
            cursor: 0,
            kind,
        };
        for ch in text.chars() {
            input.insert(ch);
        }
        input
    }

    pub fn answer() -> Self {
        Self::new("", InputKind::Answer)
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// The typed answer, or `None` if the text is not a whole number.
    pub fn parse_answer(&self) -> Option<i64> {
        self.text.trim().parse().ok()
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled rendering.
    /// When cursor is at end of text, cursor_char is None.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let byte_offset = self.char_to_byte(self.cursor);
        match self.text[byte_offset..].chars().next() {
            Some(ch) => {
                let next_byte = byte_offset + ch.len_utf8();
                (&self.text[..byte_offset], Some(ch), &self.text[next_byte..])
            }
            None => (&self.text, None, ""),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => {
                if self.cursor < self.text.chars().count() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.chars().count(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_at_cursor();
                }
            }
            KeyCode::Delete => self.remove_at_cursor(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert(ch);
            }
            _ => {}
        }
        InputResult::Continue
    }

    fn accepts(&self, ch: char) -> bool {
        let len = self.text.chars().count();
        match self.kind {
            InputKind::Text { max_len } => len < max_len && !ch.is_control(),
            InputKind::Answer => {
                len < ANSWER_MAX_LEN
                    && (ch.is_ascii_digit()
                        || (ch == '-' && self.cursor == 0 && !self.text.starts_with('-')))
            }
        }
    }

    fn insert(&mut self, ch: char) {
        if !self.accepts(ch) {
            return;
        }
        let byte_offset = self.char_to_byte(self.cursor);
        self.text.insert(byte_offset, ch);
        self.cursor += 1;
    }

    fn remove_at_cursor(&mut self) {
        let byte_offset = self.char_to_byte(self.cursor);
        if let Some(ch) = self.text[byte_offset..].chars().next() {
            self.text
                .replace_range(byte_offset..byte_offset + ch.len_utf8(), "");
        }
    }

    /// Convert char index to byte offset.
    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }
}
