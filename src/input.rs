/// Editable text with a cursor measured in characters, not bytes.
#[derive(Debug, Default, Clone)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// Cursor as (row, column) for multi-line input
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before: String = self.value.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        (row, col)
    }

    pub fn line_count(&self) -> usize {
        self.value.split('\n').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TextInput {
        let mut input = TextInput::default();
        text.chars().for_each(|c| input.insert(c));
        input
    }

    #[test]
    fn test_insert_and_backspace_multibyte() {
        let mut input = typed("héllo");
        input.move_left();
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.value(), "hllo");
        assert_eq!(input.cursor_row_col(), (0, 1));
    }

    #[test]
    fn test_delete_at_end_is_noop() {
        let mut input = typed("abc");
        input.delete();
        assert_eq!(input.value(), "abc");
        input.move_home();
        input.delete();
        assert_eq!(input.value(), "bc");
    }

    #[test]
    fn test_cursor_bounds() {
        let mut input = typed("ab");
        input.move_right();
        assert_eq!(input.cursor_row_col(), (0, 2));
        input.move_home();
        input.move_left();
        assert_eq!(input.cursor_row_col(), (0, 0));
        input.move_end();
        assert_eq!(input.cursor_row_col(), (0, 2));
    }

    #[test]
    fn test_row_col_multiline() {
        let input = typed("first\nsecond");
        assert_eq!(input.cursor_row_col(), (1, 6));
        assert_eq!(input.line_count(), 2);
    }

    #[test]
    fn test_clear() {
        let mut input = typed("text");
        input.clear();
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor_row_col(), (0, 0));
        assert!(input.is_blank());
    }
}
