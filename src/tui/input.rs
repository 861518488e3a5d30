use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input mode for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - navigating the board
    #[default]
    Normal,
    /// Editing the draft's title in the new-task modal
    InputTitle,
    /// Editing the draft's description in the new-task modal
    InputDescription,
}

/// Result of feeding a key to a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The key edited the text or moved the cursor
    Handled,
    /// The key is not a line-editing key
    Ignored,
}

/// Byte offset of the `chars`-th character
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

/// Cursor position (in chars) of the start of the word left of `pos`
pub fn word_boundary_left(s: &str, pos: usize) -> usize {
    let chars: Vec<char> = s.chars().collect();
    let mut i = pos.min(chars.len());
    while i > 0 && chars[i - 1].is_whitespace() {
        i -= 1;
    }
    while i > 0 && !chars[i - 1].is_whitespace() {
        i -= 1;
    }
    i
}

/// Cursor position (in chars) just past the word right of `pos`
pub fn word_boundary_right(s: &str, pos: usize) -> usize {
    let chars: Vec<char> = s.chars().collect();
    let mut i = pos.min(chars.len());
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    while i < chars.len() && !chars[i].is_whitespace() {
        i += 1;
    }
    i
}

/// Split `s` at a char cursor, for rendering the cursor block between halves
pub fn split_at_cursor(s: &str, cursor: usize) -> (&str, &str) {
    s.split_at(byte_offset(s, cursor))
}

/// Insert `c` at a char cursor and step past it
pub fn insert_char(text: &mut String, cursor: &mut usize, c: char) {
    *cursor = (*cursor).min(text.chars().count());
    text.insert(byte_offset(text, *cursor), c);
    *cursor += 1;
}

/// Apply a line-editing key to `text`. `cursor` counts chars, not bytes.
pub fn edit_text(text: &mut String, cursor: &mut usize, key: KeyEvent) -> EditOutcome {
    let has_alt = key.modifiers.contains(KeyModifiers::ALT);
    let len = text.chars().count();
    *cursor = (*cursor).min(len);

    match key.code {
        KeyCode::Left if has_alt => *cursor = word_boundary_left(text, *cursor),
        KeyCode::Right if has_alt => *cursor = word_boundary_right(text, *cursor),
        // macOS: Option+Left/Right sends Alt+b / Alt+f
        KeyCode::Char('b') if has_alt => *cursor = word_boundary_left(text, *cursor),
        KeyCode::Char('f') if has_alt => *cursor = word_boundary_right(text, *cursor),
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(len),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = len,
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                text.remove(byte_offset(text, *cursor));
            }
        }
        KeyCode::Delete => {
            if *cursor < len {
                text.remove(byte_offset(text, *cursor));
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => insert_char(text, cursor, c),
        _ => return EditOutcome::Ignored,
    }
    EditOutcome::Handled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(text: &mut String, cursor: &mut usize, s: &str) {
        for c in s.chars() {
            edit_text(text, cursor, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_insert_and_backspace_multibyte() {
        let mut text = String::new();
        let mut cursor = 0;
        type_str(&mut text, &mut cursor, "héllo");
        assert_eq!(text, "héllo");
        assert_eq!(cursor, 5);

        edit_text(&mut text, &mut cursor, key(KeyCode::Left));
        edit_text(&mut text, &mut cursor, key(KeyCode::Left));
        edit_text(&mut text, &mut cursor, key(KeyCode::Left));
        edit_text(&mut text, &mut cursor, key(KeyCode::Backspace));
        assert_eq!(text, "hllo");
        assert_eq!(cursor, 1);
    }

    #[test]
    fn test_insert_char_mid_text() {
        let mut text = "ab".to_string();
        let mut cursor = 1;
        insert_char(&mut text, &mut cursor, '\n');
        assert_eq!(text, "a\nb");
        assert_eq!(cursor, 2);
    }

    #[test]
    fn test_delete_at_end_is_noop() {
        let mut text = "abc".to_string();
        let mut cursor = 3;
        edit_text(&mut text, &mut cursor, key(KeyCode::Delete));
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_home_end() {
        let mut text = "abc".to_string();
        let mut cursor = 1;
        edit_text(&mut text, &mut cursor, key(KeyCode::End));
        assert_eq!(cursor, 3);
        edit_text(&mut text, &mut cursor, key(KeyCode::Home));
        assert_eq!(cursor, 0);
    }

    #[test]
    fn test_word_boundaries() {
        let s = "write the spec";
        assert_eq!(word_boundary_left(s, 14), 10);
        assert_eq!(word_boundary_left(s, 10), 6);
        assert_eq!(word_boundary_right(s, 0), 5);
        assert_eq!(word_boundary_right(s, 5), 9);
    }

    #[test]
    fn test_unhandled_key() {
        let mut text = String::new();
        let mut cursor = 0;
        assert_eq!(edit_text(&mut text, &mut cursor, key(KeyCode::Enter)), EditOutcome::Ignored);
        assert_eq!(edit_text(&mut text, &mut cursor, key(KeyCode::Tab)), EditOutcome::Ignored);
    }

    #[test]
    fn test_split_at_cursor() {
        assert_eq!(split_at_cursor("héllo", 2), ("hé", "llo"));
        assert_eq!(split_at_cursor("abc", 10), ("abc", ""));
    }
}
