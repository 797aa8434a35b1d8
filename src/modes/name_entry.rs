//! Player name entry, driven by the host loop before play starts.

use crate::score::DEFAULT_PLAYER;

pub const MAX_NAME_LEN: usize = 15;

/// Text-editing keys the name entry understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKey {
    Char(char),
    Backspace,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameOutcome {
    Editing,
    Done(String),
}

#[derive(Debug, Clone, Default)]
pub struct NameEntry {
    text: String,
}

impl NameEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn handle(&mut self, key: NameKey) -> NameOutcome {
        match key {
            NameKey::Char(c) if !c.is_control() && self.text.chars().count() < MAX_NAME_LEN => {
                self.text.push(c);
            }
            NameKey::Char(_) => {}
            NameKey::Backspace => {
                self.text.pop();
            }
            NameKey::Confirm => {
                let name = self.text.trim();
                let name = if name.is_empty() { DEFAULT_PLAYER } else { name };
                return NameOutcome::Done(name.to_string());
            }
            NameKey::Cancel => return NameOutcome::Done(DEFAULT_PLAYER.to_string()),
        }
        NameOutcome::Editing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(entry: &mut NameEntry, s: &str) {
        for c in s.chars() {
            assert_eq!(entry.handle(NameKey::Char(c)), NameOutcome::Editing);
        }
    }

    #[test]
    fn typed_name_is_confirmed() {
        let mut entry = NameEntry::new();
        type_str(&mut entry, "Ada");
        assert_eq!(entry.handle(NameKey::Confirm), NameOutcome::Done("Ada".into()));
    }

    #[test]
    fn backspace_removes_last_char() {
        let mut entry = NameEntry::new();
        type_str(&mut entry, "Bob");
        entry.handle(NameKey::Backspace);
        assert_eq!(entry.text(), "Bo");
        entry.handle(NameKey::Backspace);
        entry.handle(NameKey::Backspace);
        entry.handle(NameKey::Backspace);
        assert_eq!(entry.text(), "");
    }

    #[test]
    fn length_is_capped() {
        let mut entry = NameEntry::new();
        type_str(&mut entry, "abcdefghijklmnopqrstuvwxyz");
        assert_eq!(entry.text(), "abcdefghijklmno");
        assert_eq!(entry.text().chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn empty_or_cancelled_falls_back() {
        let mut entry = NameEntry::new();
        assert_eq!(entry.handle(NameKey::Confirm), NameOutcome::Done("Player".into()));
        type_str(&mut entry, "   ");
        assert_eq!(entry.handle(NameKey::Confirm), NameOutcome::Done("Player".into()));

        let mut entry = NameEntry::new();
        type_str(&mut entry, "Zed");
        assert_eq!(entry.handle(NameKey::Cancel), NameOutcome::Done("Player".into()));
    }

    #[test]
    fn control_chars_are_ignored() {
        let mut entry = NameEntry::new();
        entry.handle(NameKey::Char('\u{7}'));
        type_str(&mut entry, "é");
        assert_eq!(entry.text(), "é");
    }
}
