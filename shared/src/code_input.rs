//! Fixed-length segmented code entry (one-time passcodes).
//!
//! Every keystroke, paste or deletion is reconciled against a fixed array of
//! single-character cells. Completion is reported once per session: the
//! mutating call that first fills the last empty cell returns the code, and
//! later calls return `None` until [`SegmentedCodeInput::reset`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

pub const DEFAULT_CODE_LENGTH: usize = 6;
pub const MIN_CODE_LENGTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeInputError {
    #[error("code length {0} is below the minimum of {MIN_CODE_LENGTH}")]
    InvalidLength(usize),
    #[error("cell {index} is out of range (length {length})")]
    CellOutOfRange { index: usize, length: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeInputConfig {
    pub length: usize,
}

impl Default for CodeInputConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }
}

impl CodeInputConfig {
    pub fn validate(&self) -> Result<(), CodeInputError> {
        if self.length < MIN_CODE_LENGTH {
            return Err(CodeInputError::InvalidLength(self.length));
        }
        Ok(())
    }
}

/// Input delivered to one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CodeInputEvent {
    CharEntry { index: usize, ch: char },
    /// Multi-character text; always distributed from cell 0.
    Paste { index: usize, text: String },
    /// The cell's own content was deleted.
    Delete { index: usize },
    /// Backspace pressed while the cell was focused.
    Backspace { index: usize },
}

impl CodeInputEvent {
    /// Classifies raw text-change input by character count.
    #[must_use]
    pub fn from_raw(text: &str, index: usize) -> Self {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Self::Delete { index },
            (Some(ch), None) => Self::CharEntry { index, ch },
            (Some(_), Some(_)) => Self::Paste {
                index,
                text: text.to_owned(),
            },
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::CharEntry { index, .. }
            | Self::Paste { index, .. }
            | Self::Delete { index }
            | Self::Backspace { index } => *index,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SegmentedCodeInput {
    cells: Vec<Option<char>>,
    active_index: usize,
    completed: bool,
}

impl SegmentedCodeInput {
    pub fn new(config: CodeInputConfig) -> Result<Self, CodeInputError> {
        config.validate()?;
        Ok(Self {
            cells: vec![None; config.length],
            active_index: 0,
            completed: false,
        })
    }

    pub fn with_length(length: usize) -> Result<Self, CodeInputError> {
        Self::new(CodeInputConfig { length })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    #[must_use]
    pub fn cells(&self) -> &[Option<char>] {
        &self.cells
    }

    /// Cells as strings, empty for unfilled.
    #[must_use]
    pub fn cell_strings(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|cell| cell.map(String::from).unwrap_or_default())
            .collect()
    }

    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active_index
    }

    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Filled cells concatenated in index order.
    #[must_use]
    pub fn code(&self) -> String {
        self.cells.iter().flatten().collect()
    }

    /// Raw text-change entry point; see [`CodeInputEvent::from_raw`].
    pub fn handle_input(
        &mut self,
        raw: &str,
        index: usize,
    ) -> Result<Option<String>, CodeInputError> {
        self.apply(CodeInputEvent::from_raw(raw, index))
    }

    /// Returns `true` when the backspace moved focus to the previous cell.
    pub fn handle_backspace(&mut self, index: usize) -> Result<bool, CodeInputError> {
        self.check_index(index)?;
        if self.cells[index].is_some() || index == 0 {
            return Ok(false);
        }
        self.active_index = index - 1;
        self.cells[index - 1] = None;
        Ok(true)
    }

    /// Records that the shell moved focus to `index` (e.g. the user tapped a cell).
    pub fn focus(&mut self, index: usize) -> Result<(), CodeInputError> {
        self.check_index(index)?;
        self.active_index = index;
        Ok(())
    }

    #[instrument(skip_all, fields(index = event.index(), len = self.cells.len()))]
    pub fn apply(&mut self, event: CodeInputEvent) -> Result<Option<String>, CodeInputError> {
        self.check_index(event.index())?;
        match event {
            CodeInputEvent::CharEntry { index, ch } => Ok(self.set_cell(index, Some(ch))),
            CodeInputEvent::Delete { index } => Ok(self.set_cell(index, None)),
            CodeInputEvent::Paste { text, .. } => Ok(self.paste(&text)),
            CodeInputEvent::Backspace { index } => {
                self.handle_backspace(index)?;
                Ok(None)
            }
        }
    }

    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.active_index = 0;
        self.completed = false;
    }

    fn check_index(&self, index: usize) -> Result<(), CodeInputError> {
        if index >= self.cells.len() {
            return Err(CodeInputError::CellOutOfRange {
                index,
                length: self.cells.len(),
            });
        }
        Ok(())
    }

    fn set_cell(&mut self, index: usize, value: Option<char>) -> Option<String> {
        self.cells[index] = value;
        if value.is_some() && index + 1 < self.cells.len() {
            self.active_index = index + 1;
        }
        self.take_completion()
    }

    // Non-digits are dropped; digits are left-aligned from cell 0 no matter
    // which cell received the paste.
    fn paste(&mut self, text: &str) -> Option<String> {
        let length = self.cells.len();
        let digits: Vec<char> = text.chars().filter(char::is_ascii_digit).take(length).collect();

        for (i, cell) in self.cells.iter_mut().enumerate() {
            *cell = digits.get(i).copied();
        }
        self.active_index = digits.len().min(length - 1);
        debug!(extracted = digits.len(), "paste distributed");

        if digits.len() == length {
            self.take_completion()
        } else {
            None
        }
    }

    fn take_completion(&mut self) -> Option<String> {
        if !self.is_complete() {
            return None;
        }
        if self.completed {
            debug!("completion already delivered for this session");
            return None;
        }
        self.completed = true;
        debug!("code complete");
        Some(self.code())
    }
}

// Redact cell contents: this holds a one-time passcode.
impl std::fmt::Debug for SegmentedCodeInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentedCodeInput")
            .field("len", &self.cells.len())
            .field("filled", &self.filled_count())
            .field("active_index", &self.active_index)
            .field("completed", &self.completed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn six() -> SegmentedCodeInput {
        SegmentedCodeInput::new(CodeInputConfig::default()).unwrap()
    }

    fn chars(s: &str) -> Vec<Option<char>> {
        s.chars().map(|c| if c == '_' { None } else { Some(c) }).collect()
    }

    #[test]
    fn test_starts_empty() {
        let input = six();
        assert_eq!(input.len(), 6);
        assert!(input.is_empty());
        assert_eq!(input.cell_strings(), vec![""; 6]);
        assert_eq!(input.active_index(), 0);
    }

    #[test]
    fn test_rejects_short_length() {
        assert_eq!(
            SegmentedCodeInput::with_length(1).unwrap_err(),
            CodeInputError::InvalidLength(1)
        );
        assert!(SegmentedCodeInput::with_length(2).is_ok());
    }

    #[test]
    fn test_from_raw_classification() {
        assert_eq!(
            CodeInputEvent::from_raw("", 2),
            CodeInputEvent::Delete { index: 2 }
        );
        assert_eq!(
            CodeInputEvent::from_raw("7", 2),
            CodeInputEvent::CharEntry { index: 2, ch: '7' }
        );
        assert_eq!(
            CodeInputEvent::from_raw("78", 2),
            CodeInputEvent::Paste {
                index: 2,
                text: "78".into()
            }
        );
        // One multi-byte character is still a single entry.
        assert_eq!(
            CodeInputEvent::from_raw("ა", 0),
            CodeInputEvent::CharEntry { index: 0, ch: 'ა' }
        );
    }

    #[test]
    fn test_paste_full_code_from_any_cell() {
        for target in 0..6 {
            let mut input = six();
            let completed = input.handle_input("123456", target).unwrap();
            assert_eq!(completed.as_deref(), Some("123456"));
            assert_eq!(input.cell_strings(), vec!["1", "2", "3", "4", "5", "6"]);
            assert_eq!(input.active_index(), 5);
        }
    }

    #[test]
    fn test_paste_discards_non_digits() {
        let mut input = six();
        let completed = input.handle_input("12a3", 4).unwrap();
        assert_eq!(completed, None);
        assert_eq!(input.cell_strings(), vec!["1", "2", "3", "", "", ""]);
        assert_eq!(input.active_index(), 3);
    }

    #[test]
    fn test_paste_truncates_excess() {
        let mut input = six();
        let completed = input.handle_input("12-34-56-78", 0).unwrap();
        assert_eq!(completed.as_deref(), Some("123456"));
    }

    #[test]
    fn test_paste_replaces_existing_cells() {
        let mut input = six();
        input.handle_input("9", 0).unwrap();
        input.handle_input("9", 1).unwrap();
        input.handle_input("9", 2).unwrap();
        input.handle_input("x1", 2).unwrap();
        assert_eq!(input.cells(), chars("1_____").as_slice());
        assert_eq!(input.active_index(), 1);
    }

    #[test]
    fn test_paste_without_digits_clears() {
        let mut input = six();
        input.handle_input("5", 0).unwrap();
        input.handle_input("ab", 1).unwrap();
        assert!(input.is_empty());
        assert_eq!(input.active_index(), 0);
    }

    #[test]
    fn test_typing_completes_after_last_digit_only() {
        let mut input = six();
        for (i, digit) in ["1", "2", "3", "4", "5"].iter().enumerate() {
            assert_eq!(input.handle_input(digit, i).unwrap(), None);
            assert_eq!(input.active_index(), i + 1);
        }
        assert_eq!(input.handle_input("6", 5).unwrap().as_deref(), Some("123456"));
        assert_eq!(input.active_index(), 5);
    }

    #[test]
    fn test_completion_fires_once_per_session() {
        let mut input = six();
        assert!(input.handle_input("123456", 0).unwrap().is_some());
        assert_eq!(input.handle_input("7", 5).unwrap(), None);
        assert_eq!(input.handle_input("654321", 0).unwrap(), None);
        assert_eq!(input.code(), "654321");

        input.reset();
        assert!(input.is_empty());
        assert_eq!(
            input.handle_input("111111", 0).unwrap().as_deref(),
            Some("111111")
        );
    }

    #[test]
    fn test_out_of_order_typing_completes_when_full() {
        let mut input = six();
        for i in (0..6).rev() {
            let result = input.handle_input("4", i).unwrap();
            assert_eq!(result.is_some(), i == 0);
        }
    }

    #[test]
    fn test_delete_clears_without_moving_focus() {
        let mut input = six();
        input.handle_input("123", 0).unwrap();
        input.focus(1).unwrap();
        input.handle_input("", 1).unwrap();
        assert_eq!(input.cells(), chars("1_3___").as_slice());
        assert_eq!(input.active_index(), 1);
    }

    #[test]
    fn test_backspace_on_empty_cell_clears_previous() {
        let mut input = six();
        input.handle_input("123", 0).unwrap();
        assert_eq!(input.active_index(), 3);

        assert!(input.handle_backspace(3).unwrap());
        assert_eq!(input.active_index(), 2);
        assert_eq!(input.cells(), chars("12____").as_slice());
    }

    #[test]
    fn test_backspace_on_filled_cell_is_noop() {
        let mut input = six();
        input.handle_input("123", 0).unwrap();
        input.focus(1).unwrap();
        assert!(!input.handle_backspace(1).unwrap());
        assert_eq!(input.cells(), chars("123___").as_slice());
        assert_eq!(input.active_index(), 1);
    }

    #[test]
    fn test_backspace_at_first_cell_is_noop() {
        let mut input = six();
        assert!(!input.handle_backspace(0).unwrap());
        assert_eq!(input.active_index(), 0);
    }

    #[test]
    fn test_backspace_event_variant() {
        let mut input = six();
        input.handle_input("1", 0).unwrap();
        assert_eq!(input.apply(CodeInputEvent::Backspace { index: 1 }).unwrap(), None);
        assert!(input.is_empty());
    }

    #[test]
    fn test_out_of_range_cell() {
        let mut input = six();
        let expected = CodeInputError::CellOutOfRange {
            index: 6,
            length: 6,
        };
        assert_eq!(input.handle_input("1", 6), Err(expected.clone()));
        assert_eq!(input.handle_input("123456", 6), Err(expected.clone()));
        assert_eq!(input.handle_backspace(6), Err(expected.clone()));
        assert_eq!(input.focus(6), Err(expected));
        assert!(input.is_empty());
    }

    #[test]
    fn test_debug_redacts_code() {
        let mut input = six();
        input.handle_input("987654", 0).unwrap();
        let debug = format!("{input:?}");
        assert!(!debug.contains("987654"));
        assert!(debug.contains("filled: 6"));
    }

    fn event_strategy() -> impl Strategy<Value = CodeInputEvent> {
        prop_oneof![
            (0usize..6, proptest::char::range('0', '9'))
                .prop_map(|(index, ch)| CodeInputEvent::CharEntry { index, ch }),
            (0usize..6, "[0-9a-z ]{2,10}")
                .prop_map(|(index, text)| CodeInputEvent::Paste { index, text }),
            (0usize..6).prop_map(|index| CodeInputEvent::Delete { index }),
            (0usize..6).prop_map(|index| CodeInputEvent::Backspace { index }),
        ]
    }

    proptest! {
        #[test]
        fn length_is_constant_and_completion_fires_at_most_once(
            events in proptest::collection::vec(event_strategy(), 0..40)
        ) {
            let mut input = six();
            let mut completions = 0;

            for event in events {
                if input.apply(event).unwrap().is_some() {
                    completions += 1;
                    prop_assert!(input.is_complete());
                }
                prop_assert_eq!(input.len(), 6);
                prop_assert!(input.active_index() < 6);
            }

            prop_assert!(completions <= 1);
        }

        #[test]
        fn paste_keeps_only_leading_digits(text in ".{2,20}") {
            let mut input = six();
            input.handle_input(&text, 0).unwrap();
            let expected: String = text.chars().filter(char::is_ascii_digit).take(6).collect();
            prop_assert_eq!(input.code(), expected);
        }
    }
}
