//! Editor selection and debounced text validation.

use std::time::{Duration, Instant};

use regex_lite::Regex;

use crate::errors::ValidatorError;
use crate::log::{trace, warn};
use crate::types::Color;

use super::{EditorKind, SheetItem};

/// Quiet period after the last keystroke before text is validated.
pub const VALIDATION_DELAY: Duration = Duration::from_millis(250);

/// Editors a host toolkit can build for a sheet item.
///
/// The sheet only picks one of these; it never defines editors itself.
pub trait EditorRegistry {
    type Editor;

    fn numeric(&mut self, item: &SheetItem) -> Self::Editor;

    fn check(&mut self, item: &SheetItem) -> Self::Editor;

    fn color(&mut self, item: &SheetItem) -> Self::Editor;

    fn choice(&mut self, item: &SheetItem, options: &[String]) -> Self::Editor;

    fn text(&mut self, item: &SheetItem) -> Self::Editor;
}

/// An editor, plus the validator for text editors of items with a pattern.
#[derive(Debug)]
pub struct SelectedEditor<E> {
    pub editor: E,
    pub validator: Option<TextValidator>,
}

/// Ask `registry` for the editor matching the item's kind.
pub fn select_editor<R: EditorRegistry>(item: &SheetItem, registry: &mut R) -> SelectedEditor<R::Editor> {
    let editor = match item.kind() {
        EditorKind::Numeric => registry.numeric(item),
        EditorKind::Check => registry.check(item),
        EditorKind::Color => registry.color(item),
        EditorKind::Choice(options) => registry.choice(item, options),
        EditorKind::Text => {
            let validator = item.regex().and_then(|pattern| match TextValidator::new(pattern) {
                Ok(validator) => Some(validator),
                Err(error) => {
                    warn!(item = item.name(), %error, "validator not installed");
                    None
                }
            });
            return SelectedEditor {
                editor: registry.text(item),
                validator,
            };
        }
    };
    SelectedEditor {
        editor,
        validator: None,
    }
}

/// Outcome of validating a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationState {
    /// Empty text.
    #[default]
    Neutral,
    Valid,
    Invalid,
}

impl ValidationState {
    /// Text color a field in this state is drawn with.
    pub fn text_fill(self) -> Color {
        match self {
            ValidationState::Neutral => Color::BLACK,
            ValidationState::Valid => Color::GREEN,
            ValidationState::Invalid => Color::RED,
        }
    }
}

/// Validates text against a pattern once typing has paused.
///
/// The pattern must match the whole text. Validation only restyles the
/// field; the text itself is never rejected.
#[derive(Debug, Clone)]
pub struct TextValidator {
    pattern: String,
    regex: Regex,
    delay: Duration,
    pending: Option<(String, Instant)>,
    state: ValidationState,
}

impl TextValidator {
    pub fn new(pattern: &str) -> Result<Self, ValidatorError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ValidatorError {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
            delay: VALIDATION_DELAY,
            pending: None,
            state: ValidationState::Neutral,
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The last published state.
    pub fn state(&self) -> ValidationState {
        self.state
    }

    /// Classify `text` immediately.
    pub fn evaluate(&self, text: &str) -> ValidationState {
        if text.is_empty() {
            ValidationState::Neutral
        } else if self.regex.is_match(text) {
            ValidationState::Valid
        } else {
            ValidationState::Invalid
        }
    }

    /// Record a text change; restarts the quiet period.
    pub fn text_changed(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now));
    }

    /// Publish a new state once the quiet period has passed since the last
    /// change. Returns `None` while typing is still in progress or when no
    /// change is pending.
    pub fn poll(&mut self, now: Instant) -> Option<ValidationState> {
        let (_, changed_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*changed_at) < self.delay {
            return None;
        }
        let (text, _) = self.pending.take()?;
        self.state = self.evaluate(&text);
        trace!(pattern = %self.pattern, state = ?self.state, "text validated");
        Some(self.state)
    }
}
