use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;

use crate::state::FieldValue;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Range,
    Checkbox,
    Select,
}

/// A change reported by a native-style field: the field kind plus the raw
/// value/checked pair the UI toolkit observed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeSignal {
    pub kind: FieldKind,
    pub raw_value: String,
    pub checked: bool,
}

impl ChangeSignal {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Text,
            raw_value: value.into(),
            checked: false,
        }
    }

    pub fn number(value: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Number,
            raw_value: value.into(),
            checked: false,
        }
    }

    pub fn range(value: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Range,
            raw_value: value.into(),
            checked: false,
        }
    }

    pub fn checkbox(checked: bool) -> Self {
        Self {
            kind: FieldKind::Checkbox,
            raw_value: String::new(),
            checked,
        }
    }

    pub fn select(value: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Select,
            raw_value: value.into(),
            checked: false,
        }
    }
}

/// What reaches a change handler: either a native-style signal or a value a
/// custom component reports directly.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangePayload {
    Signal(ChangeSignal),
    Value(FieldValue),
}

impl ChangePayload {
    pub fn coerce(&self) -> FieldValue {
        match self {
            ChangePayload::Signal(signal) => match signal.kind {
                FieldKind::Checkbox => FieldValue::Bool(signal.checked),
                FieldKind::Number | FieldKind::Range => parse_number(&signal.raw_value),
                FieldKind::Text | FieldKind::Select => FieldValue::Text(signal.raw_value.clone()),
            },
            ChangePayload::Value(value) => value.clone(),
        }
    }
}

impl From<ChangeSignal> for ChangePayload {
    fn from(signal: ChangeSignal) -> Self {
        Self::Signal(signal)
    }
}

impl From<FieldValue> for ChangePayload {
    fn from(value: FieldValue) -> Self {
        Self::Value(value)
    }
}

// Unparseable numeric input becomes the empty sentinel. NaN would poison map
// equality, so it is never representable.
fn parse_number(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(FieldValue::Number)
        .unwrap_or(FieldValue::Empty)
}

/// Native constraint-validation flag set as reported by the UI toolkit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ValidityFlags {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    pub step_mismatch: bool,
    pub bad_input: bool,
    pub custom_error: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValiditySignal {
    pub validation_message: String,
    pub validity: ValidityFlags,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BlurSignal;

/// Submit signal carrying the one flag the controller sets for its driver:
/// whether the native default submission should be suppressed.
#[derive(Debug, Default)]
pub struct SubmitSignal {
    default_prevented: AtomicBool,
}

impl SubmitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::SeqCst);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkbox_coerces_to_checked_flag() {
        let payload = ChangePayload::from(ChangeSignal::checkbox(true));
        assert_eq!(payload.coerce(), FieldValue::Bool(true));
    }

    #[test]
    fn number_parse_failure_becomes_empty_not_nan() {
        for raw in ["abc", "", "12abc", "NaN"] {
            let payload = ChangePayload::from(ChangeSignal::number(raw));
            assert_eq!(payload.coerce(), FieldValue::Empty, "raw input {raw:?}");
        }
    }

    #[test]
    fn zero_and_empty_text_are_preserved_exactly() {
        let zero = ChangePayload::from(ChangeSignal::range("0"));
        assert_eq!(zero.coerce(), FieldValue::Number(Decimal::ZERO));

        let empty = ChangePayload::from(ChangeSignal::text(""));
        assert_eq!(empty.coerce(), FieldValue::Text(String::new()));
    }

    #[test]
    fn scientific_notation_parses_like_a_float() {
        let payload = ChangePayload::from(ChangeSignal::number("1e3"));
        assert_eq!(payload.coerce(), FieldValue::Number(Decimal::from(1000)));
    }

    #[test]
    fn bare_values_pass_through_unchanged() {
        let payload = ChangePayload::from(FieldValue::Text("custom".into()));
        assert_eq!(payload.coerce(), FieldValue::Text("custom".into()));
    }
}
