use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::signal::ValidityFlags;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldName(Arc<str>);

impl FieldName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldName {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for FieldName {
    fn from(value: String) -> Self {
        Self(Arc::from(value.as_str()))
    }
}

impl Display for FieldName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Bool(bool),
    Empty,
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldError {
    Message(String),
    Validity {
        message: String,
        flags: ValidityFlags,
    },
}

impl FieldError {
    pub fn message(&self) -> &str {
        match self {
            FieldError::Message(message) => message,
            FieldError::Validity { message, .. } => message,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl SubmitStatus {
    pub fn is_submitting(self) -> bool {
        self == SubmitStatus::Loading
    }
}

pub type ValueMap = BTreeMap<FieldName, FieldValue>;
pub type ErrorMap = BTreeMap<FieldName, FieldError>;
pub type TouchedMap = BTreeMap<FieldName, bool>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormSnapshot {
    pub values: ValueMap,
    pub errors: ErrorMap,
    pub touched: TouchedMap,
    pub status: SubmitStatus,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StateChangeKind {
    Change,
    Blur,
    Invalid,
    Submit,
    Reset,
    Manual,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StateChange {
    pub kind: StateChangeKind,
    pub state: FormSnapshot,
}

#[derive(Default)]
pub(crate) struct FormState {
    pub(crate) values: ValueMap,
    pub(crate) errors: ErrorMap,
    pub(crate) touched: TouchedMap,
    pub(crate) status: SubmitStatus,
}

impl FormState {
    pub(crate) fn with_values(values: ValueMap) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub(crate) fn set_value(&mut self, name: FieldName, value: FieldValue) {
        self.values.insert(name, value);
    }

    pub(crate) fn set_error(&mut self, name: FieldName, error: Option<FieldError>) {
        match error {
            Some(error) => {
                self.errors.insert(name, error);
            }
            // An explicitly cleared error must be indistinguishable from one
            // that was never recorded.
            None => {
                self.errors.remove(&name);
            }
        }
    }

    pub(crate) fn set_touched(&mut self, name: FieldName, touched: bool) {
        self.touched.insert(name, touched);
    }

    pub(crate) fn set_status(&mut self, status: SubmitStatus) {
        self.status = status;
    }

    pub(crate) fn reset(&mut self, clear_values: bool) {
        self.errors.clear();
        self.touched.clear();
        self.status = SubmitStatus::Idle;
        if clear_values {
            self.values.clear();
        }
    }

    pub(crate) fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            values: self.values.clone(),
            errors: self.errors.clone(),
            touched: self.touched.clone(),
            status: self.status,
        }
    }
}
