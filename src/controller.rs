use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::defer::DeferredQueue;
use crate::signal::{ChangePayload, SubmitSignal, ValidityFlags, ValiditySignal};
use crate::state::{
    ErrorMap, FieldError, FieldName, FieldValue, FormSnapshot, FormState, StateChange,
    StateChangeKind, SubmitStatus, TouchedMap, ValueMap,
};

pub type ChangeCallback = Arc<dyn Fn(&ValueMap) + Send + Sync>;
pub type StateChangeCallback = Arc<dyn Fn(&StateChange) + Send + Sync>;
pub type SubmitCallback = Arc<dyn Fn(&FormController, &SubmitSignal) + Send + Sync>;
pub type ErrorFormatter = Arc<dyn Fn(&ValidityFlags, &str) -> String + Send + Sync>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    MissingRequiredParameter {
        operation: &'static str,
        parameter: &'static str,
    },
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::MissingRequiredParameter {
                operation,
                parameter,
            } => {
                write!(f, "the parameter \"{parameter}\" is required in \"{operation}\"")
            }
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

#[derive(Clone, Default)]
pub struct FormOptions {
    /// Externally owned value map. Supplying it fixes the controller in
    /// controlled mode for its whole lifetime.
    pub values: Option<ValueMap>,
    pub default_values: Option<ValueMap>,
    pub on_change: Option<ChangeCallback>,
    pub on_state_change: Option<StateChangeCallback>,
    pub on_submit: Option<SubmitCallback>,
    pub get_error: Option<ErrorFormatter>,
}

#[derive(Clone)]
pub struct FormController {
    values_externally_owned: bool,
    pub(crate) state: Arc<RwLock<FormState>>,
    deferred: DeferredQueue,
    pub(crate) on_change: Option<ChangeCallback>,
    on_state_change: Option<StateChangeCallback>,
    on_submit: Option<SubmitCallback>,
    pub(crate) get_error: Option<ErrorFormatter>,
}

impl FormController {
    pub fn new(options: FormOptions) -> Self {
        // Ownership mode is resolved exactly once. A caller that starts
        // without external values and supplies them later will see them
        // ignored; mode never flips mid-lifetime.
        let values_externally_owned = options.values.is_some();
        let initial = options
            .values
            .or(options.default_values)
            .unwrap_or_default();
        Self {
            values_externally_owned,
            state: Arc::new(RwLock::new(FormState::with_values(initial))),
            deferred: DeferredQueue::new(),
            on_change: options.on_change,
            on_state_change: options.on_state_change,
            on_submit: options.on_submit,
            get_error: options.get_error,
        }
    }

    pub fn values_externally_owned(&self) -> bool {
        self.values_externally_owned
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        Ok(read_lock(&self.state, "creating form snapshot")?.snapshot())
    }

    pub fn values(&self) -> FormResult<ValueMap> {
        Ok(read_lock(&self.state, "reading values")?.values.clone())
    }

    pub fn errors(&self) -> FormResult<ErrorMap> {
        Ok(read_lock(&self.state, "reading errors")?.errors.clone())
    }

    pub fn touched(&self) -> FormResult<TouchedMap> {
        Ok(read_lock(&self.state, "reading touched flags")?
            .touched
            .clone())
    }

    pub fn status(&self) -> FormResult<SubmitStatus> {
        Ok(read_lock(&self.state, "reading submit status")?.status)
    }

    pub fn value(&self, name: impl Into<FieldName>) -> FormResult<Option<FieldValue>> {
        Ok(read_lock(&self.state, "reading field value")?
            .values
            .get(&name.into())
            .cloned())
    }

    pub fn error(&self, name: impl Into<FieldName>) -> FormResult<Option<FieldError>> {
        Ok(read_lock(&self.state, "reading field error")?
            .errors
            .get(&name.into())
            .cloned())
    }

    pub fn is_touched(&self, name: impl Into<FieldName>) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading field touched flag")?
            .touched
            .get(&name.into())
            .copied()
            .unwrap_or(false))
    }

    pub fn set_value(
        &self,
        name: impl Into<FieldName>,
        value: impl Into<FieldValue>,
    ) -> FormResult<()> {
        // The controller cannot mutate a value map it does not own.
        if self.values_externally_owned {
            return Ok(());
        }
        let name = name.into();
        let value = value.into();
        self.apply(StateChangeKind::Manual, move |state| {
            state.set_value(name, value);
        })
    }

    pub fn set_error(
        &self,
        name: impl Into<FieldName>,
        error: Option<FieldError>,
    ) -> FormResult<()> {
        let name = name.into();
        self.apply(StateChangeKind::Manual, move |state| {
            state.set_error(name, error);
        })
    }

    pub fn set_touched(&self, name: impl Into<FieldName>, touched: bool) -> FormResult<()> {
        let name = name.into();
        self.apply(StateChangeKind::Manual, move |state| {
            state.set_touched(name, touched);
        })
    }

    pub fn set_status(&self, status: SubmitStatus) -> FormResult<()> {
        self.apply(StateChangeKind::Manual, move |state| {
            state.set_status(status);
        })
    }

    /// Clears errors, touched flags and submit status. Values are cleared
    /// only when internally owned; an external owner resets its own map. The
    /// `on_change` collaborator is told the controller's view reset.
    pub fn reset(&self) -> FormResult<()> {
        let clear_values = !self.values_externally_owned;
        self.apply(StateChangeKind::Reset, move |state| {
            state.reset(clear_values);
        })?;
        if let Some(on_change) = &self.on_change {
            on_change(&ValueMap::new());
        }
        Ok(())
    }

    /// Refreshes the mirror a controlled form reads from. Ignored for an
    /// uncontrolled form: ownership mode is frozen at construction.
    pub fn set_external_values(&self, values: ValueMap) -> FormResult<()> {
        if !self.values_externally_owned {
            return Ok(());
        }
        write_lock(&self.state, "mirroring external values")?.values = values;
        Ok(())
    }

    /// Runs work deferred past the current turn, the invalid-capture error
    /// writes in particular. Drivers call this after dispatching each event
    /// batch. Returns how many tasks ran.
    pub fn flush_deferred(&self) -> usize {
        self.deferred.flush()
    }

    pub fn has_deferred_work(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub(crate) fn handle_change(&self, name: &FieldName, payload: &ChangePayload) -> FormResult<()> {
        let value = payload.coerce();
        if let Some(on_change) = &self.on_change {
            let mut delta = ValueMap::new();
            delta.insert(name.clone(), value.clone());
            on_change(&delta);
        }

        let write_value = !self.values_externally_owned;
        let clear_error = read_lock(&self.state, "checking field error before change")?
            .errors
            .contains_key(name);
        if !write_value && !clear_error {
            return Ok(());
        }

        let name = name.clone();
        self.apply(StateChangeKind::Change, move |state| {
            if clear_error {
                state.set_error(name.clone(), None);
            }
            if write_value {
                state.set_value(name, value);
            }
        })
    }

    pub(crate) fn handle_blur(&self, name: &FieldName) -> FormResult<()> {
        let name = name.clone();
        self.apply(StateChangeKind::Blur, move |state| {
            state.set_touched(name, true);
        })
    }

    pub(crate) fn handle_invalid(
        &self,
        name: &FieldName,
        signal: &ValiditySignal,
        field_formatter: Option<&ErrorFormatter>,
    ) {
        let mut message = signal.validation_message.clone();
        if let Some(format) = &self.get_error {
            message = format(&signal.validity, &message);
        }
        if let Some(format) = field_formatter {
            message = format(&signal.validity, &message);
        }
        let error = FieldError::Validity {
            message,
            flags: signal.validity,
        };

        // Some drivers deliver focus after invalid within the same turn; the
        // error write waits for the turn to settle so a focus handler never
        // observes a half-updated form.
        let controller = self.clone();
        let name = name.clone();
        self.deferred.schedule(move || {
            drop(controller.apply(StateChangeKind::Invalid, move |state| {
                state.set_error(name, Some(error));
            }));
        });
    }

    pub(crate) fn handle_submit(&self, signal: &SubmitSignal) -> FormResult<()> {
        signal.prevent_default();
        self.apply(StateChangeKind::Submit, |state| {
            state.set_status(SubmitStatus::Loading);
        })?;
        // The collaborator owns the rest of the submission lifecycle; the
        // status stays Loading until it advances it.
        if let Some(on_submit) = &self.on_submit {
            on_submit(self, signal);
        }
        Ok(())
    }

    fn apply(
        &self,
        kind: StateChangeKind,
        mutate: impl FnOnce(&mut FormState),
    ) -> FormResult<()> {
        let state = {
            let mut guard = write_lock(&self.state, "applying state change")?;
            mutate(&mut guard);
            guard.snapshot()
        };
        if let Some(on_state_change) = &self.on_state_change {
            on_state_change(&StateChange { kind, state });
        }
        Ok(())
    }
}

pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
