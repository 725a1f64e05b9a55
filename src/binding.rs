use std::collections::BTreeMap;
use std::sync::Arc;

use crate::compose::{EventHandler, HandlerOutcome, compose};
use crate::controller::{ErrorFormatter, FormController, FormError, FormResult, read_lock};
use crate::signal::{BlurSignal, ChangePayload, SubmitSignal, ValiditySignal};
use crate::state::{FieldName, FieldValue};

/// Extra attributes a caller wants carried on a binding, passed through
/// untouched. The wrapped handler slots are never part of this map; they are
/// always the composed handlers.
pub type Passthrough = BTreeMap<String, String>;

#[derive(Clone, Default)]
pub struct InputPropsConfig {
    pub name: Option<FieldName>,
    pub on_change: Option<EventHandler<ChangePayload>>,
    pub on_blur: Option<EventHandler<BlurSignal>>,
    pub on_invalid: Option<EventHandler<ValiditySignal>>,
    pub get_error: Option<ErrorFormatter>,
    pub passthrough: Passthrough,
}

impl InputPropsConfig {
    pub fn named(name: impl Into<FieldName>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Binding object the rendering layer attaches to one field element.
#[derive(Clone)]
pub struct InputBinding {
    pub name: FieldName,
    pub value: FieldValue,
    pub invalid: bool,
    pub on_change: EventHandler<ChangePayload>,
    pub on_blur: EventHandler<BlurSignal>,
    pub on_invalid: EventHandler<ValiditySignal>,
    pub passthrough: Passthrough,
}

impl std::fmt::Debug for InputBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputBinding")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("invalid", &self.invalid)
            .field("passthrough", &self.passthrough)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default)]
pub struct FormPropsConfig {
    pub on_submit: Option<EventHandler<SubmitSignal>>,
    pub passthrough: Passthrough,
}

/// Binding object the rendering layer attaches to the form element.
#[derive(Clone)]
pub struct FormBinding {
    pub on_submit: EventHandler<SubmitSignal>,
    pub passthrough: Passthrough,
}

impl FormController {
    pub fn input_props(&self, config: InputPropsConfig) -> FormResult<InputBinding> {
        let Some(name) = config.name else {
            return Err(FormError::MissingRequiredParameter {
                operation: "input_props",
                parameter: "name",
            });
        };

        let (value, invalid) = {
            let state = read_lock(&self.state, "building input binding")?;
            let value = state
                .values
                .get(&name)
                .cloned()
                // Absent stays renderable as an empty string.
                .unwrap_or_else(|| FieldValue::Text(String::new()));
            (value, state.errors.contains_key(&name))
        };

        let change: EventHandler<ChangePayload> = {
            let controller = self.clone();
            let name = name.clone();
            Arc::new(move |payload| {
                drop(controller.handle_change(&name, payload));
                HandlerOutcome::proceed()
            })
        };
        let blur: EventHandler<BlurSignal> = {
            let controller = self.clone();
            let name = name.clone();
            Arc::new(move |_| {
                drop(controller.handle_blur(&name));
                HandlerOutcome::proceed()
            })
        };
        let invalid_handler: EventHandler<ValiditySignal> = {
            let controller = self.clone();
            let name = name.clone();
            let get_error = config.get_error;
            Arc::new(move |signal| {
                controller.handle_invalid(&name, signal, get_error.as_ref());
                HandlerOutcome::proceed()
            })
        };

        Ok(InputBinding {
            name,
            value,
            invalid,
            on_change: compose(vec![config.on_change, Some(change)]),
            on_blur: compose(vec![config.on_blur, Some(blur)]),
            on_invalid: compose(vec![config.on_invalid, Some(invalid_handler)]),
            passthrough: config.passthrough,
        })
    }

    pub fn form_props(&self, config: FormPropsConfig) -> FormBinding {
        let submit: EventHandler<SubmitSignal> = {
            let controller = self.clone();
            Arc::new(move |signal| {
                drop(controller.handle_submit(signal));
                HandlerOutcome::proceed()
            })
        };

        FormBinding {
            on_submit: compose(vec![config.on_submit, Some(submit)]),
            passthrough: config.passthrough,
        }
    }
}
