mod binding;
mod compose;
mod controller;
mod defer;
mod signal;
mod state;


pub use binding::{FormBinding, FormPropsConfig, InputBinding, InputPropsConfig, Passthrough};
pub use compose::{EventHandler, HandlerOutcome, compose};
pub use controller::{
    ChangeCallback, ErrorFormatter, FormController, FormError, FormOptions, FormResult,
    StateChangeCallback, SubmitCallback,
};
pub use defer::DeferredQueue;
pub use signal::{
    BlurSignal, ChangePayload, ChangeSignal, FieldKind, SubmitSignal, ValidityFlags,
    ValiditySignal,
};
pub use state::{
    ErrorMap, FieldError, FieldName, FieldValue, FormSnapshot, StateChange, StateChangeKind,
    SubmitStatus, TouchedMap, ValueMap,
};
