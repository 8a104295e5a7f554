//! Flow-control errors
//!
//! Validation messages are data, never errors. The types here cover the two
//! ways a dispatch leaves the handler early: a finished [`Outcome`], or a
//! routing mistake in the application itself.

use thiserror::Error;

use crate::flow::Outcome;

/// A routing mistake: the requested target cannot be resolved.
///
/// These come from programming errors, not user input, and are fatal for the
/// current request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// No handler is registered under this name.
    #[error("unknown handler '{handler}'")]
    UnknownHandler { handler: String },

    /// The handler exists but has no such method.
    #[error("handler '{handler}' has no method '{method}'")]
    UnknownMethod { handler: String, method: String },

    /// `HandlerRef::Current` was used but the dispatcher was not bound to a handler.
    #[error("no current handler is bound to this request")]
    NoCurrentHandler,

    /// The route's path placeholders do not match the arguments given.
    #[error("route '{handler}.{method}' expects {expected} argument(s), got {actual}")]
    ArgumentMismatch {
        handler: String,
        method: String,
        expected: usize,
        actual: usize,
    },

    /// The route's path template has unpaired, nested or empty braces.
    #[error("route '{handler}.{method}' has a malformed path template '{path}'")]
    MalformedRoute {
        handler: String,
        method: String,
        path: String,
    },

    /// The method arguments could not be converted to JSON values.
    #[error("arguments for method '{method}' are not serializable: {reason}")]
    InvalidArguments { method: String, reason: String },

    /// An outcome was already produced for this request.
    #[error("an error flow was already dispatched for this request")]
    AlreadyDispatched,
}

/// Short-circuit signal returned from a handler's validation phase.
///
/// Handlers propagate it with `?`; the hosting framework then acts on the
/// outcome or reports the misconfiguration.
#[derive(Debug, Error)]
pub enum Interrupt {
    /// Normal execution stops and the framework performs this outcome.
    #[error("validation failed, dispatching {}", .0.mode())]
    Dispatch(Box<Outcome>),

    /// The error flow could not be resolved.
    #[error("error flow misconfigured: {0}")]
    Misconfigured(#[from] FlowError),
}

impl Interrupt {
    /// The outcome, if this interrupt carries one.
    #[must_use]
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Interrupt::Dispatch(outcome) => Some(outcome),
            Interrupt::Misconfigured(_) => None,
        }
    }

    /// Consumes the interrupt and returns its outcome.
    #[must_use]
    pub fn into_outcome(self) -> Option<Outcome> {
        match self {
            Interrupt::Dispatch(outcome) => Some(*outcome),
            Interrupt::Misconfigured(_) => None,
        }
    }

    /// The configuration error, if any.
    #[must_use]
    pub fn config_error(&self) -> Option<&FlowError> {
        match self {
            Interrupt::Misconfigured(error) => Some(error),
            Interrupt::Dispatch(_) => None,
        }
    }
}

impl From<Outcome> for Interrupt {
    fn from(outcome: Outcome) -> Self {
        Interrupt::Dispatch(Box::new(outcome))
    }
}

/// Result of a handler's validation phase.
pub type FlowResult<T = ()> = Result<T, Interrupt>;
