//! Prelude module for convenient imports.
//!
//! Provides a single `use vigil_validator::prelude::*;` import that brings
//! in everything a handler needs during its validation phase.
//!
//! # Examples
//!
//! ```rust
//! use vigil_validator::prelude::*;
//!
//! let mut validator = Validator::default();
//! validator.ensure(false, Message::error("cliente.nome", "não pode ser nulo"));
//! assert!(validator.has_errors());
//! ```

// ============================================================================
// MESSAGES
// ============================================================================

pub use crate::message::{Message, Severity};
pub use crate::store::MessageStore;
pub use crate::validator::Validator;

// ============================================================================
// FLOW
// ============================================================================

pub use crate::error::{FlowError, FlowResult, Interrupt};
pub use crate::flow::{FlowMode, Handler, HandlerRef, Outcome};

// ============================================================================
// RULES
// ============================================================================

pub use crate::rules::{Constraint, Rules};
