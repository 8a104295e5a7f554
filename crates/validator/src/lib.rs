//! # vigil-validator
//!
//! Request validation messages and post-validation flow dispatch.
//!
//! A [`Validator`] lives for one request. Handlers record [`Message`]s on it
//! (directly, through `add_if`/`ensure`, or by running [`Rules`]), and end
//! their validation phase by either carrying on or leaving through an
//! `on_error_*` flow, which yields an [`Outcome`] for the hosting framework.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use vigil_validator::prelude::*;
//! use vigil_validator::{ActionRegistry, FlowDispatcher, Route};
//!
//! let registry = Arc::new(
//!     ActionRegistry::builder()
//!         .route("clients", "form", Route::new("/clients/new"))
//!         .build(),
//! );
//!
//! fn save(validator: &mut Validator, name: &str) -> FlowResult<String> {
//!     validator.ensure(!name.is_empty(), Message::error("cliente.nome", "não pode ser nulo"));
//!     validator.on_error_use_page_of("clients").invoke0("form")?;
//!     Ok(format!("saved {name}"))
//! }
//!
//! let mut ok = Validator::new(FlowDispatcher::new(registry.clone()));
//! assert_eq!(save(&mut ok, "ana").unwrap(), "saved ana");
//!
//! let mut failing = Validator::new(FlowDispatcher::new(registry));
//! let outcome = save(&mut failing, "").unwrap_err().into_outcome().unwrap();
//! assert_eq!(outcome.mode(), FlowMode::RenderPage);
//! ```
//!
//! ## Modules
//!
//! - [`message`], [`store`]: the message model and its ordered collection
//! - [`validator`]: the per-request entry point
//! - [`flow`]: target resolution and [`Outcome`]s
//! - [`flash`]: carrying messages across a redirect
//! - [`view`]: the `errors` / `vmessages` collections for templates
//! - [`rules`]: explicit constraint predicates

pub mod config;
pub mod error;
pub mod flash;
pub mod flow;
pub mod message;
pub mod prelude;
pub mod rules;
pub mod store;
pub mod validator;
pub mod view;

pub use config::FlowConfig;
pub use error::{FlowError, FlowResult, Interrupt};
pub use flash::{FlashCarrier, FlashStore, MemoryFlashStore};
pub use flow::{
    ActionRegistry, ActionRegistryBuilder, FlowBuilder, FlowDispatcher, FlowMode, Handler,
    HandlerRef, Outcome, Route, Target,
};
pub use message::{Message, Severity};
pub use rules::{Constraint, Rule, Rules};
pub use store::MessageStore;
pub use validator::Validator;
pub use view::{CategoryTexts, ErrorsView, MessagesView, SeverityView};
