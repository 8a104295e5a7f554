//! Per-request validator
//!
//! The entry point handlers use during their validation phase: add
//! messages, ask whether any error was recorded, and leave through one of the
//! `on_error_*` flows.
//!
//! ```rust
//! use vigil_validator::{FlowResult, Message, Validator};
//!
//! fn save(validator: &mut Validator, name: Option<&str>) -> FlowResult<&'static str> {
//!     validator.ensure(name.is_some(), Message::error("cliente.nome", "não pode ser nulo"));
//!     validator.on_error_send_bad_request()?;
//!     Ok("saved")
//! }
//!
//! assert_eq!(save(&mut Validator::default(), Some("ana")).unwrap(), "saved");
//! assert!(save(&mut Validator::default(), None).is_err());
//! ```

use serde_json::Value;

use crate::error::{FlowError, FlowResult, Interrupt};
use crate::flash::FlashCarrier;
use crate::flow::{FlowBuilder, FlowDispatcher, HandlerRef, Jump};
use crate::message::{Message, Severity};
use crate::rules::Rules;
use crate::store::MessageStore;
use crate::view::{ErrorsView, MessagesView, SeverityView};

/// Collects the messages of one request and drives its error flow.
///
/// Owned by a single request and never shared, so it needs no locking.
///
/// Messages restored from a redirect are kept apart from the ones this
/// request records: the views show both, but only this request's ERROR
/// messages arm the `on_error_*` flows.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    store: MessageStore,
    flashed: MessageStore,
    dispatcher: FlowDispatcher,
    dispatched: bool,
}

impl Validator {
    /// Creates an empty validator that dispatches through `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: FlowDispatcher) -> Self {
        Self {
            store: MessageStore::new(),
            flashed: MessageStore::new(),
            dispatcher,
            dispatched: false,
        }
    }

    // ------------------------------------------------------------------------
    // Adding messages
    // ------------------------------------------------------------------------

    /// Appends `message` unconditionally.
    pub fn add(&mut self, message: Message) {
        tracing::trace!(
            category = message.category(),
            severity = %message.severity(),
            "validation message added"
        );
        self.store.add(message);
    }

    /// Appends `message` when `condition` (the bad case) holds.
    pub fn add_if(&mut self, condition: bool, message: Message) {
        if condition {
            self.add(message);
        }
    }

    /// Appends `message` when `condition` (the expected-good case) does not hold.
    pub fn ensure(&mut self, condition: bool, message: Message) {
        if !condition {
            self.add(message);
        }
    }

    /// Appends every message in order, as repeated [`add`](Self::add) calls.
    pub fn add_all<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = Message>,
    {
        for message in messages {
            self.add(message);
        }
    }

    /// Runs a rule set against `value` and records what it reports.
    pub fn check<T: ?Sized + 'static>(&mut self, value: &T, rules: &Rules<T>) {
        self.add_all(rules.evaluate(value));
    }

    /// Makes the messages carried over a redirect visible to this request's
    /// views, ahead of anything recorded here.
    ///
    /// Restored messages never count toward [`has_errors`](Self::has_errors),
    /// so a redirect target with valid input runs its normal path.
    pub fn restore(&mut self, carrier: FlashCarrier) {
        tracing::debug!(messages = carrier.len(), "restoring flashed messages");
        self.flashed.extend(carrier.into_store().into_messages());
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// True if at least one ERROR message was recorded in this request.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.store.has_severity(Severity::Error)
    }

    /// Messages recorded in this request, without the restored ones.
    #[must_use]
    pub fn messages(&self) -> &MessageStore {
        &self.store
    }

    /// Messages restored from the previous request's flash carrier.
    #[must_use]
    pub fn flashed(&self) -> &MessageStore {
        &self.flashed
    }

    /// The error-only view (`errors`), restored messages first.
    #[must_use]
    pub fn errors(&self) -> ErrorsView<'_> {
        SeverityView::with_flashed(&self.flashed, &self.store, Severity::Error)
    }

    /// Every severity (`vmessages`), restored messages first.
    #[must_use]
    pub fn messages_view(&self) -> MessagesView<'_> {
        MessagesView::with_flashed(&self.flashed, &self.store)
    }

    /// Both views under their configured names, ready for a template context.
    pub fn view_context(&self) -> Result<serde_json::Map<String, Value>, serde_json::Error> {
        let config = self.dispatcher.config();
        let mut context = serde_json::Map::new();
        context.insert(config.errors_name.clone(), serde_json::to_value(self.errors())?);
        context.insert(
            config.messages_name.clone(),
            serde_json::to_value(self.messages_view())?,
        );
        Ok(context)
    }

    /// True once an error flow produced its outcome.
    #[must_use]
    pub fn is_dispatched(&self) -> bool {
        self.dispatched
    }

    /// The dispatcher that resolves this request's error flows.
    #[must_use]
    pub fn dispatcher(&self) -> &FlowDispatcher {
        &self.dispatcher
    }

    /// Consumes the validator and returns the messages recorded in this request.
    #[must_use]
    pub fn into_store(self) -> MessageStore {
        self.store
    }

    // ------------------------------------------------------------------------
    // Error flows
    // ------------------------------------------------------------------------

    /// Server-side transfer to another handler method.
    pub fn on_error_forward_to(&mut self, target: impl Into<HandlerRef>) -> FlowBuilder<'_> {
        FlowBuilder::new(self, Jump::Forward, target.into())
    }

    /// Client redirect to another handler method; messages go to the flash carrier.
    pub fn on_error_redirect_to(&mut self, target: impl Into<HandlerRef>) -> FlowBuilder<'_> {
        FlowBuilder::new(self, Jump::Redirect, target.into())
    }

    /// Renders the view of another handler method for this request.
    pub fn on_error_use_page_of(&mut self, target: impl Into<HandlerRef>) -> FlowBuilder<'_> {
        FlowBuilder::new(self, Jump::RenderPage, target.into())
    }

    /// Replies with the bad-request status and every current message.
    ///
    /// `Ok(())` when there are no errors.
    pub fn on_error_send_bad_request(&mut self) -> FlowResult {
        if !self.has_errors() {
            return Ok(());
        }
        self.check_not_dispatched()?;
        let outcome = self.dispatcher.bad_request(&self.store);
        self.dispatched = true;
        tracing::debug!(
            mode = %outcome.mode(),
            errors = self.store.count(Severity::Error),
            "error flow dispatched"
        );
        Err(outcome.into())
    }

    pub(crate) fn finish(
        &mut self,
        jump: Jump,
        target: &HandlerRef,
        method: &str,
        args: Vec<Value>,
    ) -> FlowResult {
        self.check_not_dispatched()?;
        match self
            .dispatcher
            .dispatch(jump, target, method, args, &self.store)
        {
            Ok(outcome) => {
                self.dispatched = true;
                tracing::debug!(
                    mode = %outcome.mode(),
                    action = ?outcome.target().map(ToString::to_string),
                    errors = self.store.count(Severity::Error),
                    "error flow dispatched"
                );
                Err(outcome.into())
            }
            Err(error) => {
                tracing::error!(%error, method, "error flow misconfigured");
                Err(Interrupt::Misconfigured(error))
            }
        }
    }

    fn check_not_dispatched(&self) -> Result<(), FlowError> {
        if self.dispatched {
            tracing::error!("error flow dispatched twice in one request");
            return Err(FlowError::AlreadyDispatched);
        }
        Ok(())
    }
}
