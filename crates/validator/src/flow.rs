//! Post-validation flow dispatch
//!
//! When a request carries ERROR messages, the handler leaves its normal path
//! through one of four modes:
//!
//! | Call | Mode |
//! |---|---|
//! | `on_error_forward_to(t).invoke(m, args)` | [`Outcome::Forward`] |
//! | `on_error_redirect_to(t).invoke(m, args)` | [`Outcome::Redirect`] |
//! | `on_error_use_page_of(t).invoke(m, args)` | [`Outcome::RenderPage`] |
//! | `on_error_send_bad_request()` | [`Outcome::Status`] |
//!
//! The target method is named explicitly and checked against an
//! [`ActionRegistry`]; nothing is invoked. The resulting outcome travels back
//! to the framework as [`Interrupt::Dispatch`](crate::Interrupt::Dispatch),
//! which handlers propagate with `?`.
//!
//! ```rust
//! use std::sync::Arc;
//! use vigil_validator::{ActionRegistry, FlowDispatcher, Message, Outcome, Route, Validator};
//!
//! let registry = ActionRegistry::builder()
//!     .route("clients", "list", Route::new("/clients"))
//!     .build();
//! let mut validator = Validator::new(FlowDispatcher::new(Arc::new(registry)));
//! validator.add(Message::error("cliente.nome", "não pode ser nulo"));
//!
//! let interrupt = validator
//!     .on_error_redirect_to("clients")
//!     .invoke0("list")
//!     .unwrap_err();
//! match interrupt.into_outcome() {
//!     Some(Outcome::Redirect { location, flash, .. }) => {
//!         assert_eq!(location, "/clients");
//!         assert_eq!(flash.len(), 1);
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult};
use crate::flash::FlashCarrier;
use crate::message::Message;
use crate::store::MessageStore;
use crate::validator::Validator;

// ============================================================================
// HANDLER REFERENCES
// ============================================================================

/// A request handler type that can be the target of an error flow.
pub trait Handler {
    /// Name the handler is registered under.
    const NAME: &'static str;
}

/// Which handler an error flow targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerRef {
    /// A handler by registered name.
    Named(Cow<'static, str>),
    /// The handler currently processing the request.
    Current,
}

impl HandlerRef {
    /// Reference to a handler by its registered name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        HandlerRef::Named(name.into())
    }

    /// Reference to a [`Handler`] type.
    #[must_use]
    pub fn of<H: Handler>() -> Self {
        HandlerRef::Named(Cow::Borrowed(H::NAME))
    }

    #[must_use]
    pub const fn current() -> Self {
        HandlerRef::Current
    }
}

impl From<&'static str> for HandlerRef {
    fn from(name: &'static str) -> Self {
        HandlerRef::Named(Cow::Borrowed(name))
    }
}

impl From<String> for HandlerRef {
    fn from(name: String) -> Self {
        HandlerRef::Named(Cow::Owned(name))
    }
}

// ============================================================================
// ROUTES
// ============================================================================

/// URL path template and view template for one handler method.
///
/// Path placeholders look like `{id}` and are filled from the method
/// arguments in order. A placeholder needs a non-empty name and cannot nest;
/// a stray `{` or `}` makes the whole template malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    path: String,
    view: Option<String>,
}

/// One piece of a parsed path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'p> {
    Literal(&'p str),
    Placeholder,
}

/// Splits a path template, or `None` when its braces do not pair up.
fn parse_template(path: &str) -> Option<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return None;
        }
        let name_len = rest[open + 1..].find('}')?;
        let name = &rest[open + 1..open + 1 + name_len];
        if name.is_empty() || name.contains('{') {
            return None;
        }
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        segments.push(Segment::Placeholder);
        rest = &rest[open + name_len + 2..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    Some(segments)
}

impl Route {
    /// Route for the path template `path`, rendered with the configured view pattern.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            view: None,
        }
    }

    /// Uses `view` instead of the configured view pattern.
    #[must_use]
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn view(&self) -> Option<&str> {
        self.view.as_deref()
    }

    /// Returns true if every brace in the path belongs to a `{name}` placeholder.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        parse_template(&self.path).is_some()
    }

    /// Number of `{..}` placeholders, or `None` for a malformed template.
    #[must_use]
    pub fn placeholders(&self) -> Option<usize> {
        parse_template(&self.path).map(|segments| {
            segments
                .iter()
                .filter(|segment| matches!(segment, Segment::Placeholder))
                .count()
        })
    }

    /// Fills the placeholders with `args`.
    ///
    /// `None` when the template is malformed or the counts differ.
    #[must_use]
    pub fn expand(&self, args: &[Value]) -> Option<String> {
        let segments = parse_template(&self.path)?;
        let mut args = args.iter();
        let mut location = String::with_capacity(self.path.len());
        for segment in segments {
            match segment {
                Segment::Literal(text) => location.push_str(text),
                Segment::Placeholder => match args.next()? {
                    Value::String(s) => location.push_str(s),
                    other => location.push_str(&other.to_string()),
                },
            }
        }
        args.next().is_none().then_some(location)
    }
}

/// Handler name to method name to [`Route`].
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    handlers: HashMap<String, HashMap<String, Route>>,
}

impl ActionRegistry {
    #[must_use]
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::default()
    }

    #[must_use]
    pub fn contains_handler(&self, handler: &str) -> bool {
        self.handlers.contains_key(handler)
    }

    /// Checks every registered path template.
    ///
    /// Meant for application startup; a malformed route is otherwise only
    /// reported when a redirect reaches it.
    pub fn validate(&self) -> Result<(), FlowError> {
        for (handler, methods) in &self.handlers {
            for (method, route) in methods {
                if !route.is_well_formed() {
                    return Err(FlowError::MalformedRoute {
                        handler: handler.clone(),
                        method: method.clone(),
                        path: route.path.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Looks up a route, failing on an unknown handler or method.
    pub fn resolve(&self, handler: &str, method: &str) -> Result<&Route, FlowError> {
        let methods = self
            .handlers
            .get(handler)
            .ok_or_else(|| FlowError::UnknownHandler {
                handler: handler.to_string(),
            })?;
        methods.get(method).ok_or_else(|| FlowError::UnknownMethod {
            handler: handler.to_string(),
            method: method.to_string(),
        })
    }
}

/// Builder for [`ActionRegistry`].
#[derive(Debug, Default)]
pub struct ActionRegistryBuilder {
    handlers: HashMap<String, HashMap<String, Route>>,
}

impl ActionRegistryBuilder {
    /// Registers `handler.method`. A later registration of the same pair wins.
    ///
    /// A malformed path template is logged here and rejected by
    /// [`ActionRegistry::validate`] and by any redirect to it.
    #[must_use]
    pub fn route(
        mut self,
        handler: impl Into<String>,
        method: impl Into<String>,
        route: Route,
    ) -> Self {
        let (handler, method) = (handler.into(), method.into());
        if !route.is_well_formed() {
            tracing::warn!(
                %handler,
                %method,
                path = route.path(),
                "malformed route path template"
            );
        }
        self.handlers
            .entry(handler)
            .or_default()
            .insert(method, route);
        self
    }

    /// Registers a method of a [`Handler`] type.
    #[must_use]
    pub fn handler_route<H: Handler>(self, method: impl Into<String>, route: Route) -> Self {
        self.route(H::NAME, method, route)
    }

    #[must_use]
    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            handlers: self.handlers,
        }
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// A resolved `handler.method` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    pub handler: String,
    pub method: String,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.handler, self.method)
    }
}

/// Dispatch mode of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowMode {
    Forward,
    Redirect,
    RenderPage,
    StatusCode(u16),
}

impl fmt::Display for FlowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowMode::Forward => f.write_str("forward"),
            FlowMode::Redirect => f.write_str("redirect"),
            FlowMode::RenderPage => f.write_str("render-page"),
            FlowMode::StatusCode(code) => write!(f, "status {code}"),
        }
    }
}

/// The control-flow decision handed to the framework. Produced at most once
/// per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Server-side transfer; `messages` stays visible to the target.
    Forward {
        target: Target,
        args: Vec<Value>,
        messages: MessageStore,
    },
    /// Client redirect to `location`; `flash` must be stored for the next request.
    Redirect {
        target: Target,
        args: Vec<Value>,
        location: String,
        flash: FlashCarrier,
    },
    /// Render `view` for the current request.
    RenderPage {
        target: Target,
        args: Vec<Value>,
        view: String,
        messages: MessageStore,
    },
    /// Reply with `status`, the body being every current message.
    Status {
        status: http::StatusCode,
        payload: Vec<Message>,
    },
}

impl Outcome {
    #[must_use]
    pub fn mode(&self) -> FlowMode {
        match self {
            Outcome::Forward { .. } => FlowMode::Forward,
            Outcome::Redirect { .. } => FlowMode::Redirect,
            Outcome::RenderPage { .. } => FlowMode::RenderPage,
            Outcome::Status { status, .. } => FlowMode::StatusCode(status.as_u16()),
        }
    }

    /// The target action; `None` for a status reply.
    #[must_use]
    pub fn target(&self) -> Option<&Target> {
        match self {
            Outcome::Forward { target, .. }
            | Outcome::Redirect { target, .. }
            | Outcome::RenderPage { target, .. } => Some(target),
            Outcome::Status { .. } => None,
        }
    }

    /// Method arguments; empty for a status reply.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        match self {
            Outcome::Forward { args, .. }
            | Outcome::Redirect { args, .. }
            | Outcome::RenderPage { args, .. } => args,
            Outcome::Status { .. } => &[],
        }
    }

    /// The flash carrier of a redirect.
    #[must_use]
    pub fn flash(&self) -> Option<&FlashCarrier> {
        match self {
            Outcome::Redirect { flash, .. } => Some(flash),
            _ => None,
        }
    }

    /// Messages of a status reply; `None` for the other modes.
    #[must_use]
    pub fn payload(&self) -> Option<&[Message]> {
        match self {
            Outcome::Status { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Serialized status payload, as a JSON array of messages.
    ///
    /// `Ok(None)` when the outcome is not a status reply.
    pub fn payload_json(&self) -> Result<Option<String>, serde_json::Error> {
        self.payload().map(serde_json::to_string).transpose()
    }
}

// ============================================================================
// DISPATCHER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Jump {
    Forward,
    Redirect,
    RenderPage,
}

/// Resolves error-flow requests into [`Outcome`]s.
///
/// Cheap to clone: the registry and config are shared. One dispatcher is
/// bound per request to the handler that is processing it.
#[derive(Debug, Clone, Default)]
pub struct FlowDispatcher {
    registry: Arc<ActionRegistry>,
    config: Arc<FlowConfig>,
    current: Option<Cow<'static, str>>,
}

impl FlowDispatcher {
    #[must_use]
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self {
            registry,
            config: Arc::default(),
            current: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Arc<FlowConfig>) -> Self {
        self.config = config;
        self
    }

    /// Binds the dispatcher to the handler serving the request, which
    /// [`HandlerRef::Current`] resolves to.
    #[must_use]
    pub fn bound_to(mut self, handler: impl Into<Cow<'static, str>>) -> Self {
        self.current = Some(handler.into());
        self
    }

    #[must_use]
    pub fn bound_to_handler<H: Handler>(self) -> Self {
        self.bound_to(H::NAME)
    }

    #[must_use]
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn current_handler(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn resolve_handler<'a>(&'a self, target: &'a HandlerRef) -> Result<&'a str, FlowError> {
        let name = match target {
            HandlerRef::Named(name) => name.as_ref(),
            HandlerRef::Current => self.current.as_deref().ok_or(FlowError::NoCurrentHandler)?,
        };
        if self.registry.contains_handler(name) {
            Ok(name)
        } else {
            Err(FlowError::UnknownHandler {
                handler: name.to_string(),
            })
        }
    }

    pub(crate) fn dispatch(
        &self,
        jump: Jump,
        target: &HandlerRef,
        method: &str,
        args: Vec<Value>,
        store: &MessageStore,
    ) -> Result<Outcome, FlowError> {
        let handler = self.resolve_handler(target)?;
        let route = self.registry.resolve(handler, method)?;
        let target = Target {
            handler: handler.to_string(),
            method: method.to_string(),
        };

        let outcome = match jump {
            Jump::Forward => Outcome::Forward {
                target,
                args,
                messages: store.clone(),
            },
            Jump::Redirect => {
                let expected = route.placeholders().ok_or_else(|| FlowError::MalformedRoute {
                    handler: target.handler.clone(),
                    method: target.method.clone(),
                    path: route.path().to_string(),
                })?;
                let location = route
                    .expand(&args)
                    .ok_or_else(|| FlowError::ArgumentMismatch {
                        handler: target.handler.clone(),
                        method: target.method.clone(),
                        expected,
                        actual: args.len(),
                    })?;
                Outcome::Redirect {
                    target,
                    args,
                    location,
                    flash: FlashCarrier::from_store(store),
                }
            }
            Jump::RenderPage => {
                let view = route.view().map_or_else(
                    || self.config.view_for(&target.handler, &target.method),
                    str::to_string,
                );
                Outcome::RenderPage {
                    target,
                    args,
                    view,
                    messages: store.clone(),
                }
            }
        };
        Ok(outcome)
    }

    pub(crate) fn bad_request(&self, store: &MessageStore) -> Outcome {
        Outcome::Status {
            status: self.config.bad_request_status(),
            payload: store.as_slice().to_vec(),
        }
    }
}

// ============================================================================
// FLOW BUILDER
// ============================================================================

/// Returned by the `on_error_*` calls of [`Validator`].
///
/// Armed only when the validator had ERROR messages at the time of the
/// call. [`invoke`](Self::invoke) consumes the builder, so the target method
/// can be named at most once.
#[must_use = "a flow builder does nothing until `invoke` is called"]
pub struct FlowBuilder<'v> {
    validator: &'v mut Validator,
    armed: Option<(Jump, HandlerRef)>,
}

impl<'v> FlowBuilder<'v> {
    pub(crate) fn new(validator: &'v mut Validator, jump: Jump, target: HandlerRef) -> Self {
        let armed = validator.has_errors().then_some((jump, target));
        Self { validator, armed }
    }

    /// Returns true if [`invoke`](Self::invoke) will short-circuit.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Names the target method and its arguments.
    ///
    /// `args` is serialized to JSON: a tuple or sequence gives positional
    /// arguments, `()` gives none, any other value is a single argument.
    ///
    /// Returns `Ok(())` when the builder is inert. Otherwise returns
    /// [`Interrupt::Dispatch`](crate::Interrupt::Dispatch) with the outcome, or
    /// [`Interrupt::Misconfigured`](crate::Interrupt::Misconfigured) when the
    /// target cannot be resolved.
    pub fn invoke<A: Serialize>(self, method: &str, args: A) -> FlowResult {
        let Some((jump, target)) = self.armed else {
            return Ok(());
        };

        let args = match serde_json::to_value(args) {
            Ok(Value::Null) => Vec::new(),
            Ok(Value::Array(values)) => values,
            Ok(value) => vec![value],
            Err(error) => {
                tracing::error!(method, %error, "error flow arguments are not serializable");
                return Err(FlowError::InvalidArguments {
                    method: method.to_string(),
                    reason: error.to_string(),
                }
                .into());
            }
        };

        self.validator.finish(jump, &target, method, args)
    }

    /// [`invoke`](Self::invoke) for a method without arguments.
    pub fn invoke0(self, method: &str) -> FlowResult {
        self.invoke(method, ())
    }
}

impl fmt::Debug for FlowBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowBuilder")
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}
