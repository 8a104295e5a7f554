//! Mode mapping and configuration errors of the flow dispatcher.

use std::sync::Arc;

use serde_json::json;
use vigil_validator::prelude::*;
use vigil_validator::{ActionRegistry, FlowConfig, FlowDispatcher, Route};

fn registry() -> Arc<ActionRegistry> {
    Arc::new(
        ActionRegistry::builder()
            .route("clients", "list", Route::new("/clients"))
            .route("clients", "form", Route::new("/clients/new"))
            .route("clients", "show", Route::new("/clients/{id}"))
            .route(
                "orders",
                "edit",
                Route::new("/orders/{id}/edit").with_view("orders/editor"),
            )
            .build(),
    )
}

fn failing_validator(dispatcher: FlowDispatcher) -> Validator {
    let mut validator = Validator::new(dispatcher);
    validator.add(Message::error("order.total", "must be positive"));
    validator
}

#[test]
fn forward_keeps_messages_visible() {
    let mut validator = failing_validator(FlowDispatcher::new(registry()));
    let outcome = validator
        .on_error_forward_to("clients")
        .invoke("show", (42,))
        .unwrap_err()
        .into_outcome()
        .unwrap();

    assert_eq!(outcome.mode(), FlowMode::Forward);
    assert_eq!(outcome.args(), &[json!(42)]);
    let Outcome::Forward { messages, .. } = outcome else {
        panic!("expected a forward");
    };
    assert_eq!(messages.by_category("order.total").count(), 1);
}

#[test]
fn redirect_fills_path_placeholders() {
    let mut validator = failing_validator(FlowDispatcher::new(registry()));
    let outcome = validator
        .on_error_redirect_to("clients")
        .invoke("show", 7)
        .unwrap_err()
        .into_outcome()
        .unwrap();
    assert!(matches!(outcome, Outcome::Redirect { ref location, .. } if location == "/clients/7"));
}

#[test]
fn redirect_with_wrong_argument_count_is_misconfigured() {
    let mut validator = failing_validator(FlowDispatcher::new(registry()));
    let interrupt = validator
        .on_error_redirect_to("clients")
        .invoke0("show")
        .unwrap_err();
    assert_eq!(
        interrupt.config_error(),
        Some(&FlowError::ArgumentMismatch {
            handler: "clients".into(),
            method: "show".into(),
            expected: 1,
            actual: 0,
        })
    );
    assert!(!validator.is_dispatched());
}

#[test]
fn redirect_to_malformed_route_is_misconfigured() {
    let registry = ActionRegistry::builder()
        .route("clients", "broken", Route::new("/clients/{id"))
        .route("clients", "doubled", Route::new("/a/{{x}}"))
        .build();
    assert!(registry.validate().is_err());
    let dispatcher = FlowDispatcher::new(Arc::new(registry));

    for method in ["broken", "doubled"] {
        let mut validator = failing_validator(dispatcher.clone());
        let interrupt = validator
            .on_error_redirect_to("clients")
            .invoke(method, (1,))
            .unwrap_err();
        assert!(
            matches!(
                interrupt.config_error(),
                Some(FlowError::MalformedRoute { method: m, .. }) if m == method
            ),
            "{method}: {interrupt}"
        );
        assert!(!validator.is_dispatched());
    }
}

#[test]
fn use_page_of_prefers_explicit_view() {
    let mut validator = failing_validator(FlowDispatcher::new(registry()));
    let outcome = validator
        .on_error_use_page_of("orders")
        .invoke("edit", (3,))
        .unwrap_err()
        .into_outcome()
        .unwrap();
    assert!(matches!(outcome, Outcome::RenderPage { ref view, .. } if view == "orders/editor"));
}

#[test]
fn use_page_of_falls_back_to_view_pattern() {
    let config = FlowConfig {
        view_pattern: "WEB-INF/views/{handler}/{method}.html".into(),
        ..FlowConfig::default()
    };
    let dispatcher = FlowDispatcher::new(registry()).with_config(Arc::new(config));
    let mut validator = failing_validator(dispatcher);
    let outcome = validator
        .on_error_use_page_of("clients")
        .invoke0("form")
        .unwrap_err()
        .into_outcome()
        .unwrap();
    assert!(matches!(
        outcome,
        Outcome::RenderPage { ref view, .. } if view == "WEB-INF/views/clients/form.html"
    ));
}

#[test]
fn current_handler_sentinel() {
    let dispatcher = FlowDispatcher::new(registry()).bound_to("clients");
    let mut validator = failing_validator(dispatcher);
    let outcome = validator
        .on_error_forward_to(HandlerRef::current())
        .invoke0("form")
        .unwrap_err()
        .into_outcome()
        .unwrap();
    assert_eq!(outcome.target().map(|t| t.handler.as_str()), Some("clients"));
}

#[test]
fn current_handler_unbound_is_misconfigured() {
    let mut validator = failing_validator(FlowDispatcher::new(registry()));
    let interrupt = validator
        .on_error_forward_to(HandlerRef::Current)
        .invoke0("form")
        .unwrap_err();
    assert_eq!(interrupt.config_error(), Some(&FlowError::NoCurrentHandler));
}

#[test]
fn unknown_handler_and_method_are_misconfigured() {
    let mut validator = failing_validator(FlowDispatcher::new(registry()));
    let interrupt = validator
        .on_error_forward_to("invoices")
        .invoke0("list")
        .unwrap_err();
    assert!(matches!(
        interrupt.config_error(),
        Some(FlowError::UnknownHandler { handler }) if handler == "invoices"
    ));

    let mut validator = failing_validator(FlowDispatcher::new(registry()));
    let interrupt = validator
        .on_error_forward_to("clients")
        .invoke0("archive")
        .unwrap_err();
    assert!(matches!(
        interrupt.config_error(),
        Some(FlowError::UnknownMethod { method, .. }) if method == "archive"
    ));
}

#[test]
fn only_one_outcome_per_request() {
    let mut validator = failing_validator(FlowDispatcher::new(registry()));
    let first = validator.on_error_forward_to("clients").invoke0("list");
    assert!(first.unwrap_err().outcome().is_some());

    let second = validator.on_error_redirect_to("clients").invoke0("list");
    assert_eq!(
        second.unwrap_err().config_error(),
        Some(&FlowError::AlreadyDispatched)
    );
}

#[test]
fn builder_is_armed_at_call_time() {
    let mut validator = Validator::new(FlowDispatcher::new(registry()));
    assert!(!validator.on_error_forward_to("clients").is_armed());
    validator.add(Message::error("x", "y"));
    assert!(validator.on_error_forward_to("clients").is_armed());
}

#[test]
fn configured_bad_request_status() {
    let config = FlowConfig {
        bad_request_status: 422,
        ..FlowConfig::default()
    };
    let dispatcher = FlowDispatcher::new(registry()).with_config(Arc::new(config));
    let mut validator = failing_validator(dispatcher);
    let outcome = validator
        .on_error_send_bad_request()
        .unwrap_err()
        .into_outcome()
        .unwrap();
    assert_eq!(outcome.mode(), FlowMode::StatusCode(422));
}
