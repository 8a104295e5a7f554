//! End-to-end request scenarios: validate, dispatch, carry over a redirect.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use vigil_validator::prelude::*;
use vigil_validator::{
    ActionRegistry, FlashStore, FlowDispatcher, MemoryFlashStore, Route, Target,
};

struct Clients;

impl Handler for Clients {
    const NAME: &'static str = "clients";
}

fn registry() -> Arc<ActionRegistry> {
    Arc::new(
        ActionRegistry::builder()
            .handler_route::<Clients>("list", Route::new("/clients"))
            .handler_route::<Clients>("form", Route::new("/clients/new"))
            .handler_route::<Clients>("edit", Route::new("/clients/{id}/edit"))
            .build(),
    )
}

fn validator() -> Validator {
    Validator::new(FlowDispatcher::new(registry()).bound_to_handler::<Clients>())
}

/// A handler body: validate, bail out on error, otherwise do the work.
fn create_client(validator: &mut Validator, name: Option<&str>) -> FlowResult<String> {
    validator.ensure(
        name.is_some(),
        Message::error("cliente.nome", "não pode ser nulo"),
    );
    validator.add_if(
        name.is_some_and(|n| n.len() < 50),
        Message::error("cliente.nome", "não pode ser menor que 50"),
    );
    validator.on_error_redirect_to(HandlerRef::of::<Clients>()).invoke0("list")?;
    Ok("created".to_string())
}

#[test]
fn stacked_messages_join_in_order() {
    let mut validator = validator();
    validator.add(Message::error("cliente.nome", "não pode ser nulo"));
    validator.add(Message::error("cliente.nome", "não pode ser menor que 50"));

    let texts: Vec<_> = validator
        .messages()
        .by_category("cliente.nome")
        .map(Message::text)
        .collect();
    assert_eq!(texts.join(" - "), "não pode ser nulo - não pode ser menor que 50");
    assert_eq!(
        validator.errors().from("cliente.nome").join(" - "),
        "não pode ser nulo - não pode ser menor que 50"
    );
}

#[test]
fn no_errors_keeps_normal_flow() {
    let mut validator = validator();
    validator.add(Message::warn("cliente.email", "domínio incomum"));

    let result = validator
        .on_error_forward_to(HandlerRef::of::<Clients>())
        .invoke0("form");

    assert!(result.is_ok());
    assert!(!validator.is_dispatched());
}

#[test]
fn inert_builder_ignores_unknown_targets() {
    let mut validator = validator();
    assert!(
        validator
            .on_error_forward_to("nowhere")
            .invoke0("missing")
            .is_ok()
    );
}

#[test]
fn redirect_carries_messages_for_one_read() {
    let flash = MemoryFlashStore::default();
    let mut validator = validator();
    validator.add(Message::error("cliente.nome", "não pode ser nulo"));
    validator.add(Message::info("cliente", "rascunho mantido"));

    let interrupt = validator
        .on_error_redirect_to("clients")
        .invoke0("list")
        .unwrap_err();
    let outcome = interrupt.into_outcome().unwrap();

    assert_eq!(outcome.mode(), FlowMode::Redirect);
    assert_eq!(
        outcome.target(),
        Some(&Target {
            handler: "clients".into(),
            method: "list".into()
        })
    );
    assert!(outcome.args().is_empty());

    let Outcome::Redirect { location, flash: carrier, .. } = outcome else {
        panic!("expected a redirect");
    };
    assert_eq!(location, "/clients");
    assert_eq!(carrier.messages(), validator.messages().as_slice());

    flash.put("session-1", carrier);

    // Next request sees the messages once.
    let mut next = Validator::default();
    next.restore(flash.take("session-1").unwrap());
    assert_eq!(next.flashed().len(), 2);
    assert_eq!(next.errors().from("cliente.nome").join(", "), "não pode ser nulo");
    assert_eq!(
        next.messages_view().infos().from("cliente").first(),
        Some("rascunho mantido")
    );

    // And the one after does not.
    assert!(flash.take("session-1").is_none());
}

#[test]
fn redirect_target_with_valid_input_runs_normally() {
    let flash = MemoryFlashStore::default();
    let mut first = validator();
    first.add(Message::error("cliente.nome", "não pode ser nulo"));
    let carrier = first
        .on_error_redirect_to("clients")
        .invoke0("list")
        .unwrap_err()
        .into_outcome()
        .and_then(|outcome| outcome.flash().cloned())
        .unwrap();
    flash.put("session-1", carrier);

    // The `list` handler guards itself with the same redirect; its own input is clean.
    let mut next = validator();
    next.restore(flash.take("session-1").unwrap());
    let result = next.on_error_redirect_to("clients").invoke0("list");

    assert!(result.is_ok());
    assert!(!next.has_errors());
    assert!(!next.is_dispatched());
    assert_eq!(next.errors().from("cliente.nome").join(", "), "não pode ser nulo");
}

#[test]
fn redirect_flash_holds_only_this_request_messages() {
    let mut previous = MessageStore::new();
    previous.add(Message::error("cliente.nome", "do pedido anterior"));

    let mut validator = validator();
    validator.restore(vigil_validator::FlashCarrier::from_store(&previous));
    validator.add(Message::error("cliente.idade", "deve ser positiva"));

    let outcome = validator
        .on_error_redirect_to("clients")
        .invoke0("list")
        .unwrap_err()
        .into_outcome()
        .unwrap();
    let texts: Vec<_> = outcome
        .flash()
        .unwrap()
        .messages()
        .iter()
        .map(Message::text)
        .collect();
    assert_eq!(texts, vec!["deve ser positiva"]);
}

#[test]
fn bad_request_payload_is_every_message() {
    let mut validator = validator();
    validator.add(Message::error("cliente.nome", "não pode ser nulo"));
    validator.add(Message::warn("cliente.email", "domínio incomum"));

    let outcome = validator
        .on_error_send_bad_request()
        .unwrap_err()
        .into_outcome()
        .unwrap();

    assert_eq!(outcome.mode(), FlowMode::StatusCode(400));
    assert!(outcome.target().is_none());
    let Outcome::Status { status, payload } = &outcome else {
        panic!("expected a status outcome");
    };
    assert_eq!(*status, http::StatusCode::BAD_REQUEST);
    assert_eq!(payload.as_slice(), validator.messages().as_slice());

    let body: serde_json::Value =
        serde_json::from_str(&outcome.payload_json().unwrap().unwrap()).unwrap();
    assert_eq!(
        body,
        json!([
            {"category": "cliente.nome", "text": "não pode ser nulo", "severity": "error"},
            {"category": "cliente.email", "text": "domínio incomum", "severity": "warn"}
        ])
    );
}

#[test]
fn handler_short_circuits_with_question_mark() {
    let mut ok = validator();
    assert_eq!(create_client(&mut ok, Some("x".repeat(60).as_str())).unwrap(), "created");

    let mut failing = validator();
    let interrupt = create_client(&mut failing, None).unwrap_err();
    assert_eq!(interrupt.outcome().map(Outcome::mode), Some(FlowMode::Redirect));
}

#[test]
fn rules_feed_the_validator() {
    struct Form {
        nome: String,
        idade: i32,
    }

    let rules = Rules::new()
        .field(
            "cliente.nome",
            |f: &Form| f.nome.as_str(),
            |n: &str| !n.trim().is_empty(),
            "não pode ser vazio",
        )
        .rule("cliente.idade", |f: &Form| f.idade > 0, "deve ser positiva");

    let mut validator = validator();
    validator.check(
        &Form {
            nome: "  ".into(),
            idade: 3,
        },
        &rules,
    );

    assert!(validator.has_errors());
    assert_eq!(validator.errors().categories(), vec!["cliente.nome"]);
}
