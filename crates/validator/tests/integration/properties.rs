//! Property-based tests for the message store and validator.

use proptest::prelude::*;
use vigil_validator::prelude::*;

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Error),
        Just(Severity::Warn),
        Just(Severity::Info),
        Just(Severity::Success),
    ]
}

fn message() -> impl Strategy<Value = Message> {
    ("[a-c]\\.[x-z]", "[a-z ]{0,12}", severity())
        .prop_map(|(category, text, severity)| Message::new(category, text, severity))
}

#[derive(Debug, Clone)]
enum Op {
    Add(Message),
    AddIf(bool, Message),
    Ensure(bool, Message),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        message().prop_map(Op::Add),
        (any::<bool>(), message()).prop_map(|(c, m)| Op::AddIf(c, m)),
        (any::<bool>(), message()).prop_map(|(c, m)| Op::Ensure(c, m)),
    ]
}

// ============================================================================
// HAS_ERRORS: true iff an appended message is an ERROR
// ============================================================================

proptest! {
    #[test]
    fn has_errors_iff_error_appended(ops in prop::collection::vec(op(), 0..40)) {
        let mut validator = Validator::default();
        let mut appended = Vec::new();

        for op in ops {
            match op {
                Op::Add(m) => {
                    appended.push(m.clone());
                    validator.add(m);
                }
                Op::AddIf(c, m) => {
                    if c {
                        appended.push(m.clone());
                    }
                    validator.add_if(c, m);
                }
                Op::Ensure(c, m) => {
                    if !c {
                        appended.push(m.clone());
                    }
                    validator.ensure(c, m);
                }
            }
        }

        prop_assert_eq!(validator.has_errors(), appended.iter().any(Message::is_error));
        prop_assert_eq!(validator.messages().as_slice(), appended.as_slice());
    }
}

// ============================================================================
// CONDITIONAL ADDS
// ============================================================================

proptest! {
    #[test]
    fn inactive_conditionals_never_mutate(m in message()) {
        let mut validator = Validator::default();
        validator.add_if(false, m.clone());
        validator.ensure(true, m);
        prop_assert!(validator.messages().is_empty());
    }

    #[test]
    fn active_conditionals_append_exactly_once(m in message()) {
        let mut validator = Validator::default();
        validator.add_if(true, m.clone());
        prop_assert_eq!(validator.messages().as_slice(), std::slice::from_ref(&m));
        validator.ensure(false, m.clone());
        prop_assert_eq!(validator.messages().len(), 2);
        prop_assert_eq!(validator.messages().all().last(), Some(&m));
    }
}

// ============================================================================
// QUERIES: order preserving, idempotent
// ============================================================================

proptest! {
    #[test]
    fn by_category_preserves_order(messages in prop::collection::vec(message(), 0..30)) {
        let store: MessageStore = messages.iter().cloned().collect();
        for category in ["a.x", "b.y", "c.z"] {
            let expected: Vec<_> = messages.iter().filter(|m| m.category() == category).collect();
            let actual: Vec<_> = store.by_category(category).collect();
            prop_assert_eq!(actual, expected);
        }
        prop_assert_eq!(store.by_category("never.added").count(), 0);
    }

    #[test]
    fn queries_are_idempotent(messages in prop::collection::vec(message(), 0..30), s in severity()) {
        let store: MessageStore = messages.into_iter().collect();

        let all_1: Vec<_> = store.all().collect();
        let all_2: Vec<_> = store.all().collect();
        prop_assert_eq!(all_1, all_2);

        let sev_1: Vec<_> = store.by_severity(s).collect();
        let sev_2: Vec<_> = store.by_severity(s).collect();
        prop_assert_eq!(&sev_1, &sev_2);
        prop_assert_eq!(sev_1.len(), store.count(s));

        let cat_1: Vec<_> = store.by_category("a.x").collect();
        let cat_2: Vec<_> = store.by_category("a.x").collect();
        prop_assert_eq!(cat_1, cat_2);
    }
}
