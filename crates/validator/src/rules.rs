//! Explicit constraint rules registered against a field path
//!
//! A rule pairs an *expected-good* predicate with the message to record when
//! the predicate does not hold. Message texts are already rendered.
//!
//! ```rust
//! use vigil_validator::{Rules, Validator};
//!
//! struct Cliente {
//!     nome: Option<String>,
//!     idade: u32,
//! }
//!
//! let rules = Rules::new()
//!     .field("cliente.nome", |c: &Cliente| &c.nome, |n: &Option<String>| n.is_some(), "não pode ser nulo")
//!     .rule("cliente.idade", |c: &Cliente| c.idade >= 18, "deve ser maior de idade");
//!
//! let mut validator = Validator::default();
//! validator.check(&Cliente { nome: None, idade: 30 }, &rules);
//! assert!(validator.has_errors());
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::message::{Message, Severity};

// ============================================================================
// CONSTRAINT TRAIT
// ============================================================================

/// Something that inspects a value and may produce a message about it.
pub trait Constraint<T: ?Sized> {
    /// Returns the message to record, or `None` when the value is acceptable.
    fn check(&self, value: &T) -> Option<Message>;
}

impl<T: ?Sized, F> Constraint<T> for F
where
    F: Fn(&T) -> Option<Message>,
{
    fn check(&self, value: &T) -> Option<Message> {
        self(value)
    }
}

// ============================================================================
// RULE
// ============================================================================

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A predicate bound to a category, text and severity.
pub struct Rule<T: ?Sized> {
    category: Cow<'static, str>,
    text: Cow<'static, str>,
    severity: Severity,
    predicate: Predicate<T>,
}

impl<T: ?Sized> Rule<T> {
    pub fn new<P>(
        severity: Severity,
        category: impl Into<Cow<'static, str>>,
        predicate: P,
        text: impl Into<Cow<'static, str>>,
    ) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            category: category.into(),
            text: text.into(),
            severity,
            predicate: Box::new(predicate),
        }
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }
}

impl<T: ?Sized> Constraint<T> for Rule<T> {
    fn check(&self, value: &T) -> Option<Message> {
        if (self.predicate)(value) {
            None
        } else {
            Some(Message::new(
                self.category.clone(),
                self.text.clone(),
                self.severity,
            ))
        }
    }
}

impl<T: ?Sized> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("category", &self.category)
            .field("text", &self.text)
            .field("severity", &self.severity)
            .field("predicate", &"<function>")
            .finish()
    }
}

// ============================================================================
// RULE SET
// ============================================================================

/// Ordered set of constraints for a value of type `T`.
///
/// Constraints run in registration order, so messages for one category
/// stack in the order their rules were added.
pub struct Rules<T: ?Sized> {
    constraints: Vec<Box<dyn Constraint<T> + Send + Sync>>,
}

impl<T: ?Sized + 'static> Rules<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    /// Adds an ERROR rule: `text` is recorded when `predicate` is false.
    pub fn rule<P>(
        self,
        category: impl Into<Cow<'static, str>>,
        predicate: P,
        text: impl Into<Cow<'static, str>>,
    ) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.rule_with(Severity::Error, category, predicate, text)
    }

    /// Adds a rule with an explicit severity.
    pub fn rule_with<P>(
        self,
        severity: Severity,
        category: impl Into<Cow<'static, str>>,
        predicate: P,
        text: impl Into<Cow<'static, str>>,
    ) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.constraint(Rule::new(severity, category, predicate, text))
    }

    /// Adds an ERROR rule over one field, reached through `accessor`.
    pub fn field<U, A, P>(
        self,
        category: impl Into<Cow<'static, str>>,
        accessor: A,
        predicate: P,
        text: impl Into<Cow<'static, str>>,
    ) -> Self
    where
        U: ?Sized,
        A: Fn(&T) -> &U + Send + Sync + 'static,
        P: Fn(&U) -> bool + Send + Sync + 'static,
    {
        self.rule(category, move |value: &T| predicate(accessor(value)), text)
    }

    /// Adds any [`Constraint`] implementation.
    pub fn constraint<C>(mut self, constraint: C) -> Self
    where
        C: Constraint<T> + Send + Sync + 'static,
    {
        self.constraints.push(Box::new(constraint));
        self
    }

    /// Runs every constraint and collects the produced messages.
    #[must_use]
    pub fn evaluate(&self, value: &T) -> Vec<Message> {
        self.constraints
            .iter()
            .filter_map(|constraint| constraint.check(value))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl<T: ?Sized + 'static> Default for Rules<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Rules<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules")
            .field("constraints", &self.constraints.len())
            .finish()
    }
}
