//! Message model
//!
//! A [`Message`] is an immutable `{category, text, severity}` fact produced
//! while a request is validated. The category is a dot-path
//! (`object.attribute`) used only as a grouping key; the text is already
//! rendered by the time it gets here.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// SEVERITY
// ============================================================================

/// Classification of a [`Message`].
///
/// Only [`Severity::Error`] switches a request onto the error flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks normal execution once the handler checks for errors.
    Error,
    /// Should be addressed, never blocks.
    Warn,
    /// Informational.
    Info,
    /// Confirms that something went through.
    Success,
}

impl Severity {
    /// Every severity, in display order.
    pub const ALL: [Severity; 4] = [
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Success,
    ];

    /// Returns true for [`Severity::Error`].
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Lowercase name, as used in serialized payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Success => "success",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Severity::Error => 0,
            Severity::Warn => 1,
            Severity::Info => 2,
            Severity::Success => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// MESSAGE
// ============================================================================

/// A single validation fact.
///
/// Fields are private: a message cannot change once created.
///
/// # Examples
///
/// ```rust
/// use vigil_validator::{Message, Severity};
///
/// let message = Message::error("cliente.nome", "não pode ser nulo");
/// assert_eq!(message.category(), "cliente.nome");
/// assert_eq!(message.severity(), Severity::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    category: Cow<'static, str>,
    text: Cow<'static, str>,
    severity: Severity,
}

impl Message {
    /// Creates a message with an explicit severity.
    pub fn new(
        category: impl Into<Cow<'static, str>>,
        text: impl Into<Cow<'static, str>>,
        severity: Severity,
    ) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
            severity,
        }
    }

    /// Creates an ERROR message.
    pub fn error(
        category: impl Into<Cow<'static, str>>,
        text: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(category, text, Severity::Error)
    }

    /// Creates a WARN message.
    pub fn warn(
        category: impl Into<Cow<'static, str>>,
        text: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(category, text, Severity::Warn)
    }

    /// Creates an INFO message.
    pub fn info(
        category: impl Into<Cow<'static, str>>,
        text: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(category, text, Severity::Info)
    }

    /// Creates a SUCCESS message.
    pub fn success(
        category: impl Into<Cow<'static, str>>,
        text: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(category, text, Severity::Success)
    }

    /// Grouping key, e.g. `"cliente.nome"`.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Rendered text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The severity; only [`Severity::Error`] affects control flow.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Shorthand for `self.severity().is_error()`.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.text)
    }
}
