//! Read-only message collections handed to the view layer
//!
//! Two collections are exposed, under names taken from
//! [`FlowConfig`](crate::FlowConfig):
//!
//! - `errors`: ERROR messages only ([`ErrorsView`])
//! - `vmessages`: every severity, split into `errors`, `warnings`, `infos`
//!   and `successes` ([`MessagesView`])
//!
//! Messages flashed by the previous request come first, followed by the ones
//! recorded in this request.
//!
//! ```rust
//! use vigil_validator::{Message, Validator};
//!
//! let mut validator = Validator::default();
//! validator.add(Message::error("cliente.nome", "não pode ser nulo"));
//! validator.add(Message::error("cliente.nome", "não pode ser menor que 50"));
//!
//! assert_eq!(
//!     validator.errors().from("cliente.nome").join(" - "),
//!     "não pode ser nulo - não pode ser menor que 50"
//! );
//! ```

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::message::{Message, Severity};
use crate::store::MessageStore;

static NO_MESSAGES: MessageStore = MessageStore::new();

// ============================================================================
// CATEGORY TEXTS
// ============================================================================

/// Texts of one category, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTexts<'a> {
    texts: Vec<&'a str>,
}

impl<'a> CategoryTexts<'a> {
    /// Concatenates the texts with `separator` between them.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.texts.join(separator)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.texts.iter().copied()
    }

    #[must_use]
    pub fn first(&self) -> Option<&'a str> {
        self.texts.first().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[&'a str] {
        &self.texts
    }
}

impl<'a> IntoIterator for CategoryTexts<'a> {
    type Item = &'a str;
    type IntoIter = std::vec::IntoIter<&'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.texts.into_iter()
    }
}

// ============================================================================
// SEVERITY VIEW
// ============================================================================

/// The messages of a single severity, queried by category.
#[derive(Debug, Clone, Copy)]
pub struct SeverityView<'a> {
    flashed: &'a MessageStore,
    store: &'a MessageStore,
    severity: Severity,
}

/// View over ERROR messages only.
pub type ErrorsView<'a> = SeverityView<'a>;

impl<'a> SeverityView<'a> {
    /// View over a single store.
    #[must_use]
    pub fn new(store: &'a MessageStore, severity: Severity) -> Self {
        Self::with_flashed(&NO_MESSAGES, store, severity)
    }

    /// View over `flashed` followed by `store`.
    #[must_use]
    pub fn with_flashed(
        flashed: &'a MessageStore,
        store: &'a MessageStore,
        severity: Severity,
    ) -> Self {
        Self {
            flashed,
            store,
            severity,
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Texts recorded for `category`; empty when the category never appeared.
    #[must_use]
    pub fn from(&self, category: &str) -> CategoryTexts<'a> {
        CategoryTexts {
            texts: self
                .messages()
                .filter(|m| m.category() == category)
                .map(Message::text)
                .collect(),
        }
    }

    /// Returns true if `category` has at least one message of this severity.
    #[must_use]
    pub fn has(&self, category: &str) -> bool {
        self.messages().any(|m| m.category() == category)
    }

    /// Categories in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<&'a str> {
        self.by_category().into_keys().collect()
    }

    pub fn messages(&self) -> impl Iterator<Item = &'a Message> + Clone + use<'a> {
        self.flashed
            .by_severity(self.severity)
            .chain(self.store.by_severity(self.severity))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flashed.count(self.severity) + self.store.count(self.severity)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn by_category(&self) -> IndexMap<&'a str, Vec<&'a str>> {
        let mut groups: IndexMap<&'a str, Vec<&'a str>> = IndexMap::new();
        for message in self.messages() {
            groups
                .entry(message.category())
                .or_default()
                .push(message.text());
        }
        groups
    }
}

impl Serialize for SeverityView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let groups = self.by_category();
        let mut map = serializer.serialize_map(Some(groups.len()))?;
        for (category, texts) in &groups {
            map.serialize_entry(category, texts)?;
        }
        map.end()
    }
}

// ============================================================================
// MESSAGES VIEW
// ============================================================================

/// Every severity, each as its own [`SeverityView`].
#[derive(Debug, Clone, Copy)]
pub struct MessagesView<'a> {
    flashed: &'a MessageStore,
    store: &'a MessageStore,
}

impl<'a> MessagesView<'a> {
    #[must_use]
    pub fn new(store: &'a MessageStore) -> Self {
        Self::with_flashed(&NO_MESSAGES, store)
    }

    /// View over `flashed` followed by `store`.
    #[must_use]
    pub fn with_flashed(flashed: &'a MessageStore, store: &'a MessageStore) -> Self {
        Self { flashed, store }
    }

    #[must_use]
    pub fn errors(&self) -> SeverityView<'a> {
        SeverityView::with_flashed(self.flashed, self.store, Severity::Error)
    }

    #[must_use]
    pub fn warnings(&self) -> SeverityView<'a> {
        SeverityView::with_flashed(self.flashed, self.store, Severity::Warn)
    }

    #[must_use]
    pub fn infos(&self) -> SeverityView<'a> {
        SeverityView::with_flashed(self.flashed, self.store, Severity::Info)
    }

    #[must_use]
    pub fn successes(&self) -> SeverityView<'a> {
        SeverityView::with_flashed(self.flashed, self.store, Severity::Success)
    }

    #[must_use]
    pub fn severity(&self, severity: Severity) -> SeverityView<'a> {
        SeverityView::with_flashed(self.flashed, self.store, severity)
    }
}

impl Serialize for MessagesView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MessagesView", 4)?;
        state.serialize_field("errors", &self.errors())?;
        state.serialize_field("warnings", &self.warnings())?;
        state.serialize_field("infos", &self.infos())?;
        state.serialize_field("successes", &self.successes())?;
        state.end()
    }
}
