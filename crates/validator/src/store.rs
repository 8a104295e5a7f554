//! Append-only, insertion-ordered message collection

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::message::{Message, Severity};

/// Ordered multiset of [`Message`]s for one request.
///
/// Messages keep their insertion order and are never deduplicated. There is
/// no removal: the store only grows until the request ends.
///
/// Query methods return borrowing iterators that are `Clone`, so a view can
/// be walked again without re-querying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStore {
    messages: Vec<Message>,
    counts: [usize; 4],
}

impl MessageStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            counts: [0; 4],
        }
    }

    /// Appends a message. The category is not checked.
    pub fn add(&mut self, message: Message) {
        self.counts[message.severity().index()] += 1;
        self.messages.push(message);
    }

    /// Appends every message, keeping their order.
    pub fn extend<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = Message>,
    {
        for message in messages {
            self.add(message);
        }
    }

    /// All messages in insertion order.
    pub fn all(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Messages with the given severity, in insertion order.
    pub fn by_severity(
        &self,
        severity: Severity,
    ) -> impl Iterator<Item = &Message> + Clone + '_ {
        self.messages
            .iter()
            .filter(move |m| m.severity() == severity)
    }

    /// Messages whose category equals `category` exactly, in insertion order.
    ///
    /// An unknown category yields an empty iterator.
    pub fn by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a Message> + Clone + 'a {
        self.messages
            .iter()
            .filter(move |m| m.category() == category)
    }

    /// Returns true if at least one message has the given severity.
    #[must_use]
    pub fn has_severity(&self, severity: Severity) -> bool {
        self.count(severity) > 0
    }

    /// Number of messages with the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.counts[severity.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages grouped by severity.
    ///
    /// Only severities that occur are present; keys follow [`Severity::ALL`].
    #[must_use]
    pub fn grouped_by_severity(&self) -> IndexMap<Severity, Vec<&Message>> {
        let mut groups = IndexMap::new();
        for severity in Severity::ALL {
            if self.has_severity(severity) {
                groups.insert(severity, self.by_severity(severity).collect());
            }
        }
        groups
    }

    /// Messages grouped by category, keys in order of first appearance.
    #[must_use]
    pub fn grouped_by_category(&self) -> IndexMap<&str, Vec<&Message>> {
        let mut groups: IndexMap<&str, Vec<&Message>> = IndexMap::new();
        for message in &self.messages {
            groups.entry(message.category()).or_default().push(message);
        }
        groups
    }

    /// Borrowed slice of every message.
    #[must_use]
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    /// Consumes the store and returns its messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl FromIterator<Message> for MessageStore {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<'a> IntoIterator for &'a MessageStore {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

// Serialized as a plain array; the counts are derived data.
impl Serialize for MessageStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.messages.serialize(serializer)
    }
}
