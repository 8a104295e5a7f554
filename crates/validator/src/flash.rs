//! Flash carrier for messages that must survive one redirect
//!
//! A redirect ends the current request, so its messages travel to the next
//! one through a [`FlashStore`]. Reads are destructive: a carrier is visible
//! to exactly one [`take`](FlashStore::take) and is gone afterwards. An
//! entry nobody reads expires after the configured TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::store::MessageStore;

/// Messages handed from a redirecting request to the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashCarrier {
    messages: Vec<Message>,
}

impl FlashCarrier {
    /// Copies every message out of a store.
    #[must_use]
    pub fn from_store(store: &MessageStore) -> Self {
        Self {
            messages: store.as_slice().to_vec(),
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Rebuilds a store, preserving the original order.
    #[must_use]
    pub fn into_store(self) -> MessageStore {
        self.messages.into_iter().collect()
    }
}

/// Cross-request storage the hosting framework provides, usually backed by
/// its session.
pub trait FlashStore: Send + Sync {
    /// Stores a carrier under `key`, replacing any unread one.
    fn put(&self, key: &str, carrier: FlashCarrier);

    /// Removes and returns the carrier for `key`.
    fn take(&self, key: &str) -> Option<FlashCarrier>;
}

/// In-process [`FlashStore`] keyed by session id.
#[derive(Debug)]
pub struct MemoryFlashStore {
    entries: Mutex<HashMap<String, (Instant, FlashCarrier)>>,
    ttl: Duration,
}

impl MemoryFlashStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Store using the TTL from a [`FlowConfig`](crate::FlowConfig).
    #[must_use]
    pub fn from_config(config: &crate::FlowConfig) -> Self {
        Self::new(config.flash_ttl())
    }

    /// Drops every entry older than the TTL, returning how many were dropped.
    ///
    /// [`put`](FlashStore::put) already does this, so calling it is only
    /// needed to release memory while no redirects happen.
    pub fn purge_expired(&self) -> usize {
        self.purge_locked(&mut self.entries.lock())
    }

    fn purge_locked(&self, entries: &mut HashMap<String, (Instant, FlashCarrier)>) -> usize {
        let before = entries.len();
        entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        let purged = before - entries.len();
        if purged > 0 {
            tracing::debug!(purged, "expired unread flash carriers");
        }
        purged
    }

    /// Number of carriers waiting to be read.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.lock().len()
    }
}

impl Default for MemoryFlashStore {
    fn default() -> Self {
        Self::from_config(&crate::FlowConfig::default())
    }
}

impl FlashStore for MemoryFlashStore {
    /// Stores the carrier and drops every expired unread one.
    fn put(&self, key: &str, carrier: FlashCarrier) {
        tracing::trace!(key, messages = carrier.len(), "flash carrier stored");
        let mut entries = self.entries.lock();
        self.purge_locked(&mut entries);
        entries.insert(key.to_string(), (Instant::now(), carrier));
    }

    fn take(&self, key: &str) -> Option<FlashCarrier> {
        let (stored, carrier) = self.entries.lock().remove(key)?;
        if stored.elapsed() >= self.ttl {
            tracing::debug!(key, "flash carrier expired before it was read");
            return None;
        }
        Some(carrier)
    }
}
