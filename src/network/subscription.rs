// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event subscriptions
//!
//! Tracks which network events the client wants, and for which top-level
//! contexts. The raw network listener runs while at least one subscription
//! references at least one network event.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transport::{ContextRegistry, RawNetworkListener};
use super::types::{ContextId, EventKind};
use crate::error::{Error, Result};

/// Module name that subscribes to every network event at once
pub const MODULE_NAME: &str = "network";

/// Id of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Subscription {
    events: HashSet<EventKind>,
    /// Top-level contexts; `None` for a session-wide subscription
    contexts: Option<HashSet<ContextId>>,
}

#[derive(Default)]
struct State {
    subscriptions: HashMap<SubscriptionId, Subscription>,
    /// Live subscriptions per event kind
    counts: HashMap<EventKind, usize>,
    listening: bool,
}

impl State {
    fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Reference-counted subscriptions driving the raw listener
pub struct SubscriptionManager {
    state: Mutex<State>,
    listener: Arc<dyn RawNetworkListener>,
    contexts: Arc<dyn ContextRegistry>,
}

impl SubscriptionManager {
    pub fn new(listener: Arc<dyn RawNetworkListener>, contexts: Arc<dyn ContextRegistry>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            listener,
            contexts,
        }
    }

    /// Subscribe to event names (`"network"` or `"network.<event>"`)
    pub fn subscribe_names(
        &self,
        names: &[String],
        contexts: Option<Vec<ContextId>>,
    ) -> Result<SubscriptionId> {
        let mut events = Vec::new();
        for name in names {
            if name == MODULE_NAME {
                events.extend(EventKind::ALL);
            } else {
                let kind = EventKind::from_method(name).ok_or_else(|| {
                    Error::invalid_argument(format!("Unknown network event: {}", name))
                })?;
                events.push(kind);
            }
        }
        self.subscribe(&events, contexts)
    }

    /// Subscribe to events, optionally scoped to contexts
    ///
    /// Context ids are resolved to their top-level context.
    pub fn subscribe(
        &self,
        events: &[EventKind],
        contexts: Option<Vec<ContextId>>,
    ) -> Result<SubscriptionId> {
        if events.is_empty() {
            return Err(Error::invalid_argument(
                "Expected \"events\" to be a non-empty array",
            ));
        }

        let contexts = match contexts {
            Some(ids) => {
                let mut top_level = HashSet::new();
                for id in ids {
                    let info = self
                        .contexts
                        .get_context(&id)
                        .ok_or_else(|| Error::no_such_frame(id.to_string()))?;
                    top_level.insert(info.top_level);
                }
                Some(top_level)
            }
            None => None,
        };

        let id = SubscriptionId(Uuid::new_v4());
        let subscription = Subscription {
            events: events.iter().copied().collect(),
            contexts,
        };

        let mut state = self.state.lock();
        for kind in &subscription.events {
            *state.counts.entry(*kind).or_insert(0) += 1;
        }
        tracing::debug!(subscription = %id, events = ?subscription.events, "Subscribed");
        state.subscriptions.insert(id, subscription);
        self.update_listener(&mut state);

        Ok(id)
    }

    pub fn unsubscribe(&self, id: &SubscriptionId) -> Result<()> {
        let mut state = self.state.lock();
        let subscription = state
            .subscriptions
            .remove(id)
            .ok_or_else(|| Error::invalid_argument(format!("No such subscription: {}", id)))?;

        for kind in &subscription.events {
            if let Some(count) = state.counts.get_mut(kind) {
                *count = count.saturating_sub(1);
            }
        }
        state.counts.retain(|_, count| *count > 0);
        tracing::debug!(subscription = %id, "Unsubscribed");
        self.update_listener(&mut state);

        Ok(())
    }

    /// Drop a destroyed context from every scoped subscription
    ///
    /// Subscriptions left without any context are removed.
    pub fn remove_context(&self, context: &ContextId) {
        let mut state = self.state.lock();
        let mut emptied = Vec::new();
        for (id, subscription) in state.subscriptions.iter_mut() {
            if let Some(ref mut contexts) = subscription.contexts {
                if contexts.remove(context) && contexts.is_empty() {
                    emptied.push(*id);
                }
            }
        }

        for id in emptied {
            if let Some(subscription) = state.subscriptions.remove(&id) {
                for kind in &subscription.events {
                    if let Some(count) = state.counts.get_mut(kind) {
                        *count = count.saturating_sub(1);
                    }
                }
            }
        }
        state.counts.retain(|_, count| *count > 0);
        self.update_listener(&mut state);
    }

    /// Whether anyone listens to `kind` within `top_context`
    pub fn has_listener(&self, kind: EventKind, top_context: Option<&ContextId>) -> bool {
        let state = self.state.lock();
        if !state.counts.contains_key(&kind) {
            return false;
        }

        state.subscriptions.values().any(|s| {
            s.events.contains(&kind)
                && match (&s.contexts, top_context) {
                    (None, _) => true,
                    (Some(contexts), Some(context)) => contexts.contains(context),
                    (Some(_), None) => false,
                }
        })
    }

    pub fn is_listening(&self) -> bool {
        self.state.lock().listening
    }

    pub fn subscription_count(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    fn update_listener(&self, state: &mut State) {
        let wanted = state.total() > 0;
        if wanted == state.listening {
            return;
        }

        state.listening = wanted;
        if wanted {
            tracing::debug!("Starting raw network listener");
            self.listener.start();
        } else {
            tracing::debug!("Stopping raw network listener");
            self.listener.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::memory::{MemoryContextRegistry, MemoryListener};

    fn manager() -> (Arc<MemoryListener>, SubscriptionManager) {
        let listener = Arc::new(MemoryListener::new());
        let contexts = Arc::new(MemoryContextRegistry::new());
        contexts.add_top_level("tab-1");
        contexts.add_top_level("tab-2");
        contexts.add_child("frame-1", "tab-1");
        (listener.clone(), SubscriptionManager::new(listener, contexts))
    }

    #[test]
    fn test_listener_reference_counting() {
        let (listener, manager) = manager();
        assert!(!manager.is_listening());

        let a = manager
            .subscribe(&[EventKind::BeforeRequestSent], None)
            .unwrap();
        let b = manager
            .subscribe(&[EventKind::ResponseStarted, EventKind::FetchError], None)
            .unwrap();
        assert!(manager.is_listening());
        assert_eq!(listener.starts(), 1);

        manager.unsubscribe(&a).unwrap();
        assert!(manager.is_listening());

        manager.unsubscribe(&b).unwrap();
        assert!(!manager.is_listening());
        assert_eq!(listener.stops(), 1);
    }

    #[test]
    fn test_subscribe_module_name() {
        let (_, manager) = manager();
        manager
            .subscribe_names(&["network".to_string()], None)
            .unwrap();
        for kind in EventKind::ALL {
            assert!(manager.has_listener(kind, None));
        }
        assert!(manager
            .subscribe_names(&["network.nope".to_string()], None)
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_scoped_subscription() {
        let (_, manager) = manager();
        manager
            .subscribe(&[EventKind::AuthRequired], Some(vec!["frame-1".into()]))
            .unwrap();

        let tab1 = ContextId::new("tab-1");
        let tab2 = ContextId::new("tab-2");
        assert!(manager.has_listener(EventKind::AuthRequired, Some(&tab1)));
        assert!(!manager.has_listener(EventKind::AuthRequired, Some(&tab2)));
        assert!(!manager.has_listener(EventKind::AuthRequired, None));
        assert!(!manager.has_listener(EventKind::ResponseStarted, Some(&tab1)));
    }

    #[test]
    fn test_subscribe_unknown_context() {
        let (_, manager) = manager();
        let err = manager
            .subscribe(&[EventKind::FetchError], Some(vec!["gone".into()]))
            .unwrap_err();
        assert_eq!(err.code(), "no such frame");
        assert!(!manager.is_listening());
    }

    #[test]
    fn test_remove_context_drops_empty_subscriptions() {
        let (listener, manager) = manager();
        manager
            .subscribe(&[EventKind::FetchError], Some(vec!["tab-2".into()]))
            .unwrap();
        assert!(manager.is_listening());

        manager.remove_context(&ContextId::new("tab-2"));
        assert_eq!(manager.subscription_count(), 0);
        assert!(!manager.is_listening());
        assert_eq!(listener.stops(), 1);
    }
}
