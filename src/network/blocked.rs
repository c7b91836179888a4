// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Table of suspended exchanges
//!
//! An entry is created when an event matches at least one intercept and is
//! removed by exactly one claim. Continuation commands peek at the entry,
//! validate their arguments against it, then claim it; a claim only
//! succeeds against the generation that was peeked, so two racing commands
//! cannot both resolve the same suspension.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;

use super::transport::{AuthCallbacks, NetworkRequest, NetworkResponse};
use super::types::{ContextId, InterceptId, Phase, RequestId};
use crate::error::{Error, Result};

/// Handles held by a blocked exchange, one shape per phase
#[derive(Clone)]
pub enum BlockedStage {
    Request,
    Response {
        response: Arc<dyn NetworkResponse>,
    },
    Auth {
        response: Arc<dyn NetworkResponse>,
        callbacks: Arc<dyn AuthCallbacks>,
    },
}

impl BlockedStage {
    pub fn phase(&self) -> Phase {
        match self {
            BlockedStage::Request => Phase::BeforeRequestSent,
            BlockedStage::Response { .. } => Phase::ResponseStarted,
            BlockedStage::Auth { .. } => Phase::AuthRequired,
        }
    }

    pub fn response(&self) -> Option<&Arc<dyn NetworkResponse>> {
        match self {
            BlockedStage::Request => None,
            BlockedStage::Response { response } | BlockedStage::Auth { response, .. } => {
                Some(response)
            }
        }
    }
}

/// How a blocked exchange was released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Resumed, possibly with mutations
    Continued,
    /// Restarted against another URL
    Redirected,
    /// Aborted by the client
    Failed,
    /// Served a client-provided response
    Provided,
    /// Auth prompt cancelled
    AuthCancelled,
    /// Auth prompt handed back to the platform
    AuthForwarded,
    /// Auth retried with credentials (or cached/none)
    AuthProvided,
    /// Torn down without a continuation command
    Discarded,
}

/// A suspended exchange
#[derive(Clone)]
pub struct BlockedExchange {
    pub request_id: RequestId,
    pub stage: BlockedStage,
    pub request: Arc<dyn NetworkRequest>,
    pub intercepts: Vec<InterceptId>,
    /// Top-level context, used by teardown
    pub top_context: Option<ContextId>,
    pub blocked_at: Instant,
    generation: u64,
}

impl BlockedExchange {
    pub fn phase(&self) -> Phase {
        self.stage.phase()
    }

    pub fn blocked_for(&self) -> Duration {
        self.blocked_at.elapsed()
    }
}

impl std::fmt::Debug for BlockedExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockedExchange")
            .field("request_id", &self.request_id)
            .field("phase", &self.phase())
            .field("intercepts", &self.intercepts)
            .field("top_context", &self.top_context)
            .field("generation", &self.generation)
            .finish()
    }
}

struct Entry {
    exchange: BlockedExchange,
    signal: watch::Sender<Option<Resolution>>,
}

/// Exchange removed from the table and owed exactly one release
///
/// Dropping it without calling [`ClaimedExchange::release`] releases it as
/// [`Resolution::Discarded`].
pub struct ClaimedExchange {
    pub exchange: BlockedExchange,
    signal: Option<watch::Sender<Option<Resolution>>>,
}

impl ClaimedExchange {
    pub fn release(mut self, resolution: Resolution) {
        self.send(resolution);
    }

    fn send(&mut self, resolution: Resolution) {
        if let Some(signal) = self.signal.take() {
            tracing::debug!(
                request = %self.exchange.request_id,
                phase = ?self.exchange.phase(),
                resolution = ?resolution,
                elapsed_ms = self.exchange.blocked_for().as_millis() as u64,
                "Exchange released"
            );
            signal.send_replace(Some(resolution));
        }
    }
}

impl std::fmt::Debug for ClaimedExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimedExchange")
            .field("exchange", &self.exchange)
            .field("released", &self.signal.is_none())
            .finish()
    }
}

impl Drop for ClaimedExchange {
    fn drop(&mut self) {
        self.send(Resolution::Discarded);
    }
}

/// Suspended exchanges keyed by request id
pub struct BlockedExchangeTable {
    entries: DashMap<RequestId, Entry>,
    generation: AtomicU64,
    soft_limit: usize,
}

impl BlockedExchangeTable {
    pub fn new(soft_limit: usize) -> Self {
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            soft_limit,
        }
    }

    /// Register a suspension
    ///
    /// A request id holds at most one live entry. A stale entry still present
    /// for the same id is released as discarded first.
    pub fn block(
        &self,
        request: Arc<dyn NetworkRequest>,
        stage: BlockedStage,
        intercepts: Vec<InterceptId>,
        top_context: Option<ContextId>,
    ) {
        let request_id = request.request_id();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let phase = stage.phase();

        let entry = Entry {
            exchange: BlockedExchange {
                request_id: request_id.clone(),
                stage,
                request,
                intercepts,
                top_context,
                blocked_at: Instant::now(),
                generation,
            },
            signal: watch::Sender::new(None),
        };

        if let Some(stale) = self.entries.insert(request_id.clone(), entry) {
            tracing::warn!(
                request = %request_id,
                phase = ?stale.exchange.phase(),
                "Replacing unresolved blocked exchange"
            );
            stale.signal.send_replace(Some(Resolution::Discarded));
        }

        let blocked = self.entries.len();
        if blocked > self.soft_limit {
            tracing::warn!(blocked, limit = self.soft_limit, "Many exchanges are blocked");
        }

        tracing::debug!(request = %request_id, phase = ?phase, "Exchange blocked");
    }

    /// Snapshot of a blocked exchange
    pub fn peek(&self, request_id: &RequestId) -> Result<BlockedExchange> {
        self.entries
            .get(request_id)
            .map(|entry| entry.exchange.clone())
            .ok_or_else(|| Error::no_such_request(request_id.to_string()))
    }

    /// Remove the exchange that was peeked
    ///
    /// Fails `NoSuchRequest` when it was released or replaced in between.
    pub fn claim(&self, peeked: &BlockedExchange) -> Result<ClaimedExchange> {
        self.entries
            .remove_if(&peeked.request_id, |_, entry| {
                entry.exchange.generation == peeked.generation
            })
            .map(|(_, entry)| ClaimedExchange {
                exchange: entry.exchange,
                signal: Some(entry.signal),
            })
            .ok_or_else(|| Error::no_such_request(peeked.request_id.to_string()))
    }

    /// Release a single exchange without a continuation command
    pub fn discard(&self, request_id: &RequestId) -> bool {
        match self.entries.remove(request_id) {
            Some((_, entry)) => {
                let claimed = ClaimedExchange {
                    exchange: entry.exchange,
                    signal: Some(entry.signal),
                };
                claimed.release(Resolution::Discarded);
                true
            }
            None => false,
        }
    }

    /// Release every exchange matching `predicate`; returns the released ids
    pub fn discard_where<F>(&self, predicate: F) -> Vec<RequestId>
    where
        F: Fn(&BlockedExchange) -> bool,
    {
        let ids: Vec<RequestId> = self
            .entries
            .iter()
            .filter(|entry| predicate(&entry.exchange))
            .map(|entry| entry.key().clone())
            .collect();

        ids.into_iter().filter(|id| self.discard(id)).collect()
    }

    /// Future resolving once the exchange is released
    pub fn wait_for_release(&self, request_id: &RequestId) -> Result<BoxFuture<'static, Resolution>> {
        let mut receiver = self
            .entries
            .get(request_id)
            .map(|entry| entry.signal.subscribe())
            .ok_or_else(|| Error::no_such_request(request_id.to_string()))?;

        Ok(async move {
            loop {
                let current = *receiver.borrow_and_update();
                if let Some(resolution) = current {
                    return resolution;
                }
                if receiver.changed().await.is_err() {
                    let last = *receiver.borrow();
                    return last.unwrap_or(Resolution::Discarded);
                }
            }
        }
        .boxed())
    }

    pub fn contains(&self, request_id: &RequestId) -> bool {
        self.entries.contains_key(request_id)
    }

    pub fn phase_of(&self, request_id: &RequestId) -> Option<Phase> {
        self.entries.get(request_id).map(|e| e.exchange.phase())
    }

    pub fn request_ids(&self) -> Vec<RequestId> {
        let mut ids: Vec<_> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BlockedExchangeTable {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::memory::MemoryRequest;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    fn request(id: &str) -> Arc<MemoryRequest> {
        Arc::new(MemoryRequest::get(id, "https://example.com/"))
    }

    #[test]
    fn test_peek_unknown_request() {
        let table = BlockedExchangeTable::default();
        let err = table.peek(&RequestId::new("1")).unwrap_err();
        assert!(err.is_no_such_request());
    }

    #[test]
    fn test_claim_exactly_once() {
        let table = BlockedExchangeTable::default();
        table.block(request("1"), BlockedStage::Request, vec![], None);

        let peeked = table.peek(&RequestId::new("1")).unwrap();
        assert_eq!(peeked.phase(), Phase::BeforeRequestSent);

        let claimed = table.claim(&peeked).unwrap();
        claimed.release(Resolution::Continued);

        assert!(table.claim(&peeked).unwrap_err().is_no_such_request());
        assert!(table.is_empty());
    }

    #[test]
    fn test_claimed_exchange_debug() {
        let table = BlockedExchangeTable::default();
        table.block(request("4"), BlockedStage::Request, vec![], None);
        let claimed = table.claim(&table.peek(&RequestId::new("4")).unwrap()).unwrap();

        let rendered = format!("{:?}", claimed);
        assert!(rendered.starts_with("ClaimedExchange"));
        assert!(rendered.contains("BlockedExchange"));
        assert!(rendered.contains("released: false"));
        claimed.release(Resolution::Continued);
    }

    #[test]
    fn test_claim_rejects_replaced_generation() {
        let table = BlockedExchangeTable::default();
        table.block(request("1"), BlockedStage::Request, vec![], None);
        let stale = table.peek(&RequestId::new("1")).unwrap();

        table.block(request("1"), BlockedStage::Request, vec![], None);
        assert!(table.claim(&stale).is_err());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_wait_for_release() {
        let table = BlockedExchangeTable::default();
        let id = RequestId::new("9");
        table.block(request("9"), BlockedStage::Request, vec![], None);

        let mut wait = task::spawn(table.wait_for_release(&id).unwrap());
        assert_pending!(wait.poll());

        let peeked = table.peek(&id).unwrap();
        table.claim(&peeked).unwrap().release(Resolution::Failed);

        assert!(wait.is_woken());
        assert_ready_eq!(wait.poll(), Resolution::Failed);
    }

    #[test]
    fn test_dropped_claim_is_discarded() {
        let table = BlockedExchangeTable::default();
        let id = RequestId::new("3");
        table.block(request("3"), BlockedStage::Request, vec![], None);
        let mut wait = task::spawn(table.wait_for_release(&id).unwrap());

        let peeked = table.peek(&id).unwrap();
        drop(table.claim(&peeked).unwrap());

        assert_ready_eq!(wait.poll(), Resolution::Discarded);
    }

    #[test]
    fn test_discard_where() {
        let table = BlockedExchangeTable::default();
        let tab = ContextId::new("tab-1");
        table.block(request("1"), BlockedStage::Request, vec![], Some(tab.clone()));
        table.block(request("2"), BlockedStage::Request, vec![], Some(tab.clone()));
        table.block(request("3"), BlockedStage::Request, vec![], None);

        let mut released = table.discard_where(|e| e.top_context.as_ref() == Some(&tab));
        released.sort();
        assert_eq!(released, vec![RequestId::new("1"), RequestId::new("2")]);
        assert_eq!(table.request_ids(), vec![RequestId::new("3")]);
    }

    #[tokio::test]
    async fn test_wait_across_tasks() {
        let table = Arc::new(BlockedExchangeTable::default());
        let id = RequestId::new("5");
        table.block(request("5"), BlockedStage::Request, vec![], None);
        let wait = table.wait_for_release(&id).unwrap();

        let releaser = {
            let table = table.clone();
            let id = id.clone();
            tokio::spawn(async move {
                let peeked = table.peek(&id).unwrap();
                table.claim(&peeked).unwrap().release(Resolution::Continued);
            })
        };

        assert_eq!(wait.await, Resolution::Continued);
        releaser.await.unwrap();
    }
}
