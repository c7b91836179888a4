// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The network module: intercepts, blocked exchanges and their commands

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::blocked::{BlockedExchangeTable, Resolution};
use super::config::{CacheBehavior, NetworkConfig};
use super::continuation::{
    ContinuationOutcome, ContinueRequestParameters, ContinueResponseParameters,
    ContinueWithAuthParameters, Continuations, FailRequestParameters, ProvideResponseParameters,
};
use super::event::NetworkEvent;
use super::intercept::InterceptRegistry;
use super::processor::{EventCallback, EventProcessor, RedirectTracker};
use super::subscription::{SubscriptionId, SubscriptionManager, MODULE_NAME};
use super::transport::{ContextRegistry, NetworkNotification, RawNetworkListener};
use super::types::{ContextId, EventKind, InterceptId, Phase, RequestId};
use crate::error::{Error, ErrorContext, Result};
use crate::pattern::UrlPattern;
use crate::protocol::{parse_params, ProtocolModule};

/// `network.addIntercept` parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddInterceptParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<ContextId>>,
    pub phases: Vec<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_patterns: Option<Vec<UrlPattern>>,
}

impl AddInterceptParameters {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self {
            contexts: None,
            phases,
            url_patterns: None,
        }
    }

    /// Restrict to top-level contexts
    pub fn contexts(mut self, contexts: Vec<ContextId>) -> Self {
        self.contexts = Some(contexts);
        self
    }

    /// Add a URL pattern
    pub fn url_pattern(mut self, pattern: UrlPattern) -> Self {
        self.url_patterns.get_or_insert_with(Vec::new).push(pattern);
        self
    }
}

/// `network.addIntercept` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddInterceptResult {
    pub intercept: InterceptId,
}

/// `network.removeIntercept` parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveInterceptParameters {
    pub intercept: InterceptId,
}

/// `network.setCacheBehavior` parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCacheBehaviorParameters {
    pub cache_behavior: CacheBehavior,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<ContextId>>,
}

struct CacheState {
    default: CacheBehavior,
    overrides: HashMap<ContextId, CacheBehavior>,
}

/// Network interception engine for one session
pub struct NetworkModule {
    contexts: Arc<dyn ContextRegistry>,
    intercepts: Arc<InterceptRegistry>,
    blocked: Arc<BlockedExchangeTable>,
    subscriptions: Arc<SubscriptionManager>,
    redirects: Arc<RedirectTracker>,
    processor: EventProcessor,
    continuations: Continuations,
    cache: RwLock<CacheState>,
}

impl NetworkModule {
    /// Create a network module with the default config
    pub fn new(contexts: Arc<dyn ContextRegistry>, listener: Arc<dyn RawNetworkListener>) -> Self {
        Self::with_config(NetworkConfig::default(), contexts, listener)
    }

    /// Create a network module with a custom config
    pub fn with_config(
        config: NetworkConfig,
        contexts: Arc<dyn ContextRegistry>,
        listener: Arc<dyn RawNetworkListener>,
    ) -> Self {
        let intercepts = Arc::new(InterceptRegistry::new(contexts.clone()));
        let blocked = Arc::new(BlockedExchangeTable::new(config.max_blocked_exchanges));
        let subscriptions = Arc::new(SubscriptionManager::new(listener, contexts.clone()));
        let redirects = Arc::new(RedirectTracker::new(config.redirect_dedup_ttl));
        let continuations = Continuations::new(blocked.clone(), redirects.clone());
        let cache = RwLock::new(CacheState {
            default: config.default_cache_behavior,
            overrides: HashMap::new(),
        });
        let processor = EventProcessor::new(
            config,
            contexts.clone(),
            intercepts.clone(),
            blocked.clone(),
            subscriptions.clone(),
            redirects.clone(),
        );

        Self {
            contexts,
            intercepts,
            blocked,
            subscriptions,
            redirects,
            processor,
            continuations,
            cache,
        }
    }

    /// Register an event listener
    pub fn on_event(&self, callback: EventCallback) {
        self.processor.on_event(callback);
    }

    /// Subscribe to network events
    pub fn subscribe(
        &self,
        events: &[EventKind],
        contexts: Option<Vec<ContextId>>,
    ) -> Result<SubscriptionId> {
        self.subscriptions.subscribe(events, contexts)
    }

    /// Subscribe by event name (`network` or `network.<event>`)
    pub fn subscribe_names(
        &self,
        names: &[String],
        contexts: Option<Vec<ContextId>>,
    ) -> Result<SubscriptionId> {
        self.subscriptions.subscribe_names(names, contexts)
    }

    pub fn unsubscribe(&self, id: &SubscriptionId) -> Result<()> {
        self.subscriptions.unsubscribe(id)
    }

    /// Feed one raw notification from the network stack
    pub fn process(&self, notification: NetworkNotification) -> Option<NetworkEvent> {
        self.processor.process(notification)
    }

    pub fn add_intercept(&self, params: AddInterceptParameters) -> Result<AddInterceptResult> {
        let patterns = params.url_patterns.unwrap_or_default();
        let intercept = self.intercepts.add(params.contexts, params.phases, &patterns)?;
        Ok(AddInterceptResult { intercept })
    }

    pub fn remove_intercept(&self, params: RemoveInterceptParameters) -> Result<()> {
        self.intercepts.remove(&params.intercept)
    }

    pub fn continue_request(&self, params: ContinueRequestParameters) -> Result<()> {
        self.continuations.continue_request(params)
    }

    pub fn continue_response(
        &self,
        params: ContinueResponseParameters,
    ) -> Result<ContinuationOutcome> {
        self.continuations.continue_response(params)
    }

    pub fn continue_with_auth(&self, params: ContinueWithAuthParameters) -> Result<()> {
        self.continuations.continue_with_auth(params)
    }

    pub fn fail_request(&self, params: FailRequestParameters) -> Result<()> {
        self.continuations.fail_request(params)
    }

    pub fn provide_response(&self, params: ProvideResponseParameters) -> Result<()> {
        self.continuations.provide_response(params)
    }

    /// Set cache behavior for the session or for specific top-level contexts
    pub fn set_cache_behavior(&self, params: SetCacheBehaviorParameters) -> Result<()> {
        let behavior = params.cache_behavior;

        match params.contexts {
            None => {
                let mut cache = self.cache.write();
                cache.default = behavior;
                cache.overrides.clear();
                for context in self.contexts.top_level_contexts() {
                    self.contexts.set_cache_bypass(&context, behavior.is_bypass());
                }
                tracing::info!(behavior = ?behavior, "Session cache behavior set");
            }
            Some(ids) => {
                if ids.is_empty() {
                    return Err(Error::invalid_argument(
                        "Expected \"contexts\" to be a non-empty array",
                    ));
                }
                for id in &ids {
                    let info = self
                        .contexts
                        .get_context(id)
                        .ok_or_else(|| Error::no_such_frame(id.to_string()))?;
                    if !info.is_top_level() {
                        return Err(Error::invalid_argument(format!(
                            "Context with id {} is not a top-level browsing context",
                            id
                        )));
                    }
                }

                let mut cache = self.cache.write();
                for id in ids {
                    self.contexts.set_cache_bypass(&id, behavior.is_bypass());
                    tracing::debug!(context = %id, behavior = ?behavior, "Context cache behavior set");
                    cache.overrides.insert(id, behavior);
                }
            }
        }

        Ok(())
    }

    /// Effective cache behavior of a context
    pub fn cache_behavior(&self, context: &ContextId) -> CacheBehavior {
        let top_level = self
            .contexts
            .get_context(context)
            .map(|info| info.top_level)
            .unwrap_or_else(|| context.clone());
        let cache = self.cache.read();
        cache
            .overrides
            .get(&top_level)
            .copied()
            .unwrap_or(cache.default)
    }

    /// Hook for a newly created browsing context
    pub fn on_context_created(&self, context: &ContextId) {
        let behavior = self.cache_behavior(context);
        if behavior.is_bypass() {
            self.contexts.set_cache_bypass(context, true);
        }
    }

    /// Hook for a destroyed browsing context
    ///
    /// Releases every blocked exchange that originated in `context` or whose
    /// top-level context is `context`, so destroying a tab also releases the
    /// exchanges of its frames.
    pub fn on_context_destroyed(&self, context: &ContextId) {
        let released = self.blocked.discard_where(|exchange| {
            exchange.top_context.as_ref() == Some(context)
                || exchange.request.context_id().as_ref() == Some(context)
        });
        for id in &released {
            self.redirects.forget(id);
        }
        if !released.is_empty() {
            tracing::info!(context = %context, released = released.len(), "Released blocked exchanges of destroyed context");
        }

        self.cache.write().overrides.remove(context);
        self.subscriptions.remove_context(context);
    }

    /// Hook for an exchange torn down by the platform
    pub fn on_exchange_closed(&self, request_id: &RequestId) {
        self.redirects.forget(request_id);
        if self.blocked.discard(request_id) {
            tracing::info!(request = %request_id, "Released blocked exchange of closed channel");
        }
    }

    /// Future resolving once a blocked exchange is released
    pub fn wait_for_release(
        &self,
        request_id: &RequestId,
    ) -> Result<BoxFuture<'static, Resolution>> {
        self.blocked.wait_for_release(request_id)
    }

    /// Ids of the currently blocked exchanges
    pub fn blocked_requests(&self) -> Vec<RequestId> {
        self.blocked.request_ids()
    }

    pub fn intercept_count(&self) -> usize {
        self.intercepts.len()
    }

    fn dispatch(&self, method: &str, params: Value) -> Result<Value> {
        match method {
            "network.addIntercept" => {
                let result = self.add_intercept(parse_params(params)?)?;
                serde_json::to_value(result).context("Failed to encode addIntercept result")
            }
            "network.removeIntercept" => {
                self.remove_intercept(parse_params(params)?)?;
                Ok(json!({}))
            }
            "network.continueRequest" => {
                self.continue_request(parse_params(params)?)?;
                Ok(json!({}))
            }
            "network.continueResponse" => {
                self.continue_response(parse_params(params)?)?;
                Ok(json!({}))
            }
            "network.continueWithAuth" => {
                self.continue_with_auth(parse_params(params)?)?;
                Ok(json!({}))
            }
            "network.failRequest" => {
                self.fail_request(parse_params(params)?)?;
                Ok(json!({}))
            }
            "network.provideResponse" => {
                self.provide_response(parse_params(params)?)?;
                Ok(json!({}))
            }
            "network.setCacheBehavior" => {
                self.set_cache_behavior(parse_params(params)?)?;
                Ok(json!({}))
            }
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

#[async_trait]
impl ProtocolModule for NetworkModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn handle_command(&self, method: &str, params: Value) -> Result<Value> {
        tracing::debug!(method, "Handling command");

        let result = self.dispatch(method, params);
        if let Err(ref e) = result {
            if e.is_client_error() {
                tracing::debug!(method, error = %e, "Command rejected");
            } else {
                tracing::error!(method, error = %e, "Command failed");
            }
        }
        result
    }
}
