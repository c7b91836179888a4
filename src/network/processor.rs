// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Raw notification processing
//!
//! Every notification from the network stack goes through [`EventProcessor::process`]:
//! redirect replay suppression, context resolution, subscription check,
//! payload construction, intercept matching, suspension and dispatch.
//! Nothing here returns an error to the caller; a notification that cannot
//! be turned into an event is logged and dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use super::blocked::{BlockedExchangeTable, BlockedStage};
use super::config::NetworkConfig;
use super::event::{
    BaseParameters, BeforeRequestSentParameters, FetchErrorParameters, NetworkEvent,
    RequestData, ResponseContent, ResponseData, ResponseParameters,
};
use super::intercept::InterceptRegistry;
use super::subscription::SubscriptionManager;
use super::transport::{ContextRegistry, NetworkNotification, NetworkRequest, NetworkResponse};
use super::types::{ContextId, EventKind, InterceptId, RequestId};
use crate::error::{Error, Result};
use crate::http::{auth_challenges, serialize_headers};

/// Event listener callback type
pub type EventCallback = Arc<dyn Fn(&NetworkEvent) + Send + Sync>;

/// Request ids redirected by `continueRequest`, waiting for their replayed
/// `beforeRequestSent`
pub struct RedirectTracker {
    pending: Mutex<HashMap<RequestId, Instant>>,
    ttl: Duration,
}

impl RedirectTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn mark(&self, request_id: RequestId) {
        self.pending.lock().insert(request_id, Instant::now());
    }

    /// Consume the marker for `request_id`; expired markers are purged
    pub fn consume(&self, request_id: &RequestId) -> bool {
        let mut pending = self.pending.lock();
        let ttl = self.ttl;
        pending.retain(|id, marked| {
            let alive = marked.elapsed() < ttl;
            if !alive {
                tracing::debug!(request = %id, "Redirect marker expired");
            }
            alive
        });
        pending.remove(request_id).is_some()
    }

    pub fn forget(&self, request_id: &RequestId) {
        self.pending.lock().remove(request_id);
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

/// Turns raw notifications into protocol events
pub struct EventProcessor {
    config: NetworkConfig,
    contexts: Arc<dyn ContextRegistry>,
    intercepts: Arc<InterceptRegistry>,
    blocked: Arc<BlockedExchangeTable>,
    subscriptions: Arc<SubscriptionManager>,
    redirects: Arc<RedirectTracker>,
    listeners: RwLock<Vec<EventCallback>>,
}

impl EventProcessor {
    pub fn new(
        config: NetworkConfig,
        contexts: Arc<dyn ContextRegistry>,
        intercepts: Arc<InterceptRegistry>,
        blocked: Arc<BlockedExchangeTable>,
        subscriptions: Arc<SubscriptionManager>,
        redirects: Arc<RedirectTracker>,
    ) -> Self {
        Self {
            config,
            contexts,
            intercepts,
            blocked,
            subscriptions,
            redirects,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register an event listener
    pub fn on_event(&self, callback: EventCallback) {
        self.listeners.write().push(callback);
    }

    /// Process one raw notification; returns the event that was dispatched
    pub fn process(&self, notification: NetworkNotification) -> Option<NetworkEvent> {
        let kind = notification.kind;
        let request_id = notification.request.request_id();

        if kind == EventKind::BeforeRequestSent && self.redirects.consume(&request_id) {
            tracing::debug!(request = %request_id, "Suppressed replayed beforeRequestSent after redirect");
            return None;
        }

        if kind == EventKind::FetchError {
            self.redirects.forget(&request_id);
            if self.blocked.discard(&request_id) {
                tracing::info!(request = %request_id, "Released blocked exchange after fetch error");
            }
        }

        let top_context = match notification.request.context_id() {
            Some(context) => match self.contexts.get_context(&context) {
                Some(info) => Some(info.top_level),
                None => {
                    tracing::debug!(request = %request_id, context = %context, event = %kind, "Dropped event for closed context");
                    self.forward_unhandled_auth(&notification);
                    return None;
                }
            },
            None => None,
        };

        if !self.subscriptions.has_listener(kind, top_context.as_ref()) {
            tracing::debug!(request = %request_id, event = %kind, "Dropped event without subscribers");
            self.forward_unhandled_auth(&notification);
            return None;
        }

        let url = notification.request.url();
        let mut intercepts = self
            .intercepts
            .matches_for_event(kind, &url, top_context.as_ref());

        if !intercepts.is_empty()
            && kind != EventKind::AuthRequired
            && !notification.request.supports_interception()
        {
            tracing::debug!(request = %request_id, event = %kind, "Transport cannot suspend, not blocking");
            intercepts.clear();
        }
        let is_blocked = !intercepts.is_empty();

        let event = match build_event(&notification, is_blocked, &intercepts) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(request = %request_id, event = %kind, error = %e, "Failed to build network event");
                self.forward_unhandled_auth(&notification);
                return None;
            }
        };

        if is_blocked {
            self.suspend(&notification, intercepts, top_context);
        } else {
            self.forward_unhandled_auth(&notification);
        }

        self.dispatch(&event);
        Some(event)
    }

    fn suspend(
        &self,
        notification: &NetworkNotification,
        intercepts: Vec<InterceptId>,
        top_context: Option<ContextId>,
    ) {
        let stage = match (notification.kind, &notification.response, &notification.auth_callbacks) {
            (EventKind::BeforeRequestSent, _, _) => BlockedStage::Request,
            (EventKind::ResponseStarted, Some(response), _) => BlockedStage::Response {
                response: response.clone(),
            },
            (EventKind::AuthRequired, Some(response), Some(callbacks)) => BlockedStage::Auth {
                response: response.clone(),
                callbacks: callbacks.clone(),
            },
            _ => return,
        };

        // Auth prompts are already suspended by the platform
        if !matches!(stage, BlockedStage::Auth { .. }) {
            notification.request.suspend();
        }

        self.blocked
            .block(notification.request.clone(), stage, intercepts, top_context);
    }

    fn forward_unhandled_auth(&self, notification: &NetworkNotification) {
        if notification.kind != EventKind::AuthRequired || !self.config.forward_unblocked_auth {
            return;
        }
        if let Some(ref callbacks) = notification.auth_callbacks {
            tracing::debug!(request = %notification.request.request_id(), "Forwarding unblocked auth prompt");
            callbacks.forward_auth_prompt();
        }
    }

    fn dispatch(&self, event: &NetworkEvent) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener(event);
        }
    }
}

fn build_event(
    notification: &NetworkNotification,
    is_blocked: bool,
    intercepts: &[InterceptId],
) -> Result<NetworkEvent> {
    let request = notification.request.as_ref();
    let base = BaseParameters {
        context: request.context_id(),
        is_blocked,
        navigation: request.navigation_id(),
        redirect_count: request.redirect_count(),
        request: request_data(request),
        timestamp: chrono::Utc::now().timestamp_millis(),
        intercepts: is_blocked.then(|| intercepts.to_vec()),
    };

    let response = || -> Result<ResponseData> {
        notification
            .response
            .as_ref()
            .map(|response| response_data(response.as_ref()))
            .ok_or_else(|| Error::other(format!("{} without a response", notification.kind)))
    };

    Ok(match notification.kind {
        EventKind::BeforeRequestSent => {
            NetworkEvent::BeforeRequestSent(BeforeRequestSentParameters {
                base,
                initiator: request.initiator(),
            })
        }
        EventKind::ResponseStarted => NetworkEvent::ResponseStarted(ResponseParameters {
            base,
            response: response()?,
        }),
        EventKind::ResponseCompleted => NetworkEvent::ResponseCompleted(ResponseParameters {
            base,
            response: response()?,
        }),
        EventKind::AuthRequired => {
            if notification.auth_callbacks.is_none() {
                return Err(Error::other("authRequired without auth callbacks"));
            }
            NetworkEvent::AuthRequired(ResponseParameters {
                base,
                response: response()?,
            })
        }
        EventKind::FetchError => NetworkEvent::FetchError(FetchErrorParameters {
            base,
            error_text: notification.error_text.clone().unwrap_or_default(),
        }),
    })
}

/// Request projection for an event
pub fn request_data(request: &dyn NetworkRequest) -> RequestData {
    RequestData {
        request: request.request_id(),
        url: request.url(),
        method: request.method(),
        headers: serialize_headers(&request.headers()),
        cookies: request.cookies(),
        headers_size: request.headers_size(),
        body_size: request.body_size(),
        destination: request.destination(),
        initiator_type: request.initiator_type(),
        timings: request.timings(),
    }
}

/// Response projection for an event
pub fn response_data(response: &dyn NetworkResponse) -> ResponseData {
    let headers = response.headers();
    let status = response.status();
    ResponseData {
        url: response.url(),
        protocol: response.protocol(),
        status,
        status_text: response.status_text(),
        from_cache: response.from_cache(),
        mime_type: response.mime_type(),
        bytes_received: response.bytes_received(),
        headers_size: response.headers_size(),
        body_size: response.body_size(),
        content: ResponseContent {
            size: response.content_size(),
        },
        auth_challenges: auth_challenges(status, &headers),
        headers: serialize_headers(&headers),
    }
}
