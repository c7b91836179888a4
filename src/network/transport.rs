// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Boundary to the platform network stack and context registry
//!
//! The engine never talks to sockets. It reads and mutates exchanges through
//! these traits; the platform implements them on top of its own channels.
//! All methods take `&self`: implementations own their interior mutability.

use std::sync::Arc;

use bytes::Bytes;
use url::Url;

use super::event::{FetchTimingInfo, Initiator, InitiatorType};
use super::types::{ContextId, EventKind, RequestId};
use crate::http::{find_header, headers, parse_cookie_header, Cookie};

/// Outgoing request of one exchange
pub trait NetworkRequest: Send + Sync {
    fn request_id(&self) -> RequestId;

    /// Context that issued the request, `None` for requests without a window
    fn context_id(&self) -> Option<ContextId>;

    fn url(&self) -> String;

    fn method(&self) -> String;

    fn headers(&self) -> Vec<(String, String)>;

    fn redirect_count(&self) -> u32;

    fn cookies(&self) -> Vec<Cookie> {
        let host = Url::parse(&self.url())
            .ok()
            .and_then(|u| u.host_str().map(String::from))
            .unwrap_or_default();
        let request_headers = self.headers();
        find_header(&request_headers, headers::COOKIE)
            .map(|value| parse_cookie_header(value, &host))
            .unwrap_or_default()
    }

    fn headers_size(&self) -> u64 {
        self.headers()
            .iter()
            .map(|(name, value)| (name.len() + value.len() + 4) as u64)
            .sum()
    }

    fn body_size(&self) -> Option<u64> {
        None
    }

    fn destination(&self) -> String {
        String::new()
    }

    fn initiator(&self) -> Initiator {
        Initiator::default()
    }

    fn initiator_type(&self) -> Option<InitiatorType> {
        None
    }

    fn timings(&self) -> FetchTimingInfo {
        FetchTimingInfo::default()
    }

    fn navigation_id(&self) -> Option<String> {
        None
    }

    /// Whether the transport can pause this exchange at all
    fn supports_interception(&self) -> bool {
        true
    }

    fn is_suspended(&self) -> bool;

    /// Pause transport reads/writes; no-op when already suspended
    fn suspend(&self);

    fn resume(&self);

    /// Abort with a blocking reason attributed to the automation client
    fn abort(&self);

    /// Restart the exchange against another URL
    fn redirect_to(&self, url: &Url);

    fn set_method(&self, method: &str);

    fn clear_request_headers(&self);

    /// Set a header; `merge` appends to an existing value instead of replacing
    fn set_request_header(&self, name: &str, value: &str, merge: bool);

    fn set_request_body(&self, body: Bytes);

    /// Serve `response` instead of contacting the origin
    fn set_response_override(&self, response: SyntheticResponse);
}

/// Response of one exchange, once headers were received
pub trait NetworkResponse: Send + Sync {
    fn url(&self) -> String;

    fn protocol(&self) -> String;

    fn status(&self) -> u16;

    fn status_text(&self) -> String;

    fn headers(&self) -> Vec<(String, String)>;

    fn from_cache(&self) -> bool {
        false
    }

    fn mime_type(&self) -> String {
        let response_headers = self.headers();
        find_header(&response_headers, headers::CONTENT_TYPE)
            .unwrap_or_default()
            .to_string()
    }

    fn bytes_received(&self) -> u64 {
        0
    }

    fn headers_size(&self) -> Option<u64> {
        None
    }

    fn body_size(&self) -> Option<u64> {
        None
    }

    fn content_size(&self) -> Option<u64> {
        None
    }

    fn set_status(&self, status: u16, reason_phrase: &str);

    /// Set a response header. With `merge` the value is appended to an
    /// existing header of the same name; `Set-Cookie` is never folded and
    /// is always added as its own header line.
    fn set_response_header(&self, name: &str, value: &str, merge: bool);

    fn clear_response_header(&self, name: &str);
}

/// Handles of the platform's pending auth prompt
pub trait AuthCallbacks: Send + Sync {
    fn cancel_auth_prompt(&self);

    /// Let the platform handle the prompt as if nobody intercepted it
    fn forward_auth_prompt(&self);

    /// `None` retries with cached credentials, or none at all
    fn provide_auth_credentials(&self, credentials: Option<(&str, &str)>);
}

/// Resolved browsing context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowsingContextInfo {
    pub id: ContextId,
    pub parent: Option<ContextId>,
    pub top_level: ContextId,
}

impl BrowsingContextInfo {
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }
}

/// Registry of live browsing contexts
pub trait ContextRegistry: Send + Sync {
    fn get_context(&self, id: &ContextId) -> Option<BrowsingContextInfo>;

    fn top_level_contexts(&self) -> Vec<ContextId>;

    fn set_cache_bypass(&self, context: &ContextId, bypass: bool);
}

/// Source of raw network notifications
pub trait RawNetworkListener: Send + Sync {
    fn start(&self);

    fn stop(&self);
}

/// Replacement response installed by `provideResponse`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticResponse {
    pub status: u16,
    pub reason_phrase: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// One raw notification from the network stack
#[derive(Clone)]
pub struct NetworkNotification {
    pub kind: EventKind,
    pub request: Arc<dyn NetworkRequest>,
    pub response: Option<Arc<dyn NetworkResponse>>,
    pub auth_callbacks: Option<Arc<dyn AuthCallbacks>>,
    pub error_text: Option<String>,
}

impl NetworkNotification {
    pub fn before_request_sent(request: Arc<dyn NetworkRequest>) -> Self {
        Self {
            kind: EventKind::BeforeRequestSent,
            request,
            response: None,
            auth_callbacks: None,
            error_text: None,
        }
    }

    pub fn response_started(
        request: Arc<dyn NetworkRequest>,
        response: Arc<dyn NetworkResponse>,
    ) -> Self {
        Self {
            kind: EventKind::ResponseStarted,
            request,
            response: Some(response),
            auth_callbacks: None,
            error_text: None,
        }
    }

    pub fn response_completed(
        request: Arc<dyn NetworkRequest>,
        response: Arc<dyn NetworkResponse>,
    ) -> Self {
        Self {
            kind: EventKind::ResponseCompleted,
            ..Self::response_started(request, response)
        }
    }

    pub fn fetch_error(request: Arc<dyn NetworkRequest>, error_text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::FetchError,
            request,
            response: None,
            auth_callbacks: None,
            error_text: Some(error_text.into()),
        }
    }

    pub fn auth_required(
        request: Arc<dyn NetworkRequest>,
        response: Arc<dyn NetworkResponse>,
        auth_callbacks: Arc<dyn AuthCallbacks>,
    ) -> Self {
        Self {
            kind: EventKind::AuthRequired,
            request,
            response: Some(response),
            auth_callbacks: Some(auth_callbacks),
            error_text: None,
        }
    }
}

impl std::fmt::Debug for NetworkNotification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkNotification")
            .field("kind", &self.kind)
            .field("request", &self.request.request_id())
            .field("has_response", &self.response.is_some())
            .field("has_auth_callbacks", &self.auth_callbacks.is_some())
            .field("error_text", &self.error_text)
            .finish()
    }
}
