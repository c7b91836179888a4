// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network event payloads

use serde::{Deserialize, Serialize};

use super::types::{ContextId, EventKind, InterceptId, RequestId};
use crate::http::{AuthChallenge, Cookie, Header};

/// Protocol event emitted to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum NetworkEvent {
    #[serde(rename = "network.beforeRequestSent")]
    BeforeRequestSent(BeforeRequestSentParameters),
    #[serde(rename = "network.responseStarted")]
    ResponseStarted(ResponseParameters),
    #[serde(rename = "network.responseCompleted")]
    ResponseCompleted(ResponseParameters),
    #[serde(rename = "network.fetchError")]
    FetchError(FetchErrorParameters),
    #[serde(rename = "network.authRequired")]
    AuthRequired(ResponseParameters),
}

/// Parameters shared by every network event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseParameters {
    /// Browsing context that issued the request
    pub context: Option<ContextId>,
    /// Whether the exchange is suspended waiting for a continuation command
    pub is_blocked: bool,
    /// Navigation id when the request is a navigation
    pub navigation: Option<String>,
    /// Number of redirects followed so far
    pub redirect_count: u32,
    /// Request projection
    pub request: RequestData,
    /// Milliseconds since the epoch
    pub timestamp: i64,
    /// Intercepts that blocked the exchange, only present when blocked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intercepts: Option<Vec<InterceptId>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeforeRequestSentParameters {
    #[serde(flatten)]
    pub base: BaseParameters,
    pub initiator: Initiator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseParameters {
    #[serde(flatten)]
    pub base: BaseParameters,
    pub response: ResponseData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchErrorParameters {
    #[serde(flatten)]
    pub base: BaseParameters,
    pub error_text: String,
}

/// Request projection, rebuilt for every event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestData {
    pub request: RequestId,
    pub url: String,
    pub method: String,
    pub headers: Vec<Header>,
    pub cookies: Vec<Cookie>,
    pub headers_size: u64,
    pub body_size: Option<u64>,
    pub destination: String,
    pub initiator_type: Option<InitiatorType>,
    pub timings: FetchTimingInfo,
}

/// Response projection, rebuilt for every event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub url: String,
    pub protocol: String,
    pub status: u16,
    pub status_text: String,
    pub from_cache: bool,
    pub headers: Vec<Header>,
    pub mime_type: String,
    pub bytes_received: u64,
    pub headers_size: Option<u64>,
    pub body_size: Option<u64>,
    pub content: ResponseContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_challenges: Option<Vec<AuthChallenge>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseContent {
    pub size: Option<u64>,
}

/// What caused the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiator {
    #[serde(rename = "type")]
    pub initiator_type: InitiatorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestId>,
}

impl Default for Initiator {
    fn default() -> Self {
        Self {
            initiator_type: InitiatorType::Other,
            request: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitiatorType {
    /// Document parser
    Parser,
    /// Script (fetch, XHR, ...)
    Script,
    /// CORS preflight
    Preflight,
    /// Anything else
    Other,
}

/// Request timing breakdown (similar to PerformanceResourceTiming), all in
/// milliseconds relative to `time_origin`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchTimingInfo {
    pub time_origin: f64,
    pub request_time: f64,
    pub redirect_start: f64,
    pub redirect_end: f64,
    pub fetch_start: f64,
    pub dns_start: f64,
    pub dns_end: f64,
    pub connect_start: f64,
    pub connect_end: f64,
    pub tls_start: f64,
    pub request_start: f64,
    pub response_start: f64,
    pub response_end: f64,
}

impl NetworkEvent {
    /// Event kind
    pub fn kind(&self) -> EventKind {
        match self {
            NetworkEvent::BeforeRequestSent(_) => EventKind::BeforeRequestSent,
            NetworkEvent::ResponseStarted(_) => EventKind::ResponseStarted,
            NetworkEvent::ResponseCompleted(_) => EventKind::ResponseCompleted,
            NetworkEvent::FetchError(_) => EventKind::FetchError,
            NetworkEvent::AuthRequired(_) => EventKind::AuthRequired,
        }
    }

    /// Protocol event name
    pub fn method(&self) -> &'static str {
        self.kind().method()
    }

    /// Shared parameters
    pub fn base(&self) -> &BaseParameters {
        match self {
            NetworkEvent::BeforeRequestSent(p) => &p.base,
            NetworkEvent::ResponseStarted(p)
            | NetworkEvent::ResponseCompleted(p)
            | NetworkEvent::AuthRequired(p) => &p.base,
            NetworkEvent::FetchError(p) => &p.base,
        }
    }

    /// Request id of the exchange
    pub fn request_id(&self) -> &RequestId {
        &self.base().request.request
    }

    /// Whether the exchange is waiting for a continuation command
    pub fn is_blocked(&self) -> bool {
        self.base().is_blocked
    }

    /// Response data, if the event carries one
    pub fn response(&self) -> Option<&ResponseData> {
        match self {
            NetworkEvent::ResponseStarted(p)
            | NetworkEvent::ResponseCompleted(p)
            | NetworkEvent::AuthRequired(p) => Some(&p.response),
            _ => None,
        }
    }

    /// Check if the response was successful
    pub fn is_success(&self) -> bool {
        self.response()
            .map(|r| r.status >= 200 && r.status < 300)
            .unwrap_or(false)
    }
}

impl ResponseData {
    /// Check if redirect
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}
