// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Kalamari Intercept - Network Interception Engine
//!
//! The layer between a browser's network stack and an automation client.
//! Every HTTP exchange is reported at defined lifecycle points; exchanges
//! matching a registered intercept are suspended until the client continues,
//! mutates, redirects, answers or fails them.
//!
//! ## Features
//!
//! - Intercepts keyed by URL pattern, lifecycle phase and top-level context
//! - Blocked exchange table with exactly-once resolution
//! - Continuation commands: continueRequest, continueResponse,
//!   continueWithAuth, failRequest, provideResponse
//! - Binary-safe header and cookie codec with token validation
//! - JSON command dispatch for an outer RPC channel
//! - In-memory transport for tests and demos
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use kalamari_intercept::network::memory::{MemoryContextRegistry, MemoryListener, MemoryRequest};
//! use kalamari_intercept::{
//!     AddInterceptParameters, ContinueRequestParameters, EventKind, NetworkModule,
//!     NetworkNotification, Phase, RequestId, UrlPattern,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let contexts = Arc::new(MemoryContextRegistry::new());
//!     contexts.add_top_level("tab-1");
//!     let network = NetworkModule::new(contexts, Arc::new(MemoryListener::new()));
//!
//!     network.subscribe(&EventKind::ALL, None)?;
//!     network.add_intercept(
//!         AddInterceptParameters::new(vec![Phase::BeforeRequestSent])
//!             .url_pattern(UrlPattern::pathname("/login")),
//!     )?;
//!
//!     let request = Arc::new(MemoryRequest::get("1", "https://example.com/login").context("tab-1"));
//!     let event = network.process(NetworkNotification::before_request_sent(request));
//!     assert!(event.map(|e| e.is_blocked()).unwrap_or(false));
//!
//!     network.continue_request(ContinueRequestParameters {
//!         request: RequestId::new("1"),
//!         method: Some("POST".to_string()),
//!         ..Default::default()
//!     })?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod network;
pub mod pattern;
pub mod protocol;

// Re-exports for convenience

// Errors
pub use error::{Error, ErrorContext, ErrorResponse, Result};

// Codec
pub use http::{BytesValue, Cookie, CookieHeader, Header, SameSite, SetCookieHeader};
pub use http::{is_valid_header_value, is_valid_http_token};

// Patterns
pub use pattern::{CompiledUrlPattern, PatternParts, UrlPattern};

// Network
pub use network::{
    AddInterceptParameters, AddInterceptResult, AuthAction, AuthCredentials, CacheBehavior,
    ContinuationOutcome, ContinueRequestParameters, ContinueResponseParameters,
    ContinueWithAuthParameters, FailRequestParameters, NetworkConfig, NetworkModule,
    ProvideResponseParameters, RemoveInterceptParameters, SetCacheBehaviorParameters,
};
pub use network::{ContextId, EventKind, InterceptId, Phase, RequestId, Resolution};
pub use network::{NetworkEvent, NetworkNotification};
pub use network::{AuthCallbacks, ContextRegistry, NetworkRequest, NetworkResponse, RawNetworkListener};

// Command dispatch
pub use protocol::ProtocolModule;

/// Kalamari Intercept version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
