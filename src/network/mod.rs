// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interception
//!
//! Observes every HTTP exchange at defined lifecycle points and lets the
//! automation client suspend, mutate, redirect, answer or fail it.

mod blocked;
mod config;
mod continuation;
mod event;
mod intercept;
pub mod memory;
mod module;
mod processor;
mod subscription;
mod transport;
mod types;

pub use blocked::{BlockedExchange, BlockedExchangeTable, BlockedStage, ClaimedExchange, Resolution};
pub use config::{CacheBehavior, NetworkConfig};
pub use continuation::{
    AuthAction, AuthCredentials, ContinuationOutcome, ContinueRequestParameters,
    ContinueResponseParameters, ContinueWithAuthParameters, Continuations, FailRequestParameters,
    ProvideResponseParameters,
};
pub use event::{
    BaseParameters, BeforeRequestSentParameters, FetchErrorParameters, FetchTimingInfo,
    Initiator, InitiatorType, NetworkEvent, RequestData, ResponseContent, ResponseData,
    ResponseParameters,
};
pub use intercept::{Intercept, InterceptRegistry};
pub use module::{
    AddInterceptParameters, AddInterceptResult, NetworkModule, RemoveInterceptParameters,
    SetCacheBehaviorParameters,
};
pub use processor::{request_data, response_data, EventCallback, EventProcessor, RedirectTracker};
pub use subscription::{SubscriptionId, SubscriptionManager};
pub use transport::{
    AuthCallbacks, BrowsingContextInfo, ContextRegistry, NetworkNotification, NetworkRequest,
    NetworkResponse, RawNetworkListener, SyntheticResponse,
};
pub use types::{ContextId, EventKind, InterceptId, Phase, RequestId};
