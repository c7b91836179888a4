// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Identifiers, phases and event kinds

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Id of an HTTP exchange, stable across redirects and phases
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

/// Id of a browsing context (tab or frame)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub String);

/// Id of a registered intercept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterceptId(pub Uuid);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        RequestId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ContextId {
    pub fn new(id: impl Into<String>) -> Self {
        ContextId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl InterceptId {
    /// Fresh random id
    pub fn generate() -> Self {
        InterceptId(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for InterceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        RequestId(id.to_string())
    }
}

impl From<&str> for ContextId {
    fn from(id: &str) -> Self {
        ContextId(id.to_string())
    }
}

/// Point in an exchange's lifecycle where it can be suspended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    BeforeRequestSent,
    ResponseStarted,
    AuthRequired,
}

impl Phase {
    /// Protocol name of the phase
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::BeforeRequestSent => "beforeRequestSent",
            Phase::ResponseStarted => "responseStarted",
            Phase::AuthRequired => "authRequired",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw network lifecycle notification / protocol event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    BeforeRequestSent,
    ResponseStarted,
    ResponseCompleted,
    FetchError,
    AuthRequired,
}

impl EventKind {
    /// Every event kind, in lifecycle order
    pub const ALL: [EventKind; 5] = [
        EventKind::BeforeRequestSent,
        EventKind::AuthRequired,
        EventKind::ResponseStarted,
        EventKind::ResponseCompleted,
        EventKind::FetchError,
    ];

    /// Interceptable phase for this event, if any
    pub fn phase(self) -> Option<Phase> {
        match self {
            EventKind::BeforeRequestSent => Some(Phase::BeforeRequestSent),
            EventKind::ResponseStarted => Some(Phase::ResponseStarted),
            EventKind::AuthRequired => Some(Phase::AuthRequired),
            EventKind::ResponseCompleted | EventKind::FetchError => None,
        }
    }

    /// Protocol event name
    pub fn method(self) -> &'static str {
        match self {
            EventKind::BeforeRequestSent => "network.beforeRequestSent",
            EventKind::ResponseStarted => "network.responseStarted",
            EventKind::ResponseCompleted => "network.responseCompleted",
            EventKind::FetchError => "network.fetchError",
            EventKind::AuthRequired => "network.authRequired",
        }
    }

    /// Parse a protocol event name
    pub fn from_method(method: &str) -> Option<Self> {
        EventKind::ALL.into_iter().find(|kind| kind.method() == method)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_mapping() {
        assert_eq!(EventKind::BeforeRequestSent.phase(), Some(Phase::BeforeRequestSent));
        assert_eq!(EventKind::AuthRequired.phase(), Some(Phase::AuthRequired));
        assert_eq!(EventKind::ResponseCompleted.phase(), None);
        assert_eq!(EventKind::FetchError.phase(), None);
    }

    #[test]
    fn test_method_names() {
        assert_eq!(
            EventKind::from_method("network.responseStarted"),
            Some(EventKind::ResponseStarted)
        );
        assert_eq!(EventKind::from_method("network.unknown"), None);
    }

    #[test]
    fn test_phase_wire_names() {
        let phase: Phase = serde_json::from_str("\"beforeRequestSent\"").unwrap();
        assert_eq!(phase, Phase::BeforeRequestSent);
        assert!(serde_json::from_str::<Phase>("\"responseCompleted\"").is_err());
    }

    #[test]
    fn test_intercept_ids_are_unique() {
        assert_ne!(InterceptId::generate(), InterceptId::generate());
    }
}
