// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-memory transport
//!
//! Implementations of every collaborator trait that keep their state in
//! memory and record each transport operation. Used by the tests and by the
//! demo command of the binary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use url::Url;

use super::event::Initiator;
use super::transport::{
    AuthCallbacks, BrowsingContextInfo, ContextRegistry, NetworkRequest, NetworkResponse,
    RawNetworkListener, SyntheticResponse,
};
use super::types::{ContextId, RequestId};

/// Transport operation recorded by [`MemoryRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOp {
    Suspend,
    Resume,
    Abort,
    RedirectTo(String),
    SetMethod(String),
    ClearHeaders,
    SetHeader { name: String, value: String, merge: bool },
    SetBody(usize),
    Override(u16),
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str, merge: bool) {
    if merge && name.eq_ignore_ascii_case(crate::http::headers::SET_COOKIE) {
        headers.push((name.to_string(), value.to_string()));
        return;
    }
    if merge {
        if let Some((_, existing)) = headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            existing.push_str(", ");
            existing.push_str(value);
            return;
        }
    } else {
        headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }
    headers.push((name.to_string(), value.to_string()));
}

#[derive(Debug)]
struct RequestState {
    url: String,
    method: String,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
    redirect_count: u32,
    suspended: bool,
    aborted: bool,
    response_override: Option<SyntheticResponse>,
    ops: Vec<TransportOp>,
}

/// Request held in memory
#[derive(Debug)]
pub struct MemoryRequest {
    id: RequestId,
    context: Option<ContextId>,
    navigation: Option<String>,
    initiator: Initiator,
    interceptable: bool,
    state: Mutex<RequestState>,
}

impl MemoryRequest {
    pub fn new(id: impl Into<String>, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(id),
            context: None,
            navigation: None,
            initiator: Initiator::default(),
            interceptable: true,
            state: Mutex::new(RequestState {
                url: url.into(),
                method: method.into(),
                headers: Vec::new(),
                body: None,
                redirect_count: 0,
                suspended: false,
                aborted: false,
                response_override: None,
                ops: Vec::new(),
            }),
        }
    }

    pub fn get(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(id, "GET", url)
    }

    /// Set the issuing context
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(ContextId::new(context));
        self
    }

    /// Mark as a navigation request
    pub fn navigation(mut self, navigation: impl Into<String>) -> Self {
        self.navigation = Some(navigation.into());
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.get_mut().headers.push((name.into(), value.into()));
        self
    }

    /// Set whether the transport can be suspended
    pub fn interceptable(mut self, interceptable: bool) -> Self {
        self.interceptable = interceptable;
        self
    }

    /// Suspend without recording an operation, as the platform would
    pub fn suspend_now(&self) {
        self.state.lock().suspended = true;
    }

    pub fn ops(&self) -> Vec<TransportOp> {
        self.state.lock().ops.clone()
    }

    pub fn method_now(&self) -> String {
        self.state.lock().method.clone()
    }

    pub fn url_now(&self) -> String {
        self.state.lock().url.clone()
    }

    pub fn headers_now(&self) -> Vec<(String, String)> {
        self.state.lock().headers.clone()
    }

    pub fn body_now(&self) -> Option<Bytes> {
        self.state.lock().body.clone()
    }

    pub fn is_aborted(&self) -> bool {
        self.state.lock().aborted
    }

    pub fn response_override(&self) -> Option<SyntheticResponse> {
        self.state.lock().response_override.clone()
    }
}

impl NetworkRequest for MemoryRequest {
    fn request_id(&self) -> RequestId {
        self.id.clone()
    }

    fn context_id(&self) -> Option<ContextId> {
        self.context.clone()
    }

    fn url(&self) -> String {
        self.url_now()
    }

    fn method(&self) -> String {
        self.method_now()
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers_now()
    }

    fn redirect_count(&self) -> u32 {
        self.state.lock().redirect_count
    }

    fn body_size(&self) -> Option<u64> {
        self.state.lock().body.as_ref().map(|b| b.len() as u64)
    }

    fn initiator(&self) -> Initiator {
        self.initiator.clone()
    }

    fn navigation_id(&self) -> Option<String> {
        self.navigation.clone()
    }

    fn supports_interception(&self) -> bool {
        self.interceptable
    }

    fn is_suspended(&self) -> bool {
        self.state.lock().suspended
    }

    fn suspend(&self) {
        let mut state = self.state.lock();
        if !state.suspended {
            state.suspended = true;
            state.ops.push(TransportOp::Suspend);
        }
    }

    fn resume(&self) {
        let mut state = self.state.lock();
        state.suspended = false;
        state.ops.push(TransportOp::Resume);
    }

    fn abort(&self) {
        let mut state = self.state.lock();
        state.aborted = true;
        state.ops.push(TransportOp::Abort);
    }

    fn redirect_to(&self, url: &Url) {
        let mut state = self.state.lock();
        state.url = url.to_string();
        state.redirect_count += 1;
        state.ops.push(TransportOp::RedirectTo(url.to_string()));
    }

    fn set_method(&self, method: &str) {
        let mut state = self.state.lock();
        state.method = method.to_string();
        state.ops.push(TransportOp::SetMethod(method.to_string()));
    }

    fn clear_request_headers(&self) {
        let mut state = self.state.lock();
        state.headers.clear();
        state.ops.push(TransportOp::ClearHeaders);
    }

    fn set_request_header(&self, name: &str, value: &str, merge: bool) {
        let mut state = self.state.lock();
        set_header(&mut state.headers, name, value, merge);
        state.ops.push(TransportOp::SetHeader {
            name: name.to_string(),
            value: value.to_string(),
            merge,
        });
    }

    fn set_request_body(&self, body: Bytes) {
        let mut state = self.state.lock();
        state.ops.push(TransportOp::SetBody(body.len()));
        state.body = Some(body);
    }

    fn set_response_override(&self, response: SyntheticResponse) {
        let mut state = self.state.lock();
        state.ops.push(TransportOp::Override(response.status));
        state.response_override = Some(response);
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        407 => "Proxy Authentication Required",
        500 => "Internal Server Error",
        _ => "",
    }
}

#[derive(Debug)]
struct ResponseState {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
}

/// Response held in memory
#[derive(Debug)]
pub struct MemoryResponse {
    url: String,
    protocol: String,
    from_cache: bool,
    state: Mutex<ResponseState>,
}

impl MemoryResponse {
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            protocol: "http/1.1".to_string(),
            from_cache: false,
            state: Mutex::new(ResponseState {
                status,
                status_text: reason_phrase(status).to_string(),
                headers: Vec::new(),
            }),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.get_mut().headers.push((name.into(), value.into()));
        self
    }

    /// Mark as served from cache
    pub fn from_cache(mut self, from_cache: bool) -> Self {
        self.from_cache = from_cache;
        self
    }

    pub fn headers_now(&self) -> Vec<(String, String)> {
        self.state.lock().headers.clone()
    }

    pub fn status_now(&self) -> (u16, String) {
        let state = self.state.lock();
        (state.status, state.status_text.clone())
    }
}

impl NetworkResponse for MemoryResponse {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn protocol(&self) -> String {
        self.protocol.clone()
    }

    fn status(&self) -> u16 {
        self.state.lock().status
    }

    fn status_text(&self) -> String {
        self.state.lock().status_text.clone()
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers_now()
    }

    fn from_cache(&self) -> bool {
        self.from_cache
    }

    fn set_status(&self, status: u16, reason_phrase: &str) {
        let mut state = self.state.lock();
        state.status = status;
        state.status_text = reason_phrase.to_string();
    }

    fn set_response_header(&self, name: &str, value: &str, merge: bool) {
        set_header(&mut self.state.lock().headers, name, value, merge);
    }

    fn clear_response_header(&self, name: &str) {
        self.state
            .lock()
            .headers
            .retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }
}

/// Auth prompt that records which callback was used
#[derive(Debug, Default)]
pub struct MemoryAuthCallbacks {
    calls: Mutex<Vec<String>>,
}

impl MemoryAuthCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// `cancel`, `forward`, `provide` or `provide:<user>:<pass>`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl AuthCallbacks for MemoryAuthCallbacks {
    fn cancel_auth_prompt(&self) {
        self.calls.lock().push("cancel".to_string());
    }

    fn forward_auth_prompt(&self) {
        self.calls.lock().push("forward".to_string());
    }

    fn provide_auth_credentials(&self, credentials: Option<(&str, &str)>) {
        let call = match credentials {
            Some((username, password)) => format!("provide:{}:{}", username, password),
            None => "provide".to_string(),
        };
        self.calls.lock().push(call);
    }
}

/// Context tree held in memory
#[derive(Debug, Default)]
pub struct MemoryContextRegistry {
    contexts: RwLock<HashMap<ContextId, BrowsingContextInfo>>,
    cache_bypass: RwLock<HashMap<ContextId, bool>>,
}

impl MemoryContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_top_level(&self, id: &str) -> BrowsingContextInfo {
        let info = BrowsingContextInfo {
            id: ContextId::new(id),
            parent: None,
            top_level: ContextId::new(id),
        };
        self.contexts.write().insert(info.id.clone(), info.clone());
        info
    }

    /// Add a frame; `None` when the parent does not exist
    pub fn add_child(&self, id: &str, parent: &str) -> Option<BrowsingContextInfo> {
        let parent = self.get_context(&ContextId::new(parent))?;
        let info = BrowsingContextInfo {
            id: ContextId::new(id),
            parent: Some(parent.id),
            top_level: parent.top_level,
        };
        self.contexts.write().insert(info.id.clone(), info.clone());
        Some(info)
    }

    /// Remove a context and everything below it
    pub fn remove(&self, id: &str) {
        let id = ContextId::new(id);
        self.contexts.write().retain(|context, info| {
            context != &id && info.top_level != id && info.parent.as_ref() != Some(&id)
        });
        self.cache_bypass.write().remove(&id);
    }

    pub fn cache_bypass(&self, id: &str) -> Option<bool> {
        self.cache_bypass.read().get(&ContextId::new(id)).copied()
    }
}

impl ContextRegistry for MemoryContextRegistry {
    fn get_context(&self, id: &ContextId) -> Option<BrowsingContextInfo> {
        self.contexts.read().get(id).cloned()
    }

    fn top_level_contexts(&self) -> Vec<ContextId> {
        let mut ids: Vec<_> = self
            .contexts
            .read()
            .values()
            .filter(|info| info.is_top_level())
            .map(|info| info.id.clone())
            .collect();
        ids.sort();
        ids
    }

    fn set_cache_bypass(&self, context: &ContextId, bypass: bool) {
        self.cache_bypass.write().insert(context.clone(), bypass);
    }
}

/// Listener that counts start/stop calls
#[derive(Debug, Default)]
pub struct MemoryListener {
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl MemoryListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.starts() > self.stops()
    }
}

impl RawNetworkListener for MemoryListener {
    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_cookies_from_header() {
        let request = MemoryRequest::get("1", "https://shop.example.com/cart")
            .header("Cookie", "sid=abc; theme=dark");
        let cookies = request.cookies();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "sid");
        assert_eq!(cookies[0].domain, "shop.example.com");
    }

    #[test]
    fn test_header_merge() {
        let request = MemoryRequest::get("1", "https://example.com/").header("Accept", "a");
        request.set_request_header("accept", "b", true);
        assert_eq!(request.headers_now(), vec![("Accept".to_string(), "a, b".to_string())]);

        request.set_request_header("ACCEPT", "c", false);
        assert_eq!(request.headers_now(), vec![("ACCEPT".to_string(), "c".to_string())]);
    }

    #[test]
    fn test_suspend_is_idempotent() {
        let request = MemoryRequest::get("1", "https://example.com/");
        request.suspend();
        request.suspend();
        assert_eq!(request.ops(), vec![TransportOp::Suspend]);
    }

    #[test]
    fn test_context_tree() {
        let registry = MemoryContextRegistry::new();
        registry.add_top_level("tab");
        registry.add_child("frame", "tab").unwrap();
        registry.add_child("nested", "frame").unwrap();
        assert!(registry.add_child("orphan", "missing").is_none());

        let nested = registry.get_context(&ContextId::new("nested")).unwrap();
        assert_eq!(nested.top_level, ContextId::new("tab"));
        assert!(!nested.is_top_level());
        assert_eq!(registry.top_level_contexts(), vec![ContextId::new("tab")]);

        registry.remove("tab");
        assert!(registry.get_context(&ContextId::new("nested")).is_none());
    }

    #[test]
    fn test_response_mime_type_and_status() {
        let response = MemoryResponse::new("https://example.com/", 404)
            .header("Content-Type", "application/json");
        assert_eq!(response.mime_type(), "application/json");
        assert_eq!(response.status_text(), "Not Found");
    }

    #[test]
    fn test_set_cookie_lines_are_not_folded() {
        let response = MemoryResponse::new("https://example.com/", 200)
            .header("Set-Cookie", "a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT");
        response.set_response_header("set-cookie", "b=2", true);
        response.set_response_header("x-tag", "1", true);
        response.set_response_header("X-Tag", "2", true);

        assert_eq!(
            response.headers_now(),
            vec![
                (
                    "Set-Cookie".to_string(),
                    "a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT".to_string()
                ),
                ("set-cookie".to_string(), "b=2".to_string()),
                ("x-tag".to_string(), "1, 2".to_string()),
            ]
        );
    }
}
