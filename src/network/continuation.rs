// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Continuation commands
//!
//! The five commands that resolve a blocked exchange. Each one peeks at the
//! entry, checks that the command is legal for its phase, decodes and
//! validates every argument, and only then claims the entry and touches the
//! transport. A command that fails leaves the exchange blocked and unchanged.

use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use super::blocked::{BlockedExchange, BlockedExchangeTable, BlockedStage, Resolution};
use super::processor::RedirectTracker;
use super::transport::{NetworkResponse, SyntheticResponse};
use super::types::{Phase, RequestId};
use crate::error::{Error, Result};
use crate::http::{
    deserialize_headers, encode_cookie_list, encode_set_cookie_header, headers,
    is_immutable_response_header, is_valid_header_value, is_valid_http_token, BytesValue,
    CookieHeader, Header, SetCookieHeader,
};

/// `network.continueRequest` parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueRequestParameters {
    pub request: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BytesValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<CookieHeader>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<Header>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// `network.continueResponse` parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueResponseParameters {
    pub request: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<SetCookieHeader>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<AuthCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<Header>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// `network.provideResponse` parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvideResponseParameters {
    pub request: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BytesValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<SetCookieHeader>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<Header>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// `network.continueWithAuth` parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinueWithAuthParameters {
    pub request: RequestId,
    #[serde(flatten)]
    pub action: AuthAction,
}

/// What to do with an auth prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum AuthAction {
    Cancel,
    Default,
    ProvideCredentials { credentials: AuthCredentials },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthCredentials {
    Password { username: String, password: String },
}

impl AuthCredentials {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthCredentials::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    fn as_pair(&self) -> (&str, &str) {
        match self {
            AuthCredentials::Password { username, password } => (username.as_str(), password.as_str()),
        }
    }
}

/// `network.failRequest` parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailRequestParameters {
    pub request: RequestId,
}

/// Result of a command that can partially apply
///
/// Immutable response headers are skipped rather than failing the command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuationOutcome {
    /// Lowercased names of headers that were left untouched
    pub skipped_headers: Vec<String>,
}

impl ContinuationOutcome {
    pub fn is_complete(&self) -> bool {
        self.skipped_headers.is_empty()
    }
}

/// Executes continuation commands against the blocked exchange table
pub struct Continuations {
    blocked: Arc<BlockedExchangeTable>,
    redirects: Arc<RedirectTracker>,
}

impl Continuations {
    pub fn new(blocked: Arc<BlockedExchangeTable>, redirects: Arc<RedirectTracker>) -> Self {
        Self { blocked, redirects }
    }

    /// Resume a request blocked in `beforeRequestSent`, optionally mutated
    /// or redirected
    pub fn continue_request(&self, params: ContinueRequestParameters) -> Result<()> {
        let peeked = self.blocked.peek(&params.request)?;
        expect_phase(&peeked, &[Phase::BeforeRequestSent])?;

        if let Some(ref method) = params.method {
            if !is_valid_http_token(method) {
                return Err(Error::invalid_argument(format!(
                    "Method is not a valid HTTP token: {:?}",
                    method
                )));
            }
        }

        let url = params.url.as_deref().map(parse_absolute_url).transpose()?;
        let request_headers = params.headers.as_deref().map(deserialize_headers).transpose()?;
        let cookie = params.cookies.as_deref().map(encode_cookie_list).transpose()?;
        let body = params.body.as_ref().map(BytesValue::decode).transpose()?;

        let claimed = self.blocked.claim(&peeked)?;
        let request = claimed.exchange.request.clone();

        if let Some(ref method) = params.method {
            request.set_method(method);
        }

        if let Some(request_headers) = request_headers {
            request.clear_request_headers();
            apply_headers(&request_headers, |name, value, merge| {
                request.set_request_header(name, value, merge)
            });
        }

        if let Some(cookie) = cookie {
            request.set_request_header(headers::COOKIE, &cookie, false);
        }

        if let Some(body) = body {
            request.set_request_body(body);
        }

        match url {
            Some(url) => {
                tracing::debug!(request = %params.request, url = %url, "Redirecting blocked request");
                self.redirects.mark(params.request.clone());
                request.redirect_to(&url);
                request.resume();
                claimed.release(Resolution::Redirected);
            }
            None => {
                request.resume();
                claimed.release(Resolution::Continued);
            }
        }

        Ok(())
    }

    /// Resume a response blocked in `responseStarted` or `authRequired`
    pub fn continue_response(
        &self,
        params: ContinueResponseParameters,
    ) -> Result<ContinuationOutcome> {
        let peeked = self.blocked.peek(&params.request)?;
        expect_phase(&peeked, &[Phase::ResponseStarted, Phase::AuthRequired])?;

        let response_headers = params.headers.as_deref().map(deserialize_headers).transpose()?;
        let set_cookies = params
            .cookies
            .as_deref()
            .map(encode_set_cookies)
            .transpose()?;
        if let Some(ref reason) = params.reason_phrase {
            check_reason_phrase(reason)?;
        }

        let claimed = self.blocked.claim(&peeked)?;
        let mut outcome = ContinuationOutcome::default();

        if let Some(response) = claimed.exchange.stage.response() {
            if let Some(ref response_headers) = response_headers {
                replace_response_headers(response.as_ref(), response_headers, &mut outcome);
            }
            if let Some(ref set_cookies) = set_cookies {
                for value in set_cookies {
                    response.set_response_header(headers::SET_COOKIE, value, true);
                }
            }
            if params.status_code.is_some() || params.reason_phrase.is_some() {
                let status = params.status_code.unwrap_or_else(|| response.status());
                let reason = params
                    .reason_phrase
                    .clone()
                    .unwrap_or_else(|| response.status_text());
                response.set_status(status, &reason);
            }
        }

        match claimed.exchange.stage {
            BlockedStage::Auth { ref callbacks, .. } => {
                callbacks.provide_auth_credentials(
                    params.credentials.as_ref().map(AuthCredentials::as_pair),
                );
                claimed.release(Resolution::AuthProvided);
            }
            _ => {
                if params.credentials.is_some() {
                    tracing::debug!(request = %params.request, "Ignoring credentials outside authRequired");
                }
                claimed.exchange.request.resume();
                claimed.release(Resolution::Continued);
            }
        }

        Ok(outcome)
    }

    /// Resolve an auth prompt blocked in `authRequired`
    pub fn continue_with_auth(&self, params: ContinueWithAuthParameters) -> Result<()> {
        let peeked = self.blocked.peek(&params.request)?;
        expect_phase(&peeked, &[Phase::AuthRequired])?;

        let claimed = self.blocked.claim(&peeked)?;
        let BlockedStage::Auth { ref callbacks, .. } = claimed.exchange.stage else {
            return Err(Error::other("authRequired exchange without auth callbacks"));
        };

        let resolution = match params.action {
            AuthAction::Cancel => {
                callbacks.cancel_auth_prompt();
                Resolution::AuthCancelled
            }
            AuthAction::Default => {
                callbacks.forward_auth_prompt();
                Resolution::AuthForwarded
            }
            AuthAction::ProvideCredentials { ref credentials } => {
                callbacks.provide_auth_credentials(Some(credentials.as_pair()));
                Resolution::AuthProvided
            }
        };

        claimed.release(resolution);
        Ok(())
    }

    /// Abort a blocked exchange
    ///
    /// Auth prompts cannot be failed; they are cancelled through
    /// `continueWithAuth`.
    pub fn fail_request(&self, params: FailRequestParameters) -> Result<()> {
        let peeked = self.blocked.peek(&params.request)?;
        if peeked.phase() == Phase::AuthRequired {
            return Err(Error::invalid_argument(
                "Cannot fail a request blocked in authRequired, use continueWithAuth with action \"cancel\"",
            ));
        }

        let claimed = self.blocked.claim(&peeked)?;
        let request = &claimed.exchange.request;
        if request.is_suspended() {
            request.resume();
        }
        request.abort();
        claimed.release(Resolution::Failed);

        Ok(())
    }

    /// Serve a client-provided response
    ///
    /// Only `beforeRequestSent` accepts a replacement response; in later
    /// phases the exchange is resumed unchanged and any field is rejected.
    pub fn provide_response(&self, params: ProvideResponseParameters) -> Result<()> {
        let peeked = self.blocked.peek(&params.request)?;

        if peeked.phase() != Phase::BeforeRequestSent {
            for (field, present) in [
                ("body", params.body.is_some()),
                ("cookies", params.cookies.is_some()),
                ("headers", params.headers.is_some()),
                ("reasonPhrase", params.reason_phrase.is_some()),
                ("statusCode", params.status_code.is_some()),
            ] {
                if present {
                    return Err(Error::unsupported(format!(
                        "provideResponse does not support \"{}\" in phase {}",
                        field,
                        peeked.phase()
                    )));
                }
            }

            let claimed = self.blocked.claim(&peeked)?;
            match claimed.exchange.stage {
                BlockedStage::Auth { ref callbacks, .. } => {
                    callbacks.provide_auth_credentials(None);
                    claimed.release(Resolution::AuthProvided);
                }
                _ => {
                    claimed.exchange.request.resume();
                    claimed.release(Resolution::Continued);
                }
            }
            return Ok(());
        }

        let mut response_headers = params
            .headers
            .as_deref()
            .map(deserialize_headers)
            .transpose()?
            .unwrap_or_default();
        if let Some(ref cookies) = params.cookies {
            for value in encode_set_cookies(cookies)? {
                response_headers.push((headers::SET_COOKIE.to_string(), value));
            }
        }
        let body = match params.body {
            Some(ref body) => body.decode()?,
            None => Bytes::new(),
        };
        if let Some(ref reason) = params.reason_phrase {
            check_reason_phrase(reason)?;
        }

        let status = params.status_code.unwrap_or(200);
        let reason_phrase = params.reason_phrase.clone().unwrap_or_else(|| {
            if status == 200 {
                "OK".to_string()
            } else {
                String::new()
            }
        });

        let claimed = self.blocked.claim(&peeked)?;
        let request = &claimed.exchange.request;
        tracing::debug!(request = %params.request, status, body_len = body.len(), "Providing response");
        request.set_response_override(SyntheticResponse {
            status,
            reason_phrase,
            headers: response_headers,
            body,
        });
        request.resume();
        claimed.release(Resolution::Provided);

        Ok(())
    }
}

fn expect_phase(exchange: &BlockedExchange, allowed: &[Phase]) -> Result<()> {
    let phase = exchange.phase();
    if allowed.contains(&phase) {
        return Ok(());
    }

    let expected: Vec<&str> = allowed.iter().map(|p| p.as_str()).collect();
    Err(Error::invalid_argument(format!(
        "Expected blocked request {} to be in phase {}, got {}",
        exchange.request_id,
        expected.join(" or "),
        phase
    )))
}

fn parse_absolute_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::invalid_argument(format!("Invalid URL {:?}: {}", url, e)))
}

fn check_reason_phrase(reason: &str) -> Result<()> {
    if !is_valid_header_value(reason) {
        return Err(Error::invalid_argument(format!(
            "Invalid reason phrase: {:?}",
            reason
        )));
    }
    Ok(())
}

fn encode_set_cookies(cookies: &[SetCookieHeader]) -> Result<Vec<String>> {
    cookies.iter().map(encode_set_cookie_header).collect()
}

/// Set a header list; repeated names after the first are merged
fn apply_headers<F>(headers: &[(String, String)], mut set: F)
where
    F: FnMut(&str, &str, bool),
{
    let mut seen = BTreeSet::new();
    for (name, value) in headers {
        let merge = !seen.insert(name.to_ascii_lowercase());
        set(name, value, merge);
    }
}

fn replace_response_headers(
    response: &dyn NetworkResponse,
    headers: &[(String, String)],
    outcome: &mut ContinuationOutcome,
) {
    let mut skipped = BTreeSet::new();
    let mut skip = |name: &str| {
        let name = name.to_ascii_lowercase();
        if skipped.insert(name.clone()) {
            tracing::warn!(header = %name, "Skipping immutable header on a received response");
        }
    };

    let existing: BTreeSet<String> = response
        .headers()
        .iter()
        .map(|(name, _)| name.to_ascii_lowercase())
        .collect();
    for name in &existing {
        if is_immutable_response_header(name) {
            skip(name.as_str());
        } else {
            response.clear_response_header(name);
        }
    }

    let mut applied = BTreeSet::new();
    for (name, value) in headers {
        if is_immutable_response_header(name) {
            skip(name.as_str());
            continue;
        }
        let merge = !applied.insert(name.to_ascii_lowercase());
        response.set_response_header(name, value, merge);
    }

    outcome.skipped_headers = skipped.into_iter().collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::memory::{
        MemoryAuthCallbacks, MemoryRequest, MemoryResponse, TransportOp,
    };
    use crate::network::transport::NetworkRequest;

    struct Fixture {
        blocked: Arc<BlockedExchangeTable>,
        redirects: Arc<RedirectTracker>,
        api: Continuations,
    }

    fn fixture() -> Fixture {
        let blocked = Arc::new(BlockedExchangeTable::default());
        let redirects = Arc::new(RedirectTracker::new(std::time::Duration::from_secs(30)));
        let api = Continuations::new(blocked.clone(), redirects.clone());
        Fixture {
            blocked,
            redirects,
            api,
        }
    }

    fn block_request(f: &Fixture, id: &str) -> Arc<MemoryRequest> {
        let request = Arc::new(
            MemoryRequest::get(id, "https://example.com/login").header("Accept", "text/html"),
        );
        request.suspend_now();
        f.blocked
            .block(request.clone(), BlockedStage::Request, vec![], None);
        request
    }

    fn block_response(f: &Fixture, id: &str) -> (Arc<MemoryRequest>, Arc<MemoryResponse>) {
        let request = Arc::new(MemoryRequest::get(id, "https://example.com/"));
        request.suspend_now();
        let response = Arc::new(
            MemoryResponse::new("https://example.com/", 200)
                .header("Content-Length", "42")
                .header("Content-Type", "text/html")
                .header("X-Old", "1"),
        );
        f.blocked.block(
            request.clone(),
            BlockedStage::Response {
                response: response.clone(),
            },
            vec![],
            None,
        );
        (request, response)
    }

    fn block_auth(f: &Fixture, id: &str) -> (Arc<MemoryRequest>, Arc<MemoryAuthCallbacks>) {
        let request = Arc::new(MemoryRequest::get(id, "https://example.com/private"));
        let response = Arc::new(MemoryResponse::new("https://example.com/private", 401));
        let callbacks = Arc::new(MemoryAuthCallbacks::new());
        f.blocked.block(
            request.clone(),
            BlockedStage::Auth {
                response,
                callbacks: callbacks.clone(),
            },
            vec![],
            None,
        );
        (request, callbacks)
    }

    fn continue_request(id: &str) -> ContinueRequestParameters {
        ContinueRequestParameters {
            request: RequestId::new(id),
            ..Default::default()
        }
    }

    #[test]
    fn test_continue_request_resumes_once() {
        let f = fixture();
        let request = block_request(&f, "1");

        f.api.continue_request(continue_request("1")).unwrap();
        assert!(!request.is_suspended());
        assert!(f.blocked.is_empty());

        let err = f.api.continue_request(continue_request("1")).unwrap_err();
        assert!(err.is_no_such_request());
    }

    #[test]
    fn test_continue_request_method_validation() {
        let f = fixture();
        let request = block_request(&f, "1");

        let err = f
            .api
            .continue_request(ContinueRequestParameters {
                method: Some("GE T".to_string()),
                ..continue_request("1")
            })
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(request.is_suspended());
        assert!(f.blocked.contains(&RequestId::new("1")));

        f.api
            .continue_request(ContinueRequestParameters {
                method: Some("PATCH".to_string()),
                ..continue_request("1")
            })
            .unwrap();
        assert_eq!(request.method_now(), "PATCH");
    }

    #[test]
    fn test_continue_request_no_partial_mutation() {
        let f = fixture();
        let request = block_request(&f, "1");

        let err = f
            .api
            .continue_request(ContinueRequestParameters {
                method: Some("POST".to_string()),
                headers: Some(vec![Header::new("X-Bad", "line\r\nbreak")]),
                ..continue_request("1")
            })
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(request.method_now(), "GET");
        assert!(request.ops().is_empty());
    }

    #[test]
    fn test_continue_request_replaces_headers_and_cookies() {
        let f = fixture();
        let request = block_request(&f, "1");

        f.api
            .continue_request(ContinueRequestParameters {
                headers: Some(vec![
                    Header::new("X-Trace", "a"),
                    Header::new("x-trace", "b"),
                ]),
                cookies: Some(vec![CookieHeader::new("a", "b"), CookieHeader::new("c", "d")]),
                body: Some(BytesValue::Base64("YWJj".to_string())),
                ..continue_request("1")
            })
            .unwrap();

        assert_eq!(
            request.headers_now(),
            vec![
                ("X-Trace".to_string(), "a, b".to_string()),
                ("cookie".to_string(), "a=b; c=d".to_string()),
            ]
        );
        assert_eq!(request.body_now(), Some(Bytes::from_static(b"abc")));
    }

    #[test]
    fn test_continue_request_redirect() {
        let f = fixture();
        let request = block_request(&f, "1");

        let err = f
            .api
            .continue_request(ContinueRequestParameters {
                url: Some("/relative".to_string()),
                ..continue_request("1")
            })
            .unwrap_err();
        assert!(err.is_invalid_argument());

        f.api
            .continue_request(ContinueRequestParameters {
                url: Some("https://example.com/elsewhere".to_string()),
                ..continue_request("1")
            })
            .unwrap();
        assert!(request
            .ops()
            .contains(&TransportOp::RedirectTo("https://example.com/elsewhere".to_string())));
        assert!(f.redirects.consume(&RequestId::new("1")));
    }

    #[test]
    fn test_continue_request_wrong_phase() {
        let f = fixture();
        block_response(&f, "1");
        let err = f.api.continue_request(continue_request("1")).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(f.blocked.contains(&RequestId::new("1")));
    }

    #[test]
    fn test_continue_response_skips_immutable_headers() {
        let f = fixture();
        let (request, response) = block_response(&f, "1");

        let outcome = f
            .api
            .continue_response(ContinueResponseParameters {
                request: RequestId::new("1"),
                headers: Some(vec![
                    Header::new("X-New", "yes"),
                    Header::new("Content-Length", "7"),
                ]),
                status_code: Some(203),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            outcome.skipped_headers,
            vec!["content-length".to_string(), "content-type".to_string()]
        );
        assert!(!outcome.is_complete());
        assert_eq!(
            response.headers_now(),
            vec![
                ("Content-Length".to_string(), "42".to_string()),
                ("Content-Type".to_string(), "text/html".to_string()),
                ("X-New".to_string(), "yes".to_string()),
            ]
        );
        assert_eq!(response.status_now(), (203, "OK".to_string()));
        assert!(!request.is_suspended());
    }

    #[test]
    fn test_continue_response_cookies() {
        let f = fixture();
        let (_, response) = block_response(&f, "1");

        f.api
            .continue_response(ContinueResponseParameters {
                request: RequestId::new("1"),
                cookies: Some(vec![SetCookieHeader::new("sid", "1").path("/").secure(true)]),
                ..Default::default()
            })
            .unwrap();
        assert!(response
            .headers_now()
            .contains(&("set-cookie".to_string(), "sid=1; Path=/; Secure".to_string())));
    }

    #[test]
    fn test_continue_response_keeps_cookies_separate() {
        let f = fixture();
        let (_, response) = block_response(&f, "1");

        f.api
            .continue_response(ContinueResponseParameters {
                request: RequestId::new("1"),
                cookies: Some(vec![
                    SetCookieHeader::new("a", "1").expiry("Wed, 21 Oct 2026 07:28:00 GMT"),
                    SetCookieHeader::new("b", "2"),
                ]),
                ..Default::default()
            })
            .unwrap();

        let cookies: Vec<String> = response
            .headers_now()
            .into_iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("set-cookie"))
            .map(|(_, value)| value)
            .collect();
        assert_eq!(
            cookies,
            vec![
                "a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT".to_string(),
                "b=2".to_string(),
            ]
        );
    }

    #[test]
    fn test_continue_response_repeated_set_cookie_headers() {
        let f = fixture();
        let (_, response) = block_response(&f, "1");

        f.api
            .continue_response(ContinueResponseParameters {
                request: RequestId::new("1"),
                headers: Some(vec![
                    Header::new("Set-Cookie", "a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT"),
                    Header::new("Set-Cookie", "b=2"),
                    Header::new("X-Tag", "1"),
                    Header::new("X-Tag", "2"),
                ]),
                ..Default::default()
            })
            .unwrap();

        let response_headers = response.headers_now();
        assert!(response_headers.contains(&(
            "Set-Cookie".to_string(),
            "a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT".to_string()
        )));
        assert!(response_headers.contains(&("Set-Cookie".to_string(), "b=2".to_string())));
        assert!(response_headers.contains(&("X-Tag".to_string(), "1, 2".to_string())));
    }

    #[test]
    fn test_continue_response_in_auth_phase() {
        let f = fixture();
        let (_, callbacks) = block_auth(&f, "1");

        f.api
            .continue_response(ContinueResponseParameters {
                request: RequestId::new("1"),
                credentials: Some(AuthCredentials::password("user", "pass")),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(callbacks.calls(), vec!["provide:user:pass".to_string()]);
    }

    #[test]
    fn test_continue_with_auth_actions() {
        let f = fixture();

        let (_, callbacks) = block_auth(&f, "1");
        f.api
            .continue_with_auth(ContinueWithAuthParameters {
                request: RequestId::new("1"),
                action: AuthAction::Cancel,
            })
            .unwrap();
        assert_eq!(callbacks.calls(), vec!["cancel".to_string()]);

        let (_, callbacks) = block_auth(&f, "2");
        f.api
            .continue_with_auth(ContinueWithAuthParameters {
                request: RequestId::new("2"),
                action: AuthAction::Default,
            })
            .unwrap();
        assert_eq!(callbacks.calls(), vec!["forward".to_string()]);

        block_request(&f, "3");
        let err = f
            .api
            .continue_with_auth(ContinueWithAuthParameters {
                request: RequestId::new("3"),
                action: AuthAction::Cancel,
            })
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_continue_with_auth_wire_format() {
        let params: ContinueWithAuthParameters = serde_json::from_value(serde_json::json!({
            "request": "4",
            "action": "provideCredentials",
            "credentials": {"type": "password", "username": "u", "password": "p"}
        }))
        .unwrap();
        assert_eq!(
            params.action,
            AuthAction::ProvideCredentials {
                credentials: AuthCredentials::password("u", "p")
            }
        );

        let missing = serde_json::from_value::<ContinueWithAuthParameters>(serde_json::json!({
            "request": "4",
            "action": "provideCredentials"
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn test_fail_request() {
        let f = fixture();
        let request = block_request(&f, "1");

        f.api
            .fail_request(FailRequestParameters {
                request: RequestId::new("1"),
            })
            .unwrap();
        assert_eq!(
            request.ops(),
            vec![TransportOp::Resume, TransportOp::Abort]
        );
    }

    #[test]
    fn test_fail_request_in_auth_phase() {
        let f = fixture();
        let (_, callbacks) = block_auth(&f, "1");

        let err = f
            .api
            .fail_request(FailRequestParameters {
                request: RequestId::new("1"),
            })
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(callbacks.calls().is_empty());
        assert!(f.blocked.contains(&RequestId::new("1")));
    }

    #[test]
    fn test_provide_response_before_request() {
        let f = fixture();
        let request = block_request(&f, "1");

        f.api
            .provide_response(ProvideResponseParameters {
                request: RequestId::new("1"),
                body: Some(BytesValue::string("hello")),
                headers: Some(vec![Header::new("Content-Type", "text/plain")]),
                cookies: Some(vec![SetCookieHeader::new("a", "b")]),
                ..Default::default()
            })
            .unwrap();

        let provided = request.response_override().unwrap();
        assert_eq!(provided.status, 200);
        assert_eq!(provided.reason_phrase, "OK");
        assert_eq!(provided.body, Bytes::from_static(b"hello"));
        assert_eq!(
            provided.headers,
            vec![
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("set-cookie".to_string(), "a=b".to_string()),
            ]
        );
        assert!(!request.is_suspended());
    }

    #[test]
    fn test_provide_response_later_phase() {
        let f = fixture();
        let (request, _) = block_response(&f, "1");

        let err = f
            .api
            .provide_response(ProvideResponseParameters {
                request: RequestId::new("1"),
                body: Some(BytesValue::string("x")),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code(), "unsupported operation");
        assert!(request.is_suspended());

        f.api
            .provide_response(ProvideResponseParameters {
                request: RequestId::new("1"),
                ..Default::default()
            })
            .unwrap();
        assert!(!request.is_suspended());

        let (_, callbacks) = block_auth(&f, "2");
        f.api
            .provide_response(ProvideResponseParameters {
                request: RequestId::new("2"),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(callbacks.calls(), vec!["provide".to_string()]);
    }
}
