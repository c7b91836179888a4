// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Authentication challenges parsed from `WWW-Authenticate` /
//! `Proxy-Authenticate` response headers

use serde::{Deserialize, Serialize};

use super::headers::{PROXY_AUTHENTICATE, WWW_AUTHENTICATE};

/// A single challenge: `Basic realm="staging"` -> `{scheme: "Basic", realm: "staging"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthChallenge {
    pub scheme: String,
    pub realm: String,
}

/// Extract the challenges relevant for a response status
///
/// 401 responses use `WWW-Authenticate`, 407 responses use
/// `Proxy-Authenticate`. Any other status carries no challenge.
pub fn auth_challenges(status: u16, headers: &[(String, String)]) -> Option<Vec<AuthChallenge>> {
    let header_name = match status {
        401 => WWW_AUTHENTICATE,
        407 => PROXY_AUTHENTICATE,
        _ => return None,
    };

    let challenges: Vec<AuthChallenge> = headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case(header_name))
        .flat_map(|(_, value)| parse_challenges(value))
        .collect();

    Some(challenges)
}

/// Parse one header value that may hold several comma separated challenges
pub fn parse_challenges(header: &str) -> Vec<AuthChallenge> {
    let mut challenges: Vec<AuthChallenge> = Vec::new();

    for part in split_unquoted(header, ',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        // A new challenge starts with a scheme token that is not itself a
        // `key=value` parameter.
        let (first, rest) = match part.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim()),
            None => (part, ""),
        };

        let param = if first.contains('=') || rest.starts_with('=') {
            Some(part)
        } else {
            challenges.push(AuthChallenge {
                scheme: first.to_string(),
                realm: String::new(),
            });
            (!rest.is_empty()).then_some(rest)
        };

        if let (Some(param), Some(current)) = (param, challenges.last_mut()) {
            if let Some((key, value)) = param.split_once('=') {
                if key.trim().eq_ignore_ascii_case("realm") {
                    current.realm = unquote(value.trim());
                }
            }
        }
    }

    challenges
}

/// Split on `separator` outside of double quoted sections
fn split_unquoted(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn unquote(value: &str) -> String {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                result.push(next);
            }
        } else {
            result.push(c);
        }
    }
    result
}
