// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie wire types and `Cookie` / `Set-Cookie` header encoding

use serde::{Deserialize, Serialize};

use super::bytes_value::BytesValue;
use super::token::is_valid_http_token;
use crate::error::{Error, Result};

/// SameSite cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Cookie only sent with same-site requests
    Strict,
    /// Cookie sent with same-site and top-level navigations
    Lax,
    /// Cookie sent with all requests
    #[default]
    None,
}

impl SameSite {
    /// Attribute value as written in a `Set-Cookie` header
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// A cookie as reported in request data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: BytesValue,
    /// Domain the cookie belongs to
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Name and value length
    pub size: u64,
    /// HttpOnly flag
    pub http_only: bool,
    /// Secure flag
    pub secure: bool,
    /// SameSite attribute
    pub same_site: SameSite,
    /// Expiry as seconds since the epoch (None = session cookie)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

/// Name/value pair used to compose a `Cookie` request header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieHeader {
    pub name: String,
    pub value: BytesValue,
}

impl CookieHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: BytesValue::String(value.into()),
        }
    }
}

/// Cookie definition used to compose a `Set-Cookie` response header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookieHeader {
    pub name: String,
    pub value: BytesValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
}

impl SetCookieHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: BytesValue::String(value.into()),
            ..Default::default()
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the expiry date string
    pub fn expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    /// Set Max-Age in seconds
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Set http_only flag
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = Some(http_only);
        self
    }

    /// Set same_site attribute
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }
}

fn check_cookie_part(what: &str, value: &str) -> Result<()> {
    if value.contains([';', '\r', '\n', '\0']) {
        return Err(Error::invalid_argument(format!(
            "Invalid cookie {}: {:?}",
            what, value
        )));
    }
    Ok(())
}

fn check_cookie_name(name: &str) -> Result<()> {
    if !is_valid_http_token(name) {
        return Err(Error::invalid_argument(format!(
            "Cookie name is not a valid HTTP token: {:?}",
            name
        )));
    }
    Ok(())
}

/// Encode one cookie as `name=value`
pub fn encode_cookie_header(cookie: &CookieHeader) -> Result<String> {
    check_cookie_name(&cookie.name)?;
    let value = cookie.value.decode_to_string()?;
    check_cookie_part("value", &value)?;
    Ok(format!("{}={}", cookie.name, value))
}

/// Compose the single `Cookie` request header value for a cookie list
pub fn encode_cookie_list(cookies: &[CookieHeader]) -> Result<String> {
    let pairs = cookies
        .iter()
        .map(encode_cookie_header)
        .collect::<Result<Vec<_>>>()?;
    Ok(pairs.join("; "))
}

/// Encode a `Set-Cookie` header value
///
/// Attributes are appended in a fixed order: Expires, Max-Age, Domain, Path,
/// Secure, HttpOnly, SameSite.
pub fn encode_set_cookie_header(cookie: &SetCookieHeader) -> Result<String> {
    check_cookie_name(&cookie.name)?;
    let value = cookie.value.decode_to_string()?;
    check_cookie_part("value", &value)?;

    let mut header = format!("{}={}", cookie.name, value);

    if let Some(ref expiry) = cookie.expiry {
        check_cookie_part("expiry", expiry)?;
        header.push_str(&format!("; Expires={}", expiry));
    }
    if let Some(max_age) = cookie.max_age {
        header.push_str(&format!("; Max-Age={}", max_age));
    }
    if let Some(ref domain) = cookie.domain {
        check_cookie_part("domain", domain)?;
        header.push_str(&format!("; Domain={}", domain));
    }
    if let Some(ref path) = cookie.path {
        check_cookie_part("path", path)?;
        header.push_str(&format!("; Path={}", path));
    }
    if cookie.secure == Some(true) {
        header.push_str("; Secure");
    }
    if cookie.http_only == Some(true) {
        header.push_str("; HttpOnly");
    }
    if let Some(same_site) = cookie.same_site {
        header.push_str(&format!("; SameSite={}", same_site.as_str()));
    }

    Ok(header)
}

/// Parse a `Cookie` request header into protocol cookies
pub fn parse_cookie_header(header: &str, domain: &str) -> Vec<Cookie> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim();
            Some(Cookie {
                name: name.to_string(),
                value: BytesValue::string(value),
                domain: domain.to_string(),
                path: "/".to_string(),
                size: (name.len() + value.len()) as u64,
                http_only: false,
                secure: false,
                same_site: SameSite::default(),
                expiry: None,
            })
        })
        .collect()
}
