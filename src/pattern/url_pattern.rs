// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL pattern compilation and matching

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

lazy_static! {
    static ref SCHEME_REGEX: Option<Regex> = Regex::new(r"^[a-z][a-z0-9+.\-]*$").ok();
}

/// URL pattern as sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UrlPattern {
    /// Structured pattern; absent parts match anything
    Pattern(PatternParts),
    /// Literal URL, or a glob when it contains an unescaped `*`
    String { pattern: String },
}

/// Parts of a structured pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternParts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl UrlPattern {
    /// Structured pattern matching only a path
    pub fn pathname(pathname: impl Into<String>) -> Self {
        UrlPattern::Pattern(PatternParts {
            pathname: Some(pathname.into()),
            ..Default::default()
        })
    }

    /// String pattern
    pub fn string(pattern: impl Into<String>) -> Self {
        UrlPattern::String {
            pattern: pattern.into(),
        }
    }

    /// Validate and compile the pattern
    pub fn compile(&self) -> Result<CompiledUrlPattern> {
        match self {
            UrlPattern::Pattern(parts) => compile_parts(parts),
            UrlPattern::String { pattern } => compile_string(pattern),
        }
    }
}

/// Normalised parts, `None` meaning "any"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledParts {
    pub protocol: Option<String>,
    pub hostname: Option<String>,
    pub port: Option<String>,
    pub pathname: Option<String>,
    pub search: Option<String>,
}

/// A validated URL pattern ready for matching
#[derive(Debug, Clone)]
pub enum CompiledUrlPattern {
    Parts(CompiledParts),
    Glob { source: String, regex: Regex },
}

impl CompiledUrlPattern {
    /// Check a URL string against the pattern; unparsable URLs never match
    pub fn matches(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(url) => self.matches_url(&url),
            Err(_) => false,
        }
    }

    /// Check a parsed URL against the pattern
    pub fn matches_url(&self, url: &Url) -> bool {
        match self {
            CompiledUrlPattern::Glob { regex, .. } => regex.is_match(url.as_str()),
            CompiledUrlPattern::Parts(parts) => {
                if let Some(ref protocol) = parts.protocol {
                    if url.scheme() != protocol {
                        return false;
                    }
                }

                if let Some(ref hostname) = parts.hostname {
                    let host = url.host_str().unwrap_or("").to_ascii_lowercase();
                    if &host != hostname {
                        return false;
                    }
                }

                if let Some(ref port) = parts.port {
                    let matches = if port.is_empty() {
                        url.port().is_none()
                    } else {
                        url.port_or_known_default().map(|p| p.to_string()).as_deref()
                            == Some(port.as_str())
                    };
                    if !matches {
                        return false;
                    }
                }

                if let Some(ref pathname) = parts.pathname {
                    if url.path() != pathname {
                        return false;
                    }
                }

                if let Some(ref search) = parts.search {
                    if url.query().unwrap_or("") != search {
                        return false;
                    }
                }

                true
            }
        }
    }
}

/// Resolve backslash escapes, rejecting unescaped pattern syntax characters
fn unescape(part: &str, slot: &str) -> Result<String> {
    let mut result = String::with_capacity(part.len());
    let mut chars = part.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => result.push(next),
                None => {
                    return Err(Error::invalid_argument(format!(
                        "Trailing backslash in {} pattern: {:?}",
                        slot, part
                    )))
                }
            },
            '*' | '(' | ')' | '{' | '}' => {
                return Err(Error::invalid_argument(format!(
                    "Unescaped {:?} in {} pattern: {:?}",
                    c, slot, part
                )))
            }
            _ => result.push(c),
        }
    }

    Ok(result)
}

fn default_port(protocol: &str) -> Option<u16> {
    match protocol {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        "ftp" => Some(21),
        _ => None,
    }
}

fn compile_parts(parts: &PatternParts) -> Result<CompiledUrlPattern> {
    let protocol = match parts.protocol {
        Some(ref raw) => {
            let value = unescape(raw, "protocol")?;
            let value = value.strip_suffix(':').unwrap_or(&value).to_ascii_lowercase();
            if !SCHEME_REGEX.as_ref().map_or(false, |re| re.is_match(&value)) {
                return Err(Error::invalid_argument(format!(
                    "Invalid protocol in URL pattern: {:?}",
                    raw
                )));
            }
            Some(value)
        }
        None => None,
    };

    let hostname = match parts.hostname {
        Some(ref raw) => {
            let value = unescape(raw, "hostname")?.to_ascii_lowercase();
            let bracketed = value.starts_with('[') && value.ends_with(']');
            let bad_char = value.chars().any(|c| {
                matches!(c, '/' | '?' | '#' | '@') || c.is_whitespace() || (c == ':' && !bracketed)
            });
            if value.is_empty() || bad_char {
                return Err(Error::invalid_argument(format!(
                    "Invalid hostname in URL pattern: {:?}",
                    raw
                )));
            }
            Some(value)
        }
        None => None,
    };

    let port = match parts.port {
        Some(ref raw) => {
            let value = unescape(raw, "port")?;
            if value.is_empty() {
                Some(value)
            } else {
                let number: u16 = value
                    .chars()
                    .all(|c| c.is_ascii_digit())
                    .then(|| value.parse().ok())
                    .flatten()
                    .ok_or_else(|| {
                        Error::invalid_argument(format!("Invalid port in URL pattern: {:?}", raw))
                    })?;
                let is_default = protocol
                    .as_deref()
                    .and_then(default_port)
                    .map_or(false, |default| default == number);
                Some(if is_default {
                    String::new()
                } else {
                    number.to_string()
                })
            }
        }
        None => None,
    };

    let pathname = match parts.pathname {
        Some(ref raw) => {
            let value = unescape(raw, "pathname")?;
            if value.contains(['?', '#']) {
                return Err(Error::invalid_argument(format!(
                    "Invalid pathname in URL pattern: {:?}",
                    raw
                )));
            }
            Some(if value.starts_with('/') {
                value
            } else {
                format!("/{}", value)
            })
        }
        None => None,
    };

    let search = match parts.search {
        Some(ref raw) => {
            let value = unescape(raw, "search")?;
            let value = value.strip_prefix('?').unwrap_or(&value).to_string();
            if value.contains('#') {
                return Err(Error::invalid_argument(format!(
                    "Invalid search in URL pattern: {:?}",
                    raw
                )));
            }
            Some(value)
        }
        None => None,
    };

    Ok(CompiledUrlPattern::Parts(CompiledParts {
        protocol,
        hostname,
        port,
        pathname,
        search,
    }))
}

fn compile_string(pattern: &str) -> Result<CompiledUrlPattern> {
    if has_unescaped_wildcard(pattern) {
        return compile_glob(pattern);
    }

    let literal = unescape(pattern, "string")?;
    let url = Url::parse(&literal)
        .map_err(|e| Error::invalid_argument(format!("Invalid URL pattern {:?}: {}", pattern, e)))?;

    Ok(CompiledUrlPattern::Parts(CompiledParts {
        protocol: Some(url.scheme().to_string()),
        hostname: Some(url.host_str().unwrap_or("").to_ascii_lowercase()),
        port: Some(url.port().map(|p| p.to_string()).unwrap_or_default()),
        pathname: Some(url.path().to_string()),
        search: Some(url.query().unwrap_or("").to_string()),
    }))
}

fn has_unescaped_wildcard(pattern: &str) -> bool {
    let mut escaped = false;
    for c in pattern.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '*' => return true,
            _ => {}
        }
    }
    false
}

fn compile_glob(pattern: &str) -> Result<CompiledUrlPattern> {
    let mut source = String::from("^");
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let next = chars.next().ok_or_else(|| {
                    Error::invalid_argument(format!("Trailing backslash in URL pattern: {:?}", pattern))
                })?;
                source.push_str(&regex::escape(&next.to_string()));
            }
            '*' => source.push_str(".*"),
            _ => source.push_str(&regex::escape(&c.to_string())),
        }
    }
    source.push('$');

    let regex = Regex::new(&source)
        .map_err(|e| Error::invalid_argument(format!("Invalid URL pattern {:?}: {}", pattern, e)))?;

    Ok(CompiledUrlPattern::Glob {
        source: pattern.to_string(),
        regex,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(protocol: Option<&str>, hostname: Option<&str>, port: Option<&str>) -> UrlPattern {
        UrlPattern::Pattern(PatternParts {
            protocol: protocol.map(String::from),
            hostname: hostname.map(String::from),
            port: port.map(String::from),
            ..Default::default()
        })
    }

    #[test]
    fn test_pathname_pattern() {
        let pattern = UrlPattern::pathname("/login").compile().unwrap();
        assert!(pattern.matches("https://example.com/login"));
        assert!(!pattern.matches("https://example.com/home"));
        assert!(!pattern.matches("https://example.com/login/extra"));
    }

    #[test]
    fn test_pathname_gets_leading_slash() {
        let pattern = UrlPattern::pathname("login").compile().unwrap();
        assert!(pattern.matches("https://example.com/login"));
    }

    #[test]
    fn test_protocol_and_host() {
        let pattern = parts(Some("HTTPS:"), Some("Example.com"), None).compile().unwrap();
        assert!(pattern.matches("https://example.com/anything?x=1"));
        assert!(!pattern.matches("http://example.com/"));
        assert!(!pattern.matches("https://api.example.com/"));
    }

    #[test]
    fn test_default_port_normalised() {
        let pattern = parts(Some("https"), None, Some("443")).compile().unwrap();
        assert!(pattern.matches("https://example.com/"));
        assert!(!pattern.matches("https://example.com:8443/"));

        let explicit = parts(None, None, Some("8080")).compile().unwrap();
        assert!(explicit.matches("http://localhost:8080/"));
        assert!(!explicit.matches("http://localhost/"));
    }

    #[test]
    fn test_search_pattern() {
        let pattern = UrlPattern::Pattern(PatternParts {
            search: Some("?q=1".to_string()),
            ..Default::default()
        })
        .compile()
        .unwrap();
        assert!(pattern.matches("https://example.com/?q=1"));
        assert!(!pattern.matches("https://example.com/?q=2"));
    }

    #[test]
    fn test_invalid_parts() {
        assert!(parts(Some("1http"), None, None).compile().is_err());
        assert!(parts(None, Some("exa mple.com"), None).compile().is_err());
        assert!(parts(None, Some("example.com:80"), None).compile().is_err());
        assert!(parts(None, Some(""), None).compile().is_err());
        assert!(parts(None, None, Some("80a")).compile().is_err());
        assert!(parts(None, None, Some("70000")).compile().is_err());
        assert!(UrlPattern::pathname("/a?b").compile().is_err());
        assert!(UrlPattern::pathname("/api/*").compile().is_err());
        assert!(UrlPattern::pathname("/api/\\*").compile().is_ok());
    }

    #[test]
    fn test_string_literal() {
        let pattern = UrlPattern::string("https://example.com/login").compile().unwrap();
        assert!(pattern.matches("https://EXAMPLE.com/login"));
        assert!(!pattern.matches("https://example.com/login?next=/"));
        assert!(UrlPattern::string("not a url").compile().is_err());
    }

    #[test]
    fn test_string_glob() {
        let pattern = UrlPattern::string("https://*.example.com/api/*").compile().unwrap();
        assert!(pattern.matches("https://cdn.example.com/api/v1/users"));
        assert!(!pattern.matches("https://example.org/api/v1"));
        assert!(matches!(pattern, CompiledUrlPattern::Glob { .. }));
    }

    #[test]
    fn test_wire_format() {
        let pattern: UrlPattern = serde_json::from_value(serde_json::json!({
            "type": "pattern",
            "pathname": "/login"
        }))
        .unwrap();
        assert_eq!(pattern, UrlPattern::pathname("/login"));

        let pattern: UrlPattern = serde_json::from_value(serde_json::json!({
            "type": "string",
            "pattern": "https://example.com/"
        }))
        .unwrap();
        assert_eq!(pattern, UrlPattern::string("https://example.com/"));
    }
}
