// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Wire header entries and their validation

use std::collections::HashSet;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::bytes_value::BytesValue;
use super::token::{is_valid_header_value, is_valid_http_token};
use crate::error::{Error, Result};

lazy_static! {
    /// Response headers fixed by the transport once the headers were read
    pub static ref IMMUTABLE_RESPONSE_HEADERS: HashSet<&'static str> = [
        "content-encoding",
        "content-length",
        "content-type",
        "trailer",
        "transfer-encoding",
    ]
    .into_iter()
    .collect();
}

/// Check if a response header can no longer be changed on a received response
pub fn is_immutable_response_header(name: &str) -> bool {
    IMMUTABLE_RESPONSE_HEADERS.contains(name.to_ascii_lowercase().as_str())
}

/// Header entry as it travels on the wire (CDP/BiDi compatible)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: BytesValue,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: BytesValue::String(value.into()),
        }
    }

    /// Decode and validate into a native `(name, value)` pair
    pub fn deserialize(&self) -> Result<(String, String)> {
        if !is_valid_http_token(&self.name) {
            return Err(Error::invalid_argument(format!(
                "Header name is not a valid HTTP token: {:?}",
                self.name
            )));
        }

        let value = self.value.decode_to_string()?;
        if !is_valid_header_value(&value) {
            return Err(Error::invalid_argument(format!(
                "Invalid value for header {}: {:?}",
                self.name, value
            )));
        }

        Ok((self.name.clone(), value))
    }

    /// Size on the wire: `name: value\r\n`
    pub fn wire_size(&self) -> u64 {
        let value_len = self.value.decoded_len().unwrap_or(0);
        (self.name.len() + 2 + value_len + 2) as u64
    }
}

/// Decode and validate a whole header list, failing on the first bad entry
pub fn deserialize_headers(headers: &[Header]) -> Result<Vec<(String, String)>> {
    headers.iter().map(Header::deserialize).collect()
}

/// Build wire headers from native pairs
pub fn serialize_headers(headers: &[(String, String)]) -> Vec<Header> {
    headers
        .iter()
        .map(|(name, value)| Header::new(name.clone(), value.clone()))
        .collect()
}

/// Case-insensitive header lookup
pub fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immutable_headers() {
        assert!(is_immutable_response_header("Content-Length"));
        assert!(is_immutable_response_header("transfer-encoding"));
        assert!(!is_immutable_response_header("x-frame-options"));
    }

    #[test]
    fn test_deserialize_header() {
        let header = Header {
            name: "x-token".to_string(),
            value: BytesValue::Base64("YWJj".to_string()),
        };
        assert_eq!(
            header.deserialize().unwrap(),
            ("x-token".to_string(), "abc".to_string())
        );
    }

    #[test]
    fn test_deserialize_rejects_bad_input() {
        assert!(Header::new("bad name", "v").deserialize().is_err());
        assert!(Header::new("x-ok", "line\nbreak").deserialize().is_err());

        let headers = vec![Header::new("a", "1"), Header::new("b c", "2")];
        assert!(deserialize_headers(&headers).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_find_header() {
        let headers = vec![("Content-Type".to_string(), "text/html".to_string())];
        assert_eq!(find_header(&headers, "content-type"), Some("text/html"));
        assert_eq!(find_header(&headers, "location"), None);
    }

    #[test]
    fn test_wire_size() {
        assert_eq!(Header::new("ab", "cd").wire_size(), 8);
    }
}
