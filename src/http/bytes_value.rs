// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Binary-safe wire values for headers, cookies and bodies

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tagged wire value: `{"type": "string", "value": ..}` or
/// `{"type": "base64", "value": ..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum BytesValue {
    /// Plain UTF-8 text
    String(String),
    /// Base64 encoded bytes
    Base64(String),
}

impl BytesValue {
    /// Wrap text
    pub fn string(value: impl Into<String>) -> Self {
        BytesValue::String(value.into())
    }

    /// Encode raw bytes, picking the plain form when the bytes are UTF-8
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => BytesValue::String(text.to_string()),
            Err(_) => BytesValue::Base64(STANDARD.encode(bytes)),
        }
    }

    /// Decode to raw bytes
    pub fn decode(&self) -> Result<Bytes> {
        match self {
            BytesValue::String(value) => Ok(Bytes::from(value.clone())),
            BytesValue::Base64(value) => STANDARD
                .decode(value)
                .map(Bytes::from)
                .map_err(|e| Error::invalid_argument(format!("Invalid base64 value: {}", e))),
        }
    }

    /// Decode to a string
    ///
    /// Decoded bytes that are not UTF-8 are mapped one byte per char so that
    /// header values stay binary-safe.
    pub fn decode_to_string(&self) -> Result<String> {
        match self {
            BytesValue::String(value) => Ok(value.clone()),
            BytesValue::Base64(_) => {
                let bytes = self.decode()?;
                Ok(match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => text,
                    Err(_) => bytes.iter().map(|&b| b as char).collect(),
                })
            }
        }
    }

    /// Size of the decoded value in bytes
    pub fn decoded_len(&self) -> Result<usize> {
        Ok(self.decode()?.len())
    }
}

impl Default for BytesValue {
    fn default() -> Self {
        BytesValue::String(String::new())
    }
}

impl From<&str> for BytesValue {
    fn from(value: &str) -> Self {
        BytesValue::String(value.to_string())
    }
}

impl From<String> for BytesValue {
    fn from(value: String) -> Self {
        BytesValue::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_string() {
        let value = BytesValue::string("abc");
        assert_eq!(value.decode().unwrap(), Bytes::from_static(b"abc"));
    }

    #[test]
    fn test_decode_base64() {
        let value = BytesValue::Base64("YWJj".to_string());
        assert_eq!(value.decode_to_string().unwrap(), "abc");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = BytesValue::Base64("not base64!".to_string())
            .decode()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_binary_bytes_use_base64() {
        let value = BytesValue::from_bytes(&[0xff, 0x00, 0x41]);
        assert!(matches!(value, BytesValue::Base64(_)));
        assert_eq!(value.decode().unwrap().as_ref(), &[0xff, 0x00, 0x41]);
        assert_eq!(value.decode_to_string().unwrap(), "\u{ff}\u{0}A");
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(BytesValue::string("b")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "string", "value": "b"}));

        let parsed: BytesValue =
            serde_json::from_value(serde_json::json!({"type": "base64", "value": "YWJj"})).unwrap();
        assert_eq!(parsed, BytesValue::Base64("YWJj".to_string()));

        let bad = serde_json::from_value::<BytesValue>(serde_json::json!({"type": "hex", "value": "00"}));
        assert!(bad.is_err());
    }
}
