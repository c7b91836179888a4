// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Command dispatch seam used by the outer RPC channel

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ErrorContext, Result};

/// A protocol module handling `<module>.<command>` methods
#[async_trait]
pub trait ProtocolModule: Send + Sync {
    /// Module prefix, e.g. `network`
    fn name(&self) -> &'static str;

    /// Run one command and return its JSON result
    async fn handle_command(&self, method: &str, params: Value) -> Result<Value>;

    /// Whether `method` belongs to this module
    fn handles(&self, method: &str) -> bool {
        method
            .split_once('.')
            .map(|(module, _)| module == self.name())
            .unwrap_or(false)
    }
}

/// Decode command parameters; malformed input is an invalid argument
pub fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(params).invalid_argument("Invalid command parameters")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Params {
        request: String,
        #[serde(default)]
        limit: Option<u32>,
    }

    #[test]
    fn test_parse_params() {
        let params: Params = parse_params(serde_json::json!({"request": "1"})).unwrap();
        assert_eq!(params.request, "1");
        assert_eq!(params.limit, None);
    }

    #[test]
    fn test_parse_params_invalid() {
        let err = parse_params::<Params>(serde_json::json!({"request": 5})).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.is_client_error());
        assert!(err.to_string().contains("Invalid command parameters: "));

        let err = parse_params::<Params>(Value::Null).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
