/*!
 * JSON-RPC 2.0 message types.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// An incoming call
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    /// Protocol version, expected to be "2.0" when present
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Method name
    pub method: String,
    /// Positional (array) or named (object) parameters
    #[serde(default)]
    pub params: Value,
    /// Caller-chosen id echoed in the response
    #[serde(default)]
    pub id: Value,
}

impl RpcRequest {
    /// Fetch a parameter by position or by name
    pub fn param(&self, position: usize, name: &str) -> Option<&Value> {
        match &self.params {
            Value::Array(values) => values.get(position),
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }
}

/// Error member of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// An outgoing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Value,
}

impl RpcResponse {
    pub fn success(id: Value, result: impl Into<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result.into()),
            error: None,
            id,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(RpcError { code, message: message.into() }),
            id,
        }
    }
}

/// Methods the server exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    UpdateContext,
    Translate,
    ListMethods,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 3] = [RpcMethod::UpdateContext, RpcMethod::Translate, RpcMethod::ListMethods];

    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateContext => "updateContext",
            Self::Translate => "translate",
            Self::ListMethods => "system.listMethods",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}
