use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Well-known JSON-RPC / EIP-1193 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    UserRejected,
    Unauthorized,
    UnsupportedMethod,
    Disconnected,
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    Internal,
    Other(i64),
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            4001 => Self::UserRejected,
            4100 => Self::Unauthorized,
            4200 => Self::UnsupportedMethod,
            4900 => Self::Disconnected,
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::Internal,
            other => Self::Other(other),
        }
    }
}

/// Error member of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorObject {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Error)]
#[error("{method} failed with rpc error {code}: {message}")]
pub struct RpcException {
    pub method: String,
    pub code: i64,
    pub message: String,
}

impl RpcException {
    pub fn new(method: impl Into<String>, error: RpcErrorObject) -> Self {
        Self {
            method: method.into(),
            code: error.code,
            message: error.message,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from(self.code)
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self.error_code(),
            ErrorCode::UserRejected | ErrorCode::Unauthorized
        )
    }
}
