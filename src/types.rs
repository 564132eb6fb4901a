//! Shared response types
//!
//! The JSON envelope returned across the FFI boundary.

use crate::error::{ErrorCode, SignerError};
use serde::{Deserialize, Serialize};

/// Serializable form of a [`SignerError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&SignerError> for ErrorBody {
    fn from(error: &SignerError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Standard API response wrapper for FFI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: &SignerError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody::from(error)),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"data":null,"error":{"code":"malformed_input","message":"Serialization failed"}}"#.to_string()
        })
    }
}
