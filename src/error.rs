//! Unified error types for the GasFree signer
//!
//! Every failure surfaces synchronously through [`SignerError`]; nothing in
//! this crate retries or returns a partial signature.

use serde::{Deserialize, Serialize};

/// Errors produced while hashing, encoding or signing typed data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unresolvable type: {0}")]
    UnresolvableType(String),

    #[error("Missing field '{field}' in {type_name} (tried keys: {candidates})")]
    MissingField {
        type_name: String,
        field: String,
        candidates: String,
    },

    #[error("Invalid digest length: expected 32 bytes, got {0}")]
    InvalidDigestLength(usize),

    #[error("Signing failure: {0}")]
    SigningFailure(String),
}

impl SignerError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn unresolvable(type_name: impl Into<String>) -> Self {
        Self::UnresolvableType(type_name.into())
    }

    pub fn signing(msg: impl Into<String>) -> Self {
        Self::SigningFailure(msg.into())
    }

    /// Stable code used in JSON envelopes
    pub fn code(&self) -> ErrorCode {
        match self {
            SignerError::MalformedInput(_) => ErrorCode::MalformedInput,
            SignerError::UnresolvableType(_) => ErrorCode::UnresolvableType,
            SignerError::MissingField { .. } => ErrorCode::MissingField,
            SignerError::InvalidDigestLength(_) => ErrorCode::InvalidDigestLength,
            SignerError::SigningFailure(_) => ErrorCode::SigningFailure,
        }
    }
}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MalformedInput,
    UnresolvableType,
    MissingField,
    InvalidDigestLength,
    SigningFailure,
}

/// Result type alias for signer operations
pub type SignerResult<T> = Result<T, SignerError>;

impl From<hex::FromHexError> for SignerError {
    fn from(e: hex::FromHexError) -> Self {
        SignerError::MalformedInput(format!("invalid hex: {}", e))
    }
}

impl From<serde_json::Error> for SignerError {
    fn from(e: serde_json::Error) -> Self {
        SignerError::MalformedInput(format!("invalid JSON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_serialize_snake_case() {
        let err = SignerError::MissingField {
            type_name: "PermitTransfer".to_string(),
            field: "maxFee".to_string(),
            candidates: "maxFee, max_fee".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::MissingField);

        let json = serde_json::to_string(&err.code()).unwrap();
        assert_eq!(json, "\"missing_field\"");
    }

    #[test]
    fn test_missing_field_message_names_field() {
        let err = SignerError::MissingField {
            type_name: "PermitTransfer".to_string(),
            field: "nonce".to_string(),
            candidates: "nonce".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("nonce"));
        assert!(msg.contains("PermitTransfer"));
    }

    #[test]
    fn test_hex_error_is_malformed_input() {
        let err: SignerError = hex::decode("zz").unwrap_err().into();
        assert_eq!(err.code(), ErrorCode::MalformedInput);
    }
}
