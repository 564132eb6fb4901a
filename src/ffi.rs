//! FFI Layer
//!
//! All C-ABI exports are defined here. Every function follows one pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `gasfree_free_string`)
//!
//! Error handling: all functions return JSON with a `success` field.
//! On error, `success: false` and the `error` object is populated.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zeroize::Zeroize;

use crate::eip712::{self, Eip712Domain, Eip712Signature, SignOptions};
use crate::error::SignerError;
use crate::permit::{self, Network};
use crate::types::ApiResponse;

// =============================================================================
// Memory Management
// =============================================================================

/// Free a string returned by any gasfree_* function
///
/// # Safety
/// The pointer must have been returned by a gasfree_* function
#[unsafe(no_mangle)]
pub extern "C" fn gasfree_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Copy a C string into an owned Rust string, or return an error JSON pointer
fn parse_input(input: *const c_char) -> Result<String, *mut c_char> {
    if input.is_null() {
        return Err(error_response(&SignerError::malformed("Null input pointer")));
    }

    let c_str = unsafe { CStr::from_ptr(input) };
    match c_str.to_str() {
        Ok(s) => Ok(s.to_string()),
        Err(_) => Err(error_response(&SignerError::malformed("Invalid UTF-8 string"))),
    }
}

fn success_response<T: Serialize>(data: T) -> *mut c_char {
    string_to_ptr(ApiResponse::ok(data).to_json())
}

fn error_response(error: &SignerError) -> *mut c_char {
    let response: ApiResponse<()> = ApiResponse::err(error);
    string_to_ptr(response.to_json())
}

fn string_to_ptr(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn respond<T: Serialize>(result: Result<T, SignerError>) -> *mut c_char {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_response(&e),
    }
}

/// Explicit domain wins over network; Nile when neither is given
fn resolve_domain(network: Option<Network>, domain: Option<Eip712Domain>) -> Eip712Domain {
    domain.unwrap_or_else(|| network.unwrap_or_default().domain().to_domain())
}

// =============================================================================
// Permit Operations
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignPermitRequest {
    #[serde(alias = "private_key")]
    private_key: String,
    message: Map<String, Value>,
    #[serde(default)]
    network: Option<Network>,
    #[serde(default)]
    domain: Option<Eip712Domain>,
    #[serde(default, alias = "chain_style_v")]
    chain_style_v: Option<bool>,
}

impl Drop for SignPermitRequest {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignPermitResponse {
    signature: String,
    digest: String,
    chain_id: u64,
}

/// Sign a PermitTransfer message
///
/// # Input
/// ```json
/// {
///   "privateKey": "64 hex chars",
///   "message": { "token": "T...", "serviceProvider": "T...", ... },
///   "network": "nile|mainnet",
///   "chainStyleV": true
/// }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "signature": "130 hex chars", "digest": "...", "chainId": 3448148188 } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn gasfree_sign_permit(input: *const c_char) -> *mut c_char {
    let json_str = match parse_input(input) {
        Ok(s) => s,
        Err(ptr) => return ptr,
    };

    let result = serde_json::from_str::<SignPermitRequest>(&json_str)
        .map_err(SignerError::from)
        .and_then(|request| {
            let domain = resolve_domain(request.network, request.domain.clone());
            let options = SignOptions {
                chain_style_v: request.chain_style_v.unwrap_or(true),
            };
            let digest = permit::permit_digest(&request.message, &domain)?;
            let signature =
                permit::sign_permit(&request.private_key, &request.message, &domain, options)?;
            Ok(SignPermitResponse {
                signature,
                digest: hex::encode(digest),
                chain_id: domain.chain_id,
            })
        });

    respond(result)
}

#[derive(Deserialize)]
struct DigestRequest {
    message: Map<String, Value>,
    #[serde(default)]
    network: Option<Network>,
    #[serde(default)]
    domain: Option<Eip712Domain>,
}

/// Compute the PermitTransfer pre-image without signing
///
/// # Output
/// ```json
/// { "success": true, "data": { "domainSeparator": "...", "structHash": "...", "digest": "..." } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn gasfree_permit_digest(input: *const c_char) -> *mut c_char {
    let json_str = match parse_input(input) {
        Ok(s) => s,
        Err(ptr) => return ptr,
    };

    let result = serde_json::from_str::<DigestRequest>(&json_str)
        .map_err(SignerError::from)
        .and_then(|request| {
            let domain = resolve_domain(request.network, request.domain);
            Ok(permit::permit_pre_image(&request.message, &domain)?.to_hex())
        });

    respond(result)
}

#[derive(Deserialize)]
struct RecoverRequest {
    digest: String,
    signature: String,
}

#[derive(Serialize)]
struct RecoverResponse {
    address: String,
}

/// Recover the TRON address that signed a digest
///
/// # Input
/// ```json
/// { "digest": "64 hex chars", "signature": "130 hex chars" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn gasfree_recover_signer(input: *const c_char) -> *mut c_char {
    let json_str = match parse_input(input) {
        Ok(s) => s,
        Err(ptr) => return ptr,
    };

    let result = serde_json::from_str::<RecoverRequest>(&json_str)
        .map_err(SignerError::from)
        .and_then(|request| {
            let stripped = request.digest.strip_prefix("0x").unwrap_or(&request.digest);
            let digest = hex::decode(stripped)?;
            let signature = Eip712Signature::from_hex(&request.signature)?;
            let address = eip712::recover_address(&digest, &signature)?;
            Ok(RecoverResponse { address })
        });

    respond(result)
}
