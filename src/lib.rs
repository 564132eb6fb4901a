//! GasFree TRON Signer
//!
//! Typed-data signing for GasFree gasless TRC-20 transfers on TRON.
//!
//! # Architecture
//!
//! This crate provides:
//! - **crypto**: Keccak-256 and Base58(Check), implemented in-crate
//! - **tron_wallet**: TRON address decoding, encoding and derivation
//! - **eip712**: Type encoding, struct hashing, domain separation, signing
//! - **permit**: The GasFree `PermitTransfer` message and network domains
//! - **config**: Runtime settings with environment overrides
//! - **ffi**: C-ABI exports
//!
//! # FFI Usage
//!
//! All public FFI functions are in the `ffi` module and follow this pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `gasfree_free_string`)
//!
//! # Security
//!
//! Private keys are parsed into `zeroize::Zeroizing` buffers and wiped when
//! dropped. Nothing in this crate logs key material.
//!
//! # Example
//!
//! ```rust,ignore
//! use gasfree_tron_signer::permit::sign_permit_testnet;
//!
//! let sig = sign_permit_testnet(&private_key_hex, &message)?;
//! assert_eq!(sig.len(), 130);
//! ```

pub mod config;
pub mod crypto;
pub mod eip712;
pub mod error;
pub mod ffi;
pub mod permit;
pub mod tron_wallet;
pub mod types;
pub mod utils;

// Re-export key types for convenience
pub use config::SignerConfig;
pub use crypto::{keccak256, keccak256_hex, Keccak256};
pub use eip712::{Eip712Domain, Eip712Signature, SignOptions, TypeRegistry, TypedDataType};
pub use error::{ErrorCode, SignerError, SignerResult};
pub use permit::{
    sign_permit, sign_permit_mainnet, sign_permit_testnet, Network, NetworkDomain,
    PermitTransfer, TransferRequest,
};
pub use types::{ApiResponse, ErrorBody};
pub use utils::U256;

pub use ffi::{gasfree_free_string, gasfree_permit_digest, gasfree_recover_signer, gasfree_sign_permit};
