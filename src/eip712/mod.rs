//! EIP-712 Typed Data Signing
//!
//! Typed structured-data hashing and signing over TRON addresses, as
//! verified by the GasFree controller contract.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use gasfree_tron_signer::eip712::{sign_typed_data, SignOptions};
//!
//! let sig = sign_typed_data(&key_hex, &domain, "PermitTransfer", &message, &registry, SignOptions::default())?;
//! assert_eq!(sig.len(), 130);
//! ```

pub mod encoder;
pub mod hasher;
pub mod signer;
pub mod types;

pub use encoder::*;
pub use hasher::*;
pub use signer::*;
pub use types::*;
