//! Hashing and text-encoding primitives
//!
//! - Keccak-256 (pre-NIST padding, as verified on-chain)
//! - Base58 and Base58Check for TRON addresses

pub mod base58;
pub mod keccak;

pub use keccak::{keccak256, keccak256_hex, Keccak256, DIGEST_LEN};
