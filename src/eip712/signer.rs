//! EIP-712 Signing
//!
//! Recoverable secp256k1 signatures over typed-data digests, plus recovery
//! and verification of the signer's TRON address.

use super::hasher::{digest_from_slice, final_digest};
use super::types::*;
use crate::error::{SignerError, SignerResult};
use crate::log_debug;
use crate::tron_wallet::{address_from_public_key, address_to_bytes};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde_json::{Map, Value};
use zeroize::Zeroizing;

/// Offset added to the recovery id under the chain-style V convention
pub const CHAIN_STYLE_V_OFFSET: u8 = 27;

/// Signature formatting options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignOptions {
    /// Emit `v = recovery_id + 27` instead of the bare recovery id
    pub chain_style_v: bool,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self { chain_style_v: true }
    }
}

impl SignOptions {
    /// Bare recovery id in `v`
    pub fn raw_v() -> Self {
        Self { chain_style_v: false }
    }
}

/// Parse a 64-hex-character private key (`0x` prefix optional)
pub fn parse_private_key(private_key_hex: &str) -> SignerResult<Zeroizing<[u8; 32]>> {
    let trimmed = private_key_hex.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if stripped.len() != 64 {
        return Err(SignerError::malformed(format!(
            "private key must be 64 hex characters, got {}",
            stripped.len()
        )));
    }

    let mut key = Zeroizing::new([0u8; 32]);
    hex::decode_to_slice(stripped, &mut key[..])?;
    Ok(key)
}

/// Sign a pre-computed 32-byte digest
pub fn sign_digest(
    digest: &[u8],
    private_key: &[u8],
    options: SignOptions,
) -> SignerResult<Eip712Signature> {
    let digest = digest_from_slice(digest)?;
    if private_key.len() != 32 {
        return Err(SignerError::signing(format!(
            "invalid private key length: expected 32, got {}",
            private_key.len()
        )));
    }

    let secp = Secp256k1::signing_only();
    let secret_key =
        SecretKey::from_slice(private_key).map_err(|e| SignerError::signing(e.to_string()))?;
    let message = Message::from_digest(digest);

    // RFC 6979 nonces: same key and digest always give the same signature
    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&message, &secret_key)
        .serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&compact[0..32]);
    s.copy_from_slice(&compact[32..64]);

    let mut v = recovery_id.to_i32() as u8;
    if options.chain_style_v {
        v += CHAIN_STYLE_V_OFFSET;
    }

    Ok(Eip712Signature::new(r, s, v))
}

/// Sign a typed-data message, returning 130 lowercase hex characters
pub fn sign_typed_data(
    private_key_hex: &str,
    domain: &Eip712Domain,
    primary_type: &str,
    message: &Map<String, Value>,
    registry: &TypeRegistry,
    options: SignOptions,
) -> SignerResult<String> {
    let key = parse_private_key(private_key_hex)?;
    let digest = final_digest(domain, primary_type, message, registry)?;
    let signature = sign_digest(&digest, &key[..], options)?;

    log_debug!(
        "eip712",
        "signed typed data",
        primary_type = primary_type,
        chain_id = domain.chain_id,
        digest = hex::encode(digest),
    );

    Ok(signature.to_hex())
}

/// Recover the public key that produced `signature` over `digest`
pub fn recover_public_key(digest: &[u8], signature: &Eip712Signature) -> SignerResult<PublicKey> {
    let digest = digest_from_slice(digest)?;

    let recovery_id = RecoveryId::from_i32(signature.recovery_id()? as i32)
        .map_err(|e| SignerError::malformed(e.to_string()))?;

    let mut compact = [0u8; 64];
    compact[0..32].copy_from_slice(&signature.r);
    compact[32..64].copy_from_slice(&signature.s);

    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| SignerError::malformed(e.to_string()))?;

    Secp256k1::verification_only()
        .recover_ecdsa(&Message::from_digest(digest), &recoverable)
        .map_err(|e| SignerError::signing(e.to_string()))
}

/// Recover the signer's TRON address from a signature
pub fn recover_address(digest: &[u8], signature: &Eip712Signature) -> SignerResult<String> {
    let public_key = recover_public_key(digest, signature)?;
    Ok(address_from_public_key(&public_key))
}

/// Check that `signature` over `digest` was made by `expected_address`
pub fn verify_signature(
    digest: &[u8],
    signature: &Eip712Signature,
    expected_address: &str,
) -> SignerResult<bool> {
    let expected = address_to_bytes(expected_address)?;
    let recovered = recover_address(digest, signature)?;
    Ok(address_to_bytes(&recovered)? == expected)
}

#[cfg(test)]
mod signer_tests {
    use super::*;
    use crate::crypto::keccak256;

    const TEST_KEY: &str = "1b3d1201039f2c91d2dac01a218967981d594a4bfa004478e7fed19a12a9fc31";
    const TEST_ADDRESS: &str = "TZ3oPnE1SdAUL1YRd9GJQHenxrXjy4paAn";

    #[test]
    fn test_parse_private_key() {
        let key = parse_private_key(TEST_KEY).unwrap();
        assert_eq!(hex::encode(&key[..]), TEST_KEY);
        assert_eq!(*parse_private_key(&format!("0x{}", TEST_KEY)).unwrap(), *key);

        assert!(matches!(
            parse_private_key("abcd"),
            Err(SignerError::MalformedInput(_))
        ));
        assert!(matches!(
            parse_private_key(&"zz".repeat(32)),
            Err(SignerError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_sign_digest_v_convention() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let digest = keccak256(b"gasfree");

        let chain = sign_digest(&digest, &key[..], SignOptions::default()).unwrap();
        let raw = sign_digest(&digest, &key[..], SignOptions::raw_v()).unwrap();

        assert!(chain.v == 27 || chain.v == 28);
        assert_eq!(chain.v - 27, raw.v);
        assert_eq!(chain.r, raw.r);
        assert_eq!(chain.s, raw.s);
    }

    #[test]
    fn test_sign_and_recover() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let digest = keccak256(b"transfer authorization");

        let signature = sign_digest(&digest, &key[..], SignOptions::default()).unwrap();
        assert_eq!(recover_address(&digest, &signature).unwrap(), TEST_ADDRESS);
        assert!(verify_signature(&digest, &signature, TEST_ADDRESS).unwrap());
        assert!(!verify_signature(&digest, &signature, "TX554G9uKsEv1U6TBQnNPC7dkhbvBFhgrD").unwrap());
    }

    #[test]
    fn test_invalid_digest_length() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let err = sign_digest(&[0u8; 31], &key[..], SignOptions::default()).unwrap_err();
        assert_eq!(err, SignerError::InvalidDigestLength(31));
    }

    #[test]
    fn test_rejected_key_material() {
        let digest = keccak256(b"x");
        assert!(matches!(
            sign_digest(&digest, &[0u8; 32], SignOptions::default()),
            Err(SignerError::SigningFailure(_))
        ));
        assert!(matches!(
            sign_digest(&digest, &[1u8; 16], SignOptions::default()),
            Err(SignerError::SigningFailure(_))
        ));
    }
}
