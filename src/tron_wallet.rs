// Tron (TRX) address handling
// Uses secp256k1 like Ethereum; the 20-byte account id is wrapped as
// 0x41 || id || checksum and Base58 encoded (T... addresses)

use crate::crypto::base58;
use crate::crypto::keccak256;
use crate::error::{SignerError, SignerResult};
use secp256k1::{PublicKey, Secp256k1, SecretKey};

/// Version byte of every mainnet and Nile address
pub const TRON_ADDRESS_PREFIX: u8 = 0x41;

/// Raw account id length
pub const ADDRESS_PAYLOAD_LEN: usize = 20;

/// prefix + payload + checksum
pub const DECODED_ADDRESS_LEN: usize = 1 + ADDRESS_PAYLOAD_LEN + base58::CHECKSUM_LEN;

/// Decode a T... address to its 20-byte account id
///
/// Strips the version byte and checksum without verifying them; the
/// verifying contract only ever sees the 160-bit id.
pub fn address_to_bytes(address: &str) -> SignerResult<[u8; ADDRESS_PAYLOAD_LEN]> {
    let decoded = base58::decode(address)?;
    if decoded.len() != DECODED_ADDRESS_LEN {
        return Err(SignerError::malformed(format!(
            "address {} decodes to {} bytes, expected {}",
            address,
            decoded.len(),
            DECODED_ADDRESS_LEN
        )));
    }

    let mut payload = [0u8; ADDRESS_PAYLOAD_LEN];
    payload.copy_from_slice(&decoded[1..1 + ADDRESS_PAYLOAD_LEN]);
    Ok(payload)
}

/// Strict variant of [`address_to_bytes`]: checksum and prefix must match
pub fn validate_address(address: &str) -> SignerResult<[u8; ADDRESS_PAYLOAD_LEN]> {
    let payload = base58::decode_check(address)?;
    if payload.len() != 1 + ADDRESS_PAYLOAD_LEN {
        return Err(SignerError::malformed(format!(
            "address {} has a {}-byte payload",
            address,
            payload.len()
        )));
    }
    if payload[0] != TRON_ADDRESS_PREFIX {
        return Err(SignerError::malformed(format!(
            "address {} has version byte 0x{:02x}, expected 0x41",
            address, payload[0]
        )));
    }

    let mut id = [0u8; ADDRESS_PAYLOAD_LEN];
    id.copy_from_slice(&payload[1..]);
    Ok(id)
}

/// Encode a 20-byte account id as a T... address
pub fn bytes_to_address(payload: &[u8; ADDRESS_PAYLOAD_LEN]) -> String {
    let mut full_address = Vec::with_capacity(1 + ADDRESS_PAYLOAD_LEN);
    full_address.push(TRON_ADDRESS_PREFIX);
    full_address.extend_from_slice(payload);
    base58::encode_check(&full_address)
}

/// Encode Tron address from public key
pub fn address_from_public_key(public_key: &PublicKey) -> String {
    // Keccak of the 64-byte uncompressed key (skip the 04 prefix), last 20 bytes
    let public_uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&public_uncompressed[1..]);

    let mut payload = [0u8; ADDRESS_PAYLOAD_LEN];
    payload.copy_from_slice(&hash[12..]);
    bytes_to_address(&payload)
}

/// Tron address controlled by a hex private key
pub fn address_from_private_key(private_key_hex: &str) -> SignerResult<String> {
    let key_bytes = crate::eip712::parse_private_key(private_key_hex)?;
    let secret_key = SecretKey::from_slice(&key_bytes[..])
        .map_err(|e| SignerError::signing(e.to_string()))?;

    let secp = Secp256k1::signing_only();
    let public_key = PublicKey::from_secret_key(&secp, &secret_key);
    Ok(address_from_public_key(&public_key))
}

/// Convert Ethereum address to Tron address format
pub fn eth_to_tron_address(eth_address: &str) -> SignerResult<String> {
    let hex_addr = eth_address.strip_prefix("0x").unwrap_or(eth_address);
    let address_bytes = hex::decode(hex_addr)?;

    let payload: [u8; ADDRESS_PAYLOAD_LEN] = address_bytes.as_slice().try_into().map_err(|_| {
        SignerError::malformed(format!(
            "address must be 20 bytes, got {}",
            address_bytes.len()
        ))
    })?;
    Ok(bytes_to_address(&payload))
}
