//! Base58 / Base58Check
//!
//! Bitcoin alphabet. The byte string is treated as one big-endian integer;
//! each leading zero byte is carried separately as a leading `1`.

use crate::error::{SignerError, SignerResult};
use sha2::{Digest, Sha256};

pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of the Base58Check checksum suffix
pub const CHECKSUM_LEN: usize = 4;

fn digit_value(c: char) -> Option<u32> {
    if !c.is_ascii() {
        return None;
    }
    ALPHABET
        .iter()
        .position(|&a| a == c as u8)
        .map(|p| p as u32)
}

/// Encode bytes as Base58
///
/// Empty input encodes to `"1"`.
pub fn encode(bytes: &[u8]) -> String {
    let zeros = bytes.iter().take_while(|&&b| b == 0).count();

    // Repeated long division of the big-endian integer by 58
    let mut number: Vec<u8> = bytes[zeros..].to_vec();
    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len() * 138 / 100 + 1);
    while !number.is_empty() {
        let mut remainder = 0u32;
        let mut quotient = Vec::with_capacity(number.len());
        for &byte in &number {
            let acc = (remainder << 8) | byte as u32;
            let q = acc / 58;
            remainder = acc % 58;
            if !(quotient.is_empty() && q == 0) {
                quotient.push(q as u8);
            }
        }
        digits.push(ALPHABET[remainder as usize]);
        number = quotient;
    }

    let mut result = String::with_capacity(zeros + digits.len());
    result.extend(std::iter::repeat('1').take(zeros));
    result.extend(digits.iter().rev().map(|&d| d as char));

    if result.is_empty() {
        "1".to_string()
    } else {
        result
    }
}

/// Decode a Base58 string
pub fn decode(s: &str) -> SignerResult<Vec<u8>> {
    // Little-endian accumulator, reversed at the end
    let mut number: Vec<u8> = Vec::with_capacity(s.len());

    for (position, c) in s.chars().enumerate() {
        let mut carry = digit_value(c).ok_or_else(|| {
            SignerError::malformed(format!(
                "invalid base58 character '{}' at position {}",
                c, position
            ))
        })?;

        for byte in number.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            number.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let zeros = s.chars().take_while(|&c| c == '1').count();
    let mut result = vec![0u8; zeros];
    result.extend(number.iter().rev());
    Ok(result)
}

/// First four bytes of SHA256(SHA256(payload))
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&second[..CHECKSUM_LEN]);
    out
}

/// Base58 encode `payload || checksum(payload)`
pub fn encode_check(payload: &[u8]) -> String {
    let mut full = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    full.extend_from_slice(payload);
    full.extend_from_slice(&checksum(payload));
    encode(&full)
}

/// Decode a Base58Check string and verify its checksum, returning the payload
pub fn decode_check(s: &str) -> SignerResult<Vec<u8>> {
    let mut decoded = decode(s)?;
    if decoded.len() <= CHECKSUM_LEN {
        return Err(SignerError::malformed(format!(
            "base58check payload too short: {} bytes",
            decoded.len()
        )));
    }

    let split = decoded.len() - CHECKSUM_LEN;
    if checksum(&decoded[..split]) != decoded[split..] {
        return Err(SignerError::malformed("invalid base58check checksum"));
    }

    decoded.truncate(split);
    Ok(decoded)
}
