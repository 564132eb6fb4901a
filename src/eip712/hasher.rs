//! EIP-712 Hashing
//!
//! Struct hashing, the domain separator and the final `\x19\x01` digest.

use super::encoder::{encode_value, field_name_candidates, lookup_field, type_hash};
use super::types::*;
use crate::crypto::{keccak256, DIGEST_LEN};
use crate::error::{SignerError, SignerResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// Magic prefix for EIP-712 encoding
pub const EIP712_PREFIX: &[u8; 2] = b"\x19\x01";

/// Name of the implicit domain struct
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

/// `EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)`
pub fn domain_type() -> TypedDataType {
    TypedDataType::new(
        EIP712_DOMAIN_TYPE,
        &[
            ("name", "string"),
            ("version", "string"),
            ("chainId", "uint256"),
            ("verifyingContract", "address"),
        ],
    )
}

/// Type hash followed by one word per declared field
pub fn encode_data(
    type_name: &str,
    data: &Map<String, Value>,
    registry: &TypeRegistry,
) -> SignerResult<Vec<u8>> {
    let ty = registry.resolve(type_name)?;

    let mut encoded = Vec::with_capacity(32 * (ty.fields.len() + 1));
    encoded.extend_from_slice(&type_hash(type_name, registry)?);

    for field in &ty.fields {
        let value = lookup_field(data, &field.name).ok_or_else(|| SignerError::MissingField {
            type_name: type_name.to_string(),
            field: field.name.clone(),
            candidates: field_name_candidates(&field.name).join(", "),
        })?;

        let word = encode_value(&field.type_name, value, registry).map_err(|e| match e {
            SignerError::MalformedInput(msg) => {
                SignerError::MalformedInput(format!("{}.{}: {}", type_name, field.name, msg))
            }
            other => other,
        })?;
        encoded.extend_from_slice(&word);
    }

    Ok(encoded)
}

/// hashStruct(s) = keccak256(typeHash ‖ encodeData(s))
pub fn hash_struct(
    type_name: &str,
    data: &Map<String, Value>,
    registry: &TypeRegistry,
) -> SignerResult<[u8; 32]> {
    let encoded = encode_data(type_name, data, registry)?;
    Ok(keccak256(&encoded))
}

/// Calculate the domain separator hash
///
/// domainSeparator = hashStruct(eip712Domain)
pub fn hash_domain(domain: &Eip712Domain) -> SignerResult<[u8; 32]> {
    let mut registry = TypeRegistry::new();
    registry.register(domain_type())?;
    hash_struct(EIP712_DOMAIN_TYPE, &domain.to_message(), &registry)
}

/// keccak256("\x19\x01" ‖ domainSeparator ‖ hashStruct(message))
pub fn final_digest(
    domain: &Eip712Domain,
    primary_type: &str,
    message: &Map<String, Value>,
    registry: &TypeRegistry,
) -> SignerResult<[u8; 32]> {
    Ok(get_pre_image(domain, primary_type, message, registry)?.digest)
}

/// Interpret a byte slice as a 32-byte digest
pub fn digest_from_slice(bytes: &[u8]) -> SignerResult<[u8; 32]> {
    if bytes.len() != DIGEST_LEN {
        return Err(SignerError::InvalidDigestLength(bytes.len()));
    }
    let mut digest = [0u8; 32];
    digest.copy_from_slice(bytes);
    Ok(digest)
}

/// Intermediate hashes of one typed-data signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreImage {
    pub domain_separator: [u8; 32],
    pub struct_hash: [u8; 32],
    pub digest: [u8; 32],
}

impl PreImage {
    /// The 66 bytes that are hashed into the digest
    pub fn signing_input(&self) -> [u8; 66] {
        let mut input = [0u8; 66];
        input[..2].copy_from_slice(EIP712_PREFIX);
        input[2..34].copy_from_slice(&self.domain_separator);
        input[34..].copy_from_slice(&self.struct_hash);
        input
    }

    pub fn to_hex(&self) -> PreImageHex {
        PreImageHex {
            domain_separator: hex::encode(self.domain_separator),
            struct_hash: hex::encode(self.struct_hash),
            digest: hex::encode(self.digest),
        }
    }
}

/// Hex view of [`PreImage`] for JSON output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreImageHex {
    pub domain_separator: String,
    pub struct_hash: String,
    pub digest: String,
}

/// Compute the domain separator, struct hash and digest in one pass
pub fn get_pre_image(
    domain: &Eip712Domain,
    primary_type: &str,
    message: &Map<String, Value>,
    registry: &TypeRegistry,
) -> SignerResult<PreImage> {
    let domain_separator = hash_domain(domain)?;
    let struct_hash = hash_struct(primary_type, message, registry)?;

    let mut pre_image = PreImage {
        domain_separator,
        struct_hash,
        digest: [0u8; 32],
    };
    pre_image.digest = digest_from_slice(&keccak256(&pre_image.signing_input()))?;

    Ok(pre_image)
}
