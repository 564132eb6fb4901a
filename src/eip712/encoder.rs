//! EIP-712 Type Encoding
//!
//! Canonical type strings, dependency closures and the 32-byte word for
//! every supported field value.

use super::hasher::hash_struct;
use super::types::*;
use crate::crypto::keccak256;
use crate::error::{SignerError, SignerResult};
use crate::tron_wallet::address_to_bytes;
use crate::utils::U256;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Encode a type string for a struct type
///
/// Format: `Primary(type1 name1,...)Dep1(...)Dep2(...)`, dependencies in
/// lexicographic order.
pub fn encode_type(type_name: &str, registry: &TypeRegistry) -> SignerResult<String> {
    let primary = registry.resolve(type_name)?;
    let dependencies = find_type_dependencies(type_name, registry)?;

    let mut result = primary.signature();
    for dep in dependencies.iter().filter(|dep| dep.as_str() != type_name) {
        result.push_str(&registry.resolve(dep)?.signature());
    }

    Ok(result)
}

/// Find all struct types reachable from `type_name`, itself included
///
/// Work-list traversal; each type is expanded once, so cyclic definitions
/// terminate.
pub fn find_type_dependencies(
    type_name: &str,
    registry: &TypeRegistry,
) -> SignerResult<BTreeSet<String>> {
    let mut dependencies = BTreeSet::new();
    let mut to_visit = vec![type_name.to_string()];

    while let Some(current) = to_visit.pop() {
        if dependencies.contains(&current) {
            continue;
        }

        let ty = registry.resolve(&current)?;
        for field in &ty.fields {
            let base = base_type(&field.type_name);
            if is_primitive_type(base) {
                continue;
            }
            if !registry.contains(base) {
                return Err(SignerError::unresolvable(format!(
                    "{} (field {}.{})",
                    field.type_name, current, field.name
                )));
            }
            if !dependencies.contains(base) {
                to_visit.push(base.to_string());
            }
        }

        dependencies.insert(current);
    }

    Ok(dependencies)
}

/// Calculate the type hash for a struct type
///
/// typeHash = keccak256(encodeType(typeOf(s)))
pub fn type_hash(type_name: &str, registry: &TypeRegistry) -> SignerResult<[u8; 32]> {
    let encoded = encode_type(type_name, registry)?;
    Ok(keccak256(encoded.as_bytes()))
}

/// Encode a value according to its type as one 32-byte word
pub fn encode_value(
    type_name: &str,
    value: &Value,
    registry: &TypeRegistry,
) -> SignerResult<[u8; 32]> {
    if let Some(element_type) = array_element_type(type_name) {
        return encode_array(type_name, element_type, value, registry);
    }

    match type_name {
        "string" => Ok(keccak256(expect_str(type_name, value)?.as_bytes())),
        "bytes" => Ok(keccak256(&parse_hex(expect_str(type_name, value)?)?)),
        "uint256" => encode_uint(value),
        "address" => encode_address(value),
        _ if registry.contains(type_name) => {
            let obj = value.as_object().ok_or_else(|| invalid_value(type_name, value))?;
            hash_struct(type_name, obj, registry)
        }
        _ => Err(SignerError::unresolvable(type_name)),
    }
}

/// Encode an array value: keccak of the concatenated element words
fn encode_array(
    type_name: &str,
    element_type: &str,
    value: &Value,
    registry: &TypeRegistry,
) -> SignerResult<[u8; 32]> {
    let items = value.as_array().ok_or_else(|| invalid_value(type_name, value))?;

    let mut encoded = Vec::with_capacity(items.len() * 32);
    for item in items {
        encoded.extend_from_slice(&encode_value(element_type, item, registry)?);
    }

    Ok(keccak256(&encoded))
}

/// Parse a uint256 from a JSON integer or decimal string, big-endian word
///
/// Numbers keep their literal text (`arbitrary_precision`), so integers past
/// `u64` parse exactly while fractions, exponents and signs are rejected.
pub fn encode_uint(value: &Value) -> SignerResult<[u8; 32]> {
    let parsed = match value {
        Value::Number(n) => U256::from_dec_str(&n.to_string())?,
        Value::String(s) => U256::from_dec_str(s)?,
        _ => return Err(invalid_value("uint256", value)),
    };
    Ok(parsed.to_be_bytes())
}

/// Address as a uint160: the 20-byte account id, left-padded
pub fn encode_address(value: &Value) -> SignerResult<[u8; 32]> {
    let address = expect_str("address", value)?;
    let id = address_to_bytes(address)?;

    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&id);
    Ok(word)
}

// MARK: - Field lookup

/// Keys tried for a field, in order: literal, snake_case, camelCase
pub fn field_name_candidates(field_name: &str) -> Vec<String> {
    let mut candidates = vec![field_name.to_string()];
    for alternative in [to_snake_case(field_name), to_camel_case(field_name)] {
        if !candidates.contains(&alternative) {
            candidates.push(alternative);
        }
    }
    candidates
}

/// First non-null value stored under any accepted spelling of `field_name`
pub fn lookup_field<'a>(data: &'a Map<String, Value>, field_name: &str) -> Option<&'a Value> {
    field_name_candidates(field_name)
        .iter()
        .find_map(|key| data.get(key).filter(|v| !v.is_null()))
}

/// `serviceProvider` -> `service_provider`
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `max_fee` -> `maxFee`
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, word) in name.split('_').enumerate() {
        if i == 0 {
            out.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

// MARK: - Helpers

fn expect_str<'a>(type_name: &str, value: &'a Value) -> SignerResult<&'a str> {
    value.as_str().ok_or_else(|| invalid_value(type_name, value))
}

fn invalid_value(type_name: &str, value: &Value) -> SignerError {
    SignerError::malformed(format!("invalid value for type {}: {}", type_name, value))
}

/// Parse a hex string (with or without 0x prefix)
fn parse_hex(s: &str) -> SignerResult<Vec<u8>> {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    Ok(hex::decode(s)?)
}
