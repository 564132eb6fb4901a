//! EIP-712 Type Definitions
//!
//! Core data structures for typed data signing: struct definitions, the
//! registry they live in, the domain and the signature.

use crate::error::{SignerError, SignerResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Types the encoder understands without a registry entry
pub const PRIMITIVE_TYPES: [&str; 4] = ["string", "bytes", "uint256", "address"];

/// A field in a struct type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataField {
    /// The name of the field
    pub name: String,
    /// The type of the field (e.g., "address", "uint256", "Person[]")
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A named struct type with ordered fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataType {
    pub name: String,
    pub fields: Vec<TypedDataField>,
}

impl TypedDataType {
    /// Build from `(field name, field type)` pairs in declaration order
    pub fn new(name: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        Self {
            name: name.into(),
            fields: fields
                .iter()
                .map(|(field, ty)| TypedDataField::new(*field, *ty))
                .collect(),
        }
    }

    /// `Name(type1 name1,type2 name2,...)`
    pub fn signature(&self) -> String {
        let field_strs: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{} {}", f.type_name, f.name))
            .collect();

        format!("{}({})", self.name, field_strs.join(","))
    }
}

/// Struct types available to the encoder, keyed by name
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypedDataType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type; each name may only be registered once
    pub fn register(&mut self, ty: TypedDataType) -> SignerResult<()> {
        if self.types.contains_key(&ty.name) {
            return Err(SignerError::malformed(format!(
                "type {} is already registered",
                ty.name
            )));
        }
        self.types.insert(ty.name.clone(), ty);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_type(mut self, ty: TypedDataType) -> SignerResult<Self> {
        self.register(ty)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&TypedDataType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Look up a struct type, failing with `UnresolvableType`
    pub fn resolve(&self, name: &str) -> SignerResult<&TypedDataType> {
        self.types
            .get(name)
            .ok_or_else(|| SignerError::unresolvable(name))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Check that every field type is primitive or registered
    pub fn validate(&self) -> SignerResult<()> {
        for ty in self.types.values() {
            for field in &ty.fields {
                let base = base_type(&field.type_name);
                if !is_primitive_type(base) && !self.contains(base) {
                    return Err(SignerError::unresolvable(format!(
                        "{} (field {}.{})",
                        field.type_name, ty.name, field.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The EIP-712 domain separator data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    /// The human-readable name of the signing domain
    pub name: String,
    /// The current major version of the signing domain
    pub version: String,
    /// Chain id of the network the verifying contract lives on
    pub chain_id: u64,
    /// T... address of the contract that will verify the signature
    pub verifying_contract: String,
}

impl Eip712Domain {
    /// Field map matching the implicit `EIP712Domain` struct
    pub fn to_message(&self) -> Map<String, Value> {
        let mut message = Map::new();
        message.insert("name".to_string(), Value::from(self.name.clone()));
        message.insert("version".to_string(), Value::from(self.version.clone()));
        message.insert("chainId".to_string(), Value::from(self.chain_id));
        message.insert(
            "verifyingContract".to_string(),
            Value::from(self.verifying_contract.clone()),
        );
        message
    }
}

/// EIP-712 signature components
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Eip712Signature {
    /// r component (32 bytes)
    pub r: [u8; 32],
    /// s component (32 bytes)
    pub s: [u8; 32],
    /// v component: recovery id, or recovery id + 27 in chain style
    pub v: u8,
}

impl Eip712Signature {
    /// Create from raw components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Create from 65-byte signature (r || s || v)
    pub fn from_bytes(bytes: &[u8]) -> SignerResult<Self> {
        if bytes.len() != 65 {
            return Err(SignerError::malformed(format!(
                "signature must be 65 bytes, got {}",
                bytes.len()
            )));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);

        Ok(Self { r, s, v: bytes[64] })
    }

    /// Parse 130 hex characters, `0x` prefix optional
    pub fn from_hex(hex_str: &str) -> SignerResult<Self> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        Self::from_bytes(&hex::decode(stripped)?)
    }

    /// Convert to 65-byte representation (r || s || v)
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Lowercase hex, no prefix (130 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Recovery id in {0, 1, 2, 3} regardless of the V convention
    pub fn recovery_id(&self) -> SignerResult<u8> {
        match self.v {
            0..=3 => Ok(self.v),
            27..=30 => Ok(self.v - 27),
            other => Err(SignerError::malformed(format!("invalid v value {}", other))),
        }
    }
}

/// Check if a type is one of the built-in primitives
pub fn is_primitive_type(type_name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&type_name)
}

/// Element type of a dynamic array type: `"Person[]"` -> `Some("Person")`
pub fn array_element_type(type_name: &str) -> Option<&str> {
    type_name.strip_suffix("[]")
}

/// Strip every trailing `[]`: `"uint256[][]"` -> `"uint256"`
pub fn base_type(type_name: &str) -> &str {
    let mut current = type_name;
    while let Some(element) = array_element_type(current) {
        current = element;
    }
    current
}
