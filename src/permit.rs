//! GasFree PermitTransfer
//!
//! The one message type the GasFree controller verifies, its two network
//! domains, and the signed request body handed to the transport layer.

use crate::eip712::{self, Eip712Domain, PreImage, SignOptions, TypeRegistry, TypedDataType};
use crate::error::{SignerError, SignerResult};
use crate::tron_wallet::validate_address;
use crate::log_debug;
use crate::utils::{to_base_units, U256};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const PERMIT_TRANSFER_TYPE: &str = "PermitTransfer";

/// `PermitTransfer(address token,...,uint256 nonce)` in declared order
pub fn permit_transfer_type() -> TypedDataType {
    TypedDataType::new(
        PERMIT_TRANSFER_TYPE,
        &[
            ("token", "address"),
            ("serviceProvider", "address"),
            ("user", "address"),
            ("receiver", "address"),
            ("value", "uint256"),
            ("maxFee", "uint256"),
            ("deadline", "uint256"),
            ("version", "uint256"),
            ("nonce", "uint256"),
        ],
    )
}

/// Registry holding only the PermitTransfer type
pub fn permit_registry() -> SignerResult<TypeRegistry> {
    TypeRegistry::new().with_type(permit_transfer_type())
}

// MARK: - Network domains

/// Frozen domain parameters of a deployed GasFree controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDomain {
    pub name: &'static str,
    pub version: &'static str,
    pub chain_id: u64,
    pub verifying_contract: &'static str,
}

impl NetworkDomain {
    /// TRON Nile testnet
    pub const NILE: NetworkDomain = NetworkDomain {
        name: "GasFreeController",
        version: "V1.0.0",
        chain_id: 3_448_148_188,
        verifying_contract: "THQGuFzL87ZqhxkgqYEryRAd7gqFqL5rdc",
    };

    /// TRON mainnet
    pub const MAINNET: NetworkDomain = NetworkDomain {
        name: "GasFreeController",
        version: "V1.0.0",
        chain_id: 728_126_428,
        verifying_contract: "TFFAMQLZybALaLb4uxHA9RBE7pxhUAjF3U",
    };

    pub fn to_domain(&self) -> Eip712Domain {
        Eip712Domain {
            name: self.name.to_string(),
            version: self.version.to_string(),
            chain_id: self.chain_id,
            verifying_contract: self.verifying_contract.to_string(),
        }
    }
}

/// Supported TRON networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Nile,
    Mainnet,
}

impl Network {
    pub fn domain(&self) -> NetworkDomain {
        match self {
            Network::Nile => NetworkDomain::NILE,
            Network::Mainnet => NetworkDomain::MAINNET,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Nile => "nile",
            Network::Mainnet => "mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nile" | "testnet" => Ok(Network::Nile),
            "mainnet" | "main" => Ok(Network::Mainnet),
            other => Err(SignerError::malformed(format!("unknown network: {}", other))),
        }
    }
}

// MARK: - Typed message

/// A GasFree transfer authorization
///
/// Accepts camelCase or snake_case keys; integers may arrive as JSON numbers
/// or decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitTransfer {
    /// TRC-20 token contract
    pub token: String,
    #[serde(alias = "service_provider")]
    pub service_provider: String,
    /// Owner of the GasFree account
    pub user: String,
    pub receiver: String,
    /// Amount in the token's smallest unit
    #[serde(with = "decimal_u256")]
    pub value: U256,
    #[serde(alias = "max_fee", with = "decimal_u256")]
    pub max_fee: U256,
    /// Unix seconds after which the controller rejects the transfer
    #[serde(deserialize_with = "flexible_u64")]
    pub deadline: u64,
    #[serde(deserialize_with = "flexible_u64")]
    pub version: u64,
    #[serde(deserialize_with = "flexible_u64")]
    pub nonce: u64,
}

impl PermitTransfer {
    /// Parse from a JSON object
    pub fn from_json(json: &str) -> SignerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from an already decoded field map
    pub fn from_message(message: &Map<String, Value>) -> SignerResult<Self> {
        Ok(Self::deserialize(Value::Object(message.clone()))?)
    }

    /// Set the deadline `secs` seconds from now
    pub fn expiring_in(mut self, secs: u64) -> Self {
        self.deadline = deadline_in(secs);
        self
    }

    /// Set `value` from a human amount such as `"1.5"`
    pub fn with_amount(mut self, human_amount: &str, decimals: u32) -> SignerResult<Self> {
        self.value = to_base_units(human_amount, decimals)?;
        Ok(self)
    }

    /// Strict checksum and prefix check of all four addresses
    pub fn validate(&self) -> SignerResult<()> {
        for (field, address) in [
            ("token", &self.token),
            ("serviceProvider", &self.service_provider),
            ("user", &self.user),
            ("receiver", &self.receiver),
        ] {
            validate_address(address)
                .map_err(|e| SignerError::malformed(format!("{}: {}", field, e)))?;
        }
        Ok(())
    }

    /// camelCase field map fed to the struct hasher
    pub fn to_message(&self) -> Map<String, Value> {
        let mut message = Map::new();
        message.insert("token".to_string(), Value::from(self.token.clone()));
        message.insert(
            "serviceProvider".to_string(),
            Value::from(self.service_provider.clone()),
        );
        message.insert("user".to_string(), Value::from(self.user.clone()));
        message.insert("receiver".to_string(), Value::from(self.receiver.clone()));
        message.insert("value".to_string(), Value::from(self.value.to_string()));
        message.insert("maxFee".to_string(), Value::from(self.max_fee.to_string()));
        message.insert("deadline".to_string(), Value::from(self.deadline));
        message.insert("version".to_string(), Value::from(self.version));
        message.insert("nonce".to_string(), Value::from(self.nonce));
        message
    }

    pub fn digest(&self, domain: &Eip712Domain) -> SignerResult<[u8; 32]> {
        permit_digest(&self.to_message(), domain)
    }

    /// Sign and wrap into the submission body
    pub fn sign(
        &self,
        private_key_hex: &str,
        domain: &Eip712Domain,
        options: SignOptions,
    ) -> SignerResult<TransferRequest> {
        let sig = sign_permit(private_key_hex, &self.to_message(), domain, options)?;
        Ok(TransferRequest {
            permit: self.clone(),
            sig,
        })
    }
}

/// Signed transfer submission body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    #[serde(flatten)]
    pub permit: PermitTransfer,
    /// 130 hex characters, no prefix
    pub sig: String,
}

impl TransferRequest {
    pub fn to_json(&self) -> SignerResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Unix timestamp `secs` seconds from now
pub fn deadline_in(secs: u64) -> u64 {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    now.saturating_add(secs)
}

// MARK: - Signing entry points

/// Final digest of a PermitTransfer message
pub fn permit_digest(message: &Map<String, Value>, domain: &Eip712Domain) -> SignerResult<[u8; 32]> {
    let registry = permit_registry()?;
    eip712::final_digest(domain, PERMIT_TRANSFER_TYPE, message, &registry)
}

/// Domain separator, struct hash and digest of a PermitTransfer message
pub fn permit_pre_image(message: &Map<String, Value>, domain: &Eip712Domain) -> SignerResult<PreImage> {
    let registry = permit_registry()?;
    eip712::get_pre_image(domain, PERMIT_TRANSFER_TYPE, message, &registry)
}

/// Sign a PermitTransfer message under `domain`
pub fn sign_permit(
    private_key_hex: &str,
    message: &Map<String, Value>,
    domain: &Eip712Domain,
    options: SignOptions,
) -> SignerResult<String> {
    log_debug!(
        "permit",
        "signing PermitTransfer",
        chain_id = domain.chain_id,
        contract = domain.verifying_contract,
    );

    let registry = permit_registry()?;
    eip712::sign_typed_data(
        private_key_hex,
        domain,
        PERMIT_TRANSFER_TYPE,
        message,
        &registry,
        options,
    )
}

/// Sign against the Nile testnet controller
pub fn sign_permit_testnet(private_key_hex: &str, message: &Map<String, Value>) -> SignerResult<String> {
    sign_permit(
        private_key_hex,
        message,
        &NetworkDomain::NILE.to_domain(),
        SignOptions::default(),
    )
}

/// Sign against the mainnet controller
pub fn sign_permit_mainnet(private_key_hex: &str, message: &Map<String, Value>) -> SignerResult<String> {
    sign_permit(
        private_key_hex,
        message,
        &NetworkDomain::MAINNET.to_domain(),
        SignOptions::default(),
    )
}

// MARK: - Serde helpers

/// Integer field text, from a JSON number or a decimal string
///
/// Goes through `Value` so wide numbers keep their literal digits.
fn integer_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.trim().to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected integer or decimal string, got {}",
            other
        ))),
    }
}

fn flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let text = integer_text(deserializer)?;
    text.parse::<u64>()
        .map_err(|e| serde::de::Error::custom(format!("invalid integer {:?}: {}", text, e)))
}

/// U256 as a decimal string on the wire
mod decimal_u256 {
    use super::integer_text;
    use crate::utils::U256;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        U256::from_dec_str(&integer_text(deserializer)?).map_err(serde::de::Error::custom)
    }
}
