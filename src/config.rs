//! Signer Configuration
//!
//! Runtime settings with:
//! - Network selection (Nile testnet or mainnet controller)
//! - The chain-style V flag
//! - Default deadline window for new permits
//! - Debug logging switch
//!
//! Every setting can be overridden from `GASFREE_*` environment variables.

use crate::eip712::{Eip712Domain, SignOptions};
use crate::error::{SignerError, SignerResult};
use crate::permit::Network;
use crate::utils::logging;
use std::time::Duration;

pub const ENV_NETWORK: &str = "GASFREE_NETWORK";
pub const ENV_CHAIN_STYLE_V: &str = "GASFREE_CHAIN_STYLE_V";
pub const ENV_DEADLINE_SECS: &str = "GASFREE_DEADLINE_SECS";
pub const ENV_DEBUG: &str = "GASFREE_DEBUG";

/// Seconds a freshly built permit stays valid
pub const DEFAULT_DEADLINE_SECS: u64 = 180;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerConfig {
    pub network: Network,
    /// Emit `v = recovery_id + 27`
    pub chain_style_v: bool,
    pub deadline_secs: u64,
    pub debug_logging: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            network: Network::Nile,
            chain_style_v: true,
            deadline_secs: DEFAULT_DEADLINE_SECS,
            debug_logging: false,
        }
    }
}

impl SignerConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> SignerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`
    pub fn from_lookup<F>(lookup: F) -> SignerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(network) = lookup(ENV_NETWORK) {
            config.network = network.parse()?;
        }
        if let Some(flag) = lookup(ENV_CHAIN_STYLE_V) {
            config.chain_style_v = parse_bool(ENV_CHAIN_STYLE_V, &flag)?;
        }
        if let Some(secs) = lookup(ENV_DEADLINE_SECS) {
            config.deadline_secs = secs.trim().parse().map_err(|_| {
                SignerError::malformed(format!("{} must be an integer, got {:?}", ENV_DEADLINE_SECS, secs))
            })?;
        }
        if let Some(flag) = lookup(ENV_DEBUG) {
            config.debug_logging = parse_bool(ENV_DEBUG, &flag)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SignerResult<()> {
        if self.deadline_secs == 0 {
            return Err(SignerError::malformed("deadline window must be positive"));
        }
        Ok(())
    }

    pub fn domain(&self) -> Eip712Domain {
        self.network.domain().to_domain()
    }

    pub fn sign_options(&self) -> SignOptions {
        SignOptions {
            chain_style_v: self.chain_style_v,
        }
    }

    pub fn deadline_window(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// Apply the logging switch to the global logger
    pub fn apply_logging(&self) {
        if self.debug_logging {
            logging::enable_debug();
        } else {
            logging::disable_debug();
        }
    }
}

fn parse_bool(key: &str, value: &str) -> SignerResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(SignerError::malformed(format!(
            "{} must be a boolean, got {:?}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SignerConfig::default();
        assert_eq!(config.network, Network::Nile);
        assert!(config.chain_style_v);
        assert_eq!(config.deadline_window(), Duration::from_secs(180));
        assert_eq!(config.domain().chain_id, 3_448_148_188);
        assert_eq!(config.sign_options(), SignOptions::default());
    }

    #[test]
    fn test_overrides() {
        let config = SignerConfig::from_lookup(lookup_from(&[
            (ENV_NETWORK, "mainnet"),
            (ENV_CHAIN_STYLE_V, "false"),
            (ENV_DEADLINE_SECS, "600"),
            (ENV_DEBUG, "1"),
        ]))
        .unwrap();

        assert_eq!(config.network, Network::Mainnet);
        assert!(!config.chain_style_v);
        assert_eq!(config.deadline_secs, 600);
        assert!(config.debug_logging);
        assert_eq!(config.domain().chain_id, 728_126_428);
        assert_eq!(config.sign_options(), SignOptions::raw_v());
    }

    #[test]
    fn test_invalid_values() {
        assert!(SignerConfig::from_lookup(lookup_from(&[(ENV_NETWORK, "shasta")])).is_err());
        assert!(SignerConfig::from_lookup(lookup_from(&[(ENV_CHAIN_STYLE_V, "maybe")])).is_err());
        assert!(SignerConfig::from_lookup(lookup_from(&[(ENV_DEADLINE_SECS, "-3")])).is_err());
        assert!(SignerConfig::from_lookup(lookup_from(&[(ENV_DEADLINE_SECS, "0")])).is_err());
    }
}
