//! Structured Logging with Sensitive Data Redaction
//!
//! Log lines go to stderr. Values are redacted by key name before they are
//! formatted:
//! - Private keys, signatures, API secrets and tokens are fully masked
//! - Addresses are shortened to a prefix and suffix
//! - Digests are shortened
//!
//! [`sanitize_json`] applies the same key rules to whole JSON documents.

use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag to enable/disable debug logging
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Replacement for masked JSON values
pub const REDACTION_MASK: &str = "***REDACTED***";

/// Key fragments whose values are never logged
const SENSITIVE_KEYS: &[&str] = &[
    "authorization", "api-key", "apikey", "api_key", "x-api-key", "access-token",
    "access_token", "accesstoken", "auth_token", "authtoken", "session_token",
    "sessiontoken", "secret", "private_key", "privatekey", "signature",
    "password", "passphrase", "mnemonic", "seed",
];

/// Keys too short to match as fragments (`sig` would catch `signer`)
const SENSITIVE_EXACT_KEYS: &[&str] = &["sig"];

/// Enable debug logging
pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

/// Disable debug logging
pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the log entry (auto-redacts sensitive data)
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value_str = value.to_string();
        let redacted = redact_if_sensitive(key, &value_str);
        self.fields.push((key, redacted));
        self
    }

    /// Add an address field (partial redaction)
    pub fn address_field(mut self, key: &'static str, address: &str) -> Self {
        let redacted = redact_address(address);
        self.fields.push((key, redacted));
        self
    }

    /// Render without timestamp
    pub fn render(&self) -> String {
        let fields_str = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        if fields_str.is_empty() {
            format!("{} [{}] {}", self.level, self.module, self.message)
        } else {
            format!("{} [{}] {} | {}", self.level, self.module, self.message, fields_str)
        }
    }

    /// Log the entry
    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        eprintln!("[{}] {}", timestamp, self.render());
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    SENSITIVE_EXACT_KEYS.contains(&key_lower.as_str())
        || SENSITIVE_KEYS.iter().any(|k| key_lower.contains(k))
}

/// Redact a value if the key suggests it's sensitive
fn redact_if_sensitive(key: &str, value: &str) -> String {
    if is_sensitive_key(key) {
        return redact_value(value);
    }

    let key_lower = key.to_lowercase();

    let address_keys = ["address", "user", "receiver", "provider", "contract", "token"];
    if address_keys.iter().any(|k| key_lower.contains(k)) {
        return redact_address(value);
    }

    let hash_keys = ["digest", "hash", "separator"];
    if hash_keys.iter().any(|k| key_lower.contains(k)) {
        return redact_hash(value);
    }

    value.to_string()
}

/// Fully redact a sensitive value
fn redact_value(value: &str) -> String {
    if value.is_empty() {
        return "[EMPTY]".to_string();
    }

    let len = value.len();
    if len <= 4 {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED:{}chars]", len)
    }
}

/// Partially redact an address (show first 6 and last 4 chars)
fn redact_address(address: &str) -> String {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    let prefix_len = 6;
    let suffix_len = 4;

    if trimmed.len() <= prefix_len + suffix_len + 3 || !trimmed.is_ascii() {
        return redact_value(trimmed);
    }

    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Partially redact a hash (show first 10 and last 6 chars)
fn redact_hash(hash: &str) -> String {
    let trimmed = hash.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    if trimmed.len() <= 20 || !trimmed.is_ascii() {
        return trimmed.to_string();
    }

    let prefix = &trimmed[..10];
    let suffix = &trimmed[trimmed.len() - 6..];

    format!("{}...{}", prefix, suffix)
}

/// Recursively mask values of sensitive keys in a JSON document
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let masked = if is_sensitive_key(k) {
                        Value::String(REDACTION_MASK.to_string())
                    } else {
                        sanitize_json(v)
                    };
                    (k.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_json).collect()),
        other => other.clone(),
    }
}

/// Convenience macro for debug logging
#[macro_export]
macro_rules! log_debug {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for info logging
#[macro_export]
macro_rules! log_info {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for warning logging
#[macro_export]
macro_rules! log_warn {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for error logging
#[macro_export]
macro_rules! log_error {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redact_value() {
        assert_eq!(redact_value(""), "[EMPTY]");
        assert_eq!(redact_value("abc"), "[REDACTED]");
        assert_eq!(redact_value("secret_key_12345"), "[REDACTED:16chars]");
    }

    #[test]
    fn test_redact_address() {
        let redacted = redact_address("TZ3oPnE1SdAUL1YRd9GJQHenxrXjy4paAn");
        assert_eq!(redacted, "TZ3oPn...paAn");
    }

    #[test]
    fn test_redact_if_sensitive() {
        assert!(redact_if_sensitive("private_key", "1b3d1201039f").contains("REDACTED"));
        assert!(redact_if_sensitive("sig", "abcdef0123").contains("REDACTED"));

        let addr = redact_if_sensitive("receiver", "TX554G9uKsEv1U6TBQnNPC7dkhbvBFhgrD");
        assert!(addr.contains("..."));

        let digest = redact_if_sensitive(
            "digest",
            "40d7033c90c6af2e8d903626738acfd2703824dc2d8079a7fcb49228d343ce2c",
        );
        assert_eq!(digest, "40d7033c90...43ce2c");

        assert_eq!(redact_if_sensitive("nonce", "0"), "0");
    }

    #[test]
    fn test_sig_matches_whole_key_only() {
        assert!(is_sensitive_key("sig"));
        assert!(is_sensitive_key("SIG"));
        assert!(is_sensitive_key("rawSignature"));
        assert!(!is_sensitive_key("signer"));
        assert!(!is_sensitive_key("design"));

        assert_eq!(redact_if_sensitive("design", "v2"), "v2");

        let clean = sanitize_json(&json!({"sig": "deadbeef", "signer": "TZ3oPnE1SdAUL1YRd9GJQHenxrXjy4paAn"}));
        assert_eq!(clean["sig"], REDACTION_MASK);
        assert_eq!(clean["signer"], "TZ3oPnE1SdAUL1YRd9GJQHenxrXjy4paAn");
    }

    #[test]
    fn test_log_entry_render() {
        let entry = LogEntry::new(LogLevel::Info, "permit", "signed")
            .field("network", "nile")
            .field("privateKey", "1b3d1201039f2c91");

        let rendered = entry.render();
        assert!(rendered.starts_with("INFO [permit] signed | network=nile"));
        assert!(!rendered.contains("1b3d1201039f2c91"));
    }

    #[test]
    fn test_sanitize_json_nested() {
        let body = json!({
            "token": "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t",
            "sig": "deadbeef",
            "headers": {"Authorization": "ApiKey abc:def"},
            "items": [{"apiSecret": "x", "value": "1"}]
        });

        let clean = sanitize_json(&body);
        assert_eq!(clean["sig"], REDACTION_MASK);
        assert_eq!(clean["headers"]["Authorization"], REDACTION_MASK);
        assert_eq!(clean["items"][0]["apiSecret"], REDACTION_MASK);
        assert_eq!(clean["items"][0]["value"], "1");
        assert_eq!(clean["token"], "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t");
    }
}
