//! Token amount conversion
//!
//! Transfers are signed in the token's smallest unit; callers usually think
//! in whole tokens ("1.5 USDT" with 6 decimals is `1500000`).

use super::uint::U256;
use crate::error::{SignerError, SignerResult};

/// 10^78 already exceeds 2^256-1
pub const MAX_DECIMALS: u32 = 77;

/// Convert a human decimal amount to base units
///
/// Fractional digits beyond `decimals` are truncated.
pub fn to_base_units(amount: &str, decimals: u32) -> SignerResult<U256> {
    if decimals > MAX_DECIMALS {
        return Err(SignerError::malformed(format!(
            "decimals must be at most {}, got {}",
            MAX_DECIMALS, decimals
        )));
    }

    let trimmed = amount.trim();
    if trimmed.starts_with('-') {
        return Err(SignerError::malformed(format!(
            "amount must be non-negative, got {}",
            amount
        )));
    }

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(SignerError::malformed(format!(
            "amount must be a valid number, got \"{}\"",
            amount
        )));
    }

    let kept = &fraction[..fraction.len().min(decimals as usize)];
    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(decimals as usize - kept.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_dec_str(digits)
}

/// Render base units as a human decimal amount, without trailing zeros
pub fn from_base_units(value: &U256, decimals: u32) -> String {
    let raw = value.to_string();
    if decimals == 0 {
        return raw;
    }

    let decimals = decimals as usize;
    let padded = if raw.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - raw.len()), raw)
    } else {
        raw
    };

    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}
