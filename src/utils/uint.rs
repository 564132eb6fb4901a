//! 256-bit unsigned integer
//!
//! Just enough arithmetic to parse decimal `uint256` values, range-check
//! them and render them back: little-endian `u64` limbs.

use crate::error::{SignerError, SignerResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct U256(pub [u64; 4]);

impl U256 {
    pub const ZERO: U256 = U256([0, 0, 0, 0]);
    pub const MAX: U256 = U256([u64::MAX, u64::MAX, u64::MAX, u64::MAX]);

    /// Parse from decimal string
    ///
    /// Digits only: no sign, no whitespace, no `0x`.
    pub fn from_dec_str(s: &str) -> SignerResult<Self> {
        if s.is_empty() {
            return Err(SignerError::malformed("empty integer string"));
        }

        let mut result = U256::ZERO;
        for c in s.chars() {
            let digit = c.to_digit(10).ok_or_else(|| {
                SignerError::malformed(format!("invalid decimal digit '{}' in \"{}\"", c, s))
            })?;
            result = result
                .checked_mul_u64(10)
                .and_then(|r| r.checked_add(U256::from(digit as u64)))
                .ok_or_else(|| SignerError::malformed(format!("{} exceeds 2^256-1", s)))?;
        }
        Ok(result)
    }

    /// Convert to bytes (big-endian, 32 bytes)
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for i in 0..4 {
            let offset = (3 - i) * 8;
            bytes[offset..offset + 8].copy_from_slice(&self.0[i].to_be_bytes());
        }
        bytes
    }

    /// Checked addition
    pub fn checked_add(&self, other: U256) -> Option<U256> {
        let mut result = [0u64; 4];
        let mut carry = 0u64;

        for i in 0..4 {
            let (sum1, c1) = self.0[i].overflowing_add(other.0[i]);
            let (sum2, c2) = sum1.overflowing_add(carry);
            result[i] = sum2;
            carry = (c1 as u64) + (c2 as u64);
        }

        if carry != 0 {
            None
        } else {
            Some(U256(result))
        }
    }

    /// Checked multiplication by u64
    pub fn checked_mul_u64(&self, other: u64) -> Option<U256> {
        let mut result = [0u64; 4];
        let mut carry = 0u128;

        for i in 0..4 {
            let prod = (self.0[i] as u128) * (other as u128) + carry;
            result[i] = prod as u64;
            carry = prod >> 64;
        }

        if carry != 0 {
            None
        } else {
            Some(U256(result))
        }
    }

    /// Division by a non-zero u64, returning (quotient, remainder)
    pub fn div_rem_u64(&self, divisor: u64) -> (U256, u64) {
        debug_assert!(divisor != 0);
        let mut quotient = [0u64; 4];
        let mut remainder = 0u128;

        for i in (0..4).rev() {
            let acc = (remainder << 64) | self.0[i] as u128;
            quotient[i] = (acc / divisor as u128) as u64;
            remainder = acc % divisor as u128;
        }

        (U256(quotient), remainder as u64)
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0, 0]
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        U256([value, 0, 0, 0])
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }

        let mut digits = Vec::new();
        let mut n = *self;
        while !n.is_zero() {
            let (q, r) = n.div_rem_u64(10);
            digits.push(b'0' + r as u8);
            n = q;
        }
        digits.reverse();
        f.write_str(&String::from_utf8_lossy(&digits))
    }
}
