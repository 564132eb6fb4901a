//! Utilities Module
//!
//! Common utilities used across the crate.

pub mod amount;
pub mod logging;
pub mod uint;

pub use amount::{from_base_units, to_base_units};
pub use uint::U256;
