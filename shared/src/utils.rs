//! # Shared Utility Functions
//!
//! Display helpers used by the storefront and its presentation layer.
//!
//! ## Address Formatting
//!
//! - [`format_address`] - Keep the first N and last M characters of an address or hash
//! - [`truncate_address`] - `format_address` with the storefront default (`0x1234...abcd`)
//!
//! ## Amount Formatting
//!
//! - [`format_ether_display`] - Render a wei amount as ether, cut to 10 characters
//!
//! ```rust
//! use shared::utils::truncate_address;
//!
//! let address = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
//! assert_eq!(truncate_address(address), "0x5fbd...0aa3");
//! ```

use alloy_primitives::{utils::format_ether, U256};

/// Characters kept at the start of a truncated address (includes `0x`).
pub const ADDRESS_PREFIX_LEN: usize = 6;
/// Characters kept at the end of a truncated address.
pub const ADDRESS_SUFFIX_LEN: usize = 4;
/// Maximum characters of a formatted ether balance.
pub const ETHER_DISPLAY_LEN: usize = 10;

/// Format an address or hash by showing the first `prefix_len` and last `suffix_len` characters.
///
/// If the input is too short to truncate meaningfully, it is returned as-is.
///
/// ```rust
/// use shared::utils::format_address;
///
/// let hash = "0x8e6b5c2a0f13e1b3c5d7f9a1b3c5d7e9f1a3b5c7d9e1f3a5b7c9d1e3f5a7b9c1";
/// assert_eq!(format_address(hash, 6, 4), "0x8e6b...b9c1");
/// assert_eq!(format_address("0x1234", 6, 4), "0x1234");
/// ```
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let address_len = address.len();

    if address_len <= prefix_len + suffix_len || !address.is_ascii() {
        return address.to_string();
    }

    // Hex strings are ASCII-only, byte slicing is safe after the check above
    let prefix = &address[..prefix_len];
    let suffix = &address[address_len - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Format an address with the storefront default of 6 leading and 4 trailing characters.
pub fn truncate_address(address: &str) -> String {
    format_address(address, ADDRESS_PREFIX_LEN, ADDRESS_SUFFIX_LEN)
}

/// Render a wei amount in ether, truncated to [`ETHER_DISPLAY_LEN`] characters.
///
/// ```rust
/// use alloy_primitives::U256;
/// use shared::utils::format_ether_display;
///
/// assert_eq!(format_ether_display(U256::from(1_500_000_000_000_000_000u128)), "1.50000000");
/// ```
pub fn format_ether_display(wei: U256) -> String {
    let full = format_ether(wei);
    full.chars().take(ETHER_DISPLAY_LEN).collect()
}
