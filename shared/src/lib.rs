//! # Shared Storefront Types
//!
//! Types and helpers shared between the storefront client and its
//! presentation layer.
//!
//! ## Structure
//!
//! - **[`dto`]**: Catalogue data
//!   - **[`dto::catalog`]**: `Item`, `ItemForm`, uid derivation
//! - **[`utils`]**: Display helpers
//!   - **[`utils::format_address`]**: Shorten `0x` addresses and hashes
//!   - **[`utils::format_ether_display`]**: Render wei amounts as ether
//!
//! ## Usage
//!
//! ```rust
//! use alloy_primitives::U256;
//! use shared::{Item, format_ether_display};
//!
//! let item = Item::new(0, "Kind of Blue", U256::from(10u64).pow(U256::from(17)), U256::from(3));
//! assert!(item.in_stock());
//! assert_eq!(format_ether_display(item.unit_price), "0.10000000");
//! ```

pub mod dto;
pub mod utils;

// Wildcard re-exports: everything here is public API
pub use dto::*;
pub use utils::*;
