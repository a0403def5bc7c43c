//! # Data Transfer Objects (DTOs)
//!
//! Types exchanged between the storefront client and whatever presentation
//! layer renders it.
//!
//! ## Module Organization
//!
//! - [`catalog`] - Album catalogue entries and the add-album form
//!
//! ## Serialization Format
//!
//! - **Field naming**: snake_case (default serde behavior)
//! - **Amounts**: `U256` values serialize as `0x`-prefixed hex strings
//! - **Uids**: `B256` values serialize as `0x`-prefixed 32-byte hex strings
//!
//! ```text
//! {
//!   "index": 0,
//!   "uid": "0x8e6b...",
//!   "title": "Kind of Blue",
//!   "unit_price": "0x16345785d8a0000",
//!   "quantity_available": "0x3"
//! }
//! ```

pub mod catalog;

pub use catalog::*;
