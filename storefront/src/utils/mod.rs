//! # Utility Functions
//!
//! Shared utility functions used across the storefront.
//!
//! ## Modules
//!
//! - **[`validation`]**: Add-album form validation (ether prices, quantities)
//!
//! ## Related Modules
//!
//! - [`shared::utils`]: Cross-crate display helpers (address and ether formatting)
//! - [`crate::core`]: Core abstractions and error types

pub mod validation;
