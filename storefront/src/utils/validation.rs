//! Validation utilities for the add-album form

use alloy_primitives::utils::parse_ether;
use alloy_primitives::U256;
use shared::ItemForm;

use crate::core::error::{AppError, Result};

pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// Validate an ether amount typed as a decimal string (e.g. `"0.05"`)
pub fn validate_price(price: &str) -> ValidationResult {
    let price = price.trim();
    if price.is_empty() {
        return ValidationResult::err("Price is required");
    }

    match parse_ether(price) {
        Ok(_) => ValidationResult::ok(),
        Err(e) => ValidationResult::err(format!("Invalid price {:?}: {}", price, e)),
    }
}

/// Validate a whole number of copies
pub fn validate_quantity(quantity: &str) -> ValidationResult {
    let quantity = quantity.trim();
    if quantity.is_empty() {
        return ValidationResult::err("Quantity is required");
    }

    if !quantity.chars().all(|c| c.is_ascii_digit()) {
        return ValidationResult::err(format!("Invalid quantity {:?}: must be a whole number", quantity));
    }

    match U256::from_str_radix(quantity, 10) {
        Ok(_) => ValidationResult::ok(),
        Err(e) => ValidationResult::err(format!("Invalid quantity {:?}: {}", quantity, e)),
    }
}

/// Add-album form with its amounts parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItemForm {
    pub title: String,
    /// Unit price in wei
    pub price: U256,
    pub quantity: U256,
}

/// Parse the raw form. Blank fields give `IncompleteForm`, malformed
/// amounts give `Validation`. The title is kept exactly as typed, since
/// its uid is the hash of those bytes.
pub fn parse_item_form(form: &ItemForm) -> Result<ParsedItemForm> {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::IncompleteForm(missing));
    }

    for check in [validate_price(&form.price), validate_quantity(&form.quantity)] {
        if let Some(error) = check.error {
            return Err(AppError::Validation(error));
        }
    }

    let price = parse_ether(form.price.trim()).map_err(|e| AppError::Validation(e.to_string()))?;
    let quantity =
        U256::from_str_radix(form.quantity.trim(), 10).map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(ParsedItemForm {
        title: form.title.clone(),
        price,
        quantity,
    })
}
