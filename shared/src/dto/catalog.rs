//! # Catalogue DTOs
//!
//! Album catalogue entries as read from the `MusicShop` contract, plus the
//! add-album form the storefront collects from the owner.

use alloy_primitives::{keccak256, B256, U256};
use serde::{Deserialize, Serialize};

/// Derive the catalogue uid for a title.
///
/// Matches Solidity's `keccak256(abi.encodePacked(title))`, so the same title
/// always yields the same uid and any change to the title yields a new one.
///
/// ```rust
/// use shared::dto::catalog::item_uid;
///
/// assert_eq!(item_uid("Kind of Blue"), item_uid("Kind of Blue"));
/// assert_ne!(item_uid("Kind of Blue"), item_uid("Kind of Blud"));
/// ```
pub fn item_uid(title: &str) -> B256 {
    keccak256(title.as_bytes())
}

/// On-chain catalogue entry.
///
/// `index` is assigned sequentially by the contract and never reused.
/// Amounts are in wei.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub index: u64,
    pub uid: B256,
    pub title: String,
    pub unit_price: U256,
    pub quantity_available: U256,
}

impl Item {
    /// Build an item whose uid is derived from `title`.
    pub fn new(index: u64, title: impl Into<String>, unit_price: U256, quantity_available: U256) -> Self {
        let title = title.into();
        Self {
            index,
            uid: item_uid(&title),
            title,
            unit_price,
            quantity_available,
        }
    }

    /// Whether the buy affordance should be offered for this item.
    pub fn in_stock(&self) -> bool {
        self.quantity_available > U256::ZERO
    }
}

/// Raw add-album form fields, exactly as typed by the owner.
///
/// `price` is an ether decimal string (e.g. `"0.05"`), `quantity` an integer string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    pub title: String,
    pub price: String,
    pub quantity: String,
}

impl ItemForm {
    pub fn new(title: impl Into<String>, price: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
            quantity: quantity.into(),
        }
    }

    /// Names of the fields left blank (whitespace counts as blank).
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("price", &self.price),
            ("quantity", &self.quantity),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_is_deterministic() {
        assert_eq!(item_uid("Abbey Road"), item_uid("Abbey Road"));
        assert_eq!(Item::new(0, "Abbey Road", U256::ZERO, U256::ZERO).uid, item_uid("Abbey Road"));
    }

    #[test]
    fn test_uid_changes_with_single_character() {
        assert_ne!(item_uid("Abbey Road"), item_uid("Abbey Road!"));
        assert_ne!(item_uid("Abbey Road"), item_uid("abbey Road"));
    }

    #[test]
    fn test_uid_matches_solidity_packed_hash() {
        // keccak256("") is the well-known empty hash
        assert_eq!(
            item_uid(""),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
                .parse::<B256>()
                .unwrap()
        );
    }

    #[test]
    fn test_in_stock() {
        let mut item = Item::new(1, "Blue Train", U256::from(10), U256::from(1));
        assert!(item.in_stock());
        item.quantity_available = U256::ZERO;
        assert!(!item.in_stock());
    }

    #[test]
    fn test_form_missing_fields() {
        assert!(ItemForm::new("Title", "0.1", "3").missing_fields().is_empty());
        assert_eq!(ItemForm::new("", "0.1", "3").missing_fields(), vec!["title"]);
        assert_eq!(ItemForm::new("Title", "  ", "").missing_fields(), vec!["price", "quantity"]);
        assert_eq!(ItemForm::default().missing_fields().len(), 3);
    }

    #[test]
    fn test_item_serializes_snake_case() {
        let item = Item::new(2, "Giant Steps", U256::from(5), U256::from(7));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["index"], 2);
        assert_eq!(json["title"], "Giant Steps");
        assert!(json.get("quantity_available").is_some());
        assert!(json.get("unit_price").is_some());
    }
}
