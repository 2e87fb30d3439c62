// crates/product-service-core/src/model.rs
// ============================================================================
// Module: Product Model
// Description: Product record and product type vocabulary.
// Purpose: Provide the canonical product shape shared across layers.
// Dependencies: time
// ============================================================================

//! ## Overview
//! The [`Product`] record and the closed [`ProductType`] vocabulary. Type
//! labels are stable wire strings; parsing rejects anything outside the
//! vocabulary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use time::OffsetDateTime;

// ============================================================================
// SECTION: Product Type
// ============================================================================

/// Closed vocabulary of product types.
///
/// # Invariants
/// - Wire labels are stable lowercase strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductType {
    /// Generic clothing item.
    Clothing,
    /// Shoes.
    Shoes,
    /// Bags.
    Bag,
    /// Watches.
    Watch,
    /// Wallets.
    Wallet,
    /// Glasses.
    Glasses,
    /// Hats.
    Hat,
    /// Jackets.
    Jacket,
    /// Pants.
    Pants,
    /// Shirts.
    Shirt,
}

impl ProductType {
    /// All types accepted on the wire.
    pub const ALL: &'static [Self] = &[
        Self::Clothing,
        Self::Shoes,
        Self::Bag,
        Self::Watch,
        Self::Wallet,
        Self::Glasses,
        Self::Hat,
        Self::Jacket,
        Self::Pants,
        Self::Shirt,
    ];

    /// Returns the stable wire label for the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clothing => "clothing",
            Self::Shoes => "shoes",
            Self::Bag => "bag",
            Self::Watch => "watch",
            Self::Wallet => "wallet",
            Self::Glasses => "glasses",
            Self::Hat => "hat",
            Self::Jacket => "jacket",
            Self::Pants => "pants",
            Self::Shirt => "shirt",
        }
    }

    /// Parses a wire label into a product type.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|candidate| candidate.as_str() == label)
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Product
// ============================================================================

/// Stored product record.
///
/// # Invariants
/// - `id` is assigned once at creation and never reused.
/// - Timestamps are set by the persistence layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Internal product code.
    pub code: String,
    /// Color label.
    pub color: String,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
    /// Last-update timestamp.
    pub updated_at: OffsetDateTime,
    /// Acquisition price.
    pub buying_price: f64,
    /// Listed price.
    pub selling_price: f64,
    /// Image location.
    pub image_url: String,
    /// Product type.
    pub product_type: ProductType,
    /// Supplying provider name.
    pub provider: String,
    /// Creator name.
    pub creator: String,
    /// Distributor name.
    pub distributor: String,
}

#[cfg(test)]
mod tests {
    use super::ProductType;

    /// Tests labels round-trip through the parser.
    #[test]
    fn product_type_labels_round_trip() {
        for product_type in ProductType::ALL {
            assert_eq!(ProductType::from_label(product_type.as_str()), Some(*product_type));
        }
    }

    /// Tests unknown labels are rejected.
    #[test]
    fn product_type_rejects_unknown_label() {
        assert_eq!(ProductType::from_label("spaceship"), None);
        assert_eq!(ProductType::from_label(""), None);
        assert_eq!(ProductType::from_label("Clothing"), None);
    }
}
