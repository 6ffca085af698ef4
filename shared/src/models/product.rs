//! Product Model

use serde::{Deserialize, Serialize};

/// Catalog product entity
///
/// A product has exactly one pricing mode: either a single price or a
/// non-empty list of size/price varieties. The `Pricing` union is flattened
/// so the serialized shape carries either a `price` field or a `varieties`
/// array, matching the remote catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(flatten)]
    pub pricing: Pricing,
}

/// Pricing mode union
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pricing {
    /// Single-SKU product: one price, no sizes
    Single { price: i64 },
    /// Multi-SKU product: one price per size
    Varieties { varieties: Vec<Variety> },
}

/// Size/price pair scoped to one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variety {
    pub size: String,
    /// Price in minor currency units
    pub price: i64,
}

impl Product {
    /// The price of a single-SKU product
    pub fn single_price(&self) -> Option<i64> {
        match self.pricing {
            Pricing::Single { price } => Some(price),
            Pricing::Varieties { .. } => None,
        }
    }

    /// The varieties of a multi-SKU product (empty slice for single-SKU)
    pub fn varieties(&self) -> &[Variety] {
        match &self.pricing {
            Pricing::Single { .. } => &[],
            Pricing::Varieties { varieties } => varieties,
        }
    }

    /// Whether this product is priced per size
    pub fn is_multi_sku(&self) -> bool {
        matches!(self.pricing, Pricing::Varieties { .. })
    }

    /// Whether this product matches a `(name, price)` catalog key
    ///
    /// Only single-SKU products carry a product-level price; multi-SKU
    /// products never match.
    pub fn matches_key(&self, name: &str, price: i64) -> bool {
        self.name == name && self.single_price() == Some(price)
    }
}
