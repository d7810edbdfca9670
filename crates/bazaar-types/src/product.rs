use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A product is visible to buyers if and only if it is `Approved`.
/// Rejection deletes the row outright, so there is no third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Pending,
    Approved,
}

impl ProductStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: String,
    /// Empty string when the seller attached no image.
    pub image_url: String,
    pub creator_name: String,
    pub creator_id: UserId,
    pub status: ProductStatus,
}

/// A fully-collected submission, ready to be persisted as `pending`.
/// Produced by the creation conversation once all four steps are done.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub creator_name: String,
    pub creator_id: UserId,
}

/// Slim row for the `!listproducts` command.
#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Storefront filter: all parts optional, AND-combined. `q` is a substring
/// match on the name only; price bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub q: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}
