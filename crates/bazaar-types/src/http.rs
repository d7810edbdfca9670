use serde::{Deserialize, Deserializer, Serialize};

use crate::product::Product;

// -- Storefront --

#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontQuery {
    pub q: Option<String>,
    /// Blank search-form submissions send `min_price=` / `max_price=` with
    /// empty values; those mean "no bound", not a parse error.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<f64>,
}

fn empty_as_none<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<f64>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// What the presentation layer needs to render one listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub creator_name: String,
}

impl From<Product> for ProductCard {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            description: p.description,
            image_url: p.image_url,
            creator_name: p.creator_name,
        }
    }
}

/// Filtered approved listing plus the three filter values echoed back,
/// so the presentation layer can re-fill its search form.
#[derive(Debug, Serialize)]
pub struct StorefrontResponse {
    pub products: Vec<ProductCard>,
    pub q: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}
