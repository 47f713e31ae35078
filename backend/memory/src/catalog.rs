//! Product catalog records and the documents synthesized from them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One product record as shipped with the storefront catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub rating: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default, alias = "thumbnail")]
    pub thumbnail_url: Option<String>,
}

impl Product {
    /// The text indexed for retrieval.
    pub fn to_document(&self) -> String {
        format!(
            "Product: {}\nDescription: {}\nPrice: ${:.2}\nRating: {:.2} out of 5\nDiscount: {:.2}%",
            self.title, self.description, self.price, self.rating, self.discount_percentage
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Bare(Vec<Product>),
    Wrapped { products: Vec<Product> },
}

/// Static, read-only product list injected into a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Parse either a bare array of products or `{ "products": [...] }`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).context("Failed to parse product catalog JSON")?;
        let products = match file {
            CatalogFile::Bare(products) => products,
            CatalogFile::Wrapped { products } => products,
        };
        Ok(Self { products })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
