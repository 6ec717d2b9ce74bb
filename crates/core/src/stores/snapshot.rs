use crate::{Category, Manufacturer, Product, SearchError, Vendor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Catalog data as exported to a JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogSnapshot {
    pub categories: Vec<Category>,
    pub manufacturers: Vec<Manufacturer>,
    pub vendors: Vec<Vendor>,
    pub products: Vec<Product>,
    /// Localization resources, keyed by language id and then resource key.
    pub resources: HashMap<String, HashMap<String, String>>,
}

impl CatalogSnapshot {
    pub async fn load(path: &Path) -> Result<Self, SearchError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
