use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const VIEW_MODE_GRID: &str = "grid";
pub const VIEW_MODE_LIST: &str = "list";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogSettings {
    pub product_search_term_minimum_length: usize,
    pub search_page_products_per_page: usize,
    pub search_page_allow_customers_to_select_page_size: bool,
    /// Comma-separated page sizes offered to customers, e.g. `"6, 3, 9"`.
    pub search_page_page_size_options: String,
    pub show_spec_attribute_on_catalog_pages: bool,
    pub search_by_description: bool,
    pub allow_product_sorting: bool,
    pub allow_product_view_mode_changing: bool,
    pub default_view_mode: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            product_search_term_minimum_length: 3,
            search_page_products_per_page: 6,
            search_page_allow_customers_to_select_page_size: true,
            search_page_page_size_options: "6, 3, 9, 18".to_string(),
            show_spec_attribute_on_catalog_pages: false,
            search_by_description: false,
            allow_product_sorting: true,
            allow_product_view_mode_changing: true,
            default_view_mode: VIEW_MODE_GRID.to_string(),
        }
    }
}

impl CatalogSettings {
    /// Positive page sizes from `search_page_page_size_options`, in declared
    /// order. Entries that are not positive integers are skipped.
    pub fn page_size_options(&self) -> Vec<usize> {
        self.search_page_page_size_options
            .split(',')
            .filter_map(|value| value.trim().parse::<usize>().ok())
            .filter(|size| *size > 0)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct VendorSettings {
    pub allow_search_by_vendor: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheSettings {
    pub max_capacity: u64,
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            ttl_secs: 3_600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StorefrontSettings {
    pub catalog: CatalogSettings,
    pub vendor: VendorSettings,
    pub cache: CacheSettings,
}

impl StorefrontSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        let settings: StorefrontSettings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.catalog.search_page_products_per_page == 0 {
            return Err(SettingsError::Invalid(
                "catalog.search_page_products_per_page must be greater than zero".to_string(),
            ));
        }
        if !matches!(
            self.catalog.default_view_mode.as_str(),
            VIEW_MODE_GRID | VIEW_MODE_LIST
        ) {
            return Err(SettingsError::Invalid(format!(
                "catalog.default_view_mode must be `{VIEW_MODE_GRID}` or `{VIEW_MODE_LIST}`, got `{}`",
                self.catalog.default_view_mode
            )));
        }
        if self.cache.max_capacity == 0 {
            return Err(SettingsError::Invalid(
                "cache.max_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_take_defaults() {
        let settings = StorefrontSettings::from_json(r#"{"vendor": {"allow_search_by_vendor": true}}"#)
            .expect("settings should parse");

        assert!(settings.vendor.allow_search_by_vendor);
        assert_eq!(settings.catalog.product_search_term_minimum_length, 3);
        assert_eq!(settings.cache, CacheSettings::default());
    }

    #[test]
    fn unknown_view_mode_is_rejected() {
        let error = StorefrontSettings::from_json(r#"{"catalog": {"default_view_mode": "tiles"}}"#)
            .expect_err("view mode should be rejected");

        assert!(matches!(error, SettingsError::Invalid(_)));
    }

    #[test]
    fn zero_products_per_page_is_rejected() {
        let error =
            StorefrontSettings::from_json(r#"{"catalog": {"search_page_products_per_page": 0}}"#)
                .expect_err("page size should be rejected");

        assert!(matches!(error, SettingsError::Invalid(_)));
    }

    #[test]
    fn page_size_options_skip_garbage() {
        let settings = CatalogSettings {
            search_page_page_size_options: "12, x, 0, 24,".to_string(),
            ..CatalogSettings::default()
        };

        assert_eq!(settings.page_size_options(), vec![12, 24]);
    }

    #[test]
    fn load_reads_settings_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"catalog": {"product_search_term_minimum_length": 5}}"#)
            .expect("write settings");

        let settings = StorefrontSettings::load(&path).expect("settings should load");
        assert_eq!(settings.catalog.product_search_term_minimum_length, 5);
    }
}
