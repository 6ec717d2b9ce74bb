use crate::stores::CatalogSnapshot;
use crate::traits::{
    CategoryService, CurrencyService, LocalizationService, ManufacturerService,
    ProductOverviewBuilder, ProductSearchService, SearchTermStore, VendorService,
};
use crate::{
    Category, Currency, Manufacturer, Product, ProductOverview, ProductPage, ProductSearchFilter,
    SearchError, SearchTermRecord, SortOrder, Vendor,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Catalog ports answered from snapshot data held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    categories: Vec<Category>,
    manufacturers: Vec<Manufacturer>,
    vendors: Vec<Vendor>,
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(
        categories: Vec<Category>,
        manufacturers: Vec<Manufacturer>,
        vendors: Vec<Vendor>,
        products: Vec<Product>,
    ) -> Self {
        Self {
            categories,
            manufacturers,
            vendors,
            products,
        }
    }

    pub fn from_snapshot(snapshot: &CatalogSnapshot) -> Self {
        Self::new(
            snapshot.categories.clone(),
            snapshot.manufacturers.clone(),
            snapshot.vendors.clone(),
            snapshot.products.clone(),
        )
    }
}

#[async_trait]
impl CategoryService for InMemoryCatalog {
    async fn all_categories(&self, store_id: &str) -> Result<Vec<Category>, SearchError> {
        let mut categories: Vec<Category> = self
            .categories
            .iter()
            .filter(|category| {
                !category.limited_to_stores || category.store_ids.iter().any(|id| id == store_id)
            })
            .cloned()
            .collect();
        categories.sort_by_key(|category| category.display_order);
        Ok(categories)
    }
}

#[async_trait]
impl ManufacturerService for InMemoryCatalog {
    async fn all_manufacturers(&self) -> Result<Vec<Manufacturer>, SearchError> {
        let mut manufacturers = self.manufacturers.clone();
        manufacturers.sort_by_key(|manufacturer| manufacturer.display_order);
        Ok(manufacturers)
    }
}

#[async_trait]
impl VendorService for InMemoryCatalog {
    async fn all_vendors(&self) -> Result<Vec<Vendor>, SearchError> {
        Ok(self.vendors.iter().filter(|vendor| vendor.active).cloned().collect())
    }
}

#[async_trait]
impl ProductSearchService for InMemoryCatalog {
    async fn search_products(&self, filter: &ProductSearchFilter) -> Result<ProductPage, SearchError> {
        let keywords = filter.keywords.trim().to_lowercase();

        let mut matched: Vec<&Product> = self
            .products
            .iter()
            .filter(|product| product.published)
            .filter(|product| !filter.visible_individually_only || product.visible_individually)
            .filter(|product| {
                product.store_ids.is_empty() || product.store_ids.contains(&filter.store_id)
            })
            .filter(|product| {
                filter.category_ids.is_empty()
                    || product
                        .category_ids
                        .iter()
                        .any(|id| filter.category_ids.contains(id))
            })
            .filter(|product| match non_empty(&filter.manufacturer_id) {
                Some(id) => product.manufacturer_ids.iter().any(|item| item == id),
                None => true,
            })
            .filter(|product| match non_empty(&filter.vendor_id) {
                Some(id) => product.vendor_id.as_deref() == Some(id),
                None => true,
            })
            .filter(|product| filter.price_min.map_or(true, |min| product.price >= min))
            .filter(|product| filter.price_max.map_or(true, |max| product.price <= max))
            .filter(|product| keywords.is_empty() || matches_keywords(product, &keywords, filter))
            .collect();

        match filter.order_by {
            SortOrder::Position => {}
            SortOrder::NameAsc => matched.sort_by(|left, right| left.name.cmp(&right.name)),
            SortOrder::NameDesc => matched.sort_by(|left, right| right.name.cmp(&left.name)),
            SortOrder::PriceAsc => matched.sort_by(|left, right| left.price.cmp(&right.price)),
            SortOrder::PriceDesc => matched.sort_by(|left, right| right.price.cmp(&left.price)),
            SortOrder::CreatedOn => {
                matched.sort_by(|left, right| right.created_at.cmp(&left.created_at))
            }
        }

        let total_count = matched.len();
        let products = matched
            .into_iter()
            .skip(filter.page_index.saturating_mul(filter.page_size))
            .take(filter.page_size)
            .cloned()
            .collect();

        Ok(ProductPage {
            products,
            total_count,
            page_index: filter.page_index,
            page_size: filter.page_size,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

fn matches_keywords(product: &Product, keywords: &str, filter: &ProductSearchFilter) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(keywords);

    contains(&product.name)
        || (filter.search_descriptions
            && (contains(&product.short_description) || contains(&product.full_description)))
        || (filter.search_sku && product.sku.eq_ignore_ascii_case(keywords))
        || (filter.search_tags && product.tags.iter().any(|tag| contains(tag)))
}

/// Search-term statistics kept in memory, optionally persisted as JSON.
#[derive(Debug, Default)]
pub struct InMemorySearchTermStore {
    records: Mutex<HashMap<(String, String), SearchTermRecord>>,
}

impl InMemorySearchTermStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SearchTermRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| ((record.keyword.clone(), record.store_id.clone()), record))
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    /// Reads a JSON array of records; a missing file yields an empty store.
    pub async fn load(path: &Path) -> Result<Self, SearchError> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(Self::with_records(serde_json::from_str(&raw)?)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(error) => Err(error.into()),
        }
    }

    pub async fn save(&self, path: &Path) -> Result<(), SearchError> {
        let raw = serde_json::to_string_pretty(&self.records()?)?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }

    /// All records, most searched first.
    pub fn records(&self) -> Result<Vec<SearchTermRecord>, SearchError> {
        let mut records: Vec<_> = self.lock()?.values().cloned().collect();
        records.sort_by(|left, right| {
            right
                .count
                .cmp(&left.count)
                .then_with(|| left.keyword.cmp(&right.keyword))
        });
        Ok(records)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<(String, String), SearchTermRecord>>, SearchError> {
        self.records
            .lock()
            .map_err(|_| SearchError::backend("search-terms", "record lock poisoned"))
    }
}

#[async_trait]
impl SearchTermStore for InMemorySearchTermStore {
    async fn find_by_keyword(
        &self,
        keyword: &str,
        store_id: &str,
    ) -> Result<Option<SearchTermRecord>, SearchError> {
        let key = (keyword.to_string(), store_id.to_string());
        Ok(self.lock()?.get(&key).cloned())
    }

    async fn insert(&self, record: SearchTermRecord) -> Result<(), SearchError> {
        let mut records = self.lock()?;
        let key = (record.keyword.clone(), record.store_id.clone());
        if records.contains_key(&key) {
            return Err(SearchError::InvalidData(format!(
                "search term `{}` already recorded for store `{}`",
                record.keyword, record.store_id
            )));
        }
        records.insert(key, record);
        Ok(())
    }

    async fn update(&self, record: SearchTermRecord) -> Result<(), SearchError> {
        let mut records = self.lock()?;
        let key = (record.keyword.clone(), record.store_id.clone());
        match records.get_mut(&key) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(SearchError::InvalidData(format!(
                "search term `{}` is not recorded for store `{}`",
                record.keyword, record.store_id
            ))),
        }
    }
}

/// Converts with the rate carried on the source currency.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateTableCurrency;

#[async_trait]
impl CurrencyService for RateTableCurrency {
    async fn convert_to_primary_store_currency(
        &self,
        amount: Decimal,
        source: &Currency,
    ) -> Result<Decimal, SearchError> {
        if source.rate <= Decimal::ZERO {
            return Err(SearchError::InvalidData(format!(
                "currency `{}` has non-positive rate {}",
                source.code, source.rate
            )));
        }
        amount.checked_div(source.rate).ok_or_else(|| {
            SearchError::InvalidData(format!(
                "amount {} overflows when converted from `{}`",
                amount, source.code
            ))
        })
    }
}

/// Resource strings for one language. Missing keys resolve to the key itself.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    entries: HashMap<String, String>,
}

impl ResourceTable {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn from_snapshot(snapshot: &CatalogSnapshot, language_id: &str) -> Self {
        Self::new(snapshot.resources.get(language_id).cloned().unwrap_or_default())
    }
}

impl LocalizationService for ResourceTable {
    fn resource(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct OverviewBuilder {
    currency_code: String,
}

impl OverviewBuilder {
    pub fn new(currency_code: impl Into<String>) -> Self {
        Self {
            currency_code: currency_code.into(),
        }
    }
}

#[async_trait]
impl ProductOverviewBuilder for OverviewBuilder {
    async fn prepare_overviews(
        &self,
        products: &[Product],
        include_specification_attributes: bool,
    ) -> Result<Vec<ProductOverview>, SearchError> {
        Ok(products
            .iter()
            .map(|product| ProductOverview {
                id: product.id.clone(),
                name: product.name.clone(),
                sku: product.sku.clone(),
                short_description: product.short_description.clone(),
                price: format!("{:.2} {}", product.price, self.currency_code),
                specification_attributes: if include_specification_attributes {
                    product.specification_attributes.clone()
                } else {
                    Vec::new()
                },
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpecificationAttribute;

    fn product(id: &str, name: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price: Decimal::new(price, 0),
            store_ids: vec!["s1".to_string()],
            ..Product::default()
        }
    }

    fn filter(keywords: &str) -> ProductSearchFilter {
        ProductSearchFilter {
            keywords: keywords.to_string(),
            store_id: "s1".to_string(),
            visible_individually_only: true,
            page_size: 10,
            ..ProductSearchFilter::default()
        }
    }

    #[tokio::test]
    async fn keyword_search_respects_visibility_and_store() {
        let mut hidden = product("p2", "Lamp shade", 5);
        hidden.visible_individually = false;
        let mut elsewhere = product("p3", "Lamp post", 50);
        elsewhere.store_ids = vec!["s2".to_string()];
        let catalog = InMemoryCatalog::new(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            vec![product("p1", "Desk lamp", 20), hidden, elsewhere, product("p4", "Chair", 40)],
        );

        let page = catalog.search_products(&filter("lamp")).await.expect("search");
        let ids: Vec<_> = page.products.iter().map(|product| product.id.as_str()).collect();
        assert_eq!(ids, vec!["p1"]);
        assert_eq!(page.total_count, 1);
    }

    #[tokio::test]
    async fn description_and_tag_search_are_opt_in() {
        let mut tagged = product("p1", "Bulb", 3);
        tagged.tags = vec!["lighting".to_string()];
        tagged.full_description = "Warm lighting for the living room".to_string();
        let catalog = InMemoryCatalog::new(Vec::new(), Vec::new(), Vec::new(), vec![tagged]);

        let plain = catalog.search_products(&filter("lighting")).await.expect("search");
        assert!(plain.products.is_empty());

        let mut extended = filter("lighting");
        extended.search_descriptions = true;
        extended.search_tags = true;
        let page = catalog.search_products(&extended).await.expect("search");
        assert_eq!(page.products.len(), 1);
    }

    #[tokio::test]
    async fn price_bounds_sorting_and_paging() {
        let catalog = InMemoryCatalog::new(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            vec![
                product("p1", "Lamp A", 10),
                product("p2", "Lamp B", 30),
                product("p3", "Lamp C", 20),
                product("p4", "Lamp D", 99),
            ],
        );

        let mut query = filter("lamp");
        query.price_min = Some(Decimal::new(10, 0));
        query.price_max = Some(Decimal::new(30, 0));
        query.order_by = SortOrder::PriceDesc;
        query.page_size = 2;
        query.page_index = 1;

        let page = catalog.search_products(&query).await.expect("search");
        assert_eq!(page.total_count, 3);
        let ids: Vec<_> = page.products.iter().map(|product| product.id.as_str()).collect();
        assert_eq!(ids, vec!["p1"]);
    }

    #[tokio::test]
    async fn categories_are_scoped_to_store() {
        let limited = Category {
            id: "c2".to_string(),
            limited_to_stores: true,
            store_ids: vec!["s2".to_string()],
            ..Category::default()
        };
        let open = Category {
            id: "c1".to_string(),
            ..Category::default()
        };
        let catalog = InMemoryCatalog::new(vec![limited, open], Vec::new(), Vec::new(), Vec::new());

        let categories = catalog.all_categories("s1").await.expect("categories");
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, "c1");
    }

    #[tokio::test]
    async fn search_terms_insert_update_and_persist() {
        let store = InMemorySearchTermStore::new();
        store
            .insert(SearchTermRecord::first_hit("lamp", "s1"))
            .await
            .expect("insert");

        let duplicate = store.insert(SearchTermRecord::first_hit("lamp", "s1")).await;
        assert!(matches!(duplicate, Err(SearchError::InvalidData(_))));

        let mut record = store
            .find_by_keyword("lamp", "s1")
            .await
            .expect("find")
            .expect("record exists");
        record.count += 1;
        store.update(record).await.expect("update");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("terms.json");
        store.save(&path).await.expect("save");

        let reloaded = InMemorySearchTermStore::load(&path).await.expect("load");
        let records = reloaded.records().expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].count, 2);
        assert!(reloaded.find_by_keyword("lamp", "s2").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn missing_terms_file_is_an_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InMemorySearchTermStore::load(&dir.path().join("absent.json"))
            .await
            .expect("load");
        assert!(store.records().expect("records").is_empty());
    }

    #[tokio::test]
    async fn currency_conversion_divides_by_rate() {
        let euro = Currency {
            code: "EUR".to_string(),
            rate: Decimal::new(2, 0),
        };
        let converted = RateTableCurrency
            .convert_to_primary_store_currency(Decimal::new(50, 0), &euro)
            .await
            .expect("convert");
        assert_eq!(converted, Decimal::new(25, 0));

        let broken = Currency {
            code: "XXX".to_string(),
            rate: Decimal::ZERO,
        };
        assert!(RateTableCurrency
            .convert_to_primary_store_currency(Decimal::ONE, &broken)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn currency_conversion_overflow_is_an_error() {
        let weak = Currency {
            code: "HALF".to_string(),
            rate: Decimal::new(5, 1),
        };
        let result = RateTableCurrency
            .convert_to_primary_store_currency(Decimal::MAX, &weak)
            .await;

        assert!(matches!(result, Err(SearchError::InvalidData(_))));
    }

    #[tokio::test]
    async fn overviews_format_price_and_gate_attributes() {
        let mut lamp = product("p1", "Lamp", 20);
        lamp.specification_attributes = vec![SpecificationAttribute {
            name: "Color".to_string(),
            value: "Red".to_string(),
        }];
        let builder = OverviewBuilder::new("USD");

        let without = builder.prepare_overviews(&[lamp.clone()], false).await.expect("prepare");
        assert_eq!(without[0].price, "20.00 USD");
        assert!(without[0].specification_attributes.is_empty());

        let with = builder.prepare_overviews(&[lamp], true).await.expect("prepare");
        assert_eq!(with[0].specification_attributes.len(), 1);
    }

    #[test]
    fn missing_resources_resolve_to_their_key() {
        let table = ResourceTable::new(HashMap::from([("Common.All".to_string(), "All".to_string())]));
        assert_eq!(table.resource("Common.All"), "All");
        assert_eq!(table.resource("Catalog.OrderBy.NameAsc"), "Catalog.OrderBy.NameAsc");
    }
}
