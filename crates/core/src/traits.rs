use crate::{
    Category, Currency, Manufacturer, Product, ProductOverview, ProductPage, ProductSearchFilter,
    SearchError, SearchTermRecord, Vendor,
};
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait CategoryService: Send + Sync {
    /// Every category visible in `store_id`, in display order.
    async fn all_categories(&self, store_id: &str) -> Result<Vec<Category>, SearchError>;
}

#[async_trait]
pub trait ManufacturerService: Send + Sync {
    async fn all_manufacturers(&self) -> Result<Vec<Manufacturer>, SearchError>;
}

#[async_trait]
pub trait VendorService: Send + Sync {
    async fn all_vendors(&self) -> Result<Vec<Vendor>, SearchError>;
}

#[async_trait]
pub trait CurrencyService: Send + Sync {
    async fn convert_to_primary_store_currency(
        &self,
        amount: Decimal,
        source: &Currency,
    ) -> Result<Decimal, SearchError>;
}

#[async_trait]
pub trait ProductSearchService: Send + Sync {
    async fn search_products(&self, filter: &ProductSearchFilter) -> Result<ProductPage, SearchError>;
}

#[async_trait]
pub trait SearchTermStore: Send + Sync {
    async fn find_by_keyword(
        &self,
        keyword: &str,
        store_id: &str,
    ) -> Result<Option<SearchTermRecord>, SearchError>;

    async fn insert(&self, record: SearchTermRecord) -> Result<(), SearchError>;

    async fn update(&self, record: SearchTermRecord) -> Result<(), SearchError>;
}

pub trait LocalizationService: Send + Sync {
    fn resource(&self, key: &str) -> String;
}

#[async_trait]
pub trait ProductOverviewBuilder: Send + Sync {
    async fn prepare_overviews(
        &self,
        products: &[Product],
        include_specification_attributes: bool,
    ) -> Result<Vec<ProductOverview>, SearchError>;
}
