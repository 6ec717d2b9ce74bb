pub mod cache;
pub mod categories;
pub mod error;
pub mod localization;
pub mod models;
pub mod orchestrator;
pub mod paging;
pub mod settings;
pub mod stores;
pub mod traits;

pub use cache::CategoryOptionsCache;
pub use categories::{
    breadcrumb, breadcrumb_text, categories_cache_key, category_options, child_category_ids,
    Audience, BREADCRUMB_SEPARATOR,
};
pub use error::{SearchError, SettingsError};
pub use localization::format_resource;
pub use models::{
    localized, Category, CategoryOption, Currency, Customer, LocalizedName, Manufacturer,
    PagingCommand, PagingFilteringContext, Product, ProductOverview, ProductPage,
    ProductSearchFilter, SearchContext, SearchRequest, SearchResultModel, SearchTermRecord,
    SelectOption, SortOrder, SpecificationAttribute, Vendor,
};
pub use orchestrator::{SearchAggregator, SearchPorts};
pub use paging::{resolve_options, ResolvedPaging};
pub use settings::{CacheSettings, CatalogSettings, StorefrontSettings, VendorSettings};
pub use stores::{
    CatalogSnapshot, InMemoryCatalog, InMemorySearchTermStore, OverviewBuilder, RateTableCurrency,
    ResourceTable,
};
pub use traits::{
    CategoryService, CurrencyService, LocalizationService, ManufacturerService,
    ProductOverviewBuilder, ProductSearchService, SearchTermStore, VendorService,
};
pub use tokio_util::sync::CancellationToken;
