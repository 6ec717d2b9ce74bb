pub mod memory;
pub mod snapshot;

pub use memory::{
    InMemoryCatalog, InMemorySearchTermStore, OverviewBuilder, RateTableCurrency, ResourceTable,
};
pub use snapshot::CatalogSnapshot;
