use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalizedName {
    pub language_id: String,
    pub value: String,
}

/// Picks the localized value for `language_id`, falling back to `default`
/// when the translation is missing or blank.
pub fn localized<'a>(default: &'a str, names: &'a [LocalizedName], language_id: &str) -> &'a str {
    names
        .iter()
        .find(|name| name.language_id == language_id && !name.value.trim().is_empty())
        .map(|name| name.value.as_str())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub localized_names: Vec<LocalizedName>,
    pub display_order: i32,
    pub published: bool,
    pub subject_to_acl: bool,
    pub allowed_role_ids: Vec<String>,
    pub limited_to_stores: bool,
    pub store_ids: Vec<String>,
}

impl Default for Category {
    fn default() -> Self {
        Self {
            id: String::new(),
            parent_id: None,
            name: String::new(),
            localized_names: Vec::new(),
            display_order: 0,
            published: true,
            subject_to_acl: false,
            allowed_role_ids: Vec::new(),
            limited_to_stores: false,
            store_ids: Vec::new(),
        }
    }
}

impl Category {
    pub fn localized_name(&self, language_id: &str) -> &str {
        localized(&self.name, &self.localized_names, language_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Manufacturer {
    pub id: String,
    pub name: String,
    pub localized_names: Vec<LocalizedName>,
    pub display_order: i32,
}

impl Manufacturer {
    pub fn localized_name(&self, language_id: &str) -> &str {
        localized(&self.name, &self.localized_names, language_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub localized_names: Vec<LocalizedName>,
    pub active: bool,
}

impl Default for Vendor {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            localized_names: Vec::new(),
            active: true,
        }
    }
}

impl Vendor {
    pub fn localized_name(&self, language_id: &str) -> &str {
        localized(&self.name, &self.localized_names, language_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpecificationAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub short_description: String,
    pub full_description: String,
    pub tags: Vec<String>,
    pub price: Decimal,
    pub category_ids: Vec<String>,
    pub manufacturer_ids: Vec<String>,
    pub vendor_id: Option<String>,
    pub store_ids: Vec<String>,
    pub visible_individually: bool,
    pub published: bool,
    pub specification_attributes: Vec<SpecificationAttribute>,
    pub created_at: DateTime<Utc>,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            sku: String::new(),
            short_description: String::new(),
            full_description: String::new(),
            tags: Vec::new(),
            price: Decimal::ZERO,
            category_ids: Vec::new(),
            manufacturer_ids: Vec::new(),
            vendor_id: None,
            store_ids: Vec::new(),
            visible_individually: true,
            published: true,
            specification_attributes: Vec::new(),
            created_at: DateTime::<Utc>::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductOverview {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub short_description: String,
    pub price: String,
    pub specification_attributes: Vec<SpecificationAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_count: usize,
    pub page_index: usize,
    pub page_size: usize,
}

impl ProductPage {
    pub fn empty(page_index: usize, page_size: usize) -> Self {
        Self {
            products: Vec::new(),
            total_count: 0,
            page_index,
            page_size,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Position,
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    CreatedOn,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::Position,
        SortOrder::NameAsc,
        SortOrder::NameDesc,
        SortOrder::PriceAsc,
        SortOrder::PriceDesc,
        SortOrder::CreatedOn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Position => "position",
            SortOrder::NameAsc => "name_asc",
            SortOrder::NameDesc => "name_desc",
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::CreatedOn => "created_on",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(value.trim()))
    }

    pub fn resource_key(&self) -> &'static str {
        match self {
            SortOrder::Position => "Catalog.OrderBy.Position",
            SortOrder::NameAsc => "Catalog.OrderBy.NameAsc",
            SortOrder::NameDesc => "Catalog.OrderBy.NameDesc",
            SortOrder::PriceAsc => "Catalog.OrderBy.PriceAsc",
            SortOrder::PriceDesc => "Catalog.OrderBy.PriceDesc",
            SortOrder::CreatedOn => "Catalog.OrderBy.CreatedOn",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PagingCommand {
    pub page_number: usize,
    pub page_size: usize,
    pub order_by: Option<SortOrder>,
    pub view_mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub advanced: bool,
    pub box_search: bool,
    pub category_id: Option<String>,
    pub include_subcategories: bool,
    pub manufacturer_id: Option<String>,
    pub price_from: Option<String>,
    pub price_to: Option<String>,
    pub search_descriptions: bool,
    pub vendor_id: Option<String>,
    pub command: PagingCommand,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Customer {
    pub id: String,
    pub role_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Currency {
    pub code: String,
    /// Units of this currency per one unit of the primary store currency.
    pub rate: Decimal,
}

impl Currency {
    pub fn primary(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            rate: Decimal::ONE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchContext {
    pub customer: Customer,
    pub store_id: String,
    pub language_id: String,
    pub currency: Currency,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryOption {
    pub id: String,
    pub breadcrumb: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchTermRecord {
    pub id: Uuid,
    pub keyword: String,
    pub store_id: String,
    pub count: u64,
}

impl SearchTermRecord {
    pub fn first_hit(keyword: impl Into<String>, store_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            keyword: keyword.into(),
            store_id: store_id.into(),
            count: 1,
        }
    }
}

/// Filters handed to the product search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProductSearchFilter {
    pub category_ids: Vec<String>,
    pub manufacturer_id: Option<String>,
    pub store_id: String,
    pub visible_individually_only: bool,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub keywords: String,
    pub search_descriptions: bool,
    pub search_sku: bool,
    pub search_tags: bool,
    pub language_id: String,
    pub order_by: SortOrder,
    pub page_index: usize,
    pub page_size: usize,
    pub vendor_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PagingFilteringContext {
    pub allow_product_sorting: bool,
    pub available_sort_options: Vec<SelectOption>,
    pub allow_product_view_mode_changing: bool,
    pub available_view_modes: Vec<SelectOption>,
    pub view_mode: String,
    pub page_size_enabled: bool,
    pub available_page_size_options: Vec<SelectOption>,
    pub total_items: usize,
    pub page_number: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub first_item: usize,
    pub last_item: usize,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl PagingFilteringContext {
    pub fn load_paged_list(&mut self, page: &ProductPage) {
        let page_size = page.page_size.max(1);
        self.total_items = page.total_count;
        self.page_number = page.page_index.saturating_add(1);
        self.page_size = page.page_size;
        self.total_pages = page.total_count.div_ceil(page_size);

        if page.total_count == 0 {
            self.first_item = 0;
            self.last_item = 0;
        } else {
            self.first_item = page.page_index.saturating_mul(page_size).saturating_add(1);
            self.last_item = self
                .first_item
                .saturating_add(page_size - 1)
                .min(page.total_count);
        }

        self.has_previous_page = page.page_index > 0;
        self.has_next_page = self.page_number < self.total_pages;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SearchResultModel {
    pub query: String,
    pub advanced: bool,
    pub search_descriptions: bool,
    pub allow_vendor_search: bool,
    pub category_id: Option<String>,
    pub include_subcategories: bool,
    pub manufacturer_id: Option<String>,
    pub vendor_id: Option<String>,
    pub price_from: Option<String>,
    pub price_to: Option<String>,
    pub available_categories: Vec<SelectOption>,
    pub available_manufacturers: Vec<SelectOption>,
    pub available_vendors: Vec<SelectOption>,
    pub products: Vec<ProductOverview>,
    pub no_results: bool,
    pub warning: Option<String>,
    pub paging: PagingFilteringContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localized_falls_back_to_default_name() {
        let names = vec![
            LocalizedName {
                language_id: "de".to_string(),
                value: "Lampen".to_string(),
            },
            LocalizedName {
                language_id: "fr".to_string(),
                value: "  ".to_string(),
            },
        ];

        assert_eq!(localized("Lamps", &names, "de"), "Lampen");
        assert_eq!(localized("Lamps", &names, "fr"), "Lamps");
        assert_eq!(localized("Lamps", &names, "en"), "Lamps");
    }

    #[test]
    fn paged_list_reports_item_window() {
        let mut context = PagingFilteringContext::default();
        context.load_paged_list(&ProductPage {
            products: Vec::new(),
            total_count: 20,
            page_index: 1,
            page_size: 6,
        });

        assert_eq!(context.page_number, 2);
        assert_eq!(context.total_pages, 4);
        assert_eq!(context.first_item, 7);
        assert_eq!(context.last_item, 12);
        assert!(context.has_previous_page);
        assert!(context.has_next_page);
    }

    #[test]
    fn empty_paged_list_has_no_window() {
        let mut context = PagingFilteringContext::default();
        context.load_paged_list(&ProductPage::empty(0, 6));

        assert_eq!(context.total_items, 0);
        assert_eq!(context.page_number, 1);
        assert_eq!(context.total_pages, 0);
        assert_eq!(context.first_item, 0);
        assert!(!context.has_next_page);
    }

    #[test]
    fn far_page_index_saturates_instead_of_overflowing() {
        let mut context = PagingFilteringContext::default();
        context.load_paged_list(&ProductPage {
            products: Vec::new(),
            total_count: 1,
            page_index: usize::MAX - 1,
            page_size: 6,
        });

        assert_eq!(context.page_number, usize::MAX);
        assert_eq!(context.first_item, usize::MAX);
        assert_eq!(context.last_item, 1);
        assert!(context.has_previous_page);
        assert!(!context.has_next_page);
    }

    #[test]
    fn sort_order_parses_known_names() {
        assert_eq!(SortOrder::parse("PRICE_ASC"), Some(SortOrder::PriceAsc));
        assert_eq!(SortOrder::parse("bogus"), None);
    }
}
