use crate::cache::CategoryOptionsCache;
use crate::categories::{categories_cache_key, category_options, child_category_ids, Audience};
use crate::localization::{format_resource, COMMON_ALL, SEARCH_TERM_MINIMUM_LENGTH};
use crate::paging::{self, ResolvedPaging};
use crate::settings::StorefrontSettings;
use crate::traits::{
    CategoryService, CurrencyService, LocalizationService, ManufacturerService,
    ProductOverviewBuilder, ProductSearchService, SearchTermStore, VendorService,
};
use crate::{
    Currency, ProductPage, ProductSearchFilter, SearchContext, SearchError, SearchRequest,
    SearchResultModel, SearchTermRecord, SelectOption,
};
use rust_decimal::Decimal;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Collaborators the search page depends on.
#[derive(Clone)]
pub struct SearchPorts {
    pub categories: Arc<dyn CategoryService>,
    pub manufacturers: Arc<dyn ManufacturerService>,
    pub vendors: Arc<dyn VendorService>,
    pub currency: Arc<dyn CurrencyService>,
    pub products: Arc<dyn ProductSearchService>,
    pub search_terms: Arc<dyn SearchTermStore>,
    pub localization: Arc<dyn LocalizationService>,
    pub overviews: Arc<dyn ProductOverviewBuilder>,
}

/// Builds the search page model: facets, product page and search-term statistics.
pub struct SearchAggregator {
    ports: SearchPorts,
    settings: Arc<StorefrontSettings>,
    category_cache: CategoryOptionsCache,
}

impl SearchAggregator {
    pub fn new(ports: SearchPorts, settings: Arc<StorefrontSettings>) -> Self {
        let category_cache = CategoryOptionsCache::new(&settings.cache);
        Self::with_cache(ports, settings, category_cache)
    }

    pub fn with_cache(
        ports: SearchPorts,
        settings: Arc<StorefrontSettings>,
        category_cache: CategoryOptionsCache,
    ) -> Self {
        Self {
            ports,
            settings,
            category_cache,
        }
    }

    pub fn category_cache(&self) -> &CategoryOptionsCache {
        &self.category_cache
    }

    pub async fn handle(
        &self,
        mut request: SearchRequest,
        context: &SearchContext,
        cancel: &CancellationToken,
    ) -> Result<SearchResultModel, SearchError> {
        let catalog = &self.settings.catalog;
        let allow_vendor_search = self.settings.vendor.allow_search_by_vendor;

        let query = request
            .query
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string();

        if request.box_search {
            request.search_descriptions = catalog.search_by_description;
        }
        if request.search_descriptions {
            request.advanced = true;
        }

        let (paging, paging_context) =
            paging::resolve_options(&request.command, catalog, self.ports.localization.as_ref());

        let mut model = SearchResultModel {
            query: query.clone(),
            advanced: request.advanced,
            search_descriptions: request.search_descriptions,
            allow_vendor_search,
            category_id: request.category_id.clone(),
            include_subcategories: request.include_subcategories,
            manufacturer_id: request.manufacturer_id.clone(),
            vendor_id: request.vendor_id.clone(),
            price_from: request.price_from.clone(),
            price_to: request.price_to.clone(),
            paging: paging_context,
            ..SearchResultModel::default()
        };

        model.available_categories = self.category_facets(&request, context, cancel).await?;

        let manufacturers = guarded(cancel, self.ports.manufacturers.all_manufacturers()).await?;
        model.available_manufacturers = self.facet_options(
            manufacturers
                .iter()
                .map(|item| (item.id.clone(), item.localized_name(&context.language_id).to_string())),
            request.manufacturer_id.as_deref(),
        );

        if allow_vendor_search {
            let vendors = guarded(cancel, self.ports.vendors.all_vendors()).await?;
            model.available_vendors = self.facet_options(
                vendors
                    .iter()
                    .map(|item| (item.id.clone(), item.localized_name(&context.language_id).to_string())),
                request.vendor_id.as_deref(),
            );
        }

        let mut page = ProductPage::empty(0, paging.page_size);

        if !query.is_empty() {
            let minimum_length = catalog.product_search_term_minimum_length;
            if query.chars().count() < minimum_length {
                debug!(query = %query, minimum_length, "search term too short");
                model.warning = Some(format_resource(
                    self.ports.localization.as_ref(),
                    SEARCH_TERM_MINIMUM_LENGTH,
                    &[&minimum_length],
                ));
            } else {
                let filter = self
                    .build_filter(&query, &request, context, &paging, cancel)
                    .await?;
                debug!(
                    query = %query,
                    store_id = %context.store_id,
                    categories = filter.category_ids.len(),
                    page_index = filter.page_index,
                    page_size = filter.page_size,
                    "dispatching product search"
                );

                page = guarded(cancel, self.ports.products.search_products(&filter)).await?;
                model.products = guarded(
                    cancel,
                    self.ports
                        .overviews
                        .prepare_overviews(&page.products, catalog.show_spec_attribute_on_catalog_pages),
                )
                .await?;
                model.no_results = model.products.is_empty();

                self.record_search_term(&query, &context.store_id, cancel).await?;
            }
        }

        model.paging.load_paged_list(&page);
        Ok(model)
    }

    async fn category_facets(
        &self,
        request: &SearchRequest,
        context: &SearchContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<SelectOption>, SearchError> {
        let audience = audience(context);
        let key = categories_cache_key(
            &context.language_id,
            &context.customer.role_ids,
            &context.store_id,
        );

        let categories = self
            .category_cache
            .get_or_compute(key, async {
                debug!(store_id = %context.store_id, "building category facet list");
                let all = guarded(cancel, self.ports.categories.all_categories(&context.store_id)).await?;
                Ok::<_, SearchError>(category_options(&all, &context.language_id, audience))
            })
            .await?;

        Ok(self.facet_options(
            categories
                .iter()
                .map(|option| (option.id.clone(), option.breadcrumb.clone())),
            request.category_id.as_deref(),
        ))
    }

    /// Leading "All" entry followed by one entry per item; empty when there
    /// are no items.
    fn facet_options(
        &self,
        items: impl Iterator<Item = (String, String)>,
        selected: Option<&str>,
    ) -> Vec<SelectOption> {
        let mut options: Vec<SelectOption> = items
            .map(|(value, text)| SelectOption {
                selected: selected == Some(value.as_str()),
                value,
                text,
            })
            .collect();

        if !options.is_empty() {
            options.insert(
                0,
                SelectOption {
                    value: String::new(),
                    text: self.ports.localization.resource(COMMON_ALL),
                    selected: false,
                },
            );
        }

        options
    }

    async fn build_filter(
        &self,
        query: &str,
        request: &SearchRequest,
        context: &SearchContext,
        paging: &ResolvedPaging,
        cancel: &CancellationToken,
    ) -> Result<ProductSearchFilter, SearchError> {
        let mut filter = ProductSearchFilter {
            store_id: context.store_id.clone(),
            visible_individually_only: true,
            keywords: query.to_string(),
            language_id: context.language_id.clone(),
            order_by: paging.order_by,
            page_index: paging.page_index(),
            page_size: paging.page_size,
            ..ProductSearchFilter::default()
        };

        if request.advanced {
            if let Some(category_id) = non_empty(&request.category_id) {
                filter.category_ids.push(category_id.to_string());
                if request.include_subcategories {
                    let all =
                        guarded(cancel, self.ports.categories.all_categories(&context.store_id)).await?;
                    filter
                        .category_ids
                        .extend(child_category_ids(category_id, &all, audience(context)));
                }
            }

            filter.manufacturer_id = non_empty(&request.manufacturer_id).map(str::to_string);
            filter.price_min = self
                .convert_price(request.price_from.as_deref(), &context.currency, cancel)
                .await?;
            filter.price_max = self
                .convert_price(request.price_to.as_deref(), &context.currency, cancel)
                .await?;

            filter.search_descriptions = request.search_descriptions;
            if self.settings.vendor.allow_search_by_vendor {
                filter.vendor_id = non_empty(&request.vendor_id).map(str::to_string);
            }
        }

        filter.search_sku = filter.search_descriptions;
        filter.search_tags = filter.search_descriptions;

        Ok(filter)
    }

    /// Unparsable bounds are dropped rather than rejected.
    async fn convert_price(
        &self,
        raw: Option<&str>,
        currency: &Currency,
        cancel: &CancellationToken,
    ) -> Result<Option<Decimal>, SearchError> {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(None);
        };

        match Decimal::from_str(raw) {
            Ok(amount) => {
                let converted = guarded(
                    cancel,
                    self.ports
                        .currency
                        .convert_to_primary_store_currency(amount, currency),
                )
                .await?;
                Ok(Some(converted))
            }
            Err(error) => {
                warn!(value = %raw, %error, "ignoring unparsable price bound");
                Ok(None)
            }
        }
    }

    async fn record_search_term(
        &self,
        keyword: &str,
        store_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), SearchError> {
        let existing = guarded(cancel, self.ports.search_terms.find_by_keyword(keyword, store_id)).await?;

        match existing {
            Some(mut record) => {
                record.count += 1;
                let count = record.count;
                guarded(cancel, self.ports.search_terms.update(record)).await?;
                info!(keyword, store_id, count, "search term count updated");
            }
            None => {
                let record = SearchTermRecord::first_hit(keyword, store_id);
                guarded(cancel, self.ports.search_terms.insert(record)).await?;
                info!(keyword, store_id, "search term recorded");
            }
        }

        Ok(())
    }
}

fn audience(context: &SearchContext) -> Audience<'_> {
    Audience {
        role_ids: &context.customer.role_ids,
        store_id: &context.store_id,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Races a collaborator call against the request's cancellation signal.
async fn guarded<T, F>(cancel: &CancellationToken, call: F) -> Result<T, SearchError>
where
    F: Future<Output = Result<T, SearchError>>,
{
    if cancel.is_cancelled() {
        return Err(SearchError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SearchError::Cancelled),
        result = call => result,
    }
}
