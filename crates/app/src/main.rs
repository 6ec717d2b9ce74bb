use chrono::Utc;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use storefront_search_core::{
    CancellationToken, CatalogSnapshot, Currency, Customer, InMemoryCatalog,
    InMemorySearchTermStore, OverviewBuilder, PagingCommand, RateTableCurrency, ResourceTable,
    SearchAggregator, SearchContext, SearchPorts, SearchRequest, SearchResultModel, SortOrder,
    StorefrontSettings,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "storefront-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings JSON file; built-in defaults are used when omitted.
    #[arg(long, env = "STOREFRONT_SETTINGS")]
    settings: Option<PathBuf>,

    /// Catalog snapshot JSON file.
    #[arg(long, env = "STOREFRONT_CATALOG", default_value = "catalog.json")]
    catalog: PathBuf,

    /// Search-term statistics JSON file.
    #[arg(long, env = "STOREFRONT_SEARCH_TERMS", default_value = "search_terms.json")]
    terms: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Run one search and print the search page model.
    Search {
        /// Search query
        #[arg(long, short)]
        query: Option<String>,
        /// Enable advanced search filters.
        #[arg(long, default_value_t = false)]
        advanced: bool,
        /// Request comes from the header search box.
        #[arg(long = "box", default_value_t = false)]
        box_search: bool,
        #[arg(long)]
        category_id: Option<String>,
        /// Also match products in subcategories of --category-id.
        #[arg(long, default_value_t = false)]
        include_subcategories: bool,
        #[arg(long)]
        manufacturer_id: Option<String>,
        #[arg(long)]
        vendor_id: Option<String>,
        /// Lower price bound in the request currency.
        #[arg(long)]
        price_from: Option<String>,
        /// Upper price bound in the request currency.
        #[arg(long)]
        price_to: Option<String>,
        /// Search descriptions, SKUs and tags as well as names.
        #[arg(long, default_value_t = false)]
        search_descriptions: bool,
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long, default_value = "0")]
        page_size: usize,
        /// position, name_asc, name_desc, price_asc, price_desc or created_on.
        #[arg(long, value_parser = parse_sort_order)]
        order_by: Option<SortOrder>,
        #[arg(long)]
        view_mode: Option<String>,
        #[arg(long, default_value = "default")]
        store: String,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Units of --currency per one unit of the primary store currency.
        #[arg(long, default_value = "1")]
        currency_rate: Decimal,
        #[arg(long, default_value = "guest")]
        customer: String,
        /// Customer role ids, comma separated.
        #[arg(long, value_delimiter = ',')]
        roles: Vec<String>,
        /// Print the model as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List recorded search terms, most searched first.
    Terms {
        /// Only show terms for this store.
        #[arg(long)]
        store: Option<String>,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

fn parse_sort_order(value: &str) -> Result<SortOrder, String> {
    SortOrder::parse(value).ok_or_else(|| format!("unknown sort order `{value}`"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => StorefrontSettings::load(path)?,
        None => StorefrontSettings::default(),
    };
    let terms = Arc::new(InMemorySearchTermStore::load(&cli.terms).await?);

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "storefront-search boot"
    );

    match cli.command {
        Command::Search {
            query,
            advanced,
            box_search,
            category_id,
            include_subcategories,
            manufacturer_id,
            vendor_id,
            price_from,
            price_to,
            search_descriptions,
            page,
            page_size,
            order_by,
            view_mode,
            store,
            language,
            currency,
            currency_rate,
            customer,
            roles,
            json,
        } => {
            let snapshot = CatalogSnapshot::load(&cli.catalog).await?;
            let catalog = Arc::new(InMemoryCatalog::from_snapshot(&snapshot));
            info!(
                catalog = %cli.catalog.display(),
                products = snapshot.products.len(),
                categories = snapshot.categories.len(),
                "catalog snapshot loaded"
            );

            let ports = SearchPorts {
                categories: catalog.clone(),
                manufacturers: catalog.clone(),
                vendors: catalog.clone(),
                currency: Arc::new(RateTableCurrency),
                products: catalog,
                search_terms: terms.clone(),
                localization: Arc::new(ResourceTable::from_snapshot(&snapshot, &language)),
                overviews: Arc::new(OverviewBuilder::new(currency.clone())),
            };
            let aggregator = SearchAggregator::new(ports, Arc::new(settings));

            let request = SearchRequest {
                query,
                advanced,
                box_search,
                category_id,
                include_subcategories,
                manufacturer_id,
                price_from,
                price_to,
                search_descriptions,
                vendor_id,
                command: PagingCommand {
                    page_number: page,
                    page_size,
                    order_by,
                    view_mode,
                },
            };
            let context = SearchContext {
                customer: Customer {
                    id: customer,
                    role_ids: roles,
                },
                store_id: store,
                language_id: language,
                currency: Currency {
                    code: currency,
                    rate: currency_rate,
                },
            };

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, cancelling search");
                    on_interrupt.cancel();
                }
            });

            let model = aggregator.handle(request, &context, &cancel).await?;
            terms.save(&cli.terms).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&model)?);
            } else {
                print_model(&model);
            }
        }
        Command::Terms { store, limit } => {
            let records = terms.records()?;
            for record in records
                .iter()
                .filter(|record| store.as_deref().map_or(true, |id| record.store_id == id))
                .take(limit)
            {
                println!("{:>6}  {}  [{}]", record.count, record.keyword, record.store_id);
            }
        }
    }

    Ok(())
}

fn print_model(model: &SearchResultModel) {
    println!("query: {}", model.query);
    if let Some(warning) = &model.warning {
        println!("warning: {warning}");
    }

    for (label, options) in [
        ("categories", &model.available_categories),
        ("manufacturers", &model.available_manufacturers),
        ("vendors", &model.available_vendors),
    ] {
        if options.is_empty() {
            continue;
        }
        println!("{label}:");
        for option in options {
            let marker = if option.selected { "*" } else { " " };
            println!("  {marker} [{}] {}", option.value, option.text);
        }
    }

    if model.no_results {
        println!("no products found");
    }
    for product in &model.products {
        println!("[{}] {} sku={} price={}", product.id, product.name, product.sku, product.price);
        if !product.short_description.is_empty() {
            println!("  {}", product.short_description);
        }
        for attribute in &product.specification_attributes {
            println!("  {}: {}", attribute.name, attribute.value);
        }
    }

    let paging = &model.paging;
    println!(
        "page {}/{} items {}-{} of {} (page size {}, view {})",
        paging.page_number,
        paging.total_pages,
        paging.first_item,
        paging.last_item,
        paging.total_items,
        paging.page_size,
        paging.view_mode
    );
}
