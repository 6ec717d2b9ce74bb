use crate::localization::{VIEW_MODE_GRID as GRID_RESOURCE, VIEW_MODE_LIST as LIST_RESOURCE};
use crate::settings::{CatalogSettings, VIEW_MODE_GRID, VIEW_MODE_LIST};
use crate::traits::LocalizationService;
use crate::{PagingCommand, PagingFilteringContext, SelectOption, SortOrder};

/// Paging command after defaults and settings have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaging {
    pub page_number: usize,
    pub page_size: usize,
    pub order_by: SortOrder,
    pub view_mode: String,
}

impl ResolvedPaging {
    pub fn page_index(&self) -> usize {
        self.page_number.saturating_sub(1)
    }
}

pub fn resolve_options(
    command: &PagingCommand,
    settings: &CatalogSettings,
    localization: &dyn LocalizationService,
) -> (ResolvedPaging, PagingFilteringContext) {
    let mut context = PagingFilteringContext::default();

    let order_by = if settings.allow_product_sorting {
        command.order_by.unwrap_or_default()
    } else {
        SortOrder::Position
    };
    context.allow_product_sorting = settings.allow_product_sorting;
    if settings.allow_product_sorting {
        context.available_sort_options = SortOrder::ALL
            .iter()
            .map(|order| SelectOption {
                value: order.as_str().to_string(),
                text: localization.resource(order.resource_key()),
                selected: *order == order_by,
            })
            .collect();
    }

    let view_mode = match command.view_mode.as_deref() {
        Some(mode @ (VIEW_MODE_GRID | VIEW_MODE_LIST)) if settings.allow_product_view_mode_changing => {
            mode.to_string()
        }
        _ => settings.default_view_mode.clone(),
    };
    context.allow_product_view_mode_changing = settings.allow_product_view_mode_changing;
    if settings.allow_product_view_mode_changing {
        context.available_view_modes = [(VIEW_MODE_GRID, GRID_RESOURCE), (VIEW_MODE_LIST, LIST_RESOURCE)]
            .into_iter()
            .map(|(mode, key)| SelectOption {
                value: mode.to_string(),
                text: localization.resource(key),
                selected: mode == view_mode,
            })
            .collect();
    }
    context.view_mode = view_mode.clone();

    let mut page_size = settings.search_page_products_per_page;
    let page_size_options = settings.page_size_options();
    if settings.search_page_allow_customers_to_select_page_size && !page_size_options.is_empty() {
        page_size = if page_size_options.contains(&command.page_size) {
            command.page_size
        } else {
            page_size_options[0]
        };
        context.page_size_enabled = page_size_options.len() > 1;
        context.available_page_size_options = page_size_options
            .iter()
            .map(|size| SelectOption {
                value: size.to_string(),
                text: size.to_string(),
                selected: *size == page_size,
            })
            .collect();
    }
    if page_size == 0 {
        page_size = settings.search_page_products_per_page;
    }

    let resolved = ResolvedPaging {
        page_number: command.page_number.max(1),
        page_size,
        order_by,
        view_mode,
    };
    context.page_number = resolved.page_number;
    context.page_size = resolved.page_size;

    (resolved, context)
}
