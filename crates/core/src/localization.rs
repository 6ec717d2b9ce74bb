use crate::traits::LocalizationService;

pub const COMMON_ALL: &str = "Common.All";
pub const SEARCH_TERM_MINIMUM_LENGTH: &str = "Search.SearchTermMinimumLengthIsNCharacters";
pub const VIEW_MODE_GRID: &str = "Catalog.ViewMode.Grid";
pub const VIEW_MODE_LIST: &str = "Catalog.ViewMode.List";

/// Looks up `key` and substitutes positional `{0}`, `{1}`, ... placeholders.
pub fn format_resource(
    localization: &dyn LocalizationService,
    key: &str,
    args: &[&dyn std::fmt::Display],
) -> String {
    let mut text = localization.resource(key);
    for (index, arg) in args.iter().enumerate() {
        text = text.replace(&format!("{{{index}}}"), &arg.to_string());
    }
    text
}
