use crate::{Category, CategoryOption};
use std::collections::{HashMap, HashSet};

pub const BREADCRUMB_SEPARATOR: &str = " >> ";

/// Who is looking at the catalog: the customer's roles and the current store.
#[derive(Debug, Clone, Copy)]
pub struct Audience<'a> {
    pub role_ids: &'a [String],
    pub store_id: &'a str,
}

impl Audience<'_> {
    pub fn authorizes(&self, category: &Category) -> bool {
        if !category.published {
            return false;
        }

        let acl_ok = !category.subject_to_acl
            || category
                .allowed_role_ids
                .iter()
                .any(|role| self.role_ids.contains(role));
        let store_ok = !category.limited_to_stores
            || category.store_ids.iter().any(|store| store == self.store_id);

        acl_ok && store_ok
    }
}

pub fn categories_cache_key(language_id: &str, role_ids: &[String], store_id: &str) -> String {
    format!(
        "storefront.search.categories-{}-{}-{}",
        language_id,
        role_ids.join(","),
        store_id
    )
}

/// Ancestor chain of `category`, root first. The walk stops at the first
/// ancestor that is missing, hidden from `audience`, or already visited.
pub fn breadcrumb<'a>(
    category: &'a Category,
    all: &'a [Category],
    audience: Audience<'_>,
) -> Vec<&'a Category> {
    let by_id: HashMap<&str, &Category> = all.iter().map(|item| (item.id.as_str(), item)).collect();
    let mut visited = HashSet::new();
    let mut chain = Vec::new();
    let mut current = Some(category);

    while let Some(item) = current {
        if !audience.authorizes(item) || !visited.insert(item.id.as_str()) {
            break;
        }
        chain.push(item);
        current = item
            .parent_id
            .as_deref()
            .filter(|parent| !parent.is_empty())
            .and_then(|parent| by_id.get(parent).copied());
    }

    chain.reverse();
    chain
}

pub fn breadcrumb_text(chain: &[&Category], language_id: &str) -> String {
    chain
        .iter()
        .map(|item| item.localized_name(language_id))
        .collect::<Vec<_>>()
        .join(BREADCRUMB_SEPARATOR)
}

/// One option per category visible to `audience`, labelled with its breadcrumb.
pub fn category_options(all: &[Category], language_id: &str, audience: Audience<'_>) -> Vec<CategoryOption> {
    all.iter()
        .filter(|category| audience.authorizes(category))
        .map(|category| CategoryOption {
            id: category.id.clone(),
            breadcrumb: breadcrumb_text(&breadcrumb(category, all, audience), language_id),
        })
        .collect()
}

/// Ids of every descendant of `parent_id` visible to `audience`, depth first.
pub fn child_category_ids(parent_id: &str, all: &[Category], audience: Audience<'_>) -> Vec<String> {
    let mut children: HashMap<&str, Vec<&Category>> = HashMap::new();
    for category in all {
        if let Some(parent) = category.parent_id.as_deref() {
            children.entry(parent).or_default().push(category);
        }
    }

    let mut visited = HashSet::from([parent_id]);
    let mut result = Vec::new();
    collect_children(parent_id, &children, audience, &mut visited, &mut result);
    result
}

fn collect_children<'a>(
    parent_id: &str,
    children: &HashMap<&str, Vec<&'a Category>>,
    audience: Audience<'_>,
    visited: &mut HashSet<&'a str>,
    result: &mut Vec<String>,
) {
    let Some(direct) = children.get(parent_id) else {
        return;
    };
    for child in direct {
        if !audience.authorizes(child) || !visited.insert(child.id.as_str()) {
            continue;
        }
        result.push(child.id.clone());
        collect_children(&child.id, children, audience, visited, result);
    }
}
