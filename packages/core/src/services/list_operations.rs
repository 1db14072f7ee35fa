//! Search → Filter → Sort pipeline
//!
//! Pure list transformations applied in a fixed order over the flattened item
//! list. Hierarchical input is flattened first and the output is never
//! re-nested.
//!
//! # Stages
//!
//! - **Search**: keep an item if ANY configured key contains (or, in exact
//!   mode, equals) the query. Case-insensitive unless configured otherwise.
//!   A blank query passes everything through.
//! - **Filter**: keep an item if EVERY filter's predicate accepts it.
//! - **Sort**: stable, nulls first when ascending (last when descending),
//!   strings compared case-insensitively.
//!
//! # Examples
//!
//! ```rust
//! use canoncore_core::models::Item;
//! use canoncore_core::services::{common_searches, common_sorts, ListOperations, SortDirection};
//!
//! let items = vec![Item::with_id("1", "beta"), Item::with_id("2", "Alpha"), Item::with_id("3", "gamma")];
//! let mut list = ListOperations::new(items)
//!     .with_search_config(common_searches::title_only())
//!     .with_initial_sort(common_sorts::alphabetical(SortDirection::Asc));
//!
//! list.set_search_query("a");
//! let titles: Vec<String> = list.processed_items().into_iter().map(|i| i.title).collect();
//! assert_eq!(titles, vec!["Alpha", "beta", "gamma"]);
//! ```

use crate::models::{Item, TreeNode};
use crate::tree::flatten_tree;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Comparable value extracted from an item for sorting
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Null => 0,
            SortValue::Bool(_) => 1,
            SortValue::Number(_) => 2,
            SortValue::Text(_) => 3,
            SortValue::Time(_) => 4,
        }
    }

    /// Order two defined values. Text compares case-insensitively.
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Text(a), SortValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (SortValue::Time(a), SortValue::Time(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn is_null(&self) -> bool {
        matches!(self, SortValue::Null)
    }
}

impl From<Option<Value>> for SortValue {
    fn from(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => SortValue::Null,
            Some(Value::Bool(b)) => SortValue::Bool(b),
            Some(Value::Number(n)) => n.as_f64().map(SortValue::Number).unwrap_or(SortValue::Null),
            Some(Value::String(s)) => SortValue::Text(s),
            Some(other) => SortValue::Text(other.to_string()),
        }
    }
}

pub type SortExtractor = Arc<dyn Fn(&Item) -> SortValue + Send + Sync>;

/// Field name or key function
#[derive(Clone)]
pub enum SortKey {
    Field(String),
    Extractor(SortExtractor),
}

impl SortKey {
    pub fn field(name: impl Into<String>) -> Self {
        SortKey::Field(name.into())
    }

    fn extract(&self, item: &Item) -> SortValue {
        match self {
            SortKey::Field(name) => match name.as_str() {
                "created_at" => item.created_at.map(SortValue::Time).unwrap_or(SortValue::Null),
                "updated_at" => item.updated_at.map(SortValue::Time).unwrap_or(SortValue::Null),
                _ => SortValue::from(item.field(name)),
            },
            SortKey::Extractor(extract) => extract(item),
        }
    }
}

impl fmt::Debug for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Field(name) => f.debug_tuple("Field").field(name).finish(),
            SortKey::Extractor(_) => f.write_str("Extractor(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
    pub label: Option<String>,
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key,
            direction,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

pub type FilterPredicate = Arc<dyn Fn(&Item, &Value) -> bool + Send + Sync>;

/// Named predicate plus the value it is evaluated against
#[derive(Clone)]
pub struct FilterConfig {
    pub key: String,
    pub predicate: FilterPredicate,
    pub value: Value,
    pub label: Option<String>,
}

impl FilterConfig {
    pub fn new<F>(key: impl Into<String>, value: Value, predicate: F) -> Self
    where
        F: Fn(&Item, &Value) -> bool + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            predicate: Arc::new(predicate),
            value,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        (self.predicate)(item, &self.value)
    }
}

impl fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterConfig")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("label", &self.label)
            .finish()
    }
}

pub type SearchExtractor = Arc<dyn Fn(&Item) -> String + Send + Sync>;

#[derive(Clone)]
pub enum SearchKey {
    Field(String),
    Extractor(SearchExtractor),
}

impl SearchKey {
    pub fn field(name: impl Into<String>) -> Self {
        SearchKey::Field(name.into())
    }

    /// Missing or null fields read as the empty string
    fn text(&self, item: &Item) -> String {
        match self {
            SearchKey::Field(name) => match item.field(name) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
            },
            SearchKey::Extractor(extract) => extract(item),
        }
    }
}

impl fmt::Debug for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchKey::Field(name) => f.debug_tuple("Field").field(name).finish(),
            SearchKey::Extractor(_) => f.write_str("Extractor(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub keys: Vec<SearchKey>,
    pub case_sensitive: bool,
    pub exact_match: bool,
}

impl SearchConfig {
    pub fn new(keys: Vec<SearchKey>) -> Self {
        Self {
            keys,
            case_sensitive: false,
            exact_match: false,
        }
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_exact_match(mut self, exact_match: bool) -> Self {
        self.exact_match = exact_match;
        self
    }
}

pub fn search_items(items: &[Item], query: &str, config: &SearchConfig) -> Vec<Item> {
    if query.trim().is_empty() {
        return items.to_vec();
    }

    let needle = if config.case_sensitive {
        query.to_string()
    } else {
        query.to_lowercase()
    };

    items
        .iter()
        .filter(|item| {
            config.keys.iter().any(|key| {
                let mut value = key.text(item);
                if !config.case_sensitive {
                    value = value.to_lowercase();
                }
                if config.exact_match {
                    value == needle
                } else {
                    value.contains(&needle)
                }
            })
        })
        .cloned()
        .collect()
}

pub fn filter_items(items: &[Item], filters: &[FilterConfig]) -> Vec<Item> {
    items
        .iter()
        .filter(|item| filters.iter().all(|filter| filter.matches(item)))
        .cloned()
        .collect()
}

/// Stable sort by the configured key
pub fn sort_items(items: &[Item], config: &SortConfig) -> Vec<Item> {
    let mut keyed: Vec<(SortValue, &Item)> = items
        .iter()
        .map(|item| (config.key.extract(item), item))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => a.compare(b),
        };
        match config.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, item)| item.clone()).collect()
}

/// Run the three stages in order over an already flat list
pub fn process_items(
    items: &[Item],
    query: &str,
    search: Option<&SearchConfig>,
    filters: &[FilterConfig],
    sort: Option<&SortConfig>,
) -> Vec<Item> {
    let mut result = match search {
        Some(config) => search_items(items, query, config),
        None => items.to_vec(),
    };
    if !filters.is_empty() {
        result = filter_items(&result, filters);
    }
    if let Some(config) = sort {
        result = sort_items(&result, config);
    }
    result
}

/// Stateful wrapper holding the current query, filters and sort
#[derive(Debug, Clone, Default)]
pub struct ListOperations {
    items: Vec<Item>,
    initial_sort: Option<SortConfig>,
    initial_filters: Vec<FilterConfig>,
    search_config: Option<SearchConfig>,
    sort_config: Option<SortConfig>,
    filters: Vec<FilterConfig>,
    search_query: String,
}

impl ListOperations {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Pipeline over a tree, flattened in pre-order
    pub fn from_tree(tree: &[TreeNode]) -> Self {
        Self::new(flatten_tree(tree))
    }

    pub fn with_initial_sort(mut self, sort: SortConfig) -> Self {
        self.initial_sort = Some(sort.clone());
        self.sort_config = Some(sort);
        self
    }

    pub fn with_initial_filters(mut self, filters: Vec<FilterConfig>) -> Self {
        self.initial_filters = filters.clone();
        self.filters = filters;
        self
    }

    pub fn with_search_config(mut self, config: SearchConfig) -> Self {
        self.search_config = Some(config);
        self
    }

    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    pub fn set_tree(&mut self, tree: &[TreeNode]) {
        self.items = flatten_tree(tree);
    }

    pub fn set_sort_config(&mut self, sort: Option<SortConfig>) {
        self.sort_config = sort;
    }

    /// Add a filter, replacing any existing filter with the same key
    pub fn add_filter(&mut self, filter: FilterConfig) {
        match self.filters.iter_mut().find(|f| f.key == filter.key) {
            Some(existing) => *existing = filter,
            None => self.filters.push(filter),
        }
    }

    pub fn remove_filter(&mut self, key: &str) {
        self.filters.retain(|f| f.key != key);
    }

    /// Change the value of an existing filter; unknown keys are ignored
    pub fn update_filter(&mut self, key: &str, value: Value) {
        if let Some(filter) = self.filters.iter_mut().find(|f| f.key == key) {
            filter.value = value;
        }
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
    }

    /// Back to the initial sort and filters with no search
    pub fn reset(&mut self) {
        self.sort_config = self.initial_sort.clone();
        self.filters = self.initial_filters.clone();
        self.search_query.clear();
    }

    pub fn sort_config(&self) -> Option<&SortConfig> {
        self.sort_config.as_ref()
    }

    pub fn filters(&self) -> &[FilterConfig] {
        &self.filters
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn processed_items(&self) -> Vec<Item> {
        process_items(
            &self.items,
            &self.search_query,
            self.search_config.as_ref(),
            &self.filters,
            self.sort_config.as_ref(),
        )
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn filtered_count(&self) -> usize {
        self.processed_items().len()
    }
}

/// Ready-made sort configurations
pub mod common_sorts {
    use super::{SortConfig, SortDirection, SortKey};

    fn pick(direction: SortDirection, asc: &str, desc: &str) -> String {
        match direction {
            SortDirection::Asc => asc.to_string(),
            SortDirection::Desc => desc.to_string(),
        }
    }

    pub fn alphabetical(direction: SortDirection) -> SortConfig {
        SortConfig::new(SortKey::field("title"), direction)
            .with_label(format!("Title {}", pick(direction, "A-Z", "Z-A")))
    }

    pub fn date_created(direction: SortDirection) -> SortConfig {
        SortConfig::new(SortKey::field("created_at"), direction)
            .with_label(format!("Date {}", pick(direction, "Oldest", "Newest")))
    }

    pub fn date_updated(direction: SortDirection) -> SortConfig {
        SortConfig::new(SortKey::field("updated_at"), direction)
            .with_label(format!("Updated {}", pick(direction, "Oldest", "Recently")))
    }

    pub fn order_index(direction: SortDirection) -> SortConfig {
        SortConfig::new(SortKey::field("order_index"), direction)
            .with_label(format!("Order {}", pick(direction, "First", "Last")))
    }
}

/// Ready-made filters
pub mod common_filters {
    use super::FilterConfig;
    use chrono::{DateTime, Utc};
    use serde_json::{json, Value};

    /// Keep items whose type is in `types`; an empty list keeps everything
    pub fn by_type(types: Vec<String>) -> FilterConfig {
        FilterConfig::new("type", json!(types), |item, value| {
            let allowed = value.as_array().map(Vec::as_slice).unwrap_or(&[]);
            if allowed.is_empty() {
                return true;
            }
            match &item.item_type {
                Some(item_type) => allowed.iter().any(|t| t.as_str() == Some(item_type.as_str())),
                None => false,
            }
        })
        .with_label("Content Type")
    }

    pub fn has_description() -> FilterConfig {
        FilterConfig::new("hasDescription", Value::Bool(true), |item, _| {
            item.description
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty())
        })
        .with_label("Has Description")
    }

    /// Inclusive creation-date window; either bound may be open. Items without
    /// a creation date are kept.
    pub fn date_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> FilterConfig {
        let value = json!({
            "start": start.map(|d| d.to_rfc3339()),
            "end": end.map(|d| d.to_rfc3339()),
        });
        FilterConfig::new("dateRange", value, |item, value| {
            let Some(created) = item.created_at else {
                return true;
            };
            let bound = |name: &str| {
                value
                    .get(name)
                    .and_then(Value::as_str)
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|d| d.with_timezone(&Utc))
            };
            if bound("start").is_some_and(|start| created < start) {
                return false;
            }
            if bound("end").is_some_and(|end| created > end) {
                return false;
            }
            true
        })
        .with_label("Date Range")
    }
}

/// Ready-made search configurations
pub mod common_searches {
    use super::{SearchConfig, SearchKey};

    pub fn title_and_description() -> SearchConfig {
        SearchConfig::new(vec![
            SearchKey::field("title"),
            SearchKey::field("description"),
        ])
    }

    pub fn title_only() -> SearchConfig {
        SearchConfig::new(vec![SearchKey::field("title")])
    }
}
