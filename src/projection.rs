use std::collections::BTreeSet;

use crate::models::alert::{Alert, AlertOrigin};

/// Kind dropdown choice: the "all" sentinel or one tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Kind(String),
}

impl KindFilter {
    fn matches(&self, alert: &Alert) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Kind(kind) => alert.kind.eq_ignore_ascii_case(kind),
        }
    }
}

/// Origin dropdown choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginFilter {
    #[default]
    All,
    Origin(AlertOrigin),
}

impl OriginFilter {
    fn matches(&self, alert: &Alert) -> bool {
        match self {
            OriginFilter::All => true,
            OriginFilter::Origin(origin) => alert.origin == *origin,
        }
    }
}

/// Current filter/search inputs of the list view.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub search: String,
    pub kind: KindFilter,
    pub origin: OriginFilter,
}

/// Filtered view of the collection. Pure: same inputs, same output, and the
/// relative order of the canonical collection is preserved.
pub fn project<'a>(alerts: &'a [Alert], filters: &Filters) -> Vec<&'a Alert> {
    let search = filters.search.trim().to_lowercase();
    alerts
        .iter()
        .filter(|alert| {
            matches_search(alert, &search)
                && filters.kind.matches(alert)
                && filters.origin.matches(alert)
        })
        .collect()
}

/// Empty search matches everything; otherwise the text must appear in the
/// reporter's full name or in the kind tag, case-insensitively.
fn matches_search(alert: &Alert, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    alert.reporter_name().to_lowercase().contains(search) || alert.kind.contains(search)
}

/// Distinct non-empty kind tags present in the collection, for the kind
/// dropdown. Recomputed from the live collection on every call, so a tag
/// appears as soon as a sync brings it in.
pub fn kind_vocabulary(alerts: &[Alert]) -> Vec<String> {
    let set: BTreeSet<&str> = alerts
        .iter()
        .map(|a| a.kind.as_str())
        .filter(|k| !k.is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}
