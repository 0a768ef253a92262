//! Gebeta search: free-text search and exact filtering over a recipe view.
//! Linear scans; results keep the order of the input view.

#![forbid(unsafe_code)]

use gebeta_core::{Category, Difficulty, Recipe};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Case-insensitive substring search over title, Amharic title, description,
/// category and region. A blank query returns the whole view.
pub fn search<'a>(recipes: &'a [Recipe], query: &str) -> Vec<&'a Recipe> {
    if query.trim().is_empty() {
        return recipes.iter().collect();
    }
    let started = std::time::Instant::now();
    let q = query.to_lowercase();
    let hits: Vec<&Recipe> = recipes.iter().filter(|r| matches_query(r, &q)).collect();
    metrics::histogram!("search_ms", started.elapsed().as_secs_f64() * 1000.0);
    trace!(query = %query, hits = hits.len(), total = recipes.len(), "search");
    hits
}

/// `q` must already be lowercased.
pub fn matches_query(r: &Recipe, q: &str) -> bool {
    [
        r.title.as_str(),
        r.title_amharic.as_str(),
        r.description.as_str(),
        r.category.as_str(),
        r.region.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(q))
}

/// Exact-match criteria. Absent criteria are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub region: Option<String>,
}

impl Filter {
    pub fn new() -> Self { Self::default() }

    pub fn category(mut self, c: Category) -> Self {
        self.category = Some(c);
        self
    }

    pub fn difficulty(mut self, d: Difficulty) -> Self {
        self.difficulty = Some(d);
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn is_empty(&self) -> bool { self.category.is_none() && self.difficulty.is_none() && self.region.is_none() }

    pub fn matches(&self, r: &Recipe) -> bool {
        if let Some(c) = self.category { if r.category != c { return false; } }
        if let Some(d) = self.difficulty { if r.difficulty != d { return false; } }
        if let Some(region) = self.region.as_deref() { if r.region != region { return false; } }
        true
    }
}

pub fn filter<'a>(recipes: &'a [Recipe], f: &Filter) -> Vec<&'a Recipe> {
    recipes.iter().filter(|r| f.matches(r)).collect()
}

/// Regions in first-seen order, for building filter chips.
pub fn distinct_regions(recipes: &[Recipe]) -> Vec<&str> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    recipes.iter().map(|r| r.region.as_str()).filter(|r| seen.insert(*r)).collect()
}
