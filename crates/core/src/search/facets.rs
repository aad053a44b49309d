//! Facet counts for the storefront filter sidebar.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{Product, ProductCondition};
use crate::text::tokenize;
use crate::types::Price;

use super::score::SearchDocument;

/// One facet value and how many products carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

/// Counts over the products matching the free-text query.
///
/// Structured filters are not applied: the sidebar lists every option the
/// query leaves reachable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub total: usize,
    /// Sorted by tag.
    pub categories: Vec<FacetCount>,
    /// Sorted by tag.
    pub brands: Vec<FacetCount>,
    /// Best condition first; zero counts omitted.
    pub conditions: Vec<FacetCount>,
    pub in_stock: usize,
    pub discounted: usize,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
}

impl Facets {
    /// Compute facets for `products` narrowed by `query`.
    #[must_use]
    pub fn compute(products: &[Product], query: Option<&str>) -> Self {
        let tokens = query.map(tokenize).unwrap_or_default();

        let mut facets = Self::default();
        let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
        let mut brands: BTreeMap<&str, usize> = BTreeMap::new();
        let mut conditions: BTreeMap<ProductCondition, usize> = BTreeMap::new();

        let matching = products
            .iter()
            .filter(|p| tokens.is_empty() || SearchDocument::new(p).score(&tokens).is_some());

        for product in matching {
            facets.total += 1;
            *categories.entry(product.category_tag()).or_default() += 1;
            *brands.entry(product.brand_tag()).or_default() += 1;
            *conditions.entry(product.condition_kind()).or_default() += 1;
            if product.in_stock() {
                facets.in_stock += 1;
            }
            if product.has_discount() {
                facets.discounted += 1;
            }
            facets.min_price = Some(facets.min_price.map_or(product.price, |p| p.min(product.price)));
            facets.max_price = Some(facets.max_price.map_or(product.price, |p| p.max(product.price)));
        }

        facets.categories = into_counts(categories.into_iter().map(|(k, v)| (k.to_owned(), v)));
        facets.brands = into_counts(brands.into_iter().map(|(k, v)| (k.to_owned(), v)));
        facets.conditions = into_counts(conditions.into_iter().map(|(k, v)| (k.tag().to_owned(), v)));
        facets
    }
}

fn into_counts(entries: impl Iterator<Item = (String, usize)>) -> Vec<FacetCount> {
    entries
        .map(|(value, count)| FacetCount { value, count })
        .collect()
}
