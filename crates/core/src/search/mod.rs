//! Catalog search: filter, score, sort and paginate.
//!
//! The pipeline is a pure function of the product list and the request:
//!
//! 1. Every product is checked against the [`FilterState`] predicates
//!    (taxonomy tags, condition, price range, discount, stock).
//! 2. The free-text query is tokenized and every survivor is scored; a
//!    product must score on every token to stay (see [`score`]).
//! 3. Survivors are stable-sorted by the requested [`SortKey`].
//! 4. The result is cut into a [`Page`], clamping out-of-range pages.

pub mod facets;
pub mod score;

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, ProductCondition};
use crate::text::{fold, tokenize};
use crate::types::{ParseEnumError, Price};

pub use facets::{FacetCount, Facets};
pub use score::{SearchDocument, score_product};

/// Inclusive price bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub min: Option<Price>,
    #[serde(default)]
    pub max: Option<Price>,
}

impl PriceRange {
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Active catalog filters. The default constrains nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Category tags; empty means any.
    pub categories: Vec<String>,
    /// Brand tags; empty means any.
    pub brands: Vec<String>,
    /// Conditions; empty means any.
    pub conditions: Vec<ProductCondition>,
    pub price: PriceRange,
    /// Only products selling below their original price.
    pub discount_only: bool,
    /// Only products with stock.
    pub in_stock: bool,
    /// Free-text query.
    pub query: Option<String>,
}

impl FilterState {
    /// Query tokens, empty when there is no query or it's all whitespace.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.query.as_deref().map(tokenize).unwrap_or_default()
    }

    /// Check the structured (non-text) predicates.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let in_set = |set: &[String], tag: &str| set.is_empty() || set.iter().any(|s| s == tag);

        in_set(&self.categories, product.category_tag())
            && in_set(&self.brands, product.brand_tag())
            && (self.conditions.is_empty() || self.conditions.contains(&product.condition_kind()))
            && self.price.contains(product.price)
            && (!self.discount_only || product.has_discount())
            && (!self.in_stock || product.in_stock())
    }

    /// True when no filter and no query is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.brands.is_empty()
            && self.conditions.is_empty()
            && self.price.is_open()
            && !self.discount_only
            && !self.in_stock
            && self.tokens().is_empty()
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Score descending; catalog order when there is no query.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    /// Largest discount fraction first.
    DiscountDesc,
    /// New, like-new, excellent-used, good-used, then everything else.
    ConditionBest,
}

impl SortKey {
    pub const ALL: [Self; 7] = [
        Self::Relevance,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::NameAsc,
        Self::NameDesc,
        Self::DiscountDesc,
        Self::ConditionBest,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::DiscountDesc => "discount-desc",
            Self::ConditionBest => "condition-best",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("sort key", s))
    }
}

/// Largest page size a caller may ask for.
pub const MAX_PAGE_SIZE: usize = 100;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    /// Build a request, forcing `size` into `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 12)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// The page actually returned, after clamping.
    pub page: usize,
    pub page_size: usize,
    /// Matches across all pages.
    pub total: usize,
    /// Always at least 1, even for an empty result.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cut `items` into the requested page, clamping the page number to
    /// `[1, max(1, ceil(total / size))]`.
    #[must_use]
    pub fn paginate(items: Vec<T>, request: PageRequest) -> Self {
        let size = request.size.max(1);
        let total = items.len();
        let total_pages = total.div_ceil(size).max(1);
        let page = request.page.clamp(1, total_pages);
        let start = (page - 1) * size;

        Self {
            items: items.into_iter().skip(start).take(size).collect(),
            page,
            page_size: size,
            total,
            total_pages,
        }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Map the items, keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// A product that survived filtering, with its query score.
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
    pub product: &'a Product,
    pub score: u32,
}

/// Apply filters and the text query, keeping catalog order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], filter: &FilterState) -> Vec<Scored<'a>> {
    let tokens = filter.tokens();

    products
        .iter()
        .filter(|product| filter.matches(product))
        .filter_map(|product| {
            if tokens.is_empty() {
                return Some(Scored { product, score: 0 });
            }
            SearchDocument::new(product)
                .score(&tokens)
                .map(|score| Scored { product, score })
        })
        .collect()
}

/// Stable-sort scored products in place.
pub fn sort_products(results: &mut [Scored<'_>], key: SortKey) {
    match key {
        SortKey::Relevance => results.sort_by(|a, b| b.score.cmp(&a.score)),
        SortKey::PriceAsc => results.sort_by(|a, b| a.product.price.cmp(&b.product.price)),
        SortKey::PriceDesc => results.sort_by(|a, b| b.product.price.cmp(&a.product.price)),
        SortKey::NameAsc => results.sort_by(|a, b| compare_names(a.product, b.product)),
        SortKey::NameDesc => results.sort_by(|a, b| compare_names(b.product, a.product)),
        SortKey::DiscountDesc => results.sort_by(|a, b| {
            b.product
                .discount_fraction()
                .cmp(&a.product.discount_fraction())
        }),
        SortKey::ConditionBest => results.sort_by_key(|s| s.product.condition_kind().rank()),
    }
}

/// Accent- and case-insensitive name order, falling back to the raw names.
fn compare_names(a: &Product, b: &Product) -> Ordering {
    fold(&a.name)
        .cmp(&fold(&b.name))
        .then_with(|| a.name.cmp(&b.name))
}

/// Run the full pipeline over a product list.
#[must_use]
pub fn search<'a>(
    products: &'a [Product],
    filter: &FilterState,
    sort: SortKey,
    page: PageRequest,
) -> Page<&'a Product> {
    let mut results = filter_products(products, filter);
    sort_products(&mut results, sort);
    Page::paginate(results, page).map(|scored| scored.product)
}
