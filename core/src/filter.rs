//! Search and ordering over the flat recommendation list.

use crate::{format::parse_customer_name, model::Recommendation};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Revenue,
    Probability,
}

impl SortKey {
    /// `None` for anything unrecognised; callers then keep input order.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "revenue" => Some(Self::Revenue),
            "probability" => Some(Self::Probability),
            _ => None,
        }
    }

    fn value(&self, rec: &Recommendation) -> f64 {
        match self {
            Self::Revenue => rec.expected_revenue,
            Self::Probability => rec.acceptance_probability,
        }
    }
}

/// Case-insensitive match against display name, customer id or product code.
pub fn matches_query(rec: &Recommendation, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    let name = rec
        .customer_name
        .as_deref()
        .map(parse_customer_name)
        .unwrap_or_default();
    name.to_lowercase().contains(&query)
        || rec.customer_id.to_lowercase().contains(&query)
        || rec.product_code.to_lowercase().contains(&query)
}

/// Filter by `query`, then sort descending by `sort_key` (stable).
pub fn filter_sort<'a>(
    recommendations: &'a [Recommendation],
    query: &str,
    sort_key: Option<SortKey>,
) -> Vec<&'a Recommendation> {
    filter_sort_indices(recommendations, query, sort_key)
        .into_iter()
        .map(|i| &recommendations[i])
        .collect()
}

/// Same as [`filter_sort`], returning positions into `recommendations`.
pub fn filter_sort_indices(
    recommendations: &[Recommendation],
    query: &str,
    sort_key: Option<SortKey>,
) -> Vec<usize> {
    let mut out: Vec<usize> = recommendations
        .iter()
        .enumerate()
        .filter(|(_, rec)| matches_query(rec, query))
        .map(|(i, _)| i)
        .collect();
    if let Some(key) = sort_key {
        out.sort_by(|&a, &b| {
            key.value(&recommendations[b])
                .partial_cmp(&key.value(&recommendations[a]))
                .unwrap_or(Ordering::Equal)
        });
    }
    out
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Slice `items` into 1-based pages. Page 0 is treated as page 1; a page
/// past the end is empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total,
        total_pages,
    }
}
