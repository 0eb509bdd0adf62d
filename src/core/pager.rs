use crate::models::Estate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Columns every listing path sorts by, ascending, in this order
pub const LISTING_ORDER: [&str; 4] = ["year", "month", "day", "time"];

/// Compare two listings by date, then time of day
///
/// Listings without a time sort after those with one, as `NULL` does under
/// an ascending `ORDER BY` in Postgres.
pub fn listing_order(a: &Estate, b: &Estate) -> Ordering {
    a.year
        .cmp(&b.year)
        .then(a.month.cmp(&b.month))
        .then(a.day.cmp(&b.day))
        .then_with(|| match (a.time, b.time) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Offset/limit window into an ordered result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

/// One window of results plus the size of the full match set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            limit: request.limit,
            offset: request.offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Applies the listing order and a page window
#[derive(Debug, Clone, Copy)]
pub struct ResultPager {
    default_limit: usize,
    max_limit: usize,
}

impl ResultPager {
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        Self {
            default_limit: default_limit.min(max_limit),
            max_limit,
        }
    }

    /// Resolve client paging parameters, capping the limit
    pub fn page_request(&self, limit: Option<usize>, offset: Option<usize>) -> PageRequest {
        PageRequest {
            limit: limit.unwrap_or(self.default_limit).min(self.max_limit),
            offset: offset.unwrap_or(0),
        }
    }

    /// Sort `candidates` by [`listing_order`] and cut out one page
    ///
    /// The sort is stable, so listings that tie on every key keep their
    /// input order. An offset past the end gives an empty page.
    pub fn paginate(&self, mut candidates: Vec<Estate>, request: PageRequest) -> Page<Estate> {
        let total = candidates.len();
        candidates.sort_by(listing_order);

        let items = candidates
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .collect();

        Page {
            items,
            total,
            limit: request.limit,
            offset: request.offset,
        }
    }
}

impl Default for ResultPager {
    fn default() -> Self {
        Self::new(50, 100)
    }
}
