//! Record ranking
//!
//! Records are ordered by `(has rating, rating, review count)`, all
//! descending. Rated records always precede unrated ones, and equal keys
//! keep the order in which the records were extracted.

use crate::extract::Record;
use crate::state::Catalog;
use std::cmp::Ordering;

/// Composite sort key derived from a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingKey {
    pub rating: Option<f64>,
    pub review_count: u64,
}

impl RankingKey {
    pub fn of(record: &Record) -> Self {
        Self {
            rating: record.rating(),
            review_count: record.review_count(),
        }
    }

    pub fn has_rating(&self) -> bool {
        self.rating.is_some()
    }

    /// Ascending comparison; callers reverse it for best-first order
    pub fn compare(&self, other: &Self) -> Ordering {
        self.has_rating()
            .cmp(&other.has_rating())
            .then_with(|| match (self.rating, other.rating) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => Ordering::Equal,
            })
            .then_with(|| self.review_count.cmp(&other.review_count))
    }
}

/// Sorts a catalog best-first
///
/// The sort is stable, so records with equal keys stay in extraction order.
pub fn rank(catalog: Catalog) -> Catalog {
    let mut records = catalog.into_records();
    records.sort_by(|a, b| RankingKey::of(b).compare(&RankingKey::of(a)));
    Catalog::from(records)
}
