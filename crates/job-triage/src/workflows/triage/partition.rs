use std::cmp::Reverse;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::domain::{Category, Posting};
use super::relevance::RelevanceClassifier;
use super::store::IdentifierSets;

/// The four derived posting lists. Always a pure function of the fetched
/// postings and the identifier sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Buckets {
    pub new: Vec<Posting>,
    pub saved: Vec<Posting>,
    pub applied: Vec<Posting>,
    pub archived: Vec<Posting>,
}

impl Buckets {
    pub fn bucket(&self, category: Category) -> &[Posting] {
        match category {
            Category::New => &self.new,
            Category::Saved => &self.saved,
            Category::Applied => &self.applied,
            Category::Archived => &self.archived,
        }
    }

    pub fn counts(&self) -> BucketCounts {
        BucketCounts {
            new: self.new.len(),
            saved: self.saved.len(),
            applied: self.applied.len(),
            archived: self.archived.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub new: usize,
    pub saved: usize,
    pub applied: usize,
    pub archived: usize,
}

impl BucketCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::New => self.new,
            Category::Saved => self.saved,
            Category::Applied => self.applied,
            Category::Archived => self.archived,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.saved + self.applied + self.archived
    }
}

/// Splits `postings` into disjoint buckets.
///
/// Classified buckets keep upstream order. The `new` bucket is stably sorted
/// with relevant titles first, then by creation time, most recent first.
pub fn partition(
    postings: &[Posting],
    sets: &IdentifierSets,
    classifier: &RelevanceClassifier,
) -> Buckets {
    let mut buckets = Buckets::default();

    for posting in postings {
        let bucket = match sets.category_of(&posting.id) {
            Category::New => &mut buckets.new,
            Category::Saved => &mut buckets.saved,
            Category::Applied => &mut buckets.applied,
            Category::Archived => &mut buckets.archived,
        };
        bucket.push(posting.clone());
    }

    buckets.new.sort_by_cached_key(|posting| {
        (
            Reverse(classifier.is_relevant(&posting.title)),
            Reverse(created_sort_key(posting.created.as_deref())),
        )
    });

    buckets
}

/// Milliseconds since the epoch, or 0 when the timestamp is missing or does
/// not parse.
pub(crate) fn created_sort_key(created: Option<&str>) -> i64 {
    created
        .and_then(parse_created)
        .map(|created| created.and_utc().timestamp_millis())
        .unwrap_or(0)
}

pub(crate) fn parse_created(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
