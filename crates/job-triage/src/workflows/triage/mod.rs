//! Classification and state management for fetched job postings.
//!
//! Postings arrive from a [`PostingSource`](crate::workflows::search::PostingSource),
//! are partitioned into the `new`, `saved`, `applied` and `archived` buckets by the
//! persisted identifier sets, and are served to the presentation layer through a
//! [`JobBoard`].

mod board;
pub mod domain;
mod maintenance;
mod partition;
mod relevance;
pub mod router;
pub mod service;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use board::{BoardError, BoardObserver, BoardSummary, JobBoard};
pub use domain::{Category, DisplayName, Posting, UnknownCategory};
pub use maintenance::{purge_unused, PurgeAdvice, PurgeAdvisor, DEFAULT_PURGE_THRESHOLD};
pub use partition::{partition, BucketCounts, Buckets};
pub use relevance::{RelevanceClassifier, DEFAULT_RELEVANCE_KEYWORDS};
pub use router::triage_router;
pub use service::{RefreshCoordinator, RefreshError, RefreshOutcome, RefreshTicket, TriageService};
pub use store::{
    FileKeyValueStore, IdentifierSets, IdentifierStore, KeyValueStore, MemoryKeyValueStore,
    StoreError, DEFAULT_STORAGE_KEY,
};
pub use views::{ActionView, BoardView, PostingView};
