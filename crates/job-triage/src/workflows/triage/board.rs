use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{Category, Posting};
use super::maintenance::{purge_unused, PurgeAdvice, PurgeAdvisor};
use super::partition::{partition, BucketCounts, Buckets};
use super::relevance::RelevanceClassifier;
use super::store::{IdentifierSets, IdentifierStore, KeyValueStore, StoreError};

/// Snapshot handed back from every mutation and to subscribed observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub category: Category,
    pub counts: BucketCounts,
    pub displayed: usize,
    pub purge_recommended: bool,
}

/// Receives a summary after the board changes.
pub trait BoardObserver: Send + Sync {
    fn board_changed(&self, summary: &BoardSummary);
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("failed to persist identifier sets: {0}")]
    Store(#[from] StoreError),
    #[error("no postings have been ingested yet; refusing to purge against an empty live set")]
    NoLiveSnapshot,
}

/// Owns the fetched postings, the persisted identifier sets, the derived
/// buckets and the active category.
///
/// Every mutator persists before touching memory: if the write fails the
/// board is left exactly as it was.
pub struct JobBoard<S> {
    store: IdentifierStore<S>,
    classifier: RelevanceClassifier,
    advisor: PurgeAdvisor,
    sets: IdentifierSets,
    postings: Vec<Posting>,
    ingested: bool,
    buckets: Buckets,
    category: Category,
    purge_recommended: bool,
    observers: Vec<Box<dyn BoardObserver>>,
}

impl<S> JobBoard<S>
where
    S: KeyValueStore,
{
    /// Loads the identifier sets from `store` and starts on the `new` category
    /// with no postings.
    pub fn open(
        store: IdentifierStore<S>,
        classifier: RelevanceClassifier,
        advisor: PurgeAdvisor,
    ) -> Self {
        let sets = store.load();
        debug!(key = store.key(), stored = sets.len(), "identifier sets loaded");

        Self {
            store,
            classifier,
            advisor,
            sets,
            postings: Vec::new(),
            ingested: false,
            buckets: Buckets::default(),
            category: Category::New,
            purge_recommended: false,
            observers: Vec::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// The bucket matching the active category.
    pub fn display(&self) -> &[Posting] {
        self.buckets.bucket(self.category)
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    /// Whether any posting list has been ingested since the board opened.
    pub fn has_live_snapshot(&self) -> bool {
        self.ingested
    }

    pub fn identifier_sets(&self) -> &IdentifierSets {
        &self.sets
    }

    pub fn classifier(&self) -> &RelevanceClassifier {
        &self.classifier
    }

    pub fn purge_recommended(&self) -> bool {
        self.purge_recommended
    }

    pub fn purge_advice(&self) -> PurgeAdvice {
        let mut advice = self.advisor.assess(&self.sets, &self.postings);
        advice.purge_recommended = self.purge_recommended;
        advice
    }

    pub fn summary(&self) -> BoardSummary {
        BoardSummary {
            category: self.category,
            counts: self.buckets.counts(),
            displayed: self.display().len(),
            purge_recommended: self.purge_recommended,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn BoardObserver>) {
        self.observers.push(observer);
    }

    pub fn select_category(&mut self, category: Category) -> BoardSummary {
        self.category = category;
        debug!(%category, displayed = self.display().len(), "category selected");
        self.notify()
    }

    /// Replaces the posting list, re-derives every bucket and re-evaluates
    /// the purge signal.
    pub fn ingest(&mut self, postings: Vec<Posting>) -> Result<BoardSummary, BoardError> {
        self.store.save(&self.sets)?;
        self.postings = postings;
        self.ingested = true;
        self.rebuild();

        let summary = self.notify();
        info!(
            postings = self.postings.len(),
            new = summary.counts.new,
            purge_recommended = summary.purge_recommended,
            "postings ingested"
        );
        Ok(summary)
    }

    /// Moves `id` to `target`. Moving an identifier to the category it is
    /// already classified under returns it to `new` instead.
    pub fn move_identifier(
        &mut self,
        target: Category,
        id: &str,
    ) -> Result<BoardSummary, BoardError> {
        let current = self.sets.category_of(id);
        let destination = if current == target {
            Category::New
        } else {
            target
        };

        let next = self.sets.moved(destination, id);
        self.store.save(&next)?;
        self.sets = next;
        self.rebuild();

        debug!(id, from = %current, to = %destination, "identifier moved");
        Ok(self.notify())
    }

    /// Forgets every classification whose posting is not in `live`.
    ///
    /// Refused until the first ingest, so an upstream outage at startup
    /// cannot wipe the persisted sets.
    pub fn purge_unused(&mut self, live: &[Posting]) -> Result<BoardSummary, BoardError> {
        if !self.ingested {
            warn!(stored = self.sets.len(), "purge requested before any postings were ingested");
            return Err(BoardError::NoLiveSnapshot);
        }
        let (next, dropped) = purge_unused(&self.sets, live);
        self.store.save(&next)?;
        self.sets = next;
        self.rebuild();
        self.purge_recommended = false;

        info!(dropped, remaining = self.sets.len(), "unused identifiers purged");
        Ok(self.notify())
    }

    fn rebuild(&mut self) {
        self.buckets = partition(&self.postings, &self.sets, &self.classifier);
        self.purge_recommended = self.ingested
            && self
                .advisor
                .should_offer_purge(self.sets.len(), self.postings.len());
    }

    fn notify(&self) -> BoardSummary {
        let summary = self.summary();
        for observer in &self.observers {
            observer.board_changed(&summary);
        }
        summary
    }
}
