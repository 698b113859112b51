use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use super::board::{BoardError, BoardSummary, JobBoard};
use super::domain::{Category, Posting};
use super::maintenance::PurgeAdvice;
use super::store::KeyValueStore;
use super::views::BoardView;
use crate::workflows::search::{FetchError, PostingSource, SearchQuery};

/// Sequences fetch cycles: at most one refresh is in flight, and each one is
/// numbered with a monotonically increasing epoch.
///
/// Holding the slot across both the fetch and the ingest means results are
/// always applied in epoch order; an overlapping request is skipped rather
/// than queued.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    in_flight: AtomicBool,
    issued: AtomicU64,
}

impl RefreshCoordinator {
    /// Claims the in-flight slot, or `None` when a refresh is already running.
    pub fn begin(&self) -> Option<RefreshTicket<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }

        let epoch = self.issued.fetch_add(1, Ordering::AcqRel) + 1;
        Some(RefreshTicket {
            coordinator: self,
            epoch,
        })
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Epoch of the most recently started refresh; 0 before the first.
    pub fn latest_epoch(&self) -> u64 {
        self.issued.load(Ordering::Acquire)
    }
}

/// Held for the duration of one fetch; releases the in-flight slot on drop.
#[derive(Debug)]
pub struct RefreshTicket<'a> {
    coordinator: &'a RefreshCoordinator,
    epoch: u64,
}

impl RefreshTicket<'_> {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for RefreshTicket<'_> {
    fn drop(&mut self) {
        self.coordinator.in_flight.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    Applied { epoch: u64, summary: BoardSummary },
    Skipped,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Thread-safe front for a [`JobBoard`] fed by a [`PostingSource`].
///
/// Each board operation runs to completion under one lock; fetching happens
/// outside it.
pub struct TriageService<S, P> {
    board: Mutex<JobBoard<S>>,
    source: Arc<P>,
    query: SearchQuery,
    coordinator: RefreshCoordinator,
}

impl<S, P> TriageService<S, P>
where
    S: KeyValueStore + 'static,
    P: PostingSource + 'static,
{
    pub fn new(board: JobBoard<S>, source: Arc<P>, query: SearchQuery) -> Self {
        Self {
            board: Mutex::new(board),
            source,
            query,
            coordinator: RefreshCoordinator::default(),
        }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Fetches the latest postings and ingests them, switching back to the
    /// `new` category.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let Some(ticket) = self.coordinator.begin() else {
            warn!("refresh already in flight; skipping");
            return Ok(RefreshOutcome::Skipped);
        };
        let epoch = ticket.epoch();

        let postings = self.source.fetch(&self.query).await?;

        let mut board = self.lock();
        board.ingest(postings)?;
        let summary = board.select_category(Category::New);
        drop(board);
        drop(ticket);

        if summary.counts.new > 0 {
            let plural = if summary.counts.new > 1 { "s" } else { "" };
            info!(
                new = summary.counts.new,
                "There are {} new job{} available.", summary.counts.new, plural
            );
        }
        Ok(RefreshOutcome::Applied { epoch, summary })
    }

    pub fn ingest(&self, postings: Vec<Posting>) -> Result<BoardSummary, BoardError> {
        self.lock().ingest(postings)
    }

    pub fn select_category(&self, category: Category) -> BoardSummary {
        self.lock().select_category(category)
    }

    pub fn move_identifier(&self, target: Category, id: &str) -> Result<BoardSummary, BoardError> {
        self.lock().move_identifier(target, id)
    }

    /// Purges against the postings of the last successful fetch. Fails with
    /// [`BoardError::NoLiveSnapshot`] until one has been ingested.
    pub fn purge_unused(&self) -> Result<BoardSummary, BoardError> {
        let mut board = self.lock();
        let live = board.postings().to_vec();
        board.purge_unused(&live)
    }

    pub fn category_of(&self, id: &str) -> Category {
        self.lock().identifier_sets().category_of(id)
    }

    pub fn summary(&self) -> BoardSummary {
        self.lock().summary()
    }

    pub fn purge_advice(&self) -> PurgeAdvice {
        self.lock().purge_advice()
    }

    /// View of `category`, or of the active category when `None`.
    pub fn view(&self, category: Option<Category>) -> BoardView {
        let board = self.lock();
        let category = category.unwrap_or(board.category());
        BoardView::from_board(&*board, category)
    }

    fn lock(&self) -> MutexGuard<'_, JobBoard<S>> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
