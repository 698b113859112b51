use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::workflows::search::{FetchError, PostingSource, SearchQuery};
use crate::workflows::triage::board::{BoardObserver, BoardSummary, JobBoard};
use crate::workflows::triage::domain::Posting;
use crate::workflows::triage::maintenance::PurgeAdvisor;
use crate::workflows::triage::relevance::RelevanceClassifier;
use crate::workflows::triage::service::TriageService;
use crate::workflows::triage::store::{
    IdentifierStore, KeyValueStore, MemoryKeyValueStore, StoreError, DEFAULT_STORAGE_KEY,
};

pub(super) fn posting(id: &str, title: &str, created: &str) -> Posting {
    Posting {
        id: id.to_string(),
        title: title.to_string(),
        redirect_url: format!("https://jobs.example.test/{id}"),
        company: "Acme Ltd".into(),
        location: "London".into(),
        description: format!("{title} wanted"),
        created: Some(created.to_string()),
        contract_type: None,
    }
}

/// The two-posting fixture: a relevant older role and an irrelevant newer one.
pub(super) fn frontend_and_backend() -> Vec<Posting> {
    vec![
        posting("a", "Frontend Engineer", "2024-01-02"),
        posting("b", "Backend Engineer", "2024-01-03"),
    ]
}

pub(super) fn ids(postings: &[Posting]) -> Vec<&str> {
    postings.iter().map(|posting| posting.id.as_str()).collect()
}

pub(super) fn board_with(backend: Arc<MemoryKeyValueStore>) -> JobBoard<MemoryKeyValueStore> {
    JobBoard::open(
        IdentifierStore::new(backend, DEFAULT_STORAGE_KEY),
        RelevanceClassifier::default(),
        PurgeAdvisor::default(),
    )
}

pub(super) fn build_board() -> (JobBoard<MemoryKeyValueStore>, Arc<MemoryKeyValueStore>) {
    let backend = Arc::new(MemoryKeyValueStore::default());
    (board_with(backend.clone()), backend)
}

pub(super) fn persisted(backend: &MemoryKeyValueStore) -> Option<String> {
    backend.raw(DEFAULT_STORAGE_KEY)
}

/// Store whose writes can be switched off to exercise failure paths.
#[derive(Default)]
pub(super) struct FlakyStore {
    inner: MemoryKeyValueStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub(super) fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk detached".to_string()));
        }
        self.inner.set(key, value)
    }
}

#[derive(Default)]
pub(super) struct RecordingObserver {
    seen: Arc<Mutex<Vec<BoardSummary>>>,
}

impl RecordingObserver {
    pub(super) fn handle(&self) -> Arc<Mutex<Vec<BoardSummary>>> {
        self.seen.clone()
    }
}

impl BoardObserver for RecordingObserver {
    fn board_changed(&self, summary: &BoardSummary) {
        self.seen.lock().expect("observer mutex").push(*summary);
    }
}

/// Source replaying queued responses in order.
#[derive(Default)]
pub(super) struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<Posting>, FetchError>>>,
}

impl ScriptedSource {
    pub(super) fn new(responses: Vec<Result<Vec<Posting>, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

impl PostingSource for ScriptedSource {
    async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<Posting>, FetchError> {
        self.responses
            .lock()
            .expect("source mutex")
            .pop_front()
            .unwrap_or_else(|| Err(gateway_timeout()))
    }
}

pub(super) fn build_service(
    responses: Vec<Result<Vec<Posting>, FetchError>>,
) -> (
    Arc<TriageService<MemoryKeyValueStore, ScriptedSource>>,
    Arc<MemoryKeyValueStore>,
) {
    let backend = Arc::new(MemoryKeyValueStore::default());
    (service_with(backend.clone(), responses), backend)
}

/// Service over an existing backend, e.g. one seeded with persisted sets.
pub(super) fn service_with(
    backend: Arc<MemoryKeyValueStore>,
    responses: Vec<Result<Vec<Posting>, FetchError>>,
) -> Arc<TriageService<MemoryKeyValueStore, ScriptedSource>> {
    Arc::new(TriageService::new(
        board_with(backend),
        Arc::new(ScriptedSource::new(responses)),
        SearchQuery::default(),
    ))
}

/// A fetch failure as the search client reports a non-success status.
pub(super) fn gateway_timeout() -> FetchError {
    FetchError::Status(reqwest::StatusCode::GATEWAY_TIMEOUT)
}
