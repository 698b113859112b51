use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use job_triage::config::AppConfig;
use job_triage::error::AppError;
use job_triage::workflows::search::AdzunaClient;
use job_triage::workflows::triage::{
    BoardObserver, BoardSummary, Category, FileKeyValueStore, IdentifierStore, JobBoard,
    PurgeAdvisor, RelevanceClassifier, TriageService,
};
use tracing::{debug, info};

pub(crate) type AppService = TriageService<FileKeyValueStore, AdzunaClient>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Logs every board change and flags when a purge becomes worthwhile.
#[derive(Debug, Default)]
pub(crate) struct LoggingObserver;

impl BoardObserver for LoggingObserver {
    fn board_changed(&self, summary: &BoardSummary) {
        debug!(
            category = %summary.category,
            displayed = summary.displayed,
            new = summary.counts.new,
            saved = summary.counts.saved,
            applied = summary.counts.applied,
            archived = summary.counts.archived,
            "board changed"
        );
        if summary.purge_recommended {
            info!("stored identifiers far outnumber live postings; consider a purge");
        }
    }
}

/// Wires the file-backed board to the Adzuna client described by `config`.
pub(crate) fn build_service(config: &AppConfig) -> Result<Arc<AppService>, AppError> {
    let triage = &config.triage;
    let backend = Arc::new(FileKeyValueStore::new(&triage.data_dir));
    let store = IdentifierStore::new(backend, triage.storage_key.clone());

    let mut board = JobBoard::open(
        store,
        RelevanceClassifier::new(triage.relevance_keywords.iter().map(String::as_str)),
        PurgeAdvisor::new(triage.purge_threshold),
    );
    board.subscribe(Box::new(LoggingObserver));

    let client = AdzunaClient::from_config(&config.search)?;
    Ok(Arc::new(TriageService::new(
        board,
        Arc::new(client),
        config.search.query(),
    )))
}

pub(crate) fn parse_category(raw: &str) -> Result<Category, String> {
    raw.parse::<Category>().map_err(|err| err.to_string())
}
