use crate::cli::ServeArgs;
use crate::infra::{build_service, AppService, AppState};
use crate::routes::with_triage_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_triage::config::AppConfig;
use job_triage::error::AppError;
use job_triage::telemetry;
use job_triage::workflows::triage::RefreshOutcome;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = build_service(&config)?;
    tokio::spawn(refresh_loop(service.clone(), config.triage.refresh_interval));

    let app = with_triage_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job triage service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Refreshes immediately, then once per `period`.
async fn refresh_loop(service: Arc<AppService>, period: Duration) {
    let mut ticker = tokio::time::interval(period.max(Duration::from_secs(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        match service.refresh().await {
            Ok(RefreshOutcome::Applied { epoch, summary }) => {
                debug!(epoch, new = summary.counts.new, "scheduled refresh applied");
            }
            Ok(outcome) => debug!(?outcome, "scheduled refresh not applied"),
            Err(err) => warn!(error = %err, "scheduled refresh failed"),
        }
    }
}
