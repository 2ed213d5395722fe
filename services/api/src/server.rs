use crate::cli::ServeArgs;
use crate::infra::{build_store, seed_demo_data, AppState};
use crate::routes::with_api_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use jobboard::config::AppConfig;
use jobboard::error::AppError;
use jobboard::jobs::JobService;
use jobboard::telemetry;
use jobboard::users::UserService;
use tracing::info;

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

    let store = Arc::new(build_store());
    let max_page_size = config.pagination.max_page_size;
    let jobs = Arc::new(JobService::new(store.clone(), max_page_size));
    let users = Arc::new(UserService::new(store, max_page_size));

    if args.seed_demo {
        seed_demo_data(&jobs, &users).await?;
        info!("seeded demo postings and accounts");
    }

    let app = with_api_routes(jobs, users)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board API ready");

    axum::serve(listener, app).await?;
    Ok(())
}
