use crate::cli::ServeArgs;
use crate::demo;
use crate::infra::{AppState, Services};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use consigna::config::AppConfig;
use consigna::error::AppError;
use consigna::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
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

    let services = Services::in_memory(config.eligibility);
    if config.seed_demo {
        let seeded = demo::seed(&services, Local::now().date_naive())?;
        info!(employees = seeded.len(), "demo data seeded");
    }

    let app = router(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        minimum_months = config.eligibility.minimum_months,
        maximum_months = config.eligibility.maximum_months,
        "consigna api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
