use crate::cli::ServeArgs;
use crate::infra::{AppState, LoggingChannel};
use crate::routes::with_sweep_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use wadp_compliance::config::AppConfig;
use wadp_compliance::error::AppError;
use wadp_compliance::telemetry;
use wadp_compliance::workflows::compliance::{
    ComplianceSweepService, LuaFileStore, SweepConfig,
};

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

    let store = Arc::new(LuaFileStore::new(config.sweep.data_dir.clone()));
    let channel = Arc::new(LoggingChannel);
    let sweep_service = Arc::new(ComplianceSweepService::new(
        store,
        channel,
        SweepConfig::default(),
        config.sweep.clone(),
    ));

    let app = with_sweep_routes(sweep_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "compliance sweep service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
