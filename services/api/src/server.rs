use crate::cli::ServeArgs;
use crate::infra::{AppState, ChannelNotifier, InMemoryPlacementRepository};
use crate::routes::with_placement_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use campus_placement::config::AppConfig;
use campus_placement::error::AppError;
use campus_placement::telemetry;
use campus_placement::workflows::placement::PlacementService;
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

    let repository = Arc::new(InMemoryPlacementRepository::seeded());
    let (notifier, _mail_worker) = ChannelNotifier::spawn(config.mail.from_address.clone());
    let placement_service = Arc::new(PlacementService::new(
        repository,
        Arc::new(notifier),
        config.placement,
    ));

    let policy = *placement_service.policy();
    let app = with_placement_routes(placement_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        threshold = policy.notification_threshold,
        status_policy = policy.transition_policy.label(),
        "campus placement portal ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
