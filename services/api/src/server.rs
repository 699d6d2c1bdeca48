use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_atlas_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use county_atlas::atlas::AtlasSession;
use county_atlas::config::AppConfig;
use county_atlas::error::AppError;
use county_atlas::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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
    let session = Arc::new(AtlasSession::default());
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        session: session.clone(),
    };

    let data = config.data.clone();
    let loader = session.clone();
    tokio::spawn(async move {
        if let Err(err) = loader.load(&data).await {
            warn!(%err, "map stays unavailable until the datasets load");
        }
    });

    let app = with_atlas_routes(session)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "county atlas service listening");

    axum::serve(listener, app).await?;
    Ok(())
}
