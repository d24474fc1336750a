//! campus-eval server binary.
//!
//! Wiring: config → tracing → pool → migrations → background jobs → HTTP.

use std::sync::Arc;
use std::time::Duration;

use http::{HeaderValue, Method};
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use campus_eval::adapters::auth::{JwtSessionValidator, JwtValidatorConfig};
use campus_eval::adapters::http::{app_router, EvaluationAppState};
use campus_eval::adapters::{
    PeriodicJob, PostgresEvaluationStore, PostgresMessageSink, PostgresStudentDirectory, Schedule,
};
use campus_eval::application::handlers::evaluation::{
    BatchApproveHandler, OpenPublicityHandler, PublicityWindowWatcher, PublishEvaluationHandler,
    StatusLifecycleEngine,
};
use campus_eval::config::{AppConfig, ServerConfig};
use campus_eval::ports::{
    EvaluationRecordStore, IdentityResolver, NotificationSink, SessionValidator, StudentDirectory,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            tracing::error!("Database connection failed: {e}");
            e
        })?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    // Ports
    let store: Arc<dyn EvaluationRecordStore> = Arc::new(PostgresEvaluationStore::new(pool.clone()));
    let sink: Arc<dyn NotificationSink> = Arc::new(PostgresMessageSink::new(pool.clone()));
    let directory = Arc::new(PostgresStudentDirectory::new(pool.clone()));
    let resolver: Arc<dyn IdentityResolver> = directory.clone();
    let roster: Arc<dyn StudentDirectory> = directory;
    let validator: Arc<dyn SessionValidator> = Arc::new(JwtSessionValidator::new(
        &JwtValidatorConfig::new(config.auth.jwt_secret.clone(), config.auth.issuer.clone())
            .with_leeway(config.auth.leeway_secs),
    ));

    // Application
    let engine = Arc::new(StatusLifecycleEngine::new(store.clone()));
    let watcher = Arc::new(PublicityWindowWatcher::new(store.clone(), resolver, sink.clone()));
    let state = EvaluationAppState {
        engine: engine.clone(),
        watcher: watcher.clone(),
        batch_approve: Arc::new(BatchApproveHandler::new(store.clone())),
        open_publicity: Arc::new(OpenPublicityHandler::new(store.clone(), roster.clone(), sink)),
        publish: Arc::new(PublishEvaluationHandler::new(store, roster)),
    };

    // Background jobs
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut jobs = Vec::new();
    if config.scheduler.enabled {
        let review = Schedule::daily_at(config.scheduler.review_run_hour, config.scheduler.review_run_minute);
        let publicity = Schedule::Every(config.scheduler.publicity_interval());
        jobs.push(PeriodicJob::new(engine, review).spawn(shutdown_rx.clone()));
        jobs.push(PeriodicJob::new(watcher, publicity).spawn(shutdown_rx));
    } else {
        tracing::warn!("Background jobs disabled; lifecycle runs only on manual trigger");
    }

    // HTTP
    let app = app_router(state, validator)
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("campus-eval listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight jobs finish
    let _ = shutdown_tx.send(true);
    for job in jobs {
        if let Err(e) = job.await {
            tracing::error!("Background job ended abnormally: {e}");
        }
    }
    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    tracing::info!("Shutdown signal received");
}
