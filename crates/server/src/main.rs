//! Quorum server entry point.

use std::sync::Arc;

use quorum_api::{middleware::AppState, router as api_router};
use quorum_common::Config;
use quorum_core::{
    AnswerService, CommentService, DiscussionService, HttpFingerprintResolver, IdentityService,
    PollService, SharedFingerprintResolver, VoteService,
};
use quorum_db::repositories::{
    AnswerRepository, CommentRepository, PollRepository, UserRepository, VoteRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quorum=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting quorum server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = quorum_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    quorum_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let answer_repo = AnswerRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));

    // Initialize services
    let resolver: SharedFingerprintResolver =
        Arc::new(HttpFingerprintResolver::new(&config.fingerprint));
    let identity_service = IdentityService::new(user_repo.clone(), resolver);
    let poll_service = PollService::new(poll_repo.clone());
    let answer_service =
        AnswerService::new(answer_repo.clone(), poll_repo.clone(), user_repo.clone());
    let comment_service = CommentService::new(
        comment_repo.clone(),
        answer_repo.clone(),
        poll_repo.clone(),
    );
    let discussion_service = DiscussionService::new(comment_repo.clone(), answer_repo, poll_repo);
    let vote_service = VoteService::new(vote_repo, comment_repo);

    // Create app state
    let state = AppState {
        poll_service,
        answer_service,
        comment_service,
        discussion_service,
        vote_service,
        identity_service,
    };

    // Build router
    let app = api_router()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
