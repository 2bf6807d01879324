use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use simposio::{config, db, notify, routes, state, storage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simposio=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    let files = storage::FileStore::new(&config.upload_folder);
    files.ensure_root()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(pool.as_ref()).await?;

    let state = state::AppState {
        pool,
        config: config.clone(),
        files,
        notifier: Arc::new(notify::LogNotifier),
    };

    let app = Router::new()
        .route("/submissions", post(routes::create_submission))
        .route("/submissions/:id", put(routes::update_submission))
        .route("/api/submissions/:id", get(routes::get_submission_detail))
        .route("/api/users/:user_id/submissions", get(routes::list_user_submissions))
        .route("/api/reviewers/:reviewer_id/assignments", get(routes::list_assignments))
        .route("/api/reviews/:id", put(routes::submit_review))
        .route("/api/admin/submissions", get(routes::list_submissions))
        .route("/api/admin/submissions/export", get(routes::export_submissions))
        .route("/api/admin/submissions/bulk-status", post(routes::bulk_update_submission_status))
        .route("/api/admin/submissions/:id/status", put(routes::update_submission_status))
        .route("/api/admin/submissions/:id/reviewers", post(routes::assign_reviewers))
        .route(
            "/api/admin/submissions/:id/reviewers/:reviewer_id",
            delete(routes::remove_reviewer),
        )
        .route("/api/admin/submissions/:id", delete(routes::delete_submission))
        .route("/api/admin/reviewers", get(routes::list_reviewers))
        .route("/api/admin/stats", get(routes::stats))
        .route("/api/admin/payments/:id/verify", post(routes::verify_payment))
        .route("/api/admin/payments/:id/reject", post(routes::reject_payment))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Simposio listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
