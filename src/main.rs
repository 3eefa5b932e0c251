mod app;
mod auth;
mod config;
mod db;
mod errors;
mod inference;
mod research;
mod state;
mod storage;
mod symptoms;
mod wellness;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "healthease=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    match app_state.db.pool() {
        Ok(pool) => {
            if let Err(e) = sqlx::migrate!("./migrations").run(pool).await {
                tracing::warn!(error = %e, "migration failed; continuing");
            }
        }
        Err(_) => tracing::warn!("starting without a database; history and wellness are disabled"),
    }

    app::serve(app::build_app(app_state)).await
}
