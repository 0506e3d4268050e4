//! Prepare a database for first use: run migrations, ensure the fixed role
//! set, and create the site-info row. Safe to run repeatedly.

use minglog::state::AppState;
use minglog::{accounts, site};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "minglog=debug,sqlx=warn".to_string());
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

    let state = AppState::init().await?;

    sqlx::migrate!("./migrations").run(&state.db).await?;

    accounts::repo::seed_roles(&state.db).await?;
    let info = site::repo::ensure_default(&state.db).await?;

    tracing::info!(title = %info.title, "seed complete");
    Ok(())
}
