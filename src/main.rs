use std::sync::Arc;

use accounts::{app, config::AppConfig, db, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("accounts=debug,axum=info,tower_http=info");

    let config = Arc::new(AppConfig::from_env()?);
    let pool = db::connect(&config).await?;
    db::migrate(&pool).await;

    let addr = config.bind_addr();
    let app = app::build_app(AppState::new(pool.clone(), config));
    app::serve(app, &addr).await?;

    pool.close().await;
    tracing::info!("database pool closed");
    Ok(())
}
