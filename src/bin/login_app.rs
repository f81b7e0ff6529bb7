use accounts::{app, config::LoginAppConfig, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("login_app=debug,accounts=debug,tower_http=info");

    let config = LoginAppConfig::from_env()?;
    tracing::info!(users = config.credentials.len(), "credential table loaded");

    let app = app::build_login_app(&config)?;
    app::serve(app, &config.bind_addr()).await
}
