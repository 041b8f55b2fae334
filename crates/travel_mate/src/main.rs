mod api;
mod config;
mod database;
mod generator;
mod http;
mod openrouter;
mod utils;
mod weather;

use anyhow::Result;
use axum::extract::Extension;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::ConfigManager;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let connection = database::setup_database().await;
    let manager = ConfigManager::new(connection.clone());
    manager.ensure_tables_exist().await?;
    let config = manager.load_config().await?;

    let app = api::handler::router()
        .layer(Extension(connection))
        .layer(Extension(manager))
        .layer(CorsLayer::permissive());

    info!("travel-mate 启动完成，监听 {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("收到退出信号，正在关闭...");
        })
        .await?;

    Ok(())
}

fn init_logger() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,travel_mate=debug")),
        )
        .init();
}
