use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use anyhow::Context;
use dotenv::dotenv;
use log::info;
use std::sync::Arc;

use secrets_console::handlers::console;
use secrets_console::services::scanner_api::HttpScannerClient;
use secrets_console::{AppConfig, ScannerApp};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr();

    let client = HttpScannerClient::new(config.api.clone())
        .context("Failed to create scanner API client")?;
    info!("Using analysis service at {}", client.base_url());

    let app_state = web::Data::new(ScannerApp::new(config, Arc::new(client)));
    // runs for the life of the process
    let _health = app_state.start();

    info!("Starting console on {}", bind_addr);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(console::configure)
    })
    .workers(1)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
