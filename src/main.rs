//! Ghost Factory dashboard server binary

use gf_dashboard_lib::config::ServerConfig;
use gf_dashboard_lib::server::DashboardServer;
use log::{error, info};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    let mut server = DashboardServer::new(config);
    if let Err(e) = server.start().await {
        error!("failed to start dashboard server: {}", e);
        std::process::exit(1);
    }
    info!("dashboard server listening on port {}", server.port());

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c, shutting down"),
        Err(e) => error!("failed to listen for shutdown signal: {}", e),
    }
    server.stop();
}
