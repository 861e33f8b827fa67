use std::sync::Arc;

use tracing::{error, info};

use massmail::{Config, Database, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = massmail::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        massmail::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    info!("massmail - mailing campaign manager");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, db) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create web server: {e}");
            std::process::exit(1);
        }
    };

    info!(
        "Server configured on {} (mail backend: {:?})",
        server.addr(),
        config.mail.backend
    );

    if let Err(e) = server.run().await {
        error!("Web server error: {e}");
        std::process::exit(1);
    }
}
