use std::process::ExitCode;

use tracing::{error, info};

use kurch::{Config, Database, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
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

    if let Err(e) = kurch::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        kurch::logging::init_console_only(&config.logging.level);
    }

    info!("KURCH - Kathmandu University research showcase");

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let db = match Database::open(&config.database.path, config.database.max_connections).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            return ExitCode::FAILURE;
        }
    };

    let server = match WebServer::new(&config.server, &config.web, db) {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server stopped: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
