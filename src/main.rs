//! # minihttp - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor HTTP/1.1.

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use minihttp::app::build_router;
use minihttp::config::Config;
use minihttp::server::Server;

fn main() {
    let config = Config::new();

    // RUST_LOG tiene prioridad sobre --log-level
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(fmt::layer())
        .init();

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        std::process::exit(1);
    }
    config.log_summary();

    let root = match config.served_directory() {
        Ok(root) => root,
        Err(e) => {
            error!(directory = %config.directory.display(), error = %e, "cannot resolve directory");
            std::process::exit(1);
        }
    };

    let router = match build_router(&root, config.gzip_enabled()) {
        Ok(router) => router,
        Err(e) => {
            error!(error = %e, "failed to build routes");
            std::process::exit(1);
        }
    };
    info!(routes = router.len(), directory = %root.display(), "routes ready");

    let server = Server::new(config, router);

    // Bloquea el thread principal
    if let Err(e) = server.run() {
        error!(error = %e, "fatal server error");
        std::process::exit(1);
    }
}
