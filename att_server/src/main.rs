//! Attendance platform HTTP server.
//!
//! Wires the core library's credential store, session manager,
//! registration coordinator, and auditor into an Axum router backed by
//! PostgreSQL.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use att_server::api::{self, gate::AccessGate};
use att_server::config::ServerConfig;
use att_server::logging;
use attendance::{
    ActivityAuditor, CredentialStore, Database, RegistrationCoordinator, SessionManager,
    db::{PgUserRepository, UserRepository},
};
use ctrlc::set_handler;
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run the attendance platform server

USAGE:
  att_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  PASSWORD_PEPPER          Password hashing pepper (required)
  (See .env file for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.value_from_str("--bind").ok(),
        database_url: pargs.value_from_str("--db-url").ok(),
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    info!("Starting attendance server at {}", config.bind);

    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    db.health_check()
        .await
        .map_err(|e| anyhow::anyhow!("Database health check failed: {}", e))?;
    info!("Database connected successfully");

    let pool = Arc::new(db.pool().clone());

    let sessions = Arc::new(SessionManager::new());
    let credentials = Arc::new(CredentialStore::new(config.security.password_pepper));
    let auditor = Arc::new(ActivityAuditor::new(pool.clone()));
    let registrar = Arc::new(RegistrationCoordinator::new(
        pool.clone(),
        credentials.clone(),
        auditor.clone(),
    ));
    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let gate = Arc::new(AccessGate::new(sessions.clone(), auditor.clone()));

    let state = api::AppState {
        sessions,
        credentials,
        registrar,
        auditor,
        users,
        gate,
        pool,
    };

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
