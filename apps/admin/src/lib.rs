//! # Counterbook Admin Library
//!
//! Application layer of the Counterbook admin panel. A UI host (web view or
//! HTTP bridge) calls [`bootstrap`] once and then routes user actions to the
//! functions in [`commands`].
//!
//! ## Module Organization
//! ```text
//! counterbook_admin/
//! ├── lib.rs          ◄─── You are here (bootstrap, logging, paths)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── session.rs  ◄─── Signed-in user and tokens
//! │   ├── invoice.rs  ◄─── Open draft + debounced totals
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── session.rs  ◄─── Sign in/out
//! │   ├── item.rs     ◄─── Item master commands
//! │   ├── invoice.rs  ◄─── Counter-sale entry commands
//! │   ├── dashboard.rs◄─── Sales summary commands
//! │   └── config.rs   ◄─── Config retrieval
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use counterbook_db::{Database, DbConfig, DbError};
use state::{ConfigState, DbState, InvoiceState, SessionState};

/// Errors that stop the application from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Could not determine app data directory")]
    NoDataDir,

    #[error("Could not create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// Every state object a command can ask for.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub config: ConfigState,
    pub db: DbState,
    pub session: SessionState,
    pub invoice: InvoiceState,
}

impl AppServices {
    pub fn new(config: ConfigState, db: Database) -> Self {
        let invoice = InvoiceState::new(config.tax_mode, config.recompute_debounce());
        AppServices {
            db: DbState::new(db),
            session: SessionState::new(),
            invoice,
            config,
        }
    }

    /// Services over a fresh in-memory database.
    pub async fn in_memory(config: ConfigState) -> Result<Self, StartupError> {
        let db = Database::in_memory().await?;
        Ok(AppServices::new(config, db))
    }
}

/// Starts the application layer.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Determine Database Path ──────────────────────────────────────────► │
/// │     • COUNTERBOOK_DB_PATH, else the platform data directory             │
/// │                                                                         │
/// │  2. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, foreign keys on                             │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  3. Initialize State Objects ─────────────────────────────────────────► │
/// │     • DbState, SessionState (signed out)                                │
/// │     • InvoiceState: blank draft, tax mode + debounce from config        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Logging is not set up here; call [`init_tracing`] first.
pub async fn bootstrap(config: ConfigState) -> Result<AppServices, StartupError> {
    let db_path = database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let services = AppServices::new(config, db);
    info!(
        store = %services.config.store_name,
        tax_mode = ?services.config.tax_mode,
        "State initialized"
    );
    Ok(services)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=counterbook=trace` - Trace the counterbook crates only
/// - Default: `info,counterbook=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,counterbook=debug,sqlx=warn"));

    // A second call (tests, embedded hosts) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.counterbook.admin/counterbook.db`
/// - **Windows**: `%APPDATA%\counterbook\admin\data\counterbook.db`
/// - **Linux**: `~/.local/share/counterbook-admin/counterbook.db`
///
/// ## Development Override
/// Set `COUNTERBOOK_DB_PATH` to use a custom path.
pub fn database_path() -> Result<PathBuf, StartupError> {
    if let Ok(path) = std::env::var("COUNTERBOOK_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs =
        ProjectDirs::from("com", "counterbook", "admin").ok_or(StartupError::NoDataDir)?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("counterbook.db"))
}
