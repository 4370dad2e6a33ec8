//! Application state wiring all services together.
//!
//! AppState holds the concrete desk used by both the CLI and the REST API.
//! The desk is generic over the prompt generator; AppState pins it to the
//! deterministic template generator and wires the gateway with the SQLite
//! primary and JSON-file secondary stores.

use std::path::PathBuf;
use std::sync::Arc;

use lendia_core::desk::{LoanDesk, TemplateLoanDesk};
use lendia_core::generate::TemplatePromptGenerator;
use lendia_core::persistence::{BoxApplicationStore, PersistenceGateway};
use lendia_core::product::ProductRegistry;
use lendia_core::session::store::SessionStore;
use lendia_infra::config::{load_global_config, resolve_data_dir};
use lendia_infra::filestore::JsonFileApplicationStore;
use lendia_infra::sqlite::{DatabasePool, SqliteApplicationStore};

/// Shared application state holding the desk and its infrastructure.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<TemplateLoanDesk>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the DB, open the file
    /// store, wire the gateway and desk.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        // Primary store: SQLite
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("lendia.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;
        let primary = SqliteApplicationStore::new(db_pool.clone());

        // Secondary store: local JSON files
        let secondary = JsonFileApplicationStore::open(&data_dir).await?;

        let gateway = PersistenceGateway::new(
            BoxApplicationStore::new(primary),
            BoxApplicationStore::new(secondary),
            &config.gateway,
        );

        let sessions = Arc::new(SessionStore::new(config.session.clone()));
        let desk = LoanDesk::new(
            ProductRegistry::with_catalog(&config.products),
            sessions,
            Arc::new(gateway),
            TemplatePromptGenerator::new(),
        );

        Ok(Self {
            desk: Arc::new(desk),
            data_dir,
            db_pool,
        })
    }
}
