pub mod action;
pub mod history;
pub mod intent;
pub mod settings;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use crate::database;
use crate::intents;
use crate::models::Settings;
use crate::services::{ActionResolver, EntityStore, SqliteStore};
use crate::utils::config;

pub const IN_MEMORY_DB: &str = ":memory:";

/// Everything a command needs: the store, the resolver built over it, and
/// the settings they were configured from.
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub resolver: ActionResolver,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: Arc<SqliteStore>, settings: Settings) -> Self {
        let shared: Arc<dyn EntityStore> = store.clone();
        let catalog = Arc::new(intents::default_catalog(shared.clone()));

        let mut resolver =
            ActionResolver::new(catalog).with_min_confidence(settings.resolver.min_confidence);
        if settings.resolver.contextual_suggestions {
            resolver = resolver.with_resource_lookup(shared);
        }

        Self {
            store,
            resolver,
            settings,
        }
    }

    /// Opens (creating if needed) the database the settings point at and
    /// seeds it when enabled.
    pub fn open(data_dir: &Path, settings: Settings) -> anyhow::Result<Self> {
        let conn = if settings.database.path == IN_MEMORY_DB {
            database::open_in_memory()?
        } else {
            let db_path = config::resolve_db_path(data_dir, &settings);
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            log::debug!("Opening database at {}", db_path.display());
            database::init_database(&db_path)?
        };

        let store = SqliteStore::new(conn);
        if settings.database.seed_demo_data {
            store.with_connection(database::seed::seed_demo_data)?;
        }

        Ok(Self::new(Arc::new(store), settings))
    }

    pub fn in_memory(settings: Settings) -> anyhow::Result<Self> {
        let mut settings = settings;
        settings.database.path = IN_MEMORY_DB.to_string();
        Self::open(Path::new("."), settings)
    }
}
