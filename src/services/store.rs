use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::database::queries;
use crate::error::StoreError;
use crate::models::{
    ActionLogEntry, ExtraWork, ExtraWorkChanges, ExtraWorkStatus, NewExtraWork, NewResource,
    Params, Resource, ResourceChanges,
};

type StoreFuture<'a, T> = BoxFuture<'a, Result<T, StoreError>>;

/// Persistence collaborator behind every intent handler.
///
/// Work items are addressed by a free-form reference (numeric id, `EW-001`,
/// or a full code) because that is what the palette extracts from text;
/// everything else uses the numeric id. Every call may suspend.
pub trait EntityStore: Send + Sync {
    fn create_extrawork(&self, extrawork: NewExtraWork) -> StoreFuture<'_, ExtraWork>;
    fn list_extraworks(&self) -> StoreFuture<'_, Vec<ExtraWork>>;
    fn find_extrawork<'a>(&'a self, reference: &'a str) -> StoreFuture<'a, Option<ExtraWork>>;
    fn search_extraworks<'a>(&'a self, query: &'a str) -> StoreFuture<'a, Vec<ExtraWork>>;
    fn update_extrawork(&self, id: i64, changes: ExtraWorkChanges) -> StoreFuture<'_, ExtraWork>;
    fn change_extrawork_status(
        &self,
        id: i64,
        status: ExtraWorkStatus,
    ) -> StoreFuture<'_, ExtraWork>;
    fn delete_extrawork(&self, id: i64) -> StoreFuture<'_, ExtraWork>;

    fn create_resource(&self, resource: NewResource) -> StoreFuture<'_, Resource>;
    fn list_resources(&self) -> StoreFuture<'_, Vec<Resource>>;
    fn find_resource(&self, id: i64) -> StoreFuture<'_, Option<Resource>>;
    fn search_resources<'a>(&'a self, query: &'a str) -> StoreFuture<'a, Vec<Resource>>;
    fn update_resource(&self, id: i64, changes: ResourceChanges) -> StoreFuture<'_, Resource>;
    fn assign_resource(&self, resource_id: i64, extrawork_id: i64) -> StoreFuture<'_, Resource>;
    fn delete_resource(&self, id: i64) -> StoreFuture<'_, Resource>;

    fn record_action<'a>(
        &'a self,
        query: Option<&'a str>,
        intent: &'a str,
        params: &'a Params,
        success: bool,
        message: Option<&'a str>,
    ) -> StoreFuture<'a, ()>;
    fn recent_actions(&self, limit: usize) -> StoreFuture<'_, Vec<ActionLogEntry>>;
}

/// SQLite-backed store. Queries run on tokio's blocking pool so callers
/// never hold a runtime worker while rusqlite works.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(crate::database::open_in_memory()?))
    }

    /// Runs `f` with the locked connection on the calling thread. Meant for
    /// start-up work such as seeding, before any query is in flight.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> anyhow::Result<T>,
    ) -> Result<T, StoreError> {
        let conn = lock(&self.conn)?;
        Ok(f(&conn)?)
    }

    /// Runs `f` with the locked connection on the blocking pool.
    pub fn call<'a, T, F>(&self, f: F) -> StoreFuture<'a, T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
    {
        self.blocking(move |conn| Ok(f(conn)?))
    }

    fn blocking<'a, T, F>(&self, op: F) -> StoreFuture<'a, T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        async move {
            let joined = tokio::task::spawn_blocking(move || {
                let conn = lock(&conn)?;
                op(&conn)
            })
            .await;

            match joined {
                Ok(result) => result,
                Err(err) => Err(StoreError::Task(err)),
            }
        }
        .boxed()
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, StoreError> {
    conn.lock().map_err(|_| StoreError::Poisoned)
}

fn reference_id(reference: &str) -> Option<i64> {
    let digits = match reference.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("ew-") => &reference[3..],
        _ => reference,
    };
    digits.parse().ok()
}

/// Numeric id, then exact code, then code prefix; a reference missing its
/// `EW-` prefix (`001-FACHADA`, `7`) gets it added back as a last try.
fn find_extrawork_by_reference(
    conn: &Connection,
    reference: &str,
) -> Result<Option<ExtraWork>, StoreError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Ok(None);
    }

    if let Some(id) = reference_id(reference) {
        if let Some(found) = queries::get_extrawork(conn, id)? {
            return Ok(Some(found));
        }
    }

    if let Some(found) = queries::get_extrawork_by_code(conn, reference)? {
        return Ok(Some(found));
    }

    let has_prefix = reference
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("ew-"));
    if has_prefix {
        return Ok(None);
    }
    Ok(queries::get_extrawork_by_code(conn, &format!("EW-{}", reference))?)
}

fn require_extrawork(conn: &Connection, id: i64) -> Result<ExtraWork, StoreError> {
    queries::get_extrawork(conn, id)?.ok_or_else(|| StoreError::not_found("ExtraWork", id))
}

fn require_resource(conn: &Connection, id: i64) -> Result<Resource, StoreError> {
    queries::get_resource(conn, id)?.ok_or_else(|| StoreError::not_found("Resource", id))
}

fn update_extrawork_row(
    conn: &Connection,
    id: i64,
    changes: &ExtraWorkChanges,
) -> Result<ExtraWork, StoreError> {
    if !queries::update_extrawork(conn, id, changes)? {
        return Err(StoreError::not_found("ExtraWork", id));
    }
    require_extrawork(conn, id)
}

impl EntityStore for SqliteStore {
    fn create_extrawork(&self, extrawork: NewExtraWork) -> StoreFuture<'_, ExtraWork> {
        self.blocking(move |conn| {
            let id = queries::insert_extrawork(conn, &extrawork)?;
            require_extrawork(conn, id)
        })
    }

    fn list_extraworks(&self) -> StoreFuture<'_, Vec<ExtraWork>> {
        self.blocking(|conn| Ok(queries::list_extraworks(conn)?))
    }

    fn find_extrawork<'a>(&'a self, reference: &'a str) -> StoreFuture<'a, Option<ExtraWork>> {
        let reference = reference.to_string();
        self.blocking(move |conn| find_extrawork_by_reference(conn, &reference))
    }

    fn search_extraworks<'a>(&'a self, query: &'a str) -> StoreFuture<'a, Vec<ExtraWork>> {
        let query = query.to_string();
        self.blocking(move |conn| Ok(queries::search_extraworks(conn, &query)?))
    }

    fn update_extrawork(&self, id: i64, changes: ExtraWorkChanges) -> StoreFuture<'_, ExtraWork> {
        self.blocking(move |conn| update_extrawork_row(conn, id, &changes))
    }

    fn change_extrawork_status(
        &self,
        id: i64,
        status: ExtraWorkStatus,
    ) -> StoreFuture<'_, ExtraWork> {
        let changes = ExtraWorkChanges {
            status: Some(status),
            ..ExtraWorkChanges::default()
        };
        self.blocking(move |conn| update_extrawork_row(conn, id, &changes))
    }

    fn delete_extrawork(&self, id: i64) -> StoreFuture<'_, ExtraWork> {
        self.blocking(move |conn| {
            let existing = require_extrawork(conn, id)?;
            queries::delete_extrawork(conn, id)?;
            Ok(existing)
        })
    }

    fn create_resource(&self, resource: NewResource) -> StoreFuture<'_, Resource> {
        self.blocking(move |conn| {
            if let Some(ew_id) = resource.extra_work_id {
                require_extrawork(conn, ew_id)?;
            }
            let id = queries::insert_resource(conn, &resource)?;
            require_resource(conn, id)
        })
    }

    fn list_resources(&self) -> StoreFuture<'_, Vec<Resource>> {
        self.blocking(|conn| Ok(queries::list_resources(conn)?))
    }

    fn find_resource(&self, id: i64) -> StoreFuture<'_, Option<Resource>> {
        self.blocking(move |conn| Ok(queries::get_resource(conn, id)?))
    }

    fn search_resources<'a>(&'a self, query: &'a str) -> StoreFuture<'a, Vec<Resource>> {
        let query = query.to_string();
        self.blocking(move |conn| Ok(queries::search_resources(conn, &query)?))
    }

    fn update_resource(&self, id: i64, changes: ResourceChanges) -> StoreFuture<'_, Resource> {
        self.blocking(move |conn| {
            if !queries::update_resource(conn, id, &changes)? {
                return Err(StoreError::not_found("Resource", id));
            }
            require_resource(conn, id)
        })
    }

    fn assign_resource(&self, resource_id: i64, extrawork_id: i64) -> StoreFuture<'_, Resource> {
        self.blocking(move |conn| {
            require_extrawork(conn, extrawork_id)?;
            if !queries::assign_resource(conn, resource_id, extrawork_id)? {
                return Err(StoreError::not_found("Resource", resource_id));
            }
            require_resource(conn, resource_id)
        })
    }

    fn delete_resource(&self, id: i64) -> StoreFuture<'_, Resource> {
        self.blocking(move |conn| {
            let existing = require_resource(conn, id)?;
            queries::delete_resource(conn, id)?;
            Ok(existing)
        })
    }

    fn record_action<'a>(
        &'a self,
        query: Option<&'a str>,
        intent: &'a str,
        params: &'a Params,
        success: bool,
        message: Option<&'a str>,
    ) -> StoreFuture<'a, ()> {
        let query = query.map(str::to_string);
        let intent = intent.to_string();
        let params = params.clone();
        let message = message.map(str::to_string);
        self.blocking(move |conn| {
            queries::insert_action_log(
                conn,
                query.as_deref(),
                &intent,
                &params,
                success,
                message.as_deref(),
            )?;
            Ok(())
        })
    }

    fn recent_actions(&self, limit: usize) -> StoreFuture<'_, Vec<ActionLogEntry>> {
        self.blocking(move |conn| Ok(queries::recent_action_logs(conn, limit)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store
            .with_connection(crate::database::seed::seed_demo_data)
            .unwrap();
        store
    }

    #[tokio::test]
    async fn find_extrawork_by_numeric_and_code_references() {
        let store = seeded_store();

        let by_padded = store.find_extrawork("001").await.unwrap().unwrap();
        assert_eq!(by_padded.id, 1);

        let by_prefixed = store.find_extrawork("EW-002").await.unwrap().unwrap();
        assert_eq!(by_prefixed.code, "EW-002-HVAC");

        let by_code = store.find_extrawork("ew-003-parking").await.unwrap().unwrap();
        assert_eq!(by_code.id, 3);

        assert!(store.find_extrawork("999").await.unwrap().is_none());
        assert!(store.find_extrawork("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_extrawork_restores_a_stripped_code_prefix() {
        let store = seeded_store();

        let found = store.find_extrawork("001-FACHADA").await.unwrap().unwrap();
        assert_eq!(found.code, "EW-001-FACHADA");

        let found = store.find_extrawork("003-parking").await.unwrap().unwrap();
        assert_eq!(found.id, 3);

        assert!(store.find_extrawork("001-NADA").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_rows_surface_as_not_found() {
        let store = seeded_store();

        let err = store.delete_resource(404).await.unwrap_err();
        assert_eq!(err.to_string(), "Resource with id 404 not found");

        let err = store.assign_resource(1, 404).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "ExtraWork", .. }));
    }

    #[tokio::test]
    async fn assign_moves_resource_between_extraworks() {
        let store = seeded_store();
        let crane = store.search_resources("Grúa").await.unwrap().remove(0);
        assert_eq!(crane.extra_work_id, Some(1));

        let moved = store.assign_resource(crane.id, 2).await.unwrap();
        assert_eq!(moved.extra_work_id, Some(2));

        let hvac = store.find_extrawork("2").await.unwrap().unwrap();
        assert!(hvac.resources.iter().any(|r| r.id == crane.id));
    }

    #[tokio::test]
    async fn action_history_is_newest_first() {
        let store = SqliteStore::in_memory().unwrap();
        let params = Params::new();
        store
            .record_action(Some("crear trabajo"), "create_extrawork", &params, true, None)
            .await
            .unwrap();
        store
            .record_action(None, "delete_extrawork", &params, false, Some("not found"))
            .await
            .unwrap();

        let history = store.recent_actions(10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].intent, "delete_extrawork");
        assert!(!history[0].success);
        assert_eq!(history[1].query.as_deref(), Some("crear trabajo"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_calls_share_the_connection() {
        let store = Arc::new(seeded_store());

        let (works, resources) = tokio::join!(
            store.search_extraworks("EW-00"),
            store.search_resources("Grúa"),
        );
        assert_eq!(works.unwrap().len(), 6);
        assert_eq!(resources.unwrap().len(), 1);
    }
}
