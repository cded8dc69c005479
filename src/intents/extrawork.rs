use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Deserialize;
use std::sync::Arc;

use super::{lookup_extrawork, non_empty, non_empty_ref, parse_params};
use crate::error::{IntentError, StoreError};
use crate::models::{
    ActionOutcome, ExtraWorkChanges, ExtraWorkStatus, NewExtraWork, Params, Priority, Reference,
};
use crate::services::intent_catalog::Intention;
use crate::services::store::EntityStore;

fn parse_status(raw: Option<String>) -> Result<Option<ExtraWorkStatus>, IntentError> {
    non_empty(raw)
        .map(|s| s.parse::<ExtraWorkStatus>().map_err(IntentError::Validation))
        .transpose()
}

fn parse_priority(raw: Option<String>) -> Result<Option<Priority>, IntentError> {
    non_empty(raw)
        .map(|s| s.parse::<Priority>().map_err(IntentError::Validation))
        .transpose()
}

// ─── create_extrawork ───

pub struct CreateExtraWork {
    store: Arc<dyn EntityStore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateParams {
    title: Option<String>,
    description: Option<String>,
    code: Option<String>,
    status: Option<String>,
    priority: Option<String>,
}

impl CreateExtraWork {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: CreateParams = parse_params(params)?;
        let title = non_empty(p.title).ok_or_else(|| IntentError::validation("Title is required"))?;

        let extrawork = self
            .store
            .create_extrawork(NewExtraWork {
                code: non_empty(p.code),
                title: title.clone(),
                description: p.description.unwrap_or_default().trim().to_string(),
                status: parse_status(p.status)?.unwrap_or_default(),
                priority: parse_priority(p.priority)?.unwrap_or_default(),
                start_date: None,
                end_date: None,
            })
            .await?;

        log::info!("Created extrawork {} ({})", extrawork.code, extrawork.id);
        Ok(ActionOutcome::ok(
            extrawork,
            format!("ExtraWork \"{}\" created successfully", title),
        ))
    }
}

impl Intention for CreateExtraWork {
    fn name(&self) -> &str {
        "create_extrawork"
    }

    fn keywords(&self) -> &[&'static str] {
        &[
            "create", "crear", "new", "nuevo", "add", "añadir", "agregar", "extrawork", "trabajo",
            "work", "task", "tarea",
        ]
    }

    fn description(&self) -> &str {
        "Crea un nuevo ExtraWork"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

// ─── search_extrawork ───

pub struct SearchExtraWork {
    store: Arc<dyn EntityStore>,
}

#[derive(Deserialize)]
struct SearchParams {
    query: Option<String>,
}

impl SearchExtraWork {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: SearchParams = parse_params(params)?;
        let found = match non_empty(p.query) {
            Some(q) => self.store.search_extraworks(&q).await?,
            None => self.store.list_extraworks().await?,
        };

        let message = format!("Found {} ExtraWork items", found.len());
        Ok(ActionOutcome::ok(found, message))
    }
}

impl Intention for SearchExtraWork {
    fn name(&self) -> &str {
        "search_extrawork"
    }

    fn keywords(&self) -> &[&'static str] {
        &[
            "search", "buscar", "find", "encontrar", "look", "ver", "mostrar", "query",
            "extrawork", "trabajo", "trabajos", "list", "listar",
        ]
    }

    fn description(&self) -> &str {
        "Busca o lista ExtraWorks"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

// ─── update_extrawork ───

pub struct UpdateExtraWork {
    store: Arc<dyn EntityStore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParams {
    id: Option<Reference>,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
}

impl UpdateExtraWork {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: UpdateParams = parse_params(params)?;
        let reference =
            non_empty_ref(p.id).ok_or_else(|| IntentError::validation("ExtraWork ID is required"))?;

        let changes = ExtraWorkChanges {
            title: non_empty(p.title),
            description: p.description.map(|d| d.trim().to_string()),
            status: parse_status(p.status)?,
            priority: parse_priority(p.priority)?,
        };
        if changes.is_empty() {
            return Err(IntentError::validation("No fields to update"));
        }

        let existing = lookup_extrawork(self.store.as_ref(), &reference).await?;
        let updated = self.store.update_extrawork(existing.id, changes).await?;

        Ok(ActionOutcome::ok(updated, "ExtraWork updated successfully"))
    }
}

impl Intention for UpdateExtraWork {
    fn name(&self) -> &str {
        "update_extrawork"
    }

    fn keywords(&self) -> &[&'static str] {
        &["update", "modify", "change", "edit", "extrawork"]
    }

    fn description(&self) -> &str {
        "Updates an existing ExtraWork item"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

// ─── delete_extrawork ───

pub struct DeleteExtraWork {
    store: Arc<dyn EntityStore>,
}

#[derive(Deserialize)]
struct IdParams {
    id: Option<Reference>,
}

impl DeleteExtraWork {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: IdParams = parse_params(params)?;
        let reference =
            non_empty_ref(p.id).ok_or_else(|| IntentError::validation("ExtraWork ID is required"))?;

        let existing = lookup_extrawork(self.store.as_ref(), &reference).await?;
        let deleted = self.store.delete_extrawork(existing.id).await?;

        log::info!("Deleted extrawork {}", deleted.code);
        Ok(ActionOutcome::ok(deleted, "ExtraWork deleted successfully"))
    }
}

impl Intention for DeleteExtraWork {
    fn name(&self) -> &str {
        "delete_extrawork"
    }

    fn keywords(&self) -> &[&'static str] {
        &["delete", "remove", "destroy", "extrawork"]
    }

    fn description(&self) -> &str {
        "Deletes an ExtraWork item"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

// ─── change_extrawork_status ───

pub struct ChangeExtraWorkStatus {
    store: Arc<dyn EntityStore>,
}

#[derive(Deserialize)]
struct StatusParams {
    id: Option<Reference>,
    status: Option<String>,
}

impl ChangeExtraWorkStatus {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: StatusParams = parse_params(params)?;
        let (Some(reference), Some(status)) = (non_empty_ref(p.id), parse_status(p.status)?) else {
            return Err(IntentError::validation("ExtraWork ID and status are required"));
        };

        let existing = lookup_extrawork(self.store.as_ref(), &reference).await?;
        let updated = self.store.change_extrawork_status(existing.id, status).await?;

        Ok(ActionOutcome::ok(
            updated,
            format!("ExtraWork status changed to {} successfully", status),
        ))
    }
}

impl Intention for ChangeExtraWorkStatus {
    fn name(&self) -> &str {
        "change_extrawork_status"
    }

    fn keywords(&self) -> &[&'static str] {
        &[
            "change", "update", "status", "state", "extrawork", "pending", "in_progress",
            "completed", "cancelled", "on_hold",
        ]
    }

    fn description(&self) -> &str {
        "Changes the status of an ExtraWork item"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

// ─── open_extrawork ───

pub struct OpenExtraWork {
    store: Arc<dyn EntityStore>,
}

#[derive(Deserialize)]
struct OpenParams {
    id: Option<Reference>,
    code: Option<String>,
}

impl OpenExtraWork {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: OpenParams = parse_params(params)?;
        let id = non_empty_ref(p.id);
        let code = non_empty(p.code);
        if id.is_none() && code.is_none() {
            return Err(IntentError::validation("ExtraWork ID or code is required"));
        }

        let by_id = match &id {
            Some(reference) => self.store.find_extrawork(reference).await?,
            None => None,
        };
        let found = match (by_id, code) {
            (Some(found), _) => found,
            (None, Some(code)) => lookup_extrawork(self.store.as_ref(), &code).await?,
            (None, None) => {
                return Err(StoreError::not_found("ExtraWork", id.unwrap_or_default()).into())
            }
        };

        let message = format!("ExtraWork {} opened successfully", found.code);
        let navigate_to = found.id;
        Ok(ActionOutcome {
            navigate_to: Some(navigate_to),
            ..ActionOutcome::ok(found, message)
        })
    }
}

impl Intention for OpenExtraWork {
    fn name(&self) -> &str {
        "open_extrawork"
    }

    fn keywords(&self) -> &[&'static str] {
        &["open", "abrir", "ver", "mostrar", "ir", "go", "extrawork", "trabajo", "ew-", "ew"]
    }

    fn description(&self) -> &str {
        "Abre o navega a un ExtraWork específico"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intents::test_support::{params, seeded_store};
    use crate::models::ExtraWork;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data<T: serde::de::DeserializeOwned>(outcome: &ActionOutcome) -> T {
        serde_json::from_value(outcome.data.clone().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn create_defaults_to_pending_and_medium() {
        let intent = CreateExtraWork::new(seeded_store());
        let outcome = intent
            .execute(params(json!({"title": "pintar pared", "description": ""})))
            .await
            .unwrap();

        assert!(outcome.success);
        let created: ExtraWork = data(&outcome);
        assert_eq!(created.title, "pintar pared");
        assert_eq!(created.status, ExtraWorkStatus::Pending);
        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(created.code, "EW-007");
        assert_eq!(
            outcome.message.as_deref(),
            Some("ExtraWork \"pintar pared\" created successfully")
        );
    }

    #[tokio::test]
    async fn create_requires_a_title() {
        let intent = CreateExtraWork::new(seeded_store());
        let err = intent
            .execute(params(json!({"title": "   "})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Title is required");
    }

    #[tokio::test]
    async fn search_without_query_lists_everything() {
        let intent = SearchExtraWork::new(seeded_store());
        let all: Vec<ExtraWork> = data(&intent.execute(Params::new()).await.unwrap());
        assert_eq!(all.len(), 6);

        let hits: Vec<ExtraWork> = data(
            &intent
                .execute(params(json!({"query": "solar"})))
                .await
                .unwrap(),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "EW-005-SOLAR");
    }

    #[tokio::test]
    async fn status_change_validates_the_status() {
        let intent = ChangeExtraWorkStatus::new(seeded_store());

        let err = intent
            .execute(params(json!({"id": "2", "status": "archived"})))
            .await
            .unwrap_err();
        assert!(matches!(err, IntentError::Validation(_)));

        let outcome = intent
            .execute(params(json!({"id": "EW-002", "status": "completado"})))
            .await
            .unwrap();
        let updated: ExtraWork = data(&outcome);
        assert_eq!(updated.status, ExtraWorkStatus::Completed);
    }

    #[tokio::test]
    async fn open_by_padded_id_navigates() {
        let intent = OpenExtraWork::new(seeded_store());
        let outcome = intent
            .execute(params(json!({"id": "001", "code": "EW-001"})))
            .await
            .unwrap();

        assert_eq!(outcome.navigate_to, Some(1));
        let opened: ExtraWork = data(&outcome);
        assert_eq!(opened.code, "EW-001-FACHADA");
        assert_eq!(opened.resources.len(), 3);
    }

    #[tokio::test]
    async fn open_missing_is_not_found() {
        let intent = OpenExtraWork::new(seeded_store());
        let err = intent
            .execute(params(json!({"id": 99})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ExtraWork with id 99 not found");
    }

    #[tokio::test]
    async fn update_and_delete_by_reference() {
        let store = seeded_store();
        let update = UpdateExtraWork::new(store.clone());
        let delete = DeleteExtraWork::new(store.clone());

        let err = update
            .execute(params(json!({"id": "3"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No fields to update");

        let updated: ExtraWork = data(
            &update
                .execute(params(json!({"id": 3, "priority": "alta"})))
                .await
                .unwrap(),
        );
        assert_eq!(updated.priority, Priority::High);

        delete.execute(params(json!({"id": "EW-003"}))).await.unwrap();
        assert!(store.find_extrawork("3").await.unwrap().is_none());
    }
}
