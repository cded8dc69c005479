use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{lookup_extrawork, metadata_text, non_empty, non_empty_ref, parse_params, resource_id};
use crate::error::{IntentError, StoreError};
use crate::models::{ActionOutcome, NewResource, Params, Reference, ResourceChanges};
use crate::services::intent_catalog::Intention;
use crate::services::store::EntityStore;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceFields {
    name: Option<String>,
    #[serde(rename = "type")]
    resource_type: Option<String>,
    availability: Option<String>,
    url: Option<String>,
    metadata: Option<Value>,
    extra_work_id: Option<Reference>,
}

/// A dangling reference while linking two entities is a precondition
/// failure of the request, not a store fault.
fn missing_as_validation(err: IntentError) -> IntentError {
    match err {
        err @ IntentError::Store(StoreError::NotFound { .. }) => {
            IntentError::validation(err.to_string())
        }
        other => other,
    }
}

// ─── create_resource ───

pub struct CreateResource {
    store: Arc<dyn EntityStore>,
}

impl CreateResource {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: ResourceFields = parse_params(params)?;
        let (Some(name), Some(resource_type)) = (non_empty(p.name), non_empty(p.resource_type))
        else {
            return Err(IntentError::validation("Name and type are required"));
        };

        let extra_work_id = match non_empty_ref(p.extra_work_id) {
            Some(reference) => Some(
                lookup_extrawork(self.store.as_ref(), &reference)
                    .await
                    .map_err(missing_as_validation)?
                    .id,
            ),
            None => None,
        };

        let resource = self
            .store
            .create_resource(NewResource {
                name: name.clone(),
                resource_type,
                availability: non_empty(p.availability),
                url: non_empty(p.url),
                metadata: metadata_text(p.metadata),
                extra_work_id,
            })
            .await?;

        log::info!("Created resource {} ({})", resource.name, resource.id);
        Ok(ActionOutcome::ok(
            resource,
            format!("Resource \"{}\" created successfully", name),
        ))
    }
}

impl Intention for CreateResource {
    fn name(&self) -> &str {
        "create_resource"
    }

    fn keywords(&self) -> &[&'static str] {
        &["create", "add", "new", "resource", "assign", "allocate"]
    }

    fn description(&self) -> &str {
        "Creates a new resource optionally assigned to an ExtraWork"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

// ─── add_resource ───

/// Like `create_resource`, but the target work item is mandatory.
pub struct AddResource {
    store: Arc<dyn EntityStore>,
}

impl AddResource {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: ResourceFields = parse_params(params)?;
        let (Some(reference), Some(name), Some(resource_type)) = (
            non_empty_ref(p.extra_work_id),
            non_empty(p.name),
            non_empty(p.resource_type),
        ) else {
            return Err(IntentError::validation(
                "ExtraWork ID, name and type are required",
            ));
        };

        let extrawork = lookup_extrawork(self.store.as_ref(), &reference)
            .await
            .map_err(missing_as_validation)?;
        let resource = self
            .store
            .create_resource(NewResource {
                name: name.clone(),
                resource_type,
                availability: non_empty(p.availability),
                url: non_empty(p.url),
                metadata: metadata_text(p.metadata),
                extra_work_id: Some(extrawork.id),
            })
            .await?;

        Ok(ActionOutcome::ok(
            resource,
            format!("Resource \"{}\" added successfully", name),
        ))
    }
}

impl Intention for AddResource {
    fn name(&self) -> &str {
        "add_resource"
    }

    fn keywords(&self) -> &[&'static str] {
        &["add", "attach", "resource", "file", "link"]
    }

    fn description(&self) -> &str {
        "Adds a resource to an ExtraWork item"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

// ─── assign_resource_to_extrawork ───

pub struct AssignResourceToExtraWork {
    store: Arc<dyn EntityStore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignParams {
    resource_name: Option<String>,
    extra_work_id: Option<Reference>,
    resource_id: Option<Reference>,
}

impl AssignResourceToExtraWork {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: AssignParams = parse_params(params)?;
        let (Some(resource_name), Some(reference)) =
            (non_empty(p.resource_name), non_empty_ref(p.extra_work_id))
        else {
            return Err(IntentError::validation(
                "Resource name and ExtraWork ID are required",
            ));
        };

        let extrawork = lookup_extrawork(self.store.as_ref(), &reference)
            .await
            .map_err(missing_as_validation)?;

        let resource = match non_empty_ref(p.resource_id) {
            Some(raw_id) => {
                let id = resource_id(&raw_id)?;
                self.store.find_resource(id).await?.ok_or_else(|| {
                    missing_as_validation(StoreError::not_found("Resource", id).into())
                })?
            }
            None => self
                .store
                .search_resources(&resource_name)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    IntentError::validation(format!(
                        "Resource with name \"{}\" not found",
                        resource_name
                    ))
                })?,
        };

        let assigned = self.store.assign_resource(resource.id, extrawork.id).await?;

        log::info!("Assigned resource {} to {}", assigned.id, extrawork.code);
        Ok(ActionOutcome::ok(
            &assigned,
            format!(
                "Resource \"{}\" assigned to ExtraWork {} successfully",
                assigned.name, extrawork.code
            ),
        ))
    }
}

impl Intention for AssignResourceToExtraWork {
    fn name(&self) -> &str {
        "assign_resource_to_extrawork"
    }

    fn keywords(&self) -> &[&'static str] {
        &[
            "assign", "asignar", "añadir", "agregar", "poner", "resource", "recurso", "extrawork",
            "trabajo", "to", "a", "en",
        ]
    }

    fn description(&self) -> &str {
        "Asigna un recurso existente a un ExtraWork"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

// ─── search_resource ───

pub struct SearchResource {
    store: Arc<dyn EntityStore>,
}

#[derive(Deserialize)]
struct SearchParams {
    query: Option<String>,
}

impl SearchResource {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: SearchParams = parse_params(params)?;
        let found = match non_empty(p.query) {
            Some(q) => self.store.search_resources(&q).await?,
            None => self.store.list_resources().await?,
        };

        let message = format!("Found {} resource(s)", found.len());
        Ok(ActionOutcome::ok(found, message))
    }
}

impl Intention for SearchResource {
    fn name(&self) -> &str {
        "search_resource"
    }

    fn keywords(&self) -> &[&'static str] {
        &[
            "search", "buscar", "find", "encontrar", "list", "listar", "ver", "mostrar",
            "resource", "recurso", "recursos",
        ]
    }

    fn description(&self) -> &str {
        "Busca recursos por nombre o tipo"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

// ─── update_resource ───

pub struct UpdateResource {
    store: Arc<dyn EntityStore>,
}

#[derive(Deserialize)]
struct UpdateParams {
    id: Option<Reference>,
    #[serde(flatten)]
    fields: ResourceFields,
}

impl UpdateResource {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: UpdateParams = parse_params(params)?;
        let raw_id =
            non_empty_ref(p.id).ok_or_else(|| IntentError::validation("Resource ID is required"))?;
        let id = resource_id(&raw_id)?;

        let changes = ResourceChanges {
            name: non_empty(p.fields.name),
            resource_type: non_empty(p.fields.resource_type),
            availability: non_empty(p.fields.availability),
            url: non_empty(p.fields.url),
            metadata: metadata_text(p.fields.metadata),
        };

        let updated = match non_empty_ref(p.fields.extra_work_id) {
            Some(reference) => {
                let extrawork = lookup_extrawork(self.store.as_ref(), &reference)
                    .await
                    .map_err(missing_as_validation)?;
                if !changes.is_empty() {
                    self.store.update_resource(id, changes).await?;
                }
                self.store.assign_resource(id, extrawork.id).await?
            }
            None if changes.is_empty() => {
                return Err(IntentError::validation("No fields to update"));
            }
            None => self.store.update_resource(id, changes).await?,
        };

        Ok(ActionOutcome::ok(
            &updated,
            format!("Resource \"{}\" updated successfully", updated.name),
        ))
    }
}

impl Intention for UpdateResource {
    fn name(&self) -> &str {
        "update_resource"
    }

    fn keywords(&self) -> &[&'static str] {
        &[
            "update", "actualizar", "editar", "modificar", "cambiar", "resource", "recurso",
        ]
    }

    fn description(&self) -> &str {
        "Actualiza un recurso existente"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}

// ─── delete_resource ───

pub struct DeleteResource {
    store: Arc<dyn EntityStore>,
}

#[derive(Deserialize)]
struct IdParams {
    id: Option<Reference>,
}

impl DeleteResource {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn run(&self, params: Params) -> Result<ActionOutcome, IntentError> {
        let p: IdParams = parse_params(params)?;
        let raw_id =
            non_empty_ref(p.id).ok_or_else(|| IntentError::validation("Resource ID is required"))?;

        let deleted = self.store.delete_resource(resource_id(&raw_id)?).await?;

        log::info!("Deleted resource {} ({})", deleted.name, deleted.id);
        Ok(ActionOutcome::ok(
            &deleted,
            format!("Resource \"{}\" deleted successfully", deleted.name),
        ))
    }
}

impl Intention for DeleteResource {
    fn name(&self) -> &str {
        "delete_resource"
    }

    fn keywords(&self) -> &[&'static str] {
        &["delete", "eliminar", "borrar", "quitar", "remover", "resource", "recurso"]
    }

    fn description(&self) -> &str {
        "Elimina un recurso"
    }

    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
        self.run(params).boxed()
    }
}
