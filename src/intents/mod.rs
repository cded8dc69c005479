//! The palette's fixed intent vocabulary, bound to an [`EntityStore`].

pub mod extrawork;
pub mod resource;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{IntentError, StoreError};
use crate::models::{ExtraWork, Params, Reference};
use crate::services::intent_catalog::IntentCatalog;
use crate::services::store::EntityStore;

pub use extrawork::{
    ChangeExtraWorkStatus, CreateExtraWork, DeleteExtraWork, OpenExtraWork, SearchExtraWork,
    UpdateExtraWork,
};
pub use resource::{
    AddResource, AssignResourceToExtraWork, CreateResource, DeleteResource, SearchResource,
    UpdateResource,
};

/// Registers all twelve intents, in the order keyword ties are broken.
pub fn register_default_intents(catalog: &mut IntentCatalog, store: Arc<dyn EntityStore>) {
    catalog.register(CreateExtraWork::new(store.clone()));
    catalog.register(SearchExtraWork::new(store.clone()));
    catalog.register(UpdateExtraWork::new(store.clone()));
    catalog.register(DeleteExtraWork::new(store.clone()));
    catalog.register(ChangeExtraWorkStatus::new(store.clone()));
    catalog.register(OpenExtraWork::new(store.clone()));
    catalog.register(AddResource::new(store.clone()));
    catalog.register(CreateResource::new(store.clone()));
    catalog.register(AssignResourceToExtraWork::new(store.clone()));
    catalog.register(SearchResource::new(store.clone()));
    catalog.register(UpdateResource::new(store.clone()));
    catalog.register(DeleteResource::new(store));
}

pub fn default_catalog(store: Arc<dyn EntityStore>) -> IntentCatalog {
    let mut catalog = IntentCatalog::new();
    register_default_intents(&mut catalog, store);
    catalog
}

fn parse_params<T: DeserializeOwned>(params: Params) -> Result<T, IntentError> {
    serde_json::from_value(Value::Object(params))
        .map_err(|e| IntentError::validation(format!("Invalid parameters: {}", e)))
}

/// Trimmed, non-empty text or `None`.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty_ref(value: Option<Reference>) -> Option<String> {
    value.map(Reference::into_string).filter(|v| !v.is_empty())
}

async fn lookup_extrawork(
    store: &dyn EntityStore,
    reference: &str,
) -> Result<ExtraWork, IntentError> {
    store
        .find_extrawork(reference)
        .await?
        .ok_or_else(|| StoreError::not_found("ExtraWork", reference).into())
}

fn resource_id(reference: &str) -> Result<i64, IntentError> {
    reference
        .parse()
        .map_err(|_| IntentError::validation(format!("Invalid resource id \"{}\"", reference)))
}

/// Resources keep metadata as JSON text; accept either a string or any JSON value.
fn metadata_text(metadata: Option<Value>) -> Option<String> {
    match metadata {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::services::store::SqliteStore;

    pub fn seeded_store() -> Arc<SqliteStore> {
        let store = SqliteStore::in_memory().unwrap();
        store
            .with_connection(crate::database::seed::seed_demo_data)
            .unwrap();
        Arc::new(store)
    }

    pub fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            other => panic!("expected a JSON object, got {}", other),
        }
    }
}
