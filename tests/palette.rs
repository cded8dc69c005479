use pretty_assertions::assert_eq;
use serde_json::json;

use extraworks::commands::action::{execute_action, execute_intent, search_actions};
use extraworks::commands::AppState;
use extraworks::models::{ExtraWork, ExtraWorkStatus, Params, Resource, Settings};
use extraworks::services::EntityStore;

fn seeded() -> AppState {
    AppState::in_memory(Settings::default()).unwrap()
}

fn params(value: serde_json::Value) -> Params {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn create_from_text_defaults_to_pending() {
    let state = seeded();
    let outcome = execute_action(&state, "crear extrawork pintar pared", None).await;

    assert!(outcome.success, "{:?}", outcome.error);
    let created: ExtraWork = serde_json::from_value(outcome.data.unwrap()).unwrap();
    assert_eq!(created.title, "pintar pared");
    assert_eq!(created.description, "");
    assert_eq!(created.status, ExtraWorkStatus::Pending);

    let history = state.store.recent_actions(1).await.unwrap();
    assert_eq!(history[0].intent, "create_extrawork");
    assert_eq!(
        serde_json::Value::Object(history[0].params.clone()),
        json!({"title": "pintar pared", "description": ""})
    );
}

#[tokio::test]
async fn open_by_code_finds_the_work_item() {
    let state = seeded();
    let outcome = execute_action(&state, "abrir EW-001", None).await;

    assert!(outcome.success);
    assert_eq!(outcome.navigate_to, Some(1));

    let missing = execute_action(&state, "abrir EW-404", None).await;
    assert!(!missing.success);
    assert_eq!(missing.error.as_deref(), Some("ExtraWork with id EW-404 not found"));
}

#[tokio::test]
async fn bare_resource_search_lists_everything() {
    let state = seeded();
    let outcome = execute_action(&state, "buscar recursos", None).await;

    assert!(outcome.success);
    let resources: Vec<Resource> = serde_json::from_value(outcome.data.unwrap()).unwrap();
    assert_eq!(resources.len(), 16);
}

#[tokio::test]
async fn gibberish_matches_nothing() {
    let state = seeded();
    assert!(search_actions(&state, "xyzzy plugh", None).await.is_empty());

    let outcome = execute_action(&state, "xyzzy plugh", None).await;
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("no matching action"));
}

#[tokio::test]
async fn keyword_ranking_prefers_the_fuller_match() {
    let state = seeded();
    let suggestions = search_actions(&state, "update extrawork", Some(0.3)).await;

    assert_eq!(suggestions[0].intent, "update_extrawork");
    assert!(suggestions.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(suggestions.iter().all(|s| s.score >= 0.3));
}

#[tokio::test]
async fn assign_by_name_links_the_resource() {
    let state = seeded();
    let outcome = execute_action(&state, "asignar Grúa Torre a EW-002", None).await;

    assert!(outcome.success, "{:?}", outcome.error);
    let resource: Resource = serde_json::from_value(outcome.data.unwrap()).unwrap();
    assert_eq!(resource.name, "Grúa Torre GT-500");
    assert_eq!(resource.extra_work_id, Some(2));

    let missing = execute_action(&state, "asignar Teletransportador a EW-002", None).await;
    assert!(!missing.success);
    assert_eq!(
        missing.error.as_deref(),
        Some("Resource with name \"Teletransportador\" not found")
    );
}

#[tokio::test]
async fn explicit_params_win_over_extracted_ones() {
    let state = seeded();
    let outcome = execute_action(
        &state,
        "crear extrawork Alfa",
        Some(params(json!({"title": "Beta", "priority": "alta"}))),
    )
    .await;

    let created: ExtraWork = serde_json::from_value(outcome.data.unwrap()).unwrap();
    assert_eq!(created.title, "Beta");
    assert_eq!(created.priority.as_str(), "high");
}

#[tokio::test]
async fn status_change_from_spanish_text() {
    let state = seeded();
    let outcome = execute_action(&state, "marcar EW-2 como completado", None).await;

    assert!(outcome.success, "{:?}", outcome.error);
    let updated: ExtraWork = serde_json::from_value(outcome.data.unwrap()).unwrap();
    assert_eq!(updated.status, ExtraWorkStatus::Completed);
}

#[tokio::test]
async fn suggestions_mix_intents_and_resources() {
    let state = seeded();
    let suggestions = search_actions(&state, "Generador", None).await;

    let intents: Vec<&str> = suggestions.iter().map(|s| s.intent.as_str()).collect();
    assert_eq!(intents, vec!["search_resource", "assign_resource_to_extrawork"]);
}

#[tokio::test]
async fn run_by_intent_uses_params_verbatim() {
    let state = seeded();
    let outcome = execute_intent(
        &state,
        "search_extrawork",
        params(json!({"query": "HVAC"})),
    )
    .await;

    let found: Vec<ExtraWork> = serde_json::from_value(outcome.data.unwrap()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, "EW-002-HVAC");

    let unknown = execute_intent(&state, "nope", Params::new()).await;
    assert_eq!(unknown.error.as_deref(), Some("Intent \"nope\" not found"));
}

#[tokio::test]
async fn contextual_suggestions_can_be_disabled() {
    let mut settings = Settings::default();
    settings.resolver.contextual_suggestions = false;
    let state = AppState::in_memory(settings).unwrap();

    assert!(search_actions(&state, "Generador", None).await.is_empty());
}

#[tokio::test]
async fn delete_by_full_code() {
    let state = seeded();
    let outcome = execute_action(&state, "eliminar EW-001-FACHADA", None).await;

    assert!(outcome.success, "{:?}", outcome.error);
    let deleted: ExtraWork = serde_json::from_value(outcome.data.unwrap()).unwrap();
    assert_eq!(deleted.code, "EW-001-FACHADA");
    assert!(state.store.find_extrawork("1").await.unwrap().is_none());
}

#[tokio::test]
async fn update_by_full_code() {
    let state = seeded();
    let outcome = execute_action(
        &state,
        "editar EW-003-PARKING",
        Some(params(json!({"priority": "alta"}))),
    )
    .await;

    assert!(outcome.success, "{:?}", outcome.error);
    let updated: ExtraWork = serde_json::from_value(outcome.data.unwrap()).unwrap();
    assert_eq!(updated.code, "EW-003-PARKING");
    assert_eq!(updated.priority.as_str(), "high");
}

#[tokio::test]
async fn wildcard_characters_do_not_match_everything() {
    let state = seeded();
    assert!(search_actions(&state, "__", None).await.is_empty());
    assert!(search_actions(&state, "%%", None).await.is_empty());
}
