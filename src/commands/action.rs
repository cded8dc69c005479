use super::AppState;
use crate::models::{ActionOutcome, ActionSuggestion, Params};
use crate::services::{Action, EntityStore};

/// Ranked interpretations of `query`. Never fails; an unusable query just
/// has no suggestions.
pub async fn search_actions(
    state: &AppState,
    query: &str,
    threshold: Option<f32>,
) -> Vec<ActionSuggestion> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let threshold = threshold.unwrap_or(state.settings.resolver.suggestion_threshold);
    state.resolver.suggest(query, threshold).await
}

/// Resolves `query` and runs the winning intent. Explicit `params` override
/// whatever was extracted from the text.
pub async fn execute_action(
    state: &AppState,
    query: &str,
    params: Option<Params>,
) -> ActionOutcome {
    match state.resolver.resolve(query, params.unwrap_or_default()) {
        Ok(action) => run(state, Some(query), action).await,
        Err(err) => {
            log::info!("No action for {:?}: {}", query, err);
            ActionOutcome::failure(err)
        }
    }
}

/// Runs `intent` directly with `params`, skipping text resolution.
pub async fn execute_intent(state: &AppState, intent: &str, params: Params) -> ActionOutcome {
    match state.resolver.resolve_intent(intent, params) {
        Ok(action) => run(state, None, action).await,
        Err(err) => {
            log::warn!("{}", err);
            ActionOutcome::failure(err)
        }
    }
}

async fn run(state: &AppState, query: Option<&str>, action: Action) -> ActionOutcome {
    let intent = action.intent_name().to_string();
    let params = action.params().clone();

    let outcome = match action.execute().await {
        Ok(outcome) => {
            log::info!("Executed {}", intent);
            outcome
        }
        Err(err) => {
            log::info!("{} failed: {}", intent, err);
            ActionOutcome::failure(err)
        }
    };

    let message = outcome.message.as_deref().or(outcome.error.as_deref());
    if let Err(err) = state
        .store
        .record_action(query, &intent, &params, outcome.success, message)
        .await
    {
        log::warn!("Failed to record {} in action history: {}", intent, err);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Settings;

    fn state() -> AppState {
        AppState::in_memory(Settings::default()).unwrap()
    }

    #[tokio::test]
    async fn blank_queries_have_no_suggestions() {
        assert!(search_actions(&state(), "   ", Some(0.0)).await.is_empty());
    }

    #[tokio::test]
    async fn executions_are_recorded_with_their_outcome() {
        let state = state();

        let ok = execute_action(&state, "buscar recursos", None).await;
        assert!(ok.success);

        let failed = execute_intent(&state, "delete_resource", Params::new()).await;
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("Resource ID is required"));

        let history = state.store.recent_actions(10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].intent, "delete_resource");
        assert_eq!(history[0].query, None);
        assert_eq!(history[0].message.as_deref(), Some("Resource ID is required"));
        assert_eq!(history[1].query.as_deref(), Some("buscar recursos"));
        assert!(history[1].success);
    }

    #[tokio::test]
    async fn unresolved_queries_are_not_recorded() {
        let state = state();
        let outcome = execute_action(&state, "xyzzy plugh", None).await;
        assert_eq!(outcome.error.as_deref(), Some("no matching action"));

        let outcome = execute_intent(&state, "launch_rocket", Params::new()).await;
        assert_eq!(outcome.error.as_deref(), Some("Intent \"launch_rocket\" not found"));

        assert!(state.store.recent_actions(10).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_executions_both_complete() {
        let state = state();

        let (works, resources) = tokio::join!(
            execute_action(&state, "buscar trabajos", None),
            execute_action(&state, "buscar recursos", None),
        );
        assert!(works.success, "{:?}", works.error);
        assert!(resources.success, "{:?}", resources.error);

        let history = state.store.recent_actions(10).await.unwrap();
        assert_eq!(history.len(), 2);
    }
}
