use super::AppState;
use crate::models::ActionLogEntry;
use crate::services::EntityStore;

const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Most recent executions first.
pub async fn get_action_history(
    state: &AppState,
    limit: Option<usize>,
) -> Result<Vec<ActionLogEntry>, String> {
    state
        .store
        .recent_actions(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Params, Settings};

    #[tokio::test]
    async fn limit_caps_the_newest_entries() {
        let state = AppState::in_memory(Settings::default()).unwrap();
        for intent in ["search_extrawork", "search_resource", "open_extrawork"] {
            state
                .store
                .record_action(Some("q"), intent, &Params::new(), true, None)
                .await
                .unwrap();
        }

        let history = get_action_history(&state, Some(2)).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].intent, "open_extrawork");
        assert_eq!(get_action_history(&state, None).await.unwrap().len(), 3);
    }
}
