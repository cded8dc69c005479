use super::AppState;
use crate::database::seed;

/// Loads the demo work items and resources into an empty database.
/// Returns how many work items were added (zero if data already existed).
pub async fn seed_demo_data(state: &AppState) -> Result<usize, String> {
    state
        .store
        .call(seed::seed_demo_data)
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Settings;

    #[tokio::test]
    async fn seeding_an_empty_store_then_again_is_a_noop() {
        let mut settings = Settings::default();
        settings.database.seed_demo_data = false;
        let state = AppState::in_memory(settings).unwrap();

        assert_eq!(seed_demo_data(&state).await, Ok(6));
        assert_eq!(seed_demo_data(&state).await, Ok(0));
    }
}
