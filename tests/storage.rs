use extraworks::commands::{history, storage, AppState};
use extraworks::models::Settings;
use extraworks::utils::config;

#[tokio::test]
async fn file_database_persists_and_seeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::default();
    let db_path = config::resolve_db_path(dir.path(), &settings);

    {
        let state = AppState::open(dir.path(), settings.clone()).unwrap();
        let outcome =
            extraworks::commands::action::execute_action(&state, "crear trabajo Revisar grietas", None)
                .await;
        assert!(outcome.success, "{:?}", outcome.error);
        assert_eq!(storage::seed_demo_data(&state).await, Ok(0));
    }
    assert!(db_path.exists());

    let reopened = AppState::open(dir.path(), settings).unwrap();
    let entries = history::get_action_history(&reopened, Some(5)).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].intent, "create_extrawork");
    assert_eq!(entries[0].query.as_deref(), Some("crear trabajo Revisar grietas"));
}

#[tokio::test]
async fn unseeded_database_starts_empty() {
    let mut settings = Settings::default();
    settings.database.seed_demo_data = false;
    let state = AppState::in_memory(settings).unwrap();

    let found = extraworks::commands::action::search_actions(&state, "Grúa", None).await;
    assert!(found.is_empty());
    assert_eq!(storage::seed_demo_data(&state).await, Ok(6));
}
