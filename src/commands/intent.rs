use super::AppState;
use crate::models::{IntentInfo, ParsedQuery};

/// Every registered intent, in registration order.
pub fn list_intents(state: &AppState) -> Vec<IntentInfo> {
    state
        .resolver
        .catalog()
        .all()
        .iter()
        .map(|intent| intent.info())
        .collect()
}

/// What the text parser makes of `query`, without resolving or running it.
pub fn parse_query(state: &AppState, query: &str) -> ParsedQuery {
    state.resolver.parse(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Settings;

    #[test]
    fn lists_the_full_vocabulary() {
        let state = AppState::in_memory(Settings::default()).unwrap();
        let intents = list_intents(&state);
        assert_eq!(intents.len(), 12);
        assert_eq!(intents[0].name, "create_extrawork");
        assert!(intents[0].keywords.contains(&"crear".to_string()));
    }

    #[test]
    fn parse_query_exposes_entities() {
        let state = AppState::in_memory(Settings::default()).unwrap();
        let parsed = parse_query(&state, "abrir EW-001");
        assert_eq!(parsed.intention.as_deref(), Some("open_extrawork"));
        assert_eq!(parsed.entities.extra_work_id.as_deref(), Some("001"));
    }
}
