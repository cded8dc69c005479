use serde_json::{json, Value};
use std::sync::Arc;

use super::intent_catalog::{IntentCatalog, IntentMatch, Intention};
use super::store::EntityStore;
use super::text_parser::TextParser;
use crate::error::IntentError;
use crate::models::{ActionOutcome, ActionSuggestion, Params, ParsedQuery, Resource};

pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.3;

/// Score given to an intent recognized by a pattern rather than keywords.
pub const PATTERN_SCORE: f32 = 0.9;

const VIEW_RESOURCE_SCORE: f32 = 0.85;
const OPEN_ASSIGNED_SCORE: f32 = 0.8;
const ASSIGN_AVAILABLE_SCORE: f32 = 0.7;

/// A resolved intent plus the parameters it will run with.
pub struct Action {
    intent: Arc<dyn Intention>,
    params: Params,
    confidence: f32,
}

impl Action {
    pub fn intent_name(&self) -> &str {
        self.intent.name()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub async fn execute(self) -> Result<ActionOutcome, IntentError> {
        self.intent.execute(self.params).await
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("intent", &self.intent.name())
            .field("params", &self.params)
            .field("confidence", &self.confidence)
            .finish()
    }
}

/// Turns palette text into an [`Action`] or a ranked list of suggestions.
///
/// Patterns are trusted over keywords: a pattern hit resolves with
/// confidence 1.0, keyword scoring is only the fallback.
pub struct ActionResolver {
    catalog: Arc<IntentCatalog>,
    parser: TextParser,
    resources: Option<Arc<dyn EntityStore>>,
    min_confidence: f32,
}

impl ActionResolver {
    pub fn new(catalog: Arc<IntentCatalog>) -> Self {
        Self {
            catalog,
            parser: TextParser::new(),
            resources: None,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    /// Enables the resource-derived suggestions in [`suggest`](Self::suggest).
    pub fn with_resource_lookup(mut self, store: Arc<dyn EntityStore>) -> Self {
        self.resources = Some(store);
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    pub fn parse(&self, query: &str) -> ParsedQuery {
        self.parser.parse(query)
    }

    pub fn resolve(&self, query: &str, explicit: Params) -> Result<Action, IntentError> {
        let parsed = self.parser.parse(query);

        let pattern_match = parsed
            .intention
            .as_deref()
            .and_then(|name| self.catalog.get(name))
            .map(|intent| IntentMatch { intent, score: 1.0 });

        let matched = pattern_match
            .or_else(|| self.catalog.find_best_match(query))
            .ok_or(IntentError::NoMatchFound)?;

        if matched.score < self.min_confidence {
            log::debug!(
                "best intent {} scored {:.2} for {:?}, below {:.2}",
                matched.intent.name(),
                matched.score,
                query,
                self.min_confidence
            );
            return Err(IntentError::NoMatchFound);
        }

        let mut params = self.parser.extract_params(&parsed, matched.intent.name());
        params.extend(explicit);

        log::debug!(
            "resolved {:?} to {} ({:.2})",
            query,
            matched.intent.name(),
            matched.score
        );

        Ok(Action {
            intent: matched.intent,
            params,
            confidence: matched.score,
        })
    }

    /// Looks `name` up directly, keeping `params` as given.
    pub fn resolve_intent(&self, name: &str, params: Params) -> Result<Action, IntentError> {
        let intent = self
            .catalog
            .get(name)
            .ok_or_else(|| IntentError::UnknownIntent(name.to_string()))?;

        Ok(Action {
            intent,
            params,
            confidence: 1.0,
        })
    }

    /// Ranked candidates for `query`; awaits the store only for the
    /// resource-derived entries.
    pub async fn suggest(&self, query: &str, threshold: f32) -> Vec<ActionSuggestion> {
        let parsed = self.parser.parse(query);
        let mut candidates = self.catalog.find_all_matches(query, threshold);

        if let Some(name) = parsed.intention.as_deref() {
            match candidates.iter_mut().find(|c| c.intent.name() == name) {
                Some(existing) => existing.score = existing.score.max(PATTERN_SCORE),
                None => {
                    if let Some(intent) = self.catalog.get(name) {
                        candidates.push(IntentMatch {
                            intent,
                            score: PATTERN_SCORE,
                        });
                    }
                }
            }
        }

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut suggestions: Vec<ActionSuggestion> = candidates
            .into_iter()
            .map(|candidate| {
                let params = self.parser.extract_params(&parsed, candidate.intent.name());
                let (title, subtitle) = label(candidate.intent.as_ref(), &params);
                ActionSuggestion {
                    intent: candidate.intent.name().to_string(),
                    score: candidate.score,
                    description: candidate.intent.description().to_string(),
                    title: Some(title),
                    subtitle: Some(subtitle),
                    params,
                }
            })
            .collect();

        let contextual = self.resource_suggestions(query).await;
        if !contextual.is_empty() {
            suggestions.extend(contextual);
            suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        }

        suggestions
    }

    async fn resource_suggestions(&self, query: &str) -> Vec<ActionSuggestion> {
        let Some(store) = &self.resources else {
            return Vec::new();
        };

        let term = query.trim();
        if term.chars().count() < 2 {
            return Vec::new();
        }

        match store.search_resources(term).await {
            Ok(resources) => resources.iter().flat_map(resource_actions).collect(),
            Err(err) => {
                log::warn!("Skipping resource suggestions for {:?}: {}", term, err);
                Vec::new()
            }
        }
    }
}

fn param_str(params: &Params, key: &str) -> Option<String> {
    params.get(key).and_then(|value| match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Display title and subtitle for an intent-based suggestion.
fn label(intent: &dyn Intention, params: &Params) -> (String, String) {
    let subtitle = intent.description().to_string();
    let get = |key: &str| param_str(params, key);

    let title = match intent.name() {
        "create_extrawork" => match get("title") {
            Some(title) => format!("Create Work Item: \"{}\"", title),
            None => "Create new Work Item".to_string(),
        },
        "search_extrawork" => match get("query") {
            Some(q) => format!("Search Work Items: \"{}\"", q),
            None => "List all Work Items".to_string(),
        },
        "open_extrawork" => match get("code").or_else(|| get("id")) {
            Some(code) => format!("Open Work Item {}", code),
            None => "Open Work Item".to_string(),
        },
        "update_extrawork" => match get("id") {
            Some(id) => format!("Update Work Item {}", id),
            None => "Update a Work Item".to_string(),
        },
        "delete_extrawork" => match get("id") {
            Some(id) => format!("Delete Work Item {}", id),
            None => "Delete a Work Item".to_string(),
        },
        "change_extrawork_status" => match (get("id"), get("status")) {
            (Some(id), Some(status)) => format!("Change Work Item {} status to {}", id, status),
            (Some(id), None) => format!("Change status of Work Item {}", id),
            _ => "Change Work Item status".to_string(),
        },
        "assign_resource_to_extrawork" => match (get("resourceName"), get("extraWorkId")) {
            (Some(name), Some(id)) => format!("Assign \"{}\" to Work Item {}", name, id),
            _ => "Assign Resource to Work Item".to_string(),
        },
        "search_resource" => match get("query") {
            Some(q) => format!("Search Resources: \"{}\"", q),
            None => "List all Resources".to_string(),
        },
        "create_resource" => "Create new Resource".to_string(),
        "add_resource" => "Add Resource to Work Item".to_string(),
        "update_resource" => match get("id") {
            Some(id) => format!("Update Resource {}", id),
            None => "Update a Resource".to_string(),
        },
        "delete_resource" => match get("id") {
            Some(id) => format!("Delete Resource {}", id),
            None => "Delete a Resource".to_string(),
        },
        other => other.to_string(),
    };

    (title, subtitle)
}

fn resource_actions(resource: &Resource) -> Vec<ActionSuggestion> {
    let to_params = |value: Value| match value {
        Value::Object(map) => map,
        _ => Params::new(),
    };

    let mut actions = vec![ActionSuggestion {
        intent: "search_resource".to_string(),
        score: VIEW_RESOURCE_SCORE,
        description: format!("View resource {}", resource.name),
        title: Some(format!("View Resource: {}", resource.name)),
        subtitle: Some(format!("{} ({})", resource.resource_type, resource.availability)),
        params: to_params(json!({ "query": resource.name })),
    }];

    match resource.extra_work_id {
        Some(extrawork_id) => actions.push(ActionSuggestion {
            intent: "open_extrawork".to_string(),
            score: OPEN_ASSIGNED_SCORE,
            description: format!("Open the work item {} is assigned to", resource.name),
            title: Some(format!("Open Work Item {}", extrawork_id)),
            subtitle: Some(format!("Assigned resource: {}", resource.name)),
            params: to_params(json!({ "id": extrawork_id })),
        }),
        None if resource.is_available() => actions.push(ActionSuggestion {
            intent: "assign_resource_to_extrawork".to_string(),
            score: ASSIGN_AVAILABLE_SCORE,
            description: format!("Assign {} to a work item", resource.name),
            title: Some(format!("Assign \"{}\" to a Work Item", resource.name)),
            subtitle: Some("Available resource".to_string()),
            params: to_params(json!({
                "resourceName": resource.name,
                "resourceId": resource.id,
            })),
        }),
        None => {}
    }

    actions
}
