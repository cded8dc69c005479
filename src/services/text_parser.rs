//! Rule-based parser for palette commands (mostly Spanish, some English).
//!
//! The rule table is plain data: each row names the intent it recognizes, the
//! regex, and what each capture group means. The longest match relative to
//! the whole query wins; earlier rows win ties.

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

use crate::models::{ExtraWorkStatus, Params, ParsedQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureRole {
    ExtraWorkId,
    ResourceName,
    ResourceId,
    Status,
}

struct PatternRule {
    intent: &'static str,
    regex: Regex,
    roles: &'static [CaptureRole],
    /// Replace an id found by the generic pass instead of only filling a gap.
    overwrite_id: bool,
}

use CaptureRole::*;

const STATUS_WORDS: &str = r"(pendiente|en\s+progreso|en\s+curso|completad[oa]|terminad[oa]|cancelad[oa]|en\s+espera|pausad[oa]|pending|in[_\s]progress|completed|cancelled|canceled|on[_\s]hold)";

/// Nouns that never count as a title or a search term on their own.
const GENERIC_NOUNS: &[&str] = &[
    "extrawork", "extraworks", "trabajo", "trabajos", "ew", "ews", "recurso", "recursos",
    "resource", "resources", "work item", "work items",
];

fn rule(
    intent: &'static str,
    pattern: &str,
    roles: &'static [CaptureRole],
    overwrite_id: bool,
) -> PatternRule {
    PatternRule {
        intent,
        regex: Regex::new(pattern).expect("valid intent pattern"),
        roles,
        overwrite_id,
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid extraction pattern"))
        .collect()
}

static GENERIC_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:EW-?)?([A-Z0-9-]*\d[A-Z0-9-]*)\b").expect("valid id pattern")
});

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        // create_extrawork
        rule("create_extrawork", r"(?i)\b(?:crear|nuevo|nueva|añadir|agregar)\s+(?:un\s+)?(?:extrawork|trabajo|ew)\b", &[], false),
        rule("create_extrawork", r"(?i)\bquiero\s+crear\s+(?:un\s+)?(?:extrawork|trabajo)", &[], false),
        rule("create_extrawork", r"(?i)\b(?:nuevo|nueva)\s+(?:extrawork|trabajo)", &[], false),
        rule("create_extrawork", r"(?i)\b(?:create|new|add)\s+(?:an?\s+)?(?:extrawork|work\s+item)\b", &[], false),
        // search_extrawork
        rule("search_extrawork", r"(?i)\bbuscar\s+(?:extrawork|trabajo|ew)", &[], false),
        rule("search_extrawork", r"(?i)\bver\s+(?:todos\s+(?:los\s+)?)?(?:extraworks|trabajos|ews)", &[], false),
        rule("search_extrawork", r"(?i)\blistar\s+(?:extraworks|trabajos|ews)", &[], false),
        rule("search_extrawork", r"(?i)\bmostrar\s+(?:extraworks|trabajos|ews)", &[], false),
        rule("search_extrawork", r"(?i)\b(?:lista\s+de\s+)?(?:extraworks|trabajos)", &[], false),
        rule("search_extrawork", r"(?i)\b(?:search|find|list)\s+(?:all\s+)?(?:extraworks|work\s+items)", &[], false),
        // open_extrawork
        rule("open_extrawork", r"(?i)\babrir\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("open_extrawork", r"(?i)\bir\s+a(?:l)?\s+(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("open_extrawork", r"(?i)\bver\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("open_extrawork", r"(?i)\bmostrar\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("open_extrawork", r"(?i)\bdetalle\s+(?:del?\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("open_extrawork", r"(?i)\b(?:open|show|go\s+to)\s+(?:the\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        // assign_resource_to_extrawork
        rule("assign_resource_to_extrawork", r#"(?i)\bañadir\s+["']?([^"']+?)["']?\s+a(?:l)?\s+(?:extrawork\s+)?(?:EW-)?(\d+)"#, &[ResourceName, ExtraWorkId], true),
        rule("assign_resource_to_extrawork", r#"(?i)\basignar\s+["']?([^"']+?)["']?\s+a(?:l)?\s+(?:extrawork\s+)?(?:EW-)?(\d+)"#, &[ResourceName, ExtraWorkId], true),
        rule("assign_resource_to_extrawork", r#"(?i)\bagregar\s+["']?([^"']+?)["']?\s+(?:a|en)(?:l)?\s+(?:extrawork\s+)?(?:EW-)?(\d+)"#, &[ResourceName, ExtraWorkId], true),
        rule("assign_resource_to_extrawork", r#"(?i)\bponer\s+["']?([^"']+?)["']?\s+(?:a|en)(?:l)?\s+(?:extrawork\s+)?(?:EW-)?(\d+)"#, &[ResourceName, ExtraWorkId], true),
        rule("assign_resource_to_extrawork", r#"(?i)\brecurso\s+["']?([^"']+?)["']?\s+(?:a|en)(?:l)?\s+(?:extrawork\s+)?(?:EW-)?(\d+)"#, &[ResourceName, ExtraWorkId], true),
        rule("assign_resource_to_extrawork", r#"(?i)\bassign\s+["']?([^"']+?)["']?\s+to\s+(?:extrawork\s+)?(?:EW-)?(\d+)"#, &[ResourceName, ExtraWorkId], true),
        // search_resource
        rule("search_resource", r"(?i)\bbuscar\s+(?:recurso|recursos)", &[], false),
        rule("search_resource", r"(?i)\bver\s+(?:todos\s+(?:los\s+)?)?(?:recurso|recursos)", &[], false),
        rule("search_resource", r"(?i)\blistar\s+(?:recurso|recursos)", &[], false),
        rule("search_resource", r"(?i)\bmostrar\s+(?:recurso|recursos)", &[], false),
        rule("search_resource", r"(?i)\b(?:lista\s+de\s+)?recursos\b", &[], false),
        rule("search_resource", r"(?i)\b(?:search|find|list)\s+(?:all\s+)?resources?\b", &[], false),
        // create_resource
        rule("create_resource", r"(?i)\bcrear\s+(?:un\s+)?(?:recurso|resource)\b", &[], false),
        rule("create_resource", r"(?i)\bañadir\s+(?:un\s+)?recurso\b", &[], false),
        rule("create_resource", r"(?i)\bnuevo\s+recurso\b", &[], false),
        rule("create_resource", r"(?i)\bagregar\s+(?:un\s+)?recurso\b", &[], false),
        rule("create_resource", r"(?i)\b(?:create|new)\s+(?:an?\s+)?resource\b", &[], false),
        // update_extrawork
        rule("update_extrawork", r"(?i)\bactualizar\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("update_extrawork", r"(?i)\beditar\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("update_extrawork", r"(?i)\bmodificar\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("update_extrawork", r"(?i)\bcambiar\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("update_extrawork", r"(?i)\b(?:update|edit|modify)\s+(?:the\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        // delete_extrawork
        rule("delete_extrawork", r"(?i)\beliminar\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("delete_extrawork", r"(?i)\bborrar\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("delete_extrawork", r"(?i)\bquitar\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("delete_extrawork", r"(?i)\bremover\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        rule("delete_extrawork", r"(?i)\b(?:delete|remove)\s+(?:the\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)", &[ExtraWorkId], false),
        // change_extrawork_status
        rule(
            "change_extrawork_status",
            &format!(r"(?i)\bcambiar\s+(?:el\s+)?estado\s+(?:del?\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)\s+a\s+{}", STATUS_WORDS),
            &[ExtraWorkId, Status],
            false,
        ),
        rule(
            "change_extrawork_status",
            &format!(r"(?i)\bmarcar\s+(?:el\s+)?(?:extrawork\s+)?(?:EW-)?(\d+)\s+como\s+{}", STATUS_WORDS),
            &[ExtraWorkId, Status],
            false,
        ),
        rule(
            "change_extrawork_status",
            &format!(r"(?i)\bset\s+(?:the\s+)?status\s+of\s+(?:extrawork\s+)?(?:EW-)?(\d+)\s+to\s+{}", STATUS_WORDS),
            &[ExtraWorkId, Status],
            false,
        ),
        // update_resource
        rule("update_resource", r"(?i)\b(?:actualizar|editar|modificar|cambiar)\s+(?:el\s+)?recurso\s+(\d+)", &[ResourceId], false),
        rule("update_resource", r"(?i)\b(?:update|edit|modify)\s+(?:the\s+)?resource\s+(\d+)", &[ResourceId], false),
        // delete_resource
        rule("delete_resource", r"(?i)\b(?:eliminar|borrar|quitar|remover)\s+(?:el\s+)?recurso\s+(\d+)", &[ResourceId], false),
        rule("delete_resource", r"(?i)\b(?:delete|remove)\s+(?:the\s+)?resource\s+(\d+)", &[ResourceId], false),
    ]
});

static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"(?i)\bcrear\s+(?:un\s+)?(?:extrawork|trabajo|ew)\s+["']?(.+?)["']?\s*$"#,
        r#"(?i)\bcrear\s+["']?(.+?)["']?\s*$"#,
        r#"(?i)\b(?:nuevo|nueva)\s+(?:extrawork|trabajo|ew)\s+["']?(.+?)["']?\s*$"#,
        r#"(?i)\b(?:nuevo|nueva)\s+["']?(.+?)["']?\s*$"#,
        r#"(?i)\bañadir\s+(?:un\s+)?(?:extrawork|trabajo|ew)\s+["']?(.+?)["']?\s*$"#,
        r#"(?i)\bagregar\s+(?:un\s+)?(?:extrawork|trabajo|ew)\s+["']?(.+?)["']?\s*$"#,
        r#"(?i)\bquiero\s+crear\s+(?:un\s+)?(?:extrawork|trabajo)\s+["']?(.+?)["']?\s*$"#,
        r#"(?i)\b(?:create|new|add)\s+(?:an?\s+)?(?:extrawork|work\s+item)\s+["']?(.+?)["']?\s*$"#,
    ])
});

static SEARCH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"(?i)\bbuscar\s+(?:extrawork|recurso|trabajo|ew|resource)s?\s+["']?(.+?)["']?\s*$"#,
        r#"(?i)\b(?:search|find)\s+(?:extraworks?|resources?|work\s+items?)\s+["']?(.+?)["']?\s*$"#,
        r#"(?i)\bbuscar\s+["']?(.+?)["']?\s*$"#,
    ])
});

static LIST_ALL_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:ver|listar|mostrar|buscar|lista\s+de|list|show|search|find)\s+(?:todos\s+(?:los\s+)?|all\s+)?(?:extrawork|trabajo|recurso|resource|ew|work\s+item)s?\s*$")
        .expect("valid list pattern")
});

static COMMAND_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:ver|listar|mostrar|buscar|lista\s+de|list|show|search|find)\s+(?:todos\s+(?:los\s+)?|all\s+)?(?:extrawork|trabajo|recurso|resource|ew|work\s+item)s?(?:\s+|$)")
        .expect("valid prefix pattern")
});

/// Strips one pair of surrounding quotes and whitespace, then rejects
/// anything too short or that is only a generic noun.
fn clean_candidate(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix(['"', '\''])
        .unwrap_or(trimmed);
    let unquoted = unquoted
        .strip_suffix(['"', '\''])
        .unwrap_or(unquoted)
        .trim();

    let lower = unquoted.to_lowercase();
    if unquoted.chars().count() > 2 && !GENERIC_NOUNS.contains(&lower.as_str()) {
        Some(unquoted.to_string())
    } else {
        None
    }
}

fn first_capture(patterns: &[Regex], query: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(query)
            .and_then(|caps| caps.get(1))
            .and_then(|m| clean_candidate(m.as_str()))
    })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextParser;

impl TextParser {
    pub fn new() -> Self {
        Self
    }

    /// Recognizes the most likely intent and pulls entities out of `query`.
    /// Never fails: anything not found is simply left unset.
    pub fn parse(&self, query: &str) -> ParsedQuery {
        let mut parsed = ParsedQuery::new(query);

        if let Some(caps) = GENERIC_ID.captures(query) {
            parsed.entities.extra_work_code = caps.get(0).map(|m| m.as_str().to_string());
            parsed.entities.extra_work_id = caps.get(1).map(|m| m.as_str().to_string());
        }

        let query_len = query.chars().count();
        let mut best: Option<(&PatternRule, Captures, f32)> = None;

        if query_len > 0 {
            for rule in RULES.iter() {
                let Some(caps) = rule.regex.captures(query) else {
                    continue;
                };
                let matched_len = caps.get(0).map_or(0, |m| m.as_str().chars().count());
                let score = matched_len as f32 / query_len as f32;
                if best.as_ref().map_or(true, |(_, _, best_score)| score > *best_score) {
                    best = Some((rule, caps, score));
                }
            }
        }

        if let Some((rule, caps, score)) = best {
            log::debug!(
                "pattern matched intent {} (score {:.2}) for {:?}",
                rule.intent,
                score,
                query
            );
            Self::apply_captures(&mut parsed, rule, &caps);
            parsed.intention = Some(rule.intent.to_string());
        }

        match parsed.intention.as_deref() {
            Some("create_extrawork") => {
                parsed.entities.title = Self::extract_title(query);
            }
            Some("search_extrawork") | Some("search_resource") => {
                parsed.entities.query = Self::extract_search_query(query);
            }
            _ => {}
        }

        parsed
    }

    fn apply_captures(parsed: &mut ParsedQuery, rule: &PatternRule, caps: &Captures) {
        let entities = &mut parsed.entities;

        for (idx, role) in rule.roles.iter().enumerate() {
            let Some(value) = caps.get(idx + 1).map(|m| m.as_str().trim().to_string()) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            match role {
                ExtraWorkId => {
                    if rule.overwrite_id || entities.extra_work_id.is_none() {
                        entities.extra_work_id = Some(value);
                    }
                }
                ResourceName => entities.resource_name = Some(value),
                ResourceId => entities.resource_id = Some(value),
                Status => {
                    let status = value
                        .parse::<ExtraWorkStatus>()
                        .map(|s| s.as_str().to_string())
                        .unwrap_or_else(|_| value.to_lowercase());
                    entities.status = Some(status);
                }
            }
        }
    }

    fn extract_title(query: &str) -> Option<String> {
        first_capture(&TITLE_PATTERNS, query)
    }

    fn extract_search_query(query: &str) -> Option<String> {
        if let Some(term) = first_capture(&SEARCH_PATTERNS, query) {
            return Some(term);
        }

        if LIST_ALL_COMMAND.is_match(query) {
            return None;
        }

        let remainder = COMMAND_PREFIX.replace(query, "");
        clean_candidate(&remainder)
    }

    /// Projects the parsed entities onto the parameter bag `intent` expects.
    pub fn extract_params(&self, parsed: &ParsedQuery, intent: &str) -> Params {
        let entities = &parsed.entities;
        let mut params = Params::new();
        let mut put = |key: &str, value: &Option<String>| {
            if let Some(v) = value {
                params.insert(key.to_string(), Value::String(v.clone()));
            }
        };

        match intent {
            "create_extrawork" => {
                if entities.title.is_some() {
                    put("title", &entities.title);
                    put(
                        "description",
                        &Some(entities.description.clone().unwrap_or_default()),
                    );
                    put("priority", &entities.priority);
                }
            }
            "open_extrawork" => {
                if entities.extra_work_id.is_some() {
                    put("id", &entities.extra_work_id);
                    put("code", &entities.extra_work_code);
                }
            }
            "assign_resource_to_extrawork" => {
                if entities.resource_name.is_some() && entities.extra_work_id.is_some() {
                    put("resourceName", &entities.resource_name);
                    put("extraWorkId", &entities.extra_work_id);
                }
            }
            "search_extrawork" | "search_resource" => {
                put("query", &entities.query);
            }
            "update_extrawork" | "delete_extrawork" => {
                put("id", &entities.extra_work_id);
            }
            "change_extrawork_status" => {
                put("id", &entities.extra_work_id);
                put("status", &entities.status);
            }
            "update_resource" | "delete_resource" => {
                put("id", &entities.resource_id);
            }
            _ => {}
        }

        params
    }

    /// Intent names the rule table can produce, in table order.
    pub fn pattern_intents(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for rule in RULES.iter() {
            if !names.contains(&rule.intent) {
                names.push(rule.intent);
            }
        }
        names
    }
}
