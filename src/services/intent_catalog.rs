use futures_util::future::BoxFuture;
use std::sync::Arc;

use super::keyword_matcher;
use crate::error::IntentError;
use crate::models::{ActionOutcome, IntentInfo, Params};

/// A named capability the command palette can resolve a query to.
pub trait Intention: Send + Sync {
    fn name(&self) -> &str;
    fn keywords(&self) -> &[&'static str];
    fn description(&self) -> &str;
    fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>>;

    /// Keyword coverage of `query`, see [`keyword_matcher::score`].
    fn score(&self, query: &str) -> f32 {
        keyword_matcher::score(query, self.keywords())
    }

    fn info(&self) -> IntentInfo {
        IntentInfo {
            name: self.name().to_string(),
            keywords: self.keywords().iter().map(|k| k.to_string()).collect(),
            description: self.description().to_string(),
        }
    }
}

#[derive(Clone)]
pub struct IntentMatch {
    pub intent: Arc<dyn Intention>,
    pub score: f32,
}

impl std::fmt::Debug for IntentMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentMatch")
            .field("intent", &self.intent.name())
            .field("score", &self.score)
            .finish()
    }
}

/// Registry of intents, iterated in registration order.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Default, Clone)]
pub struct IntentCatalog {
    intents: Vec<Arc<dyn Intention>>,
}

impl IntentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `intent`, replacing (in place) any intent with the same name.
    pub fn register(&mut self, intent: impl Intention + 'static) {
        self.register_arc(Arc::new(intent));
    }

    pub fn register_arc(&mut self, intent: Arc<dyn Intention>) {
        match self.intents.iter().position(|i| i.name() == intent.name()) {
            Some(idx) => self.intents[idx] = intent,
            None => self.intents.push(intent),
        }
    }

    pub fn unregister(&mut self, name: &str) {
        self.intents.retain(|i| i.name() != name);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Intention>> {
        self.intents.iter().find(|i| i.name() == name).cloned()
    }

    pub fn all(&self) -> &[Arc<dyn Intention>] {
        &self.intents
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Highest keyword score above zero; the earliest registered intent wins ties.
    pub fn find_best_match(&self, query: &str) -> Option<IntentMatch> {
        let mut best: Option<IntentMatch> = None;

        for intent in &self.intents {
            let score = intent.score(query);
            if score > 0.0 && best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(IntentMatch {
                    intent: Arc::clone(intent),
                    score,
                });
            }
        }

        best
    }

    /// Every intent scoring at least `threshold`, best first. Ties keep
    /// registration order.
    pub fn find_all_matches(&self, query: &str, threshold: f32) -> Vec<IntentMatch> {
        let mut matches: Vec<IntentMatch> = self
            .intents
            .iter()
            .filter_map(|intent| {
                let score = intent.score(query);
                (score >= threshold).then(|| IntentMatch {
                    intent: Arc::clone(intent),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use futures_util::FutureExt;

    /// Intent with fixed keywords whose handler echoes its params back.
    pub struct EchoIntent {
        pub name: &'static str,
        pub keywords: Vec<&'static str>,
    }

    impl EchoIntent {
        pub fn new(name: &'static str, keywords: &[&'static str]) -> Self {
            Self {
                name,
                keywords: keywords.to_vec(),
            }
        }
    }

    impl Intention for EchoIntent {
        fn name(&self) -> &str {
            self.name
        }

        fn keywords(&self) -> &[&'static str] {
            &self.keywords
        }

        fn description(&self) -> &str {
            "echoes params"
        }

        fn execute(&self, params: Params) -> BoxFuture<'_, Result<ActionOutcome, IntentError>> {
            async move { Ok::<_, IntentError>(ActionOutcome::ok(params, format!("{} ran", self.name))) }.boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::EchoIntent;
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(matches: &[IntentMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.intent.name()).collect()
    }

    fn sample_catalog() -> IntentCatalog {
        let mut catalog = IntentCatalog::new();
        catalog.register(EchoIntent::new(
            "create_extrawork",
            &["create", "crear", "new", "nuevo", "add", "añadir", "agregar", "extrawork", "trabajo", "work", "task", "tarea"],
        ));
        catalog.register(EchoIntent::new(
            "update_extrawork",
            &["update", "modify", "change", "edit", "extrawork"],
        ));
        catalog
    }

    #[test]
    fn register_overwrites_in_place() {
        let mut catalog = sample_catalog();
        catalog.register(EchoIntent::new("create_extrawork", &["only"]));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.all()[0].keywords(), &["only"]);
        assert_eq!(catalog.all()[1].name(), "update_extrawork");
    }

    #[test]
    fn unregister_is_a_noop_for_unknown_names() {
        let mut catalog = sample_catalog();
        catalog.unregister("does_not_exist");
        assert_eq!(catalog.len(), 2);

        catalog.unregister("update_extrawork");
        assert!(catalog.get("update_extrawork").is_none());
        assert!(catalog.get("create_extrawork").is_some());
    }

    #[test]
    fn best_match_is_absent_for_empty_catalog_or_no_overlap() {
        assert!(IntentCatalog::new().find_best_match("crear trabajo").is_none());
        assert!(sample_catalog().find_best_match("xyzzy plugh").is_none());
    }

    #[test]
    fn best_match_tie_goes_to_first_registered() {
        let mut catalog = IntentCatalog::new();
        catalog.register(EchoIntent::new("first", &["alpha"]));
        catalog.register(EchoIntent::new("second", &["alpha"]));

        let best = catalog.find_best_match("alpha").unwrap();
        assert_eq!(best.intent.name(), "first");
        assert_eq!(best.score, 1.0);
    }

    #[test]
    fn all_matches_rank_by_keyword_coverage() {
        let catalog = sample_catalog();

        let create = catalog.get("create_extrawork").unwrap();
        let update = catalog.get("update_extrawork").unwrap();
        assert!(create.score("update extrawork") > 0.0);
        assert!(update.score("update extrawork") > create.score("update extrawork"));

        let all = catalog.find_all_matches("update extrawork", 0.0);
        assert_eq!(names(&all), vec!["update_extrawork", "create_extrawork"]);

        let above = catalog.find_all_matches("update extrawork", 0.3);
        assert_eq!(names(&above), vec!["update_extrawork"]);
        assert!(above.iter().all(|m| m.score >= 0.3));
    }

    #[test]
    fn all_matches_keep_registration_order_on_ties() {
        let mut catalog = IntentCatalog::new();
        catalog.register(EchoIntent::new("b", &["x"]));
        catalog.register(EchoIntent::new("a", &["x"]));
        catalog.register(EchoIntent::new("c", &["x", "y"]));

        let all = catalog.find_all_matches("x y", 0.3);
        assert_eq!(names(&all), vec!["b", "a", "c"]);
    }
}
