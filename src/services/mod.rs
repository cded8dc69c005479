pub mod action_resolver;
pub mod intent_catalog;
pub mod keyword_matcher;
pub mod store;
pub mod text_parser;

pub use action_resolver::{Action, ActionResolver};
pub use intent_catalog::{IntentCatalog, IntentMatch, Intention};
pub use store::{EntityStore, SqliteStore};
pub use text_parser::TextParser;
