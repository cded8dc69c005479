//! ExtraWorks/Resources manager fronted by a natural-language command palette.
//!
//! Free text goes through [`services::TextParser`] and keyword scoring in
//! [`services::IntentCatalog`]; [`services::ActionResolver`] combines the two
//! and the intents in [`intents`] carry out the result against an
//! [`services::EntityStore`].

pub mod commands;
pub mod database;
pub mod error;
pub mod intents;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{IntentError, StoreError};
