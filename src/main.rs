use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use extraworks::commands::{self, AppState};
use extraworks::models::Params;
use extraworks::utils::config;

#[derive(Parser)]
#[command(name = "extraworks", version, about = "ExtraWorks command palette")]
struct Cli {
    /// Directory holding `config/settings.json` and the database.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Database file (or `:memory:`), overriding the settings.
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank the actions a query could mean
    Search {
        query: String,
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Resolve a query and run the best action
    Execute {
        query: String,
        /// JSON object merged over the extracted parameters
        #[arg(long)]
        params: Option<String>,
    },
    /// Run an intent by name
    Run {
        intent: String,
        #[arg(long)]
        params: Option<String>,
    },
    /// List registered intents
    Intents,
    /// Show what the parser extracts from a query
    Parse { query: String },
    /// Show recent executions
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Load the demo data into an empty database
    Seed,
    /// Print the effective settings
    Settings {
        /// Also write them to config/settings.json
        #[arg(long)]
        write: bool,
    },
}

fn parse_params(raw: Option<String>) -> anyhow::Result<Params> {
    match raw {
        None => Ok(Params::new()),
        Some(text) => match serde_json::from_str::<serde_json::Value>(&text)? {
            serde_json::Value::Object(map) => Ok(map),
            other => anyhow::bail!("--params must be a JSON object, got {}", other),
        },
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    let cli = Cli::parse();

    let data_dir = config::resolve_data_dir(cli.data_dir.as_deref());
    let mut settings =
        commands::settings::get_settings(&data_dir).map_err(anyhow::Error::msg)?;
    if let Some(db) = cli.db {
        settings.database.path = db;
    }
    if matches!(cli.command, Command::Seed) {
        settings.database.seed_demo_data = false;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.logging.level.as_str()),
    )
    .init();

    if let Command::Settings { write } = cli.command {
        if write {
            commands::settings::update_settings(&data_dir, &settings).map_err(anyhow::Error::msg)?;
            log::info!("Wrote {}", config::settings_path(&data_dir).display());
        }
        return print_json(&settings);
    }

    let state = AppState::open(&data_dir, settings)?;

    match cli.command {
        Command::Search { query, threshold } => {
            print_json(&commands::action::search_actions(&state, &query, threshold).await)
        }
        Command::Execute { query, params } => {
            let params = parse_params(params)?;
            let outcome = commands::action::execute_action(&state, &query, Some(params)).await;
            print_json(&outcome)
        }
        Command::Run { intent, params } => {
            let params = parse_params(params)?;
            print_json(&commands::action::execute_intent(&state, &intent, params).await)
        }
        Command::Intents => print_json(&commands::intent::list_intents(&state)),
        Command::Parse { query } => print_json(&commands::intent::parse_query(&state, &query)),
        Command::History { limit } => {
            let history = commands::history::get_action_history(&state, limit)
                .await
                .map_err(anyhow::Error::msg)?;
            print_json(&history)
        }
        Command::Seed => {
            let added = commands::storage::seed_demo_data(&state)
                .await
                .map_err(anyhow::Error::msg)?;
            print_json(&serde_json::json!({ "seeded": added }))
        }
        Command::Settings { .. } => Ok(()),
    }
}
