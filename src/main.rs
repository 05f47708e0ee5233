use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hooklens::cli::{entries, projects, recent, sessions, show};
use hooklens::config::{Config, Dataset};
use hooklens::Browser;

#[derive(Parser)]
#[command(name = "hooklens")]
#[command(about = "Browse AI hook-event and chat-transcript logs by project and session")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "hooklens.yaml")]
    config: String,

    /// Which log to browse
    #[arg(short, long, value_enum, default_value_t = Dataset::Hooks, global = true)]
    dataset: Dataset,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    /// Log resolver and query activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects, most recently active first
    Projects,

    /// List the sessions of a project
    Sessions {
        /// Project path or display name
        project: String,
    },

    /// List the entries of a session
    Entries {
        /// Project path or display name
        project: String,
        /// Session ID
        session: String,
    },

    /// Show the newest records across all projects
    Recent {
        /// Number of records
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
    },

    /// Print raw records
    Show {
        /// Record IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "hooklens=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load config
    let config = Config::load(&cli.config).context("Failed to load configuration")?;
    config
        .validate_dataset(cli.dataset)
        .context("Invalid configuration")?;

    // Initialize resolver and store
    let resolver = Arc::new(config.path_resolver()?);
    let browser = Browser::open(&config, cli.dataset, resolver)
        .with_context(|| format!("Failed to open {} database", cli.dataset.as_str()))?;

    match cli.command {
        Commands::Projects => {
            projects::run(&browser, cli.json)?;
        }
        Commands::Sessions { project } => {
            sessions::run(&browser, &project, cli.json)?;
        }
        Commands::Entries { project, session } => {
            entries::run(&browser, &project, &session, cli.json)?;
        }
        Commands::Recent { limit } => {
            recent::run(&browser, limit, cli.json)?;
        }
        Commands::Show { ids } => {
            show::run(&browser, &ids, cli.json)?;
        }
    }

    Ok(())
}
