//! ghsearch CLI - search GitHub users from the terminal.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::output::OutputFormat;

#[derive(Parser)]
#[command(name = "ghsearch")]
#[command(version)]
#[command(about = "Search GitHub users and browse their profiles")]
#[command(
    long_about = "ghsearch queries the GitHub REST API for users, lets you mark favorites \
and filter results down to them, and shows a user's profile and most recently \
updated repositories."
)]
#[command(after_long_help = r#"EXAMPLES
    Search once and print a table:
        $ ghsearch search octo

    Same, as JSON:
        $ ghsearch search "location:berlin language:rust" -o json

    Show a profile with its repositories:
        $ ghsearch profile octocat

    Search as you type, with favorites:
        $ ghsearch interactive

    Generate shell completions:
        $ ghsearch completions bash > ~/.local/share/bash-completion/completions/ghsearch

CONFIGURATION
    ghsearch reads configuration from:
      1. ~/.config/ghsearch/config.toml (or $XDG_CONFIG_HOME/ghsearch/config.toml)
      2. ./ghsearch.toml
      3. Environment variables (GHSEARCH_* prefix, "__" between section and key)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GHSEARCH_API__BASE_URL        API root (default: https://api.github.com)
    GHSEARCH_API__USER_AGENT      User-Agent header value
    GHSEARCH_SEARCH__DEBOUNCE_MS  Quiet period before a typed query is sent (default: 500)
    RUST_LOG                      Log filter (default: ghsearch=info,ghsearch_cli=info)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search users once and print the results
    Search {
        /// GitHub search query (supports qualifiers such as "location:berlin")
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Show a user's profile and repositories
    Profile {
        /// GitHub login
        username: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Search as you type, with favorites
    ///
    /// Each line you enter replaces the search text. Lines starting with ':'
    /// are commands; type :help to list them.
    Interactive,
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging when piped, or when explicitly requested
    if !Term::stdout().is_term() || std::env::var_os("RUST_LOG").is_some() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("ghsearch=info,ghsearch_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => commands::meta::handle_completions(shell)?,
        Commands::Man { output } => commands::meta::handle_man(output)?,
        command => {
            let config = config::Config::load();
            match command {
                Commands::Search { query, output } => {
                    commands::search::handle_search(&query, output, &config).await?;
                }
                Commands::Profile { username, output } => {
                    commands::profile::handle_profile(&username, output, &config).await?;
                }
                Commands::Interactive => {
                    commands::interactive::handle_interactive(&config).await?;
                }
                Commands::Completions { .. } | Commands::Man { .. } => {}
            }
        }
    }

    Ok(())
}
