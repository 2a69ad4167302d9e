//! Line-oriented driver for the search pipeline.
//!
//! Each plain line replaces the search box text, exactly as if it had been
//! typed, so the debouncer decides when a search actually goes out. Lines
//! starting with `:` are commands.

use console::Term;
use ghsearch::{GitHubClient, ProfileLoader, SearchPipeline, SearchSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::commands::output::{
    OutputFormat, render_favorites, render_profile, render_search, render_status,
};
use crate::commands::shared::{build_client, search_options};
use crate::config::Config;

const HELP: &str = "\
Type to search. Commands:
  :clear           clear the search box
  :fav <login>     toggle a user in the current results as favorite
  :favs            list favorites
  :favs on|off     show only favorites
  :retry           run the last search again
  :open <login>    show a user's profile
  :help            show this help
  :quit            exit (Ctrl+C also works)";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    Query(String),
    Clear,
    ToggleFavorite(String),
    FavoritesOnly(bool),
    ListFavorites,
    Retry,
    Open(String),
    Help,
    Quit,
}

/// Parse one input line (without its line terminator).
pub(crate) fn parse_line(line: &str) -> Result<Input, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Input::Query(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("Too many arguments for :{name}"));
    }

    match (name, arg) {
        ("clear", None) => Ok(Input::Clear),
        ("retry", None) => Ok(Input::Retry),
        ("help", None) => Ok(Input::Help),
        ("quit" | "q", None) => Ok(Input::Quit),
        ("fav", Some(login)) => Ok(Input::ToggleFavorite(login.to_string())),
        ("favs", Some("on")) => Ok(Input::FavoritesOnly(true)),
        ("favs", Some("off")) => Ok(Input::FavoritesOnly(false)),
        ("favs", None) => Ok(Input::ListFavorites),
        ("open", Some(login)) => Ok(Input::Open(login.to_string())),
        ("fav" | "open", None) => Err(format!(":{name} needs a login")),
        ("favs", _) => Err(":favs takes on or off".to_string()),
        _ => Err(format!("Unknown command :{name}. Type :help for commands.")),
    }
}

/// Status line plus the body for the current display state.
pub(crate) fn render_frame(snapshot: &SearchSnapshot) -> String {
    format!("{}\n{}", render_status(snapshot), render_search(snapshot))
}

pub(crate) async fn handle_interactive(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(config)?;
    let pipeline = SearchPipeline::spawn_with(client.clone(), search_options(config));
    let renderer = spawn_renderer(pipeline.subscribe());

    println!("{HELP}\n");
    println!("{}", render_frame(&pipeline.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Ctrl+C received");
                break;
            }
        };
        // EOF
        let Some(line) = line else { break };

        match parse_line(&line) {
            Ok(Input::Quit) => break,
            Ok(input) => apply(input, &pipeline, &client).await?,
            Err(message) => eprintln!("{message}"),
        }
    }

    renderer.abort();
    Ok(())
}

async fn apply(
    input: Input,
    pipeline: &SearchPipeline,
    client: &GitHubClient,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!(?input, "Interactive input");
    match input {
        Input::Query(text) => pipeline.set_query(text),
        Input::Clear => pipeline.clear_query(),
        Input::Retry => pipeline.retry(),
        Input::FavoritesOnly(enabled) => pipeline.set_favorites_only(enabled),
        Input::ListFavorites => {
            println!("{}", render_favorites(pipeline.current().await.favorites()));
        }
        Input::ToggleFavorite(login) => {
            let snapshot = pipeline.current().await;
            match find_user(&snapshot, &login) {
                Some(user) => pipeline.toggle_favorite(&user),
                None => eprintln!("No user {login:?} in the current results"),
            }
        }
        Input::Open(login) => {
            let loader = ProfileLoader::new(client.clone(), login);
            let (detail, repos) = loader.load_all();
            detail.await?;
            repos.await?;
            println!(
                "{}",
                render_profile(&loader.snapshot(), OutputFormat::Table, chrono::Utc::now())?
            );
        }
        Input::Help => println!("{HELP}"),
        Input::Quit => {}
    }
    Ok(())
}

/// Look up a user in the current results by login, ignoring ASCII case.
fn find_user(snapshot: &SearchSnapshot, login: &str) -> Option<ghsearch::UserSummary> {
    snapshot
        .all_users()
        .iter()
        .find(|u| u.login.eq_ignore_ascii_case(login))
        .cloned()
}

/// Print a frame on every published change until the pipeline goes away.
fn spawn_renderer(mut updates: watch::Receiver<SearchSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let term = Term::stdout();
        while updates.changed().await.is_ok() {
            let frame = render_frame(&updates.borrow_and_update());
            if term.is_term() {
                let _ = term.write_line("");
            }
            println!("{frame}");
        }
    })
}
