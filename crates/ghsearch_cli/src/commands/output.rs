//! Table/JSON rendering for search results and profiles.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use ghsearch::search::DisplayState;
use ghsearch::{Favorites, ProfileSnapshot, Repository, SearchSnapshot, UserDetail, UserSummary};
use serde::Serialize;
use tabled::Tabled;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// One search result row.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct UserRow {
    #[tabled(rename = "")]
    #[serde(skip)]
    pub marker: String,
    #[tabled(rename = "Login")]
    pub login: String,
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Profile")]
    pub html_url: String,
    #[tabled(skip)]
    pub favorite: bool,
}

impl UserRow {
    pub(crate) fn new(user: &UserSummary, favorites: &Favorites) -> Self {
        let favorite = favorites.contains(user);
        Self {
            marker: if favorite { "★" } else { "" }.to_string(),
            login: user.login.clone(),
            id: user.id,
            html_url: user.html_url.clone(),
            favorite,
        }
    }
}

/// One repository row.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct RepositoryRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Stars")]
    pub stars: u64,
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Updated")]
    pub updated: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

impl RepositoryRow {
    pub(crate) fn new(repo: &Repository, now: DateTime<Utc>) -> Self {
        let updated = match repo.updated_at_utc() {
            Some(at) => format_age(now.signed_duration_since(at)),
            None => repo.updated_at.clone(),
        };
        Self {
            name: repo.name.clone(),
            stars: repo.stargazers_count,
            language: repo.language.clone().unwrap_or_default(),
            updated,
            description: repo.description.clone().unwrap_or_default(),
        }
    }
}

/// JSON shape of the `profile` command.
#[derive(Debug, Serialize)]
struct ProfileJson<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a UserDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail_error: Option<&'a str>,
    repositories: &'a [Repository],
    #[serde(skip_serializing_if = "Option::is_none")]
    repositories_error: Option<&'a str>,
}

pub(crate) fn render_table<T: Tabled>(items: impl IntoIterator<Item = T>) -> String {
    let mut table = tabled::Table::new(items);
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

pub(crate) fn render_users(
    users: &[UserSummary],
    favorites: &Favorites,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    let rows = users.iter().map(|u| UserRow::new(u, favorites));
    match format {
        OutputFormat::Table => Ok(render_table(rows)),
        OutputFormat::Json => serde_json::to_string_pretty(&rows.collect::<Vec<_>>()),
    }
}

/// Text for the current search state, in display-state priority order.
pub(crate) fn render_search(snapshot: &SearchSnapshot) -> String {
    match snapshot.display_state() {
        DisplayState::NotYetSearched => "Search for GitHub users".to_string(),
        DisplayState::Loading => match snapshot.stable_query() {
            Some(q) => format!("Searching for \"{q}\"..."),
            None => "Searching...".to_string(),
        },
        DisplayState::Failed => snapshot.error_message().unwrap_or_default().to_string(),
        DisplayState::EmptyResult if snapshot.is_favorites_only() => {
            "No favorites in these results".to_string()
        }
        DisplayState::EmptyResult => "No users found".to_string(),
        DisplayState::Results => {
            let rows = snapshot
                .displayed_users()
                .iter()
                .map(|u| UserRow::new(u, snapshot.favorites()));
            render_table(rows)
        }
    }
}

/// Favorited users in id order, independent of the current results.
pub(crate) fn render_favorites(favorites: &Favorites) -> String {
    if favorites.is_empty() {
        return "No favorites yet".to_string();
    }
    render_table(favorites.iter().map(|u| UserRow::new(u, favorites)))
}

/// One-line status shown above the interactive view.
pub(crate) fn render_status(snapshot: &SearchSnapshot) -> String {
    format!(
        "query: {:?} | results: {} | favorites: {} | favorites only: {}",
        snapshot.raw_query(),
        snapshot.all_users().len(),
        snapshot.favorites().len(),
        if snapshot.is_favorites_only() { "on" } else { "off" },
    )
}

pub(crate) fn render_profile(
    snapshot: &ProfileSnapshot,
    format: OutputFormat,
    now: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(&ProfileJson {
            username: &snapshot.username,
            detail: snapshot.detail.data.as_ref(),
            detail_error: snapshot.detail.error.as_deref(),
            repositories: &snapshot.repositories.data,
            repositories_error: snapshot.repositories.error.as_deref(),
        });
    }

    let mut out = String::new();

    if snapshot.detail.is_loading {
        out.push_str("Loading profile...\n");
    } else if let Some(error) = &snapshot.detail.error {
        out.push_str(error);
        out.push('\n');
    }
    if let Some(detail) = &snapshot.detail.data {
        out.push_str(&render_detail(detail));
    }

    out.push_str("\nRepositories\n");
    let repos = &snapshot.repositories;
    if repos.is_loading {
        out.push_str("Loading repositories...\n");
    } else if let Some(error) = &repos.error {
        out.push_str(error);
        out.push('\n');
    } else if repos.data.is_empty() {
        out.push_str("No repositories found\n");
    }
    if !repos.data.is_empty() {
        out.push_str(&render_table(
            repos.data.iter().map(|r| RepositoryRow::new(r, now)),
        ));
        out.push('\n');
    }

    Ok(out)
}

fn render_detail(detail: &UserDetail) -> String {
    let mut out = String::new();
    out.push_str(detail.display_name());
    out.push('\n');
    if detail.name.as_deref().is_some_and(|n| !n.is_empty()) {
        out.push_str(&format!("@{}\n", detail.login));
    }
    if let Some(bio) = detail.bio.as_deref().filter(|b| !b.is_empty()) {
        out.push_str(bio);
        out.push('\n');
    }
    out.push_str(&format!(
        "Repos: {}  Followers: {}  Following: {}\n",
        detail.public_repos, detail.followers, detail.following
    ));
    out
}

/// Format an elapsed time as a coarse "ago" string.
pub(crate) fn format_age(elapsed: chrono::Duration) -> String {
    let total_secs = elapsed.num_seconds();
    if total_secs < 60 {
        "just now".to_string()
    } else if total_secs < 3600 {
        format!("{}m ago", total_secs / 60)
    } else if total_secs < 86_400 {
        format!("{}h ago", total_secs / 3600)
    } else if total_secs < 86_400 * 30 {
        format!("{}d ago", total_secs / 86_400)
    } else if total_secs < 86_400 * 365 {
        format!("{}mo ago", total_secs / (86_400 * 30))
    } else {
        format!("{}y ago", total_secs / (86_400 * 365))
    }
}
