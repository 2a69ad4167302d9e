use ghsearch::SearchPipeline;

use crate::commands::output::{OutputFormat, render_users};
use crate::commands::shared::{build_client, search_options};
use crate::config::Config;

/// Run one search and print the results.
pub(crate) async fn handle_search(
    query: &str,
    output: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    if query.is_empty() {
        return Err("Search query must not be empty".into());
    }

    let client = build_client(config)?;
    let pipeline = SearchPipeline::spawn_with(client, search_options(config));
    let mut updates = pipeline.subscribe();

    pipeline.search_now(query);
    let snapshot = updates
        .wait_for(|s| s.has_searched() && !s.is_loading())
        .await?
        .clone();

    if let Some(message) = snapshot.error_message() {
        return Err(message.into());
    }

    if snapshot.displayed_users().is_empty() && output == OutputFormat::Table {
        println!("No users found");
        return Ok(());
    }

    println!(
        "{}",
        render_users(snapshot.displayed_users(), snapshot.favorites(), output)?
    );
    Ok(())
}
