use ghsearch::ProfileLoader;

use crate::commands::output::{OutputFormat, render_profile};
use crate::commands::shared::build_client;
use crate::config::Config;

/// Load a user's detail and repositories, then print both.
///
/// Either half may fail on its own; the command only errors when both do.
pub(crate) async fn handle_profile(
    username: &str,
    output: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(config)?;
    let loader = ProfileLoader::new(client, username);

    let (detail, repos) = loader.load_all();
    detail.await?;
    repos.await?;

    let snapshot = loader.snapshot();
    println!("{}", render_profile(&snapshot, output, chrono::Utc::now())?);

    if snapshot.detail.error.is_some() && snapshot.repositories.error.is_some() {
        return Err(format!("Failed to load profile for {username}").into());
    }
    Ok(())
}
