//! Shell completions and man pages, both generated from the clap definition.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

use crate::Cli;

const BIN_NAME: &str = "ghsearch";

/// Subcommands that get a page of their own, in definition order.
fn documented_subcommands() -> Vec<String> {
    Cli::command()
        .get_subcommands()
        .filter(|c| !c.is_hide_set())
        .map(|c| c.get_name().to_string())
        .collect()
}

fn write_completions(shell: clap_complete::Shell, out: &mut impl Write) {
    clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, out);
}

fn write_man_page(out: &mut impl Write) -> std::io::Result<()> {
    clap_mangen::Man::new(Cli::command()).render(out)
}

fn write_man_pages(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    clap_mangen::generate_to(Cli::command(), dir)?;
    tracing::debug!(
        dir = %dir.display(),
        subcommands = ?documented_subcommands(),
        "Generated man pages"
    );
    Ok(())
}

pub(crate) fn handle_completions(
    shell: clap_complete::Shell,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    write_completions(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

pub(crate) fn handle_man(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(dir) => {
            write_man_pages(&dir)?;
            println!("Generated man pages in: {}", dir.display());
        }
        None => write_man_page(&mut std::io::stdout().lock())?,
    }
    Ok(())
}
