//! APU CLI
//!
//! Computes unit-price analyses from draft files and reconciles them with a
//! JSON store.

mod cli;
mod commands;
mod draft;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Some(cmd) => execute_command(cmd, config),
        None => {
            println!("{} Unit-price analysis CLI", "apu".green().bold());
            println!();
            println!("Run {} for available commands.", "apu --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, config: apu_core::EngineConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cmd {
        Commands::Compute { draft } => commands::run_compute(&draft.draft, config, draft.json),
        Commands::Plan { draft, store } => {
            runtime.block_on(commands::run_plan(&draft.draft, &store, config, draft.json))
        }
        Commands::Apply { draft, store } => {
            runtime.block_on(commands::run_apply(&draft.draft, &store, config, draft.json))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DRAFT: &str = r#"
[line_item]
id = "li-1"
project = "p-1"
budget = "b-1"

[[lines]]
resource = "sand"
description = "Arena"
type = "MT"
unit = "m3"
unit_price = 40.0
quantity = 0.5
"#;

    #[test]
    fn compute_runs_without_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("draft.toml");
        fs::write(&path, DRAFT).unwrap();
        assert!(commands::run_compute(&path, apu_core::EngineConfig::default(), true).is_ok());
    }

    #[test]
    fn apply_creates_apu_in_file_store() {
        let dir = TempDir::new().unwrap();
        let draft = dir.path().join("draft.toml");
        let store = dir.path().join("store.json");
        fs::write(&draft, DRAFT).unwrap();
        apu_core::FileStore::create(&store, &apu_core::StoreDocument::new()).unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let config = apu_core::EngineConfig::default();
        runtime
            .block_on(commands::run_apply(&draft, &store, config, true))
            .unwrap();

        let doc = apu_core::FileStore::open(&store).unwrap().load().unwrap();
        let apu = doc.apu_for("li-1").unwrap();
        assert_eq!(apu.lines.len(), 1);
        assert_eq!(apu.lines[0].partial_cost, 20.0);
    }

    #[test]
    fn missing_draft_is_a_user_error() {
        let err = commands::run_compute(
            std::path::Path::new("/nonexistent/draft.toml"),
            apu_core::EngineConfig::default(),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Draft not found"));
    }
}
