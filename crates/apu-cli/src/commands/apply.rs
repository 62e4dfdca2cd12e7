//! Apply command implementation

use std::path::Path;

use apu_core::{EngineConfig, FileStore};
use colored::Colorize;
use serde_json::json;

use super::compute::print_totals;
use super::editor_over_store;
use crate::draft::Draft;
use crate::error::Result;

/// Run the apply command
///
/// Validation failures abort before the store is written.
pub async fn run_apply(
    draft_path: &Path,
    store_path: &Path,
    config: EngineConfig,
    json: bool,
) -> Result<()> {
    let draft = Draft::load(draft_path)?;
    let store = FileStore::open(store_path)?;
    let mut editor = editor_over_store(&draft, &store, config).await?;

    let outcome = editor.save(&store).await?;
    let totals = editor.totals();

    if json {
        let output = json!({
            "line_item": draft.line_item.id,
            "apu": editor.apu_id(),
            "changes": outcome.change_count(),
            "outcome": outcome,
            "totals": totals,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if outcome.is_empty() {
        println!("{} No changes needed. APU is up to date.", "OK".green().bold());
    } else {
        println!(
            "{} Saved {} change(s) to {}",
            "OK".green().bold(),
            outcome.change_count(),
            store_path.display().to_string().yellow()
        );
        if let Some(apu) = &outcome.created_apu {
            println!("  created APU {}", apu.cyan());
        }
    }
    println!();
    print_totals(&totals);
    Ok(())
}
