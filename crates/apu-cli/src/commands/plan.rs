//! Plan command implementation
//!
//! Previews what saving a draft would change without applying it.

use std::path::Path;

use apu_core::{EngineConfig, FileStore, RowOperation, SavePlan};
use colored::Colorize;

use super::editor_over_store;
use crate::draft::Draft;
use crate::error::Result;

/// Run the plan command
pub async fn run_plan(
    draft_path: &Path,
    store_path: &Path,
    config: EngineConfig,
    json: bool,
) -> Result<()> {
    let draft = Draft::load(draft_path)?;
    let store = FileStore::open(store_path)?;
    let editor = editor_over_store(&draft, &store, config).await?;
    let plan = editor.plan()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan, &draft.line_item.id, editor.apu_id());
    }
    Ok(())
}

fn print_plan(plan: &SavePlan, line_item: &str, apu_id: Option<&str>) {
    if plan.is_empty() {
        println!("{} No changes needed. APU is up to date.", "OK".green().bold());
        return;
    }

    println!(
        "{} {} ({})",
        "Plan".blue().bold(),
        line_item.yellow(),
        apu_id.unwrap_or("new APU").cyan()
    );
    println!();

    if let Some(creation) = &plan.create_apu {
        println!(
            "  {} {}",
            "+".green(),
            format!("create APU with {} lines", creation.request.lines.len()).green()
        );
        for line in &creation.request.lines {
            println!("    {} {} (order {})", "+".green(), line.description, line.order);
        }
    }

    if let Some(update) = &plan.params_update {
        let mut fields = Vec::new();
        if let Some(r) = update.rendimiento {
            fields.push(format!("rendimiento={}", r));
        }
        if let Some(j) = update.jornada {
            fields.push(format!("jornada={}", j));
        }
        println!("  {} {}", "~".yellow(), format!("parameters {}", fields.join(" ")).yellow());
    }

    for op in &plan.operations {
        match op {
            RowOperation::Create { payload, .. } => println!(
                "  {} {}",
                "+".green(),
                format!("create {} (order {})", payload.description, payload.order).green()
            ),
            RowOperation::Update { id, payload } => println!(
                "  {} {}",
                "~".yellow(),
                format!("update {} {} (order {})", id, payload.description, payload.order).yellow()
            ),
            RowOperation::Delete { id } => {
                println!("  {} {}", "-".red(), format!("delete {}", id).red())
            }
        }
    }

    println!();
    println!("{} change(s). Run {} to save them.", plan.change_count(), "apu apply".cyan());
}
