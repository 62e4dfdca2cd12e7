//! Compute command implementation
//!
//! Recomputes a draft in memory and prints every line with the totals.

use std::path::Path;

use apu_core::{ApuEditor, ApuTotals, EngineConfig, validate};
use apu_model::{ResourceLine, ResourceType};
use colored::Colorize;
use serde_json::json;

use crate::draft::Draft;
use crate::error::Result;

/// Run the compute command
pub fn run_compute(draft_path: &Path, config: EngineConfig, json: bool) -> Result<()> {
    let draft = Draft::load(draft_path)?;
    let params = draft.params.unwrap_or(config.default_params());

    let mut editor = ApuEditor::new(draft.line_item.clone(), config);
    editor.replace_working(params, draft.resource_lines(&params)?)?;

    let lines = editor.lines();
    let totals = editor.totals();
    let warnings = validate(&lines).messages();

    if json {
        let output = json!({
            "line_item": draft.line_item.id,
            "params": params,
            "lines": lines,
            "totals": totals,
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} {} (rendimiento {}, jornada {})",
            "APU".blue().bold(),
            draft.line_item.id.yellow(),
            params.rendimiento,
            params.jornada
        );
        println!();
        print_lines(&lines);
        println!();
        print_totals(&totals);

        if !warnings.is_empty() {
            println!();
            println!("{}", "Not ready to save:".yellow().bold());
            for warning in &warnings {
                println!("  {} {}", "!".yellow(), warning);
            }
        }
    }

    Ok(())
}

pub(crate) fn print_lines(lines: &[ResourceLine]) {
    if lines.is_empty() {
        println!("  (no resource lines)");
        return;
    }
    for line in lines {
        let crew = line
            .crew_size
            .map(|c| format!(" crew {}", c))
            .unwrap_or_default();
        println!(
            "  {} {:<30} {:>6} {:>12.4} x {:>10.2} = {:>12.2}{}",
            line.resource_type.abbreviation().cyan(),
            line.description,
            line.unit,
            line.quantity,
            line.unit_price,
            line.partial_cost,
            crew.dimmed()
        );
    }
}

pub(crate) fn print_totals(totals: &ApuTotals) {
    for resource_type in ResourceType::ALL {
        let amount = totals.for_type(resource_type);
        if amount != 0.0 {
            println!("  {:<12} {:>12.2}", resource_type.to_string(), amount);
        }
    }
    println!("  {} {:>12.2}", format!("{:<12}", "Direct cost").bold(), totals.direct);
}
