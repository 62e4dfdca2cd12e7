//! Pre-save validation of the working set

use std::fmt;

use apu_model::ResourceLine;
use serde::{Deserialize, Serialize};

/// How many names a message lists before collapsing the rest
const LISTED_NAMES: usize = 3;

/// Rows failing validation, grouped by class
///
/// Every failing row is collected; a row may appear in several classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub unselected: Vec<String>,
    pub missing_quantity: Vec<String>,
    pub missing_price: Vec<String>,
    pub missing_crew_size: Vec<String>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.unselected.len()
            + self.missing_quantity.len()
            + self.missing_price.len()
            + self.missing_crew_size.len()
    }

    /// One message per non-empty class
    pub fn messages(&self) -> Vec<String> {
        [
            ("Unselected resources", &self.unselected),
            ("Missing quantity", &self.missing_quantity),
            ("Missing price", &self.missing_price),
            ("Missing crew size", &self.missing_crew_size),
        ]
        .into_iter()
        .filter(|(_, names)| !names.is_empty())
        .map(|(label, names)| format!("{}: {}", label, summarize(names)))
        .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("\n"))
    }
}

/// `a, b, c` or `a, b and N more`
fn summarize(names: &[String]) -> String {
    if names.len() <= LISTED_NAMES {
        return names.join(", ");
    }
    format!("{} and {} more", names[..2].join(", "), names.len() - 2)
}

/// Check every line and collect failures per class.
///
/// Unselected rows are named by 1-based position and reported only in that
/// class. Every other check runs on resolved rows, named by description.
pub fn validate(lines: &[ResourceLine]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (index, line) in lines.iter().enumerate() {
        if !line.is_resolved() {
            report.unselected.push(format!("Row {}", index + 1));
            continue;
        }

        let name = line.description.trim().to_string();
        if line.quantity <= 0.0 {
            report.missing_quantity.push(name.clone());
        }
        if line.unit_price <= 0.0 {
            report.missing_price.push(name.clone());
        }
        if line.is_crew_paired() && line.crew_size.is_none_or(|c| c <= 0.0) {
            report.missing_crew_size.push(name);
        }
    }

    if !report.is_empty() {
        tracing::debug!(failures = report.total(), "Validation failed");
    }
    report
}
