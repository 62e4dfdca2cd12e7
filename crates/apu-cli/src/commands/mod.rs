//! Command implementations for apu-cli

pub mod apply;
pub mod compute;
pub mod plan;

pub use apply::run_apply;
pub use compute::run_compute;
pub use plan::run_plan;

use std::path::Path;

use apu_core::{ApuEditor, EngineConfig, FileStore};

use crate::draft::Draft;
use crate::error::Result;

/// Load the engine configuration, or defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Open the store, load the draft's APU from it and apply the draft on top
async fn editor_over_store(
    draft: &Draft,
    store: &FileStore,
    config: EngineConfig,
) -> Result<ApuEditor> {
    let mut editor = ApuEditor::new(draft.line_item.clone(), config);
    editor.load(store).await?;

    let params = draft.params.unwrap_or(editor.params());
    let lines = draft.resource_lines(&params)?;
    editor.replace_working(params, lines)?;
    Ok(editor)
}
