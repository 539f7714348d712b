use std::path::PathBuf;

use anyhow::{Context, Result};
use ergoswap_sync::Side;
use serde::Deserialize;

/// One step of an edit script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Change the asset and/or amount of one side
    Edit {
        side: Side,
        #[serde(default)]
        asset: Option<String>,
        #[serde(default)]
        amount: Option<String>,
    },
    Submit,
}

pub fn load_script(path: &PathBuf) -> Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {:?}", path))?;
    let steps: Vec<Step> = serde_json::from_str(&content)?;
    Ok(steps)
}
