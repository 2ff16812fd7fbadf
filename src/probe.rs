use crate::config::Config;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeInput {
    pub path: String,
    pub file_bytes: u64,
}

pub fn probe_input(cfg: &Config, input: &Path) -> Result<ProbeInput> {
    let meta = std::fs::metadata(input).with_context(|| "stat input")?;
    let file_bytes = meta.len();
    if file_bytes > cfg.limits.max_input_file_bytes {
        anyhow::bail!("input exceeds max_input_file_bytes: {}", file_bytes);
    }
    if file_bytes == 0 {
        anyhow::bail!("input is empty: {}", input.display());
    }

    Ok(ProbeInput {
        path: input.display().to_string(),
        file_bytes,
    })
}
