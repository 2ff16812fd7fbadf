use crate::config::Config;
use anyhow::{anyhow, Result};
use std::path::Path;

/// Gatekeeper for user-supplied transcript paths: no URLs, must exist,
/// extension on the allow-list.
pub fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }

    if !input.exists() {
        return Err(anyhow!("input does not exist: {}", input.display()));
    }

    match input.extension().and_then(|s| s.to_str()) {
        Some(ext) if extension_allowed(cfg, ext) => Ok(()),
        Some(_) => Err(anyhow!("input has a disallowed extension: {}", input.display())),
        None => Err(anyhow!("input has no extension: {}", input.display())),
    }
}

pub fn extension_allowed(cfg: &Config, ext: &str) -> bool {
    cfg.security
        .allowed_extensions
        .iter()
        .any(|a| a.eq_ignore_ascii_case(ext))
}

pub fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}
