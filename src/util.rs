use crate::config::Config;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    format!("{:x}", h.finalize())
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub fn hash_file(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| "open file")?;
    let mut h = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        h.update(&buf[..n]);
    }
    Ok(format!("{:x}", h.finalize()))
}

/// Reduces an uploaded filename to `[A-Za-z0-9._-]`, with no leading dots
/// or separators, so it can't escape the staging directory.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Copies `input` into `paths.staging_dir` under a sanitized name.
pub fn stage_input(cfg: &Config, input: &Path) -> Result<PathBuf> {
    let staging = PathBuf::from(&cfg.paths.staging_dir);
    ensure_dir(&staging)?;

    let raw_name = input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let mut name = sanitize_filename(raw_name);
    if name.is_empty() {
        name = "upload.pdf".to_string();
    }

    let dest = staging.join(name);
    std::fs::copy(input, &dest)
        .with_context(|| format!("staging {} -> {}", input.display(), dest.display()))?;
    Ok(dest)
}
