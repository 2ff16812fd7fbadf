use super::{types::*, Engine};
use anyhow::{anyhow, Result};
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

/// In-process text extraction.
pub struct LopdfEngine;

impl LopdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LopdfEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for LopdfEngine {
    fn doctor(&self) -> Result<EngineDiag> {
        Ok(EngineDiag {
            backend: "lopdf".into(),
            version: None,
            ok: true,
            error: None,
        })
    }

    fn page_texts(&self, input: &Path) -> Result<Vec<PageText>> {
        let doc = Document::load(input)
            .map_err(|e| anyhow!("loading PDF {}: {e}", input.display()))?;

        let mut pages = Vec::new();
        for (page_number, _page_id) in doc.get_pages() {
            let text = match doc.extract_text(&[page_number]) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("page {page_number}: text extraction failed: {e}");
                    None
                }
            };
            debug!(
                "page {page_number}: {} chars",
                text.as_deref().map(str::len).unwrap_or(0)
            );
            pages.push(PageText { page_number, text });
        }
        Ok(pages)
    }
}
