pub mod pdf;
pub mod python;
pub mod types;

use crate::config::Config;
use anyhow::{anyhow, Result};
use std::path::Path;

pub use types::{EngineDiag, PageText, PagesOut};

/// Document-to-text boundary: one entry per page, `text: None` when a page
/// yields nothing extractable.
pub trait Engine {
    fn doctor(&self) -> Result<EngineDiag>;
    fn page_texts(&self, input: &Path) -> Result<Vec<PageText>>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn doctor(&self) -> Result<EngineDiag> {
        (**self).doctor()
    }

    fn page_texts(&self, input: &Path) -> Result<Vec<PageText>> {
        (**self).page_texts(input)
    }
}

pub fn from_config(cfg: &Config) -> Result<Box<dyn Engine>> {
    match cfg.engine.backend.as_str() {
        "lopdf" => Ok(Box::new(pdf::LopdfEngine::new())),
        "pdfplumber" => Ok(Box::new(python::PythonEngine::new(cfg)?)),
        other => Err(anyhow!("unknown engine.backend: {other}")),
    }
}
