use crate::{
    config::Config,
    eligibility,
    engine::{Engine, PageText},
    extract::Extractor,
    probe::{self, ProbeInput},
    report::JobReport,
};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// One transcript, start to finish. Holds no state between jobs beyond its
/// configuration.
pub struct Pipeline<E: Engine> {
    cfg: Config,
    engine: E,
    extractor: Extractor,
}

pub struct JobOutput {
    pub report: JobReport,
    /// Normalized text the extractor scanned.
    pub text: String,
}

impl<E: Engine> Pipeline<E> {
    pub fn new(cfg: &Config, engine: E) -> Result<Self> {
        let extractor = Extractor::new(cfg).with_context(|| "building extractor")?;
        Ok(Self {
            cfg: cfg.clone(),
            engine,
            extractor,
        })
    }

    pub fn run_job(&self, input: &Path) -> Result<JobOutput> {
        let started = Instant::now();

        let probe_res = probe::probe_input(&self.cfg, input)?;
        info!(
            "input {} file_bytes={}",
            probe_res.path, probe_res.file_bytes
        );

        let pages = self
            .engine
            .page_texts(input)
            .with_context(|| format!("extracting page text: {}", input.display()))?;

        if pages.len() as u64 > u64::from(self.cfg.limits.max_input_pages) {
            return Err(anyhow!("input exceeds max_input_pages: {}", pages.len()));
        }

        let out = self.process_pages(probe_res, &pages);
        info!("job finished in {:?}", started.elapsed());
        Ok(out)
    }

    /// Extraction and evaluation over pages already pulled from the engine.
    pub fn process_pages(&self, input: ProbeInput, pages: &[PageText]) -> JobOutput {
        let extraction = self.extractor.extract_pages(pages);

        let eligibility = if extraction.records.is_empty() {
            warn!("no course records found in {}", input.path);
            None
        } else {
            let verdict = eligibility::evaluate(&self.cfg.curriculum, &extraction.records);
            info!(
                "eligibility satisfied={} deficiencies={}",
                verdict.satisfied,
                verdict.deficiencies.len()
            );
            Some(verdict)
        };

        let report = JobReport {
            input,
            pages: extraction.stats,
            record_count: extraction.records.len(),
            records: extraction.records,
            eligibility,
        };

        JobOutput {
            report,
            text: extraction.text,
        }
    }
}
