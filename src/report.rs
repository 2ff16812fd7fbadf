use crate::{
    eligibility::EligibilityReport, extract::PageStats, probe::ProbeInput, record::CourseRecord,
};
use serde::{Deserialize, Serialize};

pub const NO_RECORDS: &str = "No course records found in the document.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub input: ProbeInput,
    pub pages: PageStats,
    pub record_count: usize,
    pub records: Vec<CourseRecord>,
    /// `None` when nothing could be extracted.
    pub eligibility: Option<EligibilityReport>,
}

impl JobReport {
    pub fn render(&self) -> String {
        match &self.eligibility {
            Some(e) => e.render(),
            None => NO_RECORDS.to_string(),
        }
    }
}
