use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub normalize: Normalize,
    #[serde(default)]
    pub extract: Extract,
    #[serde(default)]
    pub curriculum: Curriculum,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub resume: bool,
    pub stage_inputs: bool,
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            resume: true,
            stage_inputs: false,
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub out_dir: String,
    pub staging_dir: String,
    pub scripts_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
            staging_dir: "uploads".into(),
            scripts_dir: "scripts".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub max_input_file_bytes: u64,
    pub max_input_pages: u32,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_file_bytes: 50 * 1024 * 1024,
            max_input_pages: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    /// `lopdf` (in-process) or `pdfplumber` (python subprocess).
    pub backend: String,
    pub python_exe: String,
    pub timeout_seconds: u64,
}
impl Default for Engine {
    fn default() -> Self {
        Self {
            backend: "lopdf".into(),
            python_exe: "python3".into(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Normalize {
    pub normalize_newlines: bool,
    pub normalize_unicode: bool,
    pub trim_trailing_whitespace: bool,
    /// Glyph code (as it appears inside `(cid:N)`) to replacement character.
    pub cid_map: BTreeMap<String, char>,
}
impl Default for Normalize {
    fn default() -> Self {
        Self {
            normalize_newlines: true,
            normalize_unicode: true,
            trim_trailing_whitespace: true,
            cid_map: BTreeMap::from([("248".into(), 'İ'), ("213".into(), 'ı')]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extract {
    pub department_prefixes: Vec<String>,
    pub override_window_chars: usize,
    #[serde(default)]
    pub overrides: Vec<CourseOverride>,
}
impl Default for Extract {
    fn default() -> Self {
        Self {
            department_prefixes: ["AIB", "BM", "FIZ", "ING", "MAT", "TDB", "KRP", "MS", "US", "SE"]
                .into_iter()
                .map(String::from)
                .collect(),
            override_window_chars: 240,
            overrides: Vec::new(),
        }
    }
}

/// Trusted name/credit/ECTS for a course whose row the generic pattern
/// cannot read. The grade is still taken from the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOverride {
    pub code: String,
    pub name: String,
    pub credit: Decimal,
    pub ects: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curriculum {
    pub min_total_ects: Decimal,
    pub university_elective_prefixes: Vec<String>,
    pub min_university_electives: usize,
    pub faculty_elective_prefixes: Vec<String>,
    pub min_faculty_electives: usize,
    pub departmental_electives: Vec<String>,
    pub min_departmental_electives: usize,
    pub internship_codes: Vec<String>,
}
impl Default for Curriculum {
    fn default() -> Self {
        Self {
            min_total_ects: Decimal::from(240),
            university_elective_prefixes: vec!["US".into()],
            min_university_electives: 1,
            faculty_elective_prefixes: vec!["MS".into()],
            min_faculty_electives: 1,
            departmental_electives: DEPARTMENTAL_ELECTIVES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            min_departmental_electives: 10,
            internship_codes: vec!["BM399".into(), "BM499".into()],
        }
    }
}

const DEPARTMENTAL_ELECTIVES: &[&str] = &[
    "BM420", "BM421", "BM422", "BM423", "BM424", "BM425", "BM426", "BM427", "BM428", "BM429",
    "BM430", "BM431", "BM432", "BM433", "BM434", "BM435", "BM436", "BM437", "BM438", "BM439",
    "BM440", "BM441", "BM442", "BM443", "BM444", "BM445", "BM447", "BM449", "BM451", "BM453",
    "BM455", "BM457", "BM459", "BM461", "BM463", "BM465", "BM467", "BM469", "BM470", "BM471",
    "BM472", "BM473", "BM474", "BM475", "BM476", "BM477", "BM478", "BM479", "BM480", "BM481",
    "BM482", "BM483", "BM485", "BM486", "BM487", "BM488", "BM489", "BM490", "BM491", "BM492",
    "BM493", "BM494", "BM495", "BM496", "MTH401",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub write_records_json: bool,
    pub write_report_json: bool,
    pub write_report_text: bool,
    pub write_index_json: bool,
    pub records_filename: String,
    pub report_filename: String,
    pub report_text_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_records_json: true,
            write_report_json: true,
            write_report_text: true,
            write_index_json: true,
            records_filename: "records.json".into(),
            report_filename: "report.json".into(),
            report_text_filename: "report.txt".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debug {
    pub keep_python_stderr: bool,
    pub dump_effective_config: bool,
    pub dump_normalized_text: bool,
}
impl Default for Debug {
    fn default() -> Self {
        Self {
            keep_python_stderr: true,
            dump_effective_config: true,
            dump_normalized_text: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub reject_url_inputs: bool,
    pub pin_scripts_dir: bool,
    pub allowed_extensions: Vec<String>,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
            pin_scripts_dir: true,
            allowed_extensions: vec!["pdf".into()],
        }
    }
}
