use crate::{config::Curriculum, record::CourseRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

pub const SUCCESS_MARKER: &str = "Graduation requirements satisfied ✅";
pub const FAILURE_HEADER: &str = "❌ Missing graduation requirements:";
pub const WARNINGS_HEADER: &str = "Warnings:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deficiency {
    InsufficientEcts { total: Decimal, required: Decimal },
    RepeatedCourses,
    MissingUniversityElective { found: usize, required: usize },
    MissingFacultyElective { found: usize, required: usize },
    MissingDepartmentalElectives { found: usize, required: usize },
    InternshipNotCompleted { codes: Vec<String> },
    InsufficientInternship { code: String },
    FailedCourses { codes: Vec<String> },
}

impl Deficiency {
    /// Everything except the repeated-course warning blocks graduation.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Deficiency::RepeatedCourses)
    }
}

impl fmt::Display for Deficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deficiency::InsufficientEcts { total, required } => write!(
                f,
                "Total ECTS is {total}; at least {required} ECTS is required for graduation."
            ),
            Deficiency::RepeatedCourses => f.write_str(
                "The same course was taken more than once. Repeated courses should be reviewed.",
            ),
            Deficiency::MissingUniversityElective { found, required } => write!(
                f,
                "At least {required} university elective course(s) required; found {found}."
            ),
            Deficiency::MissingFacultyElective { found, required } => write!(
                f,
                "At least {required} faculty elective course(s) required; found {found}."
            ),
            Deficiency::MissingDepartmentalElectives { found, required } => write!(
                f,
                "At least {required} departmental elective courses required. Currently {found}."
            ),
            Deficiency::InternshipNotCompleted { codes } => {
                write!(f, "Summer internship ({}) not completed.", codes.join(" or "))
            }
            Deficiency::InsufficientInternship { code } => {
                write!(f, "Summer internship {code} graded insufficient (YZ).")
            }
            Deficiency::FailedCourses { codes } => {
                write!(f, "Failed course(s): {}", codes.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityReport {
    pub satisfied: bool,
    pub deficiencies: Vec<Deficiency>,
}

impl EligibilityReport {
    fn new(deficiencies: Vec<Deficiency>) -> Self {
        Self {
            satisfied: !deficiencies.iter().any(Deficiency::is_blocking),
            deficiencies,
        }
    }

    /// Human-readable verdict. On failure, the header is followed by one
    /// `- ` line per deficiency. On success, any non-blocking items are
    /// listed under a separate `Warnings:` line.
    pub fn render(&self) -> String {
        let mut out = if self.satisfied {
            let mut s = SUCCESS_MARKER.to_string();
            if !self.deficiencies.is_empty() {
                s.push('\n');
                s.push_str(WARNINGS_HEADER);
            }
            s
        } else {
            FAILURE_HEADER.to_string()
        };
        for d in &self.deficiencies {
            out.push_str("\n- ");
            out.push_str(&d.to_string());
        }
        out
    }
}

/// One entry per distinct code; a later record overrides an earlier one.
pub fn deduplicate(records: &[CourseRecord]) -> BTreeMap<&str, &CourseRecord> {
    let mut unique = BTreeMap::new();
    for r in records {
        unique.insert(r.code.as_str(), r);
    }
    unique
}

/// Runs every rule; none short-circuits.
pub fn evaluate(curriculum: &Curriculum, records: &[CourseRecord]) -> EligibilityReport {
    let unique = deduplicate(records);
    let mut deficiencies = Vec::new();

    let total_ects: Decimal = unique.values().map(|r| r.ects).sum();
    if total_ects < curriculum.min_total_ects {
        deficiencies.push(Deficiency::InsufficientEcts {
            total: total_ects,
            required: curriculum.min_total_ects,
        });
    }

    if unique.len() != records.len() {
        deficiencies.push(Deficiency::RepeatedCourses);
    }

    let university = count_prefixed(&unique, &curriculum.university_elective_prefixes);
    if university < curriculum.min_university_electives {
        deficiencies.push(Deficiency::MissingUniversityElective {
            found: university,
            required: curriculum.min_university_electives,
        });
    }

    let faculty = count_prefixed(&unique, &curriculum.faculty_elective_prefixes);
    if faculty < curriculum.min_faculty_electives {
        deficiencies.push(Deficiency::MissingFacultyElective {
            found: faculty,
            required: curriculum.min_faculty_electives,
        });
    }

    let departmental = unique
        .keys()
        .filter(|code| curriculum.departmental_electives.iter().any(|e| e.as_str() == **code))
        .count();
    if departmental < curriculum.min_departmental_electives {
        deficiencies.push(Deficiency::MissingDepartmentalElectives {
            found: departmental,
            required: curriculum.min_departmental_electives,
        });
    }

    let internships: Vec<&CourseRecord> = unique
        .values()
        .copied()
        .filter(|r| is_internship(curriculum, &r.code))
        .collect();
    if internships.is_empty() {
        deficiencies.push(Deficiency::InternshipNotCompleted {
            codes: curriculum.internship_codes.clone(),
        });
    }
    for r in internships.iter().filter(|r| r.grade.is_insufficient()) {
        deficiencies.push(Deficiency::InsufficientInternship {
            code: r.code.clone(),
        });
    }

    let failed: BTreeSet<&str> = unique
        .values()
        .filter(|r| r.grade.is_failing() && !is_internship(curriculum, &r.code))
        .map(|r| r.code.as_str())
        .collect();
    if !failed.is_empty() {
        deficiencies.push(Deficiency::FailedCourses {
            codes: failed.into_iter().map(String::from).collect(),
        });
    }

    debug!(
        %total_ects,
        university, faculty, departmental,
        deficiencies = deficiencies.len(),
        "eligibility evaluated"
    );

    EligibilityReport::new(deficiencies)
}

fn count_prefixed(unique: &BTreeMap<&str, &CourseRecord>, prefixes: &[String]) -> usize {
    unique
        .keys()
        .filter(|code| prefixes.iter().any(|p| code.starts_with(p.as_str())))
        .count()
}

fn is_internship(curriculum: &Curriculum, code: &str) -> bool {
    curriculum.internship_codes.iter().any(|c| c == code)
}
