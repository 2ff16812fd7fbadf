use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    AA,
    BA,
    BB,
    CB,
    CC,
    DC,
    DD,
    FD,
    FF,
    /// Pass / transferred.
    YT,
    /// Insufficient.
    YZ,
}

impl Grade {
    /// Alternation used inside the extraction patterns.
    pub const PATTERN: &'static str = "YT|YZ|AA|BA|BB|CB|CC|DC|DD|FD|FF";

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::AA => "AA",
            Grade::BA => "BA",
            Grade::BB => "BB",
            Grade::CB => "CB",
            Grade::CC => "CC",
            Grade::DC => "DC",
            Grade::DD => "DD",
            Grade::FD => "FD",
            Grade::FF => "FF",
            Grade::YT => "YT",
            Grade::YZ => "YZ",
        }
    }

    pub fn is_failing(self) -> bool {
        matches!(self, Grade::FD | Grade::FF | Grade::YZ)
    }

    pub fn is_insufficient(self) -> bool {
        self == Grade::YZ
    }
}

impl FromStr for Grade {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "AA" => Grade::AA,
            "BA" => Grade::BA,
            "BB" => Grade::BB,
            "CB" => Grade::CB,
            "CC" => Grade::CC,
            "DC" => Grade::DC,
            "DD" => Grade::DD,
            "FD" => Grade::FD,
            "FF" => Grade::FF,
            "YT" => Grade::YT,
            "YZ" => Grade::YZ,
            other => return Err(anyhow!("unknown grade: {other}")),
        })
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub code: String,
    pub name: String,
    pub credit: Decimal,
    pub ects: Decimal,
    pub grade: Grade,
}

impl CourseRecord {
    pub fn new(code: &str, name: &str, credit: Decimal, ects: Decimal, grade: Grade) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            credit,
            ects,
            grade,
        }
    }
}

/// Parses a credit/ECTS field exactly. Rejects anything that is not a
/// non-negative decimal.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let v: Decimal = raw.trim().parse().ok()?;
    (!v.is_sign_negative()).then_some(v)
}
