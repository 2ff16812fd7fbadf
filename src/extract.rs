use crate::{
    config::{Config, CourseOverride, Normalize},
    engine::PageText,
    normalize,
    record::{parse_decimal, CourseRecord, Grade},
};
use anyhow::{anyhow, Context, Result};
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Recovers [`CourseRecord`]s from transcript text.
///
/// Only construction can fail (bad configuration). Extraction skips rows
/// that do not match or whose numbers do not parse.
pub struct Extractor {
    normalize: Normalize,
    row: Regex,
    code: Regex,
    triplet: Regex,
    overrides: Vec<Override>,
    override_window_chars: usize,
}

struct Override {
    entry: CourseOverride,
    pattern: Regex,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageStats {
    pub page_count: u32,
    pub pages_with_text: u32,
    pub cid_escapes: u32,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub records: Vec<CourseRecord>,
    pub stats: PageStats,
    /// Normalized pages joined with `\n`, as scanned.
    pub text: String,
}

impl Extractor {
    pub fn new(cfg: &Config) -> Result<Self> {
        let prefixes = &cfg.extract.department_prefixes;
        if prefixes.is_empty() {
            return Err(anyhow!("extract.department_prefixes is empty"));
        }
        let prefix_alt = prefixes
            .iter()
            .map(|p| regex::escape(p.trim()))
            .collect::<Vec<_>>()
            .join("|");

        let row = Regex::new(&format!(
            r"\b(?P<code>(?:{prefix_alt})\d{{3}})[ \t]+(?P<name>[\p{{L}}\p{{M}} .\-]+?)[ \t]+(?P<credit>\d+\.\d{{1,2}})[ \t]+(?P<ects>\d+\.\d{{1,2}})[ \t]+(?P<grade>{grades})\b",
            grades = Grade::PATTERN,
        ))
        .with_context(|| "compiling course row pattern")?;

        let mut code_alt = vec![format!(r"\b(?:{prefix_alt})\d{{3}}")];
        let mut overrides = Vec::new();
        for entry in &cfg.extract.overrides {
            let code = entry.code.trim();
            if code.is_empty() {
                return Err(anyhow!("extract.overrides entry with empty code"));
            }
            if !valid_amount(entry.credit) || !valid_amount(entry.ects) {
                return Err(anyhow!("override {code} has invalid credit/ects"));
            }
            let escaped = format!(r"\b{}", regex::escape(code));
            let pattern = Regex::new(&escaped)
                .with_context(|| format!("compiling override pattern for {code}"))?;
            code_alt.push(escaped);
            overrides.push(Override {
                entry: CourseOverride {
                    code: code.to_string(),
                    ..entry.clone()
                },
                pattern,
            });
        }

        let code = Regex::new(&code_alt.join("|")).with_context(|| "compiling course code pattern")?;

        let triplet = Regex::new(&format!(
            r"(?P<credit>\d+\.\d{{1,2}})\s+(?P<ects>\d+\.\d{{1,2}})\s+(?P<grade>{grades})\b",
            grades = Grade::PATTERN,
        ))
        .with_context(|| "compiling override triplet pattern")?;

        Ok(Self {
            normalize: cfg.normalize.clone(),
            row,
            code,
            triplet,
            overrides,
            override_window_chars: cfg.extract.override_window_chars,
        })
    }

    pub fn extract_pages(&self, pages: &[PageText]) -> Extraction {
        let mut stats = PageStats {
            page_count: pages.len() as u32,
            ..Default::default()
        };
        let mut parts = Vec::new();

        for page in pages {
            let Some(raw) = page.text.as_deref().filter(|t| !t.trim().is_empty()) else {
                debug!("page {} has no extractable text; skipping", page.page_number);
                continue;
            };
            stats.pages_with_text += 1;
            stats.cid_escapes += normalize::count_cid_escapes(raw) as u32;
            parts.push(normalize::normalize_page(&self.normalize, raw));
        }

        let text = parts.join("\n");
        let records = self.extract_text(&text);

        info!(
            "extracted {} records from {}/{} pages (cid escapes repaired: {})",
            records.len(),
            stats.pages_with_text,
            stats.page_count,
            stats.cid_escapes
        );

        Extraction {
            records,
            stats,
            text,
        }
    }

    /// Scans already-normalized text. Records come back in document order.
    pub fn extract_text(&self, text: &str) -> Vec<CourseRecord> {
        let override_codes: BTreeSet<&str> = self
            .overrides
            .iter()
            .map(|o| o.entry.code.as_str())
            .collect();

        let mut found: Vec<(usize, CourseRecord)> = Vec::new();

        for caps in self.row.captures_iter(text) {
            let code = &caps["code"];
            if override_codes.contains(code) {
                continue;
            }
            let Some(rec) = row_record(&caps) else {
                debug!("discarding malformed row for {code}: {:?}", &caps[0]);
                continue;
            };
            let start = caps.get(0).map(|m| m.start()).unwrap_or_default();
            found.push((start, rec));
        }

        found.extend(self.override_records(text));
        found.sort_by_key(|(pos, _)| *pos);
        found.into_iter().map(|(_, rec)| rec).collect()
    }

    fn override_records(&self, text: &str) -> Vec<(usize, CourseRecord)> {
        if self.overrides.is_empty() {
            return Vec::new();
        }

        let boundaries: Vec<usize> = self
            .code
            .find_iter(text)
            .filter(|m| !followed_by_digit(text, m.end()))
            .map(|m| m.start())
            .collect();

        let mut out = Vec::new();
        for ov in &self.overrides {
            for m in ov.pattern.find_iter(text) {
                if followed_by_digit(text, m.end()) {
                    continue;
                }
                let block_end = boundaries
                    .iter()
                    .copied()
                    .find(|&b| b >= m.end())
                    .unwrap_or(text.len());
                let block = clamp_chars(&text[m.end()..block_end], self.override_window_chars);

                let Some(caps) = self.triplet.captures(block) else {
                    warn!(
                        "override {} found at byte {} but no credit/ects/grade follows",
                        ov.entry.code,
                        m.start()
                    );
                    continue;
                };
                let Ok(grade) = caps["grade"].parse::<Grade>() else {
                    continue;
                };
                debug!("override {} grade={}", ov.entry.code, grade);
                out.push((
                    m.start(),
                    CourseRecord::new(
                        &ov.entry.code,
                        &ov.entry.name,
                        ov.entry.credit,
                        ov.entry.ects,
                        grade,
                    ),
                ));
            }
        }
        out
    }
}

fn row_record(caps: &Captures) -> Option<CourseRecord> {
    let credit = parse_decimal(&caps["credit"])?;
    let ects = parse_decimal(&caps["ects"])?;
    let grade = caps["grade"].parse::<Grade>().ok()?;
    let name = caps["name"].split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return None;
    }
    Some(CourseRecord::new(&caps["code"], &name, credit, ects, grade))
}

fn valid_amount(v: Decimal) -> bool {
    !v.is_sign_negative()
}

fn followed_by_digit(text: &str, end: usize) -> bool {
    text[end..].chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn clamp_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
