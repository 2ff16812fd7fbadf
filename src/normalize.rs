use crate::config::Normalize;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static CID_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(cid:(\d+)\)").expect("static cid pattern"));

/// Replaces every `(cid:N)` escape with its mapped character. Codes missing
/// from `table` are dropped.
///
/// Dropping an escape can splice its neighbours into a new escape
/// (`((cid:1)cid:248)`), so the pass repeats until none remain. Each pass
/// that matches strictly shortens the string, which bounds the loop and
/// makes the function idempotent.
pub fn normalize_cid(text: &str, table: &BTreeMap<String, char>) -> String {
    let mut out = text.to_string();
    while CID_ESCAPE.is_match(&out) {
        out = CID_ESCAPE
            .replace_all(&out, |caps: &Captures| {
                table
                    .get(&caps[1])
                    .map(|c| c.to_string())
                    .unwrap_or_default()
            })
            .into_owned();
    }
    out
}

/// Number of glyph-code escapes in `text`, mapped or not.
pub fn count_cid_escapes(text: &str) -> usize {
    CID_ESCAPE.find_iter(text).count()
}

/// Page-level hygiene applied before record extraction. Idempotent like
/// [`normalize_cid`].
pub fn normalize_page(cfg: &Normalize, text: &str) -> String {
    let mut s = text.to_string();

    if cfg.normalize_newlines {
        s = s.replace("\r\n", "\n").replace('\r', "\n");
    }

    // NFKC runs before the cid repair so fullwidth brackets fold into real
    // escapes, and again after it for the characters the table inserted.
    if cfg.normalize_unicode {
        s = s.nfkc().collect::<String>();
    }

    let repaired = normalize_cid(&s, &cfg.cid_map);
    if repaired != s {
        s = repaired;
        if cfg.normalize_unicode {
            s = s.nfkc().collect::<String>();
        }
    }

    if cfg.trim_trailing_whitespace {
        s = s
            .lines()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
    }

    s
}
