//! Free-text argument extraction.
//!
//! Callers sometimes hand a tool a single text blob ("id=5, name=foo") instead
//! of structured arguments. This module is the best-effort heuristic that turns
//! such text into key/value pairs: three tiers, each attempted only when the
//! previous one produced nothing. It is a single pure function so the
//! invocation pipeline can treat it as a black box.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Separators accepted between pairs: ASCII and full-width comma.
const PAIR_SEPARATORS: [char; 2] = [',', '，'];

static PAIR_RE: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn pair_re() -> &'static Regex {
    // ASCII key=value tokens; a value is either a bracketed list or runs until
    // the next separator/whitespace. Non-ASCII keys fall through to tier 2.
    PAIR_RE.get_or_init(|| {
        Regex::new(r"([A-Za-z0-9_.\-]+)\s*=\s*(\[[^\]]*\]|[^,，\s]+)")
            .expect("pair pattern is valid")
    })
}

/// Parse a free-text argument blob into an argument map.
///
/// Tier 1 pattern-matches consecutive `key=value` tokens (values may be
/// bracketed lists); tier 2 splits on commas and then each segment on the
/// first `=`; tier 3 splits on whitespace. Bracketed values always become an
/// ordered array of strings with per-element quotes stripped; everything else
/// is a plain trimmed string.
pub fn parse_free_text(text: &str) -> Map<String, Value> {
    let text = text.trim();
    if text.is_empty() {
        return Map::new();
    }

    let mut pairs = match_pairs(text);
    if pairs.is_empty() {
        pairs = split_on_commas(text);
    }
    if pairs.is_empty() {
        pairs = split_on_whitespace(text);
    }
    pairs
}

/// Tier 1: regex over consecutive `key=value` tokens.
fn match_pairs(text: &str) -> Map<String, Value> {
    let mut out = Map::new();
    for caps in pair_re().captures_iter(text) {
        out.insert(caps[1].to_string(), parse_value(&caps[2]));
    }
    out
}

/// Tier 2: split on commas, then each segment on the first `=`.
fn split_on_commas(text: &str) -> Map<String, Value> {
    let mut out = Map::new();
    for segment in text.split(PAIR_SEPARATORS) {
        if let Some((key, value)) = segment.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            out.insert(key.to_string(), parse_value(value));
        }
    }
    out
}

/// Tier 3: split on whitespace, then each token on the first `=`.
fn split_on_whitespace(text: &str) -> Map<String, Value> {
    let mut out = Map::new();
    for token in text.split_whitespace() {
        if let Some((key, value)) = token.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            out.insert(
                key.to_string(),
                parse_value(value.trim_end_matches(PAIR_SEPARATORS)),
            );
        }
    }
    out
}

/// A bracketed value becomes an ordered list of strings; anything else is a
/// plain trimmed string.
fn parse_value(raw: &str) -> Value {
    let raw = raw.trim();
    if let Some(inner) = raw
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        let items: Vec<Value> = inner
            .split(PAIR_SEPARATORS)
            .map(strip_quotes)
            .filter(|s| !s.is_empty())
            .map(Value::String)
            .collect();
        return Value::Array(items);
    }
    Value::String(raw.to_string())
}

fn strip_quotes(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_prefix(['"', '\''])
        .and_then(|rest| rest.strip_suffix(['"', '\'']))
        .unwrap_or(raw)
        .trim()
        .to_string()
}
