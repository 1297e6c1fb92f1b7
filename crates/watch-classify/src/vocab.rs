//! Fixed keyword vocabulary and service tables.
//!
//! The synonym table, split-rule table, and weight table are plain data so
//! the matching engine can be tested and extended without touching code
//! paths. Canonicalization is a total function of the matched keyword text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical name of the risk-manager service.
pub const RISK_MANAGER: &str = "risk-manager";

/// Sentinel detail recorded for every risk-manager mention.
///
/// Risk-manager requests never carry a details clause; each mention means
/// one restart of that service regardless of trailing text.
pub const RISK_SENTINEL: &str = "1";

/// Canonical name of the merged dual-system service.
pub const ECN_MM: &str = "ecn/mm";

/// Synonym table: raw keyword (lowercase) → canonical service name.
///
/// Keywords not listed here canonicalize to their own lowercased text.
static SYNONYMS: &[(&str, &str)] = &[
    ("ecn/mm", ECN_MM),
    ("ecn and mm", ECN_MM),
    ("price-aggregator", "price-aggregator"),
    ("price_aggregator", "price-aggregator"),
    ("pa", "price-aggregator"),
    ("driver", "market-driver"),
    ("drivers", "market-driver"),
    ("mddriver", "market-driver"),
    ("md", "market-driver"),
    ("risk manager", RISK_MANAGER),
    ("riskmanager", RISK_MANAGER),
    ("manager", RISK_MANAGER),
];

/// Keywords recognized but left unmerged; each is its own canonical name.
static UNMERGED: &[&str] = &["market maker", "market driver", "aggregator", "ecn", "mm"];

/// Services whose details clauses split on comma, slash, or pipe.
///
/// Every other service additionally splits on plus, to catch "A + B" style
/// lists. The distinction is intentional: slash is a name character for
/// these three services' books, while plus never is.
static COMMA_SLASH_PIPE_SERVICES: &[&str] = &[ECN_MM, "price-aggregator", "market-driver"];

/// Whole-word restart/reboot keyword.
pub static RESTART_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:reboot|restart)\b").unwrap_or_else(|_| unreachable!()));

/// One alternation over the full service vocabulary, longest keyword first
/// so the longest synonym wins at a given position (`ecn/mm` over `ecn`,
/// `price-aggregator` over `aggregator`).
pub static SERVICE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let mut keywords: Vec<&str> = SYNONYMS
        .iter()
        .map(|(raw, _)| *raw)
        .chain(UNMERGED.iter().copied())
        .collect();
    keywords.sort_by_key(|k| std::cmp::Reverse(k.len()));

    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap_or_else(|_| unreachable!())
});

static COMMA_SLASH_PIPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[,/|]\s*").unwrap_or_else(|_| unreachable!()));

static COMMA_PIPE_PLUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[,|+]\s*").unwrap_or_else(|_| unreachable!()));

/// Normalizes a matched keyword to its canonical service name.
///
/// Total and deterministic: synonym-table hits map to their canonical
/// family, everything else maps to its own lowercased text.
#[must_use]
pub fn canonicalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    SYNONYMS
        .iter()
        .find(|(k, _)| *k == lowered)
        .map_or(lowered, |(_, canonical)| (*canonical).to_string())
}

/// Restart weight of a canonical service.
///
/// The merged dual-system service counts double; one mention restarts both
/// systems. Everything else weighs one.
#[must_use]
pub fn weight(service: &str) -> u32 {
    if service == ECN_MM { 2 } else { 1 }
}

/// Splits a details clause into raw tokens using the per-service rule.
///
/// Tokens are not yet trimmed or deduplicated; that happens when they are
/// inserted into a report.
#[must_use]
pub fn split_details<'a>(service: &str, clause: &'a str) -> Vec<&'a str> {
    let splitter = if COMMA_SLASH_PIPE_SERVICES.contains(&service) {
        &COMMA_SLASH_PIPE
    } else {
        &COMMA_PIPE_PLUS
    };
    splitter.split(clause).collect()
}
