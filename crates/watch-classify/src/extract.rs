//! Service extraction from restart-request text.

use tracing::debug;

use crate::types::ServiceReport;
use crate::vocab::{canonicalize, split_details, RISK_MANAGER, RISK_SENTINEL, SERVICE_PATTERN};

/// Parses restart requests into per-service detail sets.
///
/// Every non-overlapping service-keyword occurrence in a request is
/// processed, not just the first. Detail sets accumulate and deduplicate
/// across occurrences and across messages within one report, so extraction
/// over a fixed batch is idempotent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceExtractor {
    _priv: (),
}

impl ServiceExtractor {
    /// Creates an extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self { _priv: () }
    }

    /// Extracts a report from a batch of restart-request texts.
    #[must_use]
    pub fn extract<'a, I>(&self, texts: I) -> ServiceReport
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut report = ServiceReport::new();
        for text in texts {
            self.extract_into(text, &mut report);
        }
        report
    }

    /// Extracts one request into an accumulating report.
    pub fn extract_into(&self, text: &str, report: &mut ServiceReport) {
        // Chat emphasis markers break keyword and clause boundaries.
        let text = text.replace('*', "");

        for m in SERVICE_PATTERN.find_iter(&text) {
            let service = canonicalize(m.as_str());

            // Risk-manager never carries a details clause; every mention is
            // one restart of the whole service.
            if service == RISK_MANAGER {
                report.insert_detail(&service, RISK_SENTINEL);
                continue;
            }

            match details_clause(&text, m.end()) {
                Some(clause) => {
                    for token in split_details(&service, clause) {
                        report.insert_detail(&service, token);
                    }
                }
                None => {
                    debug!(service = %service, "service mention without details clause");
                    report.touch(&service);
                }
            }
        }
    }
}

/// Returns the details clause following a keyword match, if present.
///
/// The clause is introduced by a colon or hyphen separator immediately
/// after the matched token (ignoring spaces) and runs to end of line.
fn details_clause(text: &str, match_end: usize) -> Option<&str> {
    let rest = &text[match_end..];
    let after_spaces = rest.trim_start_matches([' ', '\t']);
    let clause = after_spaces.strip_prefix([':', '-'])?;
    let line = clause.split('\n').next().unwrap_or(clause).trim();
    if line.is_empty() { None } else { Some(line) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn extract(texts: &[&str]) -> ServiceReport {
        ServiceExtractor::new().extract(texts.iter().copied())
    }

    fn details(report: &ServiceReport, service: &str) -> Vec<String> {
        report
            .details(service)
            .map(|d| d.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn colon_separated_clause() {
        let report = extract(&["restart ecn/mm: BookA, BookB"]);
        assert_eq!(details(&report, "ecn/mm"), vec!["BookA", "BookB"]);
    }

    #[test]
    fn hyphen_separated_clause() {
        let report = extract(&["### restart: ecn/mm - BookA, BookB"]);
        assert_eq!(details(&report, "ecn/mm"), vec!["BookA", "BookB"]);
    }

    #[test]
    fn emphasis_markers_are_stripped() {
        let report = extract(&["*### restart: *ecn/mm* - BookA*"]);
        assert_eq!(details(&report, "ecn/mm"), vec!["BookA"]);
    }

    #[test]
    fn clause_stops_at_end_of_line() {
        let report = extract(&["restart driver: A, B\nunrelated trailing text"]);
        assert_eq!(details(&report, "market-driver"), vec!["A", "B"]);
    }

    #[test]
    fn mention_without_clause_still_recorded() {
        let report = extract(&["please restart the aggregator soon"]);
        assert!(report.details("aggregator").unwrap().is_empty());
    }

    #[test]
    fn every_occurrence_is_processed() {
        let report = extract(&["restart driver: A\nalso restart pa: X, Y"]);
        assert_eq!(details(&report, "market-driver"), vec!["A"]);
        assert_eq!(details(&report, "price-aggregator"), vec!["X", "Y"]);
    }

    #[test]
    fn risk_manager_always_contributes_sentinel() {
        let report = extract(&[
            "restart risk manager: AccountA",
            "restart riskmanager - AccountB",
            "reboot the manager",
        ]);
        assert_eq!(details(&report, "risk-manager"), vec!["1"]);
    }

    #[test]
    fn other_services_split_on_plus() {
        let report = extract(&["reboot market driver: A, B + REF"]);
        assert_eq!(details(&report, "market driver"), vec!["A", "B", "REF"]);
    }

    #[test]
    fn merged_driver_family_does_not_split_on_plus() {
        let report = extract(&["restart mddriver: A + REF"]);
        assert_eq!(details(&report, "market-driver"), vec!["A + REF"]);
    }

    #[test]
    fn dedup_across_messages_in_one_batch() {
        let report = extract(&["restart ecn/mm: BookA", "restart ecn/mm: BookA, BookB"]);
        assert_eq!(details(&report, "ecn/mm"), vec!["BookA", "BookB"]);
    }

    #[test]
    fn extraction_is_idempotent_on_a_batch() {
        let batch = &[
            "### restart: ecn/mm - BookA, BookB",
            "reboot market driver: A, B + REF",
            "restart risk manager: whatever",
        ];
        assert_eq!(extract(batch), extract(batch));
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_text(text in "\\PC{0,200}") {
            let mut report = ServiceReport::new();
            ServiceExtractor::new().extract_into(&text, &mut report);
        }

        #[test]
        fn repeated_extraction_matches_single(text in "[ -~]{0,120}") {
            let once = extract(&[text.as_str()]);
            let twice = extract(&[text.as_str(), text.as_str()]);
            prop_assert_eq!(once, twice);
        }
    }
}
