//! Weighted restart counting.

use watch_classify::{weight, ServiceReport};

/// Detail-token marker for reference/cross-booking restarts.
///
/// Matched case-sensitively as a substring; a `REF` restart is
/// operationally heavier and earns a one-point bonus per marked token.
pub const REF_MARKER: &str = "REF";

/// Reduces a report to a single weighted restart count.
///
/// `total = Σ |details(service)| × weight(service)` plus one bonus point
/// for every detail token containing [`REF_MARKER`]. Monotonic in the size
/// of each service's detail set.
#[must_use]
pub fn score(report: &ServiceReport) -> u32 {
    report
        .iter()
        .map(|(service, details)| {
            let base = details.len() as u32 * weight(service);
            let ref_bonus = details.iter().filter(|d| d.contains(REF_MARKER)).count() as u32;
            base + ref_bonus
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn report(entries: &[(&str, &[&str])]) -> ServiceReport {
        let mut r = ServiceReport::new();
        for (service, details) in entries {
            if details.is_empty() {
                r.touch(service);
            }
            for d in *details {
                r.insert_detail(service, d);
            }
        }
        r
    }

    #[test]
    fn empty_report_scores_zero() {
        assert_eq!(score(&ServiceReport::new()), 0);
    }

    #[test]
    fn matched_service_without_details_scores_zero() {
        let r = report(&[("aggregator", &[])]);
        assert_eq!(score(&r), 0);
    }

    #[test]
    fn dual_system_counts_double() {
        let r = report(&[("ecn/mm", &["BookA", "BookB"])]);
        assert_eq!(score(&r), 4);
    }

    #[test]
    fn single_weight_services_count_once() {
        let r = report(&[("market-driver", &["A", "B", "C"])]);
        assert_eq!(score(&r), 3);
    }

    #[test]
    fn ref_tokens_earn_a_bonus() {
        // Three tokens at weight one, plus one REF bonus.
        let r = report(&[("market driver", &["A", "B", "REF"])]);
        assert_eq!(score(&r), 4);
    }

    #[test]
    fn ref_marker_is_case_sensitive() {
        let r = report(&[("market-driver", &["ref", "Ref"])]);
        assert_eq!(score(&r), 2);
    }

    #[test]
    fn ref_bonus_counts_substring_containment() {
        let r = report(&[("ecn/mm", &["BookA + REF", "REFBOOK"])]);
        // 2 details × weight 2, plus two REF bonuses.
        assert_eq!(score(&r), 6);
    }

    #[test]
    fn risk_manager_sentinel_contributes_one() {
        let r = report(&[("risk-manager", &["1"])]);
        assert_eq!(score(&r), 1);
    }

    #[test]
    fn services_sum_independently() {
        let r = report(&[
            ("ecn/mm", &["BookA"]),
            ("risk-manager", &["1"]),
            ("price-aggregator", &["X", "Y"]),
        ]);
        assert_eq!(score(&r), 2 + 1 + 2);
    }

    proptest! {
        // Adding a detail to any service never lowers the total.
        #[test]
        fn monotonic_in_detail_set_size(
            details in proptest::collection::vec("[A-Za-z0-9]{1,8}", 0..20),
            extra in "[A-Za-z0-9]{1,8}",
        ) {
            let mut base = ServiceReport::new();
            for d in &details {
                base.insert_detail("market-driver", d);
            }
            let mut grown = base.clone();
            grown.insert_detail("market-driver", &extra);

            prop_assert!(score(&grown) >= score(&base));
        }
    }
}
