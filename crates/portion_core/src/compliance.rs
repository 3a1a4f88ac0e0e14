//! Average-weight compliance ("three packers rule").
//!
//! - Rule 1: the mean portion weight is at least the nominal weight.
//! - Rule 2: at most 2.5 % of portions fall below `N - T1`.
//! - Rule 3: no portion falls below `N - T2`.
//!
//! Only closed portions are checked. A waste remainder that was not folded
//! back into the portions never counts.

use serde::Serialize;

use crate::{
    segment::Portion,
    tolerance::{ToleranceBands, ToleranceTable},
    Scalar,
};

/// Share of the batch allowed below the T1 limit.
pub const T1_ALLOWED_FRACTION: Scalar = 0.025;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub bands: ToleranceBands,
    pub portion_count: usize,
    /// Zero when there are no portions.
    pub average_weight_g: Scalar,
    pub rule1_pass: bool,
    pub t1_violation_count: usize,
    pub rule2_pass: bool,
    pub t2_violation_count: usize,
    pub rule3_pass: bool,
}

impl ComplianceReport {
    pub fn passed(&self) -> bool {
        self.rule1_pass && self.rule2_pass && self.rule3_pass
    }
}

/// Evaluates the three rules over `portions` for the nominal weight.
///
/// An empty batch cannot demonstrate compliance, so every rule fails.
pub fn check(portions: &[Portion], nominal_g: Scalar, table: &ToleranceTable) -> ComplianceReport {
    let bands = table.bands(nominal_g);
    let portion_count = portions.len();

    if portion_count == 0 {
        return ComplianceReport {
            bands,
            portion_count,
            average_weight_g: 0.0,
            rule1_pass: false,
            t1_violation_count: 0,
            rule2_pass: false,
            t2_violation_count: 0,
            rule3_pass: false,
        };
    }

    let total: Scalar = portions.iter().map(|p| p.weight_g).sum();
    let average_weight_g = total / portion_count as Scalar;

    let t1_limit = bands.t1_limit_g();
    let t2_limit = bands.t2_limit_g();
    let t1_violation_count = portions.iter().filter(|p| p.weight_g < t1_limit).count();
    let t2_violation_count = portions.iter().filter(|p| p.weight_g < t2_limit).count();

    ComplianceReport {
        bands,
        portion_count,
        average_weight_g,
        rule1_pass: average_weight_g >= nominal_g,
        t1_violation_count,
        rule2_pass: t1_violation_count as Scalar <= T1_ALLOWED_FRACTION * portion_count as Scalar,
        t2_violation_count,
        rule3_pass: t2_violation_count == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(weights: &[Scalar]) -> Vec<Portion> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &weight_g)| Portion {
                start_index: i * 10,
                end_index: i * 10 + 9,
                length_mm: 1.0,
                weight_g,
            })
            .collect()
    }

    #[test]
    fn on_target_batch_passes_everything() {
        let report = check(&batch(&[250.0, 251.0, 252.0]), 250.0, &ToleranceTable::default());
        assert!(report.passed());
        assert_eq!(report.portion_count, 3);
        assert!((report.average_weight_g - 251.0).abs() < 1e-12);
        assert_eq!(report.t1_violation_count, 0);
        assert_eq!(report.t2_violation_count, 0);
    }

    #[test]
    fn underweight_average_fails_rule_one_only() {
        let report = check(&batch(&[249.9; 5]), 250.0, &ToleranceTable::default());
        assert!(!report.rule1_pass);
        assert!(report.rule2_pass);
        assert!(report.rule3_pass);
        assert!(!report.passed());
    }

    #[test]
    fn rule_two_cap_is_fractional() {
        // 40 portions allow exactly one T1 violation (0.025 * 40 = 1).
        let mut weights = vec![255.0; 40];
        weights[0] = 240.0;
        let report = check(&batch(&weights), 250.0, &ToleranceTable::default());
        assert_eq!(report.t1_violation_count, 1);
        assert!(report.rule2_pass);
        assert!(report.rule3_pass);

        // 39 portions allow 0.975 violations, so one is too many.
        let report = check(&batch(&weights[..39]), 250.0, &ToleranceTable::default());
        assert_eq!(report.t1_violation_count, 1);
        assert!(!report.rule2_pass);
    }

    #[test]
    fn rule_three_has_zero_tolerance() {
        let mut weights = vec![260.0; 100];
        weights[3] = 231.0;
        let report = check(&batch(&weights), 250.0, &ToleranceTable::default());
        assert_eq!(report.t1_violation_count, 1);
        assert_eq!(report.t2_violation_count, 1);
        assert!(report.rule1_pass);
        assert!(report.rule2_pass);
        assert!(!report.rule3_pass);
    }

    #[test]
    fn limits_are_strict_inequalities() {
        let report = check(&batch(&[241.0, 259.0]), 250.0, &ToleranceTable::default());
        assert_eq!(report.t1_violation_count, 0);
        let report = check(&batch(&[232.0, 268.0]), 250.0, &ToleranceTable::default());
        assert_eq!(report.t2_violation_count, 0);
        assert_eq!(report.t1_violation_count, 1);
    }

    #[test]
    fn empty_batch_fails_without_panicking() {
        let report = check(&[], 250.0, &ToleranceTable::default());
        assert_eq!(report.portion_count, 0);
        assert_eq!(report.average_weight_g, 0.0);
        assert!(!report.rule1_pass && !report.rule2_pass && !report.rule3_pass);
    }

    #[test]
    fn tiny_nominal_has_no_tolerance_band() {
        let report = check(&batch(&[3.9, 4.1]), 4.0, &ToleranceTable::default());
        assert_eq!(report.bands.tne_g, 0.0);
        assert_eq!(report.t1_violation_count, 1);
        assert_eq!(report.t2_violation_count, 1);
        assert!(!report.rule3_pass);
    }
}
