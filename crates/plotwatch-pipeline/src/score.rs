//! Aggregate scoring: global change percentage and overall risk level.

use crate::types::{RiskLevel, Summary};

/// Change-percentage and region-count bands for Critical risk.
pub const RISK_CRITICAL: (f64, usize) = (15.0, 10);
/// Bands for High risk.
pub const RISK_HIGH: (f64, usize) = (8.0, 5);
/// Bands for Medium risk.
pub const RISK_MEDIUM: (f64, usize) = (3.0, 2);

/// Changed-pixel percentage of the image, in `[0, 100]`. Not rounded;
/// rounding happens only when the value is reported.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn change_percentage(changed_pixels: u64, total_pixels: u64) -> f64 {
    if total_pixels == 0 {
        return 0.0;
    }
    (changed_pixels as f64 / total_pixels as f64) * 100.0
}

/// Round a percentage to 2 decimal places for reporting.
#[must_use]
pub fn round_percentage(pct: f64) -> f64 {
    (pct * 100.0).round() / 100.0
}

/// Overall risk from the raw change percentage and region count.
///
/// Each band is an OR of two independent signals, so a single
/// large-area change and many small changes both escalate. Evaluated
/// top-down with strict comparisons: a change of exactly 15.0% does not
/// reach Critical on its own.
#[must_use]
pub fn risk_level(change_pct: f64, region_count: usize) -> RiskLevel {
    if change_pct > RISK_CRITICAL.0 || region_count > RISK_CRITICAL.1 {
        RiskLevel::Critical
    } else if change_pct > RISK_HIGH.0 || region_count > RISK_HIGH.1 {
        RiskLevel::High
    } else if change_pct > RISK_MEDIUM.0 || region_count > RISK_MEDIUM.1 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Assemble the summary block for one run. Risk is computed from the
/// raw percentage; the stored percentage is rounded for reporting.
#[must_use]
pub fn summarize(region_count: usize, changed_pixels: u64, total_pixels: u64) -> Summary {
    let raw_pct = change_percentage(changed_pixels, total_pixels);
    Summary {
        region_count,
        change_percentage: round_percentage(raw_pct),
        total_area_pixels: total_pixels,
        changed_area_pixels: changed_pixels,
        risk_level: risk_level(raw_pct, region_count),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn change_percentage_bounds() {
        assert!((change_percentage(0, 1000) - 0.0).abs() < f64::EPSILON);
        assert!((change_percentage(1000, 1000) - 100.0).abs() < f64::EPSILON);
        let pct = change_percentage(333, 1000);
        assert!((0.0..=100.0).contains(&pct));
    }

    #[test]
    fn change_percentage_zero_total_is_zero() {
        assert!((change_percentage(5, 0)).abs() < f64::EPSILON);
    }

    #[test]
    fn rounding_to_two_decimals() {
        assert!((round_percentage(12.3456) - 12.35).abs() < 1e-9);
        assert!((round_percentage(12.344) - 12.34).abs() < 1e-9);
        assert!((round_percentage(100.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn risk_percentage_bands_are_strict() {
        // Boundary values must NOT escalate: comparisons are strict.
        assert_eq!(risk_level(15.0, 0), RiskLevel::High);
        assert_eq!(risk_level(15.000_001, 0), RiskLevel::Critical);
        assert_eq!(risk_level(8.0, 0), RiskLevel::Medium);
        assert_eq!(risk_level(8.1, 0), RiskLevel::High);
        assert_eq!(risk_level(3.0, 0), RiskLevel::Low);
        assert_eq!(risk_level(3.1, 0), RiskLevel::Medium);
    }

    #[test]
    fn risk_region_count_bands_are_strict() {
        assert_eq!(risk_level(0.0, 2), RiskLevel::Low);
        assert_eq!(risk_level(0.0, 3), RiskLevel::Medium);
        assert_eq!(risk_level(0.0, 5), RiskLevel::Medium);
        assert_eq!(risk_level(0.0, 6), RiskLevel::High);
        assert_eq!(risk_level(0.0, 10), RiskLevel::High);
        assert_eq!(risk_level(0.0, 11), RiskLevel::Critical);
    }

    #[test]
    fn either_signal_escalates() {
        // Large area with few regions, and many regions with small area,
        // both reach Critical.
        assert_eq!(risk_level(20.0, 1), RiskLevel::Critical);
        assert_eq!(risk_level(0.5, 11), RiskLevel::Critical);
    }

    #[test]
    fn summary_rounds_percentage_but_scores_raw() {
        // 1499/10000 = 14.99%: risk High; reported percentage rounded.
        let summary = summarize(1, 1_499, 10_000);
        assert!((summary.change_percentage - 14.99).abs() < 1e-9);
        assert_eq!(summary.risk_level, RiskLevel::High);
        assert_eq!(summary.total_area_pixels, 10_000);
        assert_eq!(summary.changed_area_pixels, 1_499);
        assert_eq!(summary.region_count, 1);
    }

    #[test]
    fn summary_of_no_change_is_low_risk() {
        let summary = summarize(0, 0, 10_000);
        assert!(summary.change_percentage.abs() < f64::EPSILON);
        assert_eq!(summary.risk_level, RiskLevel::Low);
    }
}
