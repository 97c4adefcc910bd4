//! Confidence scoring for quality-review results.
//!
//! The score is a placeholder heuristic: every finding reported by a failing
//! review costs a fixed number of points. It lives behind
//! [`compute_confidence`] alone so the policy can change without touching
//! gate evaluation.

use crate::error::{PlannerError, Result};

/// Score of a passing review.
pub const FULL_CONFIDENCE: f64 = 100.0;

/// Points deducted per finding of a failing review.
pub const PENALTY_PER_FINDING: f64 = 5.0;

/// Threshold used when neither the CLI nor config set one.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 80.0;

/// Compute a confidence score in `[0, 100]` for a quality-review result.
///
/// A passing review always scores 100 and `findings_count` is ignored.
/// A failing review scores `100 - 5 * findings_count`, clamped at 0.
pub fn compute_confidence(passed: bool, findings_count: u32) -> f64 {
    if passed {
        return FULL_CONFIDENCE;
    }

    let confidence = FULL_CONFIDENCE - f64::from(findings_count) * PENALTY_PER_FINDING;
    confidence.clamp(0.0, FULL_CONFIDENCE)
}

/// Check that a confidence threshold lies in `[0, 100]`.
///
/// NaN is rejected along with out-of-range values.
pub fn validate_threshold(value: f64) -> Result<f64> {
    if (0.0..=FULL_CONFIDENCE).contains(&value) {
        Ok(value)
    } else {
        Err(PlannerError::InvalidThreshold { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_review_is_full_confidence() {
        assert_eq!(compute_confidence(true, 0), 100.0);
    }

    #[test]
    fn passing_review_ignores_findings() {
        assert_eq!(compute_confidence(true, 7), 100.0);
    }

    #[test]
    fn failing_review_loses_five_points_per_finding() {
        assert_eq!(compute_confidence(false, 0), 100.0);
        assert_eq!(compute_confidence(false, 2), 90.0);
        assert_eq!(compute_confidence(false, 3), 85.0);
        assert_eq!(compute_confidence(false, 8), 60.0);
    }

    #[test]
    fn failing_review_is_clamped_at_zero() {
        assert_eq!(compute_confidence(false, 20), 0.0);
        assert_eq!(compute_confidence(false, 25), 0.0);
        assert_eq!(compute_confidence(false, u32::MAX), 0.0);
    }

    #[test]
    fn confidence_never_increases_with_more_findings() {
        let mut previous = compute_confidence(false, 0);
        for findings in 1..=40 {
            let current = compute_confidence(false, findings);
            assert!(current <= previous, "{} findings scored higher", findings);
            assert!(current >= 0.0);
            previous = current;
        }
    }

    #[test]
    fn threshold_bounds_are_inclusive() {
        assert_eq!(validate_threshold(0.0).unwrap(), 0.0);
        assert_eq!(validate_threshold(100.0).unwrap(), 100.0);
        assert_eq!(
            validate_threshold(DEFAULT_CONFIDENCE_THRESHOLD).unwrap(),
            80.0
        );
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        assert!(matches!(
            validate_threshold(150.0),
            Err(PlannerError::InvalidThreshold { value }) if value == 150.0
        ));
        assert!(validate_threshold(-0.5).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }
}
