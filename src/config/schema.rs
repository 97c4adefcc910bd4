//! Configuration schema.
//!
//! ```yaml
//! # .planner/config.yml
//! confidence_threshold: 85
//! gates:
//!   QR-CODE:
//!     max_iterations: 4
//!   QR-DOCS:
//!     unbounded: true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{PlannerError, Result};
use crate::runner::{validate_threshold, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::steps::Workflow;

/// Planner configuration after all layers are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Confidence below which a failing gate escalates to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,

    /// Per-gate overrides keyed by gate name (`QR-CODE`, ...).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub gates: BTreeMap<String, GateOverride>,
}

/// Override of one gate's iteration policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateOverride {
    /// Maximum fix iterations before escalating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,

    /// Never escalate on the iteration count.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unbounded: bool,
}

impl GateOverride {
    fn limit(&self, gate: &str) -> Result<Option<Option<u32>>> {
        match (self.unbounded, self.max_iterations) {
            (true, Some(_)) => Err(PlannerError::ConfigValidationError {
                message: format!(
                    "gate '{}': max_iterations and unbounded are mutually exclusive",
                    gate
                ),
            }),
            (true, None) => Ok(Some(None)),
            (false, Some(max)) => Ok(Some(Some(max))),
            (false, None) => Ok(None),
        }
    }
}

impl PlannerConfig {
    /// Check values without building anything.
    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.confidence_threshold {
            validate_threshold(threshold)?;
        }
        self.workflow().map(|_| ())
    }

    /// Threshold to use: an explicit value wins over config, config over the default.
    pub fn threshold(&self, explicit: Option<f64>) -> f64 {
        explicit
            .or(self.confidence_threshold)
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD)
    }

    /// The planning workflow with gate overrides applied.
    pub fn workflow(&self) -> Result<Workflow> {
        let mut workflow = Workflow::planner();
        for (gate, policy) in &self.gates {
            if let Some(limit) = policy.limit(gate)? {
                workflow.set_max_iterations(gate, limit)?;
            }
        }
        Ok(workflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::StepId;

    fn parse(yaml: &str) -> PlannerConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("{}");

        assert_eq!(config.threshold(None), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_eq!(config.workflow().unwrap(), Workflow::planner());
        config.validate().unwrap();
    }

    #[test]
    fn explicit_threshold_beats_config() {
        let config = parse("confidence_threshold: 90");

        assert_eq!(config.threshold(None), 90.0);
        assert_eq!(config.threshold(Some(70.0)), 70.0);
    }

    #[test]
    fn gate_override_changes_limit() {
        let config = parse("gates:\n  QR-CODE:\n    max_iterations: 5");
        let workflow = config.workflow().unwrap();

        assert_eq!(
            workflow.gate_at(StepId::Ordinal(10)).unwrap().max_iterations,
            Some(5)
        );
        assert_eq!(
            workflow.gate_at(StepId::Ordinal(7)).unwrap().max_iterations,
            Some(3)
        );
    }

    #[test]
    fn unbounded_gate_has_no_limit() {
        let config = parse("gates:\n  QR-DOCS:\n    unbounded: true");
        let workflow = config.workflow().unwrap();

        assert_eq!(
            workflow.gate_at(StepId::Ordinal(13)).unwrap().max_iterations,
            None
        );
    }

    #[test]
    fn out_of_range_threshold_is_invalid() {
        let err = parse("confidence_threshold: 150").validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidThreshold { .. }));
    }

    #[test]
    fn zero_iterations_is_invalid() {
        let config = parse("gates:\n  QR-CODE:\n    max_iterations: 0");
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_gate_is_invalid() {
        let config = parse("gates:\n  QR-STYLE:\n    max_iterations: 2");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("QR-STYLE"));
    }

    #[test]
    fn conflicting_gate_policy_is_invalid() {
        let config = parse("gates:\n  QR-CODE:\n    max_iterations: 2\n    unbounded: true");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: std::result::Result<PlannerConfig, _> = serde_yaml::from_str("threshold: 80");
        assert!(result.is_err());
    }
}
