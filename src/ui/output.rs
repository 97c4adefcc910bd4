//! Output verbosity.

use serde::{Deserialize, Serialize};

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Show guidance details and gate bookkeeping.
    Verbose,
    /// Show step guidance and status.
    #[default]
    Normal,
    /// Show only the next action.
    Quiet,
}

impl OutputMode {
    /// Check if this mode shows full step guidance.
    pub fn shows_guidance(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Check if this mode shows extra details.
    pub fn shows_details(&self) -> bool {
        matches!(self, Self::Verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(OutputMode::default(), OutputMode::Normal);
    }

    #[test]
    fn mode_capabilities() {
        assert!(OutputMode::Normal.shows_guidance());
        assert!(!OutputMode::Quiet.shows_guidance());
        assert!(OutputMode::Verbose.shows_details());
        assert!(!OutputMode::Normal.shows_details());
    }
}
