//! Advisory timing plausibility checks
//!
//! Classifies decoded timing values against JEDEC-derived thresholds. The
//! result is advisory only: nothing here blocks an encode, since XMP exists
//! precisely to run parts out of spec.

use crate::tables::{TimingLimit, TIMING_LIMITS};

/// How far below JEDEC minimums a timing value sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskLevel {
    /// At or above the warning threshold
    Safe,
    /// Aggressive but commonly stable with good silicon
    Warning,
    /// Below what production parts are expected to reach
    Danger,
}

/// Threshold entry for a parameter name, `None` for parameters without
/// published limits.
pub fn limit_for(name: &str) -> Option<&'static TimingLimit> {
    TIMING_LIMITS.iter().find(|l| l.name == name)
}

/// Classify a timing value in ns against the parameter's thresholds.
///
/// Unknown parameters classify as [`RiskLevel::Safe`] (fail open - this is a
/// lint, not a gate). Known parameters are judged purely by the thresholds,
/// so an implausible zero still reads as [`RiskLevel::Danger`].
pub fn classify_timing(name: &str, value_ns: f64) -> RiskLevel {
    let limit = match limit_for(name) {
        Some(l) => l,
        None => return RiskLevel::Safe,
    };
    if value_ns < limit.danger_ns {
        RiskLevel::Danger
    } else if value_ns < limit.warning_ns {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    }
}
