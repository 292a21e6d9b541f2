//! Action correction against the rated power envelope.

use super::types::{StepViolation, ViolationKind};

/// Outcome of clamping a requested action to the envelope.
#[derive(Debug, Clone)]
pub struct CorrectedAction {
    /// Action as requested (kW; positive = charge, negative = discharge).
    pub requested_kw: f64,
    /// Action after the clamp (kW).
    pub corrected_kw: f64,
    /// Weighted penalty for the correction (zero when within bounds).
    pub penalty: f64,
    /// Violation record when the clamp changed the value.
    pub violation: Option<StepViolation>,
}

/// Clamps `requested_kw` to `[min_kw, max_kw]` and prices the correction.
///
/// Clamping is total: any finite request yields a corrected value inside
/// the envelope. The penalty is `action_weight * |requested - corrected|`.
pub fn correct_action(
    requested_kw: f64,
    min_kw: f64,
    max_kw: f64,
    action_weight: f64,
) -> CorrectedAction {
    let corrected_kw = requested_kw.clamp(min_kw, max_kw);
    let magnitude = (requested_kw - corrected_kw).abs();

    let violation = (magnitude > 0.0).then(|| StepViolation {
        kind: ViolationKind::ActionBound,
        requested: requested_kw,
        corrected: corrected_kw,
        magnitude,
    });

    CorrectedAction {
        requested_kw,
        corrected_kw,
        penalty: action_weight * magnitude,
        violation,
    }
}
