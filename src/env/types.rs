//! Core engine types: observations, step records, violations, and errors.

use std::fmt;

use thiserror::Error;

/// Which soft constraint a correction was applied against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Requested action fell outside the rated power envelope.
    ActionBound,
    /// Proposed SoC fell outside the configured band.
    SocBound,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActionBound => write!(f, "action-bound"),
            Self::SocBound => write!(f, "soc-bound"),
        }
    }
}

/// Record of one absorbed out-of-bounds request.
///
/// Violations are a designed soft-constraint mechanism: the request is
/// corrected in place, penalized, and reported here. They never abort a
/// step.
#[derive(Debug, Clone)]
pub struct StepViolation {
    pub kind: ViolationKind,
    /// The value as requested or proposed (kW for actions, fraction for SoC).
    pub requested: f64,
    /// The value after clamping.
    pub corrected: f64,
    /// `|requested - corrected|`.
    pub magnitude: f64,
}

/// The 7-element observation handed to the control policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Battery state of charge (fraction).
    pub soc: f64,
    /// Load demand (kW).
    pub load_kw: f64,
    /// PV generation (kW).
    pub generation_kw: f64,
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub weekday_sin: f64,
    pub weekday_cos: f64,
}

impl Observation {
    /// Returns the observation as a flat vector in the documented order.
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.soc,
            self.load_kw,
            self.generation_kw,
            self.hour_sin,
            self.hour_cos,
            self.weekday_sin,
            self.weekday_cos,
        ]
    }
}

/// Fixed-shape per-step diagnostics.
///
/// Every scalar is always populated and the violation list is always
/// present (empty when the step was clean); nothing is late-initialized.
#[derive(Debug, Clone)]
pub struct StepInfo {
    /// Step counter value after this call (0 at reset).
    pub step: u32,
    /// Timestamp the step was priced at (pre-advance).
    pub timestamp: chrono::NaiveDateTime,
    /// SoC after all corrections (fraction).
    pub soc: f64,
    /// Load demand used this step (kW).
    pub load_kw: f64,
    /// PV generation used this step (kW).
    pub generation_kw: f64,
    /// Tariff price applied to the grid exchange.
    pub price: f64,
    /// Power bought from the grid (kW, >= 0).
    pub grid_import_kw: f64,
    /// Power sold to the grid (kW, >= 0).
    pub grid_export_kw: f64,
    /// Action as requested by the policy (kW).
    pub requested_action_kw: f64,
    /// Action after the envelope clamp (kW).
    pub corrected_action_kw: f64,
    /// Action physically realized after feasibility resolution (kW).
    pub actual_action_kw: f64,
    /// Revenue from grid export this step.
    pub revenue: f64,
    /// Cost of grid import this step.
    pub cost: f64,
    /// Weighted action-envelope penalty.
    pub action_penalty: f64,
    /// Weighted SoC-bound penalty (both update passes).
    pub soc_penalty: f64,
    /// Violations absorbed this step, in occurrence order.
    pub violations: Vec<StepViolation>,
}

impl StepInfo {
    /// Returns an info record with all exchange scalars zeroed and an
    /// empty violation list, as produced by `reset`.
    pub fn clean(
        step: u32,
        timestamp: chrono::NaiveDateTime,
        soc: f64,
        load_kw: f64,
        generation_kw: f64,
    ) -> Self {
        Self {
            step,
            timestamp,
            soc,
            load_kw,
            generation_kw,
            price: 0.0,
            grid_import_kw: 0.0,
            grid_export_kw: 0.0,
            requested_action_kw: 0.0,
            corrected_action_kw: 0.0,
            actual_action_kw: 0.0,
            revenue: 0.0,
            cost: 0.0,
            action_penalty: 0.0,
            soc_penalty: 0.0,
            violations: Vec::new(),
        }
    }
}

/// Complete outcome of one `step` call.
///
/// The engine retains no reference to a returned result; the caller owns it.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Observation at the advanced clock.
    pub observation: Observation,
    /// Scalar reward: `revenue - cost - penalties`.
    pub reward: f64,
    /// `true` exactly when the step counter reached `max_steps`.
    pub terminated: bool,
    /// Always `false`; this engine has no external truncation source.
    pub truncated: bool,
    /// Per-step diagnostics and violation records.
    pub info: StepInfo,
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>3} {} | SoC={:>5.1}% | L={:.3} G={:.3} kW | \
             act req={:>6.3} -> real={:>6.3} kW | grid in={:.3} out={:.3} @ {:.2} | \
             reward={:>8.4} | violations={}",
            self.info.step,
            self.info.timestamp.format("%a %H:%M"),
            self.info.soc * 100.0,
            self.info.load_kw,
            self.info.generation_kw,
            self.info.requested_action_kw,
            self.info.actual_action_kw,
            self.info.grid_import_kw,
            self.info.grid_export_kw,
            self.info.price,
            self.reward,
            self.info.violations.len(),
        )
    }
}

/// Episode lifecycle of the engine.
///
/// ```md
/// Uninitialized --reset()--> Ready --step()*--> Terminated --reset()--> Ready
/// ```
///
/// `step` outside `Ready` is a usage error; `reset` is valid in any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    /// Constructed but never reset; `step` is rejected.
    Uninitialized,
    /// Mid-episode; `step` is accepted.
    Ready,
    /// Step counter reached `max_steps`; `step` is rejected until `reset`.
    Terminated,
}

impl EpisodeStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

/// Fatal engine errors.
///
/// Bound violations are deliberately absent here: they are corrected,
/// penalized, and reported through [`StepInfo`], never raised.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A construction-time invariant was violated; no partial construction.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// `step` was invoked before the first `reset`.
    #[error("step() called before reset()")]
    NotReset,
    /// `step` was invoked after the episode terminated.
    #[error("episode already terminated after {max_steps} steps; call reset()")]
    EpisodeOver { max_steps: u32 },
}
