//! Common types and traits for exogenous signal sources.

use rand::{Rng, rngs::StdRng};

use crate::config::ExogenousConfig;
use crate::env::clock::SimClock;

/// Load and PV generation for one timestep.
///
/// Produced fresh each step by a [`SignalSource`]; never persisted beyond
/// the step that consumed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExogenousSample {
    /// Load demand (kW, >= 0).
    pub load_kw: f64,
    /// PV generation (kW, >= 0).
    pub generation_kw: f64,
}

impl ExogenousSample {
    /// Returns the sample with both signals clamped to their configured bounds.
    pub fn clamped(self, cfg: &ExogenousConfig) -> Self {
        Self {
            load_kw: self.load_kw.clamp(cfg.load_min_kw, cfg.load_max_kw),
            generation_kw: self
                .generation_kw
                .clamp(cfg.generation_min_kw, cfg.generation_max_kw),
        }
    }
}

/// A supplier of load and PV generation keyed to the simulation clock.
///
/// Implementations must be cheap to sample and deterministic apart from
/// their own seeded noise; the engine calls `sample` once per step with
/// the pre-advance clock.
pub trait SignalSource {
    /// Returns the sample for the clock's current timestamp.
    fn sample(&mut self, clock: &SimClock) -> ExogenousSample;

    /// Rewinds the source to episode start. A seed reseeds any internal
    /// noise generator; `None` restores the construction-time seed.
    fn reset(&mut self, seed: Option<u64>);

    /// Returns a human-readable type name for the source.
    fn source_type(&self) -> &'static str;
}

/// Gaussian noise via the Box-Muller transform.
///
/// Mean 0 with the given standard deviation; returns 0 when `std_dev`
/// is not strictly positive.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    z0 * std_dev
}
