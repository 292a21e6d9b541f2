//! Episode controller orchestrating the per-step transition.

use tracing::{debug, info};

use crate::config::EnvConfig;
use crate::signals::{ExogenousSample, SignalSource};

use super::action::correct_action;
use super::balance::{grid_exchange, resolve_feasible};
use super::clock::SimClock;
use super::soc;
use super::tariff::tier_for;
use super::types::{EnvError, EpisodeStatus, Observation, StepInfo, StepResult};

/// Single-step battery simulation engine.
///
/// Owns the episode's mutable state (SoC, clock, step counter) and
/// composes the correction laws, feasibility resolver, tariff lookup, and
/// reward accounting into one `step` transition. Generic over
/// `S: SignalSource` for static dispatch.
///
/// The engine is strictly single-threaded: one instance per episode, no
/// internal locking, no suspension points. Bound violations never abort a
/// step; they are corrected, penalized, and reported through the returned
/// [`StepInfo`].
pub struct BmsEnv<S: SignalSource> {
    config: EnvConfig,
    signals: S,
    soc: f64,
    clock: SimClock,
    step_count: u32,
    status: EpisodeStatus,
}

impl<S: SignalSource> BmsEnv<S> {
    /// Creates an engine from a validated configuration and signal source.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::Configuration` listing every violated invariant;
    /// nothing is partially constructed.
    pub fn new(config: EnvConfig, signals: S) -> Result<Self, EnvError> {
        let errors = config.validate();
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(EnvError::Configuration(joined));
        }

        let clock = SimClock::new(
            config.episode.start_time,
            config.episode.time_interval_hours,
        );
        Ok(Self {
            soc: config.battery.initial_soc,
            clock,
            step_count: 0,
            status: EpisodeStatus::Uninitialized,
            config,
            signals,
        })
    }

    /// Reinitializes the episode and returns the initial observation.
    ///
    /// SoC returns to its configured initial value, the clock to the
    /// configured start timestamp, and the step counter to zero. A seed
    /// reseeds only the signal source's stochastic noise; every
    /// deterministic formula is unaffected. Always succeeds.
    pub fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        self.soc = self.config.battery.initial_soc;
        self.clock = SimClock::new(
            self.config.episode.start_time,
            self.config.episode.time_interval_hours,
        );
        self.step_count = 0;
        self.signals.reset(seed);
        self.status = EpisodeStatus::Ready;

        info!(
            source = self.signals.source_type(),
            start = %self.clock.timestamp(),
            soc = self.soc,
            "episode reset"
        );

        let sample = self.draw_sample();
        let observation = self.observe(sample);
        let info = StepInfo::clean(
            0,
            self.clock.timestamp(),
            self.soc,
            sample.load_kw,
            sample.generation_kw,
        );
        (observation, info)
    }

    /// Executes one transition with the requested charge/discharge power.
    ///
    /// Positive `requested_kw` charges, negative discharges. The request
    /// is clamped to the rated envelope, applied to SoC under efficiency
    /// losses, reconciled against the instantaneous PV/load mismatch, and
    /// the resulting grid exchange is priced by the time-of-use tariff.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::NotReset` before the first `reset` and
    /// `EnvError::EpisodeOver` once the episode has terminated.
    pub fn step(&mut self, requested_kw: f64) -> Result<StepResult, EnvError> {
        match self.status {
            EpisodeStatus::Uninitialized => return Err(EnvError::NotReset),
            EpisodeStatus::Terminated => {
                return Err(EnvError::EpisodeOver {
                    max_steps: self.config.episode.max_steps,
                });
            }
            EpisodeStatus::Ready => {}
        }

        self.step_count += 1;
        let dt_hours = self.config.episode.time_interval_hours;
        let priced_at = self.clock.timestamp();

        // 1. Exogenous signals for the current timestep
        let sample = self.draw_sample();

        let mut info = StepInfo::clean(
            self.step_count,
            priced_at,
            self.soc,
            sample.load_kw,
            sample.generation_kw,
        );
        info.requested_action_kw = requested_kw;

        // 2. Nominal clamp to the rated envelope
        let corrected = correct_action(
            requested_kw,
            self.config.action.min_kw,
            self.config.action.max_kw,
            self.config.penalty.action_weight,
        );
        info.corrected_action_kw = corrected.corrected_kw;
        info.action_penalty = corrected.penalty;
        if let Some(v) = corrected.violation {
            debug!(
                requested = v.requested,
                corrected = v.corrected,
                "action outside envelope, clamped"
            );
            info.violations.push(v);
        }

        // 3. First SoC pass with the corrected request
        let first = soc::apply(
            self.soc,
            corrected.corrected_kw,
            &self.config.battery,
            dt_hours,
            self.config.penalty.soc_weight,
        );
        self.soc = first.soc;

        // 4. Feasibility against the instantaneous PV/load mismatch
        let net_kw = sample.load_kw - sample.generation_kw;
        let actual_kw = resolve_feasible(corrected.corrected_kw, net_kw);
        info.actual_action_kw = actual_kw;

        // 5. Residual SoC pass so the net effect matches the realized action
        let second = soc::apply(
            self.soc,
            actual_kw - corrected.corrected_kw,
            &self.config.battery,
            dt_hours,
            self.config.penalty.soc_weight,
        );
        self.soc = second.soc;
        info.soc = self.soc;
        info.soc_penalty = first.penalty + second.penalty;
        for v in [first.violation, second.violation].into_iter().flatten() {
            debug!(
                proposed = v.requested,
                clamped = v.corrected,
                "SoC outside band, clamped"
            );
            info.violations.push(v);
        }

        // 6. Grid exchange priced by the time-of-use tariff
        let grid = grid_exchange(net_kw + actual_kw);
        let price = tier_for(self.clock.weekday(), self.clock.hour()).price(&self.config.tariff);
        info.grid_import_kw = grid.import_kw;
        info.grid_export_kw = grid.export_kw;
        info.price = price;
        info.cost = price * grid.import_kw;
        info.revenue = price * grid.export_kw;

        // 7. Reward, clock advance, termination
        let reward = info.revenue - info.cost - (info.action_penalty + info.soc_penalty);

        self.clock.advance();
        let observation = self.observe(sample);

        let terminated = self.step_count >= self.config.episode.max_steps;
        if terminated {
            self.status = EpisodeStatus::Terminated;
        }

        Ok(StepResult {
            observation,
            reward,
            terminated,
            truncated: false,
            info,
        })
    }

    /// Current state of charge.
    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// Steps executed since the last `reset`.
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Episode lifecycle state.
    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    /// Engine configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    fn draw_sample(&mut self) -> ExogenousSample {
        self.signals
            .sample(&self.clock)
            .clamped(&self.config.exogenous)
    }

    fn observe(&self, sample: ExogenousSample) -> Observation {
        let enc = self.clock.time_encoding();
        Observation {
            soc: self.soc,
            load_kw: sample.load_kw,
            generation_kw: sample.generation_kw,
            hour_sin: enc.hour_sin,
            hour_cos: enc.hour_cos,
            weekday_sin: enc.weekday_sin,
            weekday_cos: enc.weekday_cos,
        }
    }
}
