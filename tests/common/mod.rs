//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use bms_sim::config::EnvConfig;
use bms_sim::env::BmsEnv;
use bms_sim::signals::SyntheticSignals;
use chrono::NaiveDate;

/// Construction-time seed shared by every fixture source.
pub const SIGNAL_SEED: u64 = 42;

/// Baseline configuration (24 hourly steps, default plant).
pub fn baseline_config() -> EnvConfig {
    EnvConfig::baseline()
}

/// Engine over a synthetic source built from the given configuration.
pub fn synthetic_env(config: EnvConfig) -> BmsEnv<SyntheticSignals> {
    let signals = SyntheticSignals::from_config(&config.exogenous, SIGNAL_SEED);
    BmsEnv::new(config, signals).expect("fixture config should be valid")
}

/// Baseline with all synthetic signals flattened to zero: the bus is
/// balanced at every hour, so idle steps are exactly reward-neutral.
pub fn dead_bus_config() -> EnvConfig {
    let mut cfg = EnvConfig::baseline();
    cfg.exogenous.pv_peak_kw = 0.0;
    cfg.exogenous.load_base_kw = 0.0;
    cfg.exogenous.load_amp_kw = 0.0;
    cfg
}

/// Baseline starting at solar noon with a strong PV surplus: flat load
/// 0.0, PV peak `pv_peak_kw`, generous generation clamp.
pub fn noon_surplus_config(pv_peak_kw: f64) -> EnvConfig {
    let mut cfg = EnvConfig::baseline();
    cfg.episode.start_time = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid timestamp");
    cfg.exogenous.pv_peak_kw = pv_peak_kw;
    cfg.exogenous.generation_max_kw = pv_peak_kw;
    cfg.exogenous.load_base_kw = 0.0;
    cfg.exogenous.load_amp_kw = 0.0;
    cfg
}

/// Baseline starting at solar noon with generation exactly matching a
/// flat load, so net load is zero on the first step.
pub fn noon_balanced_config(level_kw: f64) -> EnvConfig {
    let mut cfg = noon_surplus_config(level_kw);
    cfg.exogenous.load_base_kw = level_kw;
    cfg.exogenous.load_max_kw = level_kw.max(1.0);
    cfg
}

/// Runs a full episode under a constant action, returning every step.
pub fn run_constant_policy(
    env: &mut BmsEnv<SyntheticSignals>,
    action_kw: f64,
    seed: Option<u64>,
) -> Vec<bms_sim::env::StepResult> {
    env.reset(seed);
    let mut steps = Vec::new();
    loop {
        let r = env.step(action_kw).expect("step should succeed");
        let done = r.terminated;
        steps.push(r);
        if done {
            break;
        }
    }
    steps
}
