//! TOML-based environment configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

/// Top-level environment configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`EnvConfig::from_toml_file`] or use [`EnvConfig::baseline`]
/// for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    /// Episode length, step duration, and start timestamp.
    #[serde(default)]
    pub episode: EpisodeConfig,
    /// Battery plant parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Charge/discharge action envelope.
    #[serde(default)]
    pub action: ActionConfig,
    /// Exogenous load/generation signal parameters.
    #[serde(default)]
    pub exogenous: ExogenousConfig,
    /// Time-of-use tariff tiers.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Soft-constraint penalty weights.
    #[serde(default)]
    pub penalty: PenaltyConfig,
}

/// Episode length, step duration, and start timestamp.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EpisodeConfig {
    /// Number of steps before the episode terminates (must be > 0).
    pub max_steps: u32,
    /// Duration of one step in hours (must be > 0).
    pub time_interval_hours: f64,
    /// Simulated timestamp at episode start (quoted ISO-8601 in TOML).
    pub start_time: NaiveDateTime,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_steps: 24,
            time_interval_hours: 1.0,
            start_time: default_start_time(),
        }
    }
}

/// 2024-01-01 00:00, a Monday. Episodes are reproducible by construction;
/// wall clock is never consulted.
fn default_start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("literal timestamp is valid")
}

/// Battery plant parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Energy capacity (kWh, must be > 0).
    pub capacity_kwh: f64,
    /// State of charge at episode start (fraction).
    pub initial_soc: f64,
    /// Lower SoC bound (fraction).
    pub soc_min: f64,
    /// Upper SoC bound (fraction).
    pub soc_max: f64,
    /// Round-trip efficiency (0 < eta <= 1).
    pub eta: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            initial_soc: 0.5,
            soc_min: 0.1,
            soc_max: 0.95,
            eta: 0.9,
        }
    }
}

/// Charge/discharge action envelope (kW; positive = charge).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionConfig {
    /// Rated discharge power (kW, <= 0).
    pub min_kw: f64,
    /// Rated charge power (kW, >= 0).
    pub max_kw: f64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            min_kw: -1.0,
            max_kw: 1.0,
        }
    }
}

/// Exogenous load/generation signal parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExogenousConfig {
    /// Signal source: `"synthetic"` or `"series"`.
    pub source: String,
    /// Lower load clamp (kW).
    pub load_min_kw: f64,
    /// Upper load clamp (kW).
    pub load_max_kw: f64,
    /// Lower generation clamp (kW).
    pub generation_min_kw: f64,
    /// Upper generation clamp (kW).
    pub generation_max_kw: f64,
    /// Synthetic PV peak output at solar noon (kW).
    pub pv_peak_kw: f64,
    /// Synthetic load baseline (kW).
    pub load_base_kw: f64,
    /// Synthetic load daily swing amplitude (kW).
    pub load_amp_kw: f64,
    /// Gaussian noise standard deviation applied to both signals (kW).
    pub noise_std: f64,
}

impl Default for ExogenousConfig {
    fn default() -> Self {
        Self {
            source: "synthetic".to_string(),
            load_min_kw: 0.0,
            load_max_kw: 1.0,
            generation_min_kw: 0.0,
            generation_max_kw: 1.0,
            pv_peak_kw: 1.0,
            load_base_kw: 0.5,
            load_amp_kw: 0.5,
            noise_std: 0.0,
        }
    }
}

/// Time-of-use tariff tiers (currency per kWh).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Off-peak price.
    pub price_low: f64,
    /// Shoulder price.
    pub price_mid: f64,
    /// Peak price.
    pub price_high: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            price_low: 0.1,
            price_mid: 0.2,
            price_high: 0.3,
        }
    }
}

/// Soft-constraint penalty weights.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PenaltyConfig {
    /// Weight on action-envelope violations (miu_p in the literature).
    pub action_weight: f64,
    /// Weight on SoC-bound violations (lamda_p in the literature).
    pub soc_weight: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            action_weight: 10.0,
            soc_weight: 10.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field} — {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.soc_min"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl EnvConfig {
    /// Returns the baseline scenario: one simulated day at hourly
    /// resolution with the default plant.
    pub fn baseline() -> Self {
        Self {
            episode: EpisodeConfig::default(),
            battery: BatteryConfig::default(),
            action: ActionConfig::default(),
            exogenous: ExogenousConfig::default(),
            tariff: TariffConfig::default(),
            penalty: PenaltyConfig::default(),
        }
    }

    /// Returns the tight-bounds preset: narrow SoC band, lossier battery,
    /// doubled penalty weights. Exercises the correction paths hard.
    pub fn tight_bounds() -> Self {
        Self {
            battery: BatteryConfig {
                soc_min: 0.3,
                soc_max: 0.7,
                eta: 0.85,
                ..BatteryConfig::default()
            },
            penalty: PenaltyConfig {
                action_weight: 20.0,
                soc_weight: 20.0,
            },
            ..Self::baseline()
        }
    }

    /// Returns the week-long preset: 168 hourly steps with noisy
    /// synthetic signals, covering the full weekday/weekend tariff cycle.
    pub fn week_long() -> Self {
        Self {
            episode: EpisodeConfig {
                max_steps: 168,
                ..EpisodeConfig::default()
            },
            exogenous: ExogenousConfig {
                noise_std: 0.05,
                ..ExogenousConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "tight_bounds", "week_long"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "tight_bounds" => Ok(Self::tight_bounds()),
            "week_long" => Ok(Self::week_long()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all invariants and returns every violation found.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let ep = &self.episode;
        if ep.max_steps == 0 {
            errors.push(ConfigError::new("episode.max_steps", "must be > 0"));
        }
        if ep.time_interval_hours <= 0.0 {
            errors.push(ConfigError::new("episode.time_interval_hours", "must be > 0"));
        }

        let bat = &self.battery;
        if bat.capacity_kwh <= 0.0 {
            errors.push(ConfigError::new("battery.capacity_kwh", "must be > 0"));
        }
        if !(bat.eta > 0.0 && bat.eta <= 1.0) {
            errors.push(ConfigError::new("battery.eta", "must be in (0, 1]"));
        }
        if bat.soc_min > bat.soc_max {
            errors.push(ConfigError::new("battery.soc_min", "must be <= battery.soc_max"));
        }
        if !(0.0..=1.0).contains(&bat.soc_min) || !(0.0..=1.0).contains(&bat.soc_max) {
            errors.push(ConfigError::new(
                "battery.soc_min",
                "bounds must lie in [0.0, 1.0]",
            ));
        }
        if bat.initial_soc < bat.soc_min || bat.initial_soc > bat.soc_max {
            errors.push(ConfigError::new(
                "battery.initial_soc",
                "must lie within [battery.soc_min, battery.soc_max]",
            ));
        }

        let act = &self.action;
        if act.min_kw > act.max_kw {
            errors.push(ConfigError::new("action.min_kw", "must be <= action.max_kw"));
        }

        let ex = &self.exogenous;
        if ex.source != "synthetic" && ex.source != "series" {
            errors.push(ConfigError::new(
                "exogenous.source",
                format!("must be \"synthetic\" or \"series\", got \"{}\"", ex.source),
            ));
        }
        if ex.load_min_kw > ex.load_max_kw {
            errors.push(ConfigError::new(
                "exogenous.load_min_kw",
                "must be <= exogenous.load_max_kw",
            ));
        }
        if ex.generation_min_kw > ex.generation_max_kw {
            errors.push(ConfigError::new(
                "exogenous.generation_min_kw",
                "must be <= exogenous.generation_max_kw",
            ));
        }
        if ex.noise_std < 0.0 {
            errors.push(ConfigError::new("exogenous.noise_std", "must be >= 0"));
        }

        let t = &self.tariff;
        if t.price_low < 0.0 || t.price_mid < 0.0 || t.price_high < 0.0 {
            errors.push(ConfigError::new("tariff", "prices must be >= 0"));
        }

        let p = &self.penalty;
        if p.action_weight < 0.0 {
            errors.push(ConfigError::new("penalty.action_weight", "must be >= 0"));
        }
        if p.soc_weight < 0.0 {
            errors.push(ConfigError::new("penalty.soc_weight", "must be >= 0"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = EnvConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in EnvConfig::PRESETS {
            let cfg = EnvConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = EnvConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[episode]
max_steps = 48
time_interval_hours = 0.5
start_time = "2024-06-03T00:00:00"

[battery]
capacity_kwh = 15.0
initial_soc = 0.4
soc_min = 0.2
soc_max = 0.9
eta = 0.92

[action]
min_kw = -2.0
max_kw = 2.0

[exogenous]
source = "synthetic"
load_max_kw = 2.0
generation_max_kw = 2.5
pv_peak_kw = 2.5
noise_std = 0.02

[tariff]
price_low = 0.08
price_mid = 0.18
price_high = 0.32

[penalty]
action_weight = 5.0
soc_weight = 15.0
"#;
        let cfg = EnvConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.episode.max_steps), Some(48));
        assert_eq!(cfg.as_ref().map(|c| c.battery.capacity_kwh), Some(15.0));
        assert_eq!(cfg.as_ref().map(|c| c.penalty.soc_weight), Some(15.0));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[battery]
initial_soc = 0.6
"#;
        let cfg = EnvConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        // initial_soc overridden
        assert_eq!(cfg.as_ref().map(|c| c.battery.initial_soc), Some(0.6));
        // everything else kept default
        assert_eq!(cfg.as_ref().map(|c| c.episode.max_steps), Some(24));
        assert_eq!(cfg.as_ref().map(|c| c.tariff.price_high), Some(0.3));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[battery]
bogus_field = true
"#;
        let result = EnvConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn validation_catches_inverted_soc_bounds() {
        let mut cfg = EnvConfig::baseline();
        cfg.battery.soc_min = 0.9;
        cfg.battery.soc_max = 0.2;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.soc_min"));
    }

    #[test]
    fn validation_catches_nonpositive_capacity() {
        let mut cfg = EnvConfig::baseline();
        cfg.battery.capacity_kwh = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.capacity_kwh"));
    }

    #[test]
    fn validation_catches_bad_efficiency() {
        let mut cfg = EnvConfig::baseline();
        cfg.battery.eta = 0.0;
        assert!(cfg.validate().iter().any(|e| e.field == "battery.eta"));
        cfg.battery.eta = 1.2;
        assert!(cfg.validate().iter().any(|e| e.field == "battery.eta"));
    }

    #[test]
    fn validation_catches_initial_soc_outside_band() {
        let mut cfg = EnvConfig::baseline();
        cfg.battery.initial_soc = 0.05;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.initial_soc"));
    }

    #[test]
    fn validation_catches_bad_source() {
        let mut cfg = EnvConfig::baseline();
        cfg.exogenous.source = "oracle".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "exogenous.source"));
    }

    #[test]
    fn validation_catches_zero_steps() {
        let mut cfg = EnvConfig::baseline();
        cfg.episode.max_steps = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "episode.max_steps"));
    }

    #[test]
    fn default_start_is_monday_midnight() {
        use chrono::{Datelike, Timelike, Weekday};
        let cfg = EnvConfig::baseline();
        assert_eq!(cfg.episode.start_time.weekday(), Weekday::Mon);
        assert_eq!(cfg.episode.start_time.hour(), 0);
    }

    #[test]
    fn tight_bounds_narrows_the_band() {
        let base = EnvConfig::baseline();
        let tight = EnvConfig::tight_bounds();
        assert!(tight.battery.soc_min > base.battery.soc_min);
        assert!(tight.battery.soc_max < base.battery.soc_max);
        assert!(tight.penalty.soc_weight > base.penalty.soc_weight);
    }

    #[test]
    fn week_long_covers_a_full_week() {
        let cfg = EnvConfig::week_long();
        assert_eq!(cfg.episode.max_steps, 168);
    }
}
