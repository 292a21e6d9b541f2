//! State-of-charge update law with bound enforcement.

use crate::config::BatteryConfig;

use super::types::{StepViolation, ViolationKind};

/// Outcome of one SoC update pass.
#[derive(Debug, Clone)]
pub struct SocUpdate {
    /// SoC after the update, always inside the configured band.
    pub soc: f64,
    /// Weighted penalty for any bound clamp (zero when in band).
    pub penalty: f64,
    /// Violation record when the proposal left the band.
    pub violation: Option<StepViolation>,
}

/// Applies an efficiency-weighted energy transfer to the state of charge.
///
/// `SoC' = SoC + eta * power_kw * dt_hours / capacity_kwh`, clamped to
/// `[soc_min, soc_max]`. A clamp is priced at
/// `soc_weight * |proposed - clamped|` and reported as a violation.
///
/// The same law serves both update passes of a step: the nominal pass with
/// the corrected action and the residual pass from feasibility resolution.
/// Applying it with `power_kw == 0` is an exact no-op.
pub fn apply(
    soc: f64,
    power_kw: f64,
    battery: &BatteryConfig,
    dt_hours: f64,
    soc_weight: f64,
) -> SocUpdate {
    let proposed = soc + battery.eta * power_kw * dt_hours / battery.capacity_kwh;
    let clamped = proposed.clamp(battery.soc_min, battery.soc_max);
    let magnitude = (proposed - clamped).abs();

    let violation = (magnitude > 0.0).then(|| StepViolation {
        kind: ViolationKind::SocBound,
        requested: proposed,
        corrected: clamped,
        magnitude,
    });

    SocUpdate {
        soc: clamped,
        penalty: soc_weight * magnitude,
        violation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery() -> BatteryConfig {
        BatteryConfig {
            capacity_kwh: 10.0,
            initial_soc: 0.5,
            soc_min: 0.1,
            soc_max: 0.95,
            eta: 0.9,
        }
    }

    #[test]
    fn charging_raises_soc_by_weighted_energy() {
        // 1 kW for 1 h at eta 0.9 into 10 kWh: +0.09
        let u = apply(0.5, 1.0, &battery(), 1.0, 10.0);
        assert!((u.soc - 0.59).abs() < 1e-12);
        assert_eq!(u.penalty, 0.0);
        assert!(u.violation.is_none());
    }

    #[test]
    fn discharging_lowers_soc() {
        let u = apply(0.5, -1.0, &battery(), 1.0, 10.0);
        assert!((u.soc - 0.41).abs() < 1e-12);
        assert!(u.violation.is_none());
    }

    #[test]
    fn zero_input_is_an_exact_noop() {
        for soc in [0.1, 0.37, 0.5, 0.95] {
            let u = apply(soc, 0.0, &battery(), 1.0, 10.0);
            assert_eq!(u.soc, soc);
            assert_eq!(u.penalty, 0.0);
            assert!(u.violation.is_none());
        }
    }

    #[test]
    fn overcharge_clamps_to_upper_bound() {
        // 0.94 + 0.09 = 1.03 -> clamp at 0.95, overshoot 0.08
        let u = apply(0.94, 1.0, &battery(), 1.0, 10.0);
        assert_eq!(u.soc, 0.95);
        assert!((u.penalty - 0.8).abs() < 1e-9);
        let v = u.violation.expect("violation expected");
        assert_eq!(v.kind, ViolationKind::SocBound);
        assert_eq!(v.corrected, 0.95);
        assert!((v.magnitude - 0.08).abs() < 1e-9);
    }

    #[test]
    fn overdischarge_clamps_to_lower_bound() {
        let u = apply(0.12, -1.0, &battery(), 1.0, 10.0);
        assert_eq!(u.soc, 0.1);
        assert!(u.violation.is_some());
        assert!(u.penalty > 0.0);
    }

    #[test]
    fn result_always_inside_band() {
        let b = battery();
        for soc in [0.1, 0.5, 0.95] {
            for kw in [-100.0, -1.0, 0.0, 1.0, 100.0] {
                let u = apply(soc, kw, &b, 1.0, 10.0);
                assert!(u.soc >= b.soc_min && u.soc <= b.soc_max);
            }
        }
    }

    #[test]
    fn step_duration_scales_the_transfer() {
        // Half-hour step moves half the energy.
        let full = apply(0.5, 1.0, &battery(), 1.0, 10.0);
        let half = apply(0.5, 1.0, &battery(), 0.5, 10.0);
        assert!(((full.soc - 0.5) - 2.0 * (half.soc - 0.5)).abs() < 1e-12);
    }
}
