//! Post-hoc episode aggregation from step results.

use std::fmt;

use crate::env::{StepResult, ViolationKind};

/// Aggregate figures derived from a completed episode.
///
/// Computed post-hoc from the caller's `Vec<StepResult>` so the summary
/// can never disagree with the step data it came from.
#[derive(Debug, Clone)]
pub struct EpisodeReport {
    /// Steps aggregated.
    pub steps: usize,
    /// Sum of per-step rewards.
    pub total_reward: f64,
    /// Sum of grid-export revenue.
    pub total_revenue: f64,
    /// Sum of grid-import cost.
    pub total_cost: f64,
    /// Sum of weighted action-envelope penalties.
    pub action_penalty_total: f64,
    /// Sum of weighted SoC-bound penalties.
    pub soc_penalty_total: f64,
    /// Count of action-envelope violations.
    pub action_violations: usize,
    /// Count of SoC-bound violations.
    pub soc_violations: usize,
    /// Energy bought from the grid (kWh).
    pub energy_imported_kwh: f64,
    /// Energy sold to the grid (kWh).
    pub energy_exported_kwh: f64,
    /// Battery energy throughput (kWh, sum of |actual| * dt).
    pub battery_throughput_kwh: f64,
    /// SoC after the final step.
    pub final_soc: f64,
}

impl EpisodeReport {
    /// Aggregates a complete episode's step results.
    ///
    /// `dt_hours` converts per-step powers into energies.
    pub fn from_steps(steps: &[StepResult], dt_hours: f64) -> Self {
        let mut report = Self {
            steps: steps.len(),
            total_reward: 0.0,
            total_revenue: 0.0,
            total_cost: 0.0,
            action_penalty_total: 0.0,
            soc_penalty_total: 0.0,
            action_violations: 0,
            soc_violations: 0,
            energy_imported_kwh: 0.0,
            energy_exported_kwh: 0.0,
            battery_throughput_kwh: 0.0,
            final_soc: 0.0,
        };

        for r in steps {
            let i = &r.info;
            report.total_reward += r.reward;
            report.total_revenue += i.revenue;
            report.total_cost += i.cost;
            report.action_penalty_total += i.action_penalty;
            report.soc_penalty_total += i.soc_penalty;
            report.energy_imported_kwh += i.grid_import_kw * dt_hours;
            report.energy_exported_kwh += i.grid_export_kw * dt_hours;
            report.battery_throughput_kwh += i.actual_action_kw.abs() * dt_hours;

            for v in &i.violations {
                match v.kind {
                    ViolationKind::ActionBound => report.action_violations += 1,
                    ViolationKind::SocBound => report.soc_violations += 1,
                }
            }
        }

        if let Some(last) = steps.last() {
            report.final_soc = last.info.soc;
        }

        report
    }
}

impl fmt::Display for EpisodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Episode Report ---")?;
        writeln!(f, "Steps:                {}", self.steps)?;
        writeln!(f, "Total reward:         {:.4}", self.total_reward)?;
        writeln!(
            f,
            "Revenue / cost:       {:.4} / {:.4}",
            self.total_revenue, self.total_cost
        )?;
        writeln!(
            f,
            "Penalties (act/SoC):  {:.4} / {:.4}",
            self.action_penalty_total, self.soc_penalty_total
        )?;
        writeln!(
            f,
            "Violations (act/SoC): {} / {}",
            self.action_violations, self.soc_violations
        )?;
        writeln!(
            f,
            "Grid in / out:        {:.3} / {:.3} kWh",
            self.energy_imported_kwh, self.energy_exported_kwh
        )?;
        writeln!(
            f,
            "Battery throughput:   {:.3} kWh",
            self.battery_throughput_kwh
        )?;
        write!(f, "Final SoC:            {:.1}%", self.final_soc * 100.0)
    }
}
