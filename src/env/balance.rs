//! Energy-balance feasibility resolution and grid exchange split.

/// Resolves a corrected action request against the instantaneous PV/load
/// mismatch and returns the physically realized action.
///
/// `net_load_kw = load - generation`; positive is a deficit the battery
/// may help cover, negative is a PV surplus it may absorb.
///
/// - A discharge request is capped at the existing deficit: the battery
///   never discharges into a surplus.
/// - A charge request is capped at the available PV surplus: the battery
///   never charges from the grid.
/// - Idle stays idle.
pub fn resolve_feasible(corrected_kw: f64, net_load_kw: f64) -> f64 {
    if corrected_kw < 0.0 {
        let deficit = net_load_kw.max(0.0);
        -(-corrected_kw).min(deficit)
    } else if corrected_kw > 0.0 {
        let surplus = (-net_load_kw).max(0.0);
        corrected_kw.min(surplus)
    } else {
        0.0
    }
}

/// Grid exchange for one step (both components >= 0, at most one nonzero).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridExchange {
    /// Power bought from the grid (kW).
    pub import_kw: f64,
    /// Power sold to the grid (kW).
    pub export_kw: f64,
}

/// Splits the post-battery net load into grid import and export.
///
/// `net_after_kw = net_load + actual_action`; positive means the grid
/// covers the remaining deficit, negative means the surplus is sold.
pub fn grid_exchange(net_after_kw: f64) -> GridExchange {
    if net_after_kw > 0.0 {
        GridExchange {
            import_kw: net_after_kw,
            export_kw: 0.0,
        }
    } else if net_after_kw < 0.0 {
        GridExchange {
            import_kw: 0.0,
            export_kw: -net_after_kw,
        }
    } else {
        GridExchange {
            import_kw: 0.0,
            export_kw: 0.0,
        }
    }
}
