//! Time-of-use tariff lookup.

use chrono::Weekday;

use crate::config::TariffConfig;

/// Discrete grid price tier selected by time of day and day of week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    /// Nights, early mornings, and all of Sunday.
    Low,
    /// Weekday shoulders and Saturday daytime.
    Mid,
    /// Weekday working hours.
    High,
}

impl PriceTier {
    /// Returns the configured price for this tier.
    pub fn price(self, tariff: &TariffConfig) -> f64 {
        match self {
            Self::Low => tariff.price_low,
            Self::Mid => tariff.price_mid,
            Self::High => tariff.price_high,
        }
    }
}

/// Maps (weekday, hour) to a price tier.
///
/// Mon-Fri: hours 8-18 are high, 7 and 19-22 are mid, the rest low.
/// Saturday: hours 7-22 are mid, the rest low. Sunday: always low.
/// Total over every (weekday, hour) pair.
pub fn tier_for(weekday: Weekday, hour: u32) -> PriceTier {
    match weekday {
        Weekday::Sat => {
            if (7..23).contains(&hour) {
                PriceTier::Mid
            } else {
                PriceTier::Low
            }
        }
        Weekday::Sun => PriceTier::Low,
        _ => {
            if (8..19).contains(&hour) {
                PriceTier::High
            } else if hour == 7 || (19..23).contains(&hour) {
                PriceTier::Mid
            } else {
                PriceTier::Low
            }
        }
    }
}
