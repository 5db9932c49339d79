//! Energy/CO2/cost arithmetic for saved tokens.
//!
//! Pure functions of the token delta; the pipeline itself only supplies
//! token counts. Carbon intensity comes from a static per-zone table of
//! 2024 grid averages rather than a live API.

use serde::{Deserialize, Serialize};

/// Watt-hours per token for GPT-3.5 class models. GPT-4 class is roughly
/// 0.001, local models roughly 0.0001.
pub const DEFAULT_WH_PER_TOKEN: f64 = 0.00024;

/// USD per 1000 input tokens.
pub const DEFAULT_USD_PER_1K_TOKENS: f64 = 0.0005;

/// Fallback grid carbon intensity in gCO2eq/kWh by zone code.
pub fn fallback_carbon_intensity(zone: &str) -> f64 {
    match zone {
        "US-CAL-CISO" => 200.0,
        "US" => 400.0,
        "US-EAST" => 450.0,
        "US-WEST" => 250.0,
        "GB" => 220.0,
        "FR" => 60.0,
        "DE" => 380.0,
        "CN" => 550.0,
        "IN" => 630.0,
        "AU" => 510.0,
        "EU" => 250.0,
        // Global average
        _ => 475.0,
    }
}

/// Savings attributable to one compression run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Savings {
    pub tokens_saved: usize,
    pub energy_wh: f64,
    pub co2_grams: f64,
    pub cost_saved_usd: f64,
}

/// Converts a saved-token count into energy, emissions, and cost.
#[derive(Debug, Clone, Copy)]
pub struct SavingsEstimator {
    pub wh_per_token: f64,
    pub grid_gco2_per_kwh: f64,
    pub usd_per_1k_tokens: f64,
}

impl SavingsEstimator {
    pub fn for_zone(zone: &str) -> Self {
        Self {
            grid_gco2_per_kwh: fallback_carbon_intensity(zone),
            ..Self::default()
        }
    }

    pub fn estimate(&self, tokens_saved: usize) -> Savings {
        let energy_wh = tokens_saved as f64 * self.wh_per_token;
        Savings {
            tokens_saved,
            energy_wh,
            co2_grams: (energy_wh / 1000.0) * self.grid_gco2_per_kwh,
            cost_saved_usd: tokens_saved as f64 / 1000.0 * self.usd_per_1k_tokens,
        }
    }
}

impl Default for SavingsEstimator {
    fn default() -> Self {
        Self {
            wh_per_token: DEFAULT_WH_PER_TOKEN,
            grid_gco2_per_kwh: fallback_carbon_intensity("US-CAL-CISO"),
            usd_per_1k_tokens: DEFAULT_USD_PER_1K_TOKENS,
        }
    }
}
