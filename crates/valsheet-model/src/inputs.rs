//! Market inputs
//!
//! Everything the model needs that does not come from the statement
//! tables: market data, country rates, and the modeling assumptions.
//! These are produced by external collaborators (market data lookups,
//! the Damodaran datasets) and arrive here as a plain JSON file.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelResult;

/// Market data and assumptions for one valuation run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketInputs {
    /// Equity beta; absent when the lookup failed
    #[serde(default)]
    pub beta: Option<f64>,
    /// Market capitalization, in millions
    pub market_cap: f64,
    /// Current share price (midpoint of the day's range)
    pub price: f64,
    /// 10-year government bond yield
    pub riskfree_rate: f64,
    /// Country marginal tax rate
    pub marginal_tax_rate: f64,
    /// Country equity risk premium
    pub equity_risk_premium: f64,
    /// Mature-market equity risk premium
    #[serde(default = "default_mature_market_erp")]
    pub mature_market_erp: f64,
    /// Country risk premium on top of the mature-market ERP
    #[serde(default)]
    pub country_risk_premium: f64,
    /// Industry sales-to-capital ratio
    pub sales_to_capital: f64,
    /// Return on invested capital assumed in the terminal year
    #[serde(default = "default_terminal_roic")]
    pub terminal_roic: f64,
    /// Forward P/E applied in the trade comparison block
    #[serde(default = "default_forward_pe")]
    pub forward_pe: f64,
    /// ADR conversion ratio
    #[serde(default = "default_adr_ratio")]
    pub adr_ratio: f64,
}

fn default_mature_market_erp() -> f64 {
    0.045
}

fn default_terminal_roic() -> f64 {
    0.15
}

fn default_forward_pe() -> f64 {
    15.0
}

fn default_adr_ratio() -> f64 {
    1.0
}

impl MarketInputs {
    /// Load inputs from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_assumptions() {
        let inputs: MarketInputs = serde_json::from_str(
            r#"{
                "market_cap": 50000.0,
                "price": 31.5,
                "riskfree_rate": 0.04532,
                "marginal_tax_rate": 0.25,
                "equity_risk_premium": 0.05,
                "sales_to_capital": 1.5
            }"#,
        )
        .unwrap();

        assert_eq!(inputs.beta, None);
        assert_eq!(inputs.mature_market_erp, 0.045);
        assert_eq!(inputs.country_risk_premium, 0.0);
        assert_eq!(inputs.terminal_roic, 0.15);
        assert_eq!(inputs.forward_pe, 15.0);
        assert_eq!(inputs.adr_ratio, 1.0);
    }
}
