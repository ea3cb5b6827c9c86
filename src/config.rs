//! Run configuration.
//!
//! Every field has a default, so a config file only needs to name the
//! values it overrides.

use crate::error::DedicationError;
use crate::optimization::simplex::SimplexOptions;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for one dedication run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedicationConfig {
    /// Quotes below this clean price are dropped when screening the universe.
    pub min_price: Decimal,
    /// Accrued interest is rounded to this many decimal places before it is
    /// added to the clean price.
    pub accrued_decimal_places: u32,
    /// Options for the built-in simplex solver.
    pub solver: SimplexOptions,
}

impl Default for DedicationConfig {
    fn default() -> Self {
        Self {
            min_price: dec!(0.05),
            accrued_decimal_places: 8,
            solver: SimplexOptions::default(),
        }
    }
}

impl DedicationConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DedicationError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<(), DedicationError> {
        if self.min_price < Decimal::ZERO {
            return Err(DedicationError::Config(format!(
                "min_price must not be negative, got {}",
                self.min_price
            )));
        }
        if self.solver.tolerance.is_nan() || self.solver.tolerance <= 0.0 {
            return Err(DedicationError::Config(format!(
                "solver tolerance must be positive, got {}",
                self.solver.tolerance
            )));
        }
        Ok(())
    }
}
