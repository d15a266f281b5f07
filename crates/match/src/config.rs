use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse engine config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid engine config: {0}")]
    OutOfRange(String),
}

/// Signal weights and cut-offs for [`crate::MatchEngine`].
///
/// The defaults reproduce the reference scoring exactly; every field can be
/// overridden from an `[engine]` TOML table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub amount_weight: Decimal,
    pub vendor_weight: Decimal,
    pub date_weight: Decimal,
    /// Minimum composite score for a pair to be returned.
    pub acceptance_threshold: Decimal,
    /// Amounts match when they differ by strictly less than this.
    pub amount_tolerance: Decimal,
    /// Dates match when at most this many whole days apart.
    pub date_window_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            amount_weight: Decimal::new(7, 1),
            vendor_weight: Decimal::new(3, 1),
            date_weight: Decimal::new(1, 1),
            acceptance_threshold: Decimal::new(6, 1),
            amount_tolerance: Decimal::new(1, 2),
            date_window_days: 3,
        }
    }
}

impl EngineConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in [
            ("amount_weight", self.amount_weight),
            ("vendor_weight", self.vendor_weight),
            ("date_weight", self.date_weight),
        ] {
            if weight < Decimal::ZERO {
                return Err(ConfigError::OutOfRange(format!("{name} must not be negative")));
            }
        }
        if self.acceptance_threshold < Decimal::ZERO || self.acceptance_threshold > Decimal::ONE {
            return Err(ConfigError::OutOfRange(
                "acceptance_threshold must be within [0, 1]".to_string(),
            ));
        }
        if self.amount_tolerance < Decimal::ZERO {
            return Err(ConfigError::OutOfRange(
                "amount_tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
