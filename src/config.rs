use std::{fs, path::Path};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, item::DEFAULT_FINE_PER_DAY};

/// Currency label printed in front of amounts
pub const DEFAULT_CURRENCY: &str = "Rs.";

/// Threads used by the concurrent borrow demonstration
pub const DEFAULT_STRESS_THREADS: usize = 8;

/// Desk-wide settings.
///
/// Every field is optional in the JSON file; missing ones keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeskConfig {
    /// Daily fine applied to items added by the desk
    pub fine_per_day: Decimal,
    /// Label printed in front of amounts
    pub currency: String,
    /// Number of threads for the stress demonstration
    pub stress_threads: usize,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            fine_per_day: DEFAULT_FINE_PER_DAY,
            currency: DEFAULT_CURRENCY.to_string(),
            stress_threads: DEFAULT_STRESS_THREADS,
        }
    }
}

impl DeskConfig {
    /// Parse and validate a config from JSON text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and
    /// `ConfigError::Invalid` for a negative fine rate or zero threads.
    pub fn from_json_str(json: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|source| ConfigError::Parse { path: origin.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise see
    /// [`Self::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        tracing::debug!(path = %path.display(), "Loaded desk config");
        Self::from_json_str(&contents, path)
    }

    /// Check values that serde cannot
    fn validate(&self) -> Result<(), ConfigError> {
        if self.fine_per_day.is_sign_negative() {
            return Err(ConfigError::Invalid {
                field: "fine_per_day",
                reason: format!("must not be negative, got {}", self.fine_per_day),
            });
        }
        if self.stress_threads == 0 {
            return Err(ConfigError::Invalid {
                field: "stress_threads",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = DeskConfig::from_json_str("{}", Path::new("inline.json"));
        assert!(matches!(config, Ok(ref c) if *c == DeskConfig::default()));
    }

    #[test]
    fn test_partial_override() {
        let config =
            DeskConfig::from_json_str(r#"{"fine_per_day": "2.50"}"#, Path::new("inline.json"));
        assert!(matches!(
            config,
            Ok(DeskConfig { fine_per_day, ref currency, stress_threads: 8 })
                if fine_per_day == dec!(2.50) && currency == "Rs."
        ));
    }

    #[test]
    fn test_rejects_negative_rate() {
        let config =
            DeskConfig::from_json_str(r#"{"fine_per_day": "-1"}"#, Path::new("inline.json"));
        assert!(matches!(config, Err(ConfigError::Invalid { field: "fine_per_day", .. })));
    }

    #[test]
    fn test_rejects_unknown_field() {
        let config = DeskConfig::from_json_str(r#"{"late_fee": 3}"#, Path::new("inline.json"));
        assert!(matches!(config, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let config = DeskConfig::load(Path::new("/nonexistent/circulation-desk.json"));
        assert!(matches!(config, Err(ConfigError::Read { .. })));
    }
}
