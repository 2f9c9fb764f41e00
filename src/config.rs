//! Tester configuration.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::ContractError;

/// Limits and seeding for one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterConfig {
    /// Attempts at drawing a second, distinct value for a notifying property
    pub max_loops_per_property: usize,

    /// Exclusive upper bound on synthesized array lengths
    pub max_array_length: usize,

    /// Maximum nesting of recursive synthesis
    pub max_synthesis_depth: usize,

    /// Number of generated types kept for type-reference values
    pub generated_type_pool: usize,

    /// Fixed seed for reproducible synthesis; entropy when unset
    pub seed: Option<u64>,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            max_loops_per_property: 1000,
            max_array_length: 50,
            max_synthesis_depth: 32,
            generated_type_pool: 16,
            seed: None,
        }
    }
}

impl TesterConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects limits that would make every run fail.
    pub fn validate(&self) -> Result<(), ContractError> {
        let limits = [
            ("max_loops_per_property", self.max_loops_per_property),
            ("max_array_length", self.max_array_length),
            ("max_synthesis_depth", self.max_synthesis_depth),
            ("generated_type_pool", self.generated_type_pool),
        ];
        for (name, limit) in limits {
            if limit == 0 {
                return Err(ContractError::InvalidConfig(format!("{} must be greater than zero", name)));
            }
        }
        Ok(())
    }

    /// Parses and validates a JSON document; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ContractError> {
        let config: TesterConfig =
            serde_json::from_str(json).map_err(|e| ContractError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ContractError> {
        let path = path.as_ref();
        debug!("Loading tester configuration from {}", path.display());
        let json = fs::read_to_string(path)
            .map_err(|e| ContractError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }
}
