//! Process defaults for interaction construction.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MOCK_PORT: u16 = 9393;
pub const DEFAULT_CONSUMER: &str = "consumer";

/// Defaults applied to interactions that do not set them explicitly.
///
/// ```yaml
/// default_port: 9393
/// consumer: checkout-web
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MockSettings {
    /// Port used when an interaction or a start/stop call does not name one.
    pub default_port: u16,
    /// Consumer name recorded on interactions without one.
    pub consumer: String,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_MOCK_PORT,
            consumer: DEFAULT_CONSUMER.to_string(),
        }
    }
}

impl MockSettings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let settings: MockSettings = serde_yaml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.default_port == 0 {
            anyhow::bail!("default_port must be between 1 and 65535");
        }
        if self.consumer.trim().is_empty() {
            anyhow::bail!("consumer name must not be empty");
        }
        Ok(())
    }
}
