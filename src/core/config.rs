//! Hall configuration.
//!
//! A hall is configured once at startup. Configuration can be built in
//! code, deserialized with serde, or read from the key/value rows of a
//! system-settings table:
//!
//! ```
//! use bingo_hall::core::HallConfig;
//!
//! let config = HallConfig::from_settings([("auto_verify", "1"), ("rng_seed", "42")]).unwrap();
//! assert!(config.auto_verify);
//! assert_eq!(config.seed, Some(42));
//! ```

use serde::{Deserialize, Serialize};

use super::rng::DrawRng;
use crate::error::{BingoError, Result};

/// Engine-wide settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HallConfig {
    /// Seed for card generation and random ball draws. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Verify every attached card after each call and report winners.
    pub auto_verify: bool,
}

impl HallConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable auto verification.
    #[must_use]
    pub fn with_auto_verify(mut self, enabled: bool) -> Self {
        self.auto_verify = enabled;
        self
    }

    /// Read configuration from settings rows.
    ///
    /// Recognized keys are `auto_verify` ("0"/"1") and `rng_seed`. Other keys
    /// (login policy, sound effects, ...) belong to other layers and are
    /// ignored.
    pub fn from_settings<I, K, V>(settings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in settings {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            let invalid = || BingoError::InvalidSetting {
                key: key.to_string(),
                value: value.to_string(),
            };
            match key {
                "auto_verify" => {
                    config.auto_verify = match value {
                        "1" | "true" => true,
                        "0" | "false" => false,
                        _ => return Err(invalid()),
                    };
                }
                "rng_seed" => {
                    config.seed = Some(value.parse().map_err(|_| invalid())?);
                }
                _ => {}
            }
        }
        Ok(config)
    }

    /// Build the root RNG for this configuration.
    #[must_use]
    pub fn rng(&self) -> DrawRng {
        match self.seed {
            Some(seed) => DrawRng::new(seed),
            None => DrawRng::from_entropy(),
        }
    }
}
