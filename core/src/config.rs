use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    naming::{StimulusNaming, DEFAULT_DIGITS, DEFAULT_EXTENSION, MAX_DIGITS},
    pipeline::{GenerationParams, DEFAULT_IMG_PER_COND, DEFAULT_NUM_COND},
};

pub const DEFAULT_SEED: u64 = 1337;

/// Persistent generator settings. Missing fields fall back to their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub num_cond: usize,
    pub img_per_cond: usize,
    pub digits: usize,
    pub extension: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            num_cond: DEFAULT_NUM_COND,
            img_per_cond: DEFAULT_IMG_PER_COND,
            digits: DEFAULT_DIGITS,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Read the config at `path`, writing the defaults there first if it does not exist.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config from {}", path.display()))?;
            let config: Self = serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse config from {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid config at {}", path.display()))?;
            return Ok(config);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let config = Self::default();
        fs::write(path, serde_json::to_string_pretty(&config)?)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=MAX_DIGITS).contains(&self.digits),
            "digits must be between 1 and {}, got {}",
            MAX_DIGITS,
            self.digits
        );
        Ok(())
    }

    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            num_cond: self.num_cond,
            img_per_cond: self.img_per_cond,
            naming: StimulusNaming {
                digits: self.digits,
                extension: self.extension.clone(),
            },
        }
    }
}
