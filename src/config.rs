//! Session configuration loaded from TOML.

use anyhow::{bail, Context, Result};
use artemis_core::Origin;
use artemis_net::MAX_FRAME_LEN;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

/// Where [`LinkConfig::load`] looks.
pub const DEFAULT_CONFIG_PATH: &str = "config/link.toml";

/// Tunables for a [`ClientSession`](crate::ClientSession).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Largest payload length accepted from the peer, in bytes.
    pub max_frame_len: usize,
    /// Direction of the frames this side receives.
    pub incoming_origin: Origin,
    /// Whether object updates are merged into the session's table.
    pub track_world: bool,
    /// Skip update entries that carry no fields instead of creating empty
    /// records for them.
    pub suppress_empty_updates: bool,
    /// Report merge failures as rejected entries and keep going. Off by
    /// default: a failed merge halts the session until reset.
    pub lenient_merge: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_frame_len: MAX_FRAME_LEN as usize,
            incoming_origin: Origin::Server,
            track_world: true,
            suppress_empty_updates: true,
            lenient_merge: false,
        }
    }
}

impl LinkConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err:#}. Using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Link config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                Self::default()
            }
        }
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(contents).context("Invalid link config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_len == 0 {
            bail!("max_frame_len must be positive");
        }
        if self.max_frame_len > u32::MAX as usize {
            bail!("max_frame_len {} exceeds the 32-bit length field", self.max_frame_len);
        }
        Ok(())
    }

    /// Direction of the frames this side sends.
    pub fn outgoing_origin(&self) -> Origin {
        self.incoming_origin.flip()
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
