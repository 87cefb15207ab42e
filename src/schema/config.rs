//! Configuration types for headless playback.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_tick_rate() -> f32 {
    60.0
}

fn default_duration() -> f32 {
    5.0
}

/// Top-level player configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Simulated host ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f32,
    /// Simulated run time in seconds.
    #[serde(default = "default_duration")]
    pub duration: f32,
    /// Animations to attach at startup.
    pub placements: Vec<Placement>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            duration: default_duration(),
            placements: vec![Placement::default()],
        }
    }
}

/// An animation attached to one owning entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    /// Owning entity id.
    pub owner: u64,
    /// Path of the GIF (or compiled resource).
    pub resource: PathBuf,
    /// Material slot the display buffer is bound to.
    pub material_slot: String,
    /// Whether `resource` is a length-prefixed compiled resource.
    #[serde(default)]
    pub compiled: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            owner: 1,
            resource: PathBuf::from("animation.gif"),
            material_slot: "albedo_map".to_owned(),
            compiled: false,
        }
    }
}

impl PlayerConfig {
    /// Number of ticks needed to cover `duration`.
    pub fn tick_count(&self) -> u64 {
        (self.duration * self.tick_rate).ceil() as u64
    }

    /// Seconds per tick.
    #[inline]
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(ConfigError::InvalidTickRate);
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(ConfigError::InvalidDuration);
        }
        let mut owners = HashSet::new();
        for (i, placement) in self.placements.iter().enumerate() {
            if !owners.insert(placement.owner) {
                return Err(ConfigError::DuplicateOwner(placement.owner));
            }
            if placement.resource.as_os_str().is_empty() {
                return Err(ConfigError::MissingResource { placement: i });
            }
            if placement.material_slot.trim().is_empty() {
                return Err(ConfigError::InvalidMaterialSlot { placement: i });
            }
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Tick rate must be positive")]
    InvalidTickRate,
    #[error("Duration must be non-negative")]
    InvalidDuration,
    #[error("Owner {0} has more than one placement")]
    DuplicateOwner(u64),
    #[error("Placement {placement} has no resource path")]
    MissingResource { placement: usize },
    #[error("Placement {placement} has an invalid material slot name")]
    InvalidMaterialSlot { placement: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PlayerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.tick_count(), 300);
    }

    #[test]
    fn test_parse_with_defaults() {
        let json = r#"{
            "placements": [
                { "owner": 3, "resource": "spin.gif", "material_slot": "albedo" },
                { "owner": 4, "resource": "spin.gifc", "material_slot": "emissive", "compiled": true }
            ]
        }"#;
        let config: PlayerConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();

        assert_eq!(config.tick_rate, 60.0);
        assert_eq!(config.duration, 5.0);
        assert!(!config.placements[0].compiled);
        assert!(config.placements[1].compiled);
    }

    #[test]
    fn test_rejects_invalid() {
        let mut config = PlayerConfig::default();
        config.tick_rate = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTickRate)));

        let mut config = PlayerConfig::default();
        config.duration = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDuration)));

        let mut config = PlayerConfig::default();
        config.placements.push(Placement::default());
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateOwner(1))));

        let mut config = PlayerConfig::default();
        config.placements[0].material_slot = "  ".to_owned();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMaterialSlot { placement: 0 })
        ));

        let mut config = PlayerConfig::default();
        config.placements[0].resource = PathBuf::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingResource { placement: 0 })
        ));
    }
}
