//! Combat tuning, loaded from TOML.
//!
//! Every field has a default matching the shipped game feel, so a config
//! file only needs to list what it overrides:
//!
//! ```toml
//! [defense]
//! reaction_window = 0.1
//! window_policy = "restart"
//!
//! [meter]
//! max_hp = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Errors from loading or validating a combat config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse combat config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid combat config: {0}")]
    Invalid(String),
}

/// What a contact does when a reaction window is already open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Keep the open window; the new contact only refreshes knockback direction.
    #[default]
    KeepFirst,
    /// Restart the window (last contact wins).
    Restart,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub defense: DefenseTuning,
    pub meter: MeterTuning,
    pub effects: EffectTuning,
}

/// Defense timings (seconds) and damage/reward amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseTuning {
    /// How long after contact a parry is still honored
    pub reaction_window: f32,
    /// Parry lockout after a successful parry (anti-mash)
    pub parry_cooldown: f32,
    /// Invulnerability after a parry
    pub parry_invincibility: f32,
    /// Invulnerability (and i-frames) after taking damage
    pub damage_invincibility: f32,
    /// One-shot tint flash, and the half-period of the low-health flash
    pub flash_time: f32,
    /// Half-period of the fast i-frame flash
    pub fast_flash_time: f32,
    pub window_policy: WindowPolicy,

    pub parry_sp_reward: i32,
    pub block_damage: i32,
    pub block_opponent_reward: i32,
    pub hit_damage: i32,
    pub hit_opponent_reward: i32,
    pub super_damage: i32,

    pub knockback_horizontal: f32,
    pub knockback_vertical: f32,
}

impl Default for DefenseTuning {
    fn default() -> Self {
        Self {
            reaction_window: 1.0 / 15.0,
            parry_cooldown: 5.0 / 16.0,
            parry_invincibility: 1.0 / 4.0,
            damage_invincibility: 2.0 / 3.0,
            flash_time: 1.0 / 6.0,
            fast_flash_time: 1.0 / 15.0,
            window_policy: WindowPolicy::KeepFirst,

            parry_sp_reward: 4,
            block_damage: 1,
            block_opponent_reward: 2,
            hit_damage: 2,
            hit_opponent_reward: 4,
            super_damage: 4,

            knockback_horizontal: 6.0,
            knockback_vertical: 6.0,
        }
    }
}

impl DefenseTuning {
    pub fn reaction_window(&self) -> Duration {
        secs(self.reaction_window)
    }

    pub fn parry_cooldown(&self) -> Duration {
        secs(self.parry_cooldown)
    }

    pub fn parry_invincibility(&self) -> Duration {
        secs(self.parry_invincibility)
    }

    pub fn damage_invincibility(&self) -> Duration {
        secs(self.damage_invincibility)
    }

    pub fn flash_time(&self) -> Duration {
        secs(self.flash_time)
    }

    pub fn half_flash_time(&self) -> Duration {
        secs(self.flash_time / 2.0)
    }

    pub fn fast_flash_time(&self) -> Duration {
        secs(self.fast_flash_time)
    }
}

/// HP/SP limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterTuning {
    pub max_hp: i32,
    pub max_sp: i32,
    /// SP per super bar
    pub tier_size: i32,
    /// `0 < hp <= low_hp_threshold` starts the low-health flash
    pub low_hp_threshold: i32,
    /// Interval of the displayed-SP drain after spending meter
    pub drain_interval: f32,
    /// SP the displayed value moves per drain step
    pub drain_step: i32,
    /// Bars granted once at the start of a practice session
    pub practice_tiers: i32,
}

impl Default for MeterTuning {
    fn default() -> Self {
        Self {
            max_hp: 24,
            max_sp: 120,
            tier_size: 24,
            low_hp_threshold: 2,
            drain_interval: 1.0 / 20.0,
            drain_step: 4,
            practice_tiers: 3,
        }
    }
}

impl MeterTuning {
    pub fn max_tier(&self) -> u8 {
        (self.max_sp / self.tier_size) as u8
    }

    pub fn drain_interval(&self) -> Duration {
        secs(self.drain_interval)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTuning {
    /// Hit sparks preallocated per defender
    pub spark_pool_size: usize,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self { spark_pool_size: 6 }
    }
}

impl CombatConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.defense;
        let durations = [
            ("defense.reaction_window", d.reaction_window),
            ("defense.parry_cooldown", d.parry_cooldown),
            ("defense.parry_invincibility", d.parry_invincibility),
            ("defense.damage_invincibility", d.damage_invincibility),
            ("defense.flash_time", d.flash_time),
            ("defense.fast_flash_time", d.fast_flash_time),
            ("meter.drain_interval", self.meter.drain_interval),
        ];
        for (name, value) in durations {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number of seconds (got {value})"
                )));
            }
        }

        let amounts = [
            ("defense.parry_sp_reward", d.parry_sp_reward),
            ("defense.block_damage", d.block_damage),
            ("defense.block_opponent_reward", d.block_opponent_reward),
            ("defense.hit_damage", d.hit_damage),
            ("defense.hit_opponent_reward", d.hit_opponent_reward),
            ("defense.super_damage", d.super_damage),
            ("meter.drain_step", self.meter.drain_step),
            ("meter.practice_tiers", self.meter.practice_tiers),
            ("meter.low_hp_threshold", self.meter.low_hp_threshold),
        ];
        for (name, value) in amounts {
            if value < 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must not be negative (got {value})"
                )));
            }
        }

        let m = &self.meter;
        if m.max_hp <= 0 {
            return Err(ConfigError::Invalid("meter.max_hp must be positive".into()));
        }
        if m.tier_size <= 0 {
            return Err(ConfigError::Invalid("meter.tier_size must be positive".into()));
        }
        if m.max_sp <= 0 || m.max_sp % m.tier_size != 0 {
            return Err(ConfigError::Invalid(format!(
                "meter.max_sp ({}) must be a positive multiple of meter.tier_size ({})",
                m.max_sp, m.tier_size
            )));
        }
        if m.max_sp / m.tier_size > u8::MAX as i32 {
            return Err(ConfigError::Invalid("meter.max_sp allows too many tiers".into()));
        }
        if self.effects.spark_pool_size == 0 {
            return Err(ConfigError::Invalid(
                "effects.spark_pool_size must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

/// Seconds snapped to whole simulation ticks (at least one), so frame-based
/// windows keep their frame counts.
fn secs(value: f32) -> Duration {
    let ticks = (f64::from(value) * crate::SIMULATION_HZ).round().max(1.0);
    crate::fixed_tick() * ticks as u32
}
