//! Simulation configuration.
//!
//! [`SimConfig`] collects every tunable constant of the core. All fields have
//! defaults matching the original game's timing (15 ticks per second, a
//! 32x20 tile viewport), so a partial JSON document is enough:
//!
//! ```
//! use sable_engine::config::SimConfig;
//!
//! let config = SimConfig::from_json_str(r#"{ "rng_seed": 7 }"#).unwrap();
//! assert_eq!(config.rng_seed, 7);
//! assert_eq!(config.viewport_width, 32);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tunable constants of the simulation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed time step in seconds per tick. Must be positive and finite.
    pub fixed_dt: f64,
    /// Seed for the simulation RNG.
    pub rng_seed: u64,
    /// Visible viewport width in tiles.
    pub viewport_width: i32,
    /// Visible viewport height in tiles.
    pub viewport_height: i32,
    /// Tiles added on each side of the viewport to form the simulated region.
    pub activation_margin: i32,
    /// Vertical velocity added per tick to gravity-affected bodies.
    pub gravity_step: f32,
    /// Maximum downward velocity reached through gravity.
    pub terminal_velocity: f32,
    /// Ticks of invulnerability after the player takes damage.
    pub mercy_frames: u32,
    /// Player health cap.
    pub player_max_health: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 15.0,
            rng_seed: 0,
            viewport_width: 32,
            viewport_height: 20,
            activation_margin: 2,
            gravity_step: 0.5,
            terminal_velocity: 2.0,
            mercy_frames: 20,
            player_max_health: 9,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    ///
    /// # Errors
    ///
    /// [`EngineError::Parse`] on malformed JSON, or any error reported by
    /// [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json).map_err(|source| EngineError::Parse {
            what: "simulation config",
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its valid range.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        fn invalid(
            field: &'static str,
            value: impl ToString,
            reason: &'static str,
        ) -> Result<(), EngineError> {
            Err(EngineError::InvalidConfig {
                field,
                value: value.to_string(),
                reason,
            })
        }

        if !(self.fixed_dt > 0.0 && self.fixed_dt.is_finite()) {
            return invalid("fixed_dt", self.fixed_dt, "must be positive and finite");
        }
        if self.viewport_width <= 0 {
            return invalid("viewport_width", self.viewport_width, "must be positive");
        }
        if self.viewport_height <= 0 {
            return invalid("viewport_height", self.viewport_height, "must be positive");
        }
        if self.activation_margin < 0 {
            let margin = self.activation_margin;
            return invalid("activation_margin", margin, "must not be negative");
        }
        let step = self.gravity_step;
        if !(step > 0.0 && step.is_finite()) {
            return invalid("gravity_step", step, "must be positive and finite");
        }
        let terminal = self.terminal_velocity;
        if !(terminal >= step && terminal.is_finite()) {
            return invalid(
                "terminal_velocity",
                terminal,
                "must be finite and at least gravity_step",
            );
        }
        if self.player_max_health <= 0 {
            let health = self.player_max_health;
            return invalid("player_max_health", health, "must be positive");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
