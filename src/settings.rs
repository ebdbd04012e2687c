//! Simulation parameters
//!
//! Supplied by the bootstrap layer, usually from a JSON file. Every field has
//! a default so partial files are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Physics tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsParams {
    /// Entity store capacity (also used for shapes)
    pub max_points: usize,
    /// Linear drag coefficient
    pub gamma: f32,
    /// Scale applied to a player's input intent to get acceleration
    pub acceleration: f32,
    /// Half-extent of a player's collision square
    pub player_radius: f32,
    /// Integrate remote players between updates (dead reckoning)
    pub extrapolate_remote: bool,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            max_points: 1024,
            gamma: 5.0,
            acceleration: 10.0,
            player_radius: 0.2,
            extrapolate_remote: false,
        }
    }
}

/// Local controller setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputParams {
    pub max_controllers: usize,
    /// Controllers driven by a random walk
    pub cpu_controllers: usize,
    /// Controllers driven by the pointer joystick
    pub player_controllers: usize,
}

impl Default for InputParams {
    fn default() -> Self {
        Self {
            max_controllers: 8,
            cpu_controllers: 0,
            player_controllers: 1,
        }
    }
}

/// Complete parameter set consumed by the core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parameters {
    pub physics: PhysicsParams,
    pub input: InputParams,
    /// Player roster capacity
    pub max_players: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            physics: PhysicsParams::default(),
            input: InputParams::default(),
            max_players: 16,
        }
    }
}

impl Parameters {
    /// Parse parameters from a JSON document and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::from_json(&json)?;
        log::info!("Loaded parameters from {}", path.display());
        Ok(params)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics.max_points == 0 {
            return Err(invalid("physics.maxPoints", "must be at least 1"));
        }
        if self.max_players == 0 {
            return Err(invalid("maxPlayers", "must be at least 1"));
        }
        if self.physics.gamma.is_nan() || self.physics.gamma < 0.0 {
            return Err(invalid("physics.gamma", "must be a non-negative number"));
        }
        if !self.physics.acceleration.is_finite() {
            return Err(invalid("physics.acceleration", "must be finite"));
        }
        if !(0.0..1.0).contains(&self.physics.player_radius) {
            return Err(invalid("physics.playerRadius", "must be in [0, 1)"));
        }
        let local = self.input.cpu_controllers + self.input.player_controllers;
        if local > self.input.max_controllers {
            return Err(invalid(
                "input",
                format!(
                    "{local} controllers configured but maxControllers is {}",
                    self.input.max_controllers
                ),
            ));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = Parameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.physics.max_points, 1024);
        assert_eq!(params.physics.gamma, 5.0);
        assert_eq!(params.physics.acceleration, 10.0);
        assert_eq!(params.physics.player_radius, 0.2);
        assert_eq!(params.max_players, 16);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params = Parameters::from_json(r#"{"physics":{"gamma":0.5},"maxPlayers":4}"#).unwrap();
        assert_eq!(params.physics.gamma, 0.5);
        assert_eq!(params.physics.max_points, 1024);
        assert_eq!(params.max_players, 4);
        assert_eq!(params.input, InputParams::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut params = Parameters::default();
        params.physics.extrapolate_remote = true;
        params.input.cpu_controllers = 2;
        let json = params.to_json().unwrap();
        assert!(json.contains("extrapolateRemote"));
        assert_eq!(Parameters::from_json(&json).unwrap(), params);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            Parameters::from_json(r#"{"physics":{"maxPoints":0}}"#),
            Err(ConfigError::Invalid { name: "physics.maxPoints", .. })
        ));
        assert!(matches!(
            Parameters::from_json(r#"{"physics":{"playerRadius":1.5}}"#),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            Parameters::from_json(r#"{"input":{"maxControllers":1,"cpuControllers":1}}"#),
            Err(ConfigError::Invalid { name: "input", .. })
        ));
        assert!(matches!(
            Parameters::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Parameters::load("/nonexistent/arena-sync.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
