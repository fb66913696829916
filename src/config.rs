//! Tunables for a [`CollisionSystem`](crate::world::CollisionSystem).

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};
use crate::math::Vec2;

pub const DEFAULT_CELL_SIZE: f64 = 100.0;
pub const DEFAULT_TIME_STEP: f64 = 1.0 / 60.0;

/// System configuration. Deserializes from camelCase JSON; missing keys take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemConfig {
    /// Acceleration applied to every dynamic body, in units/s². Y points down.
    pub gravity: Vec2,
    pub enable_sleeping: bool,
    /// Speed below which a body counts as resting, in units/s.
    pub velocity_sleep_threshold: f64,
    /// Milliseconds a body must rest before it sleeps.
    pub sleep_time_threshold: f64,
    /// Broad-phase cell edge length.
    pub cell_size: f64,
    /// Seconds advanced by [`CollisionSystem::step`](crate::world::CollisionSystem::step).
    pub time_step: f64,
    /// Fraction of excess penetration removed per step.
    pub position_correction: f64,
    /// Penetration tolerated without positional correction.
    pub penetration_slop: f64,
    /// Replaces the per-pair restitution when set.
    pub restitution_override: Option<f64>,
    pub constraint_iterations: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            gravity: Vec2::ZERO,
            enable_sleeping: false,
            velocity_sleep_threshold: 0.1,
            sleep_time_threshold: 500.0,
            cell_size: DEFAULT_CELL_SIZE,
            time_step: DEFAULT_TIME_STEP,
            position_correction: 0.2,
            penetration_slop: 0.01,
            restitution_override: None,
            constraint_iterations: 4,
        }
    }
}

impl SystemConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SystemConfig =
            serde_json::from_str(json).map_err(|e| PhysicsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| PhysicsError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PhysicsError::Config(format!("{} must be positive and finite, got {}", name, value)))
            }
        }
        fn non_negative(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(PhysicsError::Config(format!("{} must be non-negative and finite, got {}", name, value)))
            }
        }

        positive("cellSize", self.cell_size)?;
        positive("timeStep", self.time_step)?;
        non_negative("velocitySleepThreshold", self.velocity_sleep_threshold)?;
        non_negative("sleepTimeThreshold", self.sleep_time_threshold)?;
        non_negative("positionCorrection", self.position_correction)?;
        non_negative("penetrationSlop", self.penetration_slop)?;
        if !self.gravity.is_finite() {
            return Err(PhysicsError::Config("gravity must be finite".to_string()));
        }
        if let Some(e) = self.restitution_override {
            if !e.is_finite() {
                return Err(PhysicsError::Config("restitutionOverride must be finite".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SystemConfig::default();
        assert_eq!(config.gravity, Vec2::ZERO);
        assert!(!config.enable_sleeping);
        assert_eq!(config.sleep_time_threshold, 500.0);
        assert_eq!(config.cell_size, 100.0);
        assert_eq!(config.restitution_override, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial_camel_case() {
        let config = SystemConfig::from_json(
            r#"{"gravity": {"x": 0.0, "y": 9.8}, "enableSleeping": true, "cellSize": 64, "restitutionOverride": 0.5}"#,
        )
        .unwrap();
        assert_eq!(config.gravity, Vec2::new(0.0, 9.8));
        assert!(config.enable_sleeping);
        assert_eq!(config.cell_size, 64.0);
        assert_eq!(config.restitution_override, Some(0.5));
        // Unspecified keys keep defaults.
        assert_eq!(config.velocity_sleep_threshold, 0.1);
        assert_eq!(config.constraint_iterations, 4);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(SystemConfig::from_json("{not json"), Err(PhysicsError::Config(_))));
        assert!(matches!(SystemConfig::from_json(r#"{"cellSize": 0}"#), Err(PhysicsError::Config(_))));
        assert!(SystemConfig::from_json(r#"{"timeStep": -0.1}"#).is_err());
    }

    #[test]
    fn test_json_round_trip_keeps_camel_case() {
        let json = SystemConfig::default().to_json().unwrap();
        assert!(json.contains("\"timeStep\""));
        assert_eq!(SystemConfig::from_json(&json).unwrap(), SystemConfig::default());
    }
}
