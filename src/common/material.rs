//! Defines physical material properties.

use serde::{Deserialize, Serialize};

/// Physical properties of a body affecting mass derivation, collisions and drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "MaterialJson")]
pub struct Material {
    /// Mass per unit area, used when a body is created without an explicit mass.
    pub density: f64,
    /// Coefficient of restitution (bounciness). Range [0, 1].
    /// 0 = perfectly inelastic (no bounce), 1 = perfectly elastic.
    pub restitution: f64,
    /// Coulomb friction coefficient. Range [0, infinity).
    pub friction: f64,
    /// Linear drag applied during integration. Range [0, infinity).
    pub air_resistance: f64,
}

impl Material {
    /// Creates a material, clamping every coefficient into its valid range.
    pub fn new(density: f64, restitution: f64, friction: f64, air_resistance: f64) -> Self {
        Material {
            density: if density.is_finite() && density > 0.0 { density } else { 1.0 },
            restitution: restitution.clamp(0.0, 1.0),
            friction: friction.max(0.0),
            air_resistance: air_resistance.max(0.0),
        }
    }

    /// Copy of this material with the restitution replaced (and clamped).
    pub fn with_restitution(self, restitution: f64) -> Self {
        Material { restitution: restitution.clamp(0.0, 1.0), ..self }
    }

    pub fn with_friction(self, friction: f64) -> Self {
        Material { friction: friction.max(0.0), ..self }
    }
}

/// Raw JSON form. Deserialized materials go through [`Material::new`] so the
/// coefficients are clamped like any other.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MaterialJson {
    density: f64,
    restitution: f64,
    friction: f64,
    air_resistance: f64,
}

impl Default for MaterialJson {
    fn default() -> Self {
        let m = Material::default();
        MaterialJson {
            density: m.density,
            restitution: m.restitution,
            friction: m.friction,
            air_resistance: m.air_resistance,
        }
    }
}

impl From<MaterialJson> for Material {
    fn from(raw: MaterialJson) -> Self {
        Material::new(raw.density, raw.restitution, raw.friction, raw.air_resistance)
    }
}

impl Default for Material {
    fn default() -> Self {
        Material {
            density: 1.0,
            restitution: 0.2,
            friction: 0.1,
            air_resistance: 0.0,
        }
    }
}
