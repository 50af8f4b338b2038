//! Per-frame lighting inputs shared by all shaders

use serde::{Deserialize, Serialize};

use crate::rasterizer::{lerp, Basis, Vec2, Vec3};

/// Directional sun plus an ambient floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EnvironmentDesc", into = "EnvironmentDesc")]
pub struct Environment {
    sun_angle: Vec2,
    sun_direction: Vec3,
    /// Minimum light level in 0..1
    pub ambient: f32,
    /// Seconds since the scene started; drives animated shaders
    pub time: f32,
}

impl Environment {
    /// `sun_angle` is (elevation, azimuth) in degrees
    pub fn new(sun_angle: Vec2, ambient: f32) -> Self {
        let mut env = Self {
            sun_angle,
            sun_direction: Vec3::Z,
            ambient,
            time: 0.0,
        };
        env.set_sun_angle(sun_angle);
        env
    }

    pub fn set_sun_angle(&mut self, sun_angle: Vec2) {
        self.sun_angle = sun_angle;
        self.sun_direction = Basis::from_euler(Vec3::new(sun_angle.x, sun_angle.y, 0.0)).k;
    }

    /// Unit vector pointing towards the sun
    pub fn sun_direction(&self) -> Vec3 {
        self.sun_direction
    }

    /// Half-Lambert sun term lifted by the ambient floor
    pub fn light_intensity(&self, normal: Vec3) -> f32 {
        let sun = normal.dot(self.sun_direction) * 0.5 + 0.5;
        lerp(sun, 1.0, self.ambient)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Vec2::new(40.0, 200.0), 0.1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct EnvironmentDesc {
    sun_angle: Vec2,
    ambient: f32,
}

impl Default for EnvironmentDesc {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            sun_angle: env.sun_angle,
            ambient: env.ambient,
        }
    }
}

impl From<EnvironmentDesc> for Environment {
    fn from(d: EnvironmentDesc) -> Self {
        Environment::new(d.sun_angle, d.ambient)
    }
}

impl From<Environment> for EnvironmentDesc {
    fn from(e: Environment) -> Self {
        Self {
            sun_angle: e.sun_angle,
            ambient: e.ambient,
        }
    }
}
