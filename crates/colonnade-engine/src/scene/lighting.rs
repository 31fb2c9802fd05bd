use glam::{Vec3, Vec4};

use crate::frame::{Light, MAX_LIGHTS};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels in.
    pub direction: Vec3,
    pub strength: Vec3,
}

/// Ambient term plus up to `MAX_LIGHTS` directional lights.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient: Vec4,
    pub lights: Vec<DirectionalLight>,
}

impl Default for LightRig {
    /// Key, fill and back light.
    fn default() -> Self {
        Self {
            ambient: Vec4::new(0.25, 0.25, 0.35, 1.0),
            lights: vec![
                DirectionalLight {
                    direction: Vec3::new(0.57735, -0.57735, 0.57735),
                    strength: Vec3::splat(0.8),
                },
                DirectionalLight {
                    direction: Vec3::new(-0.57735, -0.57735, 0.57735),
                    strength: Vec3::splat(0.3),
                },
                DirectionalLight {
                    direction: Vec3::new(0.0, -0.707, -0.707),
                    strength: Vec3::splat(0.15),
                },
            ],
        }
    }
}

impl LightRig {
    /// Fills the pass light array. Unused slots get zero strength.
    pub fn to_lights(&self) -> [Light; MAX_LIGHTS] {
        if self.lights.len() > MAX_LIGHTS {
            log::warn!(
                "light rig has {} lights; only the first {MAX_LIGHTS} are used",
                self.lights.len()
            );
        }

        let mut out = [Light::default(); MAX_LIGHTS];
        for (slot, light) in out.iter_mut().zip(&self.lights) {
            slot.direction = light.direction.to_array();
            slot.strength = light.strength.to_array();
        }
        out
    }
}
