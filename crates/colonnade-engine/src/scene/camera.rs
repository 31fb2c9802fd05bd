use std::f32::consts::PI;

use glam::{Mat4, Vec3};

const ORBIT_DEGREES_PER_PIXEL: f32 = 0.25;
const ZOOM_UNITS_PER_PIXEL: f32 = 0.05;

const PHI_MIN: f32 = 0.1;
const PHI_MAX: f32 = PI - 0.1;
const RADIUS_MIN: f32 = 5.0;
const RADIUS_MAX: f32 = 150.0;

/// Camera on a sphere around `target`.
///
/// `theta` is the azimuth in the XZ plane, `phi` the polar angle from +Y.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
    pub target: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            theta: 1.5 * PI,
            phi: 0.2 * PI,
            radius: 15.0,
            target: Vec3::ZERO,
        }
    }
}

impl OrbitCamera {
    /// Rotates by a pointer drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.theta += (ORBIT_DEGREES_PER_PIXEL * dx).to_radians();
        self.phi = (self.phi + (ORBIT_DEGREES_PER_PIXEL * dy).to_radians()).clamp(PHI_MIN, PHI_MAX);
    }

    /// Moves in or out by a pointer drag of `(dx, dy)` pixels.
    pub fn zoom(&mut self, dx: f32, dy: f32) {
        let delta = ZOOM_UNITS_PER_PIXEL * dx - ZOOM_UNITS_PER_PIXEL * dy;
        self.radius = (self.radius + delta).clamp(RADIUS_MIN, RADIUS_MAX);
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.target
            + self.radius * Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta)
    }

    /// Left-handed view matrix.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye(), self.target, Vec3::Y)
    }
}

/// Perspective projection with a 0..1 depth range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: 0.25 * PI,
            near: 1.0,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, aspect.max(f32::EPSILON), self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_eye_position() {
        let cam = OrbitCamera::default();
        let eye = cam.eye();
        assert!((eye.length() - 15.0).abs() < 1e-4);
        // theta = 1.5 pi puts the camera on -Z.
        assert!(eye.z < 0.0);
        assert!(eye.x.abs() < 1e-4);
    }

    #[test]
    fn orbit_is_a_quarter_degree_per_pixel() {
        let mut cam = OrbitCamera::default();
        let theta = cam.theta;
        cam.orbit(4.0, 0.0);
        assert!((cam.theta - theta - 1f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn phi_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, -10_000.0);
        assert_eq!(cam.phi, PHI_MIN);
        cam.orbit(0.0, 10_000.0);
        assert_eq!(cam.phi, PHI_MAX);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.zoom(20.0, 0.0);
        assert!((cam.radius - 16.0).abs() < 1e-5);
        cam.zoom(0.0, 10_000.0);
        assert_eq!(cam.radius, RADIUS_MIN);
        cam.zoom(10_000.0, 0.0);
        assert_eq!(cam.radius, RADIUS_MAX);
    }

    #[test]
    fn target_lands_in_front_of_view() {
        let cam = OrbitCamera::default();
        let p = cam.view().transform_point3(cam.target);
        assert!((p.z - cam.radius).abs() < 1e-3);
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let proj = Projection::default().matrix(16.0 / 9.0);
        let near = proj.project_point3(Vec3::new(0.0, 0.0, 1.0));
        let far = proj.project_point3(Vec3::new(0.0, 0.0, 1000.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }
}
