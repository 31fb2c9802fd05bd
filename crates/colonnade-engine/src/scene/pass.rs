use glam::Mat4;

use crate::frame::PassConstants;

use super::camera::{OrbitCamera, Projection};
use super::lighting::LightRig;

/// Everything the per-pass constants are derived from.
#[derive(Debug, Clone, Copy)]
pub struct PassInputs<'a> {
    pub camera: &'a OrbitCamera,
    pub projection: &'a Projection,
    /// Render target size in physical pixels.
    pub target_size: [u32; 2],
    pub total_time: f32,
    pub delta_time: f32,
    pub lights: &'a LightRig,
}

/// Builds the pass record. Rebuilt and uploaded every frame, so it carries
/// no dirty tracking.
pub fn build_pass_constants(inputs: &PassInputs<'_>) -> PassConstants {
    let width = inputs.target_size[0].max(1) as f32;
    let height = inputs.target_size[1].max(1) as f32;

    let view = inputs.camera.view();
    let proj = inputs.projection.matrix(width / height);
    let view_proj = proj * view;

    let cols = |m: Mat4| m.to_cols_array_2d();

    PassConstants {
        view: cols(view),
        inv_view: cols(view.inverse()),
        proj: cols(proj),
        inv_proj: cols(proj.inverse()),
        view_proj: cols(view_proj),
        inv_view_proj: cols(view_proj.inverse()),
        eye_pos_w: inputs.camera.eye().to_array(),
        _pad0: 0.0,
        render_target_size: [width, height],
        inv_render_target_size: [1.0 / width, 1.0 / height],
        near_z: inputs.projection.near,
        far_z: inputs.projection.far,
        total_time: inputs.total_time,
        delta_time: inputs.delta_time,
        ambient_light: inputs.lights.ambient.to_array(),
        lights: inputs.lights.to_lights(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(size: [u32; 2]) -> PassConstants {
        let camera = OrbitCamera::default();
        let projection = Projection::default();
        let lights = LightRig::default();
        build_pass_constants(&PassInputs {
            camera: &camera,
            projection: &projection,
            target_size: size,
            total_time: 2.5,
            delta_time: 0.016,
            lights: &lights,
        })
    }

    #[test]
    fn inverse_pairs_multiply_to_identity() {
        let pass = build([800, 600]);
        let vp = Mat4::from_cols_array_2d(&pass.view_proj);
        let inv = Mat4::from_cols_array_2d(&pass.inv_view_proj);
        assert!((vp * inv).abs_diff_eq(Mat4::IDENTITY, 1e-3));
    }

    #[test]
    fn target_size_and_time() {
        let pass = build([800, 400]);
        assert_eq!(pass.render_target_size, [800.0, 400.0]);
        assert_eq!(pass.inv_render_target_size, [1.0 / 800.0, 1.0 / 400.0]);
        assert_eq!(pass.near_z, 1.0);
        assert_eq!(pass.far_z, 1000.0);
        assert_eq!(pass.total_time, 2.5);
        assert_eq!(pass.ambient_light, [0.25, 0.25, 0.35, 1.0]);
        assert_eq!(pass.lights[1].strength, [0.3; 3]);
    }

    #[test]
    fn zero_sized_target_does_not_divide_by_zero() {
        let pass = build([0, 0]);
        assert_eq!(pass.render_target_size, [1.0, 1.0]);
        assert!(pass.proj.iter().flatten().all(|v| v.is_finite()));
    }
}
