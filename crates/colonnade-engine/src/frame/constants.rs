//! POD records uploaded into the per-frame constant buffers.
//!
//! Field order and padding mirror the uniform structs in `render/shaders/lit.wgsl`.
//! Matrices are column-major (`glam::Mat4::to_cols_array_2d`).

use bytemuck::{Pod, Zeroable};

pub const MAX_LIGHTS: usize = 16;

pub(crate) const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Per-object constants (`ObjectConstants` in WGSL).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub world: [[f32; 4]; 4],
    pub tex_transform: [[f32; 4]; 4],
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self {
            world: IDENTITY,
            tex_transform: IDENTITY,
        }
    }
}

/// Per-material constants (`MaterialConstants` in WGSL).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    pub diffuse_albedo: [f32; 4],
    pub fresnel_r0: [f32; 3],
    pub roughness: f32,
    pub mat_transform: [[f32; 4]; 4],
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            diffuse_albedo: [1.0; 4],
            fresnel_r0: [0.01; 3],
            roughness: 0.25,
            mat_transform: IDENTITY,
        }
    }
}

/// One light slot. Directional lights only use `strength` and `direction`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Light {
    pub strength: [f32; 3],
    pub falloff_start: f32,
    pub direction: [f32; 3],
    pub falloff_end: f32,
    pub position: [f32; 3],
    pub spot_power: f32,
}

/// Pass-global constants (`PassConstants` in WGSL).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PassConstants {
    pub view: [[f32; 4]; 4],
    pub inv_view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub eye_pos_w: [f32; 3],
    pub _pad0: f32,
    pub render_target_size: [f32; 2],
    pub inv_render_target_size: [f32; 2],
    pub near_z: f32,
    pub far_z: f32,
    pub total_time: f32,
    pub delta_time: f32,
    pub ambient_light: [f32; 4],
    pub lights: [Light; MAX_LIGHTS],
}

impl Default for PassConstants {
    fn default() -> Self {
        Self {
            view: IDENTITY,
            inv_view: IDENTITY,
            proj: IDENTITY,
            inv_proj: IDENTITY,
            view_proj: IDENTITY,
            inv_view_proj: IDENTITY,
            eye_pos_w: [0.0; 3],
            _pad0: 0.0,
            render_target_size: [0.0; 2],
            inv_render_target_size: [0.0; 2],
            near_z: 0.0,
            far_z: 0.0,
            total_time: 0.0,
            delta_time: 0.0,
            ambient_light: [0.0, 0.0, 0.0, 1.0],
            lights: [Light::default(); MAX_LIGHTS],
        }
    }
}
