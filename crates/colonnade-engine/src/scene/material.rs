use glam::{Mat4, Vec3, Vec4};

use crate::frame::{ConstantSource, DirtyCounter, MaterialConstants};

use super::MaterialId;

/// Surface parameters for the lit shader.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MaterialDesc {
    pub diffuse_albedo: Vec4,
    /// Reflectance at normal incidence.
    pub fresnel_r0: Vec3,
    /// 0 = perfectly smooth, 1 = fully rough.
    pub roughness: f32,
    /// Texture-coordinate transform.
    pub transform: Mat4,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            diffuse_albedo: Vec4::ONE,
            fresnel_r0: Vec3::splat(0.01),
            roughness: 0.25,
            transform: Mat4::IDENTITY,
        }
    }
}

impl MaterialDesc {
    pub fn new(diffuse_albedo: Vec4, fresnel_r0: f32, roughness: f32) -> Self {
        Self {
            diffuse_albedo,
            fresnel_r0: Vec3::splat(fresnel_r0),
            roughness,
            ..Self::default()
        }
    }
}

/// A named material owning one slot of the material constant buffer.
///
/// Setters mark the material dirty so the change reaches every frame
/// resource in the ring.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    id: MaterialId,
    desc: MaterialDesc,
    dirty: DirtyCounter,
}

impl Material {
    pub(crate) fn new(
        name: impl Into<String>,
        id: MaterialId,
        desc: MaterialDesc,
        frames_in_flight: usize,
    ) -> Self {
        Self {
            name: name.into(),
            id,
            desc,
            dirty: DirtyCounter::new(frames_in_flight),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn desc(&self) -> &MaterialDesc {
        &self.desc
    }

    pub fn set_diffuse_albedo(&mut self, albedo: Vec4) {
        self.desc.diffuse_albedo = albedo;
        self.dirty.mark();
    }

    pub fn set_fresnel_r0(&mut self, fresnel_r0: Vec3) {
        self.desc.fresnel_r0 = fresnel_r0;
        self.dirty.mark();
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.desc.roughness = roughness.clamp(0.0, 1.0);
        self.dirty.mark();
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.desc.transform = transform;
        self.dirty.mark();
    }
}

impl ConstantSource for Material {
    type Constants = MaterialConstants;

    fn slot(&self) -> usize {
        self.id.index()
    }

    fn dirty(&self) -> &DirtyCounter {
        &self.dirty
    }

    fn dirty_mut(&mut self) -> &mut DirtyCounter {
        &mut self.dirty
    }

    fn constants(&self) -> MaterialConstants {
        MaterialConstants {
            diffuse_albedo: self.desc.diffuse_albedo.to_array(),
            fresnel_r0: self.desc.fresnel_r0.to_array(),
            roughness: self.desc.roughness,
            mat_transform: self.desc.transform.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_mark_dirty() {
        let mut m = Material::new("stone", MaterialId(0), MaterialDesc::default(), 3);
        m.dirty_mut().consume();
        m.dirty_mut().consume();
        m.dirty_mut().consume();
        assert!(!m.dirty().is_dirty());

        m.set_roughness(0.7);
        assert_eq!(m.dirty().remaining(), 3);
        assert_eq!(m.constants().roughness, 0.7);
    }

    #[test]
    fn roughness_is_clamped() {
        let mut m = Material::new("m", MaterialId(0), MaterialDesc::default(), 1);
        m.set_roughness(4.0);
        assert_eq!(m.desc().roughness, 1.0);
    }

    #[test]
    fn constants_carry_desc() {
        let desc = MaterialDesc::new(Vec4::new(0.1, 0.2, 0.3, 1.0), 0.05, 0.3);
        let m = Material::new("m", MaterialId(4), desc, 3);
        let c = m.constants();

        assert_eq!(m.slot(), 4);
        assert_eq!(c.diffuse_albedo, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(c.fresnel_r0, [0.05; 3]);
        assert_eq!(c.mat_transform, Mat4::IDENTITY.to_cols_array_2d());
    }
}
