//! The "lit columns" scene.

use std::f32::consts::FRAC_PI_2;

use colonnade_engine::scene::{
    geometry, ItemDesc, ItemId, MaterialDesc, MaterialId, MeshId, Scene, SceneBuilder,
};
use glam::{Mat4, Quat, Vec3, Vec4};

/// Handles the app animates after the scene is built.
#[derive(Debug, Clone, Copy)]
pub struct Animated {
    pub diamonds: [Placement; 2],
    pub gold: MaterialId,
    pub gold_albedo: Vec4,
}

/// A render item plus the transform parts its animation recombines.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub item: ItemId,
    pub scale: Vec3,
    pub translation: Vec3,
}

impl Placement {
    /// World matrix with a rotation of `angle` radians around +Y.
    pub fn world(&self, angle: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_y(angle),
            self.translation,
        )
    }
}

const fn rgb(r: f32, g: f32, b: f32) -> Vec4 {
    Vec4::new(r, g, b, 1.0)
}

const FOREST_GREEN: Vec4 = rgb(0.133, 0.545, 0.133);
const LIGHT_STEEL_BLUE: Vec4 = rgb(0.690, 0.769, 0.871);
const DIM_GRAY: Vec4 = rgb(0.412, 0.412, 0.412);
const ORCHID: Vec4 = rgb(0.98, 0.55, 0.94);
const BLUE: Vec4 = rgb(0.0, 0.0, 1.0);
const RED: Vec4 = rgb(1.0, 0.0, 0.0);
const SKY_BLUE: Vec4 = rgb(0.529, 0.808, 0.922);
const GOLDENROD: Vec4 = rgb(0.855, 0.647, 0.125);
const DEEP_SKY_BLUE: Vec4 = rgb(0.0, 0.749, 1.0);
const SHINE_RED: Vec4 = rgb(0.85, 0.2, 0.2);

fn place(scale: Vec3, translation: Vec3) -> Mat4 {
    Mat4::from_translation(translation) * Mat4::from_scale(scale)
}

fn add(b: &mut SceneBuilder, mesh: MeshId, material: MaterialId, world: Mat4) -> ItemId {
    b.add_item(ItemDesc::new(mesh, material).with_world(world))
}

/// Builds the scene for a ring of `frames_in_flight` frame resources.
pub fn build(frames_in_flight: usize) -> (Scene, Animated) {
    let mut b = Scene::builder(frames_in_flight);

    let box_mesh = b.add_mesh(geometry::box_mesh(1.5, 0.5, 1.5));
    let grid = b.add_mesh(geometry::grid(20.0, 30.0, 60, 40));
    let sphere = b.add_mesh(geometry::sphere(0.5, 20, 20));
    let cylinder = b.add_mesh(geometry::cylinder(0.5, 0.5, 3.0, 20, 20));
    let diamond = b.add_mesh(geometry::diamond(1.0, 1.0));
    let wedge = b.add_mesh(geometry::wedge(1.5, 1.5, 1.5));
    let octahedron = b.add_mesh(geometry::octahedron(0.5));
    let tri_prism = b.add_mesh(geometry::triangular_prism(1.0, 1.0, 1.0));
    let hexagon = b.add_mesh(geometry::hexagon(1.5, 1.5));
    let octagon = b.add_mesh(geometry::octagon(1.5, 1.5));
    let cone = b.add_mesh(geometry::cone(1.0, 1.0, 20, 20));
    let pyramid = b.add_mesh(geometry::pyramid(1.0, 1.0));

    let bricks = b.add_material("bricks0", MaterialDesc::new(FOREST_GREEN, 0.02, 0.1));
    let _stone = b.add_material("stone0", MaterialDesc::new(LIGHT_STEEL_BLUE, 0.05, 0.3));
    let tile = b.add_material("tile0", MaterialDesc::new(DIM_GRAY, 0.02, 0.2));
    let wedge_mat = b.add_material("wedgeMat", MaterialDesc::new(ORCHID, 0.05, 0.3));
    let dia_mat = b.add_material("diaMat", MaterialDesc::new(BLUE, 0.05, 0.3));
    let octa_mat = b.add_material("octahedronMat", MaterialDesc::new(RED, 0.05, 0.3));
    let sky = b.add_material("sky", MaterialDesc::new(SKY_BLUE, 0.05, 0.3));
    let gold = b.add_material("gold", MaterialDesc::new(GOLDENROD, 0.05, 0.2));
    let shine_blue = b.add_material("shineBlue", MaterialDesc::new(DEEP_SKY_BLUE, 0.05, 0.05));
    let shine_red = b.add_material("shineRed", MaterialDesc::new(SHINE_RED, 0.05, 0.05));

    add(&mut b, pyramid, wedge_mat, place(Vec3::splat(1.5), Vec3::new(-1.0, 0.5, -6.5)));
    add(&mut b, cone, bricks, place(Vec3::new(3.0, 2.0, 3.0), Vec3::new(0.0, 7.5, 6.0)));
    add(&mut b, cylinder, dia_mat, place(Vec3::new(5.0, 1.0, 5.0), Vec3::new(0.0, 5.0, 6.0)));
    add(&mut b, hexagon, gold, place(Vec3::new(4.5, 2.0, 4.5), Vec3::new(0.0, 2.0, 6.0)));
    add(&mut b, tri_prism, sky, place(Vec3::new(1.5, 1.5, 2.5), Vec3::new(0.0, 0.5, -3.0)));
    add(&mut b, octahedron, octa_mat, place(Vec3::splat(0.5), Vec3::new(0.0, 1.5, -5.0)));
    add(&mut b, box_mesh, shine_red, place(Vec3::new(4.5, 2.0, 4.5), Vec3::new(0.0, 0.5, 6.0)));

    b.add_item(
        ItemDesc::new(grid, tile).with_tex_transform(Mat4::from_scale(Vec3::new(8.0, 8.0, 1.0))),
    );

    let wedge_world = Mat4::from_translation(Vec3::new(0.0, 0.35, 2.5))
        * Mat4::from_rotation_y(-FRAC_PI_2)
        * Mat4::from_scale(Vec3::new(0.3, 0.4, 2.5));
    add(&mut b, wedge, wedge_mat, wedge_world);

    let diamonds = [(-0.7, shine_blue), (0.7, dia_mat)].map(|(x, material)| {
        let scale = Vec3::splat(0.5);
        let translation = Vec3::new(x, 2.7, -7.7);
        let item = add(&mut b, diamond, material, place(scale, translation));
        Placement {
            item,
            scale,
            translation,
        }
    });

    // Octagonal columns topped with spheres.
    let column_scale = Vec3::new(1.0, 3.0, 1.0);
    let column_tex = Mat4::from_scale(column_scale);
    for i in 0..2 {
        let z = 1.5 + i as f32 * 8.9;
        for x in [-3.0, 3.0] {
            b.add_item(
                ItemDesc::new(octagon, bricks)
                    .with_world(place(column_scale, Vec3::new(x, 2.0, z)))
                    .with_tex_transform(column_tex),
            );
            add(&mut b, sphere, gold, place(Vec3::splat(1.4), Vec3::new(x, 5.0, z)));
        }
    }

    // Short hexagonal posts topped with cones.
    for i in 0..2 {
        let z = 1.5 + i as f32 * 11.0;
        for x in [-7.0, 7.0] {
            b.add_item(
                ItemDesc::new(hexagon, dia_mat)
                    .with_world(place(Vec3::new(0.5, 1.2, 0.5), Vec3::new(x, 0.6, z)))
                    .with_tex_transform(column_tex),
            );
            add(&mut b, cone, gold, place(Vec3::splat(0.7), Vec3::new(x, 1.6, z)));
        }
    }

    let animated = Animated {
        diamonds,
        gold,
        gold_albedo: GOLDENROD,
    };

    (b.build(), animated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_has_every_shape_and_material() {
        let (scene, animated) = build(3);

        assert_eq!(scene.geometry().submeshes().len(), 12);
        assert_eq!(scene.materials().len(), 10);
        assert_eq!(scene.items().len(), 27);
        assert_eq!(scene.frames_in_flight(), 3);

        assert_eq!(scene.find_material("gold"), Some(animated.gold));
        assert_eq!(scene.material(animated.gold).desc().diffuse_albedo, GOLDENROD);
    }

    #[test]
    fn diamond_placements_match_their_items() {
        let (scene, animated) = build(2);
        for placement in animated.diamonds {
            let item = scene.item(placement.item);
            assert!(item.world().abs_diff_eq(placement.world(0.0), 1e-6));
        }
    }

    #[test]
    fn resource_desc_covers_the_scene() {
        let (scene, _) = build(3);
        let desc = scene.resource_desc();
        assert_eq!(desc.object_count, 27);
        assert_eq!(desc.material_count, 10);
    }
}
