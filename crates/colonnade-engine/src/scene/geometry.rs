//! Procedural meshes.
//!
//! All shapes are centered on the origin with +Y up. Curved shapes get smooth
//! normals; polyhedra are flat shaded, with one vertex per face corner.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::mesh::{MeshData, Vertex};

/// Axis-aligned box, four vertices per face.
pub fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let (w, h, d) = (0.5 * width, 0.5 * height, 0.5 * depth);

    #[rustfmt::skip]
    let vertices = vec![
        // front (-z)
        Vertex::new([-w, -h, -d], [0.0, 0.0, -1.0], [0.0, 1.0]),
        Vertex::new([-w,  h, -d], [0.0, 0.0, -1.0], [0.0, 0.0]),
        Vertex::new([ w,  h, -d], [0.0, 0.0, -1.0], [1.0, 0.0]),
        Vertex::new([ w, -h, -d], [0.0, 0.0, -1.0], [1.0, 1.0]),
        // back (+z)
        Vertex::new([-w, -h,  d], [0.0, 0.0, 1.0], [1.0, 1.0]),
        Vertex::new([ w, -h,  d], [0.0, 0.0, 1.0], [0.0, 1.0]),
        Vertex::new([ w,  h,  d], [0.0, 0.0, 1.0], [0.0, 0.0]),
        Vertex::new([-w,  h,  d], [0.0, 0.0, 1.0], [1.0, 0.0]),
        // top
        Vertex::new([-w,  h, -d], [0.0, 1.0, 0.0], [0.0, 1.0]),
        Vertex::new([-w,  h,  d], [0.0, 1.0, 0.0], [0.0, 0.0]),
        Vertex::new([ w,  h,  d], [0.0, 1.0, 0.0], [1.0, 0.0]),
        Vertex::new([ w,  h, -d], [0.0, 1.0, 0.0], [1.0, 1.0]),
        // bottom
        Vertex::new([-w, -h, -d], [0.0, -1.0, 0.0], [1.0, 1.0]),
        Vertex::new([ w, -h, -d], [0.0, -1.0, 0.0], [0.0, 1.0]),
        Vertex::new([ w, -h,  d], [0.0, -1.0, 0.0], [0.0, 0.0]),
        Vertex::new([-w, -h,  d], [0.0, -1.0, 0.0], [1.0, 0.0]),
        // left (-x)
        Vertex::new([-w, -h,  d], [-1.0, 0.0, 0.0], [0.0, 1.0]),
        Vertex::new([-w,  h,  d], [-1.0, 0.0, 0.0], [0.0, 0.0]),
        Vertex::new([-w,  h, -d], [-1.0, 0.0, 0.0], [1.0, 0.0]),
        Vertex::new([-w, -h, -d], [-1.0, 0.0, 0.0], [1.0, 1.0]),
        // right (+x)
        Vertex::new([ w, -h, -d], [1.0, 0.0, 0.0], [0.0, 1.0]),
        Vertex::new([ w,  h, -d], [1.0, 0.0, 0.0], [0.0, 0.0]),
        Vertex::new([ w,  h,  d], [1.0, 0.0, 0.0], [1.0, 0.0]),
        Vertex::new([ w, -h,  d], [1.0, 0.0, 0.0], [1.0, 1.0]),
    ];

    let indices = (0..6u32)
        .flat_map(|face| {
            let b = face * 4;
            [b, b + 1, b + 2, b, b + 2, b + 3]
        })
        .collect();

    MeshData { vertices, indices }
}

/// Flat `rows x cols` grid in the XZ plane, spanning `width` along X and
/// `depth` along Z. UVs run 0..1 across the whole grid.
pub fn grid(width: f32, depth: f32, rows: u32, cols: u32) -> MeshData {
    let rows = rows.max(2);
    let cols = cols.max(2);

    let dx = width / (cols - 1) as f32;
    let dz = depth / (rows - 1) as f32;
    let du = 1.0 / (cols - 1) as f32;
    let dv = 1.0 / (rows - 1) as f32;

    let mut vertices = Vec::with_capacity((rows * cols) as usize);
    for i in 0..rows {
        let z = 0.5 * depth - i as f32 * dz;
        for j in 0..cols {
            let x = -0.5 * width + j as f32 * dx;
            vertices.push(Vertex::new(
                [x, 0.0, z],
                [0.0, 1.0, 0.0],
                [j as f32 * du, i as f32 * dv],
            ));
        }
    }

    let mut indices = Vec::with_capacity(((rows - 1) * (cols - 1) * 6) as usize);
    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            let a = i * cols + j;
            let b = (i + 1) * cols + j;
            indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }

    MeshData { vertices, indices }
}

/// UV sphere with poles on the Y axis.
pub fn sphere(radius: f32, slices: u32, stacks: u32) -> MeshData {
    let slices = slices.max(3);
    let stacks = stacks.max(2);

    let mut vertices = Vec::new();
    vertices.push(Vertex::new([0.0, radius, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));

    let phi_step = PI / stacks as f32;
    let theta_step = TAU / slices as f32;

    for i in 1..stacks {
        let phi = i as f32 * phi_step;
        for j in 0..=slices {
            let theta = j as f32 * theta_step;
            let p = Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            );
            vertices.push(Vertex::new(
                p.to_array(),
                p.normalize().to_array(),
                [theta / TAU, phi / PI],
            ));
        }
    }

    vertices.push(Vertex::new([0.0, -radius, 0.0], [0.0, -1.0, 0.0], [0.0, 1.0]));

    let ring = slices + 1;
    let mut indices = Vec::new();

    for j in 1..=slices {
        indices.extend_from_slice(&[0, j + 1, j]);
    }

    let base = 1;
    for i in 0..stacks - 2 {
        for j in 0..slices {
            let a = base + i * ring + j;
            let b = base + (i + 1) * ring + j;
            indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }

    let south = vertices.len() as u32 - 1;
    let base = south - ring;
    for j in 0..slices {
        indices.extend_from_slice(&[south, base + j, base + j + 1]);
    }

    MeshData { vertices, indices }
}

/// Truncated cone along Y. A zero radius skips that cap, so
/// `cylinder(r, 0.0, ..)` is a cone.
pub fn cylinder(
    bottom_radius: f32,
    top_radius: f32,
    height: f32,
    slices: u32,
    stacks: u32,
) -> MeshData {
    let slices = slices.max(3);
    let stacks = stacks.max(1);

    let stack_height = height / stacks as f32;
    let radius_step = (top_radius - bottom_radius) / stacks as f32;
    let dr = bottom_radius - top_radius;
    let theta_step = TAU / slices as f32;

    let mut mesh = MeshData::default();

    for i in 0..=stacks {
        let y = -0.5 * height + i as f32 * stack_height;
        let r = bottom_radius + i as f32 * radius_step;
        for j in 0..=slices {
            let (s, c) = (j as f32 * theta_step).sin_cos();
            let normal = Vec3::new(c * height, dr, s * height).normalize_or_zero();
            mesh.vertices.push(Vertex::new(
                [r * c, y, r * s],
                normal.to_array(),
                [j as f32 / slices as f32, 1.0 - i as f32 / stacks as f32],
            ));
        }
    }

    let ring = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * ring + j;
            let b = (i + 1) * ring + j;
            mesh.indices.extend_from_slice(&[a, b, b + 1, a, b + 1, a + 1]);
        }
    }

    if top_radius > 0.0 {
        push_cap(&mut mesh, top_radius, 0.5 * height, height, slices, true);
    }
    if bottom_radius > 0.0 {
        push_cap(&mut mesh, bottom_radius, -0.5 * height, height, slices, false);
    }

    mesh
}

/// Cone with its apex at `+height / 2`.
pub fn cone(radius: f32, height: f32, slices: u32, stacks: u32) -> MeshData {
    cylinder(radius, 0.0, height, slices, stacks)
}

fn push_cap(mesh: &mut MeshData, radius: f32, y: f32, height: f32, slices: u32, top: bool) {
    let ny = if top { 1.0 } else { -1.0 };
    let theta_step = TAU / slices as f32;
    let base = mesh.vertices.len() as u32;

    for j in 0..=slices {
        let (s, c) = (j as f32 * theta_step).sin_cos();
        let (x, z) = (radius * c, radius * s);
        mesh.vertices.push(Vertex::new(
            [x, y, z],
            [0.0, ny, 0.0],
            [x / height + 0.5, z / height + 0.5],
        ));
    }
    mesh.vertices
        .push(Vertex::new([0.0, y, 0.0], [0.0, ny, 0.0], [0.5, 0.5]));
    let center = base + slices + 1;

    for j in 0..slices {
        if top {
            mesh.indices.extend_from_slice(&[center, base + j + 1, base + j]);
        } else {
            mesh.indices.extend_from_slice(&[center, base + j, base + j + 1]);
        }
    }
}

/// Regular `sides`-gon prism along Y, flat shaded.
pub fn prism(radius: f32, height: f32, sides: u32) -> MeshData {
    let sides = sides.max(3);
    let top = ring(radius, 0.5 * height, sides);
    let bottom = ring(radius, -0.5 * height, sides);

    let mut faces = vec![top.clone(), bottom.clone()];
    for k in 0..sides as usize {
        let n = (k + 1) % sides as usize;
        faces.push(vec![bottom[k], bottom[n], top[n], top[k]]);
    }
    flat_solid(&faces)
}

pub fn hexagon(width: f32, height: f32) -> MeshData {
    prism(0.5 * width, height, 6)
}

pub fn octagon(width: f32, height: f32) -> MeshData {
    prism(0.5 * width, height, 8)
}

/// Square pyramid, base at `-height / 2`.
pub fn pyramid(width: f32, height: f32) -> MeshData {
    let (w, h) = (0.5 * width, 0.5 * height);
    let apex = Vec3::new(0.0, h, 0.0);
    let a = Vec3::new(-w, -h, -w);
    let b = Vec3::new(w, -h, -w);
    let c = Vec3::new(w, -h, w);
    let d = Vec3::new(-w, -h, w);

    flat_solid(&[
        vec![a, b, c, d],
        vec![a, b, apex],
        vec![b, c, apex],
        vec![c, d, apex],
        vec![d, a, apex],
    ])
}

/// Ramp rising from `+x` to a vertical back face at `-x`.
pub fn wedge(width: f32, height: f32, depth: f32) -> MeshData {
    let (w, h, d) = (0.5 * width, 0.5 * height, 0.5 * depth);
    let b0 = Vec3::new(-w, -h, -d);
    let b1 = Vec3::new(w, -h, -d);
    let b2 = Vec3::new(w, -h, d);
    let b3 = Vec3::new(-w, -h, d);
    let t0 = Vec3::new(-w, h, -d);
    let t1 = Vec3::new(-w, h, d);

    flat_solid(&[
        vec![b0, b1, b2, b3],
        vec![b0, t0, t1, b3],
        vec![b1, b2, t1, t0],
        vec![b0, b1, t0],
        vec![b3, b2, t1],
    ])
}

/// Prism with a triangular cross section in XY, extruded along Z.
pub fn triangular_prism(width: f32, height: f32, depth: f32) -> MeshData {
    let (w, h, d) = (0.5 * width, 0.5 * height, 0.5 * depth);
    let tri = |z: f32| {
        [
            Vec3::new(-w, -h, z),
            Vec3::new(w, -h, z),
            Vec3::new(0.0, h, z),
        ]
    };
    let f = tri(-d);
    let b = tri(d);

    flat_solid(&[
        f.to_vec(),
        b.to_vec(),
        vec![f[0], f[1], b[1], b[0]],
        vec![f[1], f[2], b[2], b[1]],
        vec![f[2], f[0], b[0], b[2]],
    ])
}

/// Two pyramids sharing a `sides`-gon girdle at `y = 0`.
pub fn bipyramid(radius: f32, top: f32, bottom: f32, sides: u32) -> MeshData {
    let sides = sides.max(3) as usize;
    let girdle = ring(radius, 0.0, sides as u32);
    let apex = Vec3::new(0.0, top, 0.0);
    let nadir = Vec3::new(0.0, -bottom, 0.0);

    let mut faces = Vec::with_capacity(2 * sides);
    for k in 0..sides {
        let n = (k + 1) % sides;
        faces.push(vec![girdle[k], girdle[n], apex]);
        faces.push(vec![girdle[n], girdle[k], nadir]);
    }
    flat_solid(&faces)
}

pub fn octahedron(radius: f32) -> MeshData {
    bipyramid(radius, radius, radius, 4)
}

/// Brilliant-style gem: octagonal table, crown down to the girdle, pavilion
/// down to a point.
pub fn diamond(width: f32, height: f32) -> MeshData {
    const SIDES: usize = 8;
    let table_y = 0.5 * height;
    let girdle_y = 0.25 * height;

    let table = ring(0.25 * width, table_y, SIDES as u32);
    let girdle = ring(0.5 * width, girdle_y, SIDES as u32);
    let culet = Vec3::new(0.0, -0.5 * height, 0.0);

    let mut faces = vec![table.clone()];
    for k in 0..SIDES {
        let n = (k + 1) % SIDES;
        faces.push(vec![table[k], table[n], girdle[n], girdle[k]]);
        faces.push(vec![girdle[n], girdle[k], culet]);
    }
    flat_solid(&faces)
}

fn ring(radius: f32, y: f32, sides: u32) -> Vec<Vec3> {
    (0..sides)
        .map(|k| {
            let (s, c) = (TAU * k as f32 / sides as f32).sin_cos();
            Vec3::new(radius * c, y, radius * s)
        })
        .collect()
}

/// Builds a convex polyhedron from planar faces.
///
/// Normals point away from the vertex centroid, so face winding in the input
/// does not matter.
fn flat_solid(faces: &[Vec<Vec3>]) -> MeshData {
    let corners: usize = faces.iter().map(Vec::len).sum();
    let center = faces.iter().flatten().copied().sum::<Vec3>() / corners as f32;

    let mut mesh = MeshData::default();
    for face in faces {
        let n = face.len();
        let face_center = face.iter().copied().sum::<Vec3>() / n as f32;

        let mut normal = (face[1] - face[0])
            .cross(face[2] - face[0])
            .normalize_or_zero();
        if normal.dot(face_center - center) < 0.0 {
            normal = -normal;
        }

        let base = mesh.vertices.len() as u32;
        for (k, p) in face.iter().enumerate() {
            let (s, c) = (TAU * k as f32 / n as f32).sin_cos();
            mesh.vertices.push(Vertex::new(
                p.to_array(),
                normal.to_array(),
                [0.5 + 0.5 * c, 0.5 - 0.5 * s],
            ));
        }
        for k in 1..n as u32 - 1 {
            mesh.indices.extend_from_slice(&[base, base + k, base + k + 1]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(mesh: &MeshData) {
        assert_eq!(mesh.indices.len() % 3, 0);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n), "index out of range");
    }

    fn assert_unit_normals(mesh: &MeshData) {
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.normal).length();
            assert!((len - 1.0).abs() < 1e-4, "normal length {len}");
        }
    }

    /// Every face of a convex flat-shaded solid faces away from its centroid.
    fn assert_outward(mesh: &MeshData) {
        let center = mesh
            .vertices
            .iter()
            .map(|v| Vec3::from_array(v.position))
            .sum::<Vec3>()
            / mesh.vertices.len() as f32;

        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            let n = Vec3::from_array(v.normal);
            assert!((p - center).dot(n) > 0.0, "inward normal at {p:?}");
        }
    }

    #[test]
    fn box_has_six_quads() {
        let m = box_mesh(1.5, 0.5, 1.5);
        assert_valid(&m);
        assert_unit_normals(&m);
        assert_eq!(m.vertices.len(), 24);
        assert_eq!(m.indices.len(), 36);
    }

    #[test]
    fn grid_counts_and_extent() {
        let m = grid(20.0, 30.0, 60, 40);
        assert_valid(&m);
        assert_eq!(m.vertices.len(), 60 * 40);
        assert_eq!(m.indices.len(), 59 * 39 * 6);

        let first = m.vertices[0].position;
        let last = m.vertices[m.vertices.len() - 1].position;
        assert_eq!(first, [-10.0, 0.0, 15.0]);
        assert!((last[0] - 10.0).abs() < 1e-4);
        assert!((last[2] + 15.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_counts() {
        let m = sphere(0.5, 20, 20);
        assert_valid(&m);
        assert_unit_normals(&m);
        assert_eq!(m.vertices.len(), 2 + 19 * 21);
        assert_eq!(m.indices.len(), 2 * 20 * 3 + 18 * 20 * 6);
    }

    #[test]
    fn cylinder_has_both_caps() {
        let m = cylinder(0.5, 0.5, 3.0, 20, 20);
        assert_valid(&m);
        assert_unit_normals(&m);
        assert_eq!(m.vertices.len(), 21 * 21 + 2 * 22);
        assert_eq!(m.indices.len(), 20 * 20 * 6 + 2 * 20 * 3);
    }

    #[test]
    fn cone_skips_top_cap() {
        let m = cone(1.0, 1.0, 20, 20);
        assert_valid(&m);
        assert_eq!(m.vertices.len(), 21 * 21 + 22);
        let top = m
            .vertices
            .iter()
            .filter(|v| v.position[1] > 0.49)
            .all(|v| v.position[0].abs() < 1e-5 && v.position[2].abs() < 1e-5);
        assert!(top, "cone apex ring should collapse to a point");
    }

    #[test]
    fn cone_side_normals_tilt_up() {
        let m = cone(1.0, 1.0, 8, 1);
        let side = &m.vertices[0];
        assert!(side.normal[1] > 0.0);
    }

    #[test]
    fn prisms_are_closed_and_outward() {
        for (m, sides) in [(hexagon(1.5, 1.5), 6), (octagon(1.5, 1.5), 8)] {
            assert_valid(&m);
            assert_unit_normals(&m);
            assert_outward(&m);
            assert_eq!(m.vertices.len(), 2 * sides + 4 * sides);
            assert_eq!(m.triangle_count(), 2 * (sides - 2) + 2 * sides);
        }
    }

    #[test]
    fn polyhedra_are_outward_facing() {
        for m in [
            pyramid(1.0, 1.0),
            wedge(1.5, 1.5, 1.5),
            triangular_prism(1.0, 1.0, 1.0),
            octahedron(0.5),
            diamond(1.0, 1.0),
        ] {
            assert_valid(&m);
            assert_unit_normals(&m);
            assert_outward(&m);
        }
    }

    #[test]
    fn octahedron_has_eight_faces() {
        let m = octahedron(0.5);
        assert_eq!(m.triangle_count(), 8);
        assert_eq!(m.vertices.len(), 24);
    }

    #[test]
    fn pyramid_and_wedge_face_counts() {
        assert_eq!(pyramid(1.0, 1.0).triangle_count(), 2 + 4);
        assert_eq!(wedge(1.0, 1.0, 1.0).triangle_count(), 3 * 2 + 2);
        assert_eq!(triangular_prism(1.0, 1.0, 1.0).triangle_count(), 2 + 3 * 2);
    }

    #[test]
    fn diamond_spans_its_height() {
        let m = diamond(1.0, 2.0);
        let (lo, hi) = m.vertices.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
            (lo.min(v.position[1]), hi.max(v.position[1]))
        });
        assert_eq!(lo, -1.0);
        assert_eq!(hi, 1.0);
    }
}
