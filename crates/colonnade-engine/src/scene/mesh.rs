use bytemuck::{Pod, Zeroable};

use super::MeshId;

/// Vertex format shared by every mesh (`VertexIn` in the lit shader).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    #[inline]
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Indexed triangle list for one shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Draw arguments of one mesh inside `MeshGeometry`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Submesh {
    pub index_count: u32,
    pub start_index: u32,
    pub base_vertex: i32,
}

/// All scene meshes packed into one vertex and one index buffer.
///
/// Indices stay local to their mesh; `base_vertex` rebases them at draw time.
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    submeshes: Vec<Submesh>,
}

impl MeshGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `mesh` and returns its handle.
    pub fn push(&mut self, mesh: MeshData) -> MeshId {
        let submesh = Submesh {
            index_count: mesh.indices.len() as u32,
            start_index: self.indices.len() as u32,
            base_vertex: self.vertices.len() as i32,
        };

        self.vertices.extend(mesh.vertices);
        self.indices.extend(mesh.indices);
        self.submeshes.push(submesh);

        MeshId(self.submeshes.len() - 1)
    }

    #[inline]
    pub fn submesh(&self, id: MeshId) -> Submesh {
        self.submeshes[id.0]
    }

    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}
