//! Scene model: meshes, materials, render items, camera and lights.
//!
//! Items and materials refer to each other through index handles into the
//! vectors `Scene` owns. Each item and material keeps a dirty counter; the
//! renderer calls `Scene::upload_dirty` once per frame to push edits into the
//! current frame resource.

mod camera;
pub mod geometry;
mod ids;
mod item;
mod lighting;
mod material;
mod mesh;
mod model;
mod pass;

pub use camera::{OrbitCamera, Projection};
pub use ids::{ItemId, MaterialId, MeshId};
pub use item::{ItemDesc, RenderItem};
pub use lighting::{DirectionalLight, LightRig};
pub use material::{Material, MaterialDesc};
pub use mesh::{MeshData, MeshGeometry, Submesh, Vertex};
pub use model::{DirtyUploads, Scene, SceneBuilder};
pub use pass::{build_pass_constants, PassInputs};
