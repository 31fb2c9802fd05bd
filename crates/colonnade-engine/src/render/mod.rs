//! GPU rendering subsystem.
//!
//! Renderers read per-frame constants from the frame pipeline's constant
//! buffers and issue GPU commands via wgpu. Each renderer owns its own
//! pipeline state and bind groups; meshes are uploaded once.
//!
//! Convention:
//! - left-handed world space, +Y up
//! - matrices are column-major and multiply column vectors

mod ctx;
mod lit;
mod mesh;
mod scene_renderer;

pub use ctx::{RenderCtx, RenderTarget};
pub use lit::LitRenderer;
pub use mesh::GpuMesh;
pub use scene_renderer::{FrameOutcome, RendererConfig, SceneRenderer};
