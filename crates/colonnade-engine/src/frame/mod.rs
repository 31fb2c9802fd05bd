//! Frame-resource pipelining.
//!
//! Lets the CPU prepare frame `k + 1 .. k + N` while the GPU still consumes
//! frame `k`, without the CPU ever writing memory the GPU is reading:
//! - `UploadBuffer`: host-writable constant slots
//! - `FrameResource`: one frame's allocator + constant buffers + fence watermark
//! - `FrameRing`: N frame resources used round-robin
//! - `Fence`: monotonic counter signaled by the GPU queue
//! - `DirtyCounter` / `propagate`: re-upload edits into each ring slot once
//! - `FramePipeline`: the per-frame protocol tying them together
//!
//! Everything is generic over `GpuBackend`/`GpuTimeline`; `device` binds them
//! to wgpu and `host` provides an inspectable in-process stand-in.

mod backend;
mod constants;
mod dirty;
mod error;
mod fence;
pub mod host;
mod pipeline;
mod resource;
mod ring;
mod upload;

pub use backend::{CommandAllocator, GpuBackend, UploadMemory};
pub use constants::{Light, MaterialConstants, ObjectConstants, PassConstants, MAX_LIGHTS};
pub use dirty::{propagate, ConstantSource, DirtyCounter};
pub use error::FrameError;
pub use fence::{CompletionCounter, Fence, FenceValue, GpuTimeline};
pub use pipeline::{FramePipeline, PipelineConfig};
pub use resource::{FrameResource, FrameResourceDesc};
pub use ring::FrameRing;
pub use upload::{constant_buffer_byte_size, UploadBuffer};
