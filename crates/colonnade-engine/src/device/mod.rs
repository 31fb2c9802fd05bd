//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain) and depth buffer
//! - binding the frame pipeline's backend and timeline traits to wgpu

mod backend;
mod error;
mod frame;
mod gpu;
mod init;
mod surface;
mod timeline;

pub use backend::{WgpuBackend, WgpuCommandAllocator, WgpuUploadMemory};
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use timeline::WgpuTimeline;
