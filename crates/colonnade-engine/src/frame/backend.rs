//! Seams between the frame pipeline and a concrete GPU API.

use super::error::FrameError;

/// Host-writable memory the GPU reads constants from.
///
/// The GPU-side address of a byte offset is `base + offset`; binding layers
/// turn offsets into whatever their API uses (dynamic offsets for wgpu).
pub trait UploadMemory {
    /// Total size in bytes.
    fn size(&self) -> u64;

    /// Copies `bytes` to `offset`. Callers keep `offset + bytes.len()` within
    /// `size()` and only write once the GPU is done reading this memory.
    fn write(&mut self, offset: u64, bytes: &[u8]);
}

/// Backing storage for command recording.
pub trait CommandAllocator {
    /// What commands are recorded into.
    type Recorder;

    /// Reclaims the storage of the previous recording and starts a new one.
    ///
    /// Only valid once the GPU has finished executing everything recorded
    /// from this allocator.
    fn reset(&mut self) -> Result<Self::Recorder, FrameError>;
}

/// Factory for the per-frame GPU objects.
pub trait GpuBackend {
    type Memory: UploadMemory;
    type Allocator: CommandAllocator;

    /// Minimum alignment of a constant-buffer view, in bytes (a power of two).
    fn constant_buffer_alignment(&self) -> u64;

    fn create_upload_memory(&self, label: &str, size: u64) -> Result<Self::Memory, FrameError>;

    fn create_command_allocator(&self, label: &str) -> Result<Self::Allocator, FrameError>;
}
