use std::marker::PhantomData;

use bytemuck::Pod;

use super::backend::{GpuBackend, UploadMemory};
use super::error::FrameError;

/// Rounds `byte_size` up to the next multiple of `alignment`.
///
/// Constant-buffer views must start on an aligned offset (256 bytes on most
/// desktop hardware), so every slot of a constant buffer is padded to it.
#[inline]
pub fn constant_buffer_byte_size(byte_size: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    byte_size.next_multiple_of(alignment)
}

fn narrow_offset(offset: u64, index: usize, capacity: usize) -> Result<u32, FrameError> {
    u32::try_from(offset).map_err(|_| FrameError::SlotOutOfRange { index, capacity })
}

/// Array of fixed-stride slots holding one `T` each.
///
/// Write-only from the host: `copy_data` replaces a whole slot, there is no
/// read-back and no partial update. Padding bytes between the end of a `T`
/// and the next slot are never written.
pub struct UploadBuffer<T, M> {
    memory: M,
    capacity: usize,
    stride: u64,
    _marker: PhantomData<fn(T)>,
}

impl<T: Pod, M: UploadMemory> UploadBuffer<T, M> {
    /// Allocates `capacity` slots.
    ///
    /// When `is_constant_buffer` is set the stride is rounded up to the
    /// backend's constant-buffer alignment; otherwise slots are packed at
    /// `size_of::<T>()` like a structured buffer.
    pub fn create<B>(
        backend: &B,
        label: &str,
        capacity: usize,
        is_constant_buffer: bool,
    ) -> Result<Self, FrameError>
    where
        B: GpuBackend<Memory = M>,
    {
        if capacity == 0 {
            return Err(FrameError::allocation(label, "capacity must be non-zero"));
        }

        let element = std::mem::size_of::<T>() as u64;
        let stride = if is_constant_buffer {
            constant_buffer_byte_size(element, backend.constant_buffer_alignment())
        } else {
            element
        };

        let size = stride
            .checked_mul(capacity as u64)
            .ok_or_else(|| FrameError::allocation(label, "byte size overflows u64"))?;

        let memory = backend.create_upload_memory(label, size)?;

        Ok(Self {
            memory,
            capacity,
            stride,
            _marker: PhantomData,
        })
    }

    /// Writes `value` into slot `index`.
    ///
    /// Only the first `size_of::<T>()` bytes of the slot are touched.
    pub fn copy_data(&mut self, index: usize, value: &T) -> Result<(), FrameError> {
        let offset = self.offset_of(index)?;
        self.memory.write(offset, bytemuck::bytes_of(value));
        Ok(())
    }

    /// Byte offset of slot `index` from the start of the buffer.
    pub fn offset_of(&self, index: usize) -> Result<u64, FrameError> {
        if index >= self.capacity {
            return Err(FrameError::SlotOutOfRange {
                index,
                capacity: self.capacity,
            });
        }
        Ok(index as u64 * self.stride)
    }

    /// Offset of slot `index` as a dynamic bind-group offset.
    ///
    /// Dynamic offsets are 32-bit; a slot past `u32::MAX` bytes is reported
    /// as out of range rather than wrapped onto another slot.
    pub fn dynamic_offset(&self, index: usize) -> Result<u32, FrameError> {
        narrow_offset(self.offset_of(index)?, index, self.capacity)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Distance between consecutive slots in bytes.
    #[inline]
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Size of one record without padding.
    #[inline]
    pub fn element_size(&self) -> u64 {
        std::mem::size_of::<T>() as u64
    }

    #[inline]
    pub fn memory(&self) -> &M {
        &self.memory
    }
}
