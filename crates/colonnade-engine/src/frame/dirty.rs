use bytemuck::Pod;

use super::backend::UploadMemory;
use super::error::FrameError;
use super::upload::UploadBuffer;

/// Countdown of frame resources still holding a stale copy of a value.
///
/// Every ring slot keeps its own copy of each constant record, so an edit has
/// to be uploaded once per slot. The counter starts at the ring size, is reset
/// to it on every edit, and loses one per upload.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DirtyCounter {
    remaining: u32,
    span: u32,
}

impl DirtyCounter {
    /// A counter for a ring of `frames_in_flight` slots, dirty from the start.
    pub fn new(frames_in_flight: usize) -> Self {
        let span = frames_in_flight as u32;
        Self {
            remaining: span,
            span,
        }
    }

    /// Records an edit. Pending uploads restart from the full span.
    #[inline]
    pub fn mark(&mut self) {
        self.remaining = self.span;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.remaining > 0
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[inline]
    pub fn span(&self) -> u32 {
        self.span
    }

    /// Counts one upload. Returns false if there was nothing left to upload.
    pub fn consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Something that owns one slot of a constant buffer.
pub trait ConstantSource {
    type Constants: Pod;

    /// Slot index, stable for the lifetime of the source.
    fn slot(&self) -> usize;

    fn dirty(&self) -> &DirtyCounter;

    fn dirty_mut(&mut self) -> &mut DirtyCounter;

    /// Current live value. Uploads always use this, never a queued edit.
    fn constants(&self) -> Self::Constants;
}

/// Uploads every dirty source into `buffer` and counts the upload.
///
/// Returns how many slots were written. A failed write leaves that source's
/// counter untouched.
pub fn propagate<'a, S, M, I>(
    sources: I,
    buffer: &mut UploadBuffer<S::Constants, M>,
) -> Result<usize, FrameError>
where
    S: ConstantSource + 'a,
    M: UploadMemory,
    I: IntoIterator<Item = &'a mut S>,
{
    let mut uploaded = 0;
    for source in sources {
        if !source.dirty().is_dirty() {
            continue;
        }
        buffer.copy_data(source.slot(), &source.constants())?;
        source.dirty_mut().consume();
        uploaded += 1;
    }
    Ok(uploaded)
}
