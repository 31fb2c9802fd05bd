//! In-process GPU backend.
//!
//! Memory lives in host vectors that can be inspected, and the timeline only
//! advances when told to. Tests use it to play the GPU's part of the frame
//! protocol; it also runs the pipeline headless.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::backend::{CommandAllocator, GpuBackend, UploadMemory};
use super::error::FrameError;
use super::fence::{CompletionCounter, FenceValue, GpuTimeline};

/// Backend producing `HostMemory` and `HostAllocator`s.
#[derive(Debug, Clone)]
pub struct HostBackend {
    alignment: u64,
    memory_limit: Option<u64>,
}

impl Default for HostBackend {
    fn default() -> Self {
        Self {
            alignment: 256,
            memory_limit: None,
        }
    }
}

impl HostBackend {
    pub fn with_alignment(alignment: u64) -> Self {
        assert!(alignment.is_power_of_two(), "alignment must be a power of two");
        Self {
            alignment,
            ..Self::default()
        }
    }

    /// Fails any single allocation larger than `limit` bytes.
    pub fn with_memory_limit(limit: u64) -> Self {
        Self {
            memory_limit: Some(limit),
            ..Self::default()
        }
    }
}

impl GpuBackend for HostBackend {
    type Memory = HostMemory;
    type Allocator = HostAllocator;

    fn constant_buffer_alignment(&self) -> u64 {
        self.alignment
    }

    fn create_upload_memory(&self, label: &str, size: u64) -> Result<HostMemory, FrameError> {
        if let Some(limit) = self.memory_limit {
            if size > limit {
                return Err(FrameError::allocation(
                    label,
                    format!("{size} bytes exceeds the {limit} byte limit"),
                ));
            }
        }
        let len = usize::try_from(size)
            .map_err(|_| FrameError::allocation(label, "size does not fit in memory"))?;
        Ok(HostMemory::zeroed(len))
    }

    fn create_command_allocator(&self, label: &str) -> Result<HostAllocator, FrameError> {
        Ok(HostAllocator {
            label: label.to_string(),
            resets: 0,
        })
    }
}

/// Shared handle to a host byte buffer.
///
/// Clones see the same bytes, which lets a test keep a handle to memory owned
/// by a frame resource.
#[derive(Debug, Clone)]
pub struct HostMemory {
    bytes: Arc<Mutex<Vec<u8>>>,
    writes: Arc<AtomicUsize>,
}

impl HostMemory {
    fn zeroed(len: usize) -> Self {
        Self {
            bytes: Arc::new(Mutex::new(vec![0; len])),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Snapshot of the whole buffer.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Overwrites every byte; not counted as a write.
    pub fn fill(&self, value: u8) {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill(value);
    }

    /// Number of `write` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl UploadMemory for HostMemory {
    fn size(&self) -> u64 {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner).len() as u64
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) {
        let start = offset as usize;
        let mut dst = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        dst[start..start + bytes.len()].copy_from_slice(bytes);
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Command allocator that only counts resets.
#[derive(Debug)]
pub struct HostAllocator {
    label: String,
    resets: u64,
}

/// Recorder handed out by `HostAllocator::reset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecorder {
    pub allocator: String,
    pub generation: u64,
}

impl HostAllocator {
    pub fn resets(&self) -> u64 {
        self.resets
    }
}

impl CommandAllocator for HostAllocator {
    type Recorder = HostRecorder;

    fn reset(&mut self) -> Result<HostRecorder, FrameError> {
        self.resets += 1;
        Ok(HostRecorder {
            allocator: self.label.clone(),
            generation: self.resets,
        })
    }
}

#[derive(Debug, Default)]
struct TimelineShared {
    completed: CompletionCounter,
    pending: Mutex<VecDeque<u64>>,
    signaled: AtomicU64,
    waiting: AtomicUsize,
    immediate: bool,
    fail_signals: AtomicBool,
    fail_polls: AtomicBool,
}

/// Manually driven GPU timeline.
///
/// Signals queue up as pending until `complete_next`/`complete_through` is
/// called, typically from another clone of the same timeline standing in
/// for the GPU.
#[derive(Debug, Clone, Default)]
pub struct HostTimeline {
    shared: Arc<TimelineShared>,
}

impl HostTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// A timeline whose signals complete as soon as they are queued.
    pub fn immediate() -> Self {
        Self {
            shared: Arc::new(TimelineShared {
                immediate: true,
                ..TimelineShared::default()
            }),
        }
    }

    /// Signaled values the GPU has not reached yet, oldest first.
    pub fn pending(&self) -> Vec<u64> {
        self.pending_queue().iter().copied().collect()
    }

    /// Completes the oldest pending signal.
    pub fn complete_next(&self) -> Option<FenceValue> {
        let value = self.pending_queue().pop_front()?;
        self.shared.completed.advance_to(value);
        Some(FenceValue(value))
    }

    /// Completes every pending signal up to and including `value`.
    pub fn complete_through(&self, value: u64) {
        let mut pending = self.pending_queue();
        while pending.front().is_some_and(|&v| v <= value) {
            pending.pop_front();
        }
        drop(pending);
        self.shared.completed.advance_to(value);
    }

    pub fn complete_all(&self) {
        let last = self.pending_queue().drain(..).last();
        if let Some(value) = last {
            self.shared.completed.advance_to(value);
        }
    }

    /// Number of threads currently blocked in `wait`.
    pub fn waiting(&self) -> usize {
        self.shared.waiting.load(Ordering::SeqCst)
    }

    /// Makes subsequent `signal` calls fail, as a lost device would.
    pub fn fail_signals(&self, fail: bool) {
        self.shared.fail_signals.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `completed_value` calls fail, as a device whose
    /// progress can no longer be queried would.
    pub fn fail_polls(&self, fail: bool) {
        self.shared.fail_polls.store(fail, Ordering::SeqCst);
    }

    fn pending_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<u64>> {
        self.shared
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl GpuTimeline for HostTimeline {
    fn completed_value(&self) -> Result<FenceValue, FrameError> {
        if self.shared.fail_polls.load(Ordering::SeqCst) {
            return Err(FrameError::Poll {
                reason: "host timeline refused the poll".to_string(),
            });
        }
        Ok(FenceValue(self.shared.completed.get()))
    }

    fn signal(&self, value: FenceValue) -> Result<(), FrameError> {
        if self.shared.fail_signals.load(Ordering::SeqCst) {
            return Err(FrameError::Signal {
                value: value.0,
                reason: "host timeline refused the signal".to_string(),
            });
        }

        self.shared.signaled.fetch_max(value.0, Ordering::SeqCst);
        if self.shared.immediate {
            self.shared.completed.advance_to(value.0);
        } else {
            self.pending_queue().push_back(value.0);
        }
        Ok(())
    }

    fn wait(&self, value: FenceValue) -> Result<(), FrameError> {
        if value.0 > self.shared.signaled.load(Ordering::SeqCst) {
            return Err(FrameError::Wait {
                value: value.0,
                reason: "value was never signaled".to_string(),
            });
        }

        self.shared.waiting.fetch_add(1, Ordering::SeqCst);
        self.shared.completed.wait_for(value.0);
        self.shared.waiting.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clones_share_bytes() {
        let backend = HostBackend::default();
        let mut memory = backend.create_upload_memory("m", 8).unwrap();
        let view = memory.clone();

        memory.write(4, &[1, 2, 3, 4]);

        assert_eq!(view.bytes(), vec![0, 0, 0, 0, 1, 2, 3, 4]);
        assert_eq!(view.write_count(), 1);
    }

    #[test]
    fn allocator_counts_resets() {
        let backend = HostBackend::default();
        let mut alloc = backend.create_command_allocator("frame 0").unwrap();
        assert_eq!(alloc.reset().unwrap().generation, 1);
        assert_eq!(alloc.reset().unwrap().generation, 2);
        assert_eq!(alloc.resets(), 2);
    }

    #[test]
    fn timeline_completes_in_order() {
        let timeline = HostTimeline::new();
        timeline.signal(FenceValue(1)).unwrap();
        timeline.signal(FenceValue(2)).unwrap();
        timeline.signal(FenceValue(3)).unwrap();

        assert_eq!(timeline.complete_next(), Some(FenceValue(1)));
        assert_eq!(timeline.completed_value().unwrap(), FenceValue(1));

        timeline.complete_through(2);
        assert_eq!(timeline.pending(), vec![3]);

        timeline.complete_all();
        assert_eq!(timeline.completed_value().unwrap(), FenceValue(3));
        assert!(timeline.pending().is_empty());
    }

    #[test]
    fn waiting_on_unsignaled_value_is_an_error() {
        let timeline = HostTimeline::new();
        let err = timeline.wait(FenceValue(1)).unwrap_err();
        assert!(matches!(err, FrameError::Wait { value: 1, .. }));
    }
}
