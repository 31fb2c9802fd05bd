use std::sync::{Condvar, Mutex, PoisonError};

use super::error::FrameError;

/// Point on the GPU timeline.
///
/// Values only grow. `FenceValue::NEVER` marks a frame resource that has not
/// been submitted yet and is therefore always safe to write.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FenceValue(pub u64);

impl FenceValue {
    pub const NEVER: Self = Self(0);

    #[inline]
    pub fn is_never(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// GPU-side fence object.
///
/// The queue moves the completed value forward once all work submitted before
/// a `signal` has finished executing.
pub trait GpuTimeline {
    /// Highest value the GPU has reached.
    fn completed_value(&self) -> Result<FenceValue, FrameError>;

    /// Queues a signal of `value` behind all work submitted so far.
    fn signal(&self, value: FenceValue) -> Result<(), FrameError>;

    /// Blocks until `completed_value() >= value`. No timeout.
    fn wait(&self, value: FenceValue) -> Result<(), FrameError>;
}

/// Monotonic counter with blocking waits.
///
/// GPU completion callbacks call `advance_to`; the frame thread blocks in
/// `wait_for`. A poisoned lock still holds a valid counter, so poisoning is
/// ignored.
#[derive(Debug, Default)]
pub struct CompletionCounter {
    value: Mutex<u64>,
    reached: Condvar,
}

impl CompletionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raises the counter to `value`. Lower values are ignored.
    pub fn advance_to(&self, value: u64) {
        let mut current = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        if value > *current {
            *current = value;
            self.reached.notify_all();
        }
    }

    pub fn wait_for(&self, value: u64) {
        let mut current = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        while *current < value {
            current = self
                .reached
                .wait(current)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// CPU half of the fence protocol: the `CurrentFence` counter plus the GPU
/// timeline it is signaled on.
pub struct Fence<T> {
    timeline: T,
    current: FenceValue,
}

impl<T: GpuTimeline> Fence<T> {
    pub fn new(timeline: T) -> Self {
        Self {
            timeline,
            current: FenceValue::NEVER,
        }
    }

    /// Last value handed out by `signal_next`.
    #[inline]
    pub fn current(&self) -> FenceValue {
        self.current
    }

    #[inline]
    pub fn completed(&self) -> Result<FenceValue, FrameError> {
        self.timeline.completed_value()
    }

    #[inline]
    pub fn timeline(&self) -> &T {
        &self.timeline
    }

    /// True when the GPU has finished everything up to `watermark`.
    pub fn is_complete(&self, watermark: FenceValue) -> Result<bool, FrameError> {
        if watermark.is_never() {
            return Ok(true);
        }
        Ok(self.completed()? >= watermark)
    }

    /// Blocks until `watermark` is reached. Returns whether it had to block.
    pub fn wait_for(&self, watermark: FenceValue) -> Result<bool, FrameError> {
        if watermark.is_never() {
            return Ok(false);
        }

        let completed = self.completed()?;
        if completed >= watermark {
            return Ok(false);
        }

        log::trace!(
            "cpu ahead of gpu: waiting for fence {} (completed {})",
            watermark.0,
            completed.0
        );
        self.timeline.wait(watermark)?;
        Ok(true)
    }

    /// Increments the counter and queues a GPU signal of the new value.
    pub fn signal_next(&mut self) -> Result<FenceValue, FrameError> {
        let value = self.current.next();
        self.timeline.signal(value)?;
        self.current = value;
        Ok(value)
    }

    /// Waits for every piece of work submitted so far.
    pub fn flush(&mut self) -> Result<(), FrameError> {
        let value = self.signal_next()?;
        self.wait_for(value)?;
        Ok(())
    }
}
