use std::sync::Arc;

use crate::frame::{CompletionCounter, FenceValue, FrameError, GpuTimeline};

/// Fence timeline driven by queue completion callbacks.
///
/// `signal(v)` registers a callback behind everything submitted so far; wgpu
/// runs it once that work finishes, raising the shared counter to `v`.
#[derive(Debug, Clone)]
pub struct WgpuTimeline {
    device: wgpu::Device,
    queue: wgpu::Queue,
    counter: Arc<CompletionCounter>,
}

impl WgpuTimeline {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            counter: Arc::new(CompletionCounter::new()),
        }
    }
}

impl GpuTimeline for WgpuTimeline {
    fn completed_value(&self) -> Result<FenceValue, FrameError> {
        // Callbacks only fire while the device is polled.
        self.device
            .poll(wgpu::PollType::Poll)
            .map_err(|e| FrameError::Poll {
                reason: e.to_string(),
            })?;
        Ok(FenceValue(self.counter.get()))
    }

    fn signal(&self, value: FenceValue) -> Result<(), FrameError> {
        let counter = Arc::clone(&self.counter);
        self.queue
            .on_submitted_work_done(move || counter.advance_to(value.0));
        Ok(())
    }

    fn wait(&self, value: FenceValue) -> Result<(), FrameError> {
        if self.counter.get() >= value.0 {
            return Ok(());
        }

        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| FrameError::Wait {
                value: value.0,
                reason: e.to_string(),
            })?;

        // A full wait runs every pending callback; anything short of `value`
        // means it was never signaled.
        if self.counter.get() < value.0 {
            return Err(FrameError::Wait {
                value: value.0,
                reason: format!("device idle at fence {}", self.counter.get()),
            });
        }
        Ok(())
    }
}
