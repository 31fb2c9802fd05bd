use super::backend::GpuBackend;
use super::error::FrameError;
use super::fence::{Fence, FenceValue, GpuTimeline};
use super::resource::{FrameResource, FrameResourceDesc};
use super::ring::FrameRing;

/// Pipeline sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Ring size: how many frames the GPU may have in flight at once.
    pub frames_in_flight: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { frames_in_flight: 3 }
    }
}

/// Drives the per-frame CPU/GPU protocol over a ring of frame resources.
///
/// Each frame:
/// 1. `begin_frame` advances the ring and, if the GPU has not finished the
///    previous use of that slot, blocks until it has.
/// 2. The caller writes constants into `current_mut()` and records/submits
///    draw commands that read them.
/// 3. `end_frame` bumps the fence counter, stores it as the slot's watermark
///    and queues the GPU signal.
///
/// The CPU therefore never runs more than `frames_in_flight` frames ahead of
/// the GPU, and never writes memory the GPU may still be reading.
pub struct FramePipeline<B: GpuBackend, T> {
    ring: FrameRing<FrameResource<B>>,
    fence: Fence<T>,
    in_frame: bool,
    frames: u64,
    stalls: u64,
}

impl<B: GpuBackend, T: GpuTimeline> FramePipeline<B, T> {
    pub fn new(
        backend: &B,
        timeline: T,
        config: PipelineConfig,
        desc: FrameResourceDesc,
    ) -> Result<Self, FrameError> {
        let ring = FrameRing::build(config.frames_in_flight, |i| {
            FrameResource::new(backend, i, desc)
        })?;

        log::debug!(
            "frame pipeline ready: {} frames in flight",
            config.frames_in_flight
        );

        Ok(Self {
            ring,
            fence: Fence::new(timeline),
            in_frame: false,
            frames: 0,
            stalls: 0,
        })
    }

    /// Selects the next frame resource and waits until it is safe to write.
    pub fn begin_frame(&mut self) -> Result<&mut FrameResource<B>, FrameError> {
        if self.in_frame {
            return Err(FrameError::FrameInProgress);
        }

        let watermark = self.ring.advance().fence;
        if self.fence.wait_for(watermark)? {
            self.stalls += 1;
        }

        self.in_frame = true;
        Ok(self.ring.current_mut())
    }

    /// The frame resource being prepared. Only available between
    /// `begin_frame` and `end_frame`.
    pub fn current_mut(&mut self) -> Result<&mut FrameResource<B>, FrameError> {
        if !self.in_frame {
            return Err(FrameError::NoFrameInProgress);
        }
        Ok(self.ring.current_mut())
    }

    /// Marks the end of the frame's submissions with a new fence value.
    ///
    /// Call after the frame's command buffers have been submitted.
    pub fn end_frame(&mut self) -> Result<FenceValue, FrameError> {
        if !self.in_frame {
            return Err(FrameError::NoFrameInProgress);
        }

        let value = self.fence.signal_next()?;
        self.ring.current_mut().fence = value;
        self.in_frame = false;
        self.frames += 1;
        Ok(value)
    }

    /// Blocks until the GPU has finished every submitted frame.
    pub fn flush(&mut self) -> Result<(), FrameError> {
        self.fence.flush()
    }

    /// Ring slot of the current (or last) frame.
    #[inline]
    pub fn current_index(&self) -> usize {
        self.ring.current_index()
    }

    #[inline]
    pub fn frames_in_flight(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn resources(&self) -> &FrameRing<FrameResource<B>> {
        &self.ring
    }

    #[inline]
    pub fn fence(&self) -> &Fence<T> {
        &self.fence
    }

    #[inline]
    pub fn is_in_frame(&self) -> bool {
        self.in_frame
    }

    /// Frames ended so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// How many `begin_frame` calls had to block on the GPU.
    #[inline]
    pub fn stall_count(&self) -> u64 {
        self.stalls
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::frame::backend::CommandAllocator;
    use crate::frame::constants::ObjectConstants;
    use crate::frame::dirty::{ConstantSource, DirtyCounter, propagate};
    use crate::frame::host::{HostBackend, HostTimeline};

    const N: usize = 3;

    fn pipeline(timeline: HostTimeline, n: usize) -> FramePipeline<HostBackend, HostTimeline> {
        FramePipeline::new(
            &HostBackend::default(),
            timeline,
            PipelineConfig { frames_in_flight: n },
            FrameResourceDesc::new(2, 1),
        )
        .unwrap()
    }

    fn object(v: f32) -> ObjectConstants {
        ObjectConstants {
            world: [[v; 4]; 4],
            ..ObjectConstants::default()
        }
    }

    struct Item {
        slot: usize,
        value: f32,
        dirty: DirtyCounter,
    }

    impl Item {
        fn new(slot: usize, n: usize) -> Self {
            Self {
                slot,
                value: 0.0,
                dirty: DirtyCounter::new(n),
            }
        }

        fn edit(&mut self, value: f32) {
            self.value = value;
            self.dirty.mark();
        }
    }

    impl ConstantSource for Item {
        type Constants = ObjectConstants;

        fn slot(&self) -> usize {
            self.slot
        }

        fn dirty(&self) -> &DirtyCounter {
            &self.dirty
        }

        fn dirty_mut(&mut self) -> &mut DirtyCounter {
            &mut self.dirty
        }

        fn constants(&self) -> ObjectConstants {
            object(self.value)
        }
    }

    /// Runs one frame with an always-caught-up GPU, returning uploads made.
    fn run_frame(p: &mut FramePipeline<HostBackend, HostTimeline>, items: &mut [Item]) -> usize {
        let frame = p.begin_frame().unwrap();
        let n = propagate(items.iter_mut(), &mut frame.object_cb).unwrap();
        p.end_frame().unwrap();
        n
    }

    // ── protocol ──────────────────────────────────────────────────────────

    #[test]
    fn frames_cycle_through_ring_slots() {
        let mut p = pipeline(HostTimeline::immediate(), N);
        let mut slots = Vec::new();
        for _ in 0..7 {
            p.begin_frame().unwrap();
            slots.push(p.current_index());
            p.end_frame().unwrap();
        }
        assert_eq!(slots, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(p.frame_count(), 7);
    }

    #[test]
    fn end_frame_stores_increasing_watermarks() {
        for n in 1..=4 {
            let mut p = pipeline(HostTimeline::immediate(), n);
            let mut history: Vec<Vec<u64>> = vec![Vec::new(); n];

            for _ in 0..10 {
                p.begin_frame().unwrap();
                let slot = p.current_index();
                let value = p.end_frame().unwrap();
                assert_eq!(p.resources().get(slot).unwrap().fence, value);
                history[slot].push(value.0);
            }

            for watermarks in history {
                assert!(watermarks.windows(2).all(|w| w[0] < w[1]), "n = {n}");
                // A slot comes back every n frames.
                assert!(watermarks.windows(2).all(|w| w[1] - w[0] == n as u64), "n = {n}");
            }
        }
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let mut p = pipeline(HostTimeline::immediate(), N);

        assert!(matches!(p.end_frame(), Err(FrameError::NoFrameInProgress)));
        assert!(matches!(p.current_mut(), Err(FrameError::NoFrameInProgress)));

        p.begin_frame().unwrap();
        assert!(matches!(p.begin_frame(), Err(FrameError::FrameInProgress)));
        assert!(p.current_mut().is_ok());
    }

    #[test]
    fn allocator_is_reset_once_per_use() {
        let mut p = pipeline(HostTimeline::immediate(), N);
        for _ in 0..6 {
            let frame = p.begin_frame().unwrap();
            frame.allocator.reset().unwrap();
            p.end_frame().unwrap();
        }
        for slot in p.resources().iter() {
            assert_eq!(slot.allocator.resets(), 2);
        }
    }

    #[test]
    fn no_stall_while_gpu_keeps_up() {
        let timeline = HostTimeline::new();
        let gpu = timeline.clone();
        let mut p = pipeline(timeline, N);

        for _ in 0..9 {
            p.begin_frame().unwrap();
            p.end_frame().unwrap();
            gpu.complete_next();
        }
        assert_eq!(p.stall_count(), 0);
    }

    #[test]
    fn cpu_may_run_n_frames_ahead_without_blocking() {
        let timeline = HostTimeline::new();
        let gpu = timeline.clone();
        let mut p = pipeline(timeline, N);

        for _ in 0..N {
            p.begin_frame().unwrap();
            p.end_frame().unwrap();
        }

        assert_eq!(gpu.pending(), vec![1, 2, 3]);
        assert_eq!(p.stall_count(), 0);
    }

    #[test]
    fn wrapped_slot_blocks_until_its_watermark_completes() {
        for n in 1..=4 {
            let timeline = HostTimeline::new();
            let gpu = timeline.clone();
            let mut p = pipeline(timeline, n);
            let slot0 = p.resources().get(0).unwrap().object_cb.memory().clone();

            for i in 0..n {
                let frame = p.begin_frame().unwrap();
                frame.object_cb.copy_data(0, &object(i as f32)).unwrap();
                p.end_frame().unwrap();
            }
            let writes_before = slot0.write_count();
            assert_eq!(gpu.completed_value().unwrap(), FenceValue::NEVER);
            assert_eq!(gpu.pending().len(), n);

            let driver = thread::spawn(move || {
                while gpu.waiting() == 0 {
                    thread::sleep(Duration::from_millis(1));
                }
                // The frame thread is parked on slot 0's watermark: nothing
                // may have been written into slot 0 yet.
                let untouched = slot0.write_count() == writes_before;
                gpu.complete_next();
                untouched
            });

            let frame = p.begin_frame().unwrap();
            frame.object_cb.copy_data(0, &object(9.0)).unwrap();
            p.end_frame().unwrap();

            assert!(driver.join().unwrap(), "n = {n}");
            assert_eq!(p.current_index(), 0);
            assert_eq!(p.stall_count(), 1, "n = {n}");
            assert!(p.fence().completed().unwrap() >= FenceValue(1));
        }
    }

    #[test]
    fn signal_failure_is_fatal_and_keeps_frame_open() {
        let timeline = HostTimeline::immediate();
        timeline.fail_signals(true);
        let mut p = pipeline(timeline, N);

        p.begin_frame().unwrap();
        let err = p.end_frame().unwrap_err();

        assert!(err.is_device_fatal());
        assert!(p.is_in_frame());
    }

    #[test]
    fn flush_drains_the_gpu() {
        let mut p = pipeline(HostTimeline::immediate(), N);
        for _ in 0..4 {
            p.begin_frame().unwrap();
            p.end_frame().unwrap();
        }
        p.flush().unwrap();
        assert_eq!(p.fence().completed().unwrap(), p.fence().current());
    }

    // ── dirty propagation across the ring ─────────────────────────────────

    #[test]
    fn single_edit_uploads_for_exactly_n_frames() {
        for n in 1..=4 {
            let mut p = pipeline(HostTimeline::immediate(), n);
            let mut items = vec![Item::new(0, n)];

            let mut uploads = Vec::new();
            let mut remaining = Vec::new();
            for _ in 0..n + 1 {
                uploads.push(run_frame(&mut p, &mut items));
                remaining.push(items[0].dirty.remaining());
            }

            let mut expected_uploads = vec![1; n];
            expected_uploads.push(0);
            let mut expected_remaining: Vec<u32> = (0..n as u32).rev().collect();
            expected_remaining.push(0);
            assert_eq!(uploads, expected_uploads, "n = {n}");
            assert_eq!(remaining, expected_remaining, "n = {n}");
        }
    }

    #[test]
    fn edit_reaches_every_ring_slot_once() {
        let mut p = pipeline(HostTimeline::immediate(), N);
        let mut items = vec![Item::new(0, N), Item::new(1, N)];
        for _ in 0..N {
            run_frame(&mut p, &mut items);
        }
        let counts: Vec<usize> = p
            .resources()
            .iter()
            .map(|r| r.object_cb.memory().write_count())
            .collect();

        items[1].edit(5.0);
        for _ in 0..N + 2 {
            run_frame(&mut p, &mut items);
        }

        for (slot, before) in p.resources().iter().zip(counts) {
            assert_eq!(slot.object_cb.memory().write_count(), before + 1);
            let bytes = slot.object_cb.memory().bytes();
            assert_eq!(&bytes[256..256 + 128], bytemuck::bytes_of(&object(5.0)));
        }
    }

    #[test]
    fn second_edit_restarts_the_countdown() {
        let mut p = pipeline(HostTimeline::immediate(), N);
        let mut items = vec![Item::new(0, N)];

        // frame 0: edit, upload, 3 -> 2
        items[0].edit(1.0);
        assert_eq!(run_frame(&mut p, &mut items), 1);
        assert_eq!(items[0].dirty.remaining(), 2);

        // frame 1: edit again, counter back to 3, then 3 -> 2
        items[0].edit(2.0);
        assert_eq!(items[0].dirty.remaining(), 3);
        assert_eq!(run_frame(&mut p, &mut items), 1);

        // frames 2 and 3 still upload, frame 4 does not
        assert_eq!(run_frame(&mut p, &mut items), 1);
        assert_eq!(run_frame(&mut p, &mut items), 1);
        assert_eq!(items[0].dirty.remaining(), 0);
        assert_eq!(run_frame(&mut p, &mut items), 0);

        for slot in p.resources().iter() {
            let bytes = slot.object_cb.memory().bytes();
            assert_eq!(&bytes[..128], bytemuck::bytes_of(&object(2.0)));
        }
    }
}
