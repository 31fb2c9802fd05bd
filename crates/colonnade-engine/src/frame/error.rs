use thiserror::Error;

/// Errors raised by the frame-resource pipeline.
///
/// None of these are recovered locally. Allocation and synchronization
/// failures mean the device can no longer be trusted; the remaining variants
/// are caller contract violations.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Upload memory or a command allocator could not be created.
    #[error("failed to allocate {label}: {reason}")]
    Allocation { label: String, reason: String },

    /// An upload slot index outside `[0, capacity)`.
    #[error("upload slot {index} is out of range (capacity {capacity})")]
    SlotOutOfRange { index: usize, capacity: usize },

    /// The scene needs more slots than the frame resources were sized for.
    #[error("{kind} count {required} exceeds the {capacity} slots frame resources were built with")]
    CapacityMismatch {
        kind: &'static str,
        required: usize,
        capacity: usize,
    },

    /// Dirty counters were sized for a different number of frame resources
    /// than the ring holds.
    #[error("dirty counters span {span} frames but the frame ring holds {ring}")]
    RingMismatch { span: usize, ring: usize },

    /// The GPU could not be queried for its completed fence value.
    #[error("polling the device for fence progress failed: {reason}")]
    Poll { reason: String },

    /// The CPU could not wait for a fence value.
    #[error("waiting for fence value {value} failed: {reason}")]
    Wait { value: u64, reason: String },

    /// The GPU queue could not be asked to signal a fence value.
    #[error("signaling fence value {value} failed: {reason}")]
    Signal { value: u64, reason: String },

    /// A frame ring needs at least one frame resource.
    #[error("a frame ring needs at least one frame resource")]
    EmptyRing,

    /// `begin_frame` was called while a frame was still being recorded.
    #[error("a frame is already in progress")]
    FrameInProgress,

    /// `end_frame` or `current_mut` was called outside of a frame.
    #[error("no frame is in progress")]
    NoFrameInProgress,
}

impl FrameError {
    pub(crate) fn allocation(label: &str, reason: impl Into<String>) -> Self {
        Self::Allocation {
            label: label.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures that mean the GPU device state is lost.
    pub fn is_device_fatal(&self) -> bool {
        matches!(
            self,
            Self::Allocation { .. }
                | Self::Poll { .. }
                | Self::Wait { .. }
                | Self::Signal { .. }
        )
    }
}
