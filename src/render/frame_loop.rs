use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Shared flag that stops a [`FrameLoop`]. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Outcome of a single [`FrameLoop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The frame ran; the host should request the next redraw.
    Scheduled,
    /// The loop was cancelled; nothing ran and nothing should be requested.
    Cancelled,
}

/// Drives "run once, then request next tick" rendering.
///
/// The host calls [`tick`](Self::tick) from its redraw callback and requests
/// another redraw only on [`Tick::Scheduled`], so frames never overlap.
#[derive(Debug, Default)]
pub struct FrameLoop {
    token: CancellationToken,
    frames: AtomicU64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn tick<F: FnOnce()>(&self, frame: F) -> Tick {
        if self.token.is_cancelled() {
            return Tick::Cancelled;
        }
        frame();
        self.frames.fetch_add(1, Ordering::Relaxed);
        Tick::Scheduled
    }
}
