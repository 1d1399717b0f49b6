/// Id of a pending one-shot frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// One-shot "call me on the next frame" requests, like `requestAnimationFrame`.
pub trait FrameScheduler {
    /// Returns `None` when the host refused the request; no frame will follow.
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler that only records requests. Hosts that drive frames themselves
/// (tests, the native preview) poll [`ManualScheduler::take_pending`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: i32,
    pending: Option<FrameHandle>,
    requested: usize,
}

impl ManualScheduler {
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Clears and returns the outstanding request, if any.
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    /// Total number of requests ever made.
    pub fn requested(&self) -> usize {
        self.requested
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        if let Some(old) = self.pending.replace(handle) {
            log::warn!("frame {old:?} superseded by {handle:?}");
        }
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}
