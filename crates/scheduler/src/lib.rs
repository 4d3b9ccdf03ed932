use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use stageconfig::StageConfig;

/// Quiet period a burst of viewport changes must observe before reconciling.
pub const DEFAULT_RESIZE_QUIET: Duration = Duration::from_millis(250);

/// Identifies one outstanding frame request. Hosts deliver this back to the
/// lifecycle manager when the frame fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Owned token for a pending frame. Only the owner can cancel it, and
/// cancelling consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct FrameHandle(FrameId);

impl FrameHandle {
    pub fn new(id: u64) -> Self {
        FrameHandle(FrameId(id))
    }

    pub fn id(&self) -> FrameId {
        self.0
    }
}

/// The host's "call me on the next displayed frame" primitive.
pub trait FrameScheduler<K> {
    fn request_frame(&mut self, key: &K) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A frame that became due, as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueFrame<K> {
    pub id: FrameId,
    pub key: K,
}

/// In-process frame primitive: requests queue up until the host drains them
/// on its next display tick.
#[derive(Debug)]
pub struct FrameQueue<K> {
    next_id: u64,
    pending: BTreeMap<FrameId, K>,
}

impl<K> Default for FrameQueue<K> {
    fn default() -> Self {
        Self {
            next_id: 1,
            pending: BTreeMap::new(),
        }
    }
}

impl<K: Clone> FrameQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, id: FrameId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Removes and returns every pending request in request order.
    pub fn take_due(&mut self) -> Vec<DueFrame<K>> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(id, key)| DueFrame { id, key })
            .collect()
    }
}

impl<K: Clone> FrameScheduler<K> for FrameQueue<K> {
    fn request_frame(&mut self, key: &K) -> FrameHandle {
        let handle = FrameHandle::new(self.next_id);
        self.next_id += 1;
        self.pending.insert(handle.id(), key.clone());
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle.id());
    }
}

/// Coalesces bursts of viewport change notifications into one reconciliation
/// once `quiet` has elapsed since the last notification.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_QUIET)
    }
}

impl ResizeDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn from_config(config: &StageConfig) -> Self {
        Self::new(config.defaults.resize_debounce)
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Records a viewport change and restarts the quiet period.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True exactly once per burst, when the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
