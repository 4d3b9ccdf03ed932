use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Abstraction over where frame timestamps originate from.
pub trait Clock: Send {
    /// Monotonic time since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// Clock backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same reading, so a
/// test can keep one copy while the manager owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        let nanos = now.as_nanos().min(u64::MAX as u128) as u64;
        self.nanos.store(nanos, Ordering::SeqCst);
    }

    /// Negative and NaN readings clamp to zero; readings past the clock's
    /// range saturate.
    pub fn set_secs(&self, seconds: f64) {
        let now = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX);
        self.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.set(self.now().saturating_add(by));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Convenient alias for owning clocks behind trait objects.
pub type BoxedClock = Box<dyn Clock>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_reading() {
        let clock = ManualClock::new();
        let observer = clock.clone();
        clock.set_secs(1.5);
        assert_eq!(observer.now(), Duration::from_millis(1500));
        observer.advance(Duration::from_millis(16));
        assert_eq!(clock.now(), Duration::from_millis(1516));
    }

    #[test]
    fn manual_clock_saturates_out_of_range_readings() {
        let clock = ManualClock::new();
        clock.set_secs(1e20);
        assert_eq!(clock.now(), Duration::from_nanos(u64::MAX));
        clock.set_secs(f64::INFINITY);
        assert_eq!(clock.now(), Duration::from_nanos(u64::MAX));
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_nanos(u64::MAX));

        clock.set_secs(-3.0);
        assert_eq!(clock.now(), Duration::ZERO);
        clock.set_secs(f64::NAN);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
