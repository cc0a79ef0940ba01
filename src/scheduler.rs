//! Frame scheduling over heterogeneous timing primitives.
//!
//! The scheduler owns an ordered preference chain of [`FrameDriver`]s: a
//! platform vsync driver when the embedder supplies one, then a zero-delay
//! message-loop driver, then a fixed-minimum-interval timeout. `start`
//! activates the first available driver; an exhausted chain is reported as
//! [`Error::DriverUnavailable`] rather than silently doing nothing.
//!
//! Exactly one tick is in flight at a time: the next frame is requested only
//! after the callback returns. The raw delta is reported unclamped; any
//! catch-up or drop policy belongs to the consumer.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// A source of frame signals. Embedders provide a vsync-aligned
/// implementation; the built-in drivers cover message-loop and timeout
/// fallbacks plus a manual driver for tests.
pub trait FrameDriver {
    /// Whether this driver can deliver frames in the current environment.
    fn is_available(&self) -> bool {
        true
    }

    /// Ask for one frame signal.
    fn request_frame(&mut self);

    /// Drop the outstanding request, if any.
    fn cancel_frame(&mut self);

    /// Poll for a due frame. Returns the signal's timestamp, consuming the
    /// outstanding request.
    fn poll(&mut self) -> Option<Instant>;

    /// The driver's notion of the current time.
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Zero-delay message-loop driver: a requested frame is due on the next
/// poll.
#[derive(Default)]
pub struct ImmediateDriver {
    requested: bool,
}

impl ImmediateDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameDriver for ImmediateDriver {
    fn request_frame(&mut self) {
        self.requested = true;
    }

    fn cancel_frame(&mut self) {
        self.requested = false;
    }

    fn poll(&mut self) -> Option<Instant> {
        self.requested.then(|| {
            self.requested = false;
            Instant::now()
        })
    }
}

/// Fixed-minimum-interval timeout driver: a requested frame becomes due once
/// the interval has elapsed.
pub struct IntervalDriver {
    interval: Duration,
    deadline: Option<Instant>,
}

impl IntervalDriver {
    /// Roughly 60Hz by default.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(16);

    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }
}

impl FrameDriver for IntervalDriver {
    fn request_frame(&mut self) {
        self.deadline = Some(Instant::now() + self.interval);
    }

    fn cancel_frame(&mut self) {
        self.deadline = None;
    }

    fn poll(&mut self) -> Option<Instant> {
        let deadline = self.deadline?;
        let now = Instant::now();
        if now >= deadline {
            self.deadline = None;
            Some(now)
        } else {
            None
        }
    }
}

/// A manually pumped driver with a simulated clock, for tests and headless
/// harnesses.
pub struct TestDriver {
    base: Instant,
    elapsed: Duration,
    requested: bool,
    due: Option<Duration>,
    available: bool,
}

impl Default for TestDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDriver {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Duration::ZERO,
            requested: false,
            due: None,
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Advance the simulated clock and mark the outstanding request due.
    pub fn fire_after(&mut self, delta: Duration) {
        self.elapsed += delta;
        if self.requested {
            self.due = Some(self.elapsed);
            self.requested = false;
        }
    }
}

impl FrameDriver for TestDriver {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_frame(&mut self) {
        self.requested = true;
    }

    fn cancel_frame(&mut self) {
        self.requested = false;
        self.due = None;
    }

    fn poll(&mut self) -> Option<Instant> {
        self.due.take().map(|at| self.base + at)
    }

    fn now(&self) -> Instant {
        self.base + self.elapsed
    }
}

/// Shared driver handles let a test (or embedder) keep pumping a driver the
/// scheduler owns.
impl<D: FrameDriver> FrameDriver for std::rc::Rc<std::cell::RefCell<D>> {
    fn is_available(&self) -> bool {
        self.borrow().is_available()
    }

    fn request_frame(&mut self) {
        self.borrow_mut().request_frame()
    }

    fn cancel_frame(&mut self) {
        self.borrow_mut().cancel_frame()
    }

    fn poll(&mut self) -> Option<Instant> {
        self.borrow_mut().poll()
    }

    fn now(&self) -> Instant {
        self.borrow().now()
    }
}

/// Callback invoked once per frame with the raw elapsed delta.
pub type TickCallback = dyn FnMut(Duration);

pub struct FrameScheduler {
    drivers: Vec<Box<dyn FrameDriver>>,
    active: Option<usize>,
    callback: Option<Box<TickCallback>>,
    last_time: Option<Instant>,
}

impl FrameScheduler {
    /// Build a scheduler from an ordered driver preference chain. Prepend a
    /// platform vsync driver for the lowest jitter.
    pub fn new(drivers: Vec<Box<dyn FrameDriver>>) -> Self {
        Self {
            drivers,
            active: None,
            callback: None,
            last_time: None,
        }
    }

    /// The default fallback chain: message loop, then timeout.
    pub fn with_default_drivers() -> Self {
        Self::new(vec![
            Box::new(ImmediateDriver::new()),
            Box::new(IntervalDriver::new(IntervalDriver::DEFAULT_INTERVAL)),
        ])
    }

    /// Record the time baseline and request the first frame from the first
    /// available driver. Fails with [`Error::DriverUnavailable`] when the
    /// chain is exhausted.
    pub fn start(&mut self, callback: impl FnMut(Duration) + 'static) -> Result<()> {
        let index = self
            .drivers
            .iter()
            .position(|driver| driver.is_available())
            .ok_or(Error::DriverUnavailable)?;
        log::debug!("scheduler started on driver {index}");
        self.active = Some(index);
        self.callback = Some(Box::new(callback));
        self.last_time = Some(self.drivers[index].now());
        self.drivers[index].request_frame();
        Ok(())
    }

    /// Poll the active driver and run at most one tick. The next frame is
    /// requested only after the callback returns, so ticks never overlap.
    /// Returns `true` when a tick ran.
    pub fn pump(&mut self) -> bool {
        let Some(index) = self.active else {
            return false;
        };
        let Some(now) = self.drivers[index].poll() else {
            return false;
        };
        let last = self.last_time.replace(now).unwrap_or(now);
        let dt = now.saturating_duration_since(last);
        if let Some(callback) = self.callback.as_mut() {
            callback(dt);
        }
        // The callback may have called stop().
        if let Some(index) = self.active {
            self.drivers[index].request_frame();
        }
        true
    }

    /// Cancel the pending frame and clear the callback. Idempotent; `start`
    /// may be called again afterwards with a fresh baseline.
    pub fn stop(&mut self) {
        if let Some(index) = self.active.take() {
            self.drivers[index].cancel_frame();
            log::debug!("scheduler stopped");
        }
        self.callback = None;
        self.last_time = None;
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_driver_is_due_once_per_request() {
        let mut driver = ImmediateDriver::new();
        assert!(driver.poll().is_none());
        driver.request_frame();
        assert!(driver.poll().is_some());
        assert!(driver.poll().is_none());
    }

    #[test]
    fn interval_driver_waits_for_its_deadline() {
        let mut driver = IntervalDriver::new(Duration::from_secs(3600));
        driver.request_frame();
        assert!(driver.poll().is_none());
        driver.cancel_frame();
        assert!(driver.poll().is_none());
    }

    #[test]
    fn exhausted_chain_reports_failure() {
        let mut scheduler = FrameScheduler::new(vec![Box::new(TestDriver::unavailable())]);
        let result = scheduler.start(|_| {});
        assert!(matches!(result, Err(Error::DriverUnavailable)));
        assert!(!scheduler.is_running());
    }
}
