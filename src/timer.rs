//! Performance measurement tools.

use std::{
    cell::Cell,
    fmt,
    time::{Duration, Instant},
};

/// Weight of the newest sample in a [`Timer`]'s moving average.
const EMA_ALPHA: f32 = 0.3;

/// A timer that can measure and average the time an operation takes.
///
/// Collected timings are averaged and reset when the timer is displayed using `{}`
/// ([`std::fmt::Display`]).
pub struct Timer {
    name: &'static str,
    /// Exponential moving average of the recorded durations, in seconds.
    avg: Cell<Option<f32>>,
    /// The number of time measurements that contributed to `avg`.
    count: Cell<usize>,
}

impl Timer {
    /// Creates a new timer.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            avg: Cell::new(None),
            count: Cell::new(0),
        }
    }

    /// Returns the name passed to [`Timer::new`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invokes a closure, measuring and recording the time it takes.
    pub fn time<T>(&self, timee: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        timee()
    }

    /// Starts timing an operation using a drop guard.
    ///
    /// When the returned [`TimerGuard`] is dropped, the time between the call to `start` and the
    /// drop is measured and recorded.
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard {
            start: Instant::now(),
            timer: self,
        }
    }

    /// Returns the current average without resetting it.
    pub fn average(&self) -> Option<Duration> {
        self.avg.get().map(Duration::from_secs_f32)
    }

    fn record(&self, duration: Duration) {
        let secs = duration.as_secs_f32();
        let avg = match self.avg.get() {
            Some(last) => EMA_ALPHA * secs + (1.0 - EMA_ALPHA) * last,
            None => secs,
        };
        self.avg.set(Some(avg));
        self.count.set(self.count.get() + 1);
    }
}

/// Displays the average recorded time and resets it.
impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let avg_ms = self.avg.take().unwrap_or(0.0) * 1000.0;
        let len = self.count.take();

        write!(f, "{}: {len}x{avg_ms:.01}ms", self.name)
    }
}

/// Cloning a timer resets its collected timings.
impl Clone for Timer {
    fn clone(&self) -> Self {
        Self::new(self.name)
    }
}

/// Guard returned by [`Timer::start`]. Stops timing the operation when dropped.
pub struct TimerGuard<'a> {
    start: Instant,
    timer: &'a Timer,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.record(self.start.elapsed());
    }
}

/// Estimates the instantaneous frame rate of a polling loop.
///
/// Call [`FpsEstimator::update`] once per loop iteration. The estimate is the reciprocal of the
/// time elapsed since the previous call; no averaging over older frames takes place.
#[derive(Debug, Clone, Default)]
pub struct FpsEstimator {
    prev: Option<Instant>,
    fps: f32,
}

impl FpsEstimator {
    /// Creates an estimator that has not seen any frames yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new frame at the current time and returns the frame rate.
    ///
    /// The first call returns `0.0`, since there is no previous frame to measure against.
    pub fn update(&mut self) -> f32 {
        self.update_at(Instant::now())
    }

    /// Records a new frame at `now` and returns the frame rate.
    ///
    /// Returns `0.0` on the first call and when no time has passed since the previous frame.
    pub fn update_at(&mut self, now: Instant) -> f32 {
        let fps = match self.prev {
            Some(prev) => {
                let elapsed = now.saturating_duration_since(prev).as_secs_f32();
                if elapsed > 0.0 {
                    1.0 / elapsed
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        self.prev = Some(now);
        self.fps = fps;
        fps
    }

    /// Returns the value computed by the last call to [`FpsEstimator::update`].
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Forgets the previous frame, making the next call to `update` return `0.0` again.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
