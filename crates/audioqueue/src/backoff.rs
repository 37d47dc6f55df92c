use std::hint;
use std::thread;
use std::time::Duration;

/// Escalating wait for application threads polling a ready count.
///
/// The ring buffer itself never waits. A thread that wants data or space
/// calls [`wait`](Self::wait) between polls; each call costs a little more
/// than the last: a doubling burst of PAUSE hints, then `yield_now`, then a
/// sleep of the park interval (usually `BridgeConfig::poll_interval`).
///
/// Never use this on a real-time thread.
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    park: Duration,
}

/// Where a wait currently sits on the escalation ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Spin(u32),
    Yield,
    Park,
}

impl Backoff {
    /// Spin bursts of 1, 2, 4 .. 64 hints.
    const SPIN_ROUNDS: u32 = 7;
    const YIELD_ROUNDS: u32 = 4;
    const DEFAULT_PARK: Duration = Duration::from_millis(1);

    pub fn new() -> Self {
        Self::with_park(Self::DEFAULT_PARK)
    }

    /// A backoff that sleeps `park` per wait once spinning and yielding are
    /// used up.
    pub fn with_park(park: Duration) -> Self {
        Self { attempts: 0, park }
    }

    fn phase(&self) -> Phase {
        if self.attempts < Self::SPIN_ROUNDS {
            Phase::Spin(1 << self.attempts)
        } else if self.attempts < Self::SPIN_ROUNDS + Self::YIELD_ROUNDS {
            Phase::Yield
        } else {
            Phase::Park
        }
    }

    /// Waits one step and escalates.
    pub fn wait(&mut self) {
        match self.phase() {
            Phase::Spin(hints) => {
                for _ in 0..hints {
                    hint::spin_loop();
                }
            }
            Phase::Yield => thread::yield_now(),
            Phase::Park => thread::sleep(self.park),
        }
        self.attempts = self.attempts.saturating_add(1);
    }

    /// True once the next [`wait`](Self::wait) would sleep.
    #[inline]
    pub fn is_parking(&self) -> bool {
        self.phase() == Phase::Park
    }

    /// Back to the cheapest step, after the awaited condition was met.
    #[inline]
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Calls `attempt` until it returns `Some`, waiting in between, but gives
    /// up with `None` instead of sleeping.
    ///
    /// Resets on success so the same instance serves the next wait.
    pub fn poll<R, F>(&mut self, mut attempt: F) -> Option<R>
    where
        F: FnMut() -> Option<R>,
    {
        loop {
            if let Some(r) = attempt() {
                self.reset();
                return Some(r);
            }
            if self.is_parking() {
                return None;
            }
            self.wait();
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
