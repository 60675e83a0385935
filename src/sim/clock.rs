/// Time source for the game, in milliseconds since an arbitrary origin.
///
/// The game owns its clock and reads it at the start of every operation;
/// nothing in the engine sleeps or blocks.

use std::time::Instant;

pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock anchored at construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock for tests. Clones share the same time.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct ManualClock(std::rc::Rc<std::cell::Cell<u64>>);

#[cfg(test)]
impl ManualClock {
    pub fn advance_by(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}
