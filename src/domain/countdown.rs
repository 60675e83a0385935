/// Countdown timer: one tick per second, from a start value down to zero.
///
/// ```text
///   Idle ──start──▶ Running ──tick…──▶ Expired   (reached 0, notifies once)
///                      │
///                      └──stop──▶ Stopped        (silent)
/// ```
///
/// Stopped and Expired are both terminal: no further ticks are produced.

/// Milliseconds between ticks.
pub const TICK_MS: u64 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { next_tick_at: u64 },
    Stopped,
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// New remaining value, in seconds.
    Tick(u32),
    /// Remaining reached 0 naturally. Emitted exactly once.
    Expired,
}

#[derive(Clone, Debug)]
pub struct CountdownTimer {
    start_secs: u32,
    remaining: u32,
    state: TimerState,
}

impl CountdownTimer {
    pub fn new(start_secs: u32) -> Self {
        CountdownTimer { start_secs, remaining: start_secs, state: TimerState::Idle }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[cfg(test)]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Begin counting at `now`. Publishes the start value. No-op unless Idle.
    pub fn start(&mut self, now: u64) -> Vec<TimerEvent> {
        if self.state != TimerState::Idle {
            return vec![];
        }
        self.remaining = self.start_secs;
        if self.remaining == 0 {
            self.state = TimerState::Expired;
            return vec![TimerEvent::Tick(0), TimerEvent::Expired];
        }
        self.state = TimerState::Running { next_tick_at: now + TICK_MS };
        vec![TimerEvent::Tick(self.remaining)]
    }

    /// Deliver every tick due at or before `now`, in order.
    pub fn advance(&mut self, now: u64) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let TimerState::Running { next_tick_at } = self.state {
            if next_tick_at > now {
                break;
            }
            self.remaining = self.remaining.saturating_sub(1);
            events.push(TimerEvent::Tick(self.remaining));
            if self.remaining == 0 {
                self.state = TimerState::Expired;
                events.push(TimerEvent::Expired);
            } else {
                self.state = TimerState::Running { next_tick_at: next_tick_at + TICK_MS };
            }
        }
        events
    }

    /// Cease ticking without notification. Returns whether anything changed.
    pub fn stop(&mut self) -> bool {
        match self.state {
            TimerState::Idle | TimerState::Running { .. } => {
                self.state = TimerState::Stopped;
                true
            }
            TimerState::Stopped | TimerState::Expired => false,
        }
    }
}

/// `MM:SS` rendering of a second count.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(events: &[TimerEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|e| match e {
                TimerEvent::Tick(n) => Some(*n),
                TimerEvent::Expired => None,
            })
            .collect()
    }

    #[test]
    fn start_publishes_start_value() {
        let mut t = CountdownTimer::new(120);
        assert_eq!(t.start(0), vec![TimerEvent::Tick(120)]);
        assert!(matches!(t.state(), TimerState::Running { .. }));
    }

    #[test]
    fn one_tick_per_second() {
        let mut t = CountdownTimer::new(10);
        t.start(500);
        assert!(t.advance(1_499).is_empty());
        assert_eq!(t.advance(1_500), vec![TimerEvent::Tick(9)]);
        assert_eq!(t.remaining(), 9);
    }

    #[test]
    fn late_advance_delivers_missed_ticks_in_order() {
        let mut t = CountdownTimer::new(10);
        t.start(0);
        assert_eq!(ticks(&t.advance(3_000)), vec![9, 8, 7]);
    }

    #[test]
    fn expiry_notifies_exactly_once() {
        let mut t = CountdownTimer::new(2);
        t.start(0);
        let events = t.advance(10_000);
        assert_eq!(events, vec![TimerEvent::Tick(1), TimerEvent::Tick(0), TimerEvent::Expired]);
        assert_eq!(t.state(), TimerState::Expired);
        assert!(t.advance(20_000).is_empty());
        assert!(!t.stop());
    }

    #[test]
    fn stop_is_silent_and_freezes_value() {
        let mut t = CountdownTimer::new(5);
        t.start(0);
        t.advance(2_000);
        assert!(t.stop());
        assert!(t.advance(60_000).is_empty());
        assert_eq!(t.remaining(), 3);
        assert_eq!(t.state(), TimerState::Stopped);
    }

    #[test]
    fn start_is_single_shot() {
        let mut t = CountdownTimer::new(5);
        t.start(0);
        t.advance(1_000);
        assert!(t.start(1_000).is_empty());
        assert_eq!(t.remaining(), 4);
    }

    #[test]
    fn zero_start_expires_immediately() {
        let mut t = CountdownTimer::new(0);
        assert_eq!(t.start(0), vec![TimerEvent::Tick(0), TimerEvent::Expired]);
        assert!(t.advance(5_000).is_empty());
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(120), "02:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(0), "00:00");
    }
}
