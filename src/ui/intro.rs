/// Intro sequence: stands in for the briefing video.
///
/// Lines are revealed one by one over the first two thirds of the
/// duration, then held on screen until the end. When the sequence ends
/// (or is skipped) the "intro finished" signal is raised exactly once.

use crate::config::IntroConfig;

pub struct IntroPlayer {
    lines: Vec<String>,
    duration_ms: u64,
    skippable: bool,
    started_at: u64,
    finished: bool,
}

impl IntroPlayer {
    pub fn new(config: &IntroConfig) -> Self {
        IntroPlayer {
            lines: config.lines.clone(),
            duration_ms: config.duration_ms,
            skippable: config.skippable,
            started_at: 0,
            finished: false,
        }
    }

    pub fn start(&mut self, now: u64) {
        self.started_at = now;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_skippable(&self) -> bool {
        self.skippable
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns true exactly once: on the call where playback ends.
    pub fn advance(&mut self, now: u64) -> bool {
        if self.finished || now.saturating_sub(self.started_at) < self.duration_ms {
            return false;
        }
        self.finished = true;
        true
    }

    /// End playback early. Returns true if this ended it.
    pub fn skip(&mut self) -> bool {
        if self.finished || !self.skippable {
            return false;
        }
        self.finished = true;
        true
    }

    /// How many lines are on screen at `now`.
    pub fn visible_lines(&self, now: u64) -> usize {
        let total = self.lines.len();
        if self.finished || total == 0 {
            return total;
        }
        let reveal_ms = (self.duration_ms * 2 / 3).max(1);
        let per_line = (reveal_ms / total as u64).max(1);
        let elapsed = now.saturating_sub(self.started_at);
        ((elapsed / per_line) as usize + 1).min(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intro(duration_ms: u64, skippable: bool) -> IntroPlayer {
        IntroPlayer::new(&IntroConfig {
            lines: vec!["a".into(), "b".into(), "c".into()],
            duration_ms,
            skippable,
        })
    }

    #[test]
    fn finishes_exactly_once() {
        let mut p = intro(900, true);
        p.start(100);
        assert!(!p.advance(999));
        assert!(p.advance(1_000));
        assert!(!p.advance(5_000));
        assert!(!p.skip());
    }

    #[test]
    fn skip_respects_config() {
        let mut locked = intro(900, false);
        assert!(!locked.skip());
        let mut open = intro(900, true);
        assert!(open.skip());
        assert!(open.is_finished());
        assert!(!open.advance(10_000));
    }

    #[test]
    fn lines_reveal_progressively() {
        let mut p = intro(900, true);
        p.start(0);
        // 600ms reveal window, 200ms per line
        assert_eq!(p.visible_lines(0), 1);
        assert_eq!(p.visible_lines(199), 1);
        assert_eq!(p.visible_lines(200), 2);
        assert_eq!(p.visible_lines(800), 3);
    }
}
