/// SlowWriter: typewriter-style output scheduler.
///
/// Messages are queued FIFO and drained one character at a time:
///   - the first character of a message goes out as soon as its turn starts
///   - every following character waits the message delay after the previous one
///   - a message never starts before the previous one has fully drained
///
/// A message's turn starts at the later of its enqueue time and the moment
/// the previous message emitted its last character. Time is supplied by the
/// caller (`advance(now)`, milliseconds), so the writer never sleeps and a
/// late `advance` simply catches up in order.

use std::collections::VecDeque;

/// The single downstream consumer of emitted characters.
pub trait CharSink {
    fn put_char(&mut self, ch: char);
}

impl CharSink for String {
    fn put_char(&mut self, ch: char) {
        self.push(ch);
    }
}

impl CharSink for Vec<char> {
    fn put_char(&mut self, ch: char) {
        self.push(ch);
    }
}

// ── Message ──

/// Immutable text payload with an optional per-message delay override.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    chars: Vec<char>,
    delay_ms: Option<u64>,
}

impl Message {
    /// Message paced at the writer's default delay.
    pub fn new(text: &str) -> Self {
        Message { chars: text.chars().collect(), delay_ms: None }
    }

    pub fn with_delay(text: &str, delay_ms: u64) -> Self {
        Message { chars: text.chars().collect(), delay_ms: Some(delay_ms) }
    }

    /// Zero-delay message: drains in one go once its turn comes.
    pub fn instant(text: &str) -> Self {
        Self::with_delay(text, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

// ── Writer ──

struct Queued {
    message: Message,
    enqueued_at: u64,
}

struct Active {
    chars: Vec<char>,
    next: usize,
    delay_ms: u64,
    /// When `chars[next]` becomes due.
    due_at: u64,
}

pub struct SlowWriter<S> {
    default_delay_ms: u64,
    queue: VecDeque<Queued>,
    active: Option<Active>,
    /// Latest time seen by `advance`.
    clock: u64,
    /// Emission time of the previous message's last character.
    free_at: u64,
    sink: Option<S>,
}

impl<S: CharSink> SlowWriter<S> {
    pub fn new(default_delay_ms: u64) -> Self {
        SlowWriter {
            default_delay_ms,
            queue: VecDeque::new(),
            active: None,
            clock: 0,
            free_at: 0,
            sink: None,
        }
    }

    /// Register the consumer. Replaces (and returns) any previous one.
    pub fn subscribe(&mut self, sink: S) -> Option<S> {
        self.sink.replace(sink)
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    /// Enqueue a message. Nothing is emitted until the next `advance`.
    pub fn write(&mut self, message: Message) {
        self.queue.push_back(Queued { message, enqueued_at: self.clock });
    }

    /// Emit every character due at or before `now`. Returns how many went out.
    pub fn advance(&mut self, now: u64) -> usize {
        self.clock = self.clock.max(now);
        let mut emitted = 0;

        loop {
            if self.active.is_none() && !self.begin_next() {
                break;
            }
            let Some(active) = self.active.as_mut() else { break };

            while let Some(&ch) = active.chars.get(active.next) {
                if active.due_at > self.clock {
                    break;
                }
                if let Some(sink) = self.sink.as_mut() {
                    sink.put_char(ch);
                }
                emitted += 1;
                active.next += 1;
                if active.next < active.chars.len() {
                    active.due_at += active.delay_ms;
                }
            }

            if active.next < active.chars.len() {
                break; // next character not yet due
            }
            self.free_at = active.due_at;
            self.active = None;
        }

        emitted
    }

    /// True when every enqueued character has been emitted.
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.iter().all(|q| q.message.is_empty())
    }

    /// Characters still waiting to be emitted, in emission order.
    pub fn pending(&self) -> impl Iterator<Item = char> + '_ {
        let active = self.active.iter().flat_map(|a| a.chars[a.next..].iter().copied());
        active.chain(self.queue.iter().flat_map(|q| q.message.chars.iter().copied()))
    }

    /// Pop queued messages until one with content becomes active.
    fn begin_next(&mut self) -> bool {
        while let Some(queued) = self.queue.pop_front() {
            let start = queued.enqueued_at.max(self.free_at);
            if queued.message.is_empty() {
                self.free_at = start;
                continue;
            }
            self.active = Some(Active {
                delay_ms: queued.message.delay_ms.unwrap_or(self.default_delay_ms),
                chars: queued.message.chars,
                next: 0,
                due_at: start,
            });
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(delay: u64) -> SlowWriter<String> {
        let mut w = SlowWriter::new(delay);
        w.subscribe(String::new());
        w
    }

    fn out(w: &SlowWriter<String>) -> &str {
        w.sink().map(String::as_str).unwrap_or("")
    }

    #[test]
    fn first_char_is_immediate() {
        let mut w = writer(50);
        w.write(Message::new("abc"));
        assert_eq!(w.advance(0), 1);
        assert_eq!(out(&w), "a");
    }

    #[test]
    fn chars_are_paced_by_delay() {
        let mut w = writer(50);
        w.write(Message::new("abc"));
        w.advance(0);
        w.advance(49);
        assert_eq!(out(&w), "a");
        w.advance(50);
        assert_eq!(out(&w), "ab");
        w.advance(100);
        assert_eq!(out(&w), "abc");
        assert!(w.is_idle());
    }

    #[test]
    fn messages_never_interleave() {
        let mut w = writer(10);
        w.write(Message::new("one"));
        w.advance(0);
        // enqueued while "one" is still draining
        w.write(Message::new("two"));
        w.advance(10);
        assert_eq!(out(&w), "on");
        w.advance(20);
        // "two" starts right after the last char of "one"
        assert_eq!(out(&w), "onet");
        w.advance(40);
        assert_eq!(out(&w), "onetwo");
    }

    #[test]
    fn late_advance_catches_up_in_order() {
        let mut w = writer(10);
        w.write(Message::new("ab"));
        w.write(Message::new("cd"));
        w.write(Message::new("ef"));
        w.advance(1_000);
        assert_eq!(out(&w), "abcdef");
    }

    #[test]
    fn zero_delay_drains_synchronously() {
        let mut w = writer(100);
        w.write(Message::instant("hello"));
        assert_eq!(w.advance(0), 5);
        assert_eq!(out(&w), "hello");
    }

    #[test]
    fn instant_message_waits_its_turn() {
        let mut w = writer(100);
        w.write(Message::new("xy"));
        w.write(Message::instant("!!"));
        w.advance(0);
        assert_eq!(out(&w), "x");
        w.advance(100);
        assert_eq!(out(&w), "xy!!");
    }

    #[test]
    fn empty_message_completes_immediately() {
        let mut w = writer(10);
        w.write(Message::new(""));
        w.write(Message::new("z"));
        assert_eq!(w.advance(0), 1);
        assert_eq!(out(&w), "z");
    }

    #[test]
    fn default_delay_is_used_without_override() {
        let mut w = writer(30);
        w.write(Message::new("ab"));
        w.write(Message::with_delay("cd", 5));
        w.advance(0);
        w.advance(29);
        assert_eq!(out(&w), "a");
        w.advance(30);
        assert_eq!(out(&w), "abc");
        w.advance(35);
        assert_eq!(out(&w), "abcd");
    }

    #[test]
    fn idle_writer_starts_at_enqueue_time() {
        let mut w = writer(10);
        w.advance(500);
        w.write(Message::new("ab"));
        w.advance(500);
        assert_eq!(out(&w), "a");
        w.advance(509);
        assert_eq!(out(&w), "a");
        w.advance(510);
        assert_eq!(out(&w), "ab");
    }

    #[test]
    fn output_equals_concatenation_for_any_schedule() {
        let texts = ["boot", "", "x", "multi word line", "\r\n\n$ "];
        for step in [1_u64, 7, 13, 250] {
            let mut w = writer(9);
            for t in texts {
                w.write(Message::new(t));
            }
            let mut now = 0;
            while !w.is_idle() {
                w.advance(now);
                now += step;
            }
            assert_eq!(out(&w), texts.concat());
        }
    }

    #[test]
    fn pending_lists_active_then_queued() {
        let mut w = writer(10);
        w.write(Message::new("abc"));
        w.write(Message::new(""));
        w.write(Message::new("de"));
        assert_eq!(w.pending().collect::<String>(), "abcde");
        w.advance(10);
        assert_eq!(w.pending().collect::<String>(), "cde");
        w.advance(1_000);
        assert_eq!(w.pending().count(), 0);
    }

    #[test]
    fn without_subscriber_chars_are_dropped() {
        let mut w: SlowWriter<String> = SlowWriter::new(0);
        w.write(Message::new("lost"));
        assert_eq!(w.advance(0), 4);
        assert!(w.sink().is_none());
        assert!(w.subscribe(String::new()).is_none());
    }
}
