//! Trailing debounce with an explicit flush.
//!
//! Deliberately not timer-based: the owner passes `now` into `call` and
//! drives `poll`, so teardown, blur, and submit paths share one well-defined
//! flush primitive and tests inject a manual clock.

use std::time::Duration;

use web_time::Instant;

/// A debounced sink. `call` stores the value and (re)arms the deadline;
/// `poll` delivers once the deadline passes; `flush` delivers immediately
/// and always wins over a pending deadline.
pub struct Debounced<T> {
    delay: Duration,
    sink: Box<dyn FnMut(T)>,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debounced<T> {
    pub fn new(delay: Duration, sink: impl FnMut(T) + 'static) -> Self {
        Self {
            delay,
            sink: Box::new(sink),
            pending: None,
            deadline: None,
        }
    }

    /// Swap the sink, keeping any pending value and deadline.
    pub fn set_sink(&mut self, sink: impl FnMut(T) + 'static) {
        self.sink = Box::new(sink);
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Store `value` for delivery after the coalescing delay, replacing any
    /// value already pending.
    pub fn call(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.deadline = Some(now + self.delay);
    }

    /// Deliver the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) {
        if self.deadline.is_some_and(|d| now >= d) {
            self.flush();
        }
    }

    /// Deliver the pending value immediately, cancelling the deadline.
    pub fn flush(&mut self) {
        self.deadline = None;
        if let Some(value) = self.pending.take() {
            (self.sink)(value);
        }
    }

    /// Drop any pending value without delivering it.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn make_debounced(delay_ms: u64) -> (Debounced<String>, Rc<RefCell<Vec<String>>>) {
        let delivered = Rc::new(RefCell::new(Vec::new()));
        let sink_log = delivered.clone();
        let debounced = Debounced::new(Duration::from_millis(delay_ms), move |v: String| {
            sink_log.borrow_mut().push(v);
        });
        (debounced, delivered)
    }

    #[test]
    fn test_coalesces_rapid_calls() {
        let (mut debounced, delivered) = make_debounced(150);
        let start = Instant::now();
        for i in 0..5 {
            debounced.call(format!("edit {i}"), start + Duration::from_millis(i * 10));
            debounced.poll(start + Duration::from_millis(i * 10));
        }
        assert!(delivered.borrow().is_empty());
        debounced.poll(start + Duration::from_millis(40 + 150));
        assert_eq!(*delivered.borrow(), vec!["edit 4".to_string()]);
    }

    #[test]
    fn test_flush_beats_deadline() {
        let (mut debounced, delivered) = make_debounced(150);
        let start = Instant::now();
        debounced.call("content".into(), start);
        debounced.flush();
        assert_eq!(*delivered.borrow(), vec!["content".to_string()]);
        // Deadline is gone; a later poll must not deliver again.
        debounced.poll(start + Duration::from_millis(500));
        assert_eq!(delivered.borrow().len(), 1);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let (mut debounced, delivered) = make_debounced(150);
        let start = Instant::now();
        debounced.call("content".into(), start);
        debounced.cancel();
        debounced.poll(start + Duration::from_millis(500));
        assert!(delivered.borrow().is_empty());
        assert!(!debounced.is_pending());
    }

    #[test]
    fn test_flush_without_pending_is_noop() {
        let (mut debounced, delivered) = make_debounced(150);
        debounced.flush();
        assert!(delivered.borrow().is_empty());
    }
}
