//! Progress broadcast for external time displays.
//!
//! A minimal last-value-cached channel: subscribers are plain closures,
//! each new subscriber immediately receives the most recent position, and
//! every published position fans out to all of them. Single-threaded by
//! design, like the rest of the core.

/// Broadcasts the current playback position to any number of observers.
pub struct TimePublisher {
    last: f64,
    subscribers: Vec<Box<dyn FnMut(f64)>>,
}

impl TimePublisher {
    pub fn new() -> Self {
        Self {
            last: 0.0,
            subscribers: Vec::new(),
        }
    }

    /// Register an observer. It is called immediately with the cached
    /// last position, then again on every publish.
    pub fn subscribe(&mut self, mut observer: impl FnMut(f64) + 'static) {
        observer(self.last);
        self.subscribers.push(Box::new(observer));
    }

    /// Cache and fan out a new position.
    pub fn publish(&mut self, position: f64) {
        self.last = position;
        for observer in &mut self.subscribers {
            observer(position);
        }
    }

    /// The most recently published position.
    pub fn last(&self) -> f64 {
        self.last
    }
}

impl Default for TimePublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn late_subscriber_receives_cached_value() {
        let mut publisher = TimePublisher::new();
        publisher.publish(1.5);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        publisher.subscribe(move |t| sink.borrow_mut().push(t));

        assert_eq!(*seen.borrow(), vec![1.5]);
    }

    #[test]
    fn publish_reaches_all_subscribers() {
        let mut publisher = TimePublisher::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for _ in 0..2 {
            let sink = seen.clone();
            publisher.subscribe(move |t| sink.borrow_mut().push(t));
        }
        publisher.publish(0.25);

        // two initial cached deliveries (0.0) plus one publish each
        assert_eq!(*seen.borrow(), vec![0.0, 0.0, 0.25, 0.25]);
        assert_eq!(publisher.last(), 0.25);
    }
}
