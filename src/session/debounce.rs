use std::time::{Duration, Instant};

/// Trailing-edge debounce: only the last value scheduled within `delay` of
/// the previous one is delivered, `delay` after it was scheduled.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending value and restart the delay
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// The pending value, once its delay has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, d)| *d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_edge_delivers_last_value() {
        let t0 = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_millis(100));
        debounce.schedule((80, 24), t0);
        debounce.schedule((90, 24), t0 + Duration::from_millis(60));
        debounce.schedule((100, 30), t0 + Duration::from_millis(120));

        assert_eq!(debounce.poll(t0 + Duration::from_millis(200)), None);
        assert_eq!(
            debounce.poll(t0 + Duration::from_millis(220)),
            Some((100, 30))
        );
        assert_eq!(debounce.poll(t0 + Duration::from_millis(500)), None);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let t0 = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_millis(100));
        debounce.schedule(1, t0);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert_eq!(debounce.poll(t0 + Duration::from_secs(1)), None);
    }
}
