//! Minimum spacing between upstream API requests.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Shared gate that keeps consecutive requests at least `min_gap` apart.
///
/// Only [`RequestGate::wait`] touches the last-request timestamp; every
/// in-flight request awaits the same lock, so concurrent callers queue up
/// instead of bursting.
#[derive(Debug)]
pub struct RequestGate {
    min_gap: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestGate {
    #[must_use]
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_request: Mutex::new(None),
        }
    }

    /// Sleeps until the next request slot, then claims it.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_gap {
                tokio::time::sleep(self.min_gap.saturating_sub(elapsed)).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn first_request_is_not_delayed() {
        let gate = RequestGate::new(Duration::from_secs(10));
        let start = Instant::now();
        gate.wait().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn concurrent_callers_are_spaced_out() {
        let gate = Arc::new(RequestGate::new(Duration::from_millis(40)));
        let start = Instant::now();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let gate = Arc::clone(&gate);
                tokio::spawn(async move { gate.wait().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        // Three slots need at least two full gaps.
        assert!(start.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn zero_gap_never_sleeps() {
        let gate = RequestGate::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            gate.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
