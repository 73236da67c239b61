use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    delay: Duration,
    jitter: Duration,
}

impl Pacer {
    pub fn new(delay: Duration, jitter: Duration) -> Self {
        Self { delay, jitter }
    }

    pub fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let extra = rand::thread_rng().gen_range(Duration::ZERO..=self.jitter);
        self.delay + extra
    }

    pub async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_within_window() {
        let pacer = Pacer::new(Duration::from_millis(100), Duration::from_millis(500));
        for _ in 0..100 {
            let d = pacer.next_delay();
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_millis(600));
        }
    }

    #[test]
    fn test_zero_jitter_is_fixed() {
        let pacer = Pacer::new(Duration::from_millis(20), Duration::ZERO);
        assert_eq!(pacer.next_delay(), Duration::from_millis(20));
    }
}
