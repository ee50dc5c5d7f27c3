//! Single cancellable inactivity timer.
//!
//! Operator activity pushes the deadline forward; while disarmed the timer
//! never fires. The owner awaits [`IdleTimer::expired`] in its event loop.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct IdleTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl IdleTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Start or restart the countdown from `now`
    pub fn arm_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    pub fn arm(&mut self) {
        self.arm_at(Instant::now());
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Restart the countdown only if it is already running
    pub fn touch(&mut self) {
        if self.is_armed() {
            self.arm();
        }
    }

    #[cfg(test)]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Resolves once the deadline passes; pends forever while disarmed
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disarmed_never_expires() {
        let timer = IdleTimer::new(Duration::from_secs(10));
        assert!(!timer.is_expired_at(Instant::now() + Duration::from_secs(3600)));
    }

    #[test]
    fn test_rearm_pushes_deadline() {
        let start = Instant::now();
        let mut timer = IdleTimer::new(Duration::from_secs(10));
        timer.arm_at(start);
        assert!(!timer.is_expired_at(start + Duration::from_secs(9)));
        assert!(timer.is_expired_at(start + Duration::from_secs(10)));

        timer.arm_at(start + Duration::from_secs(8));
        assert!(!timer.is_expired_at(start + Duration::from_secs(17)));
        assert!(timer.is_expired_at(start + Duration::from_secs(18)));

        timer.disarm();
        assert!(!timer.is_expired_at(start + Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_expired_resolves() {
        let mut timer = IdleTimer::new(Duration::from_millis(20));
        timer.arm();
        tokio::time::timeout(Duration::from_secs(2), timer.expired())
            .await
            .expect("timer should fire");
    }
}
