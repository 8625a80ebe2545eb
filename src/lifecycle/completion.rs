//! Completion signal for a shutdown sequence.

use tokio::sync::watch;

/// How a shutdown sequence concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every action finished within the grace period.
    Graceful,
    /// The grace period elapsed first; some actions may still be running.
    TimedOut,
}

impl std::fmt::Display for ShutdownOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownOutcome::Graceful => write!(f, "graceful"),
            ShutdownOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Non-blocking handle to the closer's completion signal.
///
/// Any number of handles can be cloned out; all of them observe the same
/// single-fire event, including handles created after it fired.
#[derive(Debug, Clone)]
pub struct Completion {
    rx: watch::Receiver<Option<ShutdownOutcome>>,
}

impl Completion {
    pub(crate) fn new(rx: watch::Receiver<Option<ShutdownOutcome>>) -> Self {
        Self { rx }
    }

    /// Whether the shutdown sequence has concluded.
    pub fn is_complete(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// The outcome, once the sequence has concluded.
    pub fn outcome(&self) -> Option<ShutdownOutcome> {
        *self.rx.borrow()
    }

    /// Wait until the shutdown sequence has concluded.
    ///
    /// Returns `None` only if the closer was dropped without ever being
    /// triggered.
    pub async fn wait(&self) -> Option<ShutdownOutcome> {
        let mut rx = self.rx.clone();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => *outcome,
            Err(_) => None,
        };
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn late_observer_sees_outcome() {
        let (tx, rx) = watch::channel(None);
        tx.send_replace(Some(ShutdownOutcome::TimedOut));

        let completion = Completion::new(rx);
        assert!(completion.is_complete());
        assert_eq!(completion.wait().await, Some(ShutdownOutcome::TimedOut));
    }

    #[tokio::test]
    async fn all_waiters_wake() {
        let (tx, rx) = watch::channel(None);
        let completion = Completion::new(rx);

        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let c = completion.clone();
                tokio::spawn(async move { c.wait().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!completion.is_complete());
        tx.send_replace(Some(ShutdownOutcome::Graceful));

        for waiter in waiters {
            assert_eq!(waiter.await.unwrap(), Some(ShutdownOutcome::Graceful));
        }
    }

    #[tokio::test]
    async fn dropped_sender_releases_waiters() {
        let (tx, rx) = watch::channel(None);
        let completion = Completion::new(rx);
        drop(tx);
        assert_eq!(completion.wait().await, None);
    }
}
