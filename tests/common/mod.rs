//! Shared utilities for closer integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use graceful_closer::{Closable, CloseError};

/// A resource that counts its closes, optionally sleeping or failing first.
pub struct MockResource {
    name: &'static str,
    delay: Duration,
    fail: bool,
    closes: AtomicUsize,
}

#[allow(dead_code)]
impl MockResource {
    pub fn new(name: &'static str) -> Arc<Self> {
        Self::build(name, Duration::ZERO, false)
    }

    pub fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
        Self::build(name, delay, false)
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Self::build(name, Duration::ZERO, true)
    }

    fn build(name: &'static str, delay: Duration, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay,
            fail,
            closes: AtomicUsize::new(0),
        })
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Closable for MockResource {
    fn name(&self) -> &str {
        self.name
    }

    async fn close(&self) -> Result<(), CloseError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(format!("{} refused to close", self.name).into());
        }
        Ok(())
    }
}

/// Shared counter handed to plain actions.
#[allow(dead_code)]
pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}
