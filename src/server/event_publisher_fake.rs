use crate::logger::*;
use crate::server::{EventPublisher, PublishError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEvent {
    pub topic: String,
    pub message: String,
}

/// In-process publisher that logs and keeps every event it accepts.
#[derive(Debug, Default)]
pub struct FakeEventPublisher {
    published: Mutex<Vec<PublishedEvent>>,
    failing: AtomicBool,
    closed: AtomicBool,
}

impl FakeEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following publish fail as if the broker were down.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<PublishedEvent> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EventPublisher for FakeEventPublisher {
    async fn publish(&self, topic: &str, message: &str) -> Result<(), PublishError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PublishError::Closed);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Send {
                topic: topic.to_owned(),
                reason: "broker unavailable".to_owned(),
            });
        }

        debug!(topic, message, "fake publish");
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PublishedEvent {
                topic: topic.to_owned(),
                message: message.to_owned(),
            });
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
