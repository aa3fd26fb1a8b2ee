#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("publisher is closed")]
    Closed,
    #[error("declare {topic}: {reason}")]
    Declare { topic: String, reason: String },
    #[error("send to {topic}: {reason}")]
    Send { topic: String, reason: String },
}

/// Best-effort delivery of short text messages to named topics.
///
/// One publish is one attempt: no confirmation is awaited and nothing is
/// retried. Implementations are shared by all request handlers and must be
/// safe for concurrent use.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, message: &str) -> Result<(), PublishError>;

    /// Tears down the underlying connection. In-flight messages may be lost.
    async fn close(&self);
}
