use crate::logger::*;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("{target}: gave up after {attempts} attempt(s): {last_error}")]
    Exhausted {
        target: String,
        attempts: u32,
        last_error: String,
    },
    #[error("{target}: {reason}")]
    Unreachable { target: String, reason: String },
}

/// Fixed-delay retry budget for startup connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

/// Calls `connect` until it succeeds or the policy runs out of attempts.
/// A policy of zero attempts still tries once.
pub async fn connect_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    target: &str,
    mut connect: F,
) -> Result<T, ConnectError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match connect().await {
            Ok(handle) => {
                info!(attempt, "connected to {target}");
                return Ok(handle);
            }
            Err(e) => {
                last_error = e.to_string();
                if attempt < attempts {
                    warn!(
                        "failed to connect to {target}, retrying in {:?} ({attempt}/{attempts}): {e}",
                        policy.delay
                    );
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    error!("failed to connect to {target} after {attempts} attempt(s): {last_error}");
    Err(ConnectError::Exhausted {
        target: target.to_owned(),
        attempts,
        last_error,
    })
}
