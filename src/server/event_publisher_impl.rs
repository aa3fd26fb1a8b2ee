use crate::logger::*;
use crate::server::{ConnectError, EventPublisher, PublishError, RetryPolicy, connect_with_retry};
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};

const TARGET: &str = "rabbitmq";

/// Publishes each event to a durable queue named after its topic, through
/// the default exchange. Channel confirms are not enabled.
pub struct RabbitMqPublisher {
    connection: Connection,
    channel: Channel,
}

impl RabbitMqPublisher {
    pub async fn connect(
        uri: &str,
        connection_name: &str,
        policy: &RetryPolicy,
    ) -> Result<Self, ConnectError> {
        let properties =
            ConnectionProperties::default().with_connection_name(connection_name.into());

        let connection = connect_with_retry(policy, TARGET, || {
            Connection::connect(uri, properties.clone())
        })
        .await?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| ConnectError::Unreachable {
                target: TARGET.to_owned(),
                reason: format!("open channel: {e}"),
            })?;

        Ok(Self {
            connection,
            channel,
        })
    }
}

#[async_trait::async_trait]
impl EventPublisher for RabbitMqPublisher {
    async fn publish(&self, topic: &str, message: &str) -> Result<(), PublishError> {
        if !self.channel.status().connected() {
            return Err(PublishError::Closed);
        }

        self.channel
            .queue_declare(
                topic,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| PublishError::Declare {
                topic: topic.to_owned(),
                reason: e.to_string(),
            })?;

        let _confirm = self
            .channel
            .basic_publish(
                "",
                topic,
                BasicPublishOptions::default(),
                message.as_bytes(),
                BasicProperties::default().with_content_type("text/plain".into()),
            )
            .await
            .map_err(|e| PublishError::Send {
                topic: topic.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    async fn close(&self) {
        if let Err(e) = self.channel.close(200, "shutdown").await {
            warn!("failed to close rabbitmq channel: {e}");
        }
        if let Err(e) = self.connection.close(200, "shutdown").await {
            warn!("failed to close rabbitmq connection: {e}");
        }
    }
}
