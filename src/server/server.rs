use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mongo::*;
use crate::logger::*;
use crate::server::*;
use crate::settings::Settings;
use nanoid::nanoid;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct Server {
    pub user_service: Arc<dyn UserService>,
    pub run_id: String,
    event_publisher: Arc<dyn EventPublisher>,
    mongo_client: Option<mongodb::Client>,
    cancel: CancellationToken,
}

impl Server {
    /// Connects the store, then the broker. Either failing aborts startup:
    /// the service never serves without both.
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);
        let client_name = format!("user-directory-{}", run_id);
        info!(%run_id, "server starting");

        let mut mongo_client = None;
        let user_repo: Arc<dyn UserRepo> = match settings.user.backend.as_str() {
            "fake" => Arc::new(MemoryUserRepo::new()),
            "real" => {
                let client = connect_mongo(&MongoConfig {
                    uri: &settings.mongo.uri,
                    app_name: &client_name,
                    min_pool_size: settings.mongo.min_pool_size,
                    max_pool_size: settings.mongo.max_pool_size,
                })
                .await?;
                let db = client.database(&settings.mongo.database);
                mongo_client = Some(client);
                Arc::new(MongoUserRepo::new(&db, &settings.mongo.collection))
            }
            other => return Err(anyhow::anyhow!("Unknown user backend: {}", other)),
        };
        info!(backend = %settings.user.backend, "user store ready");

        let event_publisher: Arc<dyn EventPublisher> = match settings.events.backend.as_str() {
            "fake" => Arc::new(FakeEventPublisher::new()),
            "real" => {
                let policy = RetryPolicy {
                    max_attempts: settings.rabbitmq.connect_attempts,
                    delay: settings.rabbitmq.connect_delay(),
                };
                Arc::new(
                    RabbitMqPublisher::connect(&settings.rabbitmq.uri, &client_name, &policy)
                        .await?,
                )
            }
            other => return Err(anyhow::anyhow!("Unknown events backend: {}", other)),
        };
        info!(backend = %settings.events.backend, "event publisher ready");

        let user_service: Arc<dyn UserService> =
            Arc::new(RealUserService::new(user_repo, event_publisher.clone()));

        info!("server started");

        Ok(Self {
            user_service,
            run_id,
            event_publisher,
            mongo_client,
            cancel: CancellationToken::new(),
        })
    }

    /// Token the listeners watch. Cancelled by [`Server::shutdown`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();
        self.event_publisher.close().await;
        info!("event publisher closed");

        if let Some(client) = self.mongo_client.clone() {
            client.shutdown().await;
            info!("user store closed");
        }
    }
}
