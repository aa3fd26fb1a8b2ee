use crate::server::ConnectError;
use bson::doc;
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::Client;

const TARGET: &str = "mongodb";

#[derive(Debug, Clone)]
pub struct MongoConfig<'a> {
    pub uri: &'a str,
    pub app_name: &'a str,
    pub min_pool_size: u32,
    pub max_pool_size: u32,
}

/// Builds a pooled client and pings the deployment once. The driver
/// connects lazily, so without the ping a wrong URI would only surface on
/// the first request.
pub async fn connect_mongo(config: &MongoConfig<'_>) -> Result<Client, ConnectError> {
    let unreachable = |reason: String| ConnectError::Unreachable {
        target: TARGET.to_owned(),
        reason,
    };

    let mut options = ClientOptions::parse(config.uri)
        .await
        .map_err(|e| unreachable(format!("parse uri: {e}")))?;
    options.app_name = Some(config.app_name.to_owned());
    options.min_pool_size = Some(config.min_pool_size);
    options.max_pool_size = Some(config.max_pool_size);
    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

    let client = Client::with_options(options).map_err(|e| unreachable(e.to_string()))?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 }, None)
        .await
        .map_err(|e| unreachable(format!("ping: {e}")))?;

    Ok(client)
}
