use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use user_directory::api;
use user_directory::grpc;
use user_directory::logger::*;
use user_directory::server::*;
use user_directory::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let http_address: SocketAddr = project_settings.http.address.parse()?;
    let grpc_address: SocketAddr = project_settings.grpc.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings).await?);
    let cancel = server.cancellation_token();

    let api_v1 = api::v1::api_filter(
        server.user_service.clone(),
        project_settings.http.list_timeout(),
    );
    let (http_bound, http_server) = warp::serve(api_v1)
        .try_bind_with_graceful_shutdown(http_address, cancel.clone().cancelled_owned())?;
    info!(address = %http_bound, "http server listening");
    let http_handle = tokio::spawn(http_server);

    let mut grpc_handle = tokio::spawn(grpc::serve(
        server.user_service.clone(),
        grpc_address,
        project_settings.grpc.reflection,
        cancel.clone().cancelled_owned(),
    ));

    // Both listeners drain on the same token.
    let early_exit = tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown signal received");
            None
        }
        result = &mut grpc_handle => Some(result),
    };
    cancel.cancel();

    let grpc_result = match early_exit {
        Some(result) => result,
        None => grpc_handle.await,
    };
    if let Err(e) = http_handle.await {
        error!("http server task failed: {}", e);
    }
    info!("http server stopped");

    let shutdown_timeout = std::time::Duration::from_secs(100);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => tracing::info!("server shutdown successfully"),
        Err(_) => tracing::error!("server shutdown timed out"),
    }

    grpc_result?
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Could not register SIGINT");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Could not register SIGTERM")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
