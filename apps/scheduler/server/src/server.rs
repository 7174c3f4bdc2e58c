//! gRPC server initialization and lifecycle management
//!
//! - Tracing and optional Prometheus exporter
//! - NATS JetStream connection and exchange declaration
//! - Scheduler task with a watch-channel shutdown
//! - gRPC server with health service and graceful shutdown

use std::future::Future;
use std::sync::Arc;

use core_config::{Environment, FromEnv, NatsConfig, env_parse};
use domain_events::{EventService, Scheduler, SchedulerConfig, SchedulerContext};
use eyre::{Result, WrapErr};
use grpc_client::server::{GrpcServer, ServerConfig, create_health_service};
use messaging::Broker;
use messaging::nats::{ExchangeConfig, JetStreamBroker};
use rpc::events::v1::event_manager_server::{EventManagerServer, SERVICE_NAME};
use tokio::signal;
use tokio::sync::watch;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tracing::{error, info};

use crate::service::EventManagerService;

/// Run the scheduler server until SIGINT/SIGTERM
///
/// # Errors
///
/// Returns an error if configuration is invalid, the broker cannot be
/// reached or the exchange cannot be declared, or the server fails to bind.
pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let server_config = ServerConfig::from_env().wrap_err("Failed to load gRPC configuration")?;
    let nats_config = NatsConfig::from_env().wrap_err("Failed to load NATS configuration")?;
    let exchange_config =
        ExchangeConfig::from_env().wrap_err("Failed to load exchange configuration")?;
    let scheduler_config =
        SchedulerConfig::from_env().wrap_err("Failed to load scheduler configuration")?;

    let metrics_port: u16 = env_parse("METRICS_PORT", 0).wrap_err("Invalid METRICS_PORT")?;
    if metrics_port > 0 {
        observability::init_metrics_with_listener(metrics_port)
            .wrap_err("Failed to start Prometheus exporter")?;
        info!(port = metrics_port, "Prometheus exporter listening");
    }

    info!(url = %nats_config.url, stream = %exchange_config.stream_name, "Connecting to NATS");
    let broker = JetStreamBroker::connect(&nats_config, exchange_config)
        .await
        .wrap_err("Failed to connect to NATS")?;
    info!("Connected to NATS");

    serve(
        Arc::new(broker),
        server_config,
        scheduler_config,
        shutdown_signal(),
    )
    .await
}

/// Serve on `server_config`'s address with any broker until `shutdown` resolves.
///
/// The scheduler is stopped after the server has drained.
pub async fn serve<F>(
    broker: Arc<dyn Broker>,
    server_config: ServerConfig,
    scheduler_config: SchedulerConfig,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = server_config
        .socket_addr()
        .wrap_err_with(|| format!("Failed to parse server address: {}", server_config.addr_string()))?;

    let ctx = SchedulerContext::new(broker, scheduler_config);
    ctx.init().await.wrap_err("Failed to declare exchange")?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = tokio::spawn(Scheduler::new(Arc::clone(&ctx)).run(stop_rx));

    let (health_reporter, health_service) = create_health_service();
    GrpcServer::setup_health(&health_reporter, SERVICE_NAME).await;
    GrpcServer::log_startup(&server_config, SERVICE_NAME);

    let mut event_manager = EventManagerServer::new(EventManagerService::new(EventService::new(ctx)))
        .max_decoding_message_size(server_config.max_decoding_message_size)
        .max_encoding_message_size(server_config.max_encoding_message_size);
    if server_config.enable_compression {
        event_manager = event_manager
            .accept_compressed(CompressionEncoding::Zstd)
            .send_compressed(CompressionEncoding::Zstd);
    }

    let served = Server::builder()
        .add_service(health_service)
        .add_service(event_manager)
        .serve_with_shutdown(addr, async move {
            shutdown.await;
            GrpcServer::mark_not_serving(&health_reporter, SERVICE_NAME).await;
        })
        .await
        .wrap_err("gRPC server failed");

    // receiver already gone means the scheduler exited on its own
    let _ = stop_tx.send(true);
    scheduler.await.wrap_err("Scheduler task panicked")?;
    info!("Shutdown complete");

    served
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
