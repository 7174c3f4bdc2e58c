//! Interactive console for the event scheduler.
//!
//! Registers with GreetSender, optionally listens on the sender's queue,
//! then reads commands from stdin until `Exit`, EOF or a signal.

pub mod cli;
pub mod commands;
pub mod listener;
pub mod session;

pub use cli::Cli;
pub use commands::{Command, CommandError};
pub use session::{Outcome, Session};

use core_config::{FromEnv, NatsConfig};
use eyre::{Result, WrapErr};
use grpc_client::{RetryConfig, create_channel_with_retry, endpoint_url};
use messaging::nats::ExchangeConfig;
use rpc::events::v1::event_manager_client::EventManagerClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tonic::codec::CompressionEncoding;
use tonic::transport::Channel;
use tracing::warn;

/// Responses may always arrive compressed; requests are only compressed on request.
pub fn event_manager_client(channel: Channel, compress: bool) -> EventManagerClient<Channel> {
    let client = EventManagerClient::new(channel).accept_compressed(CompressionEncoding::Zstd);
    if compress {
        client.send_compressed(CompressionEncoding::Zstd)
    } else {
        client
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let url = endpoint_url(&cli.dst, cli.port);
    let channel = create_channel_with_retry(url.clone(), Some(RetryConfig::new().with_max_retries(5)))
        .await
        .wrap_err_with(|| format!("Failed to connect to server at {}", url))?;
    let client = event_manager_client(channel, cli.compress);

    let mut session = Session::register(client, cli.sender_id)
        .await
        .wrap_err("Failed to get sender ID")?;
    println!("Your ID: {}", session.sender_id());

    let listener = if cli.no_listen {
        None
    } else {
        start_listener(session.sender_id()).await
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let interrupt = interrupted();
    tokio::pin!(interrupt);

    let result = loop {
        let line = tokio::select! {
            line = lines.next_line() => line.wrap_err("Failed to read stdin")?,
            _ = &mut interrupt => break Ok(()),
        };
        let Some(line) = line else {
            break Ok(());
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match session.execute(command).await {
            Ok(Outcome::Continue(output)) => {
                for printed in output {
                    println!("{}", printed);
                }
            }
            Ok(Outcome::Exit(goodbye)) => {
                println!("{}", goodbye);
                break Ok(());
            }
            Err(status) => break Err(eyre::Report::new(status).wrap_err("Exit failed")),
        }
    };

    if let Some(handle) = listener {
        handle.abort();
    }
    result
}

async fn start_listener(sender_id: i64) -> Option<tokio::task::JoinHandle<()>> {
    let config = NatsConfig::from_env().and_then(|nats| Ok((nats, ExchangeConfig::from_env()?)));
    let (nats, exchange) = match config {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "Invalid broker configuration, notifications disabled");
            return None;
        }
    };

    match listener::spawn_listener(&nats, exchange, sender_id).await {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!(url = %nats.url, error = %err, "Broker unreachable, notifications disabled");
            None
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn interrupted() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
