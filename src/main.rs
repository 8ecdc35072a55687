//! hookrelay: signed webhook receiver
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                      HOOKRELAY                        │
//!                    │                                                       │
//!   POST /webhook    │  ┌─────────┐   ┌──────────┐   ┌──────────────────┐  │
//!   ─────────────────┼─▶│  http   │──▶│ routing  │──▶│    dispatch      │  │
//!                    │  │ server  │   │ resolve  │   │ headers, filter, │  │
//!                    │  └─────────┘   └──────────┘   │ body, signature, │  │
//!                    │                               │ JSON             │  │
//!   200 / 400 / 404  │                               └────────┬─────────┘  │
//!   ◀────────────────┼───────────────────────────────────────┤            │
//!                    │                                        ▼            │
//!                    │                               ┌──────────────────┐  │
//!                    │                               │     events       │  │
//!                    │                               │ "<event>", "*",  │  │
//!                    │                               │ "error"          │  │
//!                    │                               └──────────────────┘  │
//!                    │                                                       │
//!                    │  config · signing · observability · lifecycle · net   │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use hookrelay::config::load_config;
use hookrelay::lifecycle::{signals, Shutdown};
use hookrelay::net::tls::load_tls_config;
use hookrelay::observability::{logging, metrics};
use hookrelay::{HttpServer, WebhookHandler};

#[derive(Parser)]
#[command(name = "hookrelay")]
#[command(about = "Receive signed webhooks and fan them out to listeners", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "hookrelay.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);

    tracing::info!(
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        "hookrelay v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let handler = Arc::new(WebhookHandler::from_config(&config)?);

    handler.events().on_event("*", |event| {
        tracing::info!(
            delivery = %event.id,
            "Received a {} event for {}",
            event.event,
            event.repository_name().unwrap_or("unknown")
        );
    });
    handler.events().on_error(|failure| {
        tracing::warn!(
            uri = %failure.request.uri,
            "Webhook error: {}",
            failure.message()
        );
    });

    let shutdown = Arc::new(Shutdown::new());
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        signal_shutdown.trigger();
    });

    let server = HttpServer::new(config.clone(), handler);

    match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = config.listener.bind_address.parse()?;
            let rustls = load_tls_config(tls).await?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
