//! # Daemon
//!
//! This file is part of the Datalink Protocol project.
//!
//! The daemon owns the listening socket and serves one connection at a
//! time. Frames from the active connection are decoded, dispatched, and
//! answered in arrival order before the next connection is accepted. A
//! shutdown signal stops the listener; if a connection is active it is
//! drained for a grace period first.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::core::frame::Frame;
use crate::datalink::service::{processor, DatalinkHandler, LoggingHandler};
use crate::error::Result;
use crate::protocol::binary::BinaryReader;
use crate::protocol::dispatcher::Dispatcher;
use crate::transport::remote::{self, FramedStream};
use crate::utils::timeout::with_timeout;

/// Starts a daemon on `addr` with the stdout logging handler
///
/// Runs until Ctrl-C. Library users who need their own handler or
/// shutdown wiring should call [`start_with_shutdown`] directly.
pub async fn start(addr: &str) -> Result<()> {
    let config = ServerConfig {
        address: addr.to_string(),
        ..ServerConfig::default()
    };
    start_with_config(config).await
}

/// Starts a daemon with explicit server settings and the stdout
/// logging handler, running until Ctrl-C
pub async fn start_with_config(config: ServerConfig) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, requesting shutdown");
            let _ = shutdown_tx.send(()).await;
        }
    });

    start_with_shutdown(config, Arc::new(LoggingHandler), shutdown_rx).await
}

/// Runs the accept loop until the shutdown channel fires
///
/// Connections are served strictly sequentially: while one peer is
/// connected, further connection attempts sit in the listen backlog.
pub async fn start_with_shutdown<H: DatalinkHandler>(
    config: ServerConfig,
    handler: Arc<H>,
    mut shutdown_rx: mpsc::Receiver<()>,
) -> Result<()> {
    let listener = remote::listen(&config.address).await?;
    let dispatcher = processor(handler);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("shutdown requested, stopping listener");
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let framed = remote::accept_framed(stream, peer, config.max_frame_size);
                        match serve_connection(framed, peer, &dispatcher, &mut shutdown_rx, &config).await {
                            Ok(true) => return Ok(()),
                            Ok(false) => info!(%peer, "client disconnected"),
                            Err(err) => error!(%peer, error = %err, "connection aborted"),
                        }
                    }
                    Err(err) => error!(error = %err, "failed to accept connection"),
                }
            }
        }
    }
}

/// Serves one connection to completion
///
/// Returns `Ok(true)` when shutdown was requested while serving, so the
/// caller knows to stop accepting.
async fn serve_connection(
    mut framed: FramedStream,
    peer: SocketAddr,
    dispatcher: &Dispatcher,
    shutdown_rx: &mut mpsc::Receiver<()>,
    config: &ServerConfig,
) -> Result<bool> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!(%peer, "shutdown requested, draining active connection");
                match with_timeout(drain_connection(&mut framed, dispatcher), config.shutdown_timeout).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => error!(%peer, error = %err, "error while draining connection"),
                    Err(_) => warn!(%peer, "shutdown grace period expired before the client disconnected"),
                }
                return Ok(true);
            }
            frame = framed.next() => {
                match frame {
                    None => return Ok(false),
                    Some(frame) => process_frame(frame?, dispatcher, &mut framed).await?,
                }
            }
        }
    }
}

/// Keeps serving frames until the peer hangs up
async fn drain_connection(framed: &mut FramedStream, dispatcher: &Dispatcher) -> Result<()> {
    while let Some(frame) = framed.next().await {
        process_frame(frame?, dispatcher, framed).await?;
    }
    Ok(())
}

/// Decodes one frame, dispatches it, and sends the reply if there is one
async fn process_frame(
    frame: Frame,
    dispatcher: &Dispatcher,
    framed: &mut FramedStream,
) -> Result<()> {
    let mut reader = BinaryReader::new(&frame.payload);
    let header = reader.read_message_begin()?;
    debug!(method = %header.name, seq = header.seq, "dispatching call");
    if let Some(payload) = dispatcher.dispatch(&header, &mut reader)? {
        framed.send(Frame { payload }).await?;
    }
    Ok(())
}
