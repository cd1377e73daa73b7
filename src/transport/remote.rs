//! # Remote Transport Layer
//!
//! This file is part of the Datalink Protocol project.
//!
//! It defines the remote transport layer for network communication,
//! including TCP-based client-server interactions.
//!
//! The remote transport layer is responsible for the actual data
//! transmission between nodes, ensuring that frames are sent and received
//! correctly.
//!
//! It abstracts the underlying network details, allowing higher-level
//! protocol logic to focus on message decoding and dispatch.
//!
//! ## Responsibilities
//! - Bind the server listener
//! - Open client connections
//! - Wrap sockets in the length-prefixed frame codec
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tracing::{info, instrument};

use crate::core::codec::FrameCodec;
use crate::error::Result;

/// A TCP connection speaking length-prefixed frames
pub type FramedStream = Framed<TcpStream, FrameCodec>;

/// Binds a TCP listener at the given address
#[instrument(skip(addr), fields(address = %addr))]
pub async fn listen(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, "server listening");
    Ok(listener)
}

/// Wraps an accepted connection in the frame codec
pub fn accept_framed(stream: TcpStream, peer: SocketAddr, max_frame_size: usize) -> FramedStream {
    info!(peer = %peer, "client connected");
    Framed::new(stream, FrameCodec::new(max_frame_size))
}

/// Connects to a remote server and returns the framed transport
#[instrument(skip(addr), fields(address = %addr))]
pub async fn connect(addr: &str) -> Result<FramedStream> {
    let stream = TcpStream::connect(addr).await?;
    let framed = Framed::new(stream, FrameCodec::default());
    Ok(framed)
}
