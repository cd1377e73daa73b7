//! # Client
//!
//! This file is part of the Datalink Protocol project.
//!
//! The client keeps one framed connection open and issues `update` calls
//! over it, one at a time. Each call carries a fresh sequence id and the
//! matching acknowledgement is awaited before the call returns.

use futures::{SinkExt, StreamExt};

use crate::config::ClientConfig;
use crate::core::frame::Frame;
use crate::datalink::service::{read_update_reply, write_update_call};
use crate::datalink::types::UasDatalinkLocalSet;
use crate::error::{ProtocolError, Result};
use crate::transport::remote::{self, FramedStream};
use crate::utils::timeout::with_timeout_error;

/// High-level datalink update client
#[derive(Debug)]
pub struct Client {
    framed: FramedStream,
    config: ClientConfig,
    seq: i32,
}

impl Client {
    /// Connect to a daemon at `addr` with default settings
    pub async fn connect(addr: &str) -> Result<Self> {
        let config = ClientConfig {
            address: addr.to_string(),
            ..ClientConfig::default()
        };
        Self::connect_with_config(config).await
    }

    /// Connect using explicit client settings
    pub async fn connect_with_config(config: ClientConfig) -> Result<Self> {
        let framed =
            with_timeout_error(remote::connect(&config.address), config.connection_timeout).await?;
        Ok(Self {
            framed,
            config,
            seq: 0,
        })
    }

    /// Sends one local set and waits for the acknowledgement
    ///
    /// The reply must carry the sequence id of this call. An exception
    /// reply from the daemon surfaces as [`ProtocolError::Application`].
    pub async fn update(&mut self, set: &UasDatalinkLocalSet) -> Result<()> {
        self.seq = self.seq.wrapping_add(1);
        let seq = self.seq;

        self.framed
            .send(Frame {
                payload: write_update_call(set, seq, false),
            })
            .await?;

        let frame = with_timeout_error(
            async {
                self.framed
                    .next()
                    .await
                    .ok_or(ProtocolError::ConnectionClosed)?
            },
            self.config.response_timeout,
        )
        .await?;

        read_update_reply(&frame.payload, seq)
    }

    /// Sends one local set without waiting for an acknowledgement
    pub async fn update_oneway(&mut self, set: &UasDatalinkLocalSet) -> Result<()> {
        self.seq = self.seq.wrapping_add(1);
        self.framed
            .send(Frame {
                payload: write_update_call(set, self.seq, true),
            })
            .await?;
        Ok(())
    }
}
