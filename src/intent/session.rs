//! One front-end connection

use anyhow::Result;
use brewlink_shared::codec::{self, FrameDecoder};
use brewlink_shared::intent::{IntentRequest, IntentResponse};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::warn;

/// Framed intent stream from a single front-end connection
pub struct IntentSession {
    stream: TcpStream,
    addr: SocketAddr,
    decoder: FrameDecoder,
    read_buf: Vec<u8>,
}

impl IntentSession {
    pub fn new(stream: TcpStream, addr: SocketAddr) -> Self {
        Self {
            stream,
            addr,
            decoder: FrameDecoder::new(),
            read_buf: vec![0u8; 4096],
        }
    }

    /// Read the next intent.
    /// Returns None once the peer closes or sends a malformed frame.
    pub async fn recv(&mut self) -> Option<IntentRequest> {
        loop {
            match self.decoder.decode_next() {
                Ok(Some(request)) => return Some(request),
                Ok(None) => {}
                Err(e) => {
                    warn!("[INTENT] Decode error from {}: {}", self.addr, e);
                    return None;
                }
            }

            match self.stream.read(&mut self.read_buf).await {
                Ok(0) => return None,
                Ok(n) => self.decoder.extend(&self.read_buf[..n]),
                Err(e) => {
                    warn!("[INTENT] Read error from {}: {}", self.addr, e);
                    return None;
                }
            }
        }
    }

    pub async fn send(&mut self, response: &IntentResponse) -> Result<()> {
        let encoded = codec::encode(response)?;
        self.stream.write_all(&encoded).await?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}
