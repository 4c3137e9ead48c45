//! TCP listener for front-end intents

use super::IntentSession;
use crate::command::IntentExecutor;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub struct IntentListener {
    listener: TcpListener,
}

impl IntentListener {
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind intent listener on {}", addr))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one task per connection
    pub async fn run(self, executor: IntentExecutor) -> Result<()> {
        info!("[INTENT] Listening on {}", self.local_addr()?);

        loop {
            let (stream, addr) = self.listener.accept().await?;
            info!("[INTENT] Connection from {}", addr);

            let executor = executor.clone();
            tokio::spawn(async move {
                serve(IntentSession::new(stream, addr), executor).await;
            });
        }
    }
}

/// Answer intents in arrival order until the peer goes away
async fn serve(mut session: IntentSession, executor: IntentExecutor) {
    while let Some(request) = session.recv().await {
        let response = executor.handle(request).await;
        if let Err(e) = session.send(&response).await {
            warn!("[INTENT] Write error to {}: {:#}", session.addr(), e);
            break;
        }
    }
    info!("[INTENT] {} disconnected", session.addr());
}
