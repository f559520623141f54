//! TCP echo server and one-shot client over a sealwire channel.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use rand_core::OsRng;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use sealwire_client::{AsyncClient, ChannelConfig, ChannelKeys, ClientError, Nonce, Role};
use sealwire_transport::TokioTransport;

#[derive(Debug, Error)]
pub enum EchoError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out connecting to {0}")]
    ConnectTimeout(SocketAddr),

    #[error(transparent)]
    Channel(#[from] ClientError),
}

/// Everything a connection handler needs.
#[derive(Debug, Clone)]
pub struct EchoContext {
    pub keys: ChannelKeys,
    pub config: ChannelConfig,
    pub timeout: Duration,
}

impl EchoContext {
    /// The connecting side is always the initiator and the server the
    /// responder, whatever role the configuration names.
    fn client(
        &self,
        stream: TcpStream,
        role: Role,
    ) -> Result<AsyncClient<TokioTransport<TcpStream>>, ClientError> {
        let transport = TokioTransport::new(stream).with_timeout(self.timeout);
        AsyncClient::with_keys(self.keys.clone(), self.config.with_role(role), transport)
    }
}

/// Accept connections until `shutdown` resolves, echoing every message
/// back under a fresh random nonce.
pub async fn serve<F>(listener: TcpListener, ctx: EchoContext, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("echo server shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                info!("accepted connection from {}", peer);
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    match handle_connection(stream, &ctx).await {
                        Ok(count) => info!("{} closed after {} messages", peer, count),
                        Err(e) => warn!("connection from {} failed: {}", peer, e),
                    }
                });
            }
        }
    }
}

/// Echo messages until the peer disconnects. Returns the message count.
pub async fn handle_connection(stream: TcpStream, ctx: &EchoContext) -> Result<u64, ClientError> {
    let mut client = ctx.client(stream, Role::Responder)?;
    let mut count = 0u64;
    loop {
        let message = match client.receive().await {
            Ok(message) => message,
            Err(e) if e.is_closed() => return Ok(count),
            Err(e) => return Err(e),
        };
        debug!("echoing {} bytes", message.len());
        client.send(&message, &Nonce::random(&mut OsRng)).await?;
        count += 1;
    }
}

/// Connect, send one message and wait for its echo.
pub async fn send_once(
    addr: SocketAddr,
    ctx: &EchoContext,
    message: &[u8],
) -> Result<Vec<u8>, EchoError> {
    let stream = tokio::time::timeout(ctx.timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| EchoError::ConnectTimeout(addr))?
        .map_err(|source| EchoError::Connect { addr, source })?;

    let mut client = ctx.client(stream, Role::Initiator)?;
    client.send(message, &Nonce::random(&mut OsRng)).await?;
    Ok(client.receive().await?)
}
