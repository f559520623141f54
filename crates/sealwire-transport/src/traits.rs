//! Transport traits: three operations, blocking or async, no crypto.

use std::io;

use async_trait::async_trait;

/// Common transport error type
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,

    #[error("transport I/O failure: {0}")]
    IoFailure(#[source] io::Error),

    #[error("transport operation timed out")]
    Timeout,
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => TransportError::Closed,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout,
            _ => TransportError::IoFailure(e),
        }
    }
}

/// Blocking byte transport.
///
/// `read_exact` either fills the whole buffer or fails; a stream that ends
/// before that reports [`TransportError::Closed`].
pub trait Transport {
    /// Read exactly `buf.len()` bytes.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;
    /// Write every byte of `data`, buffering if needed.
    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;
    /// Push buffered writes to the underlying stream.
    fn flush(&mut self) -> Result<(), TransportError>;
}

/// Async byte transport with the same contract as [`Transport`].
///
/// The only suspension points of a channel are these three calls. Timeouts
/// and cancellation are the implementation's business.
#[async_trait]
pub trait AsyncTransport: Send {
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;
    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;
    async fn flush(&mut self) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_exact(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(data)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_exact(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(data)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }
}

#[async_trait]
impl<T: AsyncTransport + ?Sized> AsyncTransport for &mut T {
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_exact(buf).await
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(data).await
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush().await
    }
}

#[async_trait]
impl<T: AsyncTransport + ?Sized> AsyncTransport for Box<T> {
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_exact(buf).await
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(data).await
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush().await
    }
}
