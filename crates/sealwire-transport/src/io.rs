//! Adapters from concrete byte streams to the transport traits.

use std::io::{self, Read, Write};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout as tokio_timeout;

use crate::traits::{AsyncTransport, Transport, TransportError};

/// Blocking transport over any `Read + Write` stream (e.g. `TcpStream`).
#[derive(Debug)]
pub struct StdTransport<S> {
    inner: S,
}

impl<S: Read + Write> StdTransport<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Read + Write> Transport for StdTransport<S> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        Read::read_exact(&mut self.inner, buf).map_err(TransportError::from)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        Write::write_all(&mut self.inner, data).map_err(TransportError::from)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Write::flush(&mut self.inner).map_err(TransportError::from)
    }
}

/// Async transport over a tokio stream, with an optional per-operation
/// deadline.
#[derive(Debug)]
pub struct TokioTransport<S> {
    inner: S,
    timeout: Option<Duration>,
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> TokioTransport<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            timeout: None,
        }
    }

    /// Fail any single read, write or flush that takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

async fn bounded<F, T>(deadline: Option<Duration>, op: F) -> Result<T, TransportError>
where
    F: std::future::Future<Output = io::Result<T>>,
{
    match deadline {
        Some(d) => tokio_timeout(d, op)
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(TransportError::from),
        None => op.await.map_err(TransportError::from),
    }
}

#[async_trait]
impl<S: AsyncRead + AsyncWrite + Unpin + Send> AsyncTransport for TokioTransport<S> {
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        bounded(self.timeout, AsyncReadExt::read_exact(&mut self.inner, buf)).await?;
        Ok(())
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        bounded(self.timeout, AsyncWriteExt::write_all(&mut self.inner, data)).await
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        bounded(self.timeout, AsyncWriteExt::flush(&mut self.inner)).await
    }
}

/// Blocking transport wired from three host callbacks.
///
/// `read` is asked for exactly `n` bytes and must return exactly `n`.
pub struct FnTransport<R, W, F> {
    read: R,
    write: W,
    flush: F,
}

impl<R, W, F> FnTransport<R, W, F>
where
    R: FnMut(usize) -> Result<Vec<u8>, TransportError>,
    W: FnMut(&[u8]) -> Result<(), TransportError>,
    F: FnMut() -> Result<(), TransportError>,
{
    pub fn new(read: R, write: W, flush: F) -> Self {
        Self { read, write, flush }
    }
}

impl<R, W, F> Transport for FnTransport<R, W, F>
where
    R: FnMut(usize) -> Result<Vec<u8>, TransportError>,
    W: FnMut(&[u8]) -> Result<(), TransportError>,
    F: FnMut() -> Result<(), TransportError>,
{
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let data = (self.read)(buf.len())?;
        if data.len() != buf.len() {
            return Err(TransportError::IoFailure(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "read callback returned {} bytes, expected {}",
                    data.len(),
                    buf.len()
                ),
            )));
        }
        buf.copy_from_slice(&data);
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (self.write)(data)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (self.flush)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_std_transport_short_stream_is_closed() {
        let mut t = StdTransport::new(Cursor::new(vec![1u8, 2, 3]));
        let mut buf = [0u8; 4];
        assert!(matches!(t.read_exact(&mut buf), Err(TransportError::Closed)));
    }

    #[test]
    fn test_std_transport_writes_through() {
        let mut t = StdTransport::new(Cursor::new(Vec::new()));
        t.write_all(b"abc").unwrap();
        t.flush().unwrap();
        assert_eq!(t.into_inner().into_inner(), b"abc");
    }

    #[test]
    fn test_fn_transport_rejects_wrong_read_size() {
        let mut t = FnTransport::new(
            |n| Ok(vec![0u8; n - 1]),
            |_| Ok(()),
            || Ok(()),
        );
        let mut buf = [0u8; 8];
        assert!(matches!(
            t.read_exact(&mut buf),
            Err(TransportError::IoFailure(_))
        ));
    }

    #[test]
    fn test_fn_transport_forwards_calls() {
        let mut written = Vec::new();
        let mut flushes = 0;
        {
            let mut t = FnTransport::new(
                |n| Ok(vec![7u8; n]),
                |d: &[u8]| {
                    written.extend_from_slice(d);
                    Ok(())
                },
                || {
                    flushes += 1;
                    Ok(())
                },
            );
            let mut buf = [0u8; 3];
            t.read_exact(&mut buf).unwrap();
            assert_eq!(buf, [7, 7, 7]);
            t.write_all(b"xy").unwrap();
            t.flush().unwrap();
        }
        assert_eq!(written, b"xy");
        assert_eq!(flushes, 1);
    }

    #[tokio::test]
    async fn test_tokio_transport_with_mock_stream() {
        let mock = tokio_test::io::Builder::new()
            .read(&[9, 8, 7])
            .write(b"ok")
            .build();
        let mut t = TokioTransport::new(mock);

        let mut buf = [0u8; 3];
        AsyncTransport::read_exact(&mut t, &mut buf).await.unwrap();
        assert_eq!(buf, [9, 8, 7]);
        AsyncTransport::write_all(&mut t, b"ok").await.unwrap();
        AsyncTransport::flush(&mut t).await.unwrap();
    }

    #[tokio::test]
    async fn test_tokio_transport_eof_is_closed() {
        let (client, server) = tokio::io::duplex(64);
        drop(server);
        let mut t = TokioTransport::new(client);
        let mut buf = [0u8; 1];
        let err = AsyncTransport::read_exact(&mut t, &mut buf).await.unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_transport_timeout() {
        let (client, _server) = tokio::io::duplex(64);
        let mut t = TokioTransport::new(client).with_timeout(Duration::from_secs(5));
        let mut buf = [0u8; 1];
        let err = AsyncTransport::read_exact(&mut t, &mut buf).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout));
    }
}
