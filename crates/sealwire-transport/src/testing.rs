//! In-memory transports for tests and examples.
//!
//! Neither transport ever blocks: a read that cannot be satisfied from what
//! is buffered reports [`TransportError::Closed`], the same way a peer
//! hanging up mid-frame would.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::traits::{AsyncTransport, Transport, TransportError};

fn injected_write_failure() -> TransportError {
    TransportError::IoFailure(io::Error::new(
        io::ErrorKind::Other,
        "injected write failure",
    ))
}

/// Scripted transport: serves preloaded incoming bytes and captures
/// everything that gets flushed.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    incoming: VecDeque<u8>,
    pending: Vec<u8>,
    flushed: Vec<u8>,
    read_requests: Vec<usize>,
    flushes: usize,
    fail_writes: bool,
}

impl MemoryTransport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload bytes to be served by `read_exact`
    pub fn with_incoming(mut self, data: &[u8]) -> Self {
        self.push_incoming(data);
        self
    }

    /// Make every write and flush fail with an I/O error
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Append bytes to the incoming stream
    pub fn push_incoming(&mut self, data: &[u8]) {
        self.incoming.extend(data.iter().copied());
    }

    /// Bytes that have been written and flushed
    pub fn written(&self) -> &[u8] {
        &self.flushed
    }

    /// Bytes written but not yet flushed
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Take the flushed bytes, leaving the capture empty
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.flushed)
    }

    /// Sizes of every `read_exact` call, in order
    pub fn read_requests(&self) -> &[usize] {
        &self.read_requests
    }

    /// Incoming bytes not yet consumed
    pub fn remaining_incoming(&self) -> usize {
        self.incoming.len()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl Transport for MemoryTransport {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.read_requests.push(buf.len());
        if self.incoming.len() < buf.len() {
            self.incoming.clear();
            return Err(TransportError::Closed);
        }
        let n = buf.len();
        for (dst, src) in buf.iter_mut().zip(self.incoming.drain(..n)) {
            *dst = src;
        }
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.fail_writes {
            return Err(injected_write_failure());
        }
        self.pending.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        if self.fail_writes {
            return Err(injected_write_failure());
        }
        self.flushed.append(&mut self.pending);
        self.flushes += 1;
        Ok(())
    }
}

#[async_trait]
impl AsyncTransport for MemoryTransport {
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        Transport::read_exact(self, buf)
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        Transport::write_all(self, data)
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        Transport::flush(self)
    }
}

/// One end of an in-memory duplex byte pipe.
///
/// Written bytes reach the peer on `flush`.
#[derive(Debug)]
pub struct MemoryPipe {
    inbound: Arc<Mutex<VecDeque<u8>>>,
    outbound: Arc<Mutex<VecDeque<u8>>>,
    pending: Vec<u8>,
}

impl MemoryPipe {
    /// Create connected pair
    pub fn pair() -> (Self, Self) {
        let a_to_b = Arc::new(Mutex::new(VecDeque::new()));
        let b_to_a = Arc::new(Mutex::new(VecDeque::new()));

        let a = Self {
            inbound: b_to_a.clone(),
            outbound: a_to_b.clone(),
            pending: Vec::new(),
        };
        let b = Self {
            inbound: a_to_b,
            outbound: b_to_a,
            pending: Vec::new(),
        };
        (a, b)
    }

    /// Bytes delivered to this end and not yet read
    pub fn available(&self) -> usize {
        self.inbound.lock().len()
    }
}

impl Transport for MemoryPipe {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let mut inbound = self.inbound.lock();
        if inbound.len() < buf.len() {
            return Err(TransportError::Closed);
        }
        let n = buf.len();
        for (dst, src) in buf.iter_mut().zip(inbound.drain(..n)) {
            *dst = src;
        }
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.pending.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.outbound.lock().extend(self.pending.drain(..));
        Ok(())
    }
}

#[async_trait]
impl AsyncTransport for MemoryPipe {
    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        Transport::read_exact(self, buf)
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        Transport::write_all(self, data)
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        Transport::flush(self)
    }
}
