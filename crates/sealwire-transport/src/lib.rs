//! Byte transports and framing for sealwire channels.
//!
//! The channel core only talks to the [`Transport`] / [`AsyncTransport`]
//! traits defined here. Concrete streams (std sockets, tokio streams, host
//! callbacks, in-memory buffers) plug in through the adapters in [`io`] and
//! [`testing`].

pub mod traits;
pub mod framing;
pub mod io;
pub mod testing;

pub use traits::*;
pub use framing::*;
pub use io::*;
pub use testing::*;
