//! sealwire command line tool
//!
//! - `keygen`: write a key file for one channel
//! - `serve` / `send`: TCP echo server and client
//! - `seal` / `open`: offline wire encoding

pub mod cli;
pub mod config;
pub mod echo;
pub mod keyfile;
pub mod output;

pub use cli::Cli;
pub use config::{CliOverrides, Config};
pub use output::{JsonResponse, OutputFormat, OutputFormatter};

use sealwire_client::{ClientError, CryptoError, TransportError};

/// Process exit codes.
///
/// - 0: success
/// - 1: unspecified error
/// - 2: a frame failed authentication
/// - 3: an operation timed out
/// - 4: could not connect, or the peer went away
/// - 5: bad arguments, key material or wire bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    AuthenticationFailed = 2,
    Timeout = 3,
    ConnectionFailed = 4,
    InvalidInput = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Convert to process exit code
    pub fn to_exit_code(self) -> std::process::ExitCode {
        std::process::ExitCode::from(self as u8)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExitCode::Success => "SUCCESS",
            ExitCode::GeneralError => "GENERAL_ERROR",
            ExitCode::AuthenticationFailed => "AUTH_FAILED",
            ExitCode::Timeout => "TIMEOUT",
            ExitCode::ConnectionFailed => "CONNECTION_FAILED",
            ExitCode::InvalidInput => "INVALID_INPUT",
        }
    }

    /// Exit code for a failed channel operation.
    pub fn for_client_error(err: &ClientError) -> Self {
        match err {
            ClientError::Crypto(CryptoError::AuthenticationFailed) => ExitCode::AuthenticationFailed,
            ClientError::Transport(TransportError::Timeout) => ExitCode::Timeout,
            ClientError::Transport(_) => ExitCode::ConnectionFailed,
            ClientError::Crypto(_) | ClientError::Framing(_) | ClientError::Config(_) => {
                ExitCode::InvalidInput
            }
        }
    }
}
