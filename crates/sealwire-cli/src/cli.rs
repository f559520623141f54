//! CLI command definitions and argument parsing

use std::fmt::Display;
use std::io::Cursor;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::info;

use sealwire_client::{ChannelKeys, Client, Nonce};
use sealwire_transport::StdTransport;

use crate::config::Config;
use crate::echo::{self, EchoContext, EchoError};
use crate::keyfile::KeyFile;
use crate::output::{KeygenOutput, MessageOutput, OutputFormat, OutputFormatter, SealOutput};
use crate::ExitCode;

/// sealwire - encrypted, authenticated message channel
#[derive(Parser, Debug)]
#[command(name = "sealwire")]
#[command(version, about = "sealwire - encrypted, authenticated message channel")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: text, json, quiet
    #[arg(long, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Debug logging (frame sizes, rejected frames)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file path
    #[arg(long, global = true, env = "SEALWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Key file path
    #[arg(long, global = true, env = "SEALWIRE_KEYS")]
    pub keys: Option<PathBuf>,

    /// Per-operation network timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Largest accepted frame in bytes
    #[arg(long, global = true)]
    pub max_frame_len: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a key file for a new channel
    Keygen(KeygenArgs),
    /// Run an echo server
    Serve(ServeArgs),
    /// Send one message to an echo server and print the reply
    Send(SendArgs),
    /// Seal a message into wire bytes without any network
    Seal(SealArgs),
    /// Open wire bytes produced by `seal`
    Open(OpenArgs),
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the key file (defaults to the configured key path)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Replace an existing key file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    pub listen: Option<String>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Address of the echo server
    #[arg(long)]
    pub connect: Option<String>,

    /// Treat MESSAGE as hex instead of text
    #[arg(long)]
    pub hex: bool,

    pub message: String,
}

#[derive(Args, Debug)]
pub struct SealArgs {
    /// Message bytes, hex encoded
    pub message: String,

    /// 32-byte nonce, hex encoded (random if omitted)
    #[arg(long)]
    pub nonce: Option<String>,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Length-prefixed frame, hex encoded
    pub wire: String,
}

impl Cli {
    pub(crate) fn listen_override(&self) -> Option<String> {
        match &self.command {
            Commands::Serve(args) => args.listen.clone(),
            _ => None,
        }
    }

    pub(crate) fn connect_override(&self) -> Option<String> {
        match &self.command {
            Commands::Send(args) => args.connect.clone(),
            _ => None,
        }
    }

    /// Execute the command with an already merged configuration
    pub async fn execute_with_config(self, config: Config) -> anyhow::Result<ExitCode> {
        let formatter = OutputFormatter::new(self.output, self.verbose);
        match self.command {
            Commands::Keygen(args) => args.execute(&config, &formatter),
            Commands::Serve(_) => ServeArgs::execute(&config, &formatter).await,
            Commands::Send(args) => args.execute(&config, &formatter).await,
            Commands::Seal(args) => Ok(args.execute(&config, &formatter)),
            Commands::Open(args) => Ok(args.execute(&config, &formatter)),
        }
    }
}

/// Print a failure and hand back its exit code.
fn fail(formatter: &OutputFormatter, error: impl Display, code: ExitCode, command: &str) -> ExitCode {
    let rendered = formatter.format_error(&error, code, command);
    match formatter.format() {
        OutputFormat::Text => eprintln!("{rendered}"),
        OutputFormat::Json => println!("{rendered}"),
        OutputFormat::Quiet => {}
    }
    code
}

fn print(rendered: String) {
    if !rendered.is_empty() {
        println!("{rendered}");
    }
}

fn load_keys(config: &Config) -> anyhow::Result<ChannelKeys> {
    let path = config
        .keys_path()
        .context("no key file configured and no default location available")?;
    let file = KeyFile::load(&path).with_context(|| format!("loading {}", path.display()))?;
    Ok(file.channel_keys()?)
}

fn echo_context(config: &Config) -> anyhow::Result<EchoContext> {
    Ok(EchoContext {
        keys: load_keys(config)?,
        config: config.channel,
        timeout: config.network.timeout(),
    })
}

impl KeygenArgs {
    pub fn execute(self, config: &Config, formatter: &OutputFormatter) -> anyhow::Result<ExitCode> {
        let Some(path) = self.out.or_else(|| config.keys_path()) else {
            return Ok(fail(formatter, "no output path given", ExitCode::InvalidInput, "keygen"));
        };

        let file = KeyFile::generate(&mut OsRng);
        if let Err(e) = file.save(&path, self.force) {
            return Ok(fail(formatter, e, ExitCode::InvalidInput, "keygen"));
        }
        info!("wrote key file {}", path.display());

        print(formatter.format_keygen(&KeygenOutput {
            path: path.display().to_string(),
            keys: file.summary(),
        }));
        Ok(ExitCode::Success)
    }
}

impl ServeArgs {
    pub async fn execute(config: &Config, formatter: &OutputFormatter) -> anyhow::Result<ExitCode> {
        let ctx = match echo_context(config) {
            Ok(ctx) => ctx,
            Err(e) => return Ok(fail(formatter, format!("{e:#}"), ExitCode::InvalidInput, "serve")),
        };
        let addr: SocketAddr = config.network.listen.parse()?;

        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                let msg = format!("failed to bind {addr}: {e}");
                return Ok(fail(formatter, msg, ExitCode::ConnectionFailed, "serve"));
            }
        };
        let local = listener.local_addr()?;
        info!("echo server listening on {}", local);
        formatter.progress(&format!("Listening on {local}"));

        echo::serve(listener, ctx, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
        Ok(ExitCode::Success)
    }
}

impl SendArgs {
    pub async fn execute(self, config: &Config, formatter: &OutputFormatter) -> anyhow::Result<ExitCode> {
        let message = if self.hex {
            match hex::decode(self.message.trim()) {
                Ok(bytes) => bytes,
                Err(e) => return Ok(fail(formatter, e, ExitCode::InvalidInput, "send")),
            }
        } else {
            self.message.into_bytes()
        };
        let ctx = match echo_context(config) {
            Ok(ctx) => ctx,
            Err(e) => return Ok(fail(formatter, format!("{e:#}"), ExitCode::InvalidInput, "send")),
        };
        let addr: SocketAddr = config.network.connect.parse()?;

        formatter.progress(&format!("Sending {} bytes to {addr}", message.len()));
        match echo::send_once(addr, &ctx, &message).await {
            Ok(reply) => {
                print(formatter.format_message(&MessageOutput::new(&reply), "send"));
                Ok(ExitCode::Success)
            }
            Err(e) => {
                let code = match &e {
                    EchoError::Connect { .. } => ExitCode::ConnectionFailed,
                    EchoError::ConnectTimeout(_) => ExitCode::Timeout,
                    EchoError::Channel(err) => ExitCode::for_client_error(err),
                };
                Ok(fail(formatter, e, code, "send"))
            }
        }
    }
}

impl SealArgs {
    pub fn execute(self, config: &Config, formatter: &OutputFormatter) -> ExitCode {
        let message = match hex::decode(self.message.trim()) {
            Ok(bytes) => bytes,
            Err(e) => return fail(formatter, format!("message: {e}"), ExitCode::InvalidInput, "seal"),
        };
        let nonce = match self.nonce.as_deref().map(parse_nonce).transpose() {
            Ok(nonce) => nonce.unwrap_or_else(|| Nonce::random(&mut OsRng)),
            Err(e) => return fail(formatter, e, ExitCode::InvalidInput, "seal"),
        };
        let keys = match load_keys(config) {
            Ok(keys) => keys,
            Err(e) => return fail(formatter, format!("{e:#}"), ExitCode::InvalidInput, "seal"),
        };

        let transport = StdTransport::new(Cursor::new(Vec::new()));
        let result = Client::with_keys(keys, config.channel, transport).and_then(|mut client| {
            client.send(&message, &nonce)?;
            Ok(client.into_transport().into_inner().into_inner())
        });

        match result {
            Ok(wire) => {
                print(formatter.format_seal(&SealOutput {
                    frame_len: wire.len().saturating_sub(4),
                    wire: hex::encode(&wire),
                }));
                ExitCode::Success
            }
            Err(e) => fail(formatter, &e, ExitCode::for_client_error(&e), "seal"),
        }
    }
}

fn parse_nonce(value: &str) -> Result<Nonce, String> {
    let bytes = hex::decode(value.trim()).map_err(|e| format!("nonce: {e}"))?;
    Nonce::try_from(bytes.as_slice()).map_err(|e| e.to_string())
}

impl OpenArgs {
    pub fn execute(self, config: &Config, formatter: &OutputFormatter) -> ExitCode {
        let wire = match hex::decode(self.wire.trim()) {
            Ok(bytes) => bytes,
            Err(e) => return fail(formatter, format!("wire: {e}"), ExitCode::InvalidInput, "open"),
        };
        let keys = match load_keys(config) {
            Ok(keys) => keys,
            Err(e) => return fail(formatter, format!("{e:#}"), ExitCode::InvalidInput, "open"),
        };

        let total = wire.len();
        let transport = StdTransport::new(Cursor::new(wire));
        let result = Client::with_keys(keys, config.channel, transport).and_then(|mut client| {
            let message = client.receive()?;
            let consumed = client.into_transport().into_inner().position() as usize;
            Ok((message, total - consumed))
        });

        match result {
            Ok((message, trailing)) => {
                let mut out = MessageOutput::new(&message);
                out.trailing_bytes = (trailing > 0).then_some(trailing);
                print(formatter.format_message(&out, "open"));
                ExitCode::Success
            }
            Err(e) if e.is_closed() => {
                fail(formatter, "wire bytes end mid-frame", ExitCode::InvalidInput, "open")
            }
            Err(e) => fail(formatter, &e, ExitCode::for_client_error(&e), "open"),
        }
    }
}
