//! Output formatting for CLI results
//!
//! - Text: human-readable (default)
//! - JSON: one structured document per command, for scripting
//! - Quiet: nothing on stdout, exit code only

use std::str::FromStr;

use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::keyfile::KeyFileSummary;
use crate::ExitCode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Quiet,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Quiet => write!(f, "quiet"),
        }
    }
}

/// JSON document wrapping every command result
#[derive(Debug, Serialize)]
pub struct JsonResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<&'static str>,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub command: String,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn success(data: T, command: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            exit_code: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            command: command.to_string(),
        }
    }
}

impl JsonResponse<()> {
    pub fn error(message: &str, code: ExitCode, command: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
            exit_code: Some(code.name()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            command: command.to_string(),
        }
    }
}

/// `seal` result
#[derive(Debug, Serialize)]
pub struct SealOutput {
    pub wire: String,
    pub frame_len: usize,
}

/// `open` / `send` result
#[derive(Debug, Serialize)]
pub struct MessageOutput {
    pub message_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_utf8: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_bytes: Option<usize>,
}

impl MessageOutput {
    pub fn new(message: &[u8]) -> Self {
        Self {
            message_hex: hex::encode(message),
            message_utf8: std::str::from_utf8(message).ok().map(str::to_owned),
            trailing_bytes: None,
        }
    }
}

/// `keygen` result
#[derive(Debug, Serialize)]
pub struct KeygenOutput {
    pub path: String,
    #[serde(flatten)]
    pub keys: KeyFileSummary,
}

pub struct OutputFormatter {
    format: OutputFormat,
    verbose: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.format == OutputFormat::Quiet
    }

    pub fn format_keygen(&self, out: &KeygenOutput) -> String {
        match self.format {
            OutputFormat::Text => {
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec!["Field", "Value"]);
                table.add_row(vec!["Key file", out.path.as_str()]);
                table.add_row(vec!["Receiver public key", out.keys.receiver_public_key.as_str()]);
                table.add_row(vec!["Sender public key", out.keys.sender_public_key.as_str()]);
                table.to_string()
            }
            OutputFormat::Json => self.to_json_response(out, "keygen"),
            OutputFormat::Quiet => String::new(),
        }
    }

    pub fn format_seal(&self, out: &SealOutput) -> String {
        match self.format {
            OutputFormat::Text => out.wire.clone(),
            OutputFormat::Json => self.to_json_response(out, "seal"),
            OutputFormat::Quiet => String::new(),
        }
    }

    pub fn format_message(&self, out: &MessageOutput, command: &str) -> String {
        match self.format {
            OutputFormat::Text => match &out.message_utf8 {
                Some(text) if !self.verbose => text.clone(),
                Some(text) => format!("{text}\n({})", out.message_hex),
                None => out.message_hex.clone(),
            },
            OutputFormat::Json => self.to_json_response(out, command),
            OutputFormat::Quiet => String::new(),
        }
    }

    /// Render a failure with its exit code
    pub fn format_error(&self, error: &dyn std::fmt::Display, code: ExitCode, command: &str) -> String {
        match self.format {
            OutputFormat::Text => format!("Error: {error}"),
            OutputFormat::Json => {
                let response = JsonResponse::error(&error.to_string(), code, command);
                self.to_json(&response)
            }
            OutputFormat::Quiet => String::new(),
        }
    }

    /// Progress line on stderr, verbose text mode only
    pub fn progress(&self, message: &str) {
        if self.verbose && self.format == OutputFormat::Text {
            eprintln!("... {message}");
        }
    }

    fn to_json<T: Serialize>(&self, value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    fn to_json_response<T: Serialize>(&self, value: &T, command: &str) -> String {
        self.to_json(&JsonResponse::success(value, command))
    }
}
