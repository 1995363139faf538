//! Parsing for transaction scripts.
//!
//! ## Supported Syntax
//!
//! - `write <addr> <data>`: one write transfer
//! - `read <addr>` or `read <addr> == <value>`: one read transfer, optionally checked
//! - `idle <cycles>`: clock with no request
//! - `reset <cycles>`: hold reset low, then release
//! - `irq <0|1>`, `irq_ack <0|1>`, `sync <0|1>`: drive the `interrupt_in`,
//!   `interrupt_ack_out` and `sync_in` passthrough sources
//! - Cycle counts for `idle` and `reset` are capped at [`MAX_SCRIPT_CYCLES`]
//! - Comments: `#` to end of line
//! - Literals: decimal, `0x` hex, `0b` binary

use std::fmt;

/// Largest cycle count accepted by `idle` and `reset`.
pub const MAX_SCRIPT_CYCLES: u64 = 1_000_000;

/// Passthrough source a script can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughSource {
    /// `interrupt_in`, relayed to `interrupt_out`.
    Interrupt,
    /// `interrupt_ack_out`, relayed to `interrupt_ack_in`.
    InterruptAck,
    /// `sync_in`, relayed to `sync_out`.
    Sync,
}

impl PassthroughSource {
    /// Script keyword driving this source.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Interrupt => "irq",
            Self::InterruptAck => "irq_ack",
            Self::Sync => "sync",
        }
    }
}

/// One script command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Write `data` to `address`.
    Write {
        /// Target address.
        address: u16,
        /// Value written.
        data: u16,
    },
    /// Read `address`, optionally checking the result.
    Read {
        /// Target address.
        address: u16,
        /// Value the read must return.
        expect: Option<u16>,
    },
    /// Clock with no request.
    Idle {
        /// Number of cycles.
        cycles: u64,
    },
    /// Hold reset for a number of cycles.
    Reset {
        /// Number of cycles.
        cycles: u64,
    },
    /// Drive one passthrough source.
    Drive {
        /// Source driven.
        source: PassthroughSource,
        /// Level driven.
        level: bool,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write { address, data } => write!(f, "write {address:#06x} {data:#06x}"),
            Self::Read {
                address,
                expect: Some(value),
            } => write!(f, "read {address:#06x} == {value:#06x}"),
            Self::Read {
                address,
                expect: None,
            } => write!(f, "read {address:#06x}"),
            Self::Idle { cycles } => write!(f, "idle {cycles}"),
            Self::Reset { cycles } => write!(f, "reset {cycles}"),
            Self::Drive { source, level } => {
                write!(f, "{} {}", source.keyword(), u8::from(*level))
            }
        }
    }
}

/// A command with its 1-indexed source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-indexed source line.
    pub line: usize,
    /// Parsed command.
    pub command: Command,
}

/// Error parsing a script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    /// 1-indexed source line.
    pub line: usize,
    /// The offending text, comment stripped.
    pub text: String,
    /// Description of the error.
    pub message: String,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} (in '{}')", self.line, self.message, self.text)
    }
}

impl std::error::Error for ScriptError {}

/// Parses a whole script.
///
/// # Errors
///
/// Returns the first line that fails to parse.
pub fn parse_script(content: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = idx + 1;
        let stripped = strip_comment(raw).trim();
        if stripped.is_empty() {
            continue;
        }

        let command = parse_command(stripped).map_err(|message| ScriptError {
            line,
            text: stripped.to_string(),
            message,
        })?;
        lines.push(ScriptLine { line, command });
    }

    Ok(lines)
}

fn strip_comment(line: &str) -> &str {
    line.find('#').map_or(line, |pos| &line[..pos])
}

fn parse_command(text: &str) -> Result<Command, String> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let (keyword, args) = parts
        .split_first()
        .ok_or_else(|| "expected a command".to_string())?;

    match keyword.to_ascii_lowercase().as_str() {
        "write" => match args {
            [address, data] => Ok(Command::Write {
                address: parse_u16(address)?,
                data: parse_u16(data)?,
            }),
            _ => Err("expected 'write <addr> <data>'".to_string()),
        },
        "read" => match args {
            [address] => Ok(Command::Read {
                address: parse_u16(address)?,
                expect: None,
            }),
            [address, "==", value] => Ok(Command::Read {
                address: parse_u16(address)?,
                expect: Some(parse_u16(value)?),
            }),
            _ => Err("expected 'read <addr> [== <value>]'".to_string()),
        },
        "idle" => single_count(args).map(|cycles| Command::Idle { cycles }),
        "reset" => single_count(args).map(|cycles| Command::Reset { cycles }),
        "irq" => drive(PassthroughSource::Interrupt, args),
        "irq_ack" => drive(PassthroughSource::InterruptAck, args),
        "sync" => drive(PassthroughSource::Sync, args),
        other => Err(format!("unknown command '{other}'")),
    }
}

fn drive(source: PassthroughSource, args: &[&str]) -> Result<Command, String> {
    let level = match args {
        ["0"] => false,
        ["1"] => true,
        _ => return Err(format!("expected '{} <0|1>'", source.keyword())),
    };
    Ok(Command::Drive { source, level })
}

fn single_count(args: &[&str]) -> Result<u64, String> {
    let count = match args {
        [count] => parse_u64(count)?,
        _ => return Err("expected a single cycle count".to_string()),
    };
    if count > MAX_SCRIPT_CYCLES {
        return Err(format!(
            "cycle count {count} exceeds the limit of {MAX_SCRIPT_CYCLES}"
        ));
    }
    Ok(count)
}

fn parse_u16(text: &str) -> Result<u16, String> {
    let value = parse_u64(text)?;
    u16::try_from(value).map_err(|_| format!("value '{text}' does not fit in 16 bits"))
}

fn parse_u64(text: &str) -> Result<u64, String> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).map_err(|_| format!("invalid hex value '{text}'"))
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).map_err(|_| format!("invalid binary value '{text}'"))
    } else {
        text.parse::<u64>()
            .map_err(|_| format!("invalid decimal value '{text}'"))
    }
}
