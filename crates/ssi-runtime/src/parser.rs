//! Command log parser
//!
//! One command per line. Tokens are separated by parentheses, commas and
//! whitespace, so `W(T1, x2, 5)` and `W(T1,x2,5)` parse the same.

use ssi_engine::{Command, EngineError, SiteId, TxnId, Value, VariableId};
use thiserror::Error;

/// A parsed log line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// Blank or `//` comment: advances the clock only
    Blank,
    Command(Command),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unrecognized command: {0}")]
    UnknownCommand(String),

    #[error("{command} expects {expected} argument(s), got {got}")]
    Arity {
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid variable name: {0} (expected x<index>)")]
    InvalidVariable(String),

    #[error("Invalid site id: {0}")]
    InvalidSite(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Line is not valid UTF-8: {0}")]
    NotUtf8(String),
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        EngineError::InvalidCommand(err.to_string())
    }
}

/// Parse a raw log line; bytes that are not UTF-8 make the line malformed.
pub fn parse_bytes(raw: &[u8]) -> Result<Line, ParseError> {
    match std::str::from_utf8(raw) {
        Ok(line) => parse_line(line),
        Err(_) => Err(ParseError::NotUtf8(
            String::from_utf8_lossy(raw).trim().to_string(),
        )),
    }
}

pub fn parse_line(line: &str) -> Result<Line, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("//") {
        return Ok(Line::Blank);
    }

    let tokens: Vec<&str> = line
        .split(|c: char| c == '(' || c == ')' || c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect();
    let Some((&name, args)) = tokens.split_first() else {
        return Ok(Line::Blank);
    };

    let command = match name {
        "begin" => Command::Begin(txn(name, args)?),
        "beginRO" => Command::BeginReadOnly(txn(name, args)?),
        "end" => Command::End(txn(name, args)?),
        "R" => {
            arity(name, args, 2)?;
            Command::Read(TxnId::from(args[0]), variable(args[1])?)
        }
        "W" => {
            arity(name, args, 3)?;
            Command::Write(TxnId::from(args[0]), variable(args[1])?, value(args[2])?)
        }
        "fail" => Command::Fail(site(name, args)?),
        "recover" => Command::Recover(site(name, args)?),
        "dump" => {
            arity(name, args, 0)?;
            Command::Dump
        }
        _ => return Err(ParseError::UnknownCommand(line.to_string())),
    };

    Ok(Line::Command(command))
}

fn arity(command: &str, args: &[&str], expected: usize) -> Result<(), ParseError> {
    if args.len() != expected {
        return Err(ParseError::Arity {
            command: command.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn txn(command: &str, args: &[&str]) -> Result<TxnId, ParseError> {
    arity(command, args, 1)?;
    Ok(TxnId::from(args[0]))
}

fn site(command: &str, args: &[&str]) -> Result<SiteId, ParseError> {
    arity(command, args, 1)?;
    args[0]
        .parse()
        .map_err(|_| ParseError::InvalidSite(args[0].to_string()))
}

fn variable(token: &str) -> Result<VariableId, ParseError> {
    token
        .strip_prefix('x')
        .and_then(|index| index.parse().ok())
        .ok_or_else(|| ParseError::InvalidVariable(token.to_string()))
}

fn value(token: &str) -> Result<Value, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::InvalidValue(token.to_string()))
}
