//! Command routing for host processes.
//!
//! A host sends `(command, payload)` pairs, where the payload is a JSON
//! document (or, for single-argument commands, a bare string). Every
//! response is a JSON value; failures come back as `{"error": "..."}` and
//! never as a panic.
//!
//! Commands:
//! - `setup`: liveness check, answers `"Success"`
//! - `test_distributions`: `{"data": [..] | "<json array>", "types": "normal|t|.."}`
//! - `read_sample`: `{"path": "<file>"}` (or a bare path), answers `{"data": [..]}`
//! - `write_sample`: `{"path": "<file>", "data": [..]}`, answers `"Success"`
//!
//! The dispatch table is built once in `CommandRouter::new` and not mutated.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::Sample;
use crate::error::AppError;
use crate::io::{load_sample, save_sample};
use crate::tester::Tester;

pub const NO_DATA: &str = "No data provided";

type CommandFn = fn(&CommandRouter, &Payload) -> Result<Value, AppError>;

/// Parsed command payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A JSON object (`{"data": .., "types": ..}`).
    Object(serde_json::Map<String, Value>),
    /// Anything that is not a JSON object: kept as the `data` argument.
    Raw(Value),
}

impl Payload {
    /// Parse a wire payload; text that is not valid JSON is kept as a string.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Payload::Object(map),
            Ok(other) => Payload::Raw(other),
            Err(_) => Payload::Raw(Value::String(text.to_string())),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Payload::Object(map) => map.get(name),
            Payload::Raw(value) if name == "data" => Some(value),
            Payload::Raw(_) => None,
        }
    }
}

pub struct CommandRouter {
    tester: Tester,
    commands: HashMap<&'static str, CommandFn>,
}

impl CommandRouter {
    pub fn new(tester: Tester) -> Self {
        let table: [(&'static str, CommandFn); 4] = [
            ("setup", cmd_setup),
            ("test_distributions", cmd_test_distributions),
            ("read_sample", cmd_read_sample),
            ("write_sample", cmd_write_sample),
        ];
        Self {
            tester,
            commands: table.into_iter().collect(),
        }
    }

    /// Sorted command names.
    pub fn commands(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch `command` with a raw textual payload.
    pub fn handle(&self, command: &str, payload: &str) -> Value {
        self.dispatch(command, &Payload::parse(payload))
    }

    pub fn dispatch(&self, command: &str, payload: &Payload) -> Value {
        let Some(handler) = self.commands.get(command) else {
            warn!(command, "unknown command");
            return error_value(format!("Unknown command '{command}'"));
        };
        debug!(command, "dispatching command");
        match handler(self, payload) {
            Ok(value) => value,
            Err(err) => {
                warn!(command, error = %err, "command failed");
                error_value(err.message())
            }
        }
    }
}

fn error_value(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

fn cmd_setup(_router: &CommandRouter, _payload: &Payload) -> Result<Value, AppError> {
    Ok(Value::String("Success".to_string()))
}

fn cmd_test_distributions(router: &CommandRouter, payload: &Payload) -> Result<Value, AppError> {
    let Some(values) = sample_values(payload.field("data"))? else {
        return Ok(error_value(NO_DATA));
    };
    let families = family_tokens(payload.field("types"))?;
    let entries = router.tester.evaluate(&values, &families)?;
    serde_json::to_value(entries)
        .map_err(|e| AppError::new(4, format!("Failed to serialize results: {e}")))
}

fn cmd_read_sample(_router: &CommandRouter, payload: &Payload) -> Result<Value, AppError> {
    let path = path_argument(payload)?;
    let sample = load_sample(Path::new(path))?;
    Ok(json!({ "data": sample.values() }))
}

fn cmd_write_sample(_router: &CommandRouter, payload: &Payload) -> Result<Value, AppError> {
    let path = payload
        .field("path")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::new(2, "write_sample requires a 'path' string"))?;
    let Some(values) = sample_values(payload.field("data"))? else {
        return Ok(error_value(NO_DATA));
    };
    save_sample(&Sample::new(values)?, Path::new(path))?;
    Ok(Value::String("Success".to_string()))
}

fn path_argument(payload: &Payload) -> Result<&str, AppError> {
    payload
        .field("path")
        .or_else(|| payload.field("data"))
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::new(2, "read_sample requires a 'path' string"))
}

/// Sample from `data`: an array of numbers or a string holding one.
/// `Ok(None)` means "no data" (missing, null, empty array or empty string).
fn sample_values(data: Option<&Value>) -> Result<Option<Vec<f64>>, AppError> {
    let decoded;
    let array = match data {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => {
            decoded = serde_json::from_str::<Value>(s)
                .map_err(|e| AppError::new(2, format!("Invalid data JSON: {e}")))?;
            &decoded
        }
        Some(other) => other,
    };

    let items = array
        .as_array()
        .ok_or_else(|| AppError::new(2, "data must be an array of numbers"))?;
    if items.is_empty() {
        return Ok(None);
    }
    items
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| AppError::new(2, format!("data contains a non-numeric value: {v}")))
        })
        .collect::<Result<Vec<f64>, AppError>>()
        .map(Some)
}

/// Family list from `types`: a `|`-separated string or an array of strings.
fn family_tokens(types: Option<&Value>) -> Result<Vec<String>, AppError> {
    match types {
        Some(Value::String(s)) => Ok(s.split('|').map(str::to_string).collect()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::new(2, format!("types contains a non-string: {v}")))
            })
            .collect(),
        None | Some(Value::Null) => Ok(vec![String::new()]),
        Some(other) => Err(AppError::new(
            2,
            format!("types must be a '|'-separated string, got {other}"),
        )),
    }
}
