//! Recording adapters: delegate to a live port and log every call.

pub mod filesystem;
pub mod runner;

use std::sync::PoisonError;

use serde::Serialize;
use serde_json::{json, Value};

use crate::cassette::session::SharedRecorder;

pub use filesystem::RecordingFileSystem;
pub use runner::RecordingCommandRunner;

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| json!({ "unserializable": e.to_string() }))
}

/// Logs a call whose result is a plain value.
pub(crate) fn record_value<I, O>(recorder: &SharedRecorder, method: &str, input: &I, output: &O)
where
    I: Serialize,
    O: Serialize,
{
    let mut guard = recorder.lock().unwrap_or_else(PoisonError::into_inner);
    guard.record(method, to_json(input), to_json(output));
}

/// Logs a fallible call as `{"ok": value}` or `{"err": message}`, the shape
/// the replaying adapters decode.
pub(crate) fn record_result<I, T, E>(
    recorder: &SharedRecorder,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    I: Serialize,
    T: Serialize,
    E: std::fmt::Display,
{
    let output = match result {
        Ok(value) => json!({ "ok": to_json(value) }),
        Err(e) => json!({ "err": e.to_string() }),
    };
    let mut guard = recorder.lock().unwrap_or_else(PoisonError::into_inner);
    guard.record(method, to_json(input), output);
}
