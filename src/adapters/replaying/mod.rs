//! Replaying adapters: answer port calls from a cassette.

pub mod filesystem;
pub mod runner;

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;

use crate::cassette::format::{Interaction, Port};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::PortError;

pub use filesystem::ReplayingFileSystem;
pub use runner::ReplayingCommandRunner;

/// Takes the next recorded `port::method` call and checks that it was made
/// with the same arguments. Only keys present in the recording are compared.
///
/// # Panics
///
/// Panics if the cassette has no such call left, or the arguments differ;
/// either way the cassette no longer matches the code replaying it.
pub(crate) fn next_matching<I: Serialize>(
    replayer: &Mutex<CassetteReplayer>,
    port: Port,
    method: &str,
    input: &I,
) -> Value {
    let interaction = replayer
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .next_interaction(port, method);
    let actual = serde_json::to_value(input).unwrap_or(Value::Null);
    if let Some(key) = first_mismatch(&interaction, &actual) {
        panic!(
            "Cassette out of date: {port}::{method} seq={} was recorded with {key}={} but called with {key}={}",
            interaction.seq, interaction.input[key.as_str()], actual[key.as_str()],
        );
    }
    interaction.output
}

fn first_mismatch(interaction: &Interaction, actual: &Value) -> Option<String> {
    let recorded = interaction.input.as_object()?;
    recorded
        .iter()
        .find(|(key, value)| actual.get(key.as_str()) != Some(*value))
        .map(|(key, _)| key.clone())
}

/// Decodes `{"ok": value}` or `{"err": "message"}`; a bare value counts as
/// success.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: &Value,
    context: &str,
) -> Result<T, PortError> {
    if let Some(err) = output.get("err") {
        return Err(err.as_str().unwrap_or("unknown error").to_string().into());
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("{context}: failed to deserialize: {e}").into())
}
