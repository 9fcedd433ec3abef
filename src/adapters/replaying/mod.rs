//! Replaying adapter that serves recorded native calls.

pub mod native_fs;

use std::io;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{IoError, IoResult, Operation, Target};

pub use native_fs::ReplayingNativeFs;

/// Rebuilds the OS error captured by `recording::error_json`.
fn replayed_error(err: &Value) -> io::Error {
    if let Some(errno) = err.get("errno").and_then(Value::as_i64) {
        if let Ok(errno) = i32::try_from(errno) {
            return io::Error::from_raw_os_error(errno);
        }
    }
    let message = err.get("message").and_then(Value::as_str).unwrap_or("unknown error");
    let kind = match err.get("kind").and_then(Value::as_str) {
        Some("NotFound") => io::ErrorKind::NotFound,
        Some("PermissionDenied") => io::ErrorKind::PermissionDenied,
        Some("AlreadyExists") => io::ErrorKind::AlreadyExists,
        Some("InvalidInput") => io::ErrorKind::InvalidInput,
        Some("InvalidData") => io::ErrorKind::InvalidData,
        Some("Interrupted") => io::ErrorKind::Interrupted,
        Some("UnexpectedEof") => io::ErrorKind::UnexpectedEof,
        Some("WriteZero") => io::ErrorKind::WriteZero,
        _ => io::ErrorKind::Other,
    };
    io::Error::new(kind, message.to_string())
}

/// Extracts an `IoResult` from a cassette output value.
///
/// Mirror of `recording::record_result`: expects `{"Ok": <value>}` or
/// `{"Err": {...}}`. Anything else is reported as `InvalidData`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: &Value,
    method: Operation,
    target: Target,
) -> IoResult<T> {
    if let Some(err) = output.get("Err") {
        return Err(IoError::new(method, target, replayed_error(err)));
    }
    let Some(value) = output.get("Ok") else {
        let source = io::Error::new(io::ErrorKind::InvalidData, "recorded output has no Ok/Err");
        return Err(IoError::new(method, target, source));
    };
    serde_json::from_value(value.clone()).map_err(|e| {
        let source = io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed to deserialize recorded output: {e}"),
        );
        IoError::new(method, target, source)
    })
}
