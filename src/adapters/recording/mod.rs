//! Recording adapter that captures native calls to a cassette.

pub mod native_fs;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::{json, Value};

use crate::cassette::recorder::CassetteRecorder;
use crate::error::{IoError, IoResult, Operation};

pub use native_fs::RecordingNativeFs;

/// Serialized form of a failure: errno when the OS gave one, else kind and message.
pub(crate) fn error_json(err: &IoError) -> Value {
    json!({
        "errno": err.raw_os_error(),
        "kind": format!("{:?}", err.kind()),
        "message": err.io_error().to_string(),
    })
}

/// Record an `IoResult<T>` using the Ok/Err JSON convention.
///
/// Mirror of `replaying::replay_result`.
///
/// Convention:
/// - `Ok(v)` is serialized as `{"Ok": v}`
/// - `Err(e)` is serialized as `{"Err": {"errno": .., "kind": .., "message": ..}}`
pub(crate) fn record_result<T: Serialize>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    seq: u64,
    method: Operation,
    input: Value,
    result: &IoResult<T>,
) {
    let output_json = match result {
        Ok(v) => match serde_json::to_value(v) {
            Ok(inner) => json!({ "Ok": inner }),
            Err(e) => {
                tracing::warn!(%method, error = %e, "failed to serialize recording output");
                json!({ "Ok": Value::Null })
            }
        },
        Err(e) => json!({ "Err": error_json(e) }),
    };

    let mut guard = recorder.lock().unwrap_or_else(PoisonError::into_inner);
    guard.record_at(seq, method, input, output_json);
}
