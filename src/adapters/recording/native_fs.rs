//! Recording adapter for the `NativeFs` port.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::Operation;
use crate::flags::OpenFlags;
use crate::options::{ReadFileOptions, WriteFileOptions};
use crate::ports::{Completion, Fd, FileContents, FileRef, NativeFs, Payload, WriteRequest};
use crate::stat::FileStat;

/// Records every completed native call while delegating to an inner implementation.
pub struct RecordingNativeFs {
    inner: Box<dyn NativeFs>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingNativeFs {
    /// Creates a new recording adapter wrapping the given implementation.
    pub fn new(inner: Box<dyn NativeFs>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }

    /// Wraps `done` so the result is recorded before it is delivered.
    ///
    /// The interaction's slot is reserved at call time; the cassette keeps
    /// call order even when completions fire out of order.
    fn recorded<T, I>(&self, method: Operation, input: &I, done: Completion<T>) -> Completion<T>
    where
        T: Serialize + Send + 'static,
        I: Serialize,
    {
        let input = serde_json::to_value(input).unwrap_or_else(|e| {
            tracing::warn!(%method, error = %e, "failed to serialize recording input");
            Value::Null
        });
        let seq = self.recorder.lock().unwrap_or_else(PoisonError::into_inner).reserve();
        let recorder = Arc::clone(&self.recorder);
        Box::new(move |result| {
            record_result(&recorder, seq, method, input, &result);
            // release before delivering so the caller can reclaim the recorder
            drop(recorder);
            done(result);
        })
    }
}

#[derive(Serialize)]
struct FdInput {
    fd: Fd,
}

#[derive(Serialize)]
struct OpenInput<'a> {
    path: &'a Path,
    flags: &'static str,
    mode: u32,
}

#[derive(Serialize)]
struct ReadFileInput<'a> {
    file: &'a FileRef,
    options: &'a ReadFileOptions,
}

#[derive(Serialize)]
struct RenameInput<'a> {
    from: &'a Path,
    to: &'a Path,
}

#[derive(Serialize)]
struct PathInput<'a> {
    path: &'a Path,
}

#[derive(Serialize)]
struct WriteInput<'a> {
    fd: Fd,
    request: &'a WriteRequest,
}

#[derive(Serialize)]
struct WriteFileInput<'a> {
    file: &'a FileRef,
    data: &'a Payload,
    options: &'a WriteFileOptions,
}

impl NativeFs for RecordingNativeFs {
    fn close(&self, fd: Fd, done: Completion<()>) {
        let done = self.recorded(Operation::Close, &FdInput { fd }, done);
        self.inner.close(fd, done);
    }

    fn open(&self, path: &Path, flags: OpenFlags, mode: u32, done: Completion<Fd>) {
        let input = OpenInput { path, flags: flags.as_str(), mode };
        let done = self.recorded(Operation::Open, &input, done);
        self.inner.open(path, flags, mode, done);
    }

    fn read_file(&self, file: &FileRef, options: &ReadFileOptions, done: Completion<FileContents>) {
        let done = self.recorded(Operation::ReadFile, &ReadFileInput { file, options }, done);
        self.inner.read_file(file, options, done);
    }

    fn rename(&self, from: &Path, to: &Path, done: Completion<()>) {
        let done = self.recorded(Operation::Rename, &RenameInput { from, to }, done);
        self.inner.rename(from, to, done);
    }

    fn stat(&self, path: &Path, done: Completion<FileStat>) {
        let done = self.recorded(Operation::Stat, &PathInput { path }, done);
        self.inner.stat(path, done);
    }

    fn write(&self, fd: Fd, request: WriteRequest, done: Completion<usize>) {
        let done = self.recorded(Operation::Write, &WriteInput { fd, request: &request }, done);
        self.inner.write(fd, request, done);
    }

    fn write_file(
        &self,
        file: &FileRef,
        data: Payload,
        options: &WriteFileOptions,
        done: Completion<()>,
    ) {
        let input = WriteFileInput { file, data: &data, options };
        let done = self.recorded(Operation::WriteFile, &input, done);
        self.inner.write_file(file, data, options, done);
    }
}
