//! Replaying adapter for the `NativeFs` port.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;

use super::replay_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::{Operation, Target};
use crate::flags::OpenFlags;
use crate::options::{ReadFileOptions, WriteFileOptions};
use crate::ports::{Completion, Fd, FileContents, FileRef, NativeFs, Payload, WriteRequest};
use crate::stat::FileStat;

/// Serves recorded native results without touching the disk.
///
/// Arguments are not compared against the recording; each primitive simply
/// receives the next result recorded for it.
pub struct ReplayingNativeFs {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingNativeFs {
    /// Creates a new replaying adapter from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    /// Delivers the next recorded result for `method` to `done`.
    fn replay<T: DeserializeOwned>(&self, method: Operation, target: Target, done: Completion<T>) {
        let output = {
            let mut replayer = self.replayer.lock().unwrap_or_else(PoisonError::into_inner);
            replayer.next_interaction(method).output.clone()
        };
        done(replay_result(&output, method, target));
    }
}

fn file_target(file: &FileRef) -> Target {
    match file {
        FileRef::Path(path) => Target::Path(path.clone()),
        FileRef::Fd(fd) => Target::Fd(*fd),
    }
}

impl NativeFs for ReplayingNativeFs {
    fn close(&self, fd: Fd, done: Completion<()>) {
        self.replay(Operation::Close, Target::Fd(fd), done);
    }

    fn open(&self, path: &Path, _flags: OpenFlags, _mode: u32, done: Completion<Fd>) {
        self.replay(Operation::Open, Target::Path(path.to_path_buf()), done);
    }

    fn read_file(&self, file: &FileRef, _options: &ReadFileOptions, done: Completion<FileContents>) {
        self.replay(Operation::ReadFile, file_target(file), done);
    }

    fn rename(&self, from: &Path, to: &Path, done: Completion<()>) {
        let target = Target::Rename { from: from.to_path_buf(), to: to.to_path_buf() };
        self.replay(Operation::Rename, target, done);
    }

    fn stat(&self, path: &Path, done: Completion<FileStat>) {
        self.replay(Operation::Stat, Target::Path(path.to_path_buf()), done);
    }

    fn write(&self, fd: Fd, _request: WriteRequest, done: Completion<usize>) {
        self.replay(Operation::Write, Target::Fd(fd), done);
    }

    fn write_file(
        &self,
        file: &FileRef,
        _data: Payload,
        _options: &WriteFileOptions,
        done: Completion<()>,
    ) {
        self.replay(Operation::WriteFile, file_target(file), done);
    }
}
