//! Live native filesystem adapter using `std::fs` on a blocking pool.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::descriptors::DescriptorTable;
use crate::error::{IoError, IoResult, Operation, Target};
use crate::flags::OpenFlags;
use crate::options::{ReadFileOptions, WriteFileOptions};
use crate::ports::{Completion, Fd, FileContents, FileRef, NativeFs, Payload, WriteRequest};
use crate::stat::FileStat;

/// Host filesystem primitives backed by real disk I/O.
///
/// Each primitive runs on tokio's blocking pool when called inside a runtime,
/// otherwise on its own thread, and reports through its completion.
#[derive(Debug, Default, Clone)]
pub struct LiveNativeFs {
    descriptors: Arc<DescriptorTable>,
}

impl LiveNativeFs {
    /// Creates an adapter with an empty descriptor table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of descriptors opened through this adapter and not yet closed.
    #[must_use]
    pub fn open_descriptors(&self) -> usize {
        self.descriptors.len()
    }
}

/// Runs `job` off the caller's thread and hands its result to `done`.
fn dispatch<T, F>(operation: Operation, job: F, done: Completion<T>)
where
    T: Send + 'static,
    F: FnOnce() -> IoResult<T> + Send + 'static,
{
    tracing::trace!(%operation, "dispatching native primitive");
    let task = move || done(job());
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            // detached; the completion carries the result
            drop(handle.spawn_blocking(task));
        }
        Err(_) => {
            std::thread::spawn(task);
        }
    }
}

fn target_of(file: &FileRef) -> Target {
    match file {
        FileRef::Path(path) => Target::Path(path.clone()),
        FileRef::Fd(fd) => Target::Fd(*fd),
    }
}

fn open_path(path: &Path, flags: OpenFlags, mode: u32) -> io::Result<File> {
    flags.to_open_options(mode).open(path)
}

/// Resolves the slice of `data` a buffer write covers.
fn write_window(data: &[u8], offset: usize, length: Option<usize>) -> io::Result<&[u8]> {
    if offset > data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("offset {offset} is out of range for a buffer of {} bytes", data.len()),
        ));
    }
    let length = length.unwrap_or(data.len() - offset);
    let end = offset.checked_add(length).filter(|end| *end <= data.len()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "length {length} from offset {offset} extends beyond a buffer of {} bytes",
                data.len()
            ),
        )
    })?;
    Ok(&data[offset..end])
}

/// One write call: positional when `position` is set (cursor untouched), else at the cursor.
fn write_once(file: &File, bytes: &[u8], position: Option<u64>) -> io::Result<usize> {
    match position {
        None => {
            let mut file = file;
            file.write(bytes)
        }
        #[cfg(unix)]
        Some(position) => {
            use std::os::unix::fs::FileExt;
            file.write_at(bytes, position)
        }
        #[cfg(not(unix))]
        Some(position) => {
            use std::io::{Seek, SeekFrom};
            // match pwrite: the shared cursor ends where it started
            let mut file = file;
            let cursor = file.stream_position()?;
            file.seek(SeekFrom::Start(position))?;
            let written = file.write(bytes);
            file.seek(SeekFrom::Start(cursor))?;
            written
        }
    }
}

impl NativeFs for LiveNativeFs {
    fn close(&self, fd: Fd, done: Completion<()>) {
        let descriptors = Arc::clone(&self.descriptors);
        dispatch(
            Operation::Close,
            move || {
                let open = descriptors.remove(fd)?;
                tracing::trace!(%fd, flags = %open.flags, "closed descriptor");
                Ok(())
            },
            done,
        );
    }

    fn open(&self, path: &Path, flags: OpenFlags, mode: u32, done: Completion<Fd>) {
        let descriptors = Arc::clone(&self.descriptors);
        let path = path.to_path_buf();
        dispatch(
            Operation::Open,
            move || {
                let file = open_path(&path, flags, mode)
                    .map_err(|e| IoError::at_path(Operation::Open, &path, e))?;
                Ok(descriptors.insert(file, flags))
            },
            done,
        );
    }

    fn read_file(&self, file: &FileRef, options: &ReadFileOptions, done: Completion<FileContents>) {
        let descriptors = Arc::clone(&self.descriptors);
        let file = file.clone();
        let options = *options;
        dispatch(
            Operation::ReadFile,
            move || {
                let mut bytes = Vec::new();
                let read = match &file {
                    FileRef::Path(path) => open_path(path, options.flag, crate::flags::DEFAULT_MODE)
                        .and_then(|mut f| f.read_to_end(&mut bytes)),
                    FileRef::Fd(fd) => {
                        let open = descriptors.get(*fd, Operation::ReadFile)?;
                        let mut handle = &open.file;
                        handle.read_to_end(&mut bytes)
                    }
                };
                read.map_err(|e| IoError::new(Operation::ReadFile, target_of(&file), e))?;
                Ok(FileContents::decode(bytes, options.encoding))
            },
            done,
        );
    }

    fn rename(&self, from: &Path, to: &Path, done: Completion<()>) {
        let from = from.to_path_buf();
        let to = to.to_path_buf();
        dispatch(
            Operation::Rename,
            move || {
                std::fs::rename(&from, &to).map_err(|e| {
                    IoError::new(Operation::Rename, Target::Rename { from, to }, e)
                })
            },
            done,
        );
    }

    fn stat(&self, path: &Path, done: Completion<FileStat>) {
        let path: PathBuf = path.to_path_buf();
        dispatch(
            Operation::Stat,
            move || {
                let metadata = std::fs::metadata(&path)
                    .map_err(|e| IoError::at_path(Operation::Stat, &path, e))?;
                Ok(FileStat::from(&metadata))
            },
            done,
        );
    }

    fn write(&self, fd: Fd, request: WriteRequest, done: Completion<usize>) {
        let descriptors = Arc::clone(&self.descriptors);
        dispatch(
            Operation::Write,
            move || {
                let open = descriptors.get(fd, Operation::Write)?;
                let position = request.position();
                let written = match request {
                    WriteRequest::Bytes { data, offset, length, .. } => {
                        write_window(&data, offset, length)
                            .and_then(|window| write_once(&open.file, window, position))
                    }
                    WriteRequest::Text { text, encoding, .. } => {
                        write_once(&open.file, &encoding.encode(&text), position)
                    }
                };
                written.map_err(|e| IoError::at_fd(Operation::Write, fd, e))
            },
            done,
        );
    }

    fn write_file(
        &self,
        file: &FileRef,
        data: Payload,
        options: &WriteFileOptions,
        done: Completion<()>,
    ) {
        let descriptors = Arc::clone(&self.descriptors);
        let file = file.clone();
        let options = *options;
        dispatch(
            Operation::WriteFile,
            move || {
                let bytes = data.into_bytes(options.encoding);
                let written = match &file {
                    FileRef::Path(path) => open_path(path, options.flag, options.mode)
                        .and_then(|mut f| f.write_all(&bytes)),
                    FileRef::Fd(fd) => {
                        let open = descriptors.get(*fd, Operation::WriteFile)?;
                        let mut handle = &open.file;
                        handle.write_all(&bytes)
                    }
                };
                written.map_err(|e| IoError::new(Operation::WriteFile, target_of(&file), e))
            },
            done,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    /// Calls a primitive outside any runtime and waits for its completion.
    fn call<T: Send + 'static>(invoke: impl FnOnce(Completion<T>)) -> IoResult<T> {
        let (tx, rx) = mpsc::channel();
        invoke(Box::new(move |result| {
            let _ = tx.send(result);
        }));
        rx.recv_timeout(Duration::from_secs(10)).expect("completion was not invoked")
    }

    #[test]
    fn completes_on_a_plain_thread_without_a_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        let fs = LiveNativeFs::new();

        let fd = call(|done| fs.open(&path, OpenFlags::Write, 0o644, done)).unwrap();
        assert_eq!(fs.open_descriptors(), 1);
        call(|done| fs.close(fd, done)).unwrap();
        assert_eq!(fs.open_descriptors(), 0);
        assert!(path.exists());
    }

    #[test]
    fn rejects_offset_past_the_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("range.bin");
        let fs = LiveNativeFs::new();
        let fd = call(|done| fs.open(&path, OpenFlags::Write, 0o644, done)).unwrap();

        let request =
            WriteRequest::Bytes { data: vec![1, 2, 3], offset: 4, length: None, position: None };
        let err = call(|done| fs.write(fd, request, done)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(err.fd(), Some(fd));

        let request =
            WriteRequest::Bytes { data: vec![1, 2, 3], offset: 1, length: Some(3), position: None };
        assert!(call(|done| fs.write(fd, request, done)).is_err());
    }

    #[test]
    fn writes_only_the_requested_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.bin");
        let fs = LiveNativeFs::new();
        let fd = call(|done| fs.open(&path, OpenFlags::Write, 0o644, done)).unwrap();

        let request = WriteRequest::Bytes {
            data: b"abcdef".to_vec(),
            offset: 2,
            length: Some(3),
            position: None,
        };
        assert_eq!(call(|done| fs.write(fd, request, done)).unwrap(), 3);
        call(|done| fs.close(fd, done)).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"cde");
    }

    #[test]
    fn read_file_by_descriptor_starts_at_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor.txt");
        std::fs::write(&path, b"0123456789").unwrap();
        let fs = LiveNativeFs::new();
        let fd = call(|done| fs.open(&path, OpenFlags::Read, 0o644, done)).unwrap();

        let first = call(|done| {
            fs.read_file(&FileRef::Fd(fd), &ReadFileOptions::default(), done);
        })
        .unwrap();
        assert_eq!(first.into_bytes(), b"0123456789");

        // cursor is now at the end
        let second = call(|done| {
            fs.read_file(&FileRef::Fd(fd), &ReadFileOptions::default(), done);
        })
        .unwrap();
        assert_eq!(second.into_bytes(), b"");
    }

    #[test]
    fn write_file_honours_append_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let fs = LiveNativeFs::new();
        let file = FileRef::Path(path.clone());

        for line in ["one\n", "two\n"] {
            let options = WriteFileOptions::default().flag(OpenFlags::Append);
            call(|done| fs.write_file(&file, Payload::from(line), &options, done)).unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[cfg(unix)]
    #[test]
    fn creation_mode_applies_to_new_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private.txt");
        let fs = LiveNativeFs::new();
        let options = WriteFileOptions::default().mode(0o600);
        call(|done| fs.write_file(&FileRef::Path(path.clone()), "x".into(), &options, done))
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
