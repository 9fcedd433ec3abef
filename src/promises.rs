//! Future-returning filesystem operations.
//!
//! [`AsyncFs`] turns each callback-style [`NativeFs`] primitive into an
//! `async fn` that resolves exactly once with the primitive's result. The
//! overloads of the primitives become separately named operations:
//!
//! | Primitive    | Operations                                                        |
//! |--------------|-------------------------------------------------------------------|
//! | `close`      | [`close`](AsyncFs::close)                                         |
//! | `open`       | [`open`](AsyncFs::open), [`open_with_mode`](AsyncFs::open_with_mode) |
//! | `read_file`  | [`read_file`](AsyncFs::read_file), [`read_file_text`](AsyncFs::read_file_text), [`read_file_with`](AsyncFs::read_file_with), [`read_file_text_with`](AsyncFs::read_file_text_with) |
//! | `rename`     | [`rename`](AsyncFs::rename)                                       |
//! | `stat`       | [`stat`](AsyncFs::stat)                                           |
//! | `write`      | [`write`](AsyncFs::write), [`write_range`](AsyncFs::write_range), [`write_str`](AsyncFs::write_str) |
//! | `write_file` | [`write_file`](AsyncFs::write_file), [`write_file_with`](AsyncFs::write_file_with) |
//!
//! # Usage
//!
//! ```rust,no_run
//! use fspromise::{AsyncFs, Encoding, OpenFlags};
//!
//! async fn example() -> fspromise::IoResult<()> {
//!     let fs = AsyncFs::live();
//!
//!     let fd = fs.open("greeting.txt", OpenFlags::WriteRead).await?;
//!     fs.write_str(fd, "hello", Some(0), Encoding::Utf8).await?;
//!     fs.close(fd).await?;
//!
//!     let text = fs.read_file_text("greeting.txt", Encoding::Utf8).await?;
//!     assert_eq!(text, "hello");
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::adapters::live::LiveNativeFs;
use crate::encoding::Encoding;
use crate::error::{IoError, IoResult, Operation, Target};
use crate::flags::{OpenFlags, DEFAULT_MODE};
use crate::options::{ReadFileOptions, WriteFileOptions, WriteRange};
use crate::ports::{Completion, Fd, FileContents, FileRef, NativeFs, Payload, WriteRequest};
use crate::stat::FileStat;

/// Asynchronous facade over a [`NativeFs`] implementation.
///
/// Holds no state of its own; cloning shares the same collaborator.
#[derive(Clone)]
pub struct AsyncFs {
    native: Arc<dyn NativeFs>,
}

impl std::fmt::Debug for AsyncFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFs").finish_non_exhaustive()
    }
}

impl AsyncFs {
    /// Wraps the given primitives.
    pub fn new(native: impl NativeFs + 'static) -> Self {
        Self { native: Arc::new(native) }
    }

    /// Wraps an already shared implementation.
    #[must_use]
    pub fn from_arc(native: Arc<dyn NativeFs>) -> Self {
        Self { native }
    }

    /// Adapter over the host filesystem.
    #[must_use]
    pub fn live() -> Self {
        Self::new(LiveNativeFs::new())
    }

    /// Invokes a primitive and waits for its single completion.
    async fn settle<T, F>(&self, operation: Operation, target: Target, invoke: F) -> IoResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn NativeFs, Completion<T>),
    {
        let (tx, rx) = oneshot::channel();
        invoke(
            self.native.as_ref(),
            Box::new(move |result| {
                // receiver gone means the caller stopped waiting
                let _ = tx.send(result);
            }),
        );
        let result = match rx.await {
            Ok(result) => result,
            Err(_) => Err(IoError::abandoned(operation, target)),
        };
        if let Err(err) = &result {
            tracing::debug!(%operation, error = %err, "filesystem operation failed");
        }
        result
    }

    /// Closes `fd`.
    ///
    /// # Errors
    ///
    /// Fails if `fd` is not open (never opened, or already closed).
    pub async fn close(&self, fd: Fd) -> IoResult<()> {
        tracing::debug!(%fd, "close");
        self.settle(Operation::Close, Target::Fd(fd), |native, done| native.close(fd, done)).await
    }

    /// Opens `path` with `flags`, creating files with mode `0o666`.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing for `r`/`r+`/`rs+`, exists for an
    /// exclusive (`x`) flag, or access is denied.
    pub async fn open(&self, path: impl AsRef<Path>, flags: OpenFlags) -> IoResult<Fd> {
        self.open_with_mode(path, flags, DEFAULT_MODE).await
    }

    /// Opens `path` with `flags`; `mode` applies only if the file is created.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub async fn open_with_mode(
        &self,
        path: impl AsRef<Path>,
        flags: OpenFlags,
        mode: u32,
    ) -> IoResult<Fd> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), %flags, mode = format_args!("{mode:o}"), "open");
        self.settle(Operation::Open, Target::Path(path.to_path_buf()), |native, done| {
            native.open(path, flags, mode, done);
        })
        .await
    }

    /// Reads the whole file as raw bytes.
    ///
    /// # Errors
    ///
    /// Fails if the path does not resolve, the descriptor is not open, or
    /// the read fails.
    pub async fn read_file(&self, file: impl Into<FileRef>) -> IoResult<Vec<u8>> {
        let options = ReadFileOptions::default();
        Ok(self.read_contents(file.into(), options).await?.into_bytes())
    }

    /// Reads the whole file and decodes it with `encoding`.
    ///
    /// # Errors
    ///
    /// Same as [`read_file`](Self::read_file).
    pub async fn read_file_text(
        &self,
        file: impl Into<FileRef>,
        encoding: Encoding,
    ) -> IoResult<String> {
        let options = ReadFileOptions::from(encoding);
        Ok(self.read_contents(file.into(), options).await?.into_text(encoding))
    }

    /// Reads the whole file with an options record.
    ///
    /// Returns text when `options.encoding` is set and bytes otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`read_file`](Self::read_file).
    pub async fn read_file_with(
        &self,
        file: impl Into<FileRef>,
        options: impl Into<ReadFileOptions>,
    ) -> IoResult<FileContents> {
        self.read_contents(file.into(), options.into()).await
    }

    /// Reads the whole file as text, given both a shorthand encoding and options.
    ///
    /// An encoding set in `options` takes precedence over `encoding`.
    ///
    /// # Errors
    ///
    /// Same as [`read_file`](Self::read_file).
    pub async fn read_file_text_with(
        &self,
        file: impl Into<FileRef>,
        encoding: Encoding,
        options: ReadFileOptions,
    ) -> IoResult<String> {
        let encoding = options.resolve_encoding(encoding);
        let options = options.encoding(encoding);
        Ok(self.read_contents(file.into(), options).await?.into_text(encoding))
    }

    async fn read_contents(
        &self,
        file: FileRef,
        options: ReadFileOptions,
    ) -> IoResult<FileContents> {
        tracing::debug!(?file, encoding = ?options.encoding, flag = %options.flag, "read_file");
        let target = target_of(&file);
        self.settle(Operation::ReadFile, target, |native, done| {
            native.read_file(&file, &options, done);
        })
        .await
    }

    /// Renames `from` to `to`.
    ///
    /// # Errors
    ///
    /// Fails if `from` is missing or `to` cannot be written.
    pub async fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> IoResult<()> {
        let (from, to) = (from.as_ref(), to.as_ref());
        tracing::debug!(from = %from.display(), to = %to.display(), "rename");
        let target = Target::Rename { from: from.to_path_buf(), to: to.to_path_buf() };
        self.settle(Operation::Rename, target, |native, done| native.rename(from, to, done)).await
    }

    /// Returns the status of `path`.
    ///
    /// # Errors
    ///
    /// Fails if `path` does not resolve.
    pub async fn stat(&self, path: impl AsRef<Path>) -> IoResult<FileStat> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "stat");
        self.settle(Operation::Stat, Target::Path(path.to_path_buf()), |native, done| {
            native.stat(path, done);
        })
        .await
    }

    /// Writes the whole buffer at the current position.
    ///
    /// Returns the number of bytes written, which may be less than
    /// `data.len()`.
    ///
    /// # Errors
    ///
    /// Fails if `fd` is not open for writing.
    pub async fn write(&self, fd: Fd, data: impl Into<Vec<u8>>) -> IoResult<usize> {
        self.write_range(fd, data, WriteRange::default()).await
    }

    /// Writes `range.length` bytes of `data` from `range.offset`, at
    /// `range.position` (the current position when `None`).
    ///
    /// # Errors
    ///
    /// Fails if `fd` is not open for writing or the range lies outside `data`.
    pub async fn write_range(
        &self,
        fd: Fd,
        data: impl Into<Vec<u8>>,
        range: WriteRange,
    ) -> IoResult<usize> {
        let request = WriteRequest::Bytes {
            data: data.into(),
            offset: range.offset,
            length: range.length,
            position: range.position,
        };
        self.write_request(fd, request).await
    }

    /// Writes `text` encoded with `encoding` at `position` (the current
    /// position when `None`).
    ///
    /// # Errors
    ///
    /// Fails if `fd` is not open for writing.
    pub async fn write_str(
        &self,
        fd: Fd,
        text: impl Into<String>,
        position: Option<u64>,
        encoding: Encoding,
    ) -> IoResult<usize> {
        let request = WriteRequest::Text { text: text.into(), position, encoding };
        self.write_request(fd, request).await
    }

    async fn write_request(&self, fd: Fd, request: WriteRequest) -> IoResult<usize> {
        tracing::debug!(%fd, position = ?request.position(), "write");
        self.settle(Operation::Write, Target::Fd(fd), |native, done| {
            native.write(fd, request, done);
        })
        .await
    }

    /// Replaces the contents of `file` with `data`, using default options
    /// (`utf8`, mode `0o666`, flag `w`).
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or written.
    pub async fn write_file(
        &self,
        file: impl Into<FileRef>,
        data: impl Into<Payload>,
    ) -> IoResult<()> {
        self.write_file_with(file, data, WriteFileOptions::default()).await
    }

    /// Replaces the contents of `file` with `data`.
    ///
    /// `options` may be a full [`WriteFileOptions`] record, a bare
    /// [`Encoding`], or an [`OpenFlags`]. The encoding is ignored for byte
    /// payloads.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or written.
    pub async fn write_file_with(
        &self,
        file: impl Into<FileRef>,
        data: impl Into<Payload>,
        options: impl Into<WriteFileOptions>,
    ) -> IoResult<()> {
        let (file, data, options) = (file.into(), data.into(), options.into());
        tracing::debug!(?file, encoding = %options.encoding, flag = %options.flag, "write_file");
        let target = target_of(&file);
        self.settle(Operation::WriteFile, target, |native, done| {
            native.write_file(&file, data, &options, done);
        })
        .await
    }
}

fn target_of(file: &FileRef) -> Target {
    match file {
        FileRef::Path(path) => Target::Path(path.clone()),
        FileRef::Fd(fd) => Target::Fd(*fd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Primitives that never complete, or complete with canned values.
    #[derive(Default)]
    struct Scripted {
        drop_completions: bool,
        seen: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn finish<T>(&self, call: String, done: Completion<T>, value: IoResult<T>) {
            self.seen.lock().unwrap().push(call);
            if !self.drop_completions {
                done(value);
            }
        }
    }

    impl NativeFs for Scripted {
        fn close(&self, fd: Fd, done: Completion<()>) {
            self.finish(format!("close {fd}"), done, Ok(()));
        }
        fn open(&self, path: &Path, flags: OpenFlags, mode: u32, done: Completion<Fd>) {
            let call = format!("open {} {flags} {mode:o}", path.display());
            self.finish(call, done, Ok(Fd::from_raw(42)));
        }
        fn read_file(
            &self,
            file: &FileRef,
            options: &ReadFileOptions,
            done: Completion<FileContents>,
        ) {
            let call = format!("read_file {file:?} {:?} {}", options.encoding, options.flag);
            self.finish(call, done, Ok(FileContents::decode(b"caf\xe9".to_vec(), options.encoding)));
        }
        fn rename(&self, from: &Path, to: &Path, done: Completion<()>) {
            self.finish(format!("rename {} {}", from.display(), to.display()), done, Ok(()));
        }
        fn stat(&self, path: &Path, done: Completion<FileStat>) {
            let err = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
            self.finish(
                format!("stat {}", path.display()),
                done,
                Err(IoError::at_path(Operation::Stat, path, err)),
            );
        }
        fn write(&self, fd: Fd, request: WriteRequest, done: Completion<usize>) {
            self.finish(format!("write {fd} {request:?}"), done, Ok(1));
        }
        fn write_file(
            &self,
            file: &FileRef,
            data: Payload,
            options: &WriteFileOptions,
            done: Completion<()>,
        ) {
            let call = format!("write_file {file:?} {data:?} {}", options.flag);
            self.finish(call, done, Ok(()));
        }
    }

    fn scripted() -> (AsyncFs, Arc<Scripted>) {
        let native = Arc::new(Scripted::default());
        (AsyncFs::from_arc(native.clone()), native)
    }

    #[tokio::test]
    async fn open_uses_default_mode() {
        let (fs, native) = scripted();
        let fd = fs.open("/data/a", OpenFlags::WriteExclusive).await.unwrap();
        assert_eq!(fd, Fd::from_raw(42));
        assert_eq!(native.seen.lock().unwrap()[0], "open /data/a wx 666");
    }

    #[tokio::test]
    async fn native_failure_passes_through_unchanged() {
        let (fs, _native) = scripted();
        let err = fs.stat("/missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.path(), Some(Path::new("/missing")));
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test]
    async fn dropped_completion_is_reported_as_failure() {
        let native = Scripted { drop_completions: true, ..Scripted::default() };
        let fs = AsyncFs::new(native);
        let err = fs.close(Fd::from_raw(3)).await.unwrap_err();
        assert_eq!(err.operation(), Operation::Close);
        assert_eq!(err.fd(), Some(Fd::from_raw(3)));
        assert!(err.to_string().contains("completion dropped"));
    }

    #[tokio::test]
    async fn read_file_requests_bytes_and_text_by_shape() {
        let (fs, native) = scripted();
        assert_eq!(fs.read_file("/f").await.unwrap(), b"caf\xe9");
        assert_eq!(fs.read_file_text("/f", Encoding::Latin1).await.unwrap(), "caf\u{e9}");

        let seen = native.seen.lock().unwrap();
        assert!(seen[0].ends_with("None r"), "{}", seen[0]);
        assert!(seen[1].ends_with("Some(Latin1) r"), "{}", seen[1]);
    }

    #[tokio::test]
    async fn read_file_with_options_selects_variant() {
        let (fs, _native) = scripted();
        let bytes = fs.read_file_with("/f", OpenFlags::ReadWrite).await.unwrap();
        assert_eq!(bytes, FileContents::Bytes(b"caf\xe9".to_vec()));
        let text = fs.read_file_with("/f", Encoding::Latin1).await.unwrap();
        assert_eq!(text, FileContents::Text("caf\u{e9}".into()));
    }

    #[tokio::test]
    async fn options_encoding_wins_over_shorthand() {
        let (fs, native) = scripted();
        let options = ReadFileOptions::default().encoding(Encoding::Latin1);
        let text = fs.read_file_text_with("/f", Encoding::Utf8, options).await.unwrap();
        assert_eq!(text, "caf\u{e9}");
        assert!(native.seen.lock().unwrap()[0].contains("Some(Latin1)"));
    }

    #[tokio::test]
    async fn write_shapes_build_distinct_requests() {
        let (fs, native) = scripted();
        fs.write(Fd::from_raw(5), b"abc".to_vec()).await.unwrap();
        fs.write_str(Fd::from_raw(5), "xyz", Some(7), Encoding::Hex).await.unwrap();

        let seen = native.seen.lock().unwrap();
        assert!(seen[0].starts_with("write 5 Bytes"));
        assert!(seen[0].contains("offset: 0, length: None, position: None"));
        assert!(seen[1].starts_with("write 5 Text"));
        assert!(seen[1].contains("position: Some(7)"));
    }

    #[tokio::test]
    async fn write_file_accepts_bare_encoding_or_flag() {
        let (fs, native) = scripted();
        fs.write_file(PathBuf::from("/out"), "text").await.unwrap();
        fs.write_file_with("/out", b"raw".to_vec(), OpenFlags::Append).await.unwrap();
        fs.write_file_with(Fd::from_raw(8), "t", Encoding::Ascii).await.unwrap();

        let seen = native.seen.lock().unwrap();
        assert!(seen[0].ends_with("Text(\"text\") w"), "{}", seen[0]);
        assert!(seen[1].ends_with(" a"), "{}", seen[1]);
        assert!(seen[2].starts_with("write_file Fd(Fd(8))"), "{}", seen[2]);
    }
}
