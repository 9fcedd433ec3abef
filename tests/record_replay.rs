//! Record-replay round-trip integration test.
//!
//! 1. Run a workflow against the disk through a recording context.
//! 2. Delete the scratch directory.
//! 3. Replay the cassette and assert identical outputs, twice.

use std::path::Path;
use std::sync::{Arc, Mutex};

use fspromise::adapters::recording::RecordingNativeFs;
use fspromise::adapters::replaying::ReplayingNativeFs;
use fspromise::cassette::format::Cassette;
use fspromise::cassette::recorder::CassetteRecorder;
use fspromise::cassette::replayer::CassetteReplayer;
use fspromise::context::FsContext;
use fspromise::ports::{Completion, WriteRequest};
use fspromise::{
    AsyncFs, Encoding, Fd, FileContents, FileRef, FileStat, NativeFs, OpenFlags, Operation,
    Payload, ReadFileOptions, WriteFileOptions,
};

#[derive(Debug, PartialEq)]
struct Outputs {
    fd: i32,
    written: usize,
    text: String,
    stat: FileStat,
    missing: (Option<&'static str>, String),
}

async fn workflow(fs: &AsyncFs, root: &Path) -> Outputs {
    let path = root.join("notes.txt");
    let moved = root.join("moved.txt");

    fs.write_file(&path, "draft").await.unwrap();
    let fd = fs.open(&path, OpenFlags::ReadWrite).await.unwrap();
    let written = fs.write_str(fd, "final", Some(0), Encoding::Utf8).await.unwrap();
    fs.close(fd).await.unwrap();
    let text = fs.read_file_text(&path, Encoding::Utf8).await.unwrap();
    fs.rename(&path, &moved).await.unwrap();
    let stat = fs.stat(&moved).await.unwrap();
    let err = fs.stat(&path).await.unwrap_err();

    Outputs { fd: fd.as_raw(), written, text, stat, missing: (err.code(), err.to_string()) }
}

#[tokio::test]
async fn record_then_replay_produces_identical_outputs() {
    let cassette_dir = tempfile::tempdir().unwrap();
    let cassette_path = cassette_dir.path().join("roundtrip.cassette.yaml");

    // --- Phase 1: record against the disk ---
    let scratch = tempfile::tempdir().unwrap();
    let root = scratch.path().to_path_buf();
    let recording = FsContext::recording(&cassette_path);
    let recorded = workflow(recording.fs(), &root).await;
    assert_eq!(recording.finish().unwrap(), Some(cassette_path.clone()));

    assert_eq!(recorded.text, "final");
    assert_eq!(recorded.written, 5);
    assert_eq!(recorded.stat.size, 5);

    let cassette =
        Cassette::from_yaml(&std::fs::read_to_string(&cassette_path).unwrap()).unwrap();
    let methods: Vec<Operation> = cassette.interactions.iter().map(|i| i.method).collect();
    assert_eq!(
        methods,
        [
            Operation::WriteFile,
            Operation::Open,
            Operation::Write,
            Operation::Close,
            Operation::ReadFile,
            Operation::Rename,
            Operation::Stat,
            Operation::Stat,
        ]
    );

    // --- Phase 2: replay with the files gone ---
    drop(scratch);
    assert!(!root.exists());

    let replaying = FsContext::replaying(&cassette_path).unwrap();
    assert_eq!(workflow(replaying.fs(), &root).await, recorded);

    // --- Phase 3: a fresh replay is deterministic ---
    let again = FsContext::replaying(&cassette_path).unwrap();
    assert_eq!(workflow(again.fs(), &root).await, recorded);
    assert!(!root.exists());
}

#[tokio::test]
#[should_panic(expected = "Cassette exhausted")]
async fn replay_past_the_recording_panics() {
    let dir = tempfile::tempdir().unwrap();
    let cassette_path = dir.path().join("empty.cassette.yaml");
    FsContext::recording(&cassette_path).finish().unwrap();

    let ctx = FsContext::replaying(&cassette_path).unwrap();
    let _ = ctx.fs().stat("/anything").await;
}

/// Opens complete out of call order: `first` is held back until `second`
/// has completed.
#[derive(Default)]
struct LateFirstOpen {
    held: Mutex<Option<Completion<Fd>>>,
}

impl NativeFs for LateFirstOpen {
    fn close(&self, _fd: Fd, _done: Completion<()>) {
        unimplemented!()
    }
    fn open(&self, path: &Path, _flags: OpenFlags, _mode: u32, done: Completion<Fd>) {
        if path == Path::new("first") {
            *self.held.lock().unwrap() = Some(done);
        } else {
            done(Ok(Fd::from_raw(200)));
            let first = self.held.lock().unwrap().take();
            if let Some(first) = first {
                first(Ok(Fd::from_raw(100)));
            }
        }
    }
    fn read_file(
        &self,
        _file: &FileRef,
        _options: &ReadFileOptions,
        _done: Completion<FileContents>,
    ) {
        unimplemented!()
    }
    fn rename(&self, _from: &Path, _to: &Path, _done: Completion<()>) {
        unimplemented!()
    }
    fn stat(&self, _path: &Path, _done: Completion<FileStat>) {
        unimplemented!()
    }
    fn write(&self, _fd: Fd, _request: WriteRequest, _done: Completion<usize>) {
        unimplemented!()
    }
    fn write_file(
        &self,
        _file: &FileRef,
        _data: Payload,
        _options: &WriteFileOptions,
        _done: Completion<()>,
    ) {
        unimplemented!()
    }
}

async fn open_both(fs: &AsyncFs) -> (i32, i32) {
    let (first, second) =
        tokio::join!(fs.open("first", OpenFlags::Read), fs.open("second", OpenFlags::Read));
    (first.unwrap().as_raw(), second.unwrap().as_raw())
}

#[tokio::test]
async fn out_of_order_completions_replay_to_their_own_calls() {
    let dir = tempfile::tempdir().unwrap();
    let cassette_path = dir.path().join("late.cassette.yaml");

    let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&cassette_path, "late")));
    let native = RecordingNativeFs::new(Box::new(LateFirstOpen::default()), Arc::clone(&recorder));
    let recording = AsyncFs::new(native);
    let recorded = open_both(&recording).await;
    assert_eq!(recorded, (100, 200));
    drop(recording);

    let recorder = Arc::try_unwrap(recorder).ok().unwrap().into_inner().unwrap();
    recorder.finish().unwrap();

    let replaying =
        AsyncFs::new(ReplayingNativeFs::new(CassetteReplayer::load(&cassette_path).unwrap()));
    assert_eq!(open_both(&replaying).await, recorded);
}
