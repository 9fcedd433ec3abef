//! Wiring of the adapter stack chosen by configuration.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::adapters::live::LiveNativeFs;
use crate::adapters::recording::RecordingNativeFs;
use crate::adapters::replaying::ReplayingNativeFs;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::promises::AsyncFs;

/// An [`AsyncFs`] bound to live, recording, or replaying primitives.
///
/// A recording context writes its cassette when dropped, or earlier through
/// [`finish`](Self::finish).
pub struct FsContext {
    fs: AsyncFs,
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl FsContext {
    /// Primitives that act on the host filesystem.
    #[must_use]
    pub fn live() -> Self {
        Self { fs: AsyncFs::live(), recorder: None }
    }

    /// Live primitives whose calls are recorded into the cassette at `path`.
    #[must_use]
    pub fn recording(path: &Path) -> Self {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, "fspromise-session")));
        let native = RecordingNativeFs::new(Box::new(LiveNativeFs::new()), Arc::clone(&recorder));
        Self { fs: AsyncFs::new(native), recorder: Some(recorder) }
    }

    /// Primitives served from the cassette at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let replayer = CassetteReplayer::load(path)?;
        Ok(Self { fs: AsyncFs::new(ReplayingNativeFs::new(replayer)), recorder: None })
    }

    /// Builds the context `config` asks for.
    ///
    /// # Errors
    ///
    /// Returns an error if a replay cassette cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        match (&config.record, &config.replay) {
            (Some(_), Some(_)) => Err("cannot record and replay at the same time".to_string()),
            (Some(path), None) => Ok(Self::recording(path)),
            (None, Some(path)) => Self::replaying(path),
            (None, None) => Ok(Self::live()),
        }
    }

    /// The filesystem operations.
    #[must_use]
    pub fn fs(&self) -> &AsyncFs {
        &self.fs
    }

    /// Writes the cassette being recorded, if any.
    ///
    /// Returns the cassette path. Calls completing after this are not recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be written.
    pub fn finish(mut self) -> Result<Option<PathBuf>, String> {
        self.write_cassette()
    }

    fn write_cassette(&mut self) -> Result<Option<PathBuf>, String> {
        let Some(recorder) = self.recorder.take() else {
            return Ok(None);
        };
        let recorder = recorder.lock().unwrap_or_else(PoisonError::into_inner).take();
        let path = recorder.path().to_path_buf();
        recorder
            .finish()
            .map(Some)
            .map_err(|e| format!("failed to write cassette {}: {e}", path.display()))
    }
}

impl Drop for FsContext {
    fn drop(&mut self) {
        if let Err(e) = self.write_cassette() {
            tracing::warn!(error = %e, "recording lost");
        }
    }
}
