//! Cassette format for recording and replaying native filesystem calls.

pub mod format;
pub mod recorder;
pub mod replayer;
