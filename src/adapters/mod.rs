//! Implementations of the `NativeFs` port.
//!
//! - `live`: the host filesystem
//! - `recording`: wraps another implementation and writes a cassette
//! - `replaying`: serves a cassette back without touching the disk

pub mod live;
pub mod recording;
pub mod replaying;
