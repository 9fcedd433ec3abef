//! Port traits defining external boundaries.
//!
//! The only boundary is the host filesystem, reached through callback-style
//! primitives. Implementations live in `src/adapters/`.

pub mod native_fs;

pub use native_fs::{Completion, Fd, FileContents, FileRef, NativeFs, Payload, WriteRequest};
