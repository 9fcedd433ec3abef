//! Live adapters backed by the host operating system.

mod descriptors;
pub mod native_fs;

pub use native_fs::LiveNativeFs;
