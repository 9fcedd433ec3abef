//! Descriptor table mapping integer descriptors to open files.

use std::collections::HashMap;
use std::fs::File;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{IoError, IoResult, Operation};
use crate::flags::OpenFlags;
use crate::ports::Fd;

/// First descriptor handed out; 0-2 are left to the standard streams.
const FIRST_FD: i32 = 3;

/// A file opened through the table.
#[derive(Debug)]
pub(crate) struct OpenFile {
    pub(crate) file: File,
    pub(crate) flags: OpenFlags,
}

/// Open files owned by one adapter instance.
///
/// The lock only guards the map. Operations clone the `Arc` and do their I/O
/// outside it; the OS handle is released when the last clone drops.
#[derive(Debug)]
pub(crate) struct DescriptorTable {
    next: AtomicI32,
    files: Mutex<HashMap<Fd, Arc<OpenFile>>>,
}

impl Default for DescriptorTable {
    fn default() -> Self {
        Self { next: AtomicI32::new(FIRST_FD), files: Mutex::new(HashMap::new()) }
    }
}

impl DescriptorTable {
    /// Registers `file` and returns its new descriptor. Descriptors are never reused.
    pub(crate) fn insert(&self, file: File, flags: OpenFlags) -> Fd {
        let fd = Fd::from_raw(self.next.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(fd, Arc::new(OpenFile { file, flags }));
        fd
    }

    /// Looks up an open descriptor.
    pub(crate) fn get(&self, fd: Fd, operation: Operation) -> IoResult<Arc<OpenFile>> {
        self.lock().get(&fd).cloned().ok_or_else(|| IoError::bad_descriptor(operation, fd))
    }

    /// Removes a descriptor, failing if it is not open.
    pub(crate) fn remove(&self, fd: Fd) -> IoResult<Arc<OpenFile>> {
        self.lock().remove(&fd).ok_or_else(|| IoError::bad_descriptor(Operation::Close, fd))
    }

    /// Number of descriptors currently open.
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Fd, Arc<OpenFile>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file() -> (tempfile::TempDir, File) {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("f")).unwrap();
        (dir, file)
    }

    #[test]
    fn descriptors_start_at_three_and_increase() {
        let table = DescriptorTable::default();
        let (_dir, a) = scratch_file();
        let (_dir2, b) = scratch_file();
        assert_eq!(table.insert(a, OpenFlags::Write), Fd::from_raw(3));
        assert_eq!(table.insert(b, OpenFlags::Write), Fd::from_raw(4));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn removed_descriptor_is_no_longer_found() {
        let table = DescriptorTable::default();
        let (_dir, file) = scratch_file();
        let fd = table.insert(file, OpenFlags::WriteRead);
        assert_eq!(table.get(fd, Operation::Write).unwrap().flags, OpenFlags::WriteRead);

        table.remove(fd).unwrap();
        let err = table.get(fd, Operation::Write).unwrap_err();
        assert_eq!(err.fd(), Some(fd));
        assert_eq!(err.operation(), Operation::Write);
        assert!(table.remove(fd).is_err());
    }
}
