//! File status records.

use std::fs::Metadata;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Socket, FIFO, device, or anything else.
    Other,
}

/// Snapshot of a file's metadata at the time of the `stat` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// Device containing the file.
    pub dev: u64,
    /// Inode number.
    pub ino: u64,
    /// Type and permission bits.
    pub mode: u32,
    /// Number of hard links.
    pub nlink: u64,
    /// Owner user id.
    pub uid: u32,
    /// Owner group id.
    pub gid: u32,
    /// Device id, for special files.
    pub rdev: u64,
    /// Size in bytes.
    pub size: u64,
    /// Preferred I/O block size.
    pub blksize: u64,
    /// Number of 512-byte blocks allocated.
    pub blocks: u64,
    /// Last access.
    pub atime: DateTime<Utc>,
    /// Last content modification.
    pub mtime: DateTime<Utc>,
    /// Last status change.
    pub ctime: DateTime<Utc>,
    /// Creation time, where the filesystem records it.
    pub birthtime: Option<DateTime<Utc>>,
    /// Entry type.
    pub kind: FileKind,
}

impl FileStat {
    /// Returns true for a regular file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    /// Returns true for a directory.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Returns true for a symbolic link.
    ///
    /// Never true for records produced by `stat`, which follows links.
    #[must_use]
    pub fn is_symbolic_link(&self) -> bool {
        self.kind == FileKind::Symlink
    }

    /// Permission bits only (`mode & 0o7777`).
    #[must_use]
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }
}

impl From<&Metadata> for FileStat {
    #[cfg(unix)]
    fn from(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode: metadata.mode(),
            nlink: metadata.nlink(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            rdev: metadata.rdev(),
            size: metadata.size(),
            blksize: metadata.blksize(),
            blocks: metadata.blocks(),
            atime: unix_time(metadata.atime(), metadata.atime_nsec()),
            mtime: unix_time(metadata.mtime(), metadata.mtime_nsec()),
            ctime: unix_time(metadata.ctime(), metadata.ctime_nsec()),
            birthtime: metadata.created().ok().map(DateTime::<Utc>::from),
            kind: kind_of(metadata),
        }
    }

    #[cfg(not(unix))]
    fn from(metadata: &Metadata) -> Self {
        let mtime = system_time(metadata.modified());
        Self {
            dev: 0,
            ino: 0,
            mode: if metadata.permissions().readonly() { 0o444 } else { 0o666 },
            nlink: 1,
            uid: 0,
            gid: 0,
            rdev: 0,
            size: metadata.len(),
            blksize: 4096,
            blocks: metadata.len().div_ceil(512),
            atime: system_time(metadata.accessed()),
            mtime,
            ctime: mtime,
            birthtime: metadata.created().ok().map(DateTime::<Utc>::from),
            kind: kind_of(metadata),
        }
    }
}

fn kind_of(metadata: &Metadata) -> FileKind {
    let file_type = metadata.file_type();
    if file_type.is_file() {
        FileKind::File
    } else if file_type.is_dir() {
        FileKind::Directory
    } else if file_type.is_symlink() {
        FileKind::Symlink
    } else {
        FileKind::Other
    }
}

#[cfg(unix)]
fn unix_time(secs: i64, nsecs: i64) -> DateTime<Utc> {
    let nsecs = u32::try_from(nsecs).unwrap_or(0);
    DateTime::from_timestamp(secs, nsecs).unwrap_or_default()
}

#[cfg(not(unix))]
fn system_time(time: std::io::Result<std::time::SystemTime>) -> DateTime<Utc> {
    time.map(DateTime::<Utc>::from).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_of_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"12345").unwrap();

        let stat = FileStat::from(&std::fs::metadata(&path).unwrap());
        assert!(stat.is_file());
        assert!(!stat.is_directory());
        assert_eq!(stat.size, 5);
        assert!(stat.mtime.timestamp() > 0);
    }

    #[test]
    fn stat_of_directory() {
        let dir = tempfile::tempdir().unwrap();
        let stat = FileStat::from(&std::fs::metadata(dir.path()).unwrap());
        assert!(stat.is_directory());
        assert!(!stat.is_symbolic_link());
    }

    #[test]
    fn serializes_kind_in_snake_case() {
        let value = serde_json::to_value(FileKind::Directory).unwrap();
        assert_eq!(value, serde_json::json!("directory"));
    }
}
