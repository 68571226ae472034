//! File identity probes.
//!
//! Log writers keep the inode of the file they opened and compare it later to
//! notice the file was rotated or recreated underneath them.

#[cfg(unix)]
use std::fs;
use std::path::Path;

/// Inode number of a regular file, or 0
///
/// **Public** - main entry point for replacement detection
///
/// Returns 0 when the path is missing, inaccessible, or not a regular file.
/// Always 0 on platforms without inode numbers.
#[cfg(unix)]
pub fn inode_of(path: impl AsRef<Path>) -> u64 {
    use std::os::unix::fs::MetadataExt;
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta.ino(),
        _ => 0,
    }
}

#[cfg(not(unix))]
pub fn inode_of(_path: impl AsRef<Path>) -> u64 {
    0
}

/// Whether the file at `path` is no longer the one identified by `known_inode`
pub fn was_replaced(path: impl AsRef<Path>, known_inode: u64) -> bool {
    inode_of(path) != known_inode
}
