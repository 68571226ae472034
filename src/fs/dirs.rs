//! Directory creation and discovery for log and plugin storage.
//!
//! `ensure_dir` guarantees a storage directory exists before the agent writes
//! into it and tolerates another process creating the same directory at the
//! same time. `list_filtered` enumerates one directory level for plugin and
//! artifact discovery.

use crate::diagnostic;
use crate::diagnostics::{ErrorCode, Severity};
use crate::utils::error::DirError;
use log::debug;
use std::fs::{self, DirBuilder};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Make sure `path` exists as a directory, creating missing ancestors
///
/// **Public** - called before any artifact write
///
/// # Arguments
/// * `path` - Directory that must exist
/// * `mode` - Permission bits applied exactly to every directory created
///
/// # Returns
/// Ok when the directory exists on return, whether this call or a concurrent
/// creator made it
///
/// # Errors
/// * `DirError::Create` - creation failed for a reason other than "already exists"
/// * `DirError::NotADirectory` - a non-directory occupies the path or an ancestor
///
/// Every failure is also reported as a warning diagnostic.
pub fn ensure_dir(path: impl AsRef<Path>, mode: u32) -> Result<(), DirError> {
    let path = path.as_ref();
    if is_dir(path) {
        return Ok(());
    }

    // Innermost first; stops at the first ancestor that already is a directory
    let mut missing: Vec<&Path> = vec![path];
    let mut current = path.parent();
    while let Some(parent) = current {
        if parent.as_os_str().is_empty() || is_dir(parent) {
            break;
        }
        missing.push(parent);
        current = parent.parent();
    }

    debug!(
        "Creating {} missing director{} for {}",
        missing.len(),
        if missing.len() == 1 { "y" } else { "ies" },
        path.display()
    );

    for dir in missing.into_iter().rev() {
        create_one(dir, mode)?;
    }

    Ok(())
}

/// Create a single directory whose parent is known to exist
///
/// **Private** - one step of `ensure_dir`
fn create_one(dir: &Path, mode: u32) -> Result<(), DirError> {
    let result = {
        let _mask = process_umask::UmaskGuard::clear();
        dir_builder(mode).create(dir)
    };

    match result {
        Ok(()) => {
            debug!("Created directory {} (mode {:o})", dir.display(), mode);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            if is_dir(dir) {
                debug!("Directory {} appeared concurrently", dir.display());
                Ok(())
            } else {
                diagnostic!(
                    Severity::Warning,
                    ErrorCode::Config,
                    "Could not create directory '{}': {}",
                    dir.display(),
                    e
                );
                Err(DirError::NotADirectory(dir.to_path_buf()))
            }
        }
        Err(source) => {
            diagnostic!(
                Severity::Warning,
                ErrorCode::Config,
                "Could not create directory '{}': {}",
                dir.display(),
                source
            );
            Err(DirError::Create {
                path: PathBuf::from(dir),
                source,
            })
        }
    }
}

fn is_dir(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

#[cfg(unix)]
fn dir_builder(mode: u32) -> DirBuilder {
    use std::os::unix::fs::DirBuilderExt;
    let mut builder = DirBuilder::new();
    builder.mode(mode);
    builder
}

#[cfg(not(unix))]
fn dir_builder(_mode: u32) -> DirBuilder {
    DirBuilder::new()
}

#[cfg(unix)]
mod process_umask {
    use nix::sys::stat::{umask, Mode};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// The umask is process-wide; only one guard may be live at a time.
    static UMASK_LOCK: Mutex<()> = Mutex::new(());

    /// Clears the process umask and restores the previous one on drop
    pub(super) struct UmaskGuard {
        previous: Mode,
        _lock: MutexGuard<'static, ()>,
    }

    impl UmaskGuard {
        pub(super) fn clear() -> Self {
            let lock = UMASK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
            let previous = umask(Mode::empty());
            Self {
                previous,
                _lock: lock,
            }
        }
    }

    impl Drop for UmaskGuard {
        fn drop(&mut self) {
            umask(self.previous);
        }
    }
}

#[cfg(not(unix))]
mod process_umask {
    pub(super) struct UmaskGuard;

    impl UmaskGuard {
        pub(super) fn clear() -> Self {
            UmaskGuard
        }
    }
}

/// List the entries of `dir` accepted by `predicate`
///
/// **Public** - plugin and artifact discovery
///
/// # Arguments
/// * `dir` - Directory to enumerate (one level only)
/// * `predicate` - Called with every entry name; the name is kept when it returns true
///
/// # Returns
/// Accepted names in the order the filesystem yields them. A directory that
/// cannot be opened yields an empty list. Sort the result if order matters.
pub fn list_filtered<F>(dir: impl AsRef<Path>, mut predicate: F) -> Vec<String>
where
    F: FnMut(&str) -> bool,
{
    let dir = dir.as_ref();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping unreadable directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| predicate(name))
        .collect()
}

/// List the entries of `dir` whose names end with `suffix`
pub fn list_with_suffix(dir: impl AsRef<Path>, suffix: &str) -> Vec<String> {
    list_filtered(dir, |name| name.ends_with(suffix))
}
