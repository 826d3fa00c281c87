//! Scripts directory listing.
//!
//! Produces one [`ScriptEntry`] per directory entry. Filtering on the
//! execute bit happens in the collector so that skipped entries can still
//! be logged.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A single entry found in the scripts directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptEntry {
    /// File name within the scripts directory.
    pub name: String,
    /// Absolute path to the entry.
    pub path: PathBuf,
    /// The agent's effective user may execute the entry.
    pub executable: bool,
    /// Regular file after following symlinks. Directories, sockets and
    /// dangling links are never candidates.
    pub is_file: bool,
}

impl ScriptEntry {
    /// Whether this entry should be spawned during a collection pass.
    pub fn is_candidate(&self) -> bool {
        self.is_file && self.executable
    }
}

/// Whether the agent's effective user may execute `path`.
///
/// Asks the kernel via `access(2)` rather than inspecting mode bits, so
/// ownership, group membership and root's relaxed rules all apply.
pub fn is_executable(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    unsafe { libc::access(c_path.as_ptr(), libc::X_OK) == 0 }
}

/// List `dir` non-recursively.
///
/// Entries are sorted by file name so passes over an unchanged directory
/// run scripts in the same order. Fails only when the directory itself
/// cannot be resolved or read; per-entry metadata errors produce a
/// non-candidate entry instead.
pub async fn list_scripts(dir: &Path) -> std::io::Result<Vec<ScriptEntry>> {
    let dir = tokio::fs::canonicalize(dir).await?;
    let mut read_dir = tokio::fs::read_dir(&dir).await?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = dir.join(entry.file_name());

        // `tokio::fs::metadata` follows symlinks, so a link to an
        // executable script is a candidate like the script itself.
        let (executable, is_file) = match tokio::fs::metadata(&path).await {
            Ok(metadata) => (is_executable(&path), metadata.is_file()),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Unable to stat entry");
                (false, false)
            }
        };

        entries.push(ScriptEntry {
            name,
            path,
            executable,
            is_file,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
