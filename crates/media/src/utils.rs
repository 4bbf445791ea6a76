//! Utility functions for external tool invocation and paths

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Split a configured command line into program and leading arguments
///
/// Lets a tool be configured as `yt-dlp` or as `python3 -m yt_dlp`.
/// Returns `None` for a blank command.
pub fn split_command(command: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Append `.ext` to a path without touching any dots already in the name
///
/// `Path::with_extension` would replace the `.2` in `Song v1.2`.
pub fn append_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Strip the last extension from a file name reported by the extractor
pub fn strip_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.with_extension(""),
        None => path.to_path_buf(),
    }
}
