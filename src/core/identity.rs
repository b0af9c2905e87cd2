// statusmon - core/identity.rs
//
// Maps a log file path to the user bucket and file name the archive sink
// writes it under. The log tree is laid out so that the fourth segment from
// the end of a file's absolute path names the user it belongs to; trees that
// are shallower than that fall back to a fixed bucket instead of failing.

use crate::util::constants::{FALLBACK_USER_BUCKET, USER_SEGMENT_FROM_END};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Name used when a path has no final file-name component.
const FALLBACK_FILE_NAME: &str = "unnamed.log";

/// Absolute form of `path` without touching the filesystem.
///
/// Relative paths are joined onto the current directory; if that cannot be
/// determined the path is used as given.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Named segments of `path`, with `.` dropped and `..` applied.
fn normal_segments(path: &Path) -> Vec<&OsStr> {
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => segments.push(s),
            Component::ParentDir => {
                segments.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    segments
}

/// The user segment of an absolute path, or `None` if the path is too shallow.
pub fn user_segment(absolute: &Path) -> Option<String> {
    let segments = normal_segments(absolute);
    let index = segments.len().checked_sub(USER_SEGMENT_FROM_END)?;
    let user = segments[index].to_string_lossy();
    if user.is_empty() {
        None
    } else {
        Some(user.into_owned())
    }
}

/// User bucket for `source`, falling back to `FALLBACK_USER_BUCKET`.
pub fn resolve_user(source: &Path) -> String {
    user_segment(&absolutize(source)).unwrap_or_else(|| {
        tracing::debug!(
            file = %source.display(),
            fallback = FALLBACK_USER_BUCKET,
            "Path too shallow for a user segment"
        );
        FALLBACK_USER_BUCKET.to_string()
    })
}

/// `working_dir/<user>/<file name>` for a source log file.
pub fn archive_output_path(working_dir: &Path, source: &Path) -> PathBuf {
    let file_name = source
        .file_name()
        .unwrap_or_else(|| OsStr::new(FALLBACK_FILE_NAME));
    working_dir.join(resolve_user(source)).join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(parts: &[&str]) -> PathBuf {
        let mut p = PathBuf::from(std::path::MAIN_SEPARATOR_STR);
        for part in parts {
            p.push(part);
        }
        p
    }

    #[test]
    fn test_fourth_from_last_segment_is_user() {
        let p = abs(&["logs", "VFS", "alice", "client", "2024", "svc.log"]);
        assert_eq!(user_segment(&p).as_deref(), Some("alice"));
    }

    #[test]
    fn test_exactly_four_segments() {
        let p = abs(&["bob", "a", "b", "svc.log"]);
        assert_eq!(user_segment(&p).as_deref(), Some("bob"));
    }

    #[test]
    fn test_shallow_path_has_no_user() {
        assert_eq!(user_segment(&abs(&["a", "b", "svc.log"])), None);
        assert_eq!(user_segment(&abs(&["svc.log"])), None);
    }

    #[test]
    fn test_parent_dir_components_are_applied() {
        let p = abs(&["root", "carol", "x", "..", "y", "z", "svc.log"]);
        assert_eq!(user_segment(&p).as_deref(), Some("carol"));
    }

    #[test]
    fn test_archive_output_path_uses_fallback_bucket() {
        let out = archive_output_path(Path::new("/work"), &abs(&["svc.log"]));
        assert_eq!(out, Path::new("/work").join(FALLBACK_USER_BUCKET).join("svc.log"));
    }

    #[test]
    fn test_archive_output_path_keeps_base_name() {
        let src = abs(&["logs", "dave", "cat", "host", "client.log"]);
        let out = archive_output_path(Path::new("/work"), &src);
        assert_eq!(out, Path::new("/work").join("dave").join("client.log"));
    }
}
