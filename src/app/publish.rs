// statusmon - app/publish.rs
//
// Promotes the archive working folder to its published location on a
// filesystem where other processes may briefly hold files open.
//
// Every operation is attempted up to `RetryPolicy::attempts` times with a
// fixed pause between attempts. Success is judged by re-checking the
// filesystem, never by the return value of the attempt itself. Exhausting
// the budget is reported, not raised: publishing is best-effort.
//
// Progress lines ("Removing: ...", "Moving: ...") go to the console writer
// so an operator watching the job sees retries as they happen.

use crate::platform::fs::FolderOps;
use crate::util::error::PublishError;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Attempt budget for one folder operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        use crate::util::constants;
        Self::new(
            constants::DEFAULT_PUBLISH_RETRIES,
            Duration::from_millis(constants::DEFAULT_PUBLISH_RETRY_DELAY_MS),
        )
    }
}

/// Result of a delete that did not exhaust its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Nothing was there; no attempt made.
    AlreadyAbsent,
    /// Gone after this many attempts.
    Deleted { attempts: u32 },
}

/// Result of a move that did not exhaust its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Source moved into place after this many attempts.
    Moved { attempts: u32 },
    /// Source folder does not exist; nothing to publish.
    SourceMissing,
    /// The destination could not be cleared, so no move was attempted.
    DestinationBlocked,
}

/// " [Retry N]" suffix for the second and later attempts.
fn retry_suffix(index: u32) -> String {
    if index == 0 {
        String::new()
    } else {
        format!(" [Retry {index}]")
    }
}

/// Write one progress line to the console. A failed write is logged and
/// otherwise ignored; the folder operation itself goes on.
pub(crate) fn console_line<W: Write>(console: &mut W, line: std::fmt::Arguments<'_>) {
    if let Err(e) = console.write_fmt(line).and_then(|()| console.write_all(b"\n")) {
        tracing::debug!(error = %e, "Console write failed");
    }
}

/// Retrying delete and move over a `FolderOps` backend.
pub struct FolderPublisher<O: FolderOps> {
    ops: O,
    policy: RetryPolicy,
}

impl<O: FolderOps> FolderPublisher<O> {
    pub fn new(ops: O, policy: RetryPolicy) -> Self {
        Self { ops, policy }
    }

    #[cfg(test)]
    pub(crate) fn ops(&self) -> &O {
        &self.ops
    }

    /// Remove `path` and everything beneath it.
    ///
    /// A missing folder is success with no attempt made.
    pub fn delete_folder<W: Write>(
        &mut self,
        path: &Path,
        console: &mut W,
    ) -> Result<DeleteOutcome, PublishError> {
        if !self.ops.is_dir(path) {
            return Ok(DeleteOutcome::AlreadyAbsent);
        }

        for index in 0..self.policy.attempts {
            console_line(
                console,
                format_args!("Removing: \"{}\"{}", path.display(), retry_suffix(index)),
            );
            if let Err(e) = self.ops.remove_dir_all(path) {
                tracing::debug!(path = %path.display(), attempt = index + 1, error = %e, "Delete attempt failed");
            }
            if !self.ops.is_dir(path) {
                tracing::debug!(path = %path.display(), attempts = index + 1, "Folder deleted");
                return Ok(DeleteOutcome::Deleted { attempts: index + 1 });
            }
            if index + 1 < self.policy.attempts {
                self.policy.pause();
            }
        }

        console_line(console, format_args!("Failed to delete: \"{}\"", path.display()));
        let err = PublishError::DeleteExhausted {
            path: path.to_path_buf(),
            attempts: self.policy.attempts,
        };
        tracing::warn!(error = %err, "Folder delete gave up");
        Err(err)
    }

    /// Replace `destination` with `source`.
    ///
    /// Clears `destination` first. The move is only attempted when `source`
    /// exists and `destination` is gone; otherwise this is a quiet no-op
    /// reported through the returned outcome.
    pub fn move_folder<W: Write>(
        &mut self,
        source: &Path,
        destination: &Path,
        console: &mut W,
    ) -> Result<MoveOutcome, PublishError> {
        // A failed clear is already reported; the existence checks below
        // turn it into `DestinationBlocked`.
        let _ = self.delete_folder(destination, console);

        if !self.ops.is_dir(source) {
            tracing::debug!(source = %source.display(), "Nothing to publish");
            return Ok(MoveOutcome::SourceMissing);
        }
        if self.ops.is_dir(destination) {
            tracing::warn!(destination = %destination.display(), "Destination still present; publish skipped");
            return Ok(MoveOutcome::DestinationBlocked);
        }

        for index in 0..self.policy.attempts {
            console_line(
                console,
                format_args!(
                    "Moving: \"{}\" -> \"{}\"{}",
                    source.display(),
                    destination.display(),
                    retry_suffix(index)
                ),
            );
            if let Err(e) = self.ops.rename(source, destination) {
                tracing::debug!(
                    source = %source.display(),
                    destination = %destination.display(),
                    attempt = index + 1,
                    error = %e,
                    "Move attempt failed"
                );
            }
            if !self.ops.is_dir(source) && self.ops.is_dir(destination) {
                tracing::debug!(destination = %destination.display(), attempts = index + 1, "Folder published");
                return Ok(MoveOutcome::Moved { attempts: index + 1 });
            }
            if index + 1 < self.policy.attempts {
                self.policy.pause();
            }
        }

        console_line(
            console,
            format_args!(
                "Failed to move: \"{}\" -> \"{}\"",
                source.display(),
                destination.display()
            ),
        );
        let err = PublishError::MoveExhausted {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            attempts: self.policy.attempts,
        };
        tracing::warn!(error = %err, "Folder move gave up");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fs::NativeFolderOps;
    use std::fs;
    use std::io;

    /// Real filesystem operations that refuse to work for the first
    /// `busy_for` calls, like a folder held open by another process.
    #[derive(Default)]
    struct LockedFor {
        busy_for: u32,
        calls: u32,
    }

    impl LockedFor {
        fn new(busy_for: u32) -> Self {
            Self { busy_for, calls: 0 }
        }

        fn busy(&mut self) -> bool {
            self.calls += 1;
            self.calls <= self.busy_for
        }
    }

    impl FolderOps for LockedFor {
        fn remove_dir_all(&mut self, path: &Path) -> io::Result<()> {
            if self.busy() {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "in use"));
            }
            NativeFolderOps.remove_dir_all(path)
        }

        fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
            if self.busy() {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "in use"));
            }
            NativeFolderOps.rename(from, to)
        }
    }

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    fn folder_with_file(path: &Path) {
        fs::create_dir_all(path.join("alice")).unwrap();
        fs::write(path.join("alice").join("svc.log"), "x\n").unwrap();
    }

    #[test]
    fn test_delete_missing_folder_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let mut p = FolderPublisher::new(LockedFor::new(0), policy(10));
        let mut out = Vec::new();
        let outcome = p.delete_folder(&tmp.path().join("absent"), &mut out).unwrap();
        assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
        assert!(out.is_empty());
        assert_eq!(p.ops().calls, 0);
    }

    #[test]
    fn test_delete_retries_until_unlocked() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("work");
        folder_with_file(&dir);

        let mut p = FolderPublisher::new(LockedFor::new(2), policy(10));
        let mut out = Vec::new();
        let outcome = p.delete_folder(&dir, &mut out).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { attempts: 3 });
        assert!(!dir.exists());

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(!lines[0].contains("[Retry"));
        assert!(lines[1].ends_with("[Retry 1]"));
        assert!(lines[2].ends_with("[Retry 2]"));
    }

    #[test]
    fn test_delete_gives_up_after_budget() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("work");
        folder_with_file(&dir);

        let mut p = FolderPublisher::new(LockedFor::new(u32::MAX), policy(4));
        let mut out = Vec::new();
        let err = p.delete_folder(&dir, &mut out).unwrap_err();
        assert_eq!(
            err,
            PublishError::DeleteExhausted {
                path: dir.clone(),
                attempts: 4
            }
        );
        assert!(dir.exists());
        assert_eq!(p.ops().calls, 4);
        assert!(String::from_utf8(out).unwrap().contains("Failed to delete"));
    }

    #[test]
    fn test_move_replaces_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("work");
        let dst = tmp.path().join("pub");
        folder_with_file(&src);
        fs::create_dir_all(dst.join("stale")).unwrap();

        let mut p = FolderPublisher::new(LockedFor::new(0), policy(10));
        let outcome = p.move_folder(&src, &dst, &mut io::sink()).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { attempts: 1 });
        assert!(!src.exists());
        assert!(dst.join("alice").join("svc.log").is_file());
        assert!(!dst.join("stale").exists());
    }

    #[test]
    fn test_move_retries_when_locked() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("work");
        let dst = tmp.path().join("pub");
        folder_with_file(&src);

        // Destination is absent, so the first call the fake sees is a rename.
        let mut p = FolderPublisher::new(LockedFor::new(3), policy(10));
        let outcome = p.move_folder(&src, &dst, &mut io::sink()).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { attempts: 4 });
        assert!(dst.is_dir());
    }

    #[test]
    fn test_move_missing_source_leaves_destination_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("work");
        let dst = tmp.path().join("pub");

        let mut p = FolderPublisher::new(LockedFor::new(0), policy(10));
        let mut out = Vec::new();
        let outcome = p.move_folder(&src, &dst, &mut out).unwrap();
        assert_eq!(outcome, MoveOutcome::SourceMissing);
        assert!(!dst.exists());
        assert!(out.is_empty());
        assert_eq!(p.ops().calls, 0);
    }

    #[test]
    fn test_move_blocked_when_destination_cannot_be_cleared() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("work");
        let dst = tmp.path().join("pub");
        folder_with_file(&src);
        folder_with_file(&dst);

        let mut p = FolderPublisher::new(LockedFor::new(u32::MAX), policy(2));
        let outcome = p.move_folder(&src, &dst, &mut io::sink()).unwrap();
        assert_eq!(outcome, MoveOutcome::DestinationBlocked);
        assert!(src.is_dir());
        assert_eq!(p.ops().calls, 2);
    }

    struct ClosedConsole;

    impl Write for ClosedConsole {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_closed_console_does_not_stop_publish() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("work");
        let dst = tmp.path().join("pub");
        folder_with_file(&src);
        folder_with_file(&dst);

        let mut p = FolderPublisher::new(LockedFor::new(1), policy(10));
        let outcome = p.move_folder(&src, &dst, &mut ClosedConsole).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { attempts: 1 });
        assert!(!src.exists());
        assert!(dst.join("alice").join("svc.log").is_file());
    }

    #[test]
    fn test_retry_policy_never_zero_attempts() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
        assert_eq!(RetryPolicy::default().attempts, 10);
    }
}
