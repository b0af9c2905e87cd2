// statusmon - platform/fs.rs
//
// Folder operations used by the publisher. The publisher never trusts the
// result of an individual call; it re-checks the filesystem afterwards, so
// implementations only need to *attempt* the operation.
//
// Two backends:
//   - `ShellFolderOps` shells out to the OS-native commands
//     (`rmdir /s /q` and `move` on Windows, `rm -rf` and `mv` elsewhere).
//   - `NativeFolderOps` uses `std::fs` directly.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Recursive folder removal and folder rename.
pub trait FolderOps {
    /// Attempt to remove `path` and everything under it.
    fn remove_dir_all(&mut self, path: &Path) -> io::Result<()>;

    /// Attempt to move the folder `from` to `to`.
    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()>;

    /// Whether `path` currently exists as a directory.
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Which `FolderOps` implementation a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FsBackend {
    #[default]
    Shell,
    Native,
}

// =============================================================================
// Shell backend
// =============================================================================

/// Shells out to the platform's own delete and move commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellFolderOps;

impl ShellFolderOps {
    fn run(mut cmd: Command, what: &str) -> io::Result<()> {
        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("{what} exited with {status}")))
        }
    }
}

impl FolderOps for ShellFolderOps {
    fn remove_dir_all(&mut self, path: &Path) -> io::Result<()> {
        #[cfg(target_os = "windows")]
        let cmd = {
            let mut c = Command::new("cmd");
            c.args(["/C", "rmdir", "/s", "/q"]).arg(path);
            c
        };
        #[cfg(not(target_os = "windows"))]
        let cmd = {
            let mut c = Command::new("rm");
            c.arg("-rf").arg("--").arg(path);
            c
        };
        Self::run(cmd, "rmdir")
    }

    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        #[cfg(target_os = "windows")]
        let cmd = {
            let mut c = Command::new("cmd");
            c.args(["/C", "move"]).arg(from).arg(to);
            c
        };
        #[cfg(not(target_os = "windows"))]
        let cmd = {
            let mut c = Command::new("mv");
            c.arg("--").arg(from).arg(to);
            c
        };
        Self::run(cmd, "move")
    }
}

// =============================================================================
// Native backend
// =============================================================================

/// Plain `std::fs` calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFolderOps;

impl FolderOps for NativeFolderOps {
    fn remove_dir_all(&mut self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}
