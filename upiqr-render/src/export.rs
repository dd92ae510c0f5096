//! Saving and sharing rendered codes

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::render::{QrFormat, RenderedImage};

/// File name stem for saved codes
pub const DEFAULT_FILE_STEM: &str = "upi-qr-code";

/// Fixed file name for a code of the given format
pub fn file_name(format: QrFormat) -> String {
    format!("{}.{}", DEFAULT_FILE_STEM, format.file_extension())
}

/// Write `image` into `dir` under the fixed file name, creating `dir` if
/// needed. An existing file with the same name is replaced.
pub fn download(image: &RenderedImage, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(image.format));
    fs::write(&path, &image.bytes)?;
    tracing::info!("saved QR code to {}", path.display());
    Ok(path)
}

/// A platform mechanism that can hand a saved file to another app
pub trait ShareTarget {
    fn is_available(&self) -> bool;
    fn share(&self, path: &Path) -> io::Result<()>;
}

/// Never available; sharing always falls back to download
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShare;

impl ShareTarget for NoShare {
    fn is_available(&self) -> bool {
        false
    }

    fn share(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "sharing not supported"))
    }
}

/// Runs an external program with the saved file path as its last argument
#[derive(Debug, Clone)]
pub struct CommandShare {
    program: String,
    args: Vec<String>,
}

impl CommandShare {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Split a command line on whitespace; `None` when it is blank
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?;
        Some(Self {
            program: program.to_string(),
            args: words.map(str::to_string).collect(),
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl ShareTarget for CommandShare {
    fn is_available(&self) -> bool {
        !self.program.is_empty()
    }

    fn share(&self, path: &Path) -> io::Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} exited with {}", self.program, status),
            ))
        }
    }
}

/// How a code reached the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Handed to the share target; the file also remains on disk
    Shared(PathBuf),
    /// Saved only, because sharing was unavailable or failed
    Downloaded(PathBuf),
}

impl ShareOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ShareOutcome::Shared(path) | ShareOutcome::Downloaded(path) => path,
        }
    }
}

/// Save `image` into `dir`, then offer it to `target`.
///
/// Only a failed save is an error; a missing or failing share target falls
/// back to the saved file.
pub fn share_or_download(
    image: &RenderedImage,
    dir: &Path,
    target: &dyn ShareTarget,
) -> io::Result<ShareOutcome> {
    let path = download(image, dir)?;

    if !target.is_available() {
        tracing::warn!("native sharing not supported, QR code was saved instead");
        return Ok(ShareOutcome::Downloaded(path));
    }

    match target.share(&path) {
        Ok(()) => Ok(ShareOutcome::Shared(path)),
        Err(e) => {
            tracing::warn!("failed to share QR code: {}; it was saved instead", e);
            Ok(ShareOutcome::Downloaded(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn png() -> RenderedImage {
        RenderedImage {
            format: QrFormat::Png,
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[derive(Default)]
    struct RecordingShare {
        fail: bool,
        shared: RefCell<Vec<PathBuf>>,
    }

    impl ShareTarget for RecordingShare {
        fn is_available(&self) -> bool {
            true
        }

        fn share(&self, path: &Path) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::Other, "cancelled"));
            }
            self.shared.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_name(QrFormat::Png), "upi-qr-code.png");
        assert_eq!(file_name(QrFormat::Svg), "upi-qr-code.svg");
    }

    #[test]
    fn test_download_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out");
        let path = download(&png(), &target).unwrap();
        assert_eq!(path, target.join("upi-qr-code.png"));
        assert_eq!(fs::read(&path).unwrap(), png().bytes);
    }

    #[test]
    fn test_unavailable_share_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = share_or_download(&png(), dir.path(), &NoShare).unwrap();
        assert_eq!(outcome, ShareOutcome::Downloaded(dir.path().join("upi-qr-code.png")));
        assert!(outcome.path().exists());
    }

    #[test]
    fn test_share_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();

        let ok = RecordingShare::default();
        let outcome = share_or_download(&png(), dir.path(), &ok).unwrap();
        assert!(matches!(outcome, ShareOutcome::Shared(_)));
        assert_eq!(ok.shared.borrow().len(), 1);

        let failing = RecordingShare {
            fail: true,
            ..RecordingShare::default()
        };
        let outcome = share_or_download(&png(), dir.path(), &failing).unwrap();
        assert!(matches!(outcome, ShareOutcome::Downloaded(_)));
    }

    #[test]
    fn test_command_line_parsing() {
        assert!(CommandShare::from_command_line("   ").is_none());
        let share = CommandShare::from_command_line("xdg-open --new").unwrap();
        assert_eq!(share.program, "xdg-open");
        assert_eq!(share.args, vec!["--new".to_string()]);
        assert!(share.is_available());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_share_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let ok = share_or_download(&png(), dir.path(), &CommandShare::new("true")).unwrap();
        assert!(matches!(ok, ShareOutcome::Shared(_)));
        let failed = share_or_download(&png(), dir.path(), &CommandShare::new("false")).unwrap();
        assert!(matches!(failed, ShareOutcome::Downloaded(_)));
    }
}
