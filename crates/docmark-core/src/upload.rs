//! Request-scoped handling of uploaded files.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::DocmarkError;

/// Inputs above 50 MiB are processed but flagged as slow.
pub const LARGE_FILE_THRESHOLD: u64 = 50 * 1024 * 1024;

pub const LARGE_FILE_WARNING: &str =
    "Warning: You have uploaded a large file. Processing may take some time.";

/// An uploaded file staged on disk for a single extraction attempt.
///
/// The file lives in a private temporary directory that is removed when the
/// value is dropped, whether or not the extraction succeeded.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    len: u64,
    _dir: TempDir,
}

impl SourceFile {
    /// Write `bytes` to a fresh temporary directory under the final component
    /// of `file_name`, keeping its extension for dispatch.
    pub fn stage(file_name: &str, bytes: &[u8]) -> Result<SourceFile, DocmarkError> {
        let dir = tempfile::Builder::new().prefix("docmark-").tempdir()?;
        let name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "upload".into());
        let path = dir.path().join(name);
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), len = bytes.len(), "source file staged");

        Ok(SourceFile {
            path,
            len: bytes.len() as u64,
            _dir: dir,
        })
    }

    /// Stage a copy of an existing file.
    pub fn stage_copy(source: &Path) -> Result<SourceFile, DocmarkError> {
        let bytes = fs::read(source)?;
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());
        SourceFile::stage(&name, &bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Advisory produced before processing, based on input size alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeAdvisory {
    Normal,
    Large { len: u64, threshold: u64 },
}

impl SizeAdvisory {
    pub fn for_len(len: u64, threshold: u64) -> SizeAdvisory {
        if len > threshold {
            warn!(len, threshold, "large input file");
            SizeAdvisory::Large { len, threshold }
        } else {
            SizeAdvisory::Normal
        }
    }

    pub fn warning(&self) -> Option<&'static str> {
        match self {
            SizeAdvisory::Normal => None,
            SizeAdvisory::Large { .. } => Some(LARGE_FILE_WARNING),
        }
    }
}

/// Name of the downloadable Markdown file for an input: `converted_<stem>.md`.
pub fn output_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    format!("converted_{stem}.md")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_writes_bytes_under_original_name() {
        let source = SourceFile::stage("report.DOCX", b"abc").unwrap();
        assert_eq!(source.path().file_name().unwrap(), "report.DOCX");
        assert_eq!(fs::read(source.path()).unwrap(), b"abc");
        assert_eq!(source.len(), 3);
        assert!(!source.is_empty());
    }

    #[test]
    fn test_stage_empty_upload() {
        let source = SourceFile::stage("blank.txt", b"").unwrap();
        assert!(source.is_empty());
        assert_eq!(fs::read(source.path()).unwrap(), b"");
    }

    #[test]
    fn test_stage_strips_directories_from_name() {
        let source = SourceFile::stage("../../etc/notes.html", b"<p>x</p>").unwrap();
        assert_eq!(source.path().file_name().unwrap(), "notes.html");
        let dir_name = source.path().parent().unwrap().file_name().unwrap();
        assert!(dir_name.to_string_lossy().starts_with("docmark-"));
    }

    #[test]
    fn test_drop_removes_file_and_directory() {
        let source = SourceFile::stage("a.pdf", b"%PDF").unwrap();
        let path = source.path().to_path_buf();
        let dir = path.parent().unwrap().to_path_buf();
        assert!(path.exists());
        drop(source);
        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_size_advisory() {
        assert_eq!(SizeAdvisory::for_len(10, 100), SizeAdvisory::Normal);
        assert_eq!(SizeAdvisory::for_len(100, 100), SizeAdvisory::Normal);
        let large = SizeAdvisory::for_len(LARGE_FILE_THRESHOLD + 1, LARGE_FILE_THRESHOLD);
        assert_eq!(large.warning(), Some(LARGE_FILE_WARNING));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(Path::new("/tmp/Q3 report.xlsx")), "converted_Q3 report.md");
        assert_eq!(output_file_name(Path::new("notes.tar.gz")), "converted_notes.tar.md");
    }
}
