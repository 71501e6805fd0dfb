//! OCR transcript model and the transcript-source boundary.
//!
//! OCR itself is an external collaborator: something else looks at the
//! receipt photo and produces recognized text lines. This module defines
//! what that collaborator hands over (a [`Transcript`]) and how the
//! pipeline asks for it (a [`TranscriptSource`]).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::TranscriptError;
use crate::normalize::collapse_whitespace;

/// OCR output for one receipt image.
///
/// `lines` is the top-to-bottom sequence of recognized text lines;
/// `full_text` is the same content joined with newlines unless the OCR
/// collaborator supplied its own rendering. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Full recognized text.
    pub full_text: String,

    /// Recognized lines in reading order.
    pub lines: Vec<String>,
}

impl Transcript {
    /// Build a transcript from recognized lines, collapsing whitespace and
    /// dropping empty lines the way the OCR boundary promises.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let lines: Vec<String> = lines
            .iter()
            .map(|line| collapse_whitespace(line))
            .filter(|line| !line.is_empty())
            .collect();
        let full_text = lines.join("\n");
        Self { full_text, lines }
    }

    /// True when nothing was recognized at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.full_text.trim().is_empty()
    }
}

/// Source of transcripts, keyed by image path.
pub trait TranscriptSource {
    /// Obtain the transcript for one image.
    fn transcript(&self, image: &Path) -> Result<Transcript, TranscriptError>;
}

/// On-disk shape of a transcript sidecar file.
#[derive(Debug, Deserialize)]
struct SidecarFile {
    lines: Vec<String>,
    #[serde(default)]
    full_text: Option<String>,
}

/// Reads transcripts from JSON sidecar files written by the OCR tool.
///
/// For `receipts/slip-01.jpg` the sidecar is `receipts/slip-01.json`, or
/// `<dir>/slip-01.json` when a transcript directory is configured.
#[derive(Debug, Clone)]
pub struct SidecarSource {
    dir: Option<PathBuf>,
    extension: String,
}

impl SidecarSource {
    /// Create a source that looks next to each image for `.json` sidecars.
    pub fn new() -> Self {
        Self {
            dir: None,
            extension: "json".to_string(),
        }
    }

    /// Look for sidecars in a fixed directory instead of next to the image.
    pub fn with_dir(mut self, dir: PathBuf) -> Self {
        self.dir = Some(dir);
        self
    }

    /// Use a different sidecar file extension.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Where the transcript for `image` is expected to live.
    pub fn sidecar_path(&self, image: &Path) -> PathBuf {
        let stem = image.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let dir = self
            .dir
            .clone()
            .unwrap_or_else(|| image.parent().map(Path::to_path_buf).unwrap_or_default());
        dir.join(format!("{}.{}", stem, self.extension))
    }

    /// Read a transcript from an explicit file path.
    pub fn read_file(&self, path: &Path) -> Result<Transcript, TranscriptError> {
        let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TranscriptError::Missing(path.display().to_string()),
            _ => TranscriptError::Unreadable(format!("{}: {}", path.display(), e)),
        })?;

        let file: SidecarFile = serde_json::from_str(&raw)
            .map_err(|e| TranscriptError::Malformed(format!("{}: {}", path.display(), e)))?;

        let mut transcript = Transcript::from_lines(file.lines);
        if let Some(full_text) = file.full_text {
            transcript.full_text = full_text;
        }
        Ok(transcript)
    }
}

impl Default for SidecarSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptSource for SidecarSource {
    fn transcript(&self, image: &Path) -> Result<Transcript, TranscriptError> {
        self.read_file(&self.sidecar_path(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lines_normalizes() {
        let t = Transcript::from_lines(vec![
            "  Bangkok  Bank ".to_string(),
            "".to_string(),
            "Amount".to_string(),
        ]);
        assert_eq!(t.lines, vec!["Bangkok Bank", "Amount"]);
        assert_eq!(t.full_text, "Bangkok Bank\nAmount");
    }

    #[test]
    fn test_sidecar_path() {
        let source = SidecarSource::new();
        assert_eq!(
            source.sidecar_path(Path::new("receipts/slip-01.jpg")),
            PathBuf::from("receipts/slip-01.json")
        );

        let source = SidecarSource::new().with_dir(PathBuf::from("transcripts"));
        assert_eq!(
            source.sidecar_path(Path::new("receipts/slip-01.jpg")),
            PathBuf::from("transcripts/slip-01.json")
        );
    }

    #[test]
    fn test_read_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slip-01.json");
        fs::write(&path, r#"{"lines": ["Amount", "2,500.00 THB"]}"#).unwrap();

        let source = SidecarSource::new();
        let transcript = source.read_file(&path).unwrap();
        assert_eq!(transcript.lines, vec!["Amount", "2,500.00 THB"]);
    }

    #[test]
    fn test_missing_sidecar() {
        let source = SidecarSource::new();
        let err = source.transcript(Path::new("nowhere/slip-01.jpg")).unwrap_err();
        assert!(matches!(err, TranscriptError::Missing(_)));
    }

    #[test]
    fn test_malformed_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slip-01.json");
        fs::write(&path, "not json").unwrap();

        let err = SidecarSource::new().read_file(&path).unwrap_err();
        assert!(matches!(err, TranscriptError::Malformed(_)));
    }
}
