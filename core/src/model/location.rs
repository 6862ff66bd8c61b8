//! Source provenance of extracted records.

use std::fmt;
use std::path::PathBuf;

/// Where a record was declared: file (relative to the scanned root) and
/// 1-based line.
///
/// Ordering is by file then line, which is the "source order" used whenever a
/// stable tie-break is needed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceLocation {
    /// File path relative to the source directory.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
}

impl SourceLocation {
    /// Creates a location.
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}
