//! Name list parsing.
//!
//! A name list is plain text with one component name per line. Lines are
//! trimmed and blank lines ignored. Each accepted name doubles as the base
//! name of its output file and as the final path segment of its registry
//! URL, so anything that cannot serve as a single path segment is rejected
//! up front instead of being fetched.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur while loading a name list.
#[derive(Debug, Error)]
pub enum NameListError {
    /// The list file could not be read.
    #[error("failed to read name list {path}: {source}")]
    Io {
        /// Path of the list file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Why a line of the list was not accepted as a [`Name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Contains `/` or `\`.
    PathSeparator,
    /// Is `.` or `..`.
    DotSegment,
    /// Contains a NUL or other control character.
    ControlCharacter,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathSeparator => write!(f, "contains a path separator"),
            Self::DotSegment => write!(f, "is a relative path segment"),
            Self::ControlCharacter => write!(f, "contains a control character"),
        }
    }
}

/// Identifier of one remote component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
    /// Validates and wraps a single, already trimmed, non-empty token.
    ///
    /// # Errors
    ///
    /// Returns the [`RejectReason`] when the token cannot be used as a
    /// single file name and URL path segment.
    pub fn parse(token: &str) -> Result<Self, RejectReason> {
        if token == "." || token == ".." {
            return Err(RejectReason::DotSegment);
        }
        if token.contains(['/', '\\']) {
            return Err(RejectReason::PathSeparator);
        }
        if token.chars().any(char::is_control) {
            return Err(RejectReason::ControlCharacter);
        }
        Ok(Self(token.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the artifact stored for this name (`{name}.json`).
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A line that was dropped from the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based line number in the source text.
    pub line: usize,
    /// The trimmed line content.
    pub raw: String,
    /// Why it was rejected.
    pub reason: RejectReason,
}

/// Result of parsing a name list.
#[derive(Debug, Clone, Default)]
pub struct NameList {
    /// Accepted names in input order, duplicates preserved.
    pub names: Vec<Name>,
    /// Non-blank lines that could not be used as names.
    pub rejected: Vec<RejectedLine>,
}

impl NameList {
    /// Number of accepted names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no names were accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parses name list text: one name per line, trimmed, blanks ignored.
///
/// # Examples
///
/// ```
/// use registry_sync_core::names::parse_names;
///
/// let list = parse_names("hero1\n\n  about6  \n../etc\n");
/// let names: Vec<&str> = list.names.iter().map(|n| n.as_str()).collect();
/// assert_eq!(names, ["hero1", "about6"]);
/// assert_eq!(list.rejected.len(), 1);
/// ```
#[must_use]
pub fn parse_names(text: &str) -> NameList {
    let mut list = NameList::default();
    for (index, line) in text.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        match Name::parse(token) {
            Ok(name) => list.names.push(name),
            Err(reason) => list.rejected.push(RejectedLine {
                line: index + 1,
                raw: token.to_string(),
                reason,
            }),
        }
    }
    list
}

/// Reads and parses a name list file.
///
/// # Errors
///
/// Returns [`NameListError::Io`] if the file cannot be read.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn read_names(path: &Path) -> Result<NameList, NameListError> {
    let text = std::fs::read_to_string(path).map_err(|source| NameListError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let list = parse_names(&text);
    debug!(
        names = list.len(),
        rejected = list.rejected.len(),
        "name list loaded"
    );
    Ok(list)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_trims_and_skips_blank_lines() {
        let list = parse_names("  a  \n\n\t\nb\r\nc");
        let names: Vec<&str> = list.names.iter().map(Name::as_str).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(list.rejected.is_empty());
    }

    #[test]
    fn test_parse_names_keeps_duplicates_in_order() {
        let list = parse_names("x\ny\nx\n");
        let names: Vec<&str> = list.names.iter().map(Name::as_str).collect();
        assert_eq!(names, ["x", "y", "x"]);
    }

    #[test]
    fn test_parse_names_empty_input() {
        let list = parse_names("");
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_parse_names_rejects_path_like_tokens_with_line_numbers() {
        let list = parse_names("ok\na/b\n..\nc\\d\n.\n");
        assert_eq!(list.len(), 1);
        let rejected: Vec<(usize, RejectReason)> =
            list.rejected.iter().map(|r| (r.line, r.reason)).collect();
        assert_eq!(
            rejected,
            [
                (2, RejectReason::PathSeparator),
                (3, RejectReason::DotSegment),
                (4, RejectReason::PathSeparator),
                (5, RejectReason::DotSegment),
            ]
        );
    }

    #[test]
    fn test_name_parse_rejects_control_characters() {
        assert_eq!(
            Name::parse("bad\u{0}name"),
            Err(RejectReason::ControlCharacter)
        );
    }

    #[test]
    fn test_name_allows_dots_inside() {
        let name = Name::parse("button.v2").unwrap();
        assert_eq!(name.file_name(), "button.v2.json");
    }

    #[test]
    fn test_read_names_missing_file_reports_path() {
        let err = read_names(Path::new("/definitely/not/here/components.txt")).unwrap_err();
        assert!(err.to_string().contains("components.txt"));
    }

    #[test]
    fn test_read_names_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("components.txt");
        std::fs::write(&path, "hero1\nabout6\n").unwrap();
        let list = read_names(&path).unwrap();
        assert_eq!(list.len(), 2);
    }
}
