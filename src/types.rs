/// Core domain types for workspace references, tree paths, and resolution results.
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::Error;

/// Path separator used by repository URLs, history entries, and tree paths alike.
pub const PATH_SEPARATOR: char = '/';

/// An external locator split into segments: a repository URL, a revision path,
/// or a plain workspace path. Never empty once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePath {
    /// The raw text as received, kept for messages.
    raw: String,
    /// Non-empty segments in order, root first.
    segments: Vec<String>,
}

impl ReferencePath {
    /// Split a reference on `/`, dropping empty and `.` segments.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyReference` if nothing is left after splitting.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let segments: Vec<String> = raw
            .split(PATH_SEPARATOR)
            .filter(|s| return !s.is_empty() && *s != ".")
            .map(String::from)
            .collect();

        if segments.is_empty() {
            return Err(Error::EmptyReference { raw: raw.to_string() });
        }

        return Ok(Self { raw: raw.to_string(), segments });
    }

    /// The last segment, i.e. the file name the reference points at.
    pub fn file_name(&self) -> &str {
        return self.segments.last().map_or("", String::as_str);
    }

    /// The raw text the reference was parsed from.
    pub fn raw(&self) -> &str {
        return &self.raw;
    }

    /// All segments, root first.
    pub fn segments(&self) -> &[String] {
        return &self.segments;
    }

    /// The trailing `len` segments as a tree path rooted at the tree root.
    pub fn suffix(&self, len: usize) -> TreePath {
        let start = self.segments.len().saturating_sub(len);
        let tail = self.segments.get(start..).unwrap_or_default();
        return TreePath::from_segments(tail.to_vec());
    }
}

impl fmt::Display for ReferencePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.raw);
    }
}

/// Full path of a node from the tree root. The empty path is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct TreePath(Vec<String>);

impl TreePath {
    /// The tree root.
    pub const fn root() -> Self {
        return Self(Vec::new());
    }

    /// Build a path from already-split segments.
    pub const fn from_segments(segments: Vec<String>) -> Self {
        return Self(segments);
    }

    /// Parse a `/`-separated path, ignoring empty segments.
    pub fn parse(text: &str) -> Self {
        return Self(
            text.split(PATH_SEPARATOR)
                .filter(|s| return !s.is_empty())
                .map(String::from)
                .collect(),
        );
    }

    /// Child path one level below this one.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        return Self(segments);
    }

    /// Number of segments; the root has depth 0.
    pub fn depth(&self) -> usize {
        return self.0.len();
    }

    /// Segments from the root down.
    pub fn segments(&self) -> &[String] {
        return &self.0;
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "{PATH_SEPARATOR}{segment}")?;
        }
        if self.0.is_empty() {
            write!(f, "{PATH_SEPARATOR}")?;
        }
        return Ok(());
    }
}

impl From<TreePath> for String {
    fn from(path: TreePath) -> Self {
        return path.to_string();
    }
}

/// One entry returned by a container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    /// False for closed projects and unreadable folders.
    pub is_accessible: bool,
    /// Whether this child is a folder or project rather than a file.
    pub is_container: bool,
    /// Entry name, a single path segment.
    pub name: String,
}

/// A file in the tree. `location` is where the host keeps its content, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileHandle {
    /// Storage location of the file content.
    pub location: Option<PathBuf>,
    /// Full path from the tree root.
    pub path: TreePath,
}

/// How a resolved file was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum MatchMethod {
    /// Several same-named files; this one had the best trailing-segment score.
    BestScore {
        /// Number of same-named files considered.
        candidates: usize,
        /// Trailing segments shared with the reference.
        score: usize,
    },
    /// The trailing `segments` of the reference exist verbatim in the tree.
    ExactSuffix {
        /// Length of the matching suffix.
        segments: usize,
    },
    /// The reference was a storage location inside the workspace.
    Location,
    /// Exactly one file in the tree carries the reference's file name.
    SingleCandidate,
}

/// Output of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    /// The chosen file.
    pub file: FileHandle,
    /// How it was chosen.
    #[serde(flatten)]
    pub method: MatchMethod,
}

/// What the caller hands over: a reference string, or a storage location
/// that may or may not live inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    /// Absolute storage location, e.g. from a `file://` revision URI.
    Location(PathBuf),
    /// URL-like or workspace-like path text.
    Path(ReferencePath),
}

/// Where to put the cursor once the file is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Positioning {
    /// Select the first occurrence of this text.
    FindString(String),
    /// Open at the start of the file.
    #[default]
    None,
    /// Go to this character offset.
    Offset(usize),
}

impl Positioning {
    /// Build positioning from a view selection: non-empty text wins over the offset.
    pub fn from_selection(text: Option<String>, offset: Option<usize>) -> Self {
        return match (text, offset) {
            (Some(text), _) if !text.is_empty() => Self::FindString(text),
            (_, Some(offset)) => Self::Offset(offset),
            _ => Self::None,
        };
    }
}

/// A single resolve-and-open request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    /// Cursor placement after opening.
    pub positioning: Positioning,
    /// What to resolve.
    pub reference: ReferenceSource,
}
