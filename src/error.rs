/// Crate-level error types for wsopen diagnostics.
use std::path::PathBuf;

/// All errors in wsopen carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the reference, path, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicitly requested config file does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// The external editor could not be started or exited unsuccessfully.
    #[error("editor `{program}` failed: {reason}")]
    EditorFailed {
        /// Program name from the editor template.
        program: String,
        /// Spawn error or exit status.
        reason: String,
    },

    /// The reference text contains no path segments.
    #[error("empty reference: `{raw}`")]
    EmptyReference {
        /// The text as received.
        raw: String,
    },

    /// The config parsed as TOML but its values are unusable.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// What is wrong with it.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// No workspace file matches the reference.
    #[error("no workspace file found for `{reference}`")]
    NotFound {
        /// The reference that could not be resolved.
        reference: String,
    },

    /// A character offset lies past the end of the file.
    #[error("offset {offset} is past the end of {} ({length} characters)", file.display())]
    OffsetOutOfRange {
        /// File that was opened.
        file: PathBuf,
        /// File length in characters.
        length: usize,
        /// Requested offset.
        offset: usize,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A container of the tree cannot be listed.
    #[error("tree unavailable at {path}: {reason}")]
    TreeUnavailable {
        /// Tree path of the container.
        path: String,
        /// Why the listing failed.
        reason: String,
    },
}
