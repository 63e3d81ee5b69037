use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::tiebreak::TieBreakPolicy;

/// File name of the workspace config, looked up in the workspace root.
pub const CONFIG_FILE: &str = ".wsopen.toml";

/// Workspace configuration loaded from `.wsopen.toml`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Project names that are listed but closed.
    pub closed: Vec<String>,
    /// Stop the name search at the first candidate matching every reference segment.
    pub early_exit: bool,
    /// Editor command template; `{path}`, `{line}`, `{column}` and `{offset}` are substituted.
    pub editor: Vec<String>,
    /// Entry names hidden from the tree.
    pub exclude: Vec<String>,
    /// Visited-node cap for the name search.
    pub max_visited: Option<usize>,
    /// Scored matches below this many agreeing segments are treated as not found.
    pub min_score: Option<usize>,
    /// Project name to directory, relative to the workspace root.
    pub projects: BTreeMap<String, PathBuf>,
    /// Strategy for equally good matches.
    pub tie_break: TieBreakPolicy,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            closed: Vec::new(),
            early_exit: false,
            editor: Vec::new(),
            exclude: vec![".git".to_string()],
            max_visited: None,
            min_score: None,
            projects: BTreeMap::new(),
            tie_break: TieBreakPolicy::default(),
        };
    }
}

impl Config {
    /// Load config from `explicit` if given, else from `.wsopen.toml` in `root`.
    /// A missing default file yields defaults; a missing explicit file is an error.
    /// A file that exists but is malformed is an error, never replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` for a missing explicit path,
    /// `Error::Io` if reading fails, `Error::TomlDe` if the TOML is malformed,
    /// or `Error::InvalidConfig` if the values contradict each other.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, Error> {
        let path = explicit.map_or_else(|| return root.join(CONFIG_FILE), Path::to_path_buf);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if explicit.is_some() {
                    return Err(Error::ConfigNotFound { path });
                }
                return Ok(Self::default());
            },
            Err(e) => return Err(Error::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        return Ok(config);
    }

    /// Parse and validate config text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed,
    /// or `Error::InvalidConfig` if the values contradict each other.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        return Ok(config);
    }

    /// Reject values that would make every lookup fail in a confusing way.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` describing the first problem found.
    fn validate(&self) -> Result<(), Error> {
        if self.max_visited == Some(0) {
            return Err(Error::InvalidConfig { reason: "max_visited must be at least 1".to_string() });
        }
        if let Some(name) = self.closed.iter().find(|n| return !self.projects.is_empty() && !self.projects.contains_key(*n)) {
            return Err(Error::InvalidConfig { reason: format!("closed project `{name}` is not in [projects]") });
        }
        if let Some(name) = self.projects.keys().find(|n| return n.is_empty() || n.contains('/')) {
            return Err(Error::InvalidConfig { reason: format!("project name `{name}` must be a single path segment") });
        }
        if self.editor.first().is_some_and(String::is_empty) {
            return Err(Error::InvalidConfig { reason: "editor program is empty".to_string() });
        }
        return Ok(());
    }
}
