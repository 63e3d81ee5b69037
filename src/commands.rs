//! CLI commands for wsopen: resolve, open, compare, history, scan.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Error;
use crate::locate;
use crate::opener::{CommandOpener, Opener, PrintOpener};
use crate::resolver::Resolver;
use crate::scanner;
use crate::types::{MatchMethod, OpenRequest, PATH_SEPARATOR, Positioning, ReferencePath, ReferenceSource, Resolved, TreePath};
use crate::workspace::Workspace;

/// URI scheme of revision locators that point at local storage.
const FILE_SCHEME: &str = "file://";

/// Loaded config plus the workspace tree it describes.
pub struct Context {
    /// Workspace configuration.
    config: Config,
    /// The tree references are resolved against.
    workspace: Workspace,
}

impl Context {
    /// Load config and open the workspace under `root`.
    ///
    /// # Errors
    ///
    /// Returns config loading errors, or `Error::TreeUnavailable` if `root` is missing.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self, Error> {
        let config = Config::load(root, config_path)?;
        let workspace = Workspace::open(root, &config)?;
        return Ok(Self { config, workspace });
    }

    /// Resolver over the workspace with the configured search options.
    fn resolver(&self) -> Resolver<'_, Workspace> {
        return Resolver::new(&self.workspace)
            .with_tie_break(self.config.tie_break)
            .with_early_exit(self.config.early_exit)
            .with_max_visited(self.config.max_visited);
    }

    /// The configured editor, or a printer on stdout.
    fn opener(&self) -> Box<dyn Opener> {
        if self.config.editor.is_empty() {
            return Box::new(PrintOpener::new(std::io::stdout()));
        }
        return Box::new(CommandOpener::new(self.config.editor.clone()));
    }

    /// Resolve and apply the low-confidence policy: a scored pick below
    /// `min_score` counts as not found.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when nothing acceptable matches,
    /// or `Error::TreeUnavailable` if the workspace root cannot be listed.
    fn resolve_accepted(&self, source: &ReferenceSource) -> Result<Resolved, Error> {
        let not_found = || return Error::NotFound { reference: describe(source) };
        let resolved = self.resolver().resolve_source(source)?.ok_or_else(not_found)?;

        if let (MatchMethod::BestScore { score, candidates }, Some(min)) = (&resolved.method, self.config.min_score)
            && *score < min
        {
            tracing::warn!(score, candidates, min_score = min, file = %resolved.file.path, "best match rejected as too weak");
            return Err(not_found());
        }
        return Ok(resolved);
    }
}

/// Interpret a command-line reference: `file://` URIs and `--location` paths
/// are storage locations, everything else is reference path text.
///
/// # Errors
///
/// Returns `Error::EmptyReference` if the text has no path segments.
pub fn parse_source(text: &str, as_location: bool) -> Result<ReferenceSource, Error> {
    if let Some(rest) = text.strip_prefix(FILE_SCHEME) {
        return Ok(ReferenceSource::Location(PathBuf::from(rest)));
    }
    if as_location {
        return Ok(ReferenceSource::Location(PathBuf::from(text)));
    }
    return Ok(ReferenceSource::Path(ReferencePath::parse(text)?));
}

/// Reference text for messages.
fn describe(source: &ReferenceSource) -> String {
    return match source {
        ReferenceSource::Location(location) => location.display().to_string(),
        ReferenceSource::Path(reference) => reference.raw().to_string(),
    };
}

/// Resolve one reference and print where it lives, or its details as JSON.
///
/// # Errors
///
/// Returns `Error::NotFound` if nothing matches, or errors from resolution or output.
pub fn resolve(ctx: &Context, reference: &str, as_location: bool, json: bool) -> Result<(), Error> {
    let source = parse_source(reference, as_location)?;
    let resolved = ctx
        .resolver()
        .resolve_source(&source)?
        .ok_or_else(|| return Error::NotFound { reference: describe(&source) })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    tracing::info!(method = ?resolved.method, "resolved {reference}");
    match &resolved.file.location {
        Some(location) => println!("{}", location.display()),
        None => println!("{}", resolved.file.path),
    }
    return Ok(());
}

/// Resolve a request and hand the file to the configured opener.
///
/// # Errors
///
/// Returns `Error::NotFound`, positioning errors, or opener failures.
pub fn open(ctx: &Context, request: &OpenRequest) -> Result<(), Error> {
    let mut opener = ctx.opener();
    return open_with(ctx, request, opener.as_mut());
}

/// Resolve, position and open one request with an existing opener.
fn open_with(ctx: &Context, request: &OpenRequest, opener: &mut dyn Opener) -> Result<(), Error> {
    let resolved = ctx.resolve_accepted(&request.reference)?;
    let Some(path) = resolved.file.location.as_deref() else {
        return Err(Error::NotFound { reference: describe(&request.reference) });
    };

    let location = locate::locate(path, &request.positioning)?;
    tracing::info!(file = %resolved.file.path, line = location.line, column = location.column, "opening");
    return opener.open(&location);
}

/// Open both sides of a comparison. The right side is opened only when its file
/// name differs from the left's; otherwise both sides are the same workspace file.
///
/// # Errors
///
/// Returns the first failure from either side.
pub fn compare(ctx: &Context, left: &str, right: &str, positioning: &Positioning) -> Result<(), Error> {
    let mut opener = ctx.opener();
    let left_request = OpenRequest { positioning: positioning.clone(), reference: parse_source(left, false)? };
    open_with(ctx, &left_request, opener.as_mut())?;

    if file_name(left) == file_name(right) {
        tracing::debug!(left, right, "both sides name the same file");
        return Ok(());
    }
    let right_request = OpenRequest { positioning: positioning.clone(), reference: parse_source(right, false)? };
    return open_with(ctx, &right_request, opener.as_mut());
}

/// Last non-empty `/` segment of reference text.
pub fn file_name(reference: &str) -> &str {
    return reference
        .split(PATH_SEPARATOR)
        .rfind(|s| return !s.is_empty())
        .unwrap_or_default();
}

/// Open a changed path from a history view, given as its directory and resource name.
///
/// # Errors
///
/// Returns `Error::NotFound`, positioning errors, or opener failures.
pub fn history(ctx: &Context, resource_path: &str, resource_name: &str, positioning: Positioning) -> Result<(), Error> {
    let joined = format!("{resource_path}{PATH_SEPARATOR}{resource_name}");
    let request = OpenRequest { positioning, reference: ReferenceSource::Path(ReferencePath::parse(&joined)?) };
    return open(ctx, &request);
}

/// List workspace files below `under` (the whole tree by default),
/// optionally only those with an exact file name.
///
/// # Errors
///
/// Returns `Error::TreeUnavailable` if `under` cannot be listed.
pub fn scan(ctx: &Context, under: Option<&str>, name: Option<&str>) -> Result<(), Error> {
    let root = under.map_or_else(TreePath::root, TreePath::parse);
    let files = scanner::find_files(&ctx.workspace, &root, name)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for file in &files {
        writeln!(out, "{}", file.path)?;
    }
    tracing::info!(count = files.len(), root = %root, "scan complete");
    return Ok(());
}
