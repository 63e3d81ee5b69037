use std::ops::ControlFlow;

use crate::error::Error;
use crate::scanner;
use crate::tiebreak::{TieBreak, TieBreakPolicy};
use crate::tree::TreeProvider;
use crate::types::{FileHandle, MatchMethod, ReferencePath, ReferenceSource, Resolved, TreePath};

/// Finds the one workspace file a foreign reference most likely means.
///
/// Holds only borrowed, read-only state, so one resolver can serve any number
/// of calls and concurrent resolvers need no coordination.
pub struct Resolver<'a, T: ?Sized, B = TieBreakPolicy> {
    /// Stop the name search at the first candidate that matches every reference segment.
    early_exit: bool,
    /// Visited-node cap for the name search.
    max_visited: Option<usize>,
    /// Used whenever several files are equally good.
    tie_break: B,
    /// The tree to search.
    tree: &'a T,
}

impl<'a, T: TreeProvider + ?Sized> Resolver<'a, T> {
    /// Resolver with the default shallowest-path tie-break, no cap, no early exit.
    pub fn new(tree: &'a T) -> Self {
        return Self {
            early_exit: false,
            max_visited: None,
            tie_break: TieBreakPolicy::default(),
            tree,
        };
    }
}

impl<'a, T, B> Resolver<'a, T, B>
where
    T: TreeProvider + ?Sized,
    B: TieBreak,
{
    /// Replace the tie-break strategy.
    pub fn with_tie_break<C: TieBreak>(self, tie_break: C) -> Resolver<'a, T, C> {
        return Resolver {
            early_exit: self.early_exit,
            max_visited: self.max_visited,
            tie_break,
            tree: self.tree,
        };
    }

    /// Enable or disable stopping the name search at a full-length match.
    #[must_use]
    pub const fn with_early_exit(mut self, early_exit: bool) -> Self {
        self.early_exit = early_exit;
        return self;
    }

    /// Cap the number of nodes the name search may visit.
    #[must_use]
    pub const fn with_max_visited(mut self, max_visited: Option<usize>) -> Self {
        self.max_visited = max_visited;
        return self;
    }

    /// Resolve a reference path. `Ok(None)` means nothing in the tree matches.
    ///
    /// Tries trailing suffixes of the reference from the file name outward and
    /// returns the first that exists; otherwise searches the whole tree for the
    /// file name and scores same-named files by trailing-segment agreement.
    ///
    /// # Errors
    ///
    /// Returns `Error::TreeUnavailable` if the tree root cannot be listed.
    pub fn resolve(&self, reference: &ReferencePath) -> Result<Option<Resolved>, Error> {
        if let Some(resolved) = self.probe_suffixes(reference) {
            return Ok(Some(resolved));
        }
        tracing::debug!(reference = %reference, "no suffix exists, searching by file name");
        return self.search_by_file_name(reference);
    }

    /// Resolve either a reference path or a storage location.
    /// Locations outside the tree are resolved by their path text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TreeUnavailable` if the tree root cannot be listed,
    /// or `Error::EmptyReference` if a location has no usable path segments.
    pub fn resolve_source(&self, source: &ReferenceSource) -> Result<Option<Resolved>, Error> {
        match source {
            ReferenceSource::Path(reference) => return self.resolve(reference),
            ReferenceSource::Location(location) => {
                if let Some(file) = self.tree.handle_for_location(location) {
                    let file = self.pick_alias(&file);
                    tracing::debug!(location = %location.display(), file = %file.path, "location is inside the tree");
                    return Ok(Some(Resolved { file, method: MatchMethod::Location }));
                }
                let text = location.to_string_lossy().replace('\\', "/");
                tracing::debug!(location = %location.display(), "location is outside the tree");
                return self.resolve(&ReferencePath::parse(&text)?);
            },
        }
    }

    /// Step A: the narrowest existing suffix wins, starting with the bare file name.
    fn probe_suffixes(&self, reference: &ReferencePath) -> Option<Resolved> {
        for len in 1..=reference.segments().len() {
            let path = reference.suffix(len);
            if !self.tree.exists_at(&path) {
                continue;
            }
            let file = self.pick_alias(&self.tree.file_at(&path));
            tracing::debug!(suffix = %path, file = %file.path, "suffix exists");
            return Some(Resolved { file, method: MatchMethod::ExactSuffix { segments: len } });
        }
        return None;
    }

    /// The same storage may appear under several tree paths; let the tie-break choose.
    fn pick_alias(&self, file: &FileHandle) -> FileHandle {
        let aliases = self.tree.files_for_location(file);
        if aliases.len() > 1 {
            tracing::debug!(file = %file.path, aliases = aliases.len(), "file has several tree paths");
        }
        return self.tie_break.pick(&aliases).cloned().unwrap_or_else(|| return file.clone());
    }

    /// Step B: gather same-named files and keep the best-scoring one.
    ///
    /// # Errors
    ///
    /// Returns `Error::TreeUnavailable` if the tree root cannot be listed.
    fn search_by_file_name(&self, reference: &ReferencePath) -> Result<Option<Resolved>, Error> {
        let full = reference.segments().len();
        let mut scored: Vec<(FileHandle, usize)> = Vec::new();

        scanner::visit_files(
            self.tree,
            &TreePath::root(),
            Some(reference.file_name()),
            self.max_visited,
            |file| {
                let score = match_score(&file.path, reference.segments());
                scored.push((file, score));
                if self.early_exit && score == full {
                    return ControlFlow::Break(());
                }
                return ControlFlow::Continue(());
            },
        )?;

        let candidates = scored.len();
        tracing::debug!(reference = %reference, candidates, "name search finished");

        if candidates <= 1 {
            return Ok(scored
                .pop()
                .map(|(file, _)| return Resolved { file, method: MatchMethod::SingleCandidate }));
        }

        let best = scored.iter().map(|(_, score)| return *score).max().unwrap_or(0);
        let tied: Vec<FileHandle> = scored
            .into_iter()
            .filter(|(_, score)| return *score == best)
            .map(|(file, _)| return file)
            .collect();
        if tied.len() > 1 {
            tracing::debug!(score = best, tied = tied.len(), "several candidates share the best score");
        }

        return Ok(self.tie_break.pick(&tied).cloned().map(|file| {
            return Resolved { file, method: MatchMethod::BestScore { candidates, score: best } };
        }));
    }
}

/// Count trailing segments of `candidate` equal to the trailing segments of
/// `reference`, stopping at the first disagreement.
pub fn match_score(candidate: &TreePath, reference: &[String]) -> usize {
    return candidate
        .segments()
        .iter()
        .rev()
        .zip(reference.iter().rev())
        .take_while(|(c, r)| return c == r)
        .count();
}
