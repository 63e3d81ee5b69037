//! Choosing one file among equally good matches.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::FileHandle;

/// Picks one file out of several that the resolver cannot tell apart.
pub trait TieBreak {
    /// Return one element of `tied`, or `None` only when `tied` is empty.
    fn pick<'a>(&self, tied: &'a [FileHandle]) -> Option<&'a FileHandle>;
}

/// Built-in strategies, selectable from the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreakPolicy {
    /// The first file in traversal order.
    FirstSeen,
    /// The file whose tree path sorts first, segment by segment.
    Lexicographic,
    /// The file with the fewest path segments; first seen among equals.
    #[default]
    Shallowest,
}

impl TieBreak for TieBreakPolicy {
    fn pick<'a>(&self, tied: &'a [FileHandle]) -> Option<&'a FileHandle> {
        return match self {
            Self::FirstSeen => tied.first(),
            Self::Lexicographic => Comparator(|a: &FileHandle, b: &FileHandle| return a.path.cmp(&b.path)).pick(tied),
            Self::Shallowest => {
                Comparator(|a: &FileHandle, b: &FileHandle| return a.path.depth().cmp(&b.path.depth())).pick(tied)
            },
        };
    }
}

/// Caller-supplied ordering; the smallest file wins, first seen among equals.
pub struct Comparator<F>(pub F);

impl<F> TieBreak for Comparator<F>
where
    F: Fn(&FileHandle, &FileHandle) -> Ordering,
{
    fn pick<'a>(&self, tied: &'a [FileHandle]) -> Option<&'a FileHandle> {
        return first_minimum(tied, &self.0);
    }
}

/// Smallest element under `cmp`, keeping the earliest on ties.
/// `Iterator::min_by` keeps the last, which would make traversal order irrelevant.
fn first_minimum<'a, C>(items: &'a [FileHandle], cmp: C) -> Option<&'a FileHandle>
where
    C: Fn(&FileHandle, &FileHandle) -> Ordering,
{
    let mut iter = items.iter();
    let mut best = iter.next()?;
    for item in iter {
        if cmp(item, best) == Ordering::Less {
            best = item;
        }
    }
    return Some(best);
}
