//! On-disk workspace: a root directory, optionally organised into named projects.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::tree::TreeProvider;
use crate::types::{ChildEntry, FileHandle, TreePath};

/// A named directory mounted at the top level of the tree.
struct Project {
    /// Canonical directory, or the configured one if it cannot be canonicalized.
    dir: PathBuf,
    /// Top-level segment in tree paths.
    name: String,
    /// Closed projects stay listed but nothing under them exists.
    open: bool,
}

/// A tree over the local filesystem.
///
/// Without projects the root directory itself is the tree. With projects the
/// top level holds exactly the configured projects, which may overlap on disk.
pub struct Workspace {
    /// Top-level directories treated as closed when no projects are configured.
    closed: Vec<String>,
    /// Entry names hidden everywhere in the tree.
    exclude: Vec<String>,
    /// Configured projects, sorted by name.
    projects: Vec<Project>,
    /// Canonical workspace root.
    root: PathBuf,
}

impl Workspace {
    /// Open the workspace rooted at `root` using the projects and filters from `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::TreeUnavailable` if `root` does not exist or cannot be resolved.
    pub fn open(root: &Path, config: &Config) -> Result<Self, Error> {
        let root = root.canonicalize().map_err(|e| {
            return Error::TreeUnavailable { path: root.display().to_string(), reason: e.to_string() };
        })?;

        let projects = config
            .projects
            .iter()
            .map(|(name, dir)| {
                let joined = root.join(dir);
                return Project {
                    dir: joined.canonicalize().unwrap_or(joined),
                    name: name.clone(),
                    open: !config.closed.contains(name),
                };
            })
            .collect::<Vec<_>>();

        tracing::debug!(root = %root.display(), projects = projects.len(), "workspace opened");
        return Ok(Self {
            closed: config.closed.clone(),
            exclude: config.exclude.clone(),
            projects,
            root,
        });
    }

    /// Map a tree path onto the disk. `None` for closed or unknown projects,
    /// for excluded names, for segments that would leave the tree (`..`, `.`,
    /// embedded separators), and for the virtual root of a project workspace.
    fn disk_path(&self, path: &TreePath) -> Option<PathBuf> {
        if path.segments().iter().any(|s| return !is_plain_segment(s) || self.is_excluded(s)) {
            return None;
        }
        if self.projects.is_empty() {
            if path.segments().first().is_some_and(|s| return self.closed.contains(s)) {
                return None;
            }
            return Some(path.segments().iter().fold(self.root.clone(), |dir, s| return dir.join(s)));
        }

        let (first, rest) = path.segments().split_first()?;
        let project = self.projects.iter().find(|p| return p.name == *first)?;
        if !project.open {
            return None;
        }
        return Some(rest.iter().fold(project.dir.clone(), |dir, s| return dir.join(s)));
    }

    /// Whether `name` is hidden by the `exclude` list.
    fn is_excluded(&self, name: &str) -> bool {
        return self.exclude.iter().any(|e| return e == name);
    }

    /// Top level of a project workspace.
    fn list_projects(&self) -> Vec<ChildEntry> {
        return self
            .projects
            .iter()
            .map(|p| {
                return ChildEntry {
                    is_accessible: p.open && p.dir.is_dir(),
                    is_container: true,
                    name: p.name.clone(),
                };
            })
            .collect();
    }

    /// Every tree path whose disk location is `location`, in project order.
    /// Paths through excluded names are left out, as they are everywhere else.
    fn tree_paths_for(&self, location: &Path) -> Vec<TreePath> {
        let paths: Vec<TreePath> = if self.projects.is_empty() {
            relative_segments(&self.root, location)
                .filter(|segments| return segments.first().is_none_or(|s| return !self.closed.contains(s)))
                .map(TreePath::from_segments)
                .into_iter()
                .collect()
        } else {
            self.projects
                .iter()
                .filter(|p| return p.open)
                .filter_map(|p| {
                    let mut segments = relative_segments(&p.dir, location)?;
                    segments.insert(0, p.name.clone());
                    return Some(TreePath::from_segments(segments));
                })
                .collect()
        };
        return paths
            .into_iter()
            .filter(|path| return !path.segments().iter().any(|s| return self.is_excluded(s)))
            .collect();
    }
}

/// Whether `segment` names exactly one entry inside its parent directory.
fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    return matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
        && !segment.contains(std::path::MAIN_SEPARATOR);
}

/// Path components of `location` below `base`, or `None` if it lies elsewhere.
fn relative_segments(base: &Path, location: &Path) -> Option<Vec<String>> {
    let relative = location.strip_prefix(base).ok()?;
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => return Some(s.to_string_lossy().into_owned()),
            _ => return None,
        })
        .collect();
    if segments.is_empty() {
        return None;
    }
    return Some(segments);
}

impl TreeProvider for Workspace {
    fn exists_at(&self, path: &TreePath) -> bool {
        if path.depth() == 0 {
            return false;
        }
        return self.disk_path(path).is_some_and(|p| return p.is_file());
    }

    fn file_at(&self, path: &TreePath) -> FileHandle {
        return FileHandle { location: self.disk_path(path), path: path.clone() };
    }

    fn files_for_location(&self, file: &FileHandle) -> Vec<FileHandle> {
        let Some(location) = file.location.as_deref().and_then(|l| return l.canonicalize().ok()) else {
            return vec![file.clone()];
        };
        let aliases: Vec<FileHandle> = self
            .tree_paths_for(&location)
            .into_iter()
            .map(|path| return FileHandle { location: Some(location.clone()), path })
            .collect();
        if aliases.is_empty() {
            return vec![file.clone()];
        }
        return aliases;
    }

    fn handle_for_location(&self, location: &Path) -> Option<FileHandle> {
        let location = location.canonicalize().ok()?;
        if !location.is_file() {
            return None;
        }
        let path = self.tree_paths_for(&location).into_iter().next()?;
        return Some(FileHandle { location: Some(location), path });
    }

    fn list_children(&self, container: &TreePath) -> Result<Vec<ChildEntry>, Error> {
        if container.depth() == 0 && !self.projects.is_empty() {
            return Ok(self.list_projects());
        }

        let unavailable = |reason: String| {
            return Error::TreeUnavailable { path: container.to_string(), reason };
        };
        let dir = self
            .disk_path(container)
            .ok_or_else(|| return unavailable("closed or unknown project".to_string()))?;

        let mut children = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| return unavailable(e.to_string()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.is_excluded(&name) {
                continue;
            }
            let file_type = entry.file_type();
            if file_type.is_dir() {
                let is_accessible = container.depth() > 0 || !self.closed.contains(&name);
                children.push(ChildEntry { is_accessible, is_container: true, name });
            } else if file_type.is_file() || entry.path().is_file() {
                children.push(ChildEntry { is_accessible: true, is_container: false, name });
            }
        }
        return Ok(children);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use super::*;
    use crate::resolver::Resolver;
    use crate::scanner;
    use crate::types::{MatchMethod, ReferencePath};

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content\n").unwrap();
    }

    fn plain_config() -> Config {
        return Config::default();
    }

    fn project_config(projects: &[(&str, &str)], closed: &[&str]) -> Config {
        let mut config = Config::default();
        config.projects = projects
            .iter()
            .map(|(name, dir)| return ((*name).to_string(), PathBuf::from(dir)))
            .collect::<BTreeMap<_, _>>();
        config.closed = closed.iter().map(|s| return (*s).to_string()).collect();
        return config;
    }

    #[test]
    fn root_directory_is_the_tree() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "app/src/main.rs");
        touch(tmp.path(), "app/Cargo.toml");

        let ws = Workspace::open(tmp.path(), &plain_config()).unwrap();
        assert!(ws.exists_at(&TreePath::parse("app/src/main.rs")));
        assert!(!ws.exists_at(&TreePath::parse("app/src")));
        assert!(!ws.exists_at(&TreePath::parse("src/main.rs")));

        let names: Vec<String> = ws.list_children(&TreePath::parse("app")).unwrap().into_iter().map(|c| return c.name).collect();
        assert_eq!(names, ["Cargo.toml", "src"]);
    }

    #[test]
    fn excluded_names_are_hidden() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), ".git/HEAD");
        touch(tmp.path(), "HEAD");

        let ws = Workspace::open(tmp.path(), &plain_config()).unwrap();
        assert!(!ws.exists_at(&TreePath::parse(".git/HEAD")));
        let files = scanner::find_files(&ws, &TreePath::root(), Some("HEAD")).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn closed_project_contents_do_not_exist() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "legacy/src/Old.java");
        touch(tmp.path(), "core/src/Old.java");

        let config = project_config(&[("legacy", "legacy"), ("core", "core")], &["legacy"]);
        let ws = Workspace::open(tmp.path(), &config).unwrap();
        assert!(!ws.exists_at(&TreePath::parse("legacy/src/Old.java")));

        let top = ws.list_children(&TreePath::root()).unwrap();
        assert_eq!(top.len(), 2);
        assert!(top.iter().any(|c| return c.name == "legacy" && !c.is_accessible));

        let files = scanner::find_files(&ws, &TreePath::root(), Some("Old.java")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path.to_string(), "/core/src/Old.java");
    }

    #[test]
    fn nested_project_resolves_to_shallowest_alias() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "outer/inner/src/Lib.java");

        let config = project_config(&[("alpha", "outer"), ("beta", "outer/inner")], &[]);
        let ws = Workspace::open(tmp.path(), &config).unwrap();
        let reference = ReferencePath::parse("svn://host/trunk/alpha/inner/src/Lib.java").unwrap();
        let resolved = Resolver::new(&ws).resolve(&reference).unwrap().unwrap();

        assert_eq!(resolved.file.path.to_string(), "/beta/src/Lib.java");
        assert_eq!(resolved.method, MatchMethod::ExactSuffix { segments: 4 });
    }

    #[test]
    fn closed_top_level_directory_without_projects() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "old/Thing.rs");
        touch(tmp.path(), "new/Thing.rs");

        let mut config = plain_config();
        config.closed = vec!["old".to_string()];
        let ws = Workspace::open(tmp.path(), &config).unwrap();
        assert!(!ws.exists_at(&TreePath::parse("old/Thing.rs")));
        let files = scanner::find_files(&ws, &TreePath::root(), Some("Thing.rs")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path.to_string(), "/new/Thing.rs");
    }

    #[test]
    fn disk_location_maps_back_into_the_tree() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "lib/a.txt");

        let ws = Workspace::open(tmp.path(), &plain_config()).unwrap();
        let handle = ws.handle_for_location(&tmp.path().join("lib/a.txt")).unwrap();
        assert_eq!(handle.path.to_string(), "/lib/a.txt");
        assert!(ws.handle_for_location(&tmp.path().join("lib/missing.txt")).is_none());
    }

    #[test]
    fn parent_segments_never_leave_the_root() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "secret.txt");
        touch(tmp.path(), "ws/app/Main.java");
        let root = tmp.path().join("ws");

        let ws = Workspace::open(&root, &plain_config()).unwrap();
        assert!(!ws.exists_at(&TreePath::parse("../secret.txt")));
        assert!(!ws.exists_at(&TreePath::parse("app/../../secret.txt")));
        assert!(ws.list_children(&TreePath::parse("..")).is_err());

        let reference = ReferencePath::parse("repo/../secret.txt").unwrap();
        assert_eq!(Resolver::new(&ws).resolve(&reference).unwrap(), None);
    }

    #[test]
    fn parent_segments_never_leave_a_project() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "core/src/A.java");
        touch(tmp.path(), "private/key.pem");

        let config = project_config(&[("core", "core")], &[]);
        let ws = Workspace::open(tmp.path(), &config).unwrap();
        assert!(ws.exists_at(&TreePath::parse("core/src/A.java")));
        assert!(!ws.exists_at(&TreePath::parse("core/../private/key.pem")));
    }

    #[test]
    fn excluded_location_is_outside_the_tree() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), ".git/HEAD");
        touch(tmp.path(), "core/.git/config");

        let ws = Workspace::open(tmp.path(), &plain_config()).unwrap();
        assert!(ws.handle_for_location(&tmp.path().join(".git/HEAD")).is_none());

        let config = project_config(&[("core", "core")], &[]);
        let ws = Workspace::open(tmp.path(), &config).unwrap();
        assert!(ws.handle_for_location(&tmp.path().join("core/.git/config")).is_none());
    }

    #[test]
    fn missing_root_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let result = Workspace::open(&tmp.path().join("nope"), &plain_config());
        assert!(matches!(result, Err(Error::TreeUnavailable { .. })));
    }
}
