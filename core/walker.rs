use crate::config::RenderConfig;
use crate::error::Result;
use crate::patterns::PatternMatcher;
use log;
use std::collections::{BTreeSet, HashSet};
use std::path::{Component, Path};
use walkdir::{DirEntry, WalkDir};

/// Retained paths of one traversal, globally sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkResult {
    /// Every retained path, files and directories.
    pub paths: Vec<String>,
    /// Files only, after the extension allow-list.
    pub files: Vec<String>,
    pub dirs: HashSet<String>,
}

impl WalkResult {
    pub fn is_dir(&self, rel_path: &str) -> bool {
        self.dirs.contains(rel_path)
    }

    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }
}

/// `/`-separated path of `path` relative to `root`.
pub fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let rel = pathdiff::diff_paths(path, root)?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Lowercased extension of the final path component, without the dot.
pub fn extension_of(rel_path: &str) -> Option<String> {
    Path::new(rel_path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Directory, or symlink to one. Links are never followed, so a linked
/// directory is listed but not descended into.
fn is_dir_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

fn is_pruned(entry: &DirEntry, prune: &BTreeSet<&str>) -> bool {
    is_dir_entry(entry)
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| prune.contains(name))
}

/// Depth-first traversal of `root`. Pruned directories are skipped before
/// pattern matching; ignored entries are skipped and not descended into.
pub fn walk(
    root: &Path,
    matcher: &PatternMatcher,
    prune_dirs: &[String],
    render: &RenderConfig,
) -> Result<WalkResult> {
    let prune: BTreeSet<&str> = prune_dirs.iter().map(String::as_str).collect();
    log::info!("Walking project directory: {}", root.display());

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if is_pruned(entry, &prune) {
                log::trace!("Pruning directory: {}", entry.path().display());
                return false;
            }
            match relative_path(entry.path(), root) {
                Some(rel) => !matcher.is_ignored(&rel),
                None => false,
            }
        });

    let mut result = WalkResult::default();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Error walking directory: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let Some(rel) = relative_path(entry.path(), root) else {
            log::warn!("Could not get relative path for: {}", entry.path().display());
            continue;
        };

        if is_dir_entry(&entry) {
            if entry.path_is_symlink() {
                log::debug!("Listing linked directory without descending: {}", rel);
            }
            log::trace!("Including directory: {}", rel);
            result.dirs.insert(rel.clone());
        } else if render.accepts_extension(extension_of(&rel).as_deref()) {
            log::trace!("Including file: {}", rel);
            result.files.push(rel.clone());
        } else {
            log::trace!("Tree only (extension filter): {}", rel);
        }
        result.paths.push(rel);
    }

    result.paths.sort_unstable();
    result.paths.dedup();
    result.files.sort_unstable();
    result.files.dedup();
    log::info!(
        "Directory walk complete. {} paths retained ({} files selected, {} directories).",
        result.paths.len(),
        result.files.len(),
        result.dirs.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PRUNE_DIRS;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn default_prune() -> Vec<String> {
        DEFAULT_PRUNE_DIRS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sorts_paths_and_marks_directories() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "b.txt", "b");
        write(temp.path(), "a.txt", "a");
        write(temp.path(), "sub/zz.md", "z");

        let result = walk(
            temp.path(),
            &PatternMatcher::default(),
            &default_prune(),
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(result.paths, vec!["a.txt", "b.txt", "sub", "sub/zz.md"]);
        assert_eq!(result.files, vec!["a.txt", "b.txt", "sub/zz.md"]);
        assert!(result.is_dir("sub"));
        assert_eq!(result.dir_count(), 1);
    }

    #[test]
    fn pruned_directories_never_appear() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "node_modules/pkg/index.js", "x");
        write(temp.path(), "lib/.git/HEAD", "ref");
        write(temp.path(), "lib/mod.rs", "fn a() {}");

        let result = walk(
            temp.path(),
            &PatternMatcher::default(),
            &default_prune(),
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(result.paths, vec!["lib", "lib/mod.rs"]);
    }

    #[test]
    fn ignored_directories_are_not_descended() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "logs/app.txt", "x");
        write(temp.path(), "keep.txt", "x");
        let matcher = PatternMatcher::from_lines(["logs"]);

        let result = walk(
            temp.path(),
            &matcher,
            &default_prune(),
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(result.paths, vec!["keep.txt"]);
    }

    #[test]
    fn extension_filter_keeps_tree_entries() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "a.py", "print(1)");
        write(temp.path(), "b.js", "1");
        write(temp.path(), "Makefile", "all:");
        let mut render = RenderConfig::default();
        render.extensions.insert("py".into());

        let result = walk(temp.path(), &PatternMatcher::default(), &[], &render).unwrap();
        assert_eq!(result.paths, vec!["Makefile", "a.py", "b.js"]);
        assert_eq!(result.files, vec!["a.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn linked_directory_is_listed_but_not_descended() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "real/a.py", "x = 1");
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

        let result = walk(
            temp.path(),
            &PatternMatcher::default(),
            &default_prune(),
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(result.paths, vec!["link", "real", "real/a.py"]);
        assert_eq!(result.files, vec!["real/a.py"]);
        assert!(result.is_dir("link"));
        assert_eq!(result.dir_count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn linked_directory_named_like_a_pruned_one_is_dropped() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "vendor/pkg/index.js", "x");
        std::os::unix::fs::symlink(temp.path().join("vendor"), temp.path().join("node_modules"))
            .unwrap();

        let result = walk(
            temp.path(),
            &PatternMatcher::default(),
            &default_prune(),
            &RenderConfig::default(),
        )
        .unwrap();
        assert!(!result.paths.iter().any(|p| p == "node_modules"));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/project");
        assert_eq!(
            relative_path(Path::new("/project/src/main.rs"), root),
            Some("src/main.rs".to_string())
        );
        assert_eq!(relative_path(root, root), None);
        assert_eq!(extension_of("src/Main.PY").as_deref(), Some("py"));
        assert_eq!(extension_of("Makefile"), None);
        assert_eq!(extension_of(".gitignore"), None);
    }
}
