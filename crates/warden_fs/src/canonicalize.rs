use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Total symlink hops allowed across one resolution, not per component.
pub const SYMLINK_BUDGET: usize = 40;

/// Failures while normalizing a raw path.
///
/// Every variant surfaces to callers of the filter facade as a deny; the
/// `Display` strings are the deny reasons.
#[derive(Debug, Error)]
pub enum CanonError {
    #[error("symlink loop/too deep")]
    SymlinkLoop,

    #[error("unresolvable base directory")]
    UnresolvableBase,

    #[error("permission denied during resolution")]
    PermissionDenied,

    #[error("path resolution failed: {0}")]
    Other(io::Error),
}

impl From<io::Error> for CanonError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => CanonError::PermissionDenied,
            _ => CanonError::Other(error),
        }
    }
}

impl crate::WardenFS {
    /// Normalize `raw` to an absolute path with `~`, `..` and symlinks
    /// resolved.
    ///
    /// `~` expands against `home`; a path still relative afterwards is
    /// anchored at `base`. Missing either anchor fails with
    /// [`CanonError::UnresolvableBase`].
    ///
    /// Symlinks are resolved component-wise, left to right, against a
    /// budget of [`SYMLINK_BUDGET`] hops. `..` segments collapse after each
    /// symlink step, so a link to `/a/b` followed by `..` lands in `/a`,
    /// not in the link's parent.
    ///
    /// A missing final component is tolerated: the result is the canonical
    /// deepest existing prefix joined with it, which lets writes to
    /// not-yet-existing files be evaluated. A missing intermediate
    /// component is an error.
    pub fn canonicalize(
        raw: &str,
        home: Option<&Path>,
        base: Option<&Path>,
    ) -> Result<PathBuf, CanonError> {
        let expanded = expand_tilde(raw, home)?;

        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            match base {
                Some(base) if base.is_absolute() => base.join(expanded),
                _ => return Err(CanonError::UnresolvableBase),
            }
        };

        walk(&absolute)
    }
}

fn expand_tilde(raw: &str, home: Option<&Path>) -> Result<PathBuf, CanonError> {
    if raw == "~" {
        return home.map(Path::to_path_buf).ok_or(CanonError::UnresolvableBase);
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return home.map(|h| h.join(rest)).ok_or(CanonError::UnresolvableBase);
    }
    Ok(PathBuf::from(raw))
}

/// Resolve components left to right against the live filesystem.
fn walk(path: &Path) -> Result<PathBuf, CanonError> {
    let mut resolved = PathBuf::from("/");
    let mut queue: VecDeque<OsString> = VecDeque::new();
    enqueue_back(&mut queue, path);

    let mut hops = 0usize;
    while let Some(component) = queue.pop_front() {
        if component == ".." {
            resolved.pop();
            continue;
        }

        let candidate = resolved.join(&component);
        match fs::symlink_metadata(&candidate) {
            Ok(meta) if meta.file_type().is_symlink() => {
                hops += 1;
                if hops > SYMLINK_BUDGET {
                    return Err(CanonError::SymlinkLoop);
                }
                let target = fs::read_link(&candidate).map_err(CanonError::from)?;
                if target.is_absolute() {
                    resolved = PathBuf::from("/");
                }
                enqueue_front(&mut queue, &target);
            }
            Ok(_) => resolved.push(&component),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                if queue.is_empty() {
                    return Ok(candidate);
                }
                return Err(CanonError::Other(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("missing intermediate component {}", candidate.display()),
                )));
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok(resolved)
}

/// Walkable components of a path: `.` and the root are dropped, `..` is
/// kept for post-symlink collapse.
fn components_of(path: &Path) -> Vec<OsString> {
    path.components()
        .filter_map(|component| match component {
            Component::RootDir | Component::Prefix(_) | Component::CurDir => None,
            Component::ParentDir => Some(OsString::from("..")),
            Component::Normal(name) => Some(name.to_os_string()),
        })
        .collect()
}

fn enqueue_back(queue: &mut VecDeque<OsString>, path: &Path) {
    queue.extend(components_of(path));
}

fn enqueue_front(queue: &mut VecDeque<OsString>, path: &Path) {
    for component in components_of(path).into_iter().rev() {
        queue.push_front(component);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    #[cfg(unix)]
    use std::os::unix::fs::symlink;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::WardenFS;

    /// Temp dir with its own path already canonical, so expectations
    /// compare cleanly.
    fn fixture_dir() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let canonical = fs::canonicalize(dir.path()).unwrap();
        (dir, canonical)
    }

    #[test]
    fn test_tilde_expands_against_home() {
        let (_guard, home) = fixture_dir();
        fs::write(home.join("notes.txt"), "x").unwrap();

        let actual = WardenFS::canonicalize("~/notes.txt", Some(&home), None).unwrap();

        assert_eq!(actual, home.join("notes.txt"));
    }

    #[test]
    fn test_tilde_without_home_fails() {
        let actual = WardenFS::canonicalize("~/notes.txt", None, None);

        assert!(matches!(actual, Err(CanonError::UnresolvableBase)));
    }

    #[test]
    fn test_relative_resolves_against_base() {
        let (_guard, base) = fixture_dir();
        fs::create_dir(base.join("src")).unwrap();
        fs::write(base.join("src/main.rs"), "x").unwrap();

        let actual = WardenFS::canonicalize("src/main.rs", None, Some(&base)).unwrap();

        assert_eq!(actual, base.join("src/main.rs"));
    }

    #[test]
    fn test_relative_without_base_fails() {
        let actual = WardenFS::canonicalize("src/main.rs", None, None);

        assert!(matches!(actual, Err(CanonError::UnresolvableBase)));
    }

    #[test]
    fn test_relative_base_is_rejected() {
        let actual = WardenFS::canonicalize("main.rs", None, Some(Path::new("src")));

        assert!(matches!(actual, Err(CanonError::UnresolvableBase)));
    }

    #[test]
    fn test_missing_leaf_is_tolerated() {
        let (_guard, dir) = fixture_dir();

        let raw = dir.join("not-yet.txt");
        let actual = WardenFS::canonicalize(raw.to_str().unwrap(), None, None).unwrap();

        assert_eq!(actual, dir.join("not-yet.txt"));
    }

    #[test]
    fn test_missing_intermediate_fails() {
        let (_guard, dir) = fixture_dir();

        let raw = dir.join("missing/child.txt");
        let actual = WardenFS::canonicalize(raw.to_str().unwrap(), None, None);

        assert!(matches!(actual, Err(CanonError::Other(_))));
    }

    #[test]
    fn test_dot_dot_collapses_lexically() {
        let (_guard, dir) = fixture_dir();
        fs::create_dir_all(dir.join("a/b")).unwrap();
        fs::write(dir.join("a/file.txt"), "x").unwrap();

        let raw = dir.join("a/b/../file.txt");
        let actual = WardenFS::canonicalize(raw.to_str().unwrap(), None, None).unwrap();

        assert_eq!(actual, dir.join("a/file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_resolves_to_target() {
        let (_guard, dir) = fixture_dir();
        fs::create_dir(dir.join("real")).unwrap();
        fs::write(dir.join("real/data.txt"), "x").unwrap();
        symlink(dir.join("real"), dir.join("link")).unwrap();

        let raw = dir.join("link/data.txt");
        let actual = WardenFS::canonicalize(raw.to_str().unwrap(), None, None).unwrap();

        assert_eq!(actual, dir.join("real/data.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_dot_dot_applies_after_symlink_step() {
        // link -> a/b, so link/.. must land in a, not in the link's parent.
        let (_guard, dir) = fixture_dir();
        fs::create_dir_all(dir.join("a/b")).unwrap();
        symlink(dir.join("a/b"), dir.join("link")).unwrap();

        let raw = dir.join("link/../sibling.txt");
        let actual = WardenFS::canonicalize(raw.to_str().unwrap(), None, None).unwrap();

        assert_eq!(actual, dir.join("a/sibling.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_symlink_resolves_against_parent() {
        let (_guard, dir) = fixture_dir();
        fs::create_dir(dir.join("real")).unwrap();
        fs::write(dir.join("real/data.txt"), "x").unwrap();
        symlink("real", dir.join("link")).unwrap();

        let raw = dir.join("link/data.txt");
        let actual = WardenFS::canonicalize(raw.to_str().unwrap(), None, None).unwrap();

        assert_eq!(actual, dir.join("real/data.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_exhausts_budget() {
        let (_guard, dir) = fixture_dir();
        symlink(dir.join("b"), dir.join("a")).unwrap();
        symlink(dir.join("a"), dir.join("b")).unwrap();

        let raw = dir.join("a/file.txt");
        let actual = WardenFS::canonicalize(raw.to_str().unwrap(), None, None);

        assert!(matches!(actual, Err(CanonError::SymlinkLoop)));
    }

    #[cfg(unix)]
    #[test]
    fn test_deep_symlink_chain_exhausts_budget() {
        let (_guard, dir) = fixture_dir();
        fs::write(dir.join("end"), "x").unwrap();
        symlink(dir.join("end"), dir.join("hop49")).unwrap();
        for i in (0..49).rev() {
            symlink(dir.join(format!("hop{}", i + 1)), dir.join(format!("hop{i}"))).unwrap();
        }

        let raw = dir.join("hop0");
        let actual = WardenFS::canonicalize(raw.to_str().unwrap(), None, None);

        assert!(matches!(actual, Err(CanonError::SymlinkLoop)));
    }

    #[cfg(unix)]
    #[test]
    fn test_chain_within_budget_resolves() {
        let (_guard, dir) = fixture_dir();
        fs::write(dir.join("end"), "x").unwrap();
        symlink(dir.join("end"), dir.join("hop9")).unwrap();
        for i in (0..9).rev() {
            symlink(dir.join(format!("hop{}", i + 1)), dir.join(format!("hop{i}"))).unwrap();
        }

        let raw = dir.join("hop0");
        let actual = WardenFS::canonicalize(raw.to_str().unwrap(), None, None).unwrap();

        assert_eq!(actual, dir.join("end"));
    }

    #[test]
    fn test_canonicalization_fixed_point() {
        let (_guard, dir) = fixture_dir();
        fs::create_dir(dir.join("a")).unwrap();
        fs::write(dir.join("a/f.txt"), "x").unwrap();

        let raw = dir.join("a/./f.txt");
        let once = WardenFS::canonicalize(raw.to_str().unwrap(), None, None).unwrap();
        let twice = WardenFS::canonicalize(once.to_str().unwrap(), None, None).unwrap();

        assert_eq!(twice, once);
    }

    #[test]
    fn test_leading_dot_dot_stops_at_root() {
        let actual = WardenFS::canonicalize("/../../tmp", None, None).unwrap();

        assert_eq!(actual, PathBuf::from("/tmp"));
    }
}
