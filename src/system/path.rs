//! Synthetic directory tree and parameter lookup.
//!
//! There is no real filesystem. The root holds a fixed set of directory
//! names; `/bin` lists the commands, `/dev` the parameters, and everything
//! else is an empty folder kept so the tree looks familiar.

use core::fmt;

use super::param::Parameter;

/// Directory names under `/`, in listing order.
pub const DIRECTORIES: [&str; 10] = [
    "bin", "dev", "etc", "proc", "sbin", "var", "lib", "sys", "tmp", "usr",
];

/// Directory that lists the command table.
pub const BIN: &str = "bin";
/// Directory that lists the parameter table.
pub const DEV: &str = "dev";

/// A directory of the synthetic tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    /// `/`
    #[default]
    Root,
    /// `/<name>` for a member of [`DIRECTORIES`].
    Dir(&'static str),
}

impl Location {
    /// `true` for `/`.
    pub fn is_root(&self) -> bool {
        matches!(self, Location::Root)
    }

    /// `true` for the directory named `name`.
    pub fn is(&self, name: &str) -> bool {
        matches!(self, Location::Dir(dir) if *dir == name)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Root => f.write_str("/"),
            Location::Dir(name) => write!(f, "/{}", name),
        }
    }
}

/// How a leaf name is compared against parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// Names must be equal.
    Exact,
    /// The parameter name must start with the leaf.
    Prefix,
}

/// Resolve `path` to a directory, relative to `cwd`.
///
/// Outside the root the only relative form understood is `..`, optionally
/// followed by `/<dir>`. Only the first segment of an absolute path is
/// looked at.
///
/// ```rust
/// use paramshell::system::path::{resolve_directory, Location};
///
/// let dev = Location::Dir("dev");
/// assert_eq!(resolve_directory("/dev", Location::Root), Some(dev));
/// assert_eq!(resolve_directory("..", dev), Some(Location::Root));
/// assert_eq!(resolve_directory("bogus", Location::Root), None);
/// ```
pub fn resolve_directory(path: &str, cwd: Location) -> Option<Location> {
    let mut fallback = None;
    let mut rest = path;

    if !cwd.is_root() && !rest.starts_with('/') {
        rest = rest.strip_prefix("..")?;
        if rest.is_empty() {
            fallback = Some(Location::Root);
        } else if !rest.starts_with('/') {
            return None;
        }
    }

    if let Some(stripped) = rest.strip_prefix('/') {
        if stripped.is_empty() {
            fallback = Some(Location::Root);
        }
        rest = stripped;
    }

    let segment = rest.split('/').next().unwrap_or("");
    if !segment.is_empty() {
        if let Some(name) = DIRECTORIES.iter().copied().find(|&name| name == segment) {
            return Some(Location::Dir(name));
        }
    }
    fallback
}

/// Text after the last `/`.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Find the first parameter at or after `start` that `path` names.
///
/// The directory part of `path` falls back to `cwd` when it does not resolve;
/// anything outside `/dev` never matches.
pub fn resolve_parameter(
    params: &[Parameter<'_>],
    path: &str,
    cwd: Location,
    mode: Match,
    start: usize,
) -> Option<usize> {
    let dir = resolve_directory(path, cwd).unwrap_or(cwd);
    if !dir.is(DEV) {
        return None;
    }

    let leaf = file_name(path);
    params
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, param)| match mode {
            Match::Exact => param.name == leaf,
            Match::Prefix => param.name.starts_with(leaf),
        })
        .map(|(index, _)| index)
}
