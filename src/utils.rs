//! Path normalization shared by every subsystem
//!
//! Diff output, graph nodes, extra-deps declarations and CLI paths are all
//! compared by value, so they must all go through [`to_absolute`] first.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolve `path` against `base_dir` into a canonical absolute path.
///
/// A relative `base_dir` is itself resolved against the process working directory.
/// Symlinks, `.` and `..` are collapsed. The path does not need to exist: the longest
/// existing prefix is canonicalized and the rest is collapsed lexically, so the result
/// is a fixed point (`to_absolute(b, to_absolute(b, p)) == to_absolute(b, p)`).
pub fn to_absolute(base_dir: &Path, path: &Path) -> io::Result<PathBuf> {
  let base = if base_dir.is_absolute() {
    base_dir.to_path_buf()
  } else {
    std::env::current_dir()?.join(base_dir)
  };

  // join() replaces base entirely when path is absolute
  Ok(canonicalize_lenient(&base.join(path)))
}

/// Normalize every path in `paths` against `base_dir`.
pub fn to_absolute_all<P: AsRef<Path>>(base_dir: &Path, paths: &[P]) -> io::Result<Vec<PathBuf>> {
  paths.iter().map(|p| to_absolute(base_dir, p.as_ref())).collect()
}

/// Component-wise canonicalization that tolerates missing files.
///
/// `resolved` is kept canonical after every step, so popping it for `..` walks
/// the physical parent even when an earlier component was a symlink.
fn canonicalize_lenient(path: &Path) -> PathBuf {
  let mut resolved = PathBuf::new();

  for component in path.components() {
    match component {
      Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
      Component::CurDir => {}
      Component::ParentDir => {
        resolved.pop();
      }
      Component::Normal(name) => {
        let candidate = resolved.join(name);
        resolved = fs::canonicalize(&candidate).unwrap_or(candidate);
      }
    }
  }

  resolved
}
