//! System git backend
//!
//! Shells out to the `git` binary with an isolated environment. Only the two
//! operations the selector needs live here: opening a repository and listing
//! the paths reported by `git diff`.

use crate::core::error::{GitError, SelectorError, SelectorResult};
use crate::utils::to_absolute;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Directory the repository was opened from
  pub(crate) repo_path: PathBuf,

  /// Working tree root (canonical)
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open the git repository whose work tree root is `path`
  ///
  /// This performs ONE subprocess call to get the repository metadata. A
  /// subdirectory of a work tree is rejected: diff paths, pathspecs and declared
  /// edges all resolve against `path`, so it has to be the root.
  pub fn open(path: &Path) -> SelectorResult<Self> {
    let repo_path = to_absolute(Path::new("."), path)?;

    let output = Self::base_cmd(&repo_path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .map_err(|e| SelectorError::message(format!("Failed to execute git rev-parse: {}", e)))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") || stderr.contains("cannot change to") {
        return Err(GitError::RepoNotFound { path: repo_path }.into());
      }
      return Err(
        GitError::CommandFailed {
          command: "git rev-parse --show-toplevel".to_string(),
          stderr: stderr.to_string(),
        }
        .into(),
      );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = to_absolute(&repo_path, Path::new(stdout.trim_end_matches(['\r', '\n'])))?;
    if work_tree != repo_path {
      debug!(repo = %repo_path.display(), work_tree = %work_tree.display(), "not the work tree root");
      return Err(GitError::RepoNotFound { path: repo_path }.into());
    }
    debug!(repo = %repo_path.display(), work_tree = %work_tree.display(), "opened git repository");

    Ok(Self { repo_path, work_tree })
  }

  /// Working tree root of the repository
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Run `git diff <args>` and return the listed paths, normalized against the work tree.
  ///
  /// `args` must already be sanitized (see [`super::diff_args::sanitize`]) so the output
  /// is NUL-terminated, unquoted paths.
  pub fn diff_names(&self, args: &[String]) -> SelectorResult<Vec<PathBuf>> {
    let output = self
      .git_cmd()
      .arg("diff")
      .args(args)
      .output()
      .map_err(|e| SelectorError::message(format!("Failed to execute git diff: {}", e)))?;

    if !output.status.success() {
      return Err(
        GitError::CommandFailed {
          command: format!("git diff {}", args.join(" ")),
          stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
        .into(),
      );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut paths = Vec::new();
    for name in stdout.split('\0').filter(|name| !name.is_empty()) {
      paths.push(to_absolute(&self.work_tree, Path::new(name))?);
    }

    debug!(count = paths.len(), args = ?args, "git diff");
    Ok(paths)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    Self::base_cmd(&self.repo_path)
  }

  fn base_cmd(repo_path: &Path) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII
    cmd.arg("-c").arg("diff.renames=false");
    cmd.arg("-c").arg("color.ui=never");

    cmd
  }
}
