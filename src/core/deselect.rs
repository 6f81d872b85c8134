//! Test-runner integration port
//!
//! A runner collects test items, hands their file paths to the selector and
//! deselects what was not selected. This module is that hand-off, independent of
//! any particular runner's plugin API.

use crate::utils::to_absolute;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

const ARGS_DELIMITER: &str = "--";

/// Split a runner's arguments at the first `--`.
///
/// Returns the runner arguments and, when a delimiter is present, the `git diff`
/// arguments after it. `Some(vec![])` means the delimiter was given with nothing
/// after it (diff the working tree); `None` means selection is off.
pub fn split_at_delimiter<S: AsRef<str>>(args: &[S]) -> (Vec<String>, Option<Vec<String>>) {
  let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
  match args.iter().position(|a| a == ARGS_DELIMITER) {
    Some(idx) => {
      let diff_args = args[idx + 1..].to_vec();
      let mut runner_args = args;
      runner_args.truncate(idx);
      (runner_args, Some(diff_args))
    }
    None => (args, None),
  }
}

/// Anything a runner collected that lives in a file.
pub trait CollectedItem {
  /// Canonical absolute path of the file defining the item
  fn path(&self) -> &Path;
}

/// A collected test item identified by a node id such as `test/test_f.py::test_one`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestItem {
  pub id: String,
  path: PathBuf,
}

impl TestItem {
  /// Parse a node id; the file part (before `::`) resolves against `base_dir`.
  pub fn parse(base_dir: &Path, id: &str) -> io::Result<Self> {
    let file = id.split_once("::").map_or(id, |(file, _)| file);
    Ok(Self {
      id: id.to_string(),
      path: to_absolute(base_dir, Path::new(file))?,
    })
  }

  /// Parse one node id per non-blank line.
  pub fn parse_all(base_dir: &Path, content: &str) -> io::Result<Vec<Self>> {
    content
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(|line| Self::parse(base_dir, line))
      .collect()
  }
}

impl CollectedItem for TestItem {
  fn path(&self) -> &Path {
    &self.path
  }
}

/// Items split by whether their file was selected
#[derive(Debug)]
pub struct SelectionReport<'a, T> {
  pub selected: Vec<&'a T>,
  pub deselected: Vec<&'a T>,
}

/// Partition `items` by `selected`. With no selection (no diff arguments given)
/// every item stays selected.
pub fn report_selection<'a, T: CollectedItem>(
  items: &'a [T],
  selected: Option<&BTreeSet<PathBuf>>,
) -> SelectionReport<'a, T> {
  let Some(selected) = selected else {
    return SelectionReport {
      selected: items.iter().collect(),
      deselected: vec![],
    };
  };

  let (selected, deselected) = items.iter().partition(|item| selected.contains(item.path()));
  SelectionReport { selected, deselected }
}
