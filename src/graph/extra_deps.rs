//! Manually declared dependencies
//!
//! Some dependencies are invisible to import analysis, e.g. a test reading a CSV
//! fixture. They are declared in a plain text file as whitespace-separated
//! `(dependent,dependency)` tokens (no space after the comma):
//!
//! ```text
//! (test/test_h.py,test/test_h_modulo_inputs.csv)
//! (pkg/f/f_1.py,pkg/f/f_1.txt) (pkg/g.py,pkg/g.json)
//! ```

use super::dependency_graph::{DependencyGraph, EdgeKind};
use crate::core::error::{ArgumentError, ResultExt, SelectorResult};
use crate::utils::to_absolute;
use std::fs;
use std::path::{Path, PathBuf};

/// `dependent` must re-run when `dependency` changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraDependencyEdge {
  pub dependent: PathBuf,
  pub dependency: PathBuf,
}

impl ExtraDependencyEdge {
  pub fn new(dependent: impl Into<PathBuf>, dependency: impl Into<PathBuf>) -> Self {
    Self {
      dependent: dependent.into(),
      dependency: dependency.into(),
    }
  }
}

/// Parse the contents of an extra-deps file.
pub fn parse_extra_deps(content: &str) -> SelectorResult<Vec<ExtraDependencyEdge>> {
  let mut edges = Vec::new();

  for (line_no, line) in content.lines().enumerate() {
    for token in line.split_whitespace() {
      let inner = token.trim_matches(|c| c == '(' || c == ')');
      let malformed = || ArgumentError::MalformedExtraDependency {
        line: line_no + 1,
        token: token.to_string(),
      };

      let (dependent, dependency) = inner.split_once(',').ok_or_else(malformed)?;
      if dependent.is_empty() || dependency.is_empty() || dependency.contains(',') {
        return Err(malformed().into());
      }

      edges.push(ExtraDependencyEdge::new(dependent, dependency));
    }
  }

  Ok(edges)
}

/// Read and parse an extra-deps file.
pub fn load_extra_deps_file(path: &Path) -> SelectorResult<Vec<ExtraDependencyEdge>> {
  let content =
    fs::read_to_string(path).with_context(|| format!("Failed to read extra deps file {}", path.display()))?;
  parse_extra_deps(&content)
}

/// Add every declared edge to `graph`.
///
/// Relative endpoints resolve against `base_dir` (the project root), never the
/// process working directory. Edges are added as-is, even when import analysis
/// already found the same dependency. Returns the number of edges added.
pub fn merge_extra_edges(
  graph: &mut DependencyGraph,
  base_dir: &Path,
  edges: &[ExtraDependencyEdge],
) -> SelectorResult<usize> {
  for edge in edges {
    let dependent = to_absolute(base_dir, &edge.dependent)?;
    let dependency = to_absolute(base_dir, &edge.dependency)?;
    graph.add_edge(dependent, dependency, EdgeKind::Declared);
  }
  Ok(edges.len())
}
