//! Change-impact test selection
//!
//! Composes the pieces into the one operation the CLI and runner integrations
//! call: diff the repository, build the dependency graph from the test entry
//! files, add declared edges, and collect the roots impacted by the change.

use crate::core::error::SelectorResult;
use crate::core::vcs::SystemGit;
use crate::core::vcs::diff_args::{self, CHANGED_FILES_ARGS, DELETED_FILES_ARGS};
use crate::graph::{EdgeKind, ExtraDependencyEdge, GraphBuilder, build_graph, find_impacted_roots, merge_extra_edges};
use crate::utils::{to_absolute, to_absolute_all};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything a selection run needs
#[derive(Debug, Clone)]
pub struct SelectionRequest {
  /// Project root; the repository is opened here and declared edges resolve against it
  pub base_dir: PathBuf,

  /// Raw `git diff` arguments (revision ranges, filters, pathspecs)
  pub diff_args: Vec<String>,

  /// Test files or directories containing them
  pub test_paths: Vec<PathBuf>,

  /// Import search roots, in lookup order
  pub search_roots: Vec<PathBuf>,

  /// Manually declared dependencies
  pub extra_deps: Vec<ExtraDependencyEdge>,
}

/// Result of a selection run
#[derive(Debug, Clone, Default)]
pub struct Selection {
  /// Impacted roots, canonical absolute paths
  pub selected: BTreeSet<PathBuf>,

  /// Every path reported by the diff
  pub changed_files: Vec<PathBuf>,

  /// Paths the diff reports as deleted
  pub deleted_files: Vec<PathBuf>,

  pub stats: GraphStats,
}

/// Size of the graph the selection was computed on
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphStats {
  pub entry_files: usize,
  pub nodes: usize,
  pub import_edges: usize,
  pub declared_edges: usize,
}

/// Select the roots impacted by the change described in `request`.
///
/// Diff arguments are validated before the repository is touched. Any error from
/// git or from `builder` is returned as-is; deleted-file placeholders are cleaned
/// up either way.
pub fn select(request: &SelectionRequest, builder: &dyn GraphBuilder) -> SelectorResult<Selection> {
  let changed_args = diff_args::sanitize(&request.diff_args, CHANGED_FILES_ARGS)?;
  let deleted_args = diff_args::sanitize(&request.diff_args, DELETED_FILES_ARGS)?;
  debug!(changed = ?changed_args, deleted = ?deleted_args, "sanitized diff args");

  let base_dir = to_absolute(Path::new("."), &request.base_dir)?;
  let repo = SystemGit::open(&base_dir)?;
  debug!(work_tree = %repo.work_tree().display(), "diffing repository");

  let changed_files = repo.diff_names(&changed_args)?;
  let deleted_files = repo.diff_names(&deleted_args)?;
  info!(
    changed = changed_files.len(),
    deleted = deleted_files.len(),
    "collected changed files"
  );

  let test_paths = to_absolute_all(&base_dir, &request.test_paths)?;
  let search_roots = to_absolute_all(&base_dir, &request.search_roots)?;
  let entry_files = builder.expand_entries(&test_paths)?;

  let mut graph = build_graph(builder, &entry_files, &search_roots, &deleted_files)?;
  merge_extra_edges(&mut graph, &base_dir, &request.extra_deps)?;

  let cycles = graph.find_cycles();
  if !cycles.is_empty() {
    debug!(count = cycles.len(), "import cycles in dependency graph");
  }

  let changed: HashSet<&Path> = changed_files.iter().map(PathBuf::as_path).collect();
  let selected = find_impacted_roots(&graph, &changed);
  info!(selected = selected.len(), nodes = graph.node_count(), "selection complete");

  Ok(Selection {
    selected,
    stats: GraphStats {
      entry_files: entry_files.len(),
      nodes: graph.node_count(),
      import_edges: graph.edge_count_of(EdgeKind::Import),
      declared_edges: graph.edge_count_of(EdgeKind::Declared),
    },
    changed_files,
    deleted_files,
  })
}
