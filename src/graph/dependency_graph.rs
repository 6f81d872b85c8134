//! File-level dependency graph built on petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B" (A must re-run when B changes)
//! - **Nodes**: canonical absolute file paths, one node per path
//! - **Edges**: `Import` (found by static analysis) or `Declared` (extra-deps file)
//! - **Index**: path → node index for O(1) lookups
//!
//! Paths are used as given. Callers normalize them with [`crate::utils::to_absolute`]
//! before insertion so two spellings of one file never become two nodes.

use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
  /// Found by the graph builder
  Import,
  /// Declared in an extra-deps file
  Declared,
}

/// Dependency graph over source files.
#[derive(Debug, Default)]
pub struct DependencyGraph {
  graph: DiGraph<PathBuf, EdgeKind>,

  /// Index: path → node index
  path_to_node: HashMap<PathBuf, NodeIndex>,
}

impl DependencyGraph {
  /// Create an empty graph.
  pub fn new() -> Self {
    Self::default()
  }

  /// Get the node for `path`, inserting it if needed.
  pub fn add_node(&mut self, path: PathBuf) -> NodeIndex {
    if let Some(idx) = self.path_to_node.get(&path) {
      return *idx;
    }
    let idx = self.graph.add_node(path.clone());
    self.path_to_node.insert(path, idx);
    idx
  }

  /// Add `dependent → dependency`, creating either node if needed.
  ///
  /// Parallel edges are kept; traversal does not care about multiplicity.
  pub fn add_edge(&mut self, dependent: PathBuf, dependency: PathBuf, kind: EdgeKind) {
    let from = self.add_node(dependent);
    let to = self.add_node(dependency);
    self.graph.add_edge(from, to, kind);
  }

  /// Look up the node for a path.
  #[cfg(test)]
  pub fn find(&self, path: &Path) -> Option<NodeIndex> {
    self.path_to_node.get(path).copied()
  }

  /// Path of a node.
  pub fn format(&self, idx: NodeIndex) -> &Path {
    &self.graph[idx]
  }

  /// All nodes with their paths.
  pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Path)> + '_ {
    self
      .graph
      .node_indices()
      .map(move |idx| (idx, self.graph[idx].as_path()))
  }

  /// Direct dependents of a node (its predecessors).
  pub fn dependents(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
    self.graph.neighbors_directed(idx, Direction::Incoming)
  }

  /// True when nothing else depends on this node.
  ///
  /// A self-edge (a file declared as depending on itself) does not count.
  pub fn is_root(&self, idx: NodeIndex) -> bool {
    self.dependents(idx).all(|pred| pred == idx)
  }

  /// Number of nodes.
  pub fn node_count(&self) -> usize {
    self.graph.node_count()
  }

  /// Number of edges.
  pub fn edge_count(&self) -> usize {
    self.graph.edge_count()
  }

  /// Number of edges of the given kind.
  pub fn edge_count_of(&self, kind: EdgeKind) -> usize {
    self.graph.edge_weights().filter(|k| **k == kind).count()
  }

  /// Import cycles (strongly connected components with more than one file).
  ///
  /// Cycles are legal; this is only reported for diagnostics.
  pub fn find_cycles(&self) -> Vec<Vec<PathBuf>> {
    algo::tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| component.len() > 1)
      .map(|component| {
        let mut paths: Vec<_> = component.into_iter().map(|idx| self.graph[idx].clone()).collect();
        paths.sort();
        paths
      })
      .collect()
  }
}
