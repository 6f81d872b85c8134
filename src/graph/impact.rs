//! Impacted-root analysis
//!
//! Given a set of changed files, find every root of the dependency graph (a file
//! nothing else depends on, typically a test) that depends on one of them,
//! directly or transitively.
//!
//! Algorithm:
//! 1. Seed a worklist with every graph node whose path is in the change set
//! 2. Walk incoming edges (dependent direction), marking nodes visited
//! 3. Every visited node without dependents is an impacted root
//!
//! A single visited set is shared by all seeds. The result is a union, so a node
//! reached from one changed file contributes nothing new when reached again from
//! another; this is what makes the walk O(V + E) and terminate on import cycles.

use super::dependency_graph::DependencyGraph;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Roots of `graph` that transitively depend on any path in `changed`.
///
/// A changed root is its own impacted root. Paths in `changed` that are not graph
/// nodes are ignored; an empty change set or an empty graph gives an empty result.
pub fn find_impacted_roots<P>(graph: &DependencyGraph, changed: &HashSet<P>) -> BTreeSet<PathBuf>
where
  P: std::borrow::Borrow<Path> + Eq + std::hash::Hash,
{
  let mut roots = BTreeSet::new();
  if changed.is_empty() {
    return roots;
  }

  let mut stack: Vec<_> = graph
    .nodes()
    .filter(|(_, path)| changed.contains(*path))
    .map(|(idx, _)| idx)
    .collect();
  let mut visited = HashSet::new();

  while let Some(node_idx) = stack.pop() {
    if !visited.insert(node_idx) {
      continue;
    }

    if graph.is_root(node_idx) {
      roots.insert(graph.format(node_idx).to_path_buf());
      continue;
    }

    stack.extend(graph.dependents(node_idx).filter(|idx| !visited.contains(idx)));
  }

  roots
}
