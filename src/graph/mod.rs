//! File-level dependency analysis
//!
//! Built on petgraph. A [`GraphBuilder`] produces the static import graph,
//! declared edges are merged in, and [`find_impacted_roots`] walks it backwards
//! from the changed files.

pub mod builder;
pub mod dependency_graph;
pub mod extra_deps;
pub mod impact;
pub mod python;

pub use builder::{GraphBuilder, build_graph, install_interrupt_cleanup};
pub use dependency_graph::{DependencyGraph, EdgeKind};
pub use extra_deps::{ExtraDependencyEdge, load_extra_deps_file, merge_extra_edges};
pub use impact::find_impacted_roots;
pub use python::PythonImportGraph;
