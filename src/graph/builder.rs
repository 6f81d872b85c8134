//! Graph construction with deleted-file placeholders
//!
//! Static analysis only sees files that exist. A file deleted by the diff must
//! still become a graph node, or the tests that imported it would never be
//! selected. [`build_graph`] therefore restores every deleted path as an empty
//! file for the duration of the build and removes it again on every exit path,
//! interrupts included.

use super::dependency_graph::DependencyGraph;
use crate::core::error::{GraphError, SelectorError, SelectorResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Swappable static-analysis backend.
pub trait GraphBuilder {
  /// Expand user-supplied test paths (files or directories) into entry files.
  ///
  /// Paths that do not exist are skipped.
  fn expand_entries(&self, paths: &[PathBuf]) -> SelectorResult<Vec<PathBuf>>;

  /// Build the dependency graph reachable from `entry_files`, resolving imports
  /// against `search_roots` in order.
  fn build(&self, entry_files: &[PathBuf], search_roots: &[PathBuf]) -> SelectorResult<DependencyGraph>;
}

/// Build a graph with `deleted_files` temporarily restored as empty placeholders.
pub fn build_graph(
  builder: &dyn GraphBuilder,
  entry_files: &[PathBuf],
  search_roots: &[PathBuf],
  deleted_files: &[PathBuf],
) -> SelectorResult<DependencyGraph> {
  let placeholders = Placeholders::materialize(deleted_files)?;
  let created = placeholders.files().len();
  if created > 0 {
    debug!(count = created, "materialized deleted files");
  }
  let result = builder.build(entry_files, search_roots);
  drop(placeholders);

  let graph = result?;
  debug!(
    nodes = graph.node_count(),
    edges = graph.edge_count(),
    "built dependency graph"
  );
  Ok(graph)
}

/// Exit status after an interrupt, the way shells report SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Placeholder sets of every live guard
static LIVE: Mutex<Vec<Arc<Mutex<Created>>>> = Mutex::new(Vec::new());

/// Remove live placeholders before the process dies from SIGINT, SIGTERM or SIGHUP.
///
/// Drop never runs when a signal terminates the process, so the handler removes
/// whatever the live guards created and exits with [`INTERRUPTED_EXIT_CODE`].
/// Guards stay locked until exit so nothing new is created after the sweep.
pub fn install_interrupt_cleanup() -> SelectorResult<()> {
  ctrlc::set_handler(|| {
    let live = lock(&LIVE);
    let mut held: Vec<MutexGuard<'_, Created>> = live.iter().map(|created| lock(created)).collect();
    for created in held.iter_mut() {
      created.remove_all();
    }
    std::process::exit(INTERRUPTED_EXIT_CODE);
  })
  .map_err(|e| SelectorError::message(format!("Failed to install interrupt handler: {}", e)))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Paths one guard created
#[derive(Debug, Default)]
struct Created {
  files: Vec<PathBuf>,
  /// Outermost first
  dirs: Vec<PathBuf>,
}

impl Created {
  /// Remove everything and forget it; a second call is a no-op.
  fn remove_all(&mut self) {
    for file in self.files.drain(..) {
      if let Err(e) = fs::remove_file(&file) {
        warn!(path = %file.display(), error = %e, "failed to remove placeholder");
      }
    }
    for dir in self.dirs.drain(..).rev() {
      // Only succeeds while empty; anything else written there is left alone
      if let Err(e) = fs::remove_dir(&dir) {
        warn!(path = %dir.display(), error = %e, "failed to remove placeholder directory");
      }
    }
  }

  fn create_parents(&mut self, path: &Path) -> SelectorResult<()> {
    let mut missing: Vec<&Path> = path
      .ancestors()
      .skip(1)
      .take_while(|dir| !dir.as_os_str().is_empty() && fs::symlink_metadata(dir).is_err())
      .collect();
    missing.reverse();

    for dir in missing {
      fs::create_dir(dir).map_err(|source| GraphError::Placeholder {
        path: path.to_path_buf(),
        source,
      })?;
      self.dirs.push(dir.to_path_buf());
    }
    Ok(())
  }
}

/// Empty files (and directories) standing in for deleted paths.
///
/// Everything created is removed on drop, including when construction fails part
/// way or the build panics, and by [`install_interrupt_cleanup`] when the process
/// is interrupted. Paths that already exist are never touched.
#[derive(Debug)]
pub struct Placeholders {
  created: Arc<Mutex<Created>>,
}

impl Placeholders {
  /// Create a placeholder for every path in `deleted` that is missing on disk.
  pub fn materialize(deleted: &[PathBuf]) -> SelectorResult<Self> {
    let guard = Self::register();
    guard.create_all(deleted)?;
    Ok(guard)
  }

  /// Files created by this guard.
  pub fn files(&self) -> Vec<PathBuf> {
    lock(&self.created).files.clone()
  }

  fn register() -> Self {
    let created = Arc::new(Mutex::new(Created::default()));
    lock(&LIVE).push(Arc::clone(&created));
    Self { created }
  }

  fn create_all(&self, deleted: &[PathBuf]) -> SelectorResult<()> {
    // Held across each creation so the interrupt handler never misses a path
    let mut created = lock(&self.created);

    for path in deleted {
      if fs::symlink_metadata(path).is_ok() {
        debug!(path = %path.display(), "deleted path exists on disk, no placeholder");
        continue;
      }

      created.create_parents(path)?;
      fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| GraphError::Placeholder {
          path: path.clone(),
          source,
        })?;
      debug!(path = %path.display(), "created placeholder");
      created.files.push(path.clone());
    }
    Ok(())
  }
}

impl Drop for Placeholders {
  fn drop(&mut self) {
    lock(&self.created).remove_all();
    lock(&LIVE).retain(|created| !Arc::ptr_eq(created, &self.created));
  }
}
