//! `git-select-tests` - Print the tests impacted by a change
//!
//! Resolves options against the CLI, then the project config, then defaults,
//! runs the selection and prints the result. With `--collected` the result is
//! applied to a list of collected test items instead, the way a test-runner
//! plugin would deselect them.

use crate::core::config::{DEFAULT_SRC_PATHS, SelectorConfig};
use crate::core::deselect::{CollectedItem, TestItem, report_selection};
use crate::core::error::{ConfigError, ResultExt, SelectorError, SelectorResult};
use crate::core::select::{Selection, SelectionRequest, select};
use crate::graph::{GraphBuilder, PythonImportGraph, load_extra_deps_file};
use crate::utils::{to_absolute, to_absolute_all};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output format for the select command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
  Paths,
  Json,
}

impl OutputFormat {
  fn from_str(s: &str) -> SelectorResult<Self> {
    match s.to_lowercase().as_str() {
      "paths" => Ok(Self::Paths),
      "json" => Ok(Self::Json),
      _ => Err(SelectorError::with_help(
        format!("Unknown format '{}'", s),
        "Valid formats: paths, json",
      )),
    }
  }
}

/// Options as given on the command line. Paths are relative to the working directory.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
  pub dir: PathBuf,
  pub test_paths: Vec<PathBuf>,
  pub src_paths: Vec<PathBuf>,
  pub extra_deps_file: Option<PathBuf>,
  pub format: String,
  /// File listing collected test items, `-` for stdin
  pub collected: Option<PathBuf>,
}

/// Options after merging CLI, config and defaults; all paths absolute.
#[derive(Debug)]
struct ResolvedOptions {
  base_dir: PathBuf,
  test_paths: Vec<PathBuf>,
  src_paths: Vec<PathBuf>,
  extra_deps_file: Option<PathBuf>,
}

/// Run the select command
///
/// `diff_args` is `None` when no `--` delimiter was given. A plain run then diffs
/// the working tree; a `--collected` run keeps every item.
pub fn run_select(options: SelectOptions, diff_args: Option<Vec<String>>) -> SelectorResult<()> {
  let format = OutputFormat::from_str(&options.format)?;
  let builder = PythonImportGraph::new()?;

  match &options.collected {
    Some(source) => run_collected(&options, source, diff_args, format, &builder),
    None => {
      let resolved = resolve_options(&options)?;
      let test_paths = require_test_paths(resolved.test_paths.clone())?;
      let selection = run_selection(&resolved, test_paths, diff_args.unwrap_or_default(), &builder)?;
      display_selection(&selection, format)
    }
  }
}

/// Merge CLI flags with the project config.
fn resolve_options(options: &SelectOptions) -> SelectorResult<ResolvedOptions> {
  let cwd = std::env::current_dir().context("Failed to read current directory")?;
  let base_dir = to_absolute(&cwd, &options.dir)?;
  let config = SelectorConfig::load(&base_dir)?.unwrap_or_default().select;

  let test_paths = if !options.test_paths.is_empty() {
    to_absolute_all(&cwd, &options.test_paths)?
  } else {
    to_absolute_all(&base_dir, &config.test_paths)?
  };

  let src_paths = if !options.src_paths.is_empty() {
    to_absolute_all(&cwd, &options.src_paths)?
  } else if !config.src_paths.is_empty() {
    to_absolute_all(&base_dir, &config.src_paths)?
  } else {
    to_absolute_all(&base_dir, DEFAULT_SRC_PATHS)?
  };

  let extra_deps_file = match (&options.extra_deps_file, &config.extra_deps_file) {
    (Some(path), _) => Some(to_absolute(&cwd, path)?),
    (None, Some(path)) => Some(to_absolute(&base_dir, path)?),
    (None, None) => None,
  };

  Ok(ResolvedOptions {
    base_dir,
    test_paths,
    src_paths,
    extra_deps_file,
  })
}

fn require_test_paths(test_paths: Vec<PathBuf>) -> SelectorResult<Vec<PathBuf>> {
  if test_paths.is_empty() {
    return Err(ConfigError::MissingTestPaths.into());
  }
  Ok(test_paths)
}

fn run_selection(
  resolved: &ResolvedOptions,
  test_paths: Vec<PathBuf>,
  diff_args: Vec<String>,
  builder: &dyn GraphBuilder,
) -> SelectorResult<Selection> {
  let extra_deps = match &resolved.extra_deps_file {
    Some(path) => load_extra_deps_file(path)?,
    None => vec![],
  };

  let request = SelectionRequest {
    base_dir: resolved.base_dir.clone(),
    diff_args,
    test_paths,
    search_roots: resolved.src_paths.clone(),
    extra_deps,
  };
  select(&request, builder)
}

/// Apply the selection to collected test items.
fn run_collected(
  options: &SelectOptions,
  source: &Path,
  diff_args: Option<Vec<String>>,
  format: OutputFormat,
  builder: &dyn GraphBuilder,
) -> SelectorResult<()> {
  let resolved = resolve_options(options)?;
  let content = read_collected(source)?;
  let items = TestItem::parse_all(&resolved.base_dir, &content)?;

  let selection = match diff_args {
    Some(diff_args) => {
      // Without explicit test paths the collected files are the entry points
      let test_paths = if resolved.test_paths.is_empty() {
        let files: BTreeSet<PathBuf> = items.iter().map(|item| item.path().to_path_buf()).collect();
        files.into_iter().collect()
      } else {
        resolved.test_paths.clone()
      };
      Some(run_selection(&resolved, test_paths, diff_args, builder)?.selected)
    }
    None => {
      info!("no diff arguments, keeping all collected items");
      None
    }
  };

  let report = report_selection(&items, selection.as_ref());
  eprintln!("Deselected {} of {} collected items", report.deselected.len(), items.len());

  match format {
    OutputFormat::Paths => {
      for item in &report.selected {
        println!("{}", item.id);
      }
    }
    OutputFormat::Json => {
      use serde_json::json;

      let selected: Vec<_> = report.selected.iter().map(|item| &item.id).collect();
      let deselected: Vec<_> = report.deselected.iter().map(|item| &item.id).collect();
      let output = json!({
          "selected": selected,
          "deselected": deselected,
          "summary": {
              "collected_count": items.len(),
              "selected_count": selected.len(),
              "deselected_count": deselected.len()
          }
      });
      println!("{}", serde_json::to_string_pretty(&output)?);
    }
  }

  Ok(())
}

fn read_collected(source: &Path) -> SelectorResult<String> {
  if source == Path::new("-") {
    return io::read_to_string(io::stdin()).context("Failed to read collected items from stdin");
  }
  fs::read_to_string(source).with_context(|| format!("Failed to read collected items from {}", source.display()))
}

/// Display selection results
fn display_selection(selection: &Selection, format: OutputFormat) -> SelectorResult<()> {
  match format {
    OutputFormat::Paths => display_paths(selection),
    OutputFormat::Json => display_json(selection),
  }
}

/// One selected path per line
fn display_paths(selection: &Selection) -> SelectorResult<()> {
  for path in &selection.selected {
    println!("{}", path.display());
  }
  Ok(())
}

/// Display results in JSON format
fn display_json(selection: &Selection) -> SelectorResult<()> {
  use serde_json::json;

  let output = json!({
      "selected": selection.selected,
      "changed_files": selection.changed_files,
      "deleted_files": selection.deleted_files,
      "summary": {
          "selected_count": selection.selected.len(),
          "changed_files_count": selection.changed_files.len(),
          "deleted_files_count": selection.deleted_files.len(),
          "entry_files_count": selection.stats.entry_files,
          "graph_nodes": selection.stats.nodes,
          "import_edges": selection.stats.import_edges,
          "declared_edges": selection.stats.declared_edges
      }
  });

  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}
