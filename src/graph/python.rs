//! Python import graph
//!
//! Default [`GraphBuilder`]: scans `import` / `from ... import` statements with
//! regexes and resolves them to files under the search roots, the way the Python
//! interpreter would with those roots on `sys.path`.
//!
//! Imports that do not resolve to a file under a search root (standard library,
//! installed packages) are not part of the project and are skipped.

use super::builder::GraphBuilder;
use super::dependency_graph::{DependencyGraph, EdgeKind};
use crate::core::error::{GraphError, SelectorError, SelectorResult};
use crate::utils::to_absolute;
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const SOURCE_EXTENSION: &str = "py";
const PACKAGE_INIT: &str = "__init__.py";

/// One import statement target.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Import {
  /// Leading dots of a relative import (0 = absolute)
  level: usize,
  /// Dotted module path, empty for `from . import x`
  module: String,
  /// Names after `from ... import`; empty for plain `import`
  names: Vec<String>,
}

/// Regex-based Python import scanner.
pub struct PythonImportGraph {
  import_re: Regex,
  from_re: Regex,
}

impl PythonImportGraph {
  pub fn new() -> SelectorResult<Self> {
    let compile = |pattern: &str| {
      Regex::new(pattern).map_err(|e| SelectorError::message(format!("Invalid import pattern: {}", e)))
    };

    Ok(Self {
      import_re: compile(r"^import\s+(.+)$")?,
      from_re: compile(r"^from\s+(\.*)\s*([\w.]*)\s+import\s+(.+)$")?,
    })
  }

  /// Extract import targets from Python source.
  fn scan(&self, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();

    for statement in logical_statements(source) {
      if let Some(caps) = self.import_re.captures(&statement) {
        for part in caps[1].split(',') {
          if let Some(module) = part.split_whitespace().next() {
            imports.push(Import {
              level: 0,
              module: module.to_string(),
              names: vec![],
            });
          }
        }
      } else if let Some(caps) = self.from_re.captures(&statement) {
        let names = caps[3]
          .trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace())
          .split(',')
          .filter_map(|part| part.split_whitespace().next())
          .filter(|name| *name != "*")
          .map(str::to_string)
          .collect();

        imports.push(Import {
          level: caps[1].len(),
          module: caps[2].to_string(),
          names,
        });
      }
    }

    imports
  }

  /// Files an import statement depends on.
  fn resolve(&self, import: &Import, importer: &Path, search_roots: &[PathBuf]) -> Vec<PathBuf> {
    let bases: Vec<PathBuf> = if import.level == 0 {
      search_roots.to_vec()
    } else {
      let mut base = importer.parent().map(Path::to_path_buf).unwrap_or_default();
      for _ in 1..import.level {
        base.pop();
      }
      vec![base]
    };

    let mut deps = package_inits(&bases, &import.module);

    let mut resolved_names = 0;
    for name in &import.names {
      let submodule = if import.module.is_empty() {
        name.clone()
      } else {
        format!("{}.{}", import.module, name)
      };
      if let Some(path) = resolve_module(&bases, &submodule) {
        deps.push(path);
        resolved_names += 1;
      }
    }

    // `import x` or `from x import attr`: the module itself
    if resolved_names < import.names.len() || import.names.is_empty() {
      deps.extend(resolve_module(&bases, &import.module));
    }

    deps
  }
}

impl GraphBuilder for PythonImportGraph {
  fn expand_entries(&self, paths: &[PathBuf]) -> SelectorResult<Vec<PathBuf>> {
    let mut entries = Vec::new();

    for path in paths {
      if path.is_file() {
        entries.push(path.clone());
      } else if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name() {
          let entry = entry?;
          if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            entries.push(to_absolute(path, entry.path())?);
          }
        }
      } else {
        warn!(path = %path.display(), "test path does not exist, skipping");
      }
    }

    entries.sort();
    entries.dedup();
    Ok(entries)
  }

  fn build(&self, entry_files: &[PathBuf], search_roots: &[PathBuf]) -> SelectorResult<DependencyGraph> {
    let mut graph = DependencyGraph::new();
    let mut queue = VecDeque::new();
    let mut seen = HashSet::new();

    for entry in entry_files {
      graph.add_node(entry.clone());
      if seen.insert(entry.clone()) {
        queue.push_back(entry.clone());
      }
    }

    while let Some(file) = queue.pop_front() {
      let bytes = fs::read(&file).map_err(|source| GraphError::UnreadableSource {
        path: file.clone(),
        source,
      })?;
      let source = String::from_utf8_lossy(&bytes);

      for import in self.scan(&source) {
        let deps = self.resolve(&import, &file, search_roots);
        if deps.is_empty() {
          debug!(file = %file.display(), module = %import.module, "unresolved import, skipping");
        }

        for dep in deps {
          if dep == file {
            continue;
          }
          graph.add_edge(file.clone(), dep.clone(), EdgeKind::Import);
          if seen.insert(dep.clone()) {
            queue.push_back(dep);
          }
        }
      }
    }

    Ok(graph)
  }
}

/// `a.b` → `<base>/a/b.py` or `<base>/a/b/__init__.py`, first base wins.
fn resolve_module(bases: &[PathBuf], dotted: &str) -> Option<PathBuf> {
  let relative: PathBuf = dotted.split('.').filter(|part| !part.is_empty()).collect();

  for base in bases {
    let dir = base.join(&relative);
    let candidates = if relative.as_os_str().is_empty() {
      vec![dir.join(PACKAGE_INIT)]
    } else {
      vec![dir.with_extension(SOURCE_EXTENSION), dir.join(PACKAGE_INIT)]
    };

    for candidate in candidates {
      if candidate.is_file() {
        return to_absolute(base, &candidate).ok();
      }
    }
  }

  None
}

/// `__init__.py` of every enclosing package of `a.b.c` (`a`, `a.b`); importing a
/// module executes them.
fn package_inits(bases: &[PathBuf], dotted: &str) -> Vec<PathBuf> {
  let parts: Vec<&str> = dotted.split('.').filter(|part| !part.is_empty()).collect();
  (1..parts.len())
    .filter_map(|depth| {
      let relative: PathBuf = parts[..depth].iter().collect();
      bases.iter().find_map(|base| {
        let init = base.join(&relative).join(PACKAGE_INIT);
        init.is_file().then(|| to_absolute(base, &init).ok()).flatten()
      })
    })
    .collect()
}

/// Import statements as single trimmed lines.
///
/// Comments are stripped, `;`-separated statements split, and statements continued
/// with a trailing backslash or an open parenthesis are joined. Only statements
/// starting with `import` or `from` are kept.
fn logical_statements(source: &str) -> Vec<String> {
  let mut statements = Vec::new();
  let mut pending: Option<String> = None;

  for raw in source.lines() {
    let line = raw.split('#').next().unwrap_or("").trim();

    if let Some(mut current) = pending.take() {
      let (body, backslash) = strip_continuation(line);
      current.push(' ');
      current.push_str(body);
      if backslash || (current.contains('(') && !current.contains(')')) {
        pending = Some(current);
      } else {
        statements.push(current);
      }
      continue;
    }

    for part in line.split(';').map(str::trim) {
      if !(part.starts_with("import ") || part.starts_with("from ")) {
        continue;
      }
      let (body, backslash) = strip_continuation(part);
      if backslash || (body.contains('(') && !body.contains(')')) {
        pending = Some(body.to_string());
      } else {
        statements.push(body.to_string());
      }
    }
  }

  statements.extend(pending);
  statements
}

fn strip_continuation(line: &str) -> (&str, bool) {
  match line.strip_suffix('\\') {
    Some(body) => (body.trim_end(), true),
    None => (line, false),
  }
}
