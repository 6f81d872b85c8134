//! Error types for git-select-tests with contextual messages and exit codes
//!
//! Every failure is categorized so the CLI can pick an exit code and, where it
//! can, tell the user what to do next.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for git-select-tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, rejected diff args, malformed extra deps)
  User = 1,
  /// System error (git, I/O, graph construction)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for git-select-tests
#[derive(Debug)]
pub enum SelectorError {
  /// Git repository / diff errors
  Git(GitError),

  /// Rejected or malformed user input
  Argument(ArgumentError),

  /// Configuration errors
  Config(ConfigError),

  /// Dependency graph construction errors
  Graph(GraphError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl SelectorError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    SelectorError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    SelectorError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Generic messages gain the context line and bare I/O errors become a message
  /// led by the context. Categorized errors are returned unchanged so callers can
  /// still match on them.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      SelectorError::Message { message, context, help } => SelectorError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      SelectorError::Io(e) => SelectorError::Message {
        message: ctx_str,
        context: Some(e.to_string()),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      SelectorError::Git(_) => ExitCode::System,
      SelectorError::Argument(_) => ExitCode::User,
      SelectorError::Config(_) => ExitCode::User,
      SelectorError::Graph(_) => ExitCode::System,
      SelectorError::Io(_) => ExitCode::System,
      SelectorError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      SelectorError::Git(e) => e.help_message(),
      SelectorError::Argument(e) => e.help_message(),
      SelectorError::Config(e) => e.help_message(),
      SelectorError::Graph(e) => e.help_message(),
      SelectorError::Message { help, .. } => help.clone(),
      SelectorError::Io(_) => None,
    }
  }
}

impl fmt::Display for SelectorError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SelectorError::Git(e) => write!(f, "{}", e),
      SelectorError::Argument(e) => write!(f, "{}", e),
      SelectorError::Config(e) => write!(f, "{}", e),
      SelectorError::Graph(e) => write!(f, "{}", e),
      SelectorError::Io(e) => write!(f, "I/O error: {}", e),
      SelectorError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for SelectorError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      SelectorError::Io(e) => Some(e),
      SelectorError::Graph(GraphError::UnreadableSource { source, .. }) => Some(source),
      SelectorError::Graph(GraphError::Placeholder { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for SelectorError {
  fn from(err: io::Error) -> Self {
    SelectorError::Io(err)
  }
}

impl From<serde_json::Error> for SelectorError {
  fn from(err: serde_json::Error) -> Self {
    SelectorError::message(format!("JSON error: {}", err))
  }
}

impl From<walkdir::Error> for SelectorError {
  fn from(err: walkdir::Error) -> Self {
    SelectorError::message(format!("Directory walk error: {}", err))
  }
}

impl From<GitError> for SelectorError {
  fn from(err: GitError) -> Self {
    SelectorError::Git(err)
  }
}

impl From<ArgumentError> for SelectorError {
  fn from(err: ArgumentError) -> Self {
    SelectorError::Argument(err)
  }
}

impl From<ConfigError> for SelectorError {
  fn from(err: ConfigError) -> Self {
    SelectorError::Config(err)
  }
}

impl From<GraphError> for SelectorError {
  fn from(err: GraphError) -> Self {
    SelectorError::Graph(err)
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Directory is not inside a git work tree
  RepoNotFound { path: PathBuf },

  /// Git command failed
  CommandFailed { command: String, stderr: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Pass the project root that contains the .git folder with --dir (got {})",
        path.display()
      )),
      GitError::CommandFailed { stderr, .. } => {
        if stderr.contains("unknown revision") || stderr.contains("bad revision") {
          Some("Check that the revisions in the diff arguments exist (e.g. `git fetch` the base branch).".to_string())
        } else {
          None
        }
      }
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::RepoNotFound { path } => {
        write!(f, "Not a git repository root: {}", path.display())
      }
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
    }
  }
}

/// Rejected or malformed user input
#[derive(Debug)]
pub enum ArgumentError {
  /// Diff output must come from stdout
  OutputRedirect { arg: String },

  /// Rename detection would hide the delete + add pair
  RenameFilter { arg: String },

  /// Token in the extra-deps file is not `(a,b)`
  MalformedExtraDependency { line: usize, token: String },
}

impl ArgumentError {
  /// True for the diff arguments git-select-tests refuses to forward.
  #[cfg(test)]
  pub fn is_unsupported_diff_arg(&self) -> bool {
    matches!(self, ArgumentError::OutputRedirect { .. } | ArgumentError::RenameFilter { .. })
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ArgumentError::OutputRedirect { .. } => {
        Some("Remove --output; the selected tests are printed to stdout already.".to_string())
      }
      ArgumentError::RenameFilter { .. } => Some(
        "Renames are always reported as a deletion plus an addition. Drop 'R' from --diff-filter.".to_string(),
      ),
      ArgumentError::MalformedExtraDependency { .. } => Some(
        "Edges are written as (dependent,dependency) with no space after the comma, separated by spaces or newlines."
          .to_string(),
      ),
    }
  }
}

impl fmt::Display for ArgumentError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArgumentError::OutputRedirect { arg } => {
        write!(f, "Unsupported git diff argument '{}': output redirection is not allowed", arg)
      }
      ArgumentError::RenameFilter { arg } => {
        write!(f, "Unsupported git diff argument '{}': the renamed status filter is not allowed", arg)
      }
      ArgumentError::MalformedExtraDependency { line, token } => {
        write!(f, "Malformed extra dependency '{}' on line {}", token, line)
      }
    }
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Neither CLI nor config names any test paths
  MissingTestPaths,

  /// Config file could not be read or parsed
  Invalid { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingTestPaths => Some(
        "Pass --test-path <PATH> or set `test_paths` under [select] in selector.toml.".to_string(),
      ),
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingTestPaths => write!(f, "No test paths given"),
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
    }
  }
}

/// Dependency graph construction errors
#[derive(Debug)]
pub enum GraphError {
  /// A reachable source file could not be read
  UnreadableSource { path: PathBuf, source: io::Error },

  /// A placeholder for a deleted file could not be created
  Placeholder { path: PathBuf, source: io::Error },
}

impl GraphError {
  fn help_message(&self) -> Option<String> {
    match self {
      GraphError::UnreadableSource { .. } => None,
      GraphError::Placeholder { .. } => {
        Some("Deleted files are restored as empty placeholders while the graph is built; check write permissions.".to_string())
      }
    }
  }
}

impl fmt::Display for GraphError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GraphError::UnreadableSource { path, source } => {
        write!(f, "Failed to read source file {}: {}", path.display(), source)
      }
      GraphError::Placeholder { path, source } => {
        write!(f, "Failed to create placeholder for deleted file {}: {}", path.display(), source)
      }
    }
  }
}

/// Result type alias for git-select-tests
pub type SelectorResult<T> = Result<T, SelectorError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> SelectorResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> SelectorResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<SelectorError>,
{
  fn context(self, ctx: impl Into<String>) -> SelectorResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> SelectorResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &SelectorError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
