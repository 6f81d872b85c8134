//! Validation and merging of user-supplied `git diff` arguments
//!
//! The selector always needs `git diff` to print bare, NUL-terminated path names
//! on stdout with renames split into a deletion and an addition. Users may add any other
//! arguments (revision ranges, pathspecs, status filters) as long as they do not
//! break that contract.

use crate::core::error::{ArgumentError, SelectorResult};

const OUTPUT_FLAG: &str = "--output";
const FILTER_FLAG: &str = "--diff-filter";
const RENAME_STATUS: char = 'R';
const PATHSPEC_SEPARATOR: &str = "--";

/// Arguments for listing every changed path
pub const CHANGED_FILES_ARGS: &[&str] = &["--name-only", "-z", "--no-renames"];

/// Arguments for listing deleted paths only
pub const DELETED_FILES_ARGS: &[&str] = &["--name-only", "-z", "--no-renames", "--diff-filter=D"];

/// Validate `user_args` and merge them with `required_args`.
///
/// Rejects output redirection and any status filter that selects renames. When
/// `required_args` carries its own `--diff-filter`, user filters are dropped in both
/// the `--diff-filter=X` and `--diff-filter X` spellings. Remaining user arguments
/// keep their order and are followed by the required ones; if the user passed a
/// `--` pathspec separator the required arguments go right before it so git still
/// reads them as options.
pub fn sanitize<S: AsRef<str>>(user_args: &[S], required_args: &[&str]) -> SelectorResult<Vec<String>> {
  let required_has_filter = required_args.iter().any(|arg| is_filter_flag(arg));

  let mut options = Vec::with_capacity(user_args.len() + required_args.len());
  let mut pathspecs: Vec<String> = Vec::new();

  let mut iter = user_args.iter().map(AsRef::as_ref).peekable();
  while let Some(arg) = iter.next() {
    if arg == PATHSPEC_SEPARATOR {
      // Everything after `--` is a path, even if it looks like a flag
      pathspecs.push(arg.to_string());
      pathspecs.extend(iter.by_ref().map(str::to_string));
      break;
    }

    if arg == OUTPUT_FLAG || arg.starts_with("--output=") {
      return Err(ArgumentError::OutputRedirect { arg: arg.to_string() }.into());
    }

    if arg == FILTER_FLAG {
      let value = iter.next();
      if let Some(value) = value
        && value.contains(RENAME_STATUS)
      {
        return Err(
          ArgumentError::RenameFilter {
            arg: format!("{} {}", arg, value),
          }
          .into(),
        );
      }
      if !required_has_filter {
        options.push(arg.to_string());
        options.extend(value.map(str::to_string));
      }
      continue;
    }

    if let Some(value) = arg.strip_prefix("--diff-filter=") {
      if value.contains(RENAME_STATUS) {
        return Err(ArgumentError::RenameFilter { arg: arg.to_string() }.into());
      }
      if !required_has_filter {
        options.push(arg.to_string());
      }
      continue;
    }

    options.push(arg.to_string());
  }

  options.extend(required_args.iter().map(|arg| arg.to_string()));
  options.extend(pathspecs);
  Ok(options)
}

fn is_filter_flag(arg: &str) -> bool {
  arg == FILTER_FLAG || arg.starts_with("--diff-filter=")
}
