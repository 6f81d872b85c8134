mod commands;
mod core;
mod graph;
mod logging;
mod utils;

use clap::Parser;
use commands::select::SelectOptions;
use core::deselect::split_at_delimiter;
use core::error::{SelectorError, print_error};
use std::path::PathBuf;
use tracing::warn;

/// Select the tests impacted by a git diff
#[derive(Parser)]
#[command(name = "git-select-tests")]
#[command(version, about, long_about = None)]
#[command(
  override_usage = "git-select-tests [OPTIONS] --test-path <PATH>... [-- <GIT_DIFF_ARGS>...]"
)]
#[command(after_help = "Everything after `--` is passed to `git diff`, e.g. `-- main...` or `-- HEAD~1 --diff-filter=M`.")]
#[command(styles = get_styles())]
struct Cli {
  /// Project root: the git repository root, against which extra deps resolve
  #[arg(long, default_value = ".")]
  dir: PathBuf,

  /// Test file or directory (repeatable)
  #[arg(long = "test-path", value_name = "PATH")]
  test_paths: Vec<PathBuf>,

  /// Import search root, in lookup order (repeatable) [default: . src]
  #[arg(long = "src-path", value_name = "PATH")]
  src_paths: Vec<PathBuf>,

  /// File of `(dependent,dependency)` edges the import scan cannot see
  #[arg(long, value_name = "FILE")]
  extra_deps_file: Option<PathBuf>,

  /// Output format: paths (default), json
  #[arg(long, default_value = "paths")]
  format: String,

  /// Collected test ids to filter, one per line (`-` for stdin)
  #[arg(long, value_name = "FILE")]
  collected: Option<PathBuf>,

  /// Debug logging on stderr
  #[arg(short, long)]
  verbose: bool,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  // clap never sees the diff args; `--` hands everything after it to git
  let args: Vec<String> = std::env::args().collect();
  let (cli_args, diff_args) = split_at_delimiter(&args);
  let cli = Cli::parse_from(cli_args);

  logging::init(cli.verbose);

  // Deleted-file placeholders must not outlive an interrupted run
  if let Err(e) = graph::install_interrupt_cleanup() {
    warn!(error = %e, "placeholders will not be removed on interrupt");
  }

  let options = SelectOptions {
    dir: cli.dir,
    test_paths: cli.test_paths,
    src_paths: cli.src_paths,
    extra_deps_file: cli.extra_deps_file,
    format: cli.format,
    collected: cli.collected,
  };

  if let Err(e) = commands::select::run_select(options, diff_args) {
    handle_error(e);
  }
}

fn handle_error(err: SelectorError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
