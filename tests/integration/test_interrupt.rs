//! Integration tests for interrupting a run while deleted files are restored

use crate::helpers::{TestProject, git, spawn_selector};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

/// Enough untracked tests that the import scan outlasts the polling below
const TEST_FILES: usize = 5000;
const UNRESOLVED_IMPORTS: usize = 25;
const ATTEMPTS: usize = 5;

/// `pkg/gone.py` deleted in the last commit, imported by every test.
fn project_with_deleted_module() -> Result<TestProject> {
  let project = TestProject::new()?;
  project.write_files(&[("pkg/__init__.py", ""), ("pkg/gone.py", "VALUE = 1\n")])?;
  project.commit("Add pkg")?;
  git(&project.path, &["rm", "-q", "pkg/gone.py"])?;
  project.commit("Delete gone")?;

  // Untracked, so the diff only reports the deletion
  let imports: String = (0..UNRESOLVED_IMPORTS)
    .map(|i| format!("import missing_{}\n", i))
    .collect();
  for i in 0..TEST_FILES {
    project.write_file(
      &format!("test/test_{}.py", i),
      &format!("{}import pkg.gone\n\n\ndef test_{}():\n    pass\n", imports, i),
    )?;
  }
  Ok(project)
}

fn send_signal(child: &Child, signal: &str) -> Result<()> {
  let status = Command::new("kill")
    .args([signal, &child.id().to_string()])
    .status()
    .context("Failed to run kill")?;
  anyhow::ensure!(status.success(), "kill {} failed", signal);
  Ok(())
}

/// Wait until `path` exists or the child exits; true if the path was seen.
fn wait_for_path(child: &mut Child, path: &Path) -> Result<bool> {
  let deadline = Instant::now() + Duration::from_secs(60);
  while Instant::now() < deadline {
    if path.exists() {
      return Ok(true);
    }
    if child.try_wait()?.is_some() {
      return Ok(false);
    }
    thread::sleep(Duration::from_millis(1));
  }
  Ok(false)
}

fn assert_signal_removes_placeholder(signal: &str) -> Result<()> {
  let project = project_with_deleted_module()?;
  let placeholder = project.abs("pkg/gone.py");
  let args = ["--test-path", "test", "--src-path", ".", "--", "HEAD~1..."];

  for _ in 0..ATTEMPTS {
    let mut child = spawn_selector(&project.path, &args)?;

    if !wait_for_path(&mut child, &placeholder)? {
      let status = child.wait()?;
      assert!(status.success(), "run failed: {:?}", status);
      assert!(!project.file_exists("pkg/gone.py"));
      continue;
    }

    send_signal(&child, signal)?;
    let status = child.wait()?;

    assert!(
      !project.file_exists("pkg/gone.py"),
      "placeholder left behind after {}",
      signal
    );
    // The run may finish on its own between the check and the signal
    if !status.success() {
      assert_eq!(status.code(), Some(130), "unexpected status {:?}", status);
    }
    return Ok(());
  }

  anyhow::bail!("every run finished before its placeholder was observed")
}

#[test]
fn test_sigint_during_build_removes_placeholders() -> Result<()> {
  assert_signal_removes_placeholder("-INT")
}

#[test]
fn test_sigterm_during_build_removes_placeholders() -> Result<()> {
  assert_signal_removes_placeholder("-TERM")
}
