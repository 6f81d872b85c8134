//! Integration tests for filtering collected test items (`--collected`)

use crate::helpers::{TestProject, run_selector, run_selector_with_stdin};
use anyhow::Result;

const COLLECTED: &str = "test/test_f.py::test_f\ntest/test_f.py::test_f_again\ntest/test_g.py::test_g\n";

fn lines(stdout: &[u8]) -> Vec<String> {
  String::from_utf8_lossy(stdout).lines().map(String::from).collect()
}

#[test]
fn test_deselects_items_outside_selection() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file("collected.txt", COLLECTED)?;
  project.write_file("test/test_f.py", "def test_f():\n    assert True\n")?;

  let output = run_selector(&project.path, &["--collected", "collected.txt", "--"])?;

  assert_eq!(
    lines(&output.stdout),
    vec!["test/test_f.py::test_f", "test/test_f.py::test_f_again"]
  );
  assert!(String::from_utf8_lossy(&output.stderr).contains("Deselected 1 of 3"));
  Ok(())
}

#[test]
fn test_collected_files_are_entry_points() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file("small_project_a/f.py", "def f():\n    return 10\n")?;

  let output = run_selector_with_stdin(&project.path, &["--collected", "-", "--"], COLLECTED)?;

  assert_eq!(lines(&output.stdout), lines(COLLECTED.as_bytes()));
  Ok(())
}

#[test]
fn test_without_delimiter_every_item_is_kept() -> Result<()> {
  let project = TestProject::small_project_a()?;
  // Nothing changed, but selection is off without `--`
  let output = run_selector_with_stdin(&project.path, &["--collected", "-"], COLLECTED)?;

  assert_eq!(lines(&output.stdout), lines(COLLECTED.as_bytes()));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Deselected 0 of 3"));
  Ok(())
}

#[test]
fn test_no_changes_deselects_everything() -> Result<()> {
  let project = TestProject::small_project_a()?;

  let output = run_selector_with_stdin(&project.path, &["--collected", "-", "--", "HEAD"], COLLECTED)?;

  assert!(output.stdout.is_empty());
  assert!(String::from_utf8_lossy(&output.stderr).contains("Deselected 3 of 3"));
  Ok(())
}

#[test]
fn test_collected_json_output() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file(
    "small_project_a/g.py",
    "from small_project_a.f import f\n\n\ndef g():\n    return f() + 5\n",
  )?;

  let output = run_selector_with_stdin(
    &project.path,
    &["--collected", "-", "--format", "json", "--"],
    COLLECTED,
  )?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(json["selected"], serde_json::json!(["test/test_g.py::test_g"]));
  assert_eq!(json["summary"]["deselected_count"], 2);
  Ok(())
}
