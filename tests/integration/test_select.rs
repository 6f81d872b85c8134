//! Integration tests for selecting impacted tests from a git diff

use crate::helpers::{TestProject, git, run_selector, run_selector_raw, selected_paths};
use anyhow::Result;
use std::collections::BTreeSet;

#[test]
fn test_modified_module_selects_direct_and_transitive_tests() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file("small_project_a/f.py", "def f():\n    return 10\n")?;

  // Working tree diff: no diff args at all
  let output = run_selector(&project.path, &["--test-path", "test"])?;

  assert_eq!(
    selected_paths(&output),
    project.abs_set(&["test/test_f.py", "test/test_g.py"])
  );
  Ok(())
}

#[test]
fn test_committed_change_against_revision() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file(
    "small_project_a/g.py",
    "from small_project_a.f import f\n\n\ndef g():\n    return f() + 2\n",
  )?;
  project.commit("Change g")?;

  let output = run_selector(&project.path, &["--test-path", "test", "--", "HEAD~1"])?;

  assert_eq!(selected_paths(&output), project.abs_set(&["test/test_g.py"]));
  Ok(())
}

#[test]
fn test_changed_test_file_selects_itself() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file("test/test_f.py", "def test_f():\n    assert True\n")?;

  let output = run_selector(&project.path, &["--test-path", "test", "--"])?;

  assert_eq!(selected_paths(&output), project.abs_set(&["test/test_f.py"]));
  Ok(())
}

#[test]
fn test_deleted_module_still_selects_dependents() -> Result<()> {
  let project = TestProject::small_project_a()?;
  git(&project.path, &["rm", "-q", "small_project_a/f.py"])?;
  project.commit("Delete f")?;

  let output = run_selector(&project.path, &["--test-path", "test", "--", "HEAD~1..."])?;

  assert_eq!(
    selected_paths(&output),
    project.abs_set(&["test/test_f.py", "test/test_g.py"])
  );
  assert!(
    !project.file_exists("small_project_a/f.py"),
    "placeholder for the deleted file must be removed"
  );
  Ok(())
}

#[test]
fn test_renamed_module_is_a_deletion_plus_addition() -> Result<()> {
  let project = TestProject::small_project_a()?;
  git(&project.path, &["mv", "small_project_a/f.py", "small_project_a/f_renamed.py"])?;
  project.commit("Rename f")?;

  let output = run_selector(&project.path, &["--test-path", "test", "--", "HEAD~1"])?;

  assert_eq!(
    selected_paths(&output),
    project.abs_set(&["test/test_f.py", "test/test_g.py"])
  );
  assert!(!project.file_exists("small_project_a/f.py"));
  Ok(())
}

#[test]
fn test_feature_branch_against_main() -> Result<()> {
  let project = TestProject::small_project_a()?;
  git(&project.path, &["checkout", "-q", "-b", "feature"])?;
  project.write_files(&[
    ("small_project_a/h.py", "def h():\n    return 3\n"),
    ("test/test_h.py", "from small_project_a.h import h\n\n\ndef test_h():\n    assert h() == 3\n"),
  ])?;
  project.commit("Add h")?;

  let output = run_selector(&project.path, &["--test-path", "test", "--", "main..."])?;

  assert_eq!(selected_paths(&output), project.abs_set(&["test/test_h.py"]));
  Ok(())
}

#[test]
fn test_user_diff_filter_is_forwarded() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file("small_project_a/f.py", "def f():\n    return 10\n")?;

  // Lowercase m excludes modified files
  let output = run_selector(&project.path, &["--test-path", "test", "--", "--diff-filter=m"])?;

  assert!(selected_paths(&output).is_empty());
  Ok(())
}

#[test]
fn test_transitive_selection_in_medium_project() -> Result<()> {
  let project = TestProject::medium_project_a()?;
  project.write_file("medium_project_a/b/b_1.py", "def b_1():\n    return 'changed'\n")?;

  let output = run_selector(&project.path, &["--test-path", "test"])?;

  assert_eq!(
    selected_paths(&output),
    project.abs_set(&[
      "test/test_a/test_a_3.py",
      "test/test_b.py",
      "test/test_b/test_b_1.py",
      "test/test_c/test_c_1.py",
      "test/test_d/test_d_1.py",
    ])
  );
  Ok(())
}

#[test]
fn test_medium_project_multiple_changes() -> Result<()> {
  let project = TestProject::medium_project_a()?;
  project.write_file("medium_project_a/b/b_2.py", "def b_2():\n    return 'changed'\n")?;
  project.write_file(
    "medium_project_a/c/c_2.py",
    "import medium_project_a.a.a_2\n\n\ndef c_2():\n    return 'changed'\n",
  )?;
  project.commit("Change b_2 and c_2")?;

  let output = run_selector(&project.path, &["--test-path", "test", "--", "HEAD~1"])?;

  assert_eq!(
    selected_paths(&output),
    project.abs_set(&[
      "test/test_b.py",
      "test/test_b/test_b_2.py",
      "test/test_c/test_c_2.py",
      "test/test_d/test_d_1.py",
    ])
  );
  Ok(())
}

#[test]
fn test_extra_deps_select_data_consumers() -> Result<()> {
  let project = TestProject::small_project_b()?;
  project.write_file("test/test_h_modulo_inputs.csv", "x,expected\n5,2\n")?;
  project.write_file("small_project_b/f/f_1.txt", "two\n")?;

  let output = run_selector(
    &project.path,
    &["--test-path", "test", "--extra-deps-file", "extra_deps.txt"],
  )?;

  assert_eq!(
    selected_paths(&output),
    project.abs_set(&["test/test_f_1.py", "test/test_h.py"])
  );
  Ok(())
}

#[test]
fn test_without_extra_deps_data_change_selects_nothing() -> Result<()> {
  let project = TestProject::small_project_b()?;
  project.write_file("test/test_h_modulo_inputs.csv", "x,expected\n5,2\n")?;

  let output = run_selector(&project.path, &["--test-path", "test"])?;

  assert!(selected_paths(&output).is_empty());
  Ok(())
}

#[test]
fn test_paths_relative_to_working_directory() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file("small_project_a/f.py", "def f():\n    return 10\n")?;

  let output = run_selector(
    &project.path.join("test"),
    &["--dir", "..", "--test-path", ".", "--src-path", ".."],
  )?;

  assert_eq!(
    selected_paths(&output),
    project.abs_set(&["test/test_f.py", "test/test_g.py"])
  );
  Ok(())
}

#[test]
fn test_nonexistent_test_path_selects_nothing() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file("small_project_a/f.py", "def f():\n    return 10\n")?;

  let output = run_selector(&project.path, &["--test-path", "fake", "--src-path", "fake"])?;

  assert!(selected_paths(&output).is_empty());
  Ok(())
}

#[test]
fn test_no_changes_selects_nothing() -> Result<()> {
  let project = TestProject::small_project_a()?;

  let output = run_selector(&project.path, &["--test-path", "test", "--", "HEAD"])?;

  assert!(output.stdout.is_empty());
  Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file("small_project_a/g.py", "def g():\n    return 2\n")?;

  let output = run_selector(&project.path, &["--test-path", "test", "--format", "json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  let selected: BTreeSet<String> = json["selected"]
    .as_array()
    .expect("selected should be an array")
    .iter()
    .filter_map(|v| v.as_str().map(String::from))
    .collect();
  let expected: BTreeSet<String> = [project.abs("test/test_g.py").display().to_string()].into();
  assert_eq!(selected, expected);
  assert_eq!(json["summary"]["changed_files_count"], 1);
  assert_eq!(json["summary"]["deleted_files_count"], 0);
  Ok(())
}

#[test]
fn test_config_file_supplies_defaults() -> Result<()> {
  let project = TestProject::small_project_b()?;
  project.write_file(
    "selector.toml",
    "[select]\ntest_paths = [\"test\"]\nextra_deps_file = \"extra_deps.txt\"\n",
  )?;
  project.commit("Add selector config")?;
  project.write_file("test/test_h_modulo_inputs.csv", "x,expected\n6,0\n")?;

  let output = run_selector(&project.path, &[])?;

  assert_eq!(selected_paths(&output), project.abs_set(&["test/test_h.py"]));
  Ok(())
}

#[test]
fn test_missing_test_paths_is_user_error() -> Result<()> {
  let project = TestProject::small_project_a()?;

  let output = run_selector_raw(&project.path, &[])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("--test-path"));
  Ok(())
}

#[test]
fn test_rename_filter_is_rejected() -> Result<()> {
  let project = TestProject::small_project_a()?;

  for args in [
    &["--test-path", "test", "--", "--diff-filter=R"][..],
    &["--test-path", "test", "--", "--diff-filter", "AR"][..],
    &["--test-path", "test", "--", "--output", "diff.txt"][..],
  ] {
    let output = run_selector_raw(&project.path, args)?;
    assert_eq!(output.status.code(), Some(1), "args {:?} should be rejected", args);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported git diff argument"));
    assert!(output.stdout.is_empty());
  }
  assert!(!project.file_exists("diff.txt"));
  Ok(())
}

#[test]
fn test_not_a_repository_is_system_error() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  std::fs::create_dir(dir.path().join("test"))?;

  let output = run_selector_raw(dir.path(), &["--test-path", "test"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Not a git repository"));
  Ok(())
}

#[test]
fn test_subdirectory_of_repository_is_rejected() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file("small_project_a/f.py", "def f():\n    return 10\n")?;

  // `--dir` defaults to the working directory, which is inside the work tree
  let output = run_selector_raw(&project.path.join("test"), &["--test-path", "."])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Not a git repository root"));
  assert!(output.stdout.is_empty());
  Ok(())
}

#[test]
fn test_malformed_extra_deps_is_user_error() -> Result<()> {
  let project = TestProject::small_project_a()?;
  project.write_file("bad_deps.txt", "(test/test_f.py, small_project_a/f.py)\n")?;

  let output = run_selector_raw(
    &project.path,
    &["--test-path", "test", "--extra-deps-file", "bad_deps.txt"],
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("line 1"));
  Ok(())
}
