//! Core engine for git-select-tests
//!
//! - **config**: Project configuration (selector.toml) parsing
//! - **deselect**: Test-runner hand-off (argument splitting, item deselection)
//! - **error**: Error types with contextual help messages
//! - **select**: Selection façade composing diff, graph and impact analysis
//! - **vcs**: Git operations (SystemGit) and diff argument sanitizing

pub mod config;
pub mod deselect;
pub mod error;
pub mod select;
pub mod vcs;
