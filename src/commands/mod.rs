//! CLI commands for git-select-tests
//!
//! - **select**: Print the tests impacted by a change, or filter collected test items

pub mod select;
