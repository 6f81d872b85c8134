pub mod diff_args;
pub mod system_git;

pub use system_git::SystemGit;
