//! Builders for temporary build directories

mod project;

pub use project::{TestProject, TestProjectBuilder};
