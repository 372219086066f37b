//! Test utilities for schbuild
//!
//! Mock converters, temporary project builders and a scripted converter for
//! exercising the orchestrator and the CLI without the real converter.

pub mod builders;
pub mod mocks;
pub mod script;

// Re-export commonly used types
pub use builders::{TestProject, TestProjectBuilder};
pub use mocks::{MockCall, MockConverter};
pub use script::ScriptedConverter;
