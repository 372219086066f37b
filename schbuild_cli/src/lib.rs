//! schbuild command line interface
//!
//! Everything between the argument parser and `schbuild_core`: layered
//! configuration, exit codes, progress rendering and report output.

pub mod args;
pub mod config;
pub mod error;
pub mod orchestrators;
pub mod output;
pub mod paths;
pub mod progress;
pub mod terminal;
