//! Command orchestrators
//!
//! Coordinate between the CLI layer and the core build services.

pub mod build_orchestrator;
pub mod clean_orchestrator;
