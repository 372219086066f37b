//! Progress reporting module for the CLI
//!
//! The orchestrator reports through a channel provider; a separate task
//! renders the updates as one indicatif bar per target group.

pub mod provider;
pub mod renderer;
pub mod utils;

pub use provider::{ChannelProvider, create_progress_infrastructure};
pub use renderer::{ProgressRenderer, render_progress};
pub use utils::format_duration;
