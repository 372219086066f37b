//! Mock implementations for testing

mod converter;

pub use converter::{MockCall, MockConverter};
