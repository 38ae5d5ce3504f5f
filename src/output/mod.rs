//! Output for the operator.
//!
//! - [`narrator`] - status narration and failure details

mod narrator;

pub use narrator::{MemorySink, Narrator};
