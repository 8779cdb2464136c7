//! Output formatters for duplicate scan results.
//!
//! - [`text`]: one header per group followed by indented member paths
//! - [`json`]: machine-readable document for scripting
//!
//! Both write to any `io::Write` and list groups sorted by key.

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
