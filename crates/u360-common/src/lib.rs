//! U360 Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the U360 workspace members:
//!
//! - **Logging**: one place to install the `tracing` subscriber
//! - **Formatting**: byte sizes and rates for progress lines

pub mod format;
pub mod logging;

pub use format::{format_byte_rate, format_bytes};
