//! Utility functions for display formatting.

pub mod format;

pub use format::{format_age, format_celsius};
