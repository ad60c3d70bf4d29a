//! Utility functions.

pub mod padding;
pub(crate) mod size;
