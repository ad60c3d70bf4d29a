//! Public API for segcheck.
//!
//! This module contains all user-facing types and functions.
//! Most users should only interact with types from this module.

pub mod checked;
pub mod config;
pub mod error;
pub mod guarded;
pub(crate) mod history;
pub mod registry;
pub mod retention;
pub mod stats;
