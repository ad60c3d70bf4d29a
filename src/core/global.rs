//! Process-wide default registry.
//!
//! Created on first use from [`RegistryConfig::from_env`], or explicitly with
//! [`init_global`] before anything touches it. Lives for the rest of the
//! process.

use std::sync::OnceLock;

use crate::api::config::RegistryConfig;
use crate::api::registry::SegmentRegistry;

static GLOBAL: OnceLock<SegmentRegistry> = OnceLock::new();

/// The process-wide registry, created from the environment on first use.
pub fn global() -> &'static SegmentRegistry {
    GLOBAL.get_or_init(|| SegmentRegistry::new(RegistryConfig::from_env()))
}

/// Create the process-wide registry with `config`.
///
/// Returns `false` if it already exists, in which case `config` is ignored.
pub fn init_global(config: RegistryConfig) -> bool {
    let mut installed = false;
    GLOBAL.get_or_init(|| {
        installed = true;
        SegmentRegistry::new(config)
    });
    installed
}
