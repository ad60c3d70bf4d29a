//! Build script for segcheck.
//!
//! Warns about feature combinations that are easy to get wrong.

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_CHECK");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DEBUG");

    let check_enabled = env::var("CARGO_FEATURE_CHECK").is_ok();
    let debug_enabled = env::var("CARGO_FEATURE_DEBUG").is_ok();
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let is_release = profile == "release";

    if check_enabled && is_release {
        emit_warning("'check' feature enabled in a release build");
        emit_note("Every checked store takes the registry lock. Disable 'check' for production.");
    }

    if debug_enabled && !check_enabled {
        emit_note("'debug' captures backtraces only for registries you create yourself;");
        emit_note("enable 'check' as well to route register!/release! through the global registry.");
    }
}

fn emit_note(msg: &str) {
    println!("cargo:warning=[segcheck]    {}", msg);
}

fn emit_warning(msg: &str) {
    println!("cargo:warning=[segcheck] ⚠️  {}", msg);
}
