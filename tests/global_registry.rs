//! Tests for the process-wide registry and the registration macros.

use segcheck::{checked, RegistryConfig, SegmentRegistry};

#[test]
fn test_global_init_and_macros() {
    segcheck::suppress_diagnostics(true);

    // First use in this binary, so the explicit config wins.
    assert!(segcheck::init_global(RegistryConfig::default().with_violation_history(8)));
    assert!(!segcheck::init_global(RegistryConfig::minimal()));
    assert_eq!(SegmentRegistry::global().config().violation_history, 8);

    let mut words = [0u32; 8];
    let base = words.as_mut_ptr();
    unsafe {
        segcheck::register!(base, 16);
        checked::store_u32(base.add(3), 3);
    }

    #[cfg(feature = "check")]
    {
        assert!(segcheck::global().is_live(base as usize));
        let err = unsafe { checked::try_store(base.add(4), 4) }.unwrap_err();
        assert_eq!(err.as_access_violation().map(|v| v.size), Some(4));
        let origin = segcheck::global()
            .nearest_live(base as usize)
            .map(|s| s.origin)
            .unwrap();
        assert_eq!(origin.member, Some("global_registry"));
        assert!(origin.file.ends_with("global_registry.rs"));
    }

    #[cfg(not(feature = "check"))]
    {
        assert!(!segcheck::global().is_live(base as usize));
        unsafe { checked::try_store(base.add(4), 4) }.unwrap();
    }

    unsafe { segcheck::release!(base) };
    assert!(!segcheck::global().is_live(base as usize));
    assert_eq!(words[3], 3);
}
