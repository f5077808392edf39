use super::*;

// =============================================================================
// env_bool: each test uses its own env var name.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__STAYBOOK_EB_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__STAYBOOK_EB_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_trims_and_ignores_case() {
    let key = "__STAYBOOK_EB_CI_17__";
    unsafe { std::env::set_var(key, "  TRUE ") };
    assert_eq!(env_bool(key), Some(true));
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_invalid_returns_none() {
    let key = "__STAYBOOK_EB_INVALID_18__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_unset_returns_none() {
    assert_eq!(env_bool("__STAYBOOK_EB_SURELY_UNSET_19__"), None);
}

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_reads_value() {
    let key = "__STAYBOOK_EP_OK_20__";
    unsafe { std::env::set_var(key, " 42 ") };
    assert_eq!(env_parse::<u32>(key, 7), 42);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_on_garbage() {
    let key = "__STAYBOOK_EP_BAD_21__";
    unsafe { std::env::set_var(key, "lots") };
    assert_eq!(env_parse::<u32>(key, 7), 7);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_when_unset() {
    assert_eq!(env_parse::<u64>("__STAYBOOK_EP_UNSET_22__", 300), 300);
}

// =============================================================================
// AppConfig
// =============================================================================

#[test]
fn test_config_has_sane_defaults() {
    let cfg = AppConfig::for_tests();
    assert_eq!(cfg.reviews_page_size, 5);
    assert_eq!(cfg.login_max_attempts, 5);
    assert_eq!(cfg.login_window, Duration::from_secs(300));
    assert_eq!(cfg.currency, "eur");
    assert!(!cfg.cookie_secure);
    assert!(cfg.checkout_api_key.is_none());
}
