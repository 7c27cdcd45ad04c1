use super::*;

#[test]
fn helpers_build_matching_variants() {
    assert!(matches!(WordbeatError::config("x"), WordbeatError::Config(_)));
    assert!(matches!(
        WordbeatError::resource("x"),
        WordbeatError::Resource(_)
    ));
}

#[test]
fn display_includes_kind_prefix() {
    assert_eq!(
        WordbeatError::config("bad bpm").to_string(),
        "configuration error: bad bpm"
    );
    assert_eq!(
        WordbeatError::resource("no encoder").to_string(),
        "resource error: no encoder"
    );
}

#[test]
fn anyhow_errors_wrap_transparently() {
    let err: WordbeatError = anyhow::anyhow!("io went wrong").into();
    assert_eq!(err.to_string(), "io went wrong");
}
