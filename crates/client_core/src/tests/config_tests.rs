use std::collections::HashMap;

use super::*;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_without_sources() {
    let settings = Settings::from_sources(None, env_from(&[]));
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.api_base, DEFAULT_API_BASE);
    assert_eq!(settings.upload_profile, UploadProfile::PdfRequired);
}

#[test]
fn saved_preference_beats_default() {
    let settings = Settings::from_sources(
        Some("api_base = \"http://saved:8000\"\nmock = true\nupload_profile = \"text_only\""),
        env_from(&[]),
    );
    assert_eq!(settings.api_base, "http://saved:8000");
    assert!(settings.mock);
    assert_eq!(settings.upload_profile, UploadProfile::TextOnly);
}

#[test]
fn environment_beats_saved_preference() {
    let settings = Settings::from_sources(
        Some("api_base = \"http://saved:8000\""),
        env_from(&[
            ("NEXT_PUBLIC_API_BASE", "http://next:8000"),
            ("HELPDESK_API_BASE", "http://env:8000"),
        ]),
    );
    assert_eq!(settings.api_base, "http://env:8000");

    let settings = Settings::from_sources(
        Some("api_base = \"http://saved:8000\""),
        env_from(&[("NEXT_PUBLIC_API_BASE", "http://next:8000")]),
    );
    assert_eq!(settings.api_base, "http://next:8000");
}

#[test]
fn explicit_override_beats_everything_and_blank_values_are_skipped() {
    let mut settings = Settings::from_sources(
        Some("api_base = \"   \""),
        env_from(&[("HELPDESK_API_BASE", "  ")]),
    );
    assert_eq!(settings.api_base, DEFAULT_API_BASE);

    settings.apply_api_override(Some(" "));
    assert_eq!(settings.api_base, DEFAULT_API_BASE);

    settings.apply_api_override(Some(" http://override:9000 "));
    assert_eq!(settings.api_base, "http://override:9000");
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let settings = Settings::from_sources(Some("api_base = "), env_from(&[]));
    assert_eq!(settings.api_base, DEFAULT_API_BASE);
}

#[test]
fn environment_flags_are_parsed() {
    let settings = Settings::from_sources(
        None,
        env_from(&[
            ("HELPDESK_MOCK", "on"),
            ("HELPDESK_UPLOAD_PROFILE", "json"),
            ("HELPDESK_REQUEST_TIMEOUT_SECS", "30"),
            ("HELPDESK_SESSION_SCOPE", "tab-7"),
        ]),
    );
    assert!(settings.mock);
    assert_eq!(settings.upload_profile, UploadProfile::TextOnly);
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(settings.session_scope.as_deref(), Some("tab-7"));
}

#[test]
fn save_api_base_keeps_other_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

    save_api_base(&path, "http://first:8000").expect("save first");
    let raw = fs::read_to_string(&path).expect("read");
    fs::write(&path, format!("{raw}mock = true\n")).expect("append");

    save_api_base(&path, " http://second:8000 ").expect("save second");
    let raw = fs::read_to_string(&path).expect("read saved");
    let settings = Settings::from_sources(Some(&raw), env_from(&[]));
    assert_eq!(settings.api_base, "http://second:8000");
    assert!(settings.mock);
}

#[test]
fn configured_session_scope_wins_over_terminal_session() {
    let settings = Settings::from_sources(Some("session_scope = \"tab-2\""), env_from(&[]));
    let scope = settings.session_scope_with(env_from(&[("TERM_SESSION_ID", "w0t1")]), Some(42));
    assert_eq!(scope.as_deref(), Some("tab-2"));
}

#[test]
fn default_session_scope_follows_the_terminal_session() {
    let settings = Settings::default();
    assert_eq!(
        settings
            .session_scope_with(env_from(&[("WT_SESSION", "abc"), ("TMUX_PANE", "%3")]), Some(42))
            .as_deref(),
        Some("term-abc")
    );
    assert_eq!(
        settings.session_scope_with(env_from(&[]), Some(42)).as_deref(),
        Some("shell-42")
    );
    assert_eq!(settings.session_scope_with(env_from(&[]), None), None);
}

#[test]
fn new_shell_session_does_not_see_previous_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = Settings::default();

    let first = settings
        .session_scope_with(env_from(&[]), Some(4100))
        .expect("first scope");
    crate::SessionStore::open(dir.path(), &first)
        .set(crate::HOME_INSTITUTION_KEY, "Università di Pisa");

    let same = crate::SessionStore::open(dir.path(), &first);
    assert_eq!(same.get(crate::HOME_INSTITUTION_KEY), "Università di Pisa");

    let later = settings
        .session_scope_with(env_from(&[]), Some(5200))
        .expect("later scope");
    let fresh = crate::SessionStore::open(dir.path(), &later);
    assert_eq!(fresh.get(crate::HOME_INSTITUTION_KEY), "");
}
