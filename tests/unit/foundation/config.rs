use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_validate() {
    Settings::default().validate().unwrap();
}

#[test]
fn overrides_apply_and_trim_trailing_slash() {
    let s = Settings::default().with_overrides(lookup(&[
        ("FRAMEMARK_API_URL", "https://api.example.test/"),
        ("FRAMEMARK_HTTP_TIMEOUT_MS", "2500"),
        ("FRAMEMARK_JPEG_QUALITY", "75"),
        ("FRAMEMARK_STORE_QUOTA_BYTES", "4096"),
    ]));
    assert_eq!(s.api_base_url, "https://api.example.test");
    assert_eq!(s.http_timeout(), Duration::from_millis(2500));
    assert_eq!(s.jpeg_quality, 75);
    assert_eq!(s.store_quota_bytes, Some(4096));
}

#[test]
fn invalid_overrides_are_ignored() {
    let s = Settings::default().with_overrides(lookup(&[
        ("FRAMEMARK_HTTP_TIMEOUT_MS", "0"),
        ("FRAMEMARK_JPEG_QUALITY", "101"),
        ("FRAMEMARK_API_URL", "   "),
    ]));
    assert_eq!(s, Settings::default());
}

#[test]
fn json_file_fills_missing_fields_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"jpeg_quality": 80}"#).unwrap();
    let s = Settings::from_json_file(&path).unwrap();
    assert_eq!(s.jpeg_quality, 80);
    assert_eq!(s.native_stroke_width, Settings::default().native_stroke_width);
}

#[test]
fn json_file_with_bad_quality_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"jpeg_quality": 0}"#).unwrap();
    assert!(Settings::from_json_file(&path).is_err());
}
