use spanmend::config::{ConfigFlags, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".spanmendrc");
    let content = r#"
# comment
--hide-automatic

--throttle-ms 40
   
--closing-punct=! --closing-punct ?
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.hide_automatic);
    assert_eq!(flags.throttle_ms, Some(40));
    assert_eq!(flags.closing_punct, vec!["!".to_string(), "?".to_string()]);
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".spanmendrc");
    let content = "--no-resize-manual\n--coalesce-ms 500\n--throttle-ms 40\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "spanmend".to_string(),
        "--throttle-ms".to_string(),
        "5".to_string(),
        "--include-punctuation".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.no_resize_manual, "file flags should remain enabled");
    assert!(effective.include_punctuation, "cli flags should be applied");
    assert_eq!(effective.throttle_ms, Some(5), "cli should override throttle");
    assert_eq!(
        effective.coalesce_ms,
        Some(500),
        "file config should be preserved when CLI does not override"
    );

    let options = effective.options();
    assert!(!options.annotator.resize_manual_events);
    assert!(options.view.include_punctuation);
    assert_eq!(options.coalesce_ms, 500);
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "spanmend".to_string(),
        "--coalesce-ms=100".to_string(),
        "--opening-punct=[".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.coalesce_ms, Some(100));
    assert_eq!(flags.opening_punct, vec!["[".to_string()]);
}

#[test]
fn test_config_union_merges_booleans() {
    let global = ConfigFlags {
        no_new_events: true,
        keep_overlapping: true,
        ..ConfigFlags::default()
    };
    let local = ConfigFlags {
        no_delete_contexts: true,
        ..ConfigFlags::default()
    };
    let merged = global.union(&local);
    assert!(merged.no_new_events);
    assert!(merged.keep_overlapping);
    assert!(merged.no_delete_contexts);
    assert!(!merged.hide_automatic);
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}
