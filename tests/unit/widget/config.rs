use super::*;

#[test]
fn defaults_match_documented_values() {
    let cfg = WidgetConfig::default();
    assert_eq!(cfg.src, None);
    assert!(cfg.starting_on_init);
    assert_eq!(cfg.delay_in_millis, 33);
    assert!(!cfg.on_click_start_or_pause);
    cfg.validate().unwrap();
}

#[test]
fn attributes_override_defaults() {
    let cfg = WidgetConfig::from_attributes([
        ("gif_src", "asset:dir/name"),
        ("starting_on_init", "false"),
        ("delay_in_millis", " 40 "),
        ("on_click_start_or_pause", "true"),
        ("layout_width", "match_parent"),
    ])
    .unwrap();

    assert_eq!(cfg.src.as_deref(), Some("asset:dir/name"));
    assert!(!cfg.starting_on_init);
    assert_eq!(cfg.delay_in_millis, 40);
    assert!(cfg.on_click_start_or_pause);
}

#[test]
fn attributes_reject_bad_values() {
    assert!(matches!(
        WidgetConfig::from_attributes([("delay_in_millis", "0")]),
        Err(GifViewError::Configuration(_))
    ));
    assert!(WidgetConfig::from_attributes([("delay_in_millis", "fast")]).is_err());
    assert!(WidgetConfig::from_attributes([("starting_on_init", "yes")]).is_err());
}

#[test]
fn json_uses_defaults_for_missing_fields() {
    let cfg = WidgetConfig::from_json_str(r#"{ "gif_src": "url:https://x/y.gif" }"#).unwrap();
    assert_eq!(cfg.src.as_deref(), Some("url:https://x/y.gif"));
    assert!(cfg.starting_on_init);
    assert_eq!(cfg.delay_in_millis, 33);

    assert!(WidgetConfig::from_json_str(r#"{ "delay_in_millis": -5 }"#).is_err());
    assert!(WidgetConfig::from_json_str(r#"{ "bogus": 1 }"#).is_err());
}

#[test]
fn json_roundtrip_skips_missing_src() {
    let json = serde_json::to_string(&WidgetConfig::default()).unwrap();
    assert!(!json.contains("gif_src"));
    let back = WidgetConfig::from_json_str(&json).unwrap();
    assert_eq!(back, WidgetConfig::default());
}
