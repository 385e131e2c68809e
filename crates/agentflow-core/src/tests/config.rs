use crate::*;
use serde_json::json;

#[test]
fn defaults_cover_every_key() {
    let cfg = FlowConfig::default();
    assert_eq!(cfg.layout_mode().unwrap(), LayoutMode::Zigzag);
    assert_eq!(cfg.top_margin(), 150.0);
    assert_eq!(cfg.viewport_width(), 800.0);
    assert_eq!(cfg.viewport_height(), 600.0);
    assert_eq!(cfg.snake_fit_padding(), 60.0);
    assert_eq!(cfg.external_fit_padding(), 30.0);
}

#[test]
fn yaml_overrides_merge_over_defaults() {
    let cfg = FlowConfig::from_yaml_str(
        "layout:\n  mode: dagre\nviewport:\n  width: 1200\n",
    )
    .unwrap();
    assert_eq!(cfg.layout_mode().unwrap(), LayoutMode::Dagre);
    assert_eq!(cfg.viewport_width(), 1200.0);
    assert_eq!(cfg.viewport_height(), 600.0);
    assert_eq!(cfg.top_margin(), 150.0);
}

#[test]
fn json_overrides_are_validated() {
    let err = FlowConfig::from_json_str(r#"{"layout": {"mode": "spiral"}}"#).unwrap_err();
    assert!(matches!(err, Error::UnknownLayoutMode { .. }));

    let err = FlowConfig::from_json_str(r#"{"viewport": {"width": "wide"}}"#).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid config: `viewport.width` must be a number, got `\"wide\"`"
    );

    let err = FlowConfig::from_json_str("[1, 2]").unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn empty_yaml_document_yields_defaults() {
    let cfg = FlowConfig::from_yaml_str("").unwrap();
    assert_eq!(cfg, FlowConfig::defaults());
}

#[test]
fn set_value_creates_nested_objects() {
    let mut cfg = FlowConfig::empty_object();
    cfg.set_value("layout.topMargin", json!(40));
    cfg.set_value("viewport.width", json!(320.5));
    assert_eq!(cfg.top_margin(), 40.0);
    assert_eq!(cfg.viewport_width(), 320.5);
    assert_eq!(cfg.get_str("layout.mode"), None);
    assert_eq!(cfg.layout_mode().unwrap(), LayoutMode::Zigzag);

    let mut odd = FlowConfig::from_value(json!("not an object"));
    odd.set_value("layout.mode", json!("grid"));
    assert_eq!(odd.layout_mode().unwrap(), LayoutMode::Grid);
}
