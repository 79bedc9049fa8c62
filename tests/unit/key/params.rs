use super::*;

#[test]
fn defaults_match_splash_constants() {
    let p = KeyParams::default();
    assert_eq!(p.key_color, [0.0, 1.0, 0.031]);
    assert_eq!(p.threshold, 0.45);
    assert_eq!(p.smoothing, 0.15);
    assert_eq!(p.spill_low, 0.30);
    assert_eq!(p.spill_high, 0.55);
    p.validate().unwrap();
}

#[test]
fn band_edges_surround_threshold() {
    let p = KeyParams::default();
    assert!((p.key_low() - 0.30).abs() < 1e-6);
    assert!((p.key_high() - 0.60).abs() < 1e-6);
}

#[test]
fn hex_key_color_parses() {
    let rgb = parse_hex_rgb("#00FF08").unwrap();
    assert_eq!(rgb[0], 0.0);
    assert_eq!(rgb[1], 1.0);
    assert!((rgb[2] - 8.0 / 255.0).abs() < 1e-6);
    assert!(parse_hex_rgb("00ff08").is_ok());
    assert!(parse_hex_rgb("#00FF0").is_err());
    assert!(parse_hex_rgb("#GGFF08").is_err());
}

#[test]
fn hex_key_color_allows_at_most_one_hash() {
    assert!(parse_hex_rgb(" #00FF08 ").is_ok());
    assert!(parse_hex_rgb("##00FF08").is_err());
    assert!(parse_hex_rgb("#").is_err());
}

#[test]
fn json_accepts_hex_and_array_key_colors() {
    let p: KeyParams = serde_json::from_str(r##"{ "key_color": "#0000FF" }"##).unwrap();
    assert_eq!(p.key_color, [0.0, 0.0, 1.0]);
    assert_eq!(p.threshold, 0.45);

    let p: KeyParams =
        serde_json::from_str(r#"{ "key_color": [0.1, 0.9, 0.2], "threshold": 0.3 }"#).unwrap();
    assert_eq!(p.key_color, [0.1, 0.9, 0.2]);
    assert_eq!(p.threshold, 0.3);
    assert_eq!(p.smoothing, 0.15);
}

#[test]
fn json_rejects_unknown_fields() {
    assert!(serde_json::from_str::<KeyParams>(r#"{ "tolerance": 0.2 }"#).is_err());
}

#[test]
fn validate_rejects_degenerate_bands() {
    let p = KeyParams {
        smoothing: 0.0,
        ..KeyParams::default()
    };
    assert!(p.validate().is_err());

    let p = KeyParams {
        spill_low: 0.6,
        spill_high: 0.5,
        ..KeyParams::default()
    };
    assert!(p.validate().is_err());

    let p = KeyParams {
        key_color: [0.0, 1.2, 0.0],
        ..KeyParams::default()
    };
    assert!(p.validate().is_err());

    let p = KeyParams {
        threshold: f32::NAN,
        ..KeyParams::default()
    };
    assert!(p.validate().is_err());
}
