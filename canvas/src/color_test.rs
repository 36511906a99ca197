use super::*;

#[test]
fn from_wire_masks_alpha_and_sign() {
    assert_eq!(Color::from_wire(0xFFFF_FFFF), Color::WHITE);
    assert_eq!(Color::from_wire(-1), Color::WHITE);
    assert_eq!(Color::from_wire(-16_777_216), Color::BLACK);
    assert_eq!(Color::from_wire(0xFF_0000).packed(), 0xFF_0000);
}

#[test]
fn from_f64_rejects_fractions_and_nan() {
    assert_eq!(Color::from_f64(16_711_680.0), Some(Color::new(0xFF_0000)));
    assert_eq!(Color::from_f64(1.5), None);
    assert_eq!(Color::from_f64(f64::NAN), None);
}

#[test]
fn parse_hex_supports_short_and_long_forms() {
    assert_eq!(Color::parse_hex("#ABC"), Some(Color::from_rgb(170, 187, 204)));
    assert_eq!(Color::parse_hex("  #a1B2c3 "), Some(Color::from_rgb(161, 178, 195)));
}

#[test]
fn parse_hex_rejects_invalid_inputs() {
    assert_eq!(Color::parse_hex("AABBCC"), None);
    assert_eq!(Color::parse_hex("#12"), None);
    assert_eq!(Color::parse_hex("#abcd"), None);
    assert_eq!(Color::parse_hex("#12GG34"), None);
    assert_eq!(Color::parse_hex("#+12345"), None);
}

#[test]
fn parse_css_rgb_reads_computed_style_values() {
    assert_eq!(Color::parse_css_rgb("rgb(255, 165, 0)"), Some(Color::from_rgb(255, 165, 0)));
    assert_eq!(Color::parse_css_rgb("rgba(1, 2, 3, 0.5)"), Some(Color::from_rgb(1, 2, 3)));
    assert_eq!(Color::parse_css_rgb("rgb(256, 0, 0)"), None);
    assert_eq!(Color::parse_css_rgb("hsl(0, 0%, 0%)"), None);
}

#[test]
fn to_hex_is_zero_padded_lowercase() {
    assert_eq!(Color::new(0xAB).to_hex(), "#0000ab");
    assert_eq!(Color::WHITE.to_hex(), "#ffffff");
    assert_eq!(Color::new(0xFF_0000).to_string(), "#ff0000");
}

#[test]
fn css_rgba_uses_channel_values() {
    assert_eq!(Color::new(0xFF_8000).to_css_rgba(0.5), "rgba(255, 128, 0, 0.5)");
}

#[test]
fn named_palette_lookup_is_case_insensitive() {
    assert_eq!(Color::named("Orange"), Some(Color::from_rgb(255, 165, 0)));
    assert_eq!(Color::named("teal"), None);
    assert_eq!(Color::parse_any("brown"), Some(Color::from_rgb(165, 42, 42)));
    assert_eq!(Color::parse_any("#00ff00"), Some(Color::new(0x00_FF00)));
}

#[test]
fn deserialize_accepts_signed_unsigned_float_and_hex() {
    let colors: Vec<Color> =
        serde_json::from_str(r##"[-1, 4294967295, 16711680.0, "#00ff00", 255]"##).expect("parse");
    assert_eq!(
        colors,
        vec![Color::WHITE, Color::WHITE, Color::new(0xFF_0000), Color::new(0x00_FF00), Color::new(0xFF)]
    );
}

#[test]
fn deserialize_rejects_garbage() {
    assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
    assert!(serde_json::from_str::<Color>("0.25").is_err());
    assert!(serde_json::from_str::<Color>("true").is_err());
}

#[test]
fn serialize_emits_packed_integer() {
    assert_eq!(serde_json::to_string(&Color::new(0xFF_0000)).expect("serialize"), "16711680");
}
