use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::whole(30).is_ok());
}

#[test]
fn fps_frame_math() {
    let fps = Fps::whole(30).unwrap();
    assert_eq!(fps.as_f64(), 30.0);
    assert_eq!(fps.frame_duration_secs(), 1.0 / 30.0);
    assert_eq!(fps.secs_to_frames_round(1.0), 30);
    assert_eq!(fps.secs_to_frames_round(0.016), 0);
    assert_eq!(fps.secs_to_frames_round(0.017), 1);
    assert_eq!(fps.secs_to_frames_round(-1.0), 0);
}

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 1080).is_err());
    assert!(Canvas::new(1920, 0).is_err());
    assert_eq!(Canvas::new(4, 2).unwrap().pixels(), 8);
}

#[test]
fn rgb8_hex_round_trip() {
    let c = Rgb8::from_hex("#1a2B3c").unwrap();
    assert_eq!(c, Rgb8::new(0x1a, 0x2b, 0x3c));
    assert_eq!(c.to_string(), "#1a2b3c");
    assert_eq!(Rgb8::from_hex("ffffff").unwrap(), Rgb8::new(255, 255, 255));
}

#[test]
fn rgb8_rejects_malformed_hex() {
    assert!(Rgb8::from_hex("#fff").is_err());
    assert!(Rgb8::from_hex("#gggggg").is_err());
    assert!(Rgb8::from_hex("").is_err());
}

#[test]
fn rgb8_serde_as_hex_string() {
    let json = serde_json::to_string(&Rgb8::new(255, 0, 16)).unwrap();
    assert_eq!(json, "\"#ff0010\"");
    let back: Rgb8 = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Rgb8::new(255, 0, 16));
}
