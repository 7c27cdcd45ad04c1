use super::*;

#[test]
fn default_config_resolves() {
    let config = PlayerConfig::default();
    let plan = config.resolve_timing().unwrap();
    assert_eq!(plan.bpm, 120);
    assert_eq!(plan.word_secs, 0.5);
    assert_eq!(plan.fade_in_secs, 0.125);
    assert_eq!(plan.fade_out_secs, 0.125);
    assert_eq!(plan.gap_secs, 0.0);
    assert_eq!(plan.seconds_per_beat, 0.5);
    assert_eq!(plan.bar_secs, 2.0);
}

#[test]
fn zero_bpm_is_rejected_but_out_of_range_is_clamped() {
    let mut timing = TimingSettings::default();
    timing.bpm = 0;
    assert!(timing.resolve().is_err());

    timing.bpm = 400;
    assert_eq!(timing.resolve().unwrap().bpm, 300);
    timing.bpm = 5;
    assert_eq!(timing.resolve().unwrap().bpm, 20);
}

#[test]
fn time_signature_bounds_are_enforced() {
    let mut timing = TimingSettings::default();
    timing.time_sig_num = 0;
    assert!(timing.resolve().is_err());
    timing.time_sig_num = 17;
    assert!(timing.resolve().is_err());
    timing.time_sig_num = 4;
    timing.time_sig_den = 5;
    assert!(timing.resolve().is_err());
}

#[test]
fn malformed_note_tokens_are_rejected() {
    let mut timing = TimingSettings::default();
    timing.gap_note = "1/7".to_owned();
    assert!(timing.resolve().is_err());

    let mut timing = TimingSettings::default();
    timing.word_note = "none".to_owned();
    assert!(timing.resolve().is_err(), "a word must have a duration");
}

#[test]
fn negative_gap_flag_flips_the_sign() {
    let mut timing = TimingSettings::default();
    timing.gap_note = "1/4".to_owned();
    timing.gap_is_negative = true;
    assert_eq!(timing.resolve().unwrap().gap_secs, -0.5);
}

#[test]
fn loop_counts_must_be_positive() {
    let mut looping = LoopSettings::default();
    looping.loop_bars = 0;
    assert!(looping.validate().is_err());
    looping = LoopSettings::default();
    looping.loop_times = 0;
    assert!(looping.validate().is_err());
}

#[test]
fn pass_count_and_budget_follow_the_mode() {
    let plan = TimingSettings::default().resolve().unwrap();

    let disabled = LoopSettings::default();
    assert_eq!(disabled.pass_count(), Some(1));
    assert_eq!(disabled.pass_budget_secs(&plan), None);

    let by_bars = LoopSettings {
        enabled: true,
        mode: LoopMode::ByBars,
        loop_bars: 3,
        loop_times: 4,
        infinite: false,
    };
    assert_eq!(by_bars.pass_count(), Some(4));
    assert_eq!(by_bars.pass_budget_secs(&plan), Some(6.0));

    let infinite = LoopSettings {
        infinite: true,
        enabled: true,
        ..by_bars
    };
    assert_eq!(infinite.pass_count(), None);

    let all_words = LoopSettings {
        enabled: true,
        mode: LoopMode::AllWords,
        ..LoopSettings::default()
    };
    assert_eq!(all_words.pass_budget_secs(&plan), None);
}

#[test]
fn mp4_with_transparency_is_rejected() {
    let appearance = AppearanceSettings::default();
    let mut export = ExportSettings::default();
    export.transparent_background = true;
    assert!(export.resolve(&appearance).is_err());

    export.format = ExportFormat::Mov;
    assert!(export.resolve(&appearance).is_ok());
}

#[test]
fn default_resolution_derives_from_the_aspect_ratio() {
    let mut appearance = AppearanceSettings::default();
    let mut export = ExportSettings::default();
    export.width = 0;
    export.height = 0;

    let (_, canvas) = export.resolve(&appearance).unwrap();
    assert_eq!((canvas.width, canvas.height), (1920, 1080));

    appearance.aspect_ratio = "9:16".to_owned();
    let (_, canvas) = export.resolve(&appearance).unwrap();
    assert_eq!((canvas.width, canvas.height), (1080, 1920));

    appearance.aspect_ratio = "1:1".to_owned();
    let (_, canvas) = export.resolve(&appearance).unwrap();
    assert_eq!((canvas.width, canvas.height), (1080, 1080));

    appearance.aspect_ratio = "wide".to_owned();
    assert!(export.resolve(&appearance).is_err());
}

#[test]
fn export_format_tokens_parse() {
    assert_eq!(ExportFormat::parse("mp4").unwrap(), ExportFormat::Mp4);
    assert_eq!(ExportFormat::parse("MOV").unwrap(), ExportFormat::Mov);
    assert_eq!(
        ExportFormat::parse("png_sequence").unwrap(),
        ExportFormat::ImageSequence
    );
    assert!(ExportFormat::parse("webm").is_err());
    assert_eq!(ExportFormat::Avi.extension(), Some("avi"));
    assert_eq!(ExportFormat::ImageSequence.extension(), None);
}

#[test]
fn config_json_round_trips() {
    let config = PlayerConfig::default();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let back = PlayerConfig::from_json_str(&json).unwrap();
    assert_eq!(config, back);
}

#[test]
fn partial_config_json_fills_in_defaults() {
    let config =
        PlayerConfig::from_json_str(r#"{"timing": {"bpm": 90, "gap_note": "1/8"}}"#).unwrap();
    assert_eq!(config.timing.bpm, 90);
    assert_eq!(config.timing.gap_note, "1/8");
    assert_eq!(config.timing.word_note, "1/4");
    assert_eq!(config.start_word, 1);
    assert!(config.count_in);
}

#[test]
fn metronome_volume_is_bounded() {
    let mut config = PlayerConfig::default();
    config.metronome.volume = 1.5;
    assert!(config.resolve_timing().is_err());
    config.metronome.volume = 1.0;
    assert!(config.resolve_timing().is_ok());
}
