use super::*;
use serde_json::json;

fn fps24() -> Fps {
    Fps::whole(24).unwrap()
}

fn at(profile: &Profile, local: f64) -> VisualState {
    profile.sample(SampleCtx {
        frame: local.max(0.0) as u64,
        local,
    })
}

#[test]
fn fade_scenario_entry_and_exit_windows() {
    let spec = ProfileSpec::new("fade_in_out", json!({ "entry_frames": 10, "exit_frames": 10 }));
    let fade = Profile::resolve(&spec, fps24(), 100).unwrap();

    assert_eq!(at(&fade, 0.0).opacity, 0.0);
    assert_eq!(at(&fade, 5.0).opacity, 0.5);
    for f in 10..=89 {
        assert_eq!(at(&fade, f64::from(f)).opacity, 1.0, "frame {f}");
    }
    assert_eq!(at(&fade, 100.0).opacity, 0.0);
    assert_eq!(at(&fade, 150.0).opacity, 0.0);
    assert_eq!(at(&fade, -3.0).opacity, 0.0);
}

#[test]
fn fade_without_entry_starts_visible() {
    let spec = ProfileSpec::new("fade", json!({ "entry_frames": 0, "exit_frames": 30 }));
    let fade = Profile::resolve(&spec, fps24(), 240).unwrap();
    assert_eq!(at(&fade, 0.0).opacity, 1.0);
    assert_eq!(at(&fade, 210.0).opacity, 1.0);
    assert_eq!(at(&fade, 240.0).opacity, 0.0);
}

#[test]
fn fade_windows_must_fit_duration() {
    let spec = ProfileSpec::new("fade_in_out", json!({ "entry_frames": 60, "exit_frames": 60 }));
    let err = Profile::resolve(&spec, fps24(), 100).unwrap_err();
    assert_eq!(err.field(), Some("params"));

    let spec = ProfileSpec::new("fade_in_out", json!({ "peak": 1.5 }));
    let err = Profile::resolve(&spec, fps24(), 100).unwrap_err();
    assert_eq!(err.field(), Some("params.peak"));
}

#[test]
fn unknown_kind_and_bad_params_are_config_errors() {
    let err = Profile::resolve(&ProfileSpec::tag("wobble"), fps24(), 10).unwrap_err();
    assert_eq!(err.field(), Some("kind"));
    assert!(err.to_string().contains("unknown animation profile 'wobble'"));

    let err = Profile::resolve(&ProfileSpec::new("zoom", json!([1, 2])), fps24(), 10).unwrap_err();
    assert_eq!(err.field(), Some("params"));

    let err = Profile::resolve(&ProfileSpec::new("zoom", json!({ "zoom": 2 })), fps24(), 10)
        .unwrap_err();
    assert_eq!(err.field(), Some("params"));

    let err = Profile::resolve(&ProfileSpec::tag("zoom"), fps24(), 0).unwrap_err();
    assert_eq!(err.field(), Some("duration_frames"));
}

#[test]
fn kind_parsing_is_case_and_dash_insensitive() {
    let a = Profile::resolve(&ProfileSpec::tag("Fade-In-Out"), fps24(), 100).unwrap();
    let b = Profile::resolve(&ProfileSpec::tag("fade_in_out"), fps24(), 100).unwrap();
    assert_eq!(a, b);
}

#[test]
fn zoom_grows_monotonically_to_target() {
    let spec = ProfileSpec::new("zoom", json!({ "target_scale": 1.15 }));
    let zoom = Profile::resolve(&spec, fps24(), 120).unwrap();
    let mut prev = 0.0;
    for f in 0..=120 {
        let s = at(&zoom, f64::from(f));
        assert!(s.scale_x >= prev);
        assert!(s.scale_x <= 1.15 + 1e-12);
        assert_eq!(s.scale_x, s.scale_y);
        prev = s.scale_x;
    }
    assert_eq!(at(&zoom, 0.0).scale_x, 1.0);
    assert_eq!(at(&zoom, 120.0).scale_x, 1.15);
    assert_eq!(at(&zoom, 500.0).scale_x, 1.15);
}

#[test]
fn shake_is_deterministic_and_stops_after_active_window() {
    let shake = Profile::resolve(&ProfileSpec::tag("shake"), fps24(), 100).unwrap();
    let s = at(&shake, 5.0);
    assert_eq!(s.translate_x, (5.0f64 * 0.5).sin() * 3.0);
    assert_eq!(s.translate_y, (5.0f64 * 0.7).cos() * 2.0);
    assert_eq!(at(&shake, 5.0), s);

    let after = at(&shake, 25.0);
    assert_eq!(after.translate_x, 0.0);
    assert_eq!(after.translate_y, 0.0);
}

#[test]
fn shake_decay_ramps_amplitude_down() {
    let spec = ProfileSpec::new("shake", json!({ "active_frames": 10, "decay_frames": 10 }));
    let shake = Profile::resolve(&spec, fps24(), 100).unwrap();
    let mid = at(&shake, 15.0);
    assert!((mid.translate_y - (15.0f64 * 0.7).cos() * 2.0 * 0.5).abs() < 1e-12);
    assert_eq!(at(&shake, 20.0).translate_x, 0.0);
}

#[test]
fn rotate_peaks_at_midpoint() {
    let rotate = Profile::resolve(&ProfileSpec::tag("rotate"), fps24(), 100).unwrap();
    assert_eq!(at(&rotate, 0.0).rotation_deg, 0.0);
    assert_eq!(at(&rotate, 50.0).rotation_deg, 1.0);
    assert_eq!(at(&rotate, 100.0).rotation_deg, 0.0);

    let err = Profile::resolve(
        &ProfileSpec::new("rotate", json!({ "peak_deg": 3.0 })),
        fps24(),
        100,
    )
    .unwrap_err();
    assert_eq!(err.field(), Some("params.peak_deg"));
}

#[test]
fn spring_entrance_bounces_into_place() {
    let spec = ProfileSpec::new(
        "scale",
        json!({
            "spring": { "mass": 0.5, "damping": 12, "stiffness": 150 },
            "window_frames": 24
        }),
    );
    let entrance = Profile::resolve(&spec, fps24(), 120).unwrap();
    assert_eq!(at(&entrance, 0.0).scale_x, 0.0);
    let max = (0..=24)
        .map(|f| at(&entrance, f64::from(f)).scale_x)
        .fold(f64::MIN, f64::max);
    assert!(max > 1.0);
    assert!((at(&entrance, 24.0).scale_x - 1.0).abs() < 0.01);
}

#[test]
fn spring_entrance_reports_nested_param_errors() {
    let spec = ProfileSpec::new("bounce", json!({ "spring": { "mass": 0 } }));
    let err = Profile::resolve(&spec, fps24(), 24).unwrap_err();
    assert_eq!(err.field(), Some("params.spring.mass"));
}

#[test]
fn typewriter_reveals_then_blinks() {
    let spec = ProfileSpec::new(
        "typewriter",
        json!({ "text": "hello", "chars_per_second": 8, "base_color": "#FF6B6B" }),
    );
    let tw = Profile::resolve(&spec, fps24(), 120).unwrap();

    let typing = at(&tw, 4.0);
    assert_eq!(typing.color, Some(Rgba8::rgb(0xFF, 0x6B, 0x6B)));
    let reveal = typing.text.unwrap();
    assert_eq!(reveal.visible_chars, 1);
    assert_eq!(reveal.total_chars, 5);
    assert_eq!(reveal.caret_opacity, 1.0);
    let active = reveal.active.unwrap();
    assert_eq!(active.index, 0);
    assert_eq!(active.color, color_for('h', 0));
    assert_eq!(active.size_multiplier, 1.4);
    let entrance = Spring::new(SpringParams::new(0.2, 10.0, 200.0), fps24(), Some(3.0)).unwrap();
    let bounce = 1.1 + 0.2 * (4.0f64 * 0.8).sin();
    assert!((active.scale - entrance.sample(4.0) * bounce).abs() < 1e-12);
    assert!((active.glow - (0.75 + 0.25 * 2.0f64.sin())).abs() < 1e-12);
    assert!((0.5..=1.0).contains(&active.glow));

    let done = at(&tw, 16.0).text.unwrap();
    assert_eq!(done.visible_chars, 5);
    // the last character keeps its highlight once typing ends
    let last = done.active.unwrap();
    assert_eq!(last.index, 4);
    assert_eq!(last.color, color_for('o', 4));
    // sin(4.8) < 0
    assert_eq!(done.caret_opacity, 0.3);
    // sin(6.6) > 0
    assert_eq!(at(&tw, 22.0).text.unwrap().caret_opacity, 1.0);
}

#[test]
fn typewriter_speed_defaults_to_fitted_rate() {
    let text = "x".repeat(32);
    let spec = ProfileSpec::new("typewriter", json!({ "text": text }));
    // 120 frames at 24 fps = 5 s, 32 chars / 4 s = 8 chars/s.
    let Profile::Typewriter(tw) = Profile::resolve(&spec, fps24(), 120).unwrap() else {
        panic!("expected typewriter");
    };
    assert!((tw.typewriter().frames_per_char() - 3.0).abs() < 1e-12);
}

#[test]
fn pulse_repeats_every_period() {
    let spec = ProfileSpec::new(
        "pulse",
        json!({ "period_frames": 20, "min_scale": 0.9, "max_scale": 1.1 }),
    );
    let pulse = Profile::resolve(&spec, fps24(), 500).unwrap();
    assert_eq!(at(&pulse, 0.0).scale_x, 0.9);
    assert_eq!(at(&pulse, 10.0).scale_x, 1.1);
    assert_eq!(at(&pulse, 20.0).scale_x, 0.9);
    assert_eq!(at(&pulse, 30.0).scale_x, 1.1);
    assert_eq!(at(&pulse, 7.0), at(&pulse, 207.0));
}

#[test]
fn strobe_dims_on_period() {
    let strobe = Profile::resolve(&ProfileSpec::tag("strobe"), fps24(), 100).unwrap();
    let opacities: Vec<f64> = (0..7).map(|f| at(&strobe, f64::from(f)).opacity).collect();
    assert_eq!(opacities, vec![0.8, 0.8, 0.8, 1.0, 1.0, 1.0, 0.8]);

    let err = Profile::resolve(
        &ProfileSpec::new("strobe", json!({ "period_frames": 0 })),
        fps24(),
        100,
    )
    .unwrap_err();
    assert_eq!(err.field(), Some("params.period_frames"));
}

#[test]
fn blur_in_and_slide_in_settle() {
    let blur = Profile::resolve(
        &ProfileSpec::new("blur_in", json!({ "from_px": 20, "frames": 48 })),
        fps24(),
        240,
    )
    .unwrap();
    assert_eq!(at(&blur, 0.0).blur_px, 20.0);
    assert_eq!(at(&blur, 24.0).blur_px, 10.0);
    assert_eq!(at(&blur, 48.0).blur_px, 0.0);

    let slide = Profile::resolve(&ProfileSpec::tag("slide_in"), fps24(), 240).unwrap();
    assert_eq!(at(&slide, 0.0).translate_y, 100.0);
    assert!(at(&slide, 5.0).translate_y < 100.0 * (1.0 - 5.0 / 15.0));
    assert_eq!(at(&slide, 15.0).translate_y, 0.0);
}

#[test]
fn call_to_action_swipes_clicks_and_exits() {
    let cta = Profile::resolve(&ProfileSpec::tag("call_to_action"), fps24(), 72).unwrap();

    let start = at(&cta, 0.0);
    assert_eq!(start.opacity, 0.0);
    assert_eq!(start.translate_x, -300.0);

    let settled = at(&cta, 20.0);
    assert_eq!(settled.opacity, 1.0);
    assert_eq!(settled.translate_x, 0.0);

    // Click squash dips below 1 partway in.
    assert!(at(&cta, 13.0).scale_x < 1.0);
    assert_eq!(at(&cta, 30.0).scale_x, 1.0);

    let gone = at(&cta, 50.0);
    assert_eq!(gone.opacity, 0.0);
    assert_eq!(gone.translate_x, 800.0);

    let Profile::CallToAction(inner) = &cta else {
        panic!("expected call to action");
    };
    assert_eq!(inner.exit_start(), 36.0);
}

#[test]
fn tint_interpolates_colors() {
    let spec = ProfileSpec::new("tint", json!({ "from": "#000000", "to": "#FFFFFF" }));
    let tint = Profile::resolve(&spec, fps24(), 10).unwrap();
    assert_eq!(at(&tint, 5.0).color, Some(Rgba8::rgb(128, 128, 128)));
    assert_eq!(at(&tint, 10.0).color, Some(Rgba8::WHITE));
}

#[test]
fn lighting_flickers_and_drifts_hue() {
    let lighting = Profile::resolve(&ProfileSpec::tag("lighting"), fps24(), 240).unwrap();
    assert!((at(&lighting, 0.0).brightness - 1.0).abs() < 1e-12);
    assert_eq!(at(&lighting, 0.0).hue_rotate_deg, 0.0);

    let s = at(&lighting, 12.0);
    assert!((s.brightness - (1.0 + 0.1 * 1.2_f64.sin())).abs() < 1e-12);
    assert!((s.hue_rotate_deg - 1.2).abs() < 1e-12);
    assert_eq!(s.opacity, 1.0);
    assert!(
        (0..240)
            .map(|f| at(&lighting, f64::from(f)).brightness)
            .all(|b| (0.9..=1.1).contains(&b))
    );

    let stacked = VisualState::default().compose(&s).compose(&s);
    assert!((stacked.brightness - s.brightness * s.brightness).abs() < 1e-12);
    assert!((stacked.hue_rotate_deg - 2.4).abs() < 1e-12);

    let bad = ProfileSpec::new(
        "lighting",
        json!({ "min_brightness": 1.2, "max_brightness": 1.0 }),
    );
    let err = Profile::resolve(&bad, fps24(), 10).unwrap_err();
    assert_eq!(err.field(), Some("params.max_brightness"));
}

#[test]
fn stack_composes_multiplicatively() {
    let fade = Profile::resolve(
        &ProfileSpec::new("fade_in_out", json!({ "entry_frames": 10, "exit_frames": 10 })),
        fps24(),
        100,
    )
    .unwrap();
    let strobe = Profile::resolve(&ProfileSpec::tag("strobe"), fps24(), 100).unwrap();
    let zoom = Profile::resolve(
        &ProfileSpec::new("zoom", json!({ "target_scale": 2.0 })),
        fps24(),
        100,
    )
    .unwrap();

    let s = sample_stack(&[fade, strobe, zoom], SampleCtx::new(102, 100));
    assert_eq!(s.opacity, 0.2 * 0.8);
    assert_eq!(s.scale_x, 1.02);
}

#[test]
fn evaluation_order_does_not_matter() {
    let spec = ProfileSpec::new(
        "spring_entrance",
        json!({ "spring": { "mass": 0.5, "damping": 12, "stiffness": 150 } }),
    );
    let profile = Profile::resolve(&spec, fps24(), 48).unwrap();
    let forward: Vec<VisualState> = (0..48).map(|f| at(&profile, f64::from(f))).collect();
    let mut backward: Vec<VisualState> = (0..48).rev().map(|f| at(&profile, f64::from(f))).collect();
    backward.reverse();
    assert_eq!(forward, backward);
    assert_eq!(
        evaluate(&spec, fps24(), 48, SampleCtx::new(17, 0)).unwrap(),
        forward[17]
    );
}

#[test]
fn transform_scales_about_anchor() {
    let state = VisualState {
        scale_x: 2.0,
        scale_y: 2.0,
        translate_x: 5.0,
        ..VisualState::default()
    };
    let t = state.transform(Vec2::new(10.0, 10.0));
    assert_eq!(t * kurbo::Point::new(10.0, 10.0), kurbo::Point::new(15.0, 10.0));
    assert_eq!(t * kurbo::Point::new(11.0, 10.0), kurbo::Point::new(17.0, 10.0));
}
