use super::*;

#[test]
fn clamp_holds_boundary_values() {
    let opts = InterpOpts::clamp();
    assert_eq!(interpolate(-5.0, &[0.0, 10.0], &[0.0, 1.0], opts).unwrap(), 0.0);
    assert_eq!(interpolate(50.0, &[0.0, 10.0], &[0.0, 1.0], opts).unwrap(), 1.0);
}

#[test]
fn exact_breakpoint_returns_stored_value() {
    let v = interpolate(10.0, &[0.0, 10.0, 20.0], &[0.0, 5.0, 0.0], InterpOpts::default()).unwrap();
    assert_eq!(v, 5.0);

    // A value that would drift under naive lerp arithmetic.
    let table = KeyframeTable::new(vec![0.0, 3.0, 7.0], vec![0.1, 0.7, 0.3]).unwrap();
    assert_eq!(table.sample(3.0, InterpOpts::clamp()), 0.7);
    assert_eq!(table.sample(7.0, InterpOpts::clamp()), 0.3);
}

#[test]
fn interior_values_are_piecewise_linear() {
    let table = KeyframeTable::new(vec![0.0, 10.0, 20.0], vec![0.0, 5.0, 0.0]).unwrap();
    assert_eq!(table.sample(5.0, InterpOpts::clamp()), 2.5);
    assert_eq!(table.sample(15.0, InterpOpts::clamp()), 2.5);
}

#[test]
fn extend_continues_nearest_slope() {
    let table = KeyframeTable::new(vec![0.0, 10.0, 20.0], vec![0.0, 10.0, 30.0]).unwrap();
    let opts = InterpOpts::extend();
    assert_eq!(table.sample(-5.0, opts), -5.0);
    assert_eq!(table.sample(25.0, opts), 40.0);
}

#[test]
fn left_and_right_policies_are_independent() {
    let table = KeyframeTable::new(vec![0.0, 10.0], vec![0.0, 1.0]).unwrap();
    let opts = InterpOpts {
        left: Extrapolate::Clamp,
        right: Extrapolate::Extend,
        ease: Ease::Linear,
    };
    assert_eq!(table.sample(-10.0, opts), 0.0);
    assert_eq!(table.sample(20.0, opts), 2.0);
}

#[test]
fn easing_shapes_progress_inside_segments() {
    let table = KeyframeTable::new(vec![0.0, 10.0], vec![0.0, 100.0]).unwrap();
    let eased = table.sample(5.0, InterpOpts::clamp().with_ease(Ease::OutCubic));
    assert!((eased - 87.5).abs() < 1e-9);
    let eased = table.sample(5.0, InterpOpts::clamp().with_ease(Ease::InCubic));
    assert!((eased - 12.5).abs() < 1e-9);
}

#[test]
fn rejects_malformed_ranges() {
    let err = KeyframeTable::new(vec![0.0, 10.0], vec![0.0]).unwrap_err();
    assert_eq!(err.field(), Some("output_range"));

    let err = KeyframeTable::new(vec![0.0, 10.0, 10.0], vec![0.0, 1.0, 2.0]).unwrap_err();
    assert_eq!(err.field(), Some("input_range[2]"));

    let err = KeyframeTable::<f64>::new(vec![0.0], vec![0.0]).unwrap_err();
    assert_eq!(err.field(), Some("input_range"));

    assert!(KeyframeTable::new(vec![0.0, f64::NAN], vec![0.0, 1.0]).is_err());
}

#[test]
fn colors_interpolate_per_channel() {
    let table = KeyframeTable::new(
        vec![0.0, 10.0],
        vec![Rgba8::rgb(0, 0, 0), Rgba8::rgb(255, 100, 50)],
    )
    .unwrap();
    assert_eq!(table.sample(5.0, InterpOpts::clamp()), Rgba8::rgb(128, 50, 25));
    assert_eq!(table.sample(99.0, InterpOpts::extend()).r, 255);
}

#[test]
fn deserialize_validates_table() {
    let ok: KeyframeTable = serde_json::from_str(r#"{"input":[0,1],"output":[2,3]}"#).unwrap();
    assert_eq!(ok.sample(0.5, InterpOpts::clamp()), 2.5);
    assert!(serde_json::from_str::<KeyframeTable>(r#"{"input":[1,0],"output":[2,3]}"#).is_err());
}
