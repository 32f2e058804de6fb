use super::*;

fn fps24() -> Fps {
    Fps::whole(24).unwrap()
}

#[test]
fn over_damped_is_monotonic_and_converges() {
    let spring = Spring::new(SpringParams::new(1.0, 200.0, 100.0), fps24(), None).unwrap();
    let mut prev = spring.sample(0.0);
    assert_eq!(prev, 0.0);
    for f in 1..2000 {
        let v = spring.sample(f64::from(f));
        assert!(v >= prev - 1e-12, "decreased at frame {f}");
        assert!(v <= 1.0 + 1e-12);
        prev = v;
    }
    assert!((prev - 1.0).abs() < 1e-6);
}

#[test]
fn under_damped_overshoots_then_settles_in_window() {
    let params = SpringParams::new(0.5, 12.0, 150.0);
    assert!(params.damping_ratio() < 1.0);
    let spring = Spring::new(params, fps24(), Some(24.0)).unwrap();

    let max = (0..=24)
        .map(|f| spring.sample(f64::from(f)))
        .fold(f64::MIN, f64::max);
    assert!(max > 1.0, "expected overshoot, max was {max}");
    assert!((spring.sample(24.0) - 1.0).abs() < 0.01);
    assert!((spring.sample(240.0) - 1.0).abs() < 0.01);
}

#[test]
fn critically_damped_settles_in_window() {
    // zeta = 20 / (2 * sqrt(100)) = 1
    let spring = Spring::new(SpringParams::new(1.0, 20.0, 100.0), fps24(), Some(12.0)).unwrap();
    assert!((spring.sample(12.0) - 1.0).abs() <= REST_THRESHOLD + 1e-12);
    assert!(spring.sample(6.0) < 1.0);
}

#[test]
fn overshoot_clamping_caps_at_target() {
    let params = SpringParams {
        overshoot_clamping: true,
        ..SpringParams::new(0.5, 12.0, 150.0)
    };
    let spring = Spring::new(params, fps24(), Some(24.0)).unwrap();
    for f in 0..48 {
        assert!(spring.sample(f64::from(f)) <= 1.0);
    }
}

#[test]
fn initial_velocity_speeds_up_departure() {
    let still = Spring::new(SpringParams::new(1.0, 20.0, 100.0), fps24(), None).unwrap();
    let pushed = Spring::new(
        SpringParams {
            initial_velocity: 5.0,
            ..SpringParams::new(1.0, 20.0, 100.0)
        },
        fps24(),
        None,
    )
    .unwrap();
    assert!(pushed.sample(1.0) > still.sample(1.0));
}

#[test]
fn sampling_is_order_independent() {
    let spring = Spring::new(SpringParams::new(0.2, 10.0, 200.0), fps24(), Some(3.0)).unwrap();
    let forward: Vec<f64> = (0..30).map(|f| spring.sample(f64::from(f))).collect();
    let backward: Vec<f64> = (0..30).rev().map(|f| spring.sample(f64::from(f))).collect();
    let backward: Vec<f64> = backward.into_iter().rev().collect();
    assert_eq!(forward, backward);
}

#[test]
fn negative_frames_sit_at_start() {
    let spring = Spring::new(SpringParams::default(), fps24(), None).unwrap();
    assert_eq!(spring.sample(-4.0), 0.0);
}

#[test]
fn rejects_invalid_params() {
    let err = Spring::new(SpringParams::new(0.0, 10.0, 100.0), fps24(), None).unwrap_err();
    assert_eq!(err.field(), Some("spring.mass"));

    let err = Spring::new(SpringParams::new(1.0, 10.0, -1.0), fps24(), None).unwrap_err();
    assert_eq!(err.field(), Some("spring.stiffness"));

    let err = Spring::new(SpringParams::new(1.0, 0.0, 100.0), fps24(), Some(10.0)).unwrap_err();
    assert_eq!(err.field(), Some("spring.damping"));

    let err = Spring::new(SpringParams::default(), fps24(), Some(0.0)).unwrap_err();
    assert_eq!(err.field(), Some("spring.duration_window_frames"));

    // Undamped springs are fine without a window; they just never settle.
    assert!(Spring::new(SpringParams::new(1.0, 0.0, 100.0), fps24(), None).is_ok());
}

#[test]
fn one_shot_matches_bound_spring() {
    let params = SpringParams::new(1.0, 200.0, 100.0);
    let bound = Spring::new(params, fps24(), Some(120.0)).unwrap();
    assert_eq!(
        spring_value(30.0, fps24(), params, Some(120.0)).unwrap(),
        bound.sample(30.0)
    );
}
