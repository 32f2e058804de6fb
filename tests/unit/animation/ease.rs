use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::ALL {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }
}

#[test]
fn monotonic_on_unit_interval() {
    for ease in Ease::ALL {
        let mut prev = ease.apply(0.0);
        for i in 1..=100 {
            let v = ease.apply(f64::from(i) / 100.0);
            assert!(v >= prev, "{ease:?} decreased at step {i}");
            prev = v;
        }
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::OutCubic.apply(-3.0), 0.0);
    assert_eq!(Ease::InCubic.apply(7.0), 1.0);
}

#[test]
fn parses_css_style_aliases() {
    let e: Ease = serde_json::from_str("\"ease_out_cubic\"").unwrap();
    assert_eq!(e, Ease::OutCubic);
    let e: Ease = serde_json::from_str("\"identity\"").unwrap();
    assert_eq!(e, Ease::Linear);
    assert!(serde_json::from_str::<Ease>("\"bogus\"").is_err());
}
