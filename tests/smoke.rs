#![allow(clippy::float_cmp)]

use binlayout::detail::{from_ordered, to_ordered};
use binlayout::{
    ErrorLimitingLayout, Layout, LayoutConfig, LayoutError, LogApproximation, LogLinear,
    LogLinearLayout, LogQuadratic, LogQuadraticLayout,
};

fn create<A: LogApproximation>(
    absolute_error: f64,
    relative_error: f64,
    min_value: f64,
    max_value: f64,
) -> Result<ErrorLimitingLayout<A>, LayoutError> {
    ErrorLimitingLayout::<A>::create(absolute_error, relative_error, min_value, max_value)
}

fn check_rejections<A: LogApproximation>() {
    for absolute_error in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-310] {
        assert!(matches!(
            create::<A>(absolute_error, 1e-2, 0.0, 1.0),
            Err(LayoutError::InvalidAbsoluteError(_))
        ));
    }

    for relative_error in [-0.1, 1.0, 1e3, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            create::<A>(1.0, relative_error, 0.0, 1.0),
            Err(LayoutError::InvalidRelativeError(_))
        ));
    }

    for (min, max) in [
        (0.0, f64::INFINITY),
        (-1e6, f64::INFINITY),
        (f64::NEG_INFINITY, 1e6),
        (1e6, 1e-6),
        (1.0, f64::NAN),
        (f64::NAN, 1.0),
        (0.0, -0.0),
    ] {
        assert!(matches!(
            create::<A>(1e-8, 1e-2, min, max),
            Err(LayoutError::InvalidRange { .. })
        ));
    }

    assert!(matches!(
        create::<A>(1e-6, 0.001, 0.0, f64::INFINITY),
        Err(LayoutError::InvalidRange { .. })
    ));

    for (absolute_error, relative_error, min, max) in [
        (1e-8, 1e-10, 1e-6, 1e6),
        (1e-8, 1e-10, i64::MIN as f64, 1e6),
        (1e-8, 1e-9, 1e-6, 1e6),
    ] {
        assert!(matches!(
            create::<A>(absolute_error, relative_error, min, max),
            Err(LayoutError::BinCountOverflow { .. } | LayoutError::InconsistentErrorBounds { .. })
        ));
    }

    assert!(matches!(
        create::<A>(1e-3, 0.0, -1e7, 1e7),
        Err(LayoutError::BinCountOverflow { .. })
    ));

    assert!(matches!(
        create::<A>(1.0, 1e-12, 0.0, 1.0),
        Err(LayoutError::InconsistentErrorBounds {
            absolute_error,
            relative_error,
        }) if absolute_error == 1.0 && relative_error == 1e-12
    ));
}

#[test]
fn test_rejections() {
    check_rejections::<LogLinear>();
    check_rejections::<LogQuadratic>();
}

#[test]
fn test_error_messages() {
    let e = LogLinearLayout::create(-1.0, 0.01, 0.0, 1.0).unwrap_err();
    assert_eq!(e.to_string(), "absolute error must be finite and positive, got -1");

    let e = LogLinearLayout::create(1.0, 0.01, 2.0, 1.0).unwrap_err();
    assert_eq!(e.to_string(), "invalid value range [2, 1]");

    let e = LogLinearLayout::create(1e-8, 1e-10, 1e-6, 1e6).unwrap_err();
    assert!(e.to_string().contains("exceeds the i32 range"));
}

fn check_sentinels<A: LogApproximation>() {
    let layout = create::<A>(1e-6, 0.001, 0.0, 1.0).unwrap();

    assert!(layout.underflow_bin_index() >= layout.map_to_bin_index(f64::NEG_INFINITY));
    assert!(layout.overflow_bin_index() <= layout.map_to_bin_index(f64::INFINITY));
    assert_eq!(layout.bin_lower_bound(layout.underflow_bin_index()), f64::NEG_INFINITY);
    assert_eq!(layout.bin_upper_bound(layout.overflow_bin_index()), f64::INFINITY);

    assert_eq!(layout.map_to_bin_index(f64::INFINITY), i32::MAX);
    assert_eq!(layout.map_to_bin_index(f64::NEG_INFINITY), i32::MIN);
    assert_eq!(layout.map_to_bin_index(f64::NAN), i32::MAX);
    assert_eq!(layout.map_to_bin_index(-f64::NAN), i32::MIN);
}

#[test]
fn test_sentinels() {
    check_sentinels::<LogLinear>();
    check_sentinels::<LogQuadratic>();
}

fn check_small_layout<A: LogApproximation>() {
    let layout = create::<A>(1.0, 0.01, 0.0, 2000.0).unwrap();

    assert_eq!(layout.underflow_bin_index(), -1);
    assert!(layout.overflow_bin_index() > 100);
    assert!(layout.overflow_bin_index() < 1000);
    assert_eq!(
        layout.bin_count(),
        u64::from((layout.overflow_bin_index() + 2).unsigned_abs())
    );

    // Linear bins near zero, geometric bins from index 100 on
    assert_eq!(layout.map_to_bin_index(5.5), 5);
    assert_eq!(layout.map_to_bin_index(99.9), 99);
    assert_eq!(layout.map_to_bin_index(100.0), 100);
    assert_eq!(layout.bin_lower_bound(100), 100.0);
    assert_eq!(layout.bin_upper_bound(99), from_ordered(to_ordered(100.0) - 1));
    assert_eq!(layout.bin_lower_bound(7), 7.0);
    assert_eq!(layout.map_to_bin_index(2000.0), layout.overflow_bin_index() - 1);
}

#[test]
fn test_small_layout() {
    check_small_layout::<LogLinear>();
    check_small_layout::<LogQuadratic>();
}

#[test]
fn test_zeros() {
    let layout = LogQuadraticLayout::create(1e-3, 1e-2, -1.0, 1.0).unwrap();

    assert_eq!(layout.map_to_bin_index(0.0), 0);
    assert_eq!(layout.map_to_bin_index(-0.0), -1);
    assert_eq!(layout.bin_lower_bound(0).to_bits(), 0.0_f64.to_bits());
    assert_eq!(layout.bin_upper_bound(-1).to_bits(), (-0.0_f64).to_bits());
    assert_eq!(layout.map_to_bin_index(f64::from_bits(1)), 0);
    assert_eq!(layout.map_to_bin_index(-f64::from_bits(1)), -1);
}

#[test]
fn test_absolute_only() {
    let layout = LogLinearLayout::create(0.5, 0.0, -100.0, 100.0).unwrap();

    assert_eq!(layout.map_to_bin_index(3.2), 6);
    assert_eq!(layout.map_to_bin_index(-3.2), -7);
    assert_eq!(layout.overflow_bin_index(), 201);
    assert_eq!(layout.underflow_bin_index(), -202);
    assert_eq!(layout.bin_lower_bound(6), 3.0);
    assert_eq!(layout.bin_upper_bound(6), from_ordered(to_ordered(3.5) - 1));
    assert_eq!(layout.bin_lower_bound(-7), -from_ordered(to_ordered(3.5) - 1));
    assert_eq!(layout.bin_upper_bound(-7), -3.0);
    assert_eq!(layout.map_to_bin_index(1e300), i32::MAX);
    assert_eq!(layout.map_to_bin_index(-1e300), i32::MIN);
}

fn check_bin_count_limit<A: LogApproximation>() {
    // [-n, n] with unit bins and no geometric regime has 2n + 4 bins.
    let n = 1_073_741_821.0;
    let layout = create::<A>(1.0, 0.0, -n, n).unwrap();
    assert_eq!(layout.bin_count(), 2_147_483_646);
    assert_eq!(layout.overflow_bin_index(), 1_073_741_822);
    assert_eq!(layout.underflow_bin_index(), -1_073_741_823);

    // Both sentinels still fit in i32, but the bins no longer do.
    assert!(matches!(
        create::<A>(1.0, 0.0, -n - 1.0, n + 1.0),
        Err(LayoutError::BinCountOverflow { required }) if required == 2_147_483_648.0
    ));
    assert!(matches!(
        create::<A>(1e-3, 0.0, -2e6, 2e6),
        Err(LayoutError::BinCountOverflow { .. })
    ));

    // One half of that range fits.
    assert!(create::<A>(1e-3, 0.0, 0.0, 2e6).is_ok());
}

#[test]
fn test_bin_count_limit() {
    check_bin_count_limit::<LogLinear>();
    check_bin_count_limit::<LogQuadratic>();
}

fn check_wide_range<A: LogApproximation>() {
    let layout = create::<A>(1e-9, 0.3, -1e300, 1e300).unwrap();
    assert!(layout.bin_count() < 10_000);
    assert!(layout.map_to_bin_index(1e300) < layout.overflow_bin_index());
    assert!(layout.map_to_bin_index(-1e300) > layout.underflow_bin_index());

    let layout = create::<A>(1e-9, 0.3, -f64::MAX, f64::MAX).unwrap();
    assert!(layout.bin_count() < 10_000);
    assert_eq!(layout.map_to_bin_index(f64::MAX), layout.overflow_bin_index() - 1);
    assert_eq!(layout.map_to_bin_index(-f64::MAX), layout.underflow_bin_index() + 1);
    assert_eq!(layout.normal_range_upper_bound(), f64::MAX);
    assert_eq!(layout.normal_range_lower_bound(), -f64::MAX);
}

#[test]
fn test_wide_range() {
    check_wide_range::<LogLinear>();
    check_wide_range::<LogQuadratic>();
}

#[test]
#[should_panic(expected = "outside")]
fn test_bound_below_range() {
    let layout = LogQuadraticLayout::create(1.0, 0.01, -10.0, 10.0).unwrap();
    let layout: &dyn Layout = &layout;
    let _ = layout.bin_upper_bound(layout.underflow_bin_index() - 1);
}

#[test]
#[should_panic(expected = "outside")]
fn test_bound_outside_range() {
    let layout = LogLinearLayout::create(1.0, 0.01, 0.0, 2000.0).unwrap();
    let _ = layout.bin_lower_bound(layout.overflow_bin_index() + 1);
}

#[test]
fn test_deterministic() {
    let config = LayoutConfig::new(1e-5, 1e-2, -3e4, 7e5);
    let a = LogQuadraticLayout::from_config(config).unwrap();
    let b = LogQuadraticLayout::create(1e-5, 1e-2, -3e4, 7e5).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.config(), config);
    assert_eq!(a.absolute_error(), 1e-5);
    assert_eq!(a.relative_error(), 1e-2);
    assert_eq!(a.min_value(), -3e4);
    assert_eq!(a.max_value(), 7e5);
    assert_eq!(
        a.to_string(),
        "LogQuadraticLayout [absolute_error=0.00001, relative_error=0.01, min_value=-30000, max_value=700000]"
    );
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_config() {
    let layout = LogLinearLayout::create(1e-5, 1e-2, -3e4, 7e5).unwrap();
    let json = serde_json::to_string(&layout.config()).unwrap();
    let config: LayoutConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(LogLinearLayout::from_config(config).unwrap(), layout);
}
