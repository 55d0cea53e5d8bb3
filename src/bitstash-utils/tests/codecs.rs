use bitstash_utils::{half, math::*, zigzag::*};

#[test]
fn zigzag_is_bijective() {
    for v in [0, 1, -1, 2, -2, 1000, -1000, i32::MAX, i32::MIN] {
        assert_eq!(zag32(zig32(v)), v);
    }
    for v in [0, 1, -1, i64::MAX, i64::MIN, -68171523] {
        assert_eq!(zag64(zig64(v)), v);
    }

    // Every pattern of the low 16 bits maps back onto itself.
    for u in 0..=u16::MAX as u32 {
        assert_eq!(zig32(zag32(u)), u);
    }
}

#[test]
fn zigzag_keeps_extremes_wide() {
    assert_eq!(zig32(i32::MIN), u32::MAX);
    assert_eq!(zig32(i32::MAX), u32::MAX - 1);
    assert_eq!(zig64(i64::MIN), u64::MAX);
}

#[test]
fn bit_width_law() {
    assert_eq!(bits_required(5, 5), 1);
    assert_eq!(bits_required(0, 1), 1);
    assert_eq!(bits_required(0, 2), 2);
    assert_eq!(bits_required(0, 500), 9);
    assert_eq!(bits_required(0, u64::MAX), 64);
    assert_eq!(bits_required(1_000_000_000, u64::MAX), 64);

    assert_eq!(bits_required_signed(-2000, 0), 11);
    assert_eq!(bits_required_signed(-100, 100), 8);
    assert_eq!(bits_required_signed(i64::MIN, i64::MAX), 64);
    assert_eq!(bits_required_signed(-7, -7), 1);

    for span in 1..4096u64 {
        assert_eq!(bits_for_span(span), 64 - span.leading_zeros());
    }
}

#[test]
fn quantized_widths() {
    assert_eq!(quantized_bits(-5.0, 5.0, 0.2), 6);
    assert_eq!(quantized_bits(0.0, 1.0, 1.0), 1);
    assert_eq!(quantized_bits(0.0, 0.0, 0.5), 1);
    assert_eq!(quantized_bits(0.0, 100.0, 0.01), 14);
}

#[test]
fn half_round_trip_within_ulp() {
    let mut x = -65000.0f64;
    while x < 65000.0 {
        let v = x as f32;
        let back = half::decompress(half::compress(v)) as f64;

        let bound = (v.abs() as f64 * 2f64.powi(-11)).max(2f64.powi(-25));
        assert!(
            (back - v as f64).abs() <= bound,
            "{v} came back as {back}"
        );

        x += 13.37;
    }

    let mut x = 1.0e-7f32;
    while x < 1.0 {
        let back = half::decompress(half::compress(x)) as f64;
        let bound = (x as f64 * 2f64.powi(-11)).max(2f64.powi(-25));
        assert!((back - x as f64).abs() <= bound, "{x} came back as {back}");

        x *= 1.37;
    }
}

#[test]
fn half_preserves_categories() {
    assert!(half::decompress(half::compress(f32::NAN)).is_nan());

    let inf = half::decompress(half::compress(f32::INFINITY));
    assert!(inf.is_infinite() && inf.is_sign_positive());

    let neg_inf = half::decompress(half::compress(f32::NEG_INFINITY));
    assert!(neg_inf.is_infinite() && neg_inf.is_sign_negative());

    let zero = half::decompress(half::compress(0.0));
    assert!(zero == 0.0 && zero.is_sign_positive());

    let neg_zero = half::decompress(half::compress(-0.0));
    assert!(neg_zero == 0.0 && neg_zero.is_sign_negative());
}

#[test]
fn half_exact_values_survive() {
    for v in [1.0f32, -1.0, 0.5, 0.25, 2048.0, 65504.0, -65504.0, 3.140625] {
        assert_eq!(half::decompress(half::compress(v)), v);
    }
}
