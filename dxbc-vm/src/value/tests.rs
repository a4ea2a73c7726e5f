use super::*;
use test_case::test_case;

#[test_case(f32::NAN, 1.0 => 1.0 ; "nan left")]
#[test_case(1.0, f32::NAN => 1.0 ; "nan right")]
#[test_case(2.0, 3.0 => 2.0 ; "ordered")]
#[test_case(f32::NEG_INFINITY, 0.0 => f32::NEG_INFINITY ; "neg inf")]
fn min_prefers_non_nan(a: f32, b: f32) -> f32 {
    nan_min(a, b)
}

#[test_case(f32::NAN, 1.0 => 1.0 ; "nan left")]
#[test_case(1.0, f32::NAN => 1.0 ; "nan right")]
#[test_case(2.0, 3.0 => 3.0 ; "ordered")]
#[test_case(f32::INFINITY, 0.0 => f32::INFINITY ; "pos inf")]
fn max_prefers_non_nan(a: f32, b: f32) -> f32 {
    nan_max(a, b)
}

#[test]
fn min_of_two_nans_is_nan() {
    assert!(nan_min(f32::NAN, f32::NAN).is_nan());
    assert!(nan_max_f64(f64::NAN, f64::NAN).is_nan());
}

#[test_case(2.0 => 1.0 ; "above")]
#[test_case(f32::NAN => 0.0 ; "nan")]
#[test_case(f32::NEG_INFINITY => 0.0 ; "neg inf")]
#[test_case(f32::INFINITY => 1.0 ; "pos inf")]
#[test_case(0.25 => 0.25 ; "inside")]
fn saturate_clamps_with_nan_to_zero(v: f32) -> f32 {
    saturate(v)
}

#[test]
fn flush_denorm_preserves_sign_and_specials() {
    let denorm = f32::from_bits(0x0000_0008); // 1.12104e-44
    assert_eq!(flush_denorm(denorm).to_bits(), 0.0f32.to_bits());
    assert_eq!(flush_denorm(-denorm).to_bits(), (-0.0f32).to_bits());
    assert!(flush_denorm(f32::NAN).is_nan());
    assert_eq!(flush_denorm(f32::INFINITY), f32::INFINITY);
    assert_eq!(flush_denorm(1.5), 1.5);
    assert_eq!(flush_denorm(f32::MIN_POSITIVE), f32::MIN_POSITIVE);
}

#[test_case(0.5 => 0.0 ; "half down")]
#[test_case(1.5 => 2.0 ; "half up")]
#[test_case(2.5 => 2.0 ; "half to even")]
#[test_case(-0.5 => 0.0 ; "neg half")]
#[test_case(3.0 => 3.0 ; "integral")]
fn round_ne_is_bankers(v: f32) -> f32 {
    round_ne(v)
}

#[test]
fn round_ne_passes_specials() {
    assert!(round_ne(f32::NAN).is_nan());
    assert_eq!(round_ne(f32::INFINITY), f32::INFINITY);
    assert_eq!(round_ne(f32::NEG_INFINITY), f32::NEG_INFINITY);
}

#[test]
fn double_pair_round_trips_across_lanes() {
    let mut v = ShaderValue::from_doubles([1.0e300, -2.5]);
    assert_eq!(v.double(0), 1.0e300);
    assert_eq!(v.double(1), -2.5);

    // The pair occupies exactly lanes .xy and .zw as 64-bit words.
    let bits = 1.0e300f64.to_bits();
    assert_eq!(v.value[0], bits as u32);
    assert_eq!(v.value[1], (bits >> 32) as u32);

    v.set_double(1, f64::NAN);
    assert!(v.double(1).is_nan());
    assert_eq!(v.double(0), 1.0e300);
}

#[test_case(0x3c00 => 1.0 ; "one")]
#[test_case(0xbc00 => -1.0 ; "minus one")]
#[test_case(0x7c00 => f32::INFINITY ; "inf")]
#[test_case(0x0000 => 0.0 ; "zero")]
#[test_case(0x3555 => 0.333251953125 ; "third")]
fn half_to_float(h: u16) -> f32 {
    f16_to_f32(h)
}

#[test]
fn half_denormals_flush_both_ways() {
    // Largest half denormal.
    assert_eq!(f16_to_f32(0x03ff), 0.0);
    assert_eq!(f16_to_f32(0x83ff).to_bits(), (-0.0f32).to_bits());
    // Smallest normal half survives.
    assert_eq!(f16_to_f32(0x0400), 6.103_515_6e-5);
    // A float below the half-normal range flushes on store.
    assert_eq!(f32_to_f16(1.0e-6), 0);
    assert_eq!(f32_to_f16(-1.0e-6), 0x8000);
}

#[test]
fn half_round_trips_exact_values() {
    for h in [0u16, 0x3c00, 0xbc00, 0x4000, 0x7bff, 0x0400, 0xfbff] {
        assert_eq!(f32_to_f16(f16_to_f32(h)), h, "half 0x{h:04x}");
    }
    assert_eq!(f32_to_f16(65536.0), 0x7c00);
    assert!(f16_to_f32(f32_to_f16(f32::NAN)).is_nan());
}
