use super::*;
use test_case::test_case;

fn roundtrip(fmt: &ResourceFormat, v: ShaderValue) -> ShaderValue {
    let mut bytes = [0u8; 16];
    store_format(fmt, &v, &mut bytes).unwrap();
    load_format(fmt, &bytes)
}

#[test]
fn unorm8_quantises_on_store() {
    let fmt = ResourceFormat::regular(1, CompType::UNorm, 4);
    let out = roundtrip(&fmt, ShaderValue::from_f32s([0.0, 1.0, 0.5, 2.0]));
    assert_eq!(out.f32(0), 0.0);
    assert_eq!(out.f32(1), 1.0);
    // 0.5 * 255 + 0.5 truncates to 128.
    assert_eq!(out.f32(2), 128.0 / 255.0);
    // Out-of-range input clamps.
    assert_eq!(out.f32(3), 1.0);
}

#[test]
fn snorm8_maps_extremes() {
    let fmt = ResourceFormat::regular(1, CompType::SNorm, 2);
    let mut bytes = [0u8; 4];
    // Raw -128 must load as exactly -1.0 even though the store path never
    // produces it.
    bytes[0] = 0x80;
    bytes[1] = 0x7f;
    let out = load_format(&fmt, &bytes);
    assert_eq!(out.f32(0), -1.0);
    assert_eq!(out.f32(1), 1.0);

    let out = roundtrip(&fmt, ShaderValue::from_f32s([-1.0, -0.5, 0.0, 0.0]));
    assert_eq!(out.f32(0), -127.0 / 127.0);
    assert_eq!(out.f32(1), -64.0 / 127.0); // -63.5 rounds away from zero
}

#[test_case(CompType::UInt ; "uint16")]
#[test_case(CompType::SInt ; "sint16")]
fn int16_saturates_on_store(ct: CompType) {
    let fmt = ResourceFormat::regular(2, ct, 1);
    let mut bytes = [0u8; 2];
    let v = match ct {
        CompType::UInt => ShaderValue::from_u32s([0x12345, 0, 0, 0]),
        _ => ShaderValue::from_i32s([-40000, 0, 0, 0]),
    };
    store_format(&fmt, &v, &mut bytes).unwrap();
    let out = load_format(&fmt, &bytes);
    match ct {
        CompType::UInt => assert_eq!(out.u32(0), 0xffff),
        _ => assert_eq!(out.i32(0), -32768),
    }
}

#[test]
fn half_format_uses_half_conversion() {
    let fmt = ResourceFormat::regular(2, CompType::Float, 2);
    let out = roundtrip(&fmt, ShaderValue::from_f32s([1.0, -0.333251953125, 0.0, 0.0]));
    assert_eq!(out.f32(0), 1.0);
    assert_eq!(out.f32(1), -0.333251953125);
}

#[test]
fn rgb32f_is_a_direct_copy() {
    let fmt = ResourceFormat::regular(4, CompType::Float, 3);
    let denorm = f32::from_bits(1); // must survive the copy untouched
    let out = roundtrip(&fmt, ShaderValue::from_f32s([denorm, -2.5, 1.0e30, 9.0]));
    assert_eq!(out.f32(0).to_bits(), 1);
    assert_eq!(out.f32(1), -2.5);
    assert_eq!(out.f32(2), 1.0e30);
    // The fourth lane is beyond the format and reads back zero.
    assert_eq!(out.f32(3), 0.0);
}

#[test]
fn r10g10b10a2_unorm_packs_and_unpacks() {
    let fmt = ResourceFormat {
        byte_width: 4,
        comp_type: CompType::UNorm,
        num_comps: 4,
        packing: FormatPacking::R10G10B10A2,
    };
    let out = roundtrip(&fmt, ShaderValue::from_f32s([1.0, 0.0, 511.0 / 1023.0, 1.0 / 3.0]));
    assert_eq!(out.f32(0), 1.0);
    assert_eq!(out.f32(1), 0.0);
    assert_eq!(out.f32(2), 511.0 / 1023.0);
    assert_eq!(out.f32(3), 1.0 / 3.0);
}

#[test]
fn r10g10b10a2_uint_clamps() {
    let fmt = ResourceFormat {
        byte_width: 4,
        comp_type: CompType::UInt,
        num_comps: 4,
        packing: FormatPacking::R10G10B10A2,
    };
    let out = roundtrip(&fmt, ShaderValue::from_u32s([0x3ff, 0x400, 5, 7]));
    assert_eq!(out.value, [0x3ff, 0x3ff, 5, 3]);
}

#[test]
fn r11g11b10_loads_but_never_stores() {
    let fmt = ResourceFormat {
        byte_width: 4,
        comp_type: CompType::Float,
        num_comps: 3,
        packing: FormatPacking::R11G11B10,
    };
    // 1.0 in both widths: exponent 15, zero mantissa.
    let raw: u32 = (15 << 6) | (15 << 6) << 11 | (15 << 5) << 22;
    let out = load_format(&fmt, &raw.to_le_bytes());
    assert_eq!(out.f32(0), 1.0);
    assert_eq!(out.f32(1), 1.0);
    assert_eq!(out.f32(2), 1.0);
    assert_eq!(out.f32(3), 1.0);

    let mut bytes = [0u8; 4];
    assert_eq!(
        store_format(&fmt, &ShaderValue::zero(), &mut bytes),
        Err(TrapReason::UnimplementedFormatStore("R11G11B10"))
    );
}

#[test]
fn srgb8_decodes_on_load() {
    let fmt = ResourceFormat::regular(1, CompType::UNormSrgb, 1);
    let out = load_format(&fmt, &[255u8, 0, 0, 0]);
    assert_eq!(out.f32(0), 1.0);
    let mid = load_format(&fmt, &[128u8, 0, 0, 0]).f32(0);
    // sRGB 128/255 decodes below the linear midpoint.
    assert!(mid > 0.21 && mid < 0.22, "got {mid}");
}
