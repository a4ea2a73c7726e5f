//! Packed-format load/store for typed resource views.
//!
//! Every supported view format maps between raw element bytes and a
//! [`ShaderValue`]. Loads of missing bytes are the caller's concern (the
//! out-of-bounds policy lives with the view accessors); this module only
//! converts well-sized element slices.

use crate::error::{OpResult, TrapReason};
use crate::value::{f16_to_f32, f32_to_f16, ShaderValue};
use dxbc_asm::{CompType, FormatPacking, ResourceFormat, VarType};

#[cfg(test)]
mod tests;

fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn unorm_store(v: f32, bits: u32) -> u32 {
    let max = ((1u64 << bits) - 1) as f32;
    (v.clamp(0.0, 1.0) * max + 0.5) as u32
}

fn snorm_store(v: f32, bits: u32) -> i32 {
    let max = ((1u64 << (bits - 1)) - 1) as f32;
    // Round to nearest, away from zero.
    (v.clamp(-1.0, 1.0) * max).round() as i32
}

fn snorm_load(raw: i32, bits: u32) -> f32 {
    let min = -(1i64 << (bits - 1)) as f32;
    let max = ((1i64 << (bits - 1)) - 1) as f32;
    if raw as f32 <= min {
        -1.0
    } else {
        raw as f32 / max
    }
}

/// Decode an 11-bit (6-mantissa) or 10-bit (5-mantissa) small float.
fn small_float_load(raw: u32, mantissa_bits: u32) -> f32 {
    let exp = (raw >> mantissa_bits) & 0x1f;
    let mant = raw & ((1 << mantissa_bits) - 1);
    let scale = (1u32 << mantissa_bits) as f32;
    match exp {
        0 => {
            // Subnormal small float; no implicit leading bit.
            (mant as f32 / scale) * (-14.0f32).exp2()
        }
        0x1f => {
            if mant == 0 {
                f32::INFINITY
            } else {
                f32::NAN
            }
        }
        _ => (1.0 + mant as f32 / scale) * (exp as f32 - 15.0).exp2(),
    }
}

fn load_regular_comp(fmt: &ResourceFormat, bytes: &[u8]) -> (u32, VarType) {
    match (fmt.byte_width, fmt.comp_type) {
        (4, CompType::Float) => (u32::from_le_bytes(bytes.try_into().unwrap()), VarType::Float),
        (4, CompType::SInt) => (u32::from_le_bytes(bytes.try_into().unwrap()), VarType::SInt),
        (4, _) => (u32::from_le_bytes(bytes.try_into().unwrap()), VarType::UInt),
        (2, ct) => {
            let raw = u16::from_le_bytes(bytes.try_into().unwrap());
            match ct {
                CompType::UInt => (u32::from(raw), VarType::UInt),
                CompType::SInt => (i32::from(raw as i16) as u32, VarType::SInt),
                CompType::UNorm | CompType::UNormSrgb => {
                    ((f32::from(raw) / 65535.0).to_bits(), VarType::Float)
                }
                CompType::SNorm => (snorm_load(i32::from(raw as i16), 16).to_bits(), VarType::Float),
                CompType::Float => (f16_to_f32(raw).to_bits(), VarType::Float),
            }
        }
        (_, ct) => {
            let raw = bytes[0];
            match ct {
                CompType::UInt => (u32::from(raw), VarType::UInt),
                CompType::SInt => (i32::from(raw as i8) as u32, VarType::SInt),
                CompType::UNorm => ((f32::from(raw) / 255.0).to_bits(), VarType::Float),
                CompType::UNormSrgb => {
                    (srgb_to_linear(f32::from(raw) / 255.0).to_bits(), VarType::Float)
                }
                CompType::SNorm => (snorm_load(i32::from(raw as i8), 8).to_bits(), VarType::Float),
                CompType::Float => (u32::from(raw), VarType::UInt),
            }
        }
    }
}

fn store_regular_comp(fmt: &ResourceFormat, value: &ShaderValue, lane: usize, bytes: &mut [u8]) {
    match (fmt.byte_width, fmt.comp_type) {
        (4, _) => bytes.copy_from_slice(&value.u32(lane).to_le_bytes()),
        (2, ct) => {
            let raw: u16 = match ct {
                CompType::UInt => value.u32(lane).min(0xffff) as u16,
                CompType::SInt => value.i32(lane).clamp(-32768, 32767) as u16,
                CompType::UNorm | CompType::UNormSrgb => unorm_store(value.f32(lane), 16) as u16,
                CompType::SNorm => snorm_store(value.f32(lane), 16) as u16,
                CompType::Float => f32_to_f16(value.f32(lane)),
            };
            bytes.copy_from_slice(&raw.to_le_bytes());
        }
        (_, ct) => {
            bytes[0] = match ct {
                CompType::UInt => value.u32(lane).min(0xff) as u8,
                CompType::SInt => value.i32(lane).clamp(-128, 127) as u8,
                CompType::UNorm => unorm_store(value.f32(lane), 8) as u8,
                CompType::UNormSrgb => unorm_store(linear_to_srgb(value.f32(lane)), 8) as u8,
                CompType::SNorm => snorm_store(value.f32(lane), 8) as u8,
                CompType::Float => value.u32(lane) as u8,
            };
        }
    }
}

/// Decode one element of `fmt` from `bytes` into a 4-lane value. Components
/// beyond the format's count read as zero.
pub fn load_format(fmt: &ResourceFormat, bytes: &[u8]) -> ShaderValue {
    let mut out = ShaderValue::zero();
    match fmt.packing {
        FormatPacking::Regular => {
            let bw = fmt.byte_width as usize;
            for c in 0..fmt.num_comps as usize {
                let (word, ty) = load_regular_comp(fmt, &bytes[c * bw..c * bw + bw]);
                out.value[c] = word;
                out.var_type = ty;
            }
        }
        FormatPacking::R10G10B10A2 => {
            let raw = u32::from_le_bytes(bytes[..4].try_into().unwrap());
            let comps = [raw & 0x3ff, raw >> 10 & 0x3ff, raw >> 20 & 0x3ff, raw >> 30];
            if fmt.comp_type == CompType::UInt {
                out.var_type = VarType::UInt;
                out.value = comps;
            } else {
                out.set_f32(0, comps[0] as f32 / 1023.0);
                out.set_f32(1, comps[1] as f32 / 1023.0);
                out.set_f32(2, comps[2] as f32 / 1023.0);
                out.set_f32(3, comps[3] as f32 / 3.0);
            }
        }
        FormatPacking::R11G11B10 => {
            let raw = u32::from_le_bytes(bytes[..4].try_into().unwrap());
            out.set_f32(0, small_float_load(raw & 0x7ff, 6));
            out.set_f32(1, small_float_load(raw >> 11 & 0x7ff, 6));
            out.set_f32(2, small_float_load(raw >> 22, 5));
            out.set_f32(3, 1.0);
        }
    }
    out
}

/// Encode the first `num_comps` lanes of `value` into one element of `fmt`.
pub fn store_format(
    fmt: &ResourceFormat,
    value: &ShaderValue,
    bytes: &mut [u8],
) -> OpResult<()> {
    match fmt.packing {
        FormatPacking::Regular => {
            let bw = fmt.byte_width as usize;
            for c in 0..fmt.num_comps as usize {
                store_regular_comp(fmt, value, c, &mut bytes[c * bw..c * bw + bw]);
            }
            Ok(())
        }
        FormatPacking::R10G10B10A2 => {
            let comps: [u32; 4] = if fmt.comp_type == CompType::UInt {
                [
                    value.u32(0).min(0x3ff),
                    value.u32(1).min(0x3ff),
                    value.u32(2).min(0x3ff),
                    value.u32(3).min(0x3),
                ]
            } else {
                [
                    unorm_store(value.f32(0), 10),
                    unorm_store(value.f32(1), 10),
                    unorm_store(value.f32(2), 10),
                    unorm_store(value.f32(3), 2),
                ]
            };
            let raw = comps[0] | comps[1] << 10 | comps[2] << 20 | comps[3] << 30;
            bytes[..4].copy_from_slice(&raw.to_le_bytes());
            Ok(())
        }
        FormatPacking::R11G11B10 => Err(TrapReason::UnimplementedFormatStore("R11G11B10")),
    }
}
