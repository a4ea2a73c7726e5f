//! Type-conversion opcode bodies, including the double-pair steering rules.

use crate::error::OpResult;
use crate::global::GlobalState;
use crate::interpreter::alu::{operand, steer_pairwise};
use crate::state::InvocationState;
use crate::value::{f16_to_f32, f32_to_f16, flush_denorm, ShaderValue};
use dxbc_asm::{Instruction, Program, VarType, COMP_NONE};

impl InvocationState {
    /// ITOF / UTOF / FTOI / FTOU / F16TOF32 / F32TOF16: plain lane maps with
    /// an explicit destination type.
    pub(super) fn convert_lanes(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &GlobalState,
        ty: VarType,
        f: impl Fn(&ShaderValue, usize) -> u32,
    ) -> OpResult<()> {
        let src = self.eval_src(operand(instr, 1)?, instr, program, global)?;
        let mut out = ShaderValue {
            var_type: ty,
            ..ShaderValue::zero()
        };
        for lane in 0..4 {
            out.value[lane] = f(&src, lane);
        }
        self.write_dst(operand(instr, 0)?, instr, program, global, out)
    }

    /// ITOD / UTOD / FTOD: the source `.x` lane feeds double 0. Double 1 is
    /// fed from `.z`, or from `.x` again when the source swizzle leaves the
    /// z slot unused.
    pub(super) fn convert_to_double(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &GlobalState,
        f: impl Fn(&ShaderValue, usize) -> f64,
    ) -> OpResult<()> {
        let src_op = operand(instr, 1)?.clone();
        let src = self.eval_src(&src_op, instr, program, global)?;
        let d0 = f(&src, 0);
        let d1 = if src_op.comps[2] == COMP_NONE {
            d0
        } else {
            f(&src, 2)
        };
        let out = ShaderValue::from_doubles([d0, d1]);
        self.write_dst(operand(instr, 0)?, instr, program, global, out)
    }

    /// DTOI / DTOU / DTOF: double 0's result steers to the first masked
    /// destination component and double 1's to the second.
    pub(super) fn convert_from_double(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &GlobalState,
        ty: VarType,
        f: impl Fn(f64) -> u32,
    ) -> OpResult<()> {
        let src = self.eval_src(operand(instr, 1)?, instr, program, global)?;
        let r0 = f(src.double(0));
        let r1 = f(src.double(1));
        let dst = operand(instr, 0)?.clone();
        let mut out = steer_pairwise(&dst, r0, r1);
        out.var_type = ty;
        self.write_dst(&dst, instr, program, global, out)
    }
}

/// F16TOF32 on one lane: half denormals flush inside the conversion.
pub(super) fn half_to_float_lane(v: &ShaderValue, lane: usize) -> u32 {
    f16_to_f32(v.u32_bcast(lane) as u16).to_bits()
}

/// F32TOF16 on one lane: the float input is flushed manually since the
/// opcode sits outside the flushing set.
pub(super) fn float_to_half_lane(v: &ShaderValue, lane: usize) -> u32 {
    u32::from(f32_to_f16(flush_denorm(v.f32_bcast(lane))))
}
