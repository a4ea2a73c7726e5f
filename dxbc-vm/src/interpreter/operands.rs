//! Source-operand evaluation and destination writes.

use crate::error::{OpResult, TrapReason};
use crate::global::GlobalState;
use crate::interpreter::{operation_flushing, operation_type};
use crate::state::{InvocationState, RegisterRef, RegisterSpace, StepFlags};
use crate::value::{flush_denorm, nan_max_f64, nan_min_f64, saturate, ShaderValue};
use dxbc_asm::{
    Instruction, NumComponents, Operand, OperandModifier, OperandType, Program, VarType,
    COMP_NONE,
};


impl InvocationState {
    /// Resolve an operand's register address: the absolute part of each
    /// index plus, when present, the `.x` lane of its relative operand.
    pub(crate) fn resolve_indices(
        &self,
        operand: &Operand,
        instr: &Instruction,
        program: &Program,
        global: &GlobalState,
    ) -> OpResult<Vec<u32>> {
        let mut out = Vec::with_capacity(operand.indices.len());
        for idx in &operand.indices {
            let mut v: i64 = if idx.absolute { i64::from(idx.index) } else { 0 };
            if let Some(rel) = &idx.relative {
                v += i64::from(self.eval_src(rel, instr, program, global)?.i32(0));
            }
            if v < 0 {
                tracing::warn!(index = v, "negative register index clamped to zero");
                v = 0;
            }
            out.push(v as u32);
        }
        Ok(out)
    }

    fn source_value(
        &self,
        operand: &Operand,
        indices: &[u32],
        program: &Program,
        global: &GlobalState,
    ) -> OpResult<ShaderValue> {
        use OperandType::*;

        let idx = |d: usize| indices.get(d).copied().unwrap_or(0);
        let oob = |what: &str, i: u32| {
            tracing::warn!(operand = what, index = i, "out-of-bounds read, using zero");
            ShaderValue::zero()
        };

        let v = match operand.operand_type {
            Temp => match self.registers.get(idx(0) as usize) {
                Some(r) => r.clone(),
                None => oob("r", idx(0)),
            },
            IndexableTemp => match self
                .indexable_temps
                .get(idx(0) as usize)
                .and_then(|arr| arr.get(idx(1) as usize))
            {
                Some(r) => r.clone(),
                None => oob("x", idx(1)),
            },
            Input => {
                let pos = program
                    .input_signature
                    .iter()
                    .position(|s| s.register == idx(0))
                    .unwrap_or(idx(0) as usize);
                match self.inputs.get(pos) {
                    Some(r) => r.clone(),
                    None => oob("v", idx(0)),
                }
            }
            Output => {
                let pos = program
                    .output_signature
                    .iter()
                    .position(|s| s.register == idx(0))
                    .unwrap_or(idx(0) as usize);
                match self.outputs.get(pos) {
                    Some(r) => r.clone(),
                    None => oob("o", idx(0)),
                }
            }
            ConstantBuffer => match global
                .constant_block(idx(0))
                .and_then(|cb| cb.members.get(idx(1) as usize))
            {
                Some(r) => r.clone(),
                None => oob("cb", idx(1)),
            },
            ImmediateConstantBuffer => {
                let base = idx(0) as usize * 4;
                let mut v = ShaderValue::named("icb");
                for c in 0..4 {
                    v.value[c] = program
                        .immediate_cbuffer
                        .get(base + c)
                        .copied()
                        .unwrap_or(0);
                }
                v
            }
            Immediate32 => match operand.num_components {
                NumComponents::One => {
                    let mut v = ShaderValue::from_words([operand.values[0]; 4]);
                    v.columns = 1;
                    v
                }
                NumComponents::Four => ShaderValue::from_words(operand.values),
                NumComponents::None => return Err(TrapReason::InvalidVectorWidth(0)),
            },
            Immediate64 => return Err(TrapReason::UnsupportedImmediate64),
            InputThreadId => {
                let t = self.semantics.thread_id;
                ShaderValue::from_u32s([t[0], t[1], t[2], 0])
            }
            InputThreadGroupId => {
                let g = self.semantics.group_id;
                ShaderValue::from_u32s([g[0], g[1], g[2], 0])
            }
            InputThreadIdInGroup => {
                let t = self.thread_id_in_group(program);
                ShaderValue::from_u32s([t[0], t[1], t[2], 0])
            }
            InputThreadIdInGroupFlattened => {
                let t = self.thread_id_in_group(program);
                let [x, y, _] = program.group_size();
                let flat = t[2].wrapping_mul(x.wrapping_mul(y))
                    .wrapping_add(t[1].wrapping_mul(x))
                    .wrapping_add(t[0]);
                ShaderValue::from_u32s([flat, 0, 0, 0])
            }
            InputCoverageMask => ShaderValue::from_u32s([self.semantics.coverage, 0, 0, 0]),
            InputPrimitiveId => {
                ShaderValue::from_u32s([self.semantics.primitive_id, 0, 0, 0])
            }
            // Binding-style operands carry their slot index as a degenerate
            // placeholder value.
            ThreadGroupSharedMemory | Resource | Sampler | UnorderedAccessView | Null
            | Rasterizer => {
                let mut v = ShaderValue::from_u32s([idx(0), 0, 0, 0]);
                v.columns = 1;
                v
            }
            // `OperandType` is open for the decoder's sake.
            other => return Err(TrapReason::UnhandledOperandType(other)),
        };

        Ok(v)
    }

    fn thread_id_in_group(&self, program: &Program) -> [u32; 3] {
        let size = program.group_size();
        let mut out = [0u32; 3];
        for c in 0..3 {
            out[c] = self.semantics.thread_id[c]
                .wrapping_sub(self.semantics.group_id[c].wrapping_mul(size[c]));
        }
        out
    }

    /// Evaluate one source operand: resolve its address, fetch the value,
    /// apply the swizzle, the absolute/negation modifier under the opcode's
    /// type, and the opcode's denormal-flush policy.
    pub(crate) fn eval_src(
        &self,
        operand: &Operand,
        instr: &Instruction,
        program: &Program,
        global: &GlobalState,
    ) -> OpResult<ShaderValue> {
        let indices = self.resolve_indices(operand, instr, program, global)?;
        let src = self.source_value(operand, &indices, program, global)?;
        let mut out = apply_swizzle(&src, operand);

        let ty = operation_type(instr.opcode);
        apply_modifier(&mut out, operand.modifier, ty);

        if operation_flushing(instr.opcode)
            && operand.operand_type.is_flushable()
            && ty == VarType::Float
        {
            for lane in 0..4 {
                out.set_f32(lane, flush_denorm(out.f32(lane)));
            }
        }

        Ok(out)
    }

    /// Write a result through a destination operand: saturate, mask, flag
    /// non-finite float results, flush, and record modified components.
    pub(crate) fn write_dst(
        &mut self,
        operand: &Operand,
        instr: &Instruction,
        program: &Program,
        global: &GlobalState,
        value: ShaderValue,
    ) -> OpResult<()> {
        if operand.operand_type == OperandType::Null {
            return Ok(());
        }

        let indices = self.resolve_indices(operand, instr, program, global)?;
        let idx = |d: usize| indices.get(d).copied().unwrap_or(0);

        let ty = operation_type(instr.opcode);
        let mut value = value;
        if instr.saturate {
            apply_saturate(&mut value, ty);
        }

        let (space, index, slot): (RegisterSpace, u32, Option<(usize, usize)>) =
            match operand.operand_type {
                OperandType::Temp => (RegisterSpace::Temp, idx(0), None),
                OperandType::IndexableTemp => (
                    RegisterSpace::IndexableTemp,
                    idx(0),
                    Some((idx(0) as usize, idx(1) as usize)),
                ),
                OperandType::Output => {
                    let pos = program
                        .output_signature
                        .iter()
                        .position(|s| s.register == idx(0))
                        .unwrap_or(idx(0) as usize);
                    (RegisterSpace::Output, pos as u32, None)
                }
                other => return Err(TrapReason::ReadOnlyOperand(other)),
            };

        if ty == VarType::Double
            && (!value.double(0).is_finite() || !value.double(1).is_finite())
        {
            self.flags |= StepFlags::GENERATED_NAN_OR_INF;
        }

        let mut writes: [(u8, u32); 4] = [(0, 0); 4];
        let mut num_writes = 0;
        let mask: Vec<u8> = operand.mask_components().collect();
        match mask.len() {
            0 => {
                writes[0] = (0, value.value[0]);
                num_writes = 1;
            }
            1 => {
                // Scalar-to-masked form: source lane 0 lands in the single
                // masked component.
                writes[0] = (mask[0], value.value[0]);
                num_writes = 1;
            }
            _ => {
                for &c in &mask {
                    writes[num_writes] = (c, value.value[c as usize]);
                    num_writes += 1;
                }
            }
        }

        let flushing = operation_flushing(instr.opcode) && ty == VarType::Float;
        let mut raised_nan = false;
        let mut recorded = Vec::new();

        let dest = match operand.operand_type {
            OperandType::Temp => self.registers.get_mut(idx(0) as usize),
            OperandType::IndexableTemp => {
                let (a, m) = slot.unwrap_or((0, 0));
                self.indexable_temps.get_mut(a).and_then(|arr| arr.get_mut(m))
            }
            OperandType::Output => self.outputs.get_mut(index as usize),
            _ => unreachable!("filtered above"),
        };
        let Some(dest) = dest else {
            tracing::warn!(?space, index, "out-of-bounds write dropped");
            return Ok(());
        };

        for &(comp, word) in &writes[..num_writes] {
            let mut word = word;
            if ty == VarType::Float && !f32::from_bits(word).is_finite() {
                raised_nan = true;
            }
            if flushing {
                word = flush_denorm(f32::from_bits(word)).to_bits();
            }
            if dest.value[comp as usize] != word {
                dest.value[comp as usize] = word;
                recorded.push(RegisterRef {
                    space,
                    index,
                    component: comp,
                });
            }
        }
        dest.var_type = value.var_type;

        if raised_nan {
            self.flags |= StepFlags::GENERATED_NAN_OR_INF;
        }
        self.modified.extend(recorded);
        Ok(())
    }
}

/// Apply an operand's component selector to a value: lane `i` of the result
/// is lane `comps[i]` of the source, with `0xff` slots reading identity. A
/// single-component selector marks the result scalar. Also used for values
/// fetched outside the operand path (memory loads, host results).
pub(crate) fn apply_swizzle(src: &ShaderValue, operand: &Operand) -> ShaderValue {
    let mut out = src.clone();
    for (i, &c) in operand.comps.iter().enumerate() {
        out.value[i] = if c == COMP_NONE {
            src.value[i]
        } else {
            src.value[c as usize]
        };
    }
    out.columns = if operand.is_scalar_selector() { 1 } else { 4 };
    out
}

/// Apply an operand modifier under the opcode's arithmetic type. ABSNEG is
/// NEG composed after ABS.
pub(crate) fn apply_modifier(v: &mut ShaderValue, modifier: OperandModifier, ty: VarType) {
    if modifier == OperandModifier::None {
        return;
    }
    let abs = matches!(modifier, OperandModifier::Abs | OperandModifier::AbsNeg);
    let neg = matches!(modifier, OperandModifier::Neg | OperandModifier::AbsNeg);
    match ty {
        VarType::Float => {
            for lane in 0..4 {
                let mut f = v.f32(lane);
                if abs {
                    f = f.abs();
                }
                if neg {
                    f = -f;
                }
                v.set_f32(lane, f);
            }
        }
        VarType::Double => {
            for pair in 0..2 {
                let mut d = v.double(pair);
                if abs {
                    d = d.abs();
                }
                if neg {
                    d = -d;
                }
                v.set_double(pair, d);
            }
        }
        VarType::SInt | VarType::UInt => {
            for lane in 0..4 {
                let mut i = v.i32(lane);
                if abs {
                    i = i.wrapping_abs();
                }
                if neg {
                    i = i.wrapping_neg();
                }
                v.set_i32(lane, i);
            }
        }
    }
}

/// Saturate a result under the opcode's arithmetic type.
pub(crate) fn apply_saturate(v: &mut ShaderValue, ty: VarType) {
    match ty {
        VarType::Float => {
            for lane in 0..4 {
                v.set_f32(lane, saturate(v.f32(lane)));
            }
        }
        VarType::Double => {
            for pair in 0..2 {
                let d = v.double(pair);
                v.set_double(pair, nan_min_f64(1.0, nan_max_f64(0.0, d)));
            }
        }
        VarType::UInt => {
            for lane in 0..4 {
                v.set_u32(lane, u32::from(v.u32(lane) != 0));
            }
        }
        VarType::SInt => {
            for lane in 0..4 {
                v.set_i32(lane, v.i32(lane).clamp(0, 1));
            }
        }
    }
}
