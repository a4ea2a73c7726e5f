//! The host-delegated sample/gather family, resource queries, and pull-model
//! interpolant evaluation.

use crate::api::{
    DebugMessageCategory, DebugMessageSeverity, DebugMessageSource, GatherChannel, GpuHost,
    SampleGatherArgs, SampleGatherResourceData, SampleGatherSamplerData,
};
use crate::error::OpResult;
use crate::global::{GlobalState, SampleEvalKey};
use crate::interpreter::alu::operand;
use crate::interpreter::derivatives::quad_difference;
use crate::interpreter::memory::typed_load;
use crate::interpreter::operands::apply_swizzle;
use crate::interpreter::{Exec, Quad};
use crate::state::{InvocationState, StepFlags};
use crate::value::ShaderValue;
use dxbc_asm::{
    Instruction, Opcode, Program, ResinfoRetType, ResourceDim, ResourceRetType, VarType,
    COMP_NONE,
};

/// Standard sample positions in 16ths of a pixel, per sample count.
const SAMPLE_POS_2: [(i32, i32); 2] = [(4, 4), (-4, -4)];
const SAMPLE_POS_4: [(i32, i32); 4] = [(-2, -6), (6, -2), (-6, 2), (2, 6)];
const SAMPLE_POS_8: [(i32, i32); 8] = [
    (1, -3),
    (-1, 3),
    (5, 1),
    (-3, -5),
    (-5, 5),
    (-7, -1),
    (3, 7),
    (7, -7),
];
const SAMPLE_POS_16: [(i32, i32); 16] = [
    (1, 1),
    (-1, -3),
    (-3, 2),
    (4, -1),
    (-5, -2),
    (2, 5),
    (5, 3),
    (3, -5),
    (-2, 6),
    (0, -7),
    (-4, -6),
    (-6, 4),
    (-8, 0),
    (7, -4),
    (6, 7),
    (-7, -8),
];

fn standard_sample_pos(count: u32, index: u32) -> Option<(i32, i32)> {
    let table: &[(i32, i32)] = match count {
        2 => &SAMPLE_POS_2,
        4 => &SAMPLE_POS_4,
        8 => &SAMPLE_POS_8,
        16 => &SAMPLE_POS_16,
        _ => return None,
    };
    table.get(index as usize).copied()
}

fn resource_data(program: &Program, slot: u32) -> SampleGatherResourceData {
    match program.resource_decl(slot) {
        Some((dim, ret_type, sample_count)) => SampleGatherResourceData {
            slot,
            dim,
            ret_type: ret_type[0],
            sample_count,
        },
        None => SampleGatherResourceData {
            slot,
            ret_type: ResourceRetType::Float,
            ..SampleGatherResourceData::default()
        },
    }
}

impl InvocationState {
    /// SAMPLE / SAMPLE_L / SAMPLE_B / SAMPLE_D / SAMPLE_C / SAMPLE_C_LZ /
    /// GATHER4 (+_C/_PO/_PO_C) / LD / LD_MS / LOD. Buffer-typed LD reads the
    /// view directly through the codec; everything else goes to the host.
    pub(super) fn exec_sample(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
        api: &mut dyn GpuHost,
        quad: Option<&Quad>,
    ) -> OpResult<Exec> {
        use Opcode::*;
        let op = instr.opcode;

        let po = matches!(op, Gather4Po | Gather4PoC);
        let res_index = if po { 3 } else { 2 };
        let has_sampler = !matches!(op, Ld | LdMs);
        let sampler_index = res_index + 1;

        let uv_op = operand(instr, 1)?.clone();
        let uv = self.eval_src(&uv_op, instr, program, global)?;
        let res_op = operand(instr, res_index)?.clone();
        let slot = self
            .resolve_indices(&res_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);

        let resource = resource_data(program, slot);

        // A buffer LD never leaves the interpreter: the view bytes and the
        // format codec already define the result.
        if op == Ld && resource.dim == ResourceDim::Buffer {
            let value = match global.srvs.get(&slot) {
                Some(view) => typed_load(view, &uv),
                None => {
                    tracing::warn!(slot, "buffer load from an unbound view reads zero");
                    ShaderValue::zero()
                }
            };
            self.flags |= StepFlags::SAMPLE_LOAD_GATHER;
            let swizzled = apply_swizzle(&value, &res_op);
            self.write_dst(operand(instr, 0)?, instr, program, global, swizzled)?;
            return Ok(Exec::Advance);
        }

        if op == Lod && !resource.dim.supports_lod() {
            tracing::warn!(slot, dim = ?resource.dim, "lod query on unsupported dimension");
            self.write_dst(
                operand(instr, 0)?,
                instr,
                program,
                global,
                ShaderValue::zero(),
            )?;
            return Ok(Exec::Advance);
        }

        let mut sampler = SampleGatherSamplerData::default();
        let mut gather_channel = GatherChannel::Red;
        if has_sampler {
            let samp_op = operand(instr, sampler_index)?;
            let samp_slot = self
                .resolve_indices(samp_op, instr, program, global)?
                .first()
                .copied()
                .unwrap_or(0);
            sampler.slot = samp_slot;
            sampler.mode = program.sampler_mode(samp_slot);
            if matches!(op, Gather4 | Gather4C | Gather4Po | Gather4PoC) {
                let comp = if samp_op.comps[0] == COMP_NONE {
                    0
                } else {
                    samp_op.comps[0]
                };
                gather_channel = GatherChannel::from_component(comp);
            }
        }

        let mut lod_or_compare = 0.0f32;
        let mut multisample_index = 0i32;
        let mut ddx = ShaderValue::zero();
        let mut ddy = ShaderValue::zero();
        let mut texel_offsets = instr.texel_offsets;

        match op {
            SampleL => {
                lod_or_compare = self
                    .eval_src(operand(instr, 4)?, instr, program, global)?
                    .f32(0);
            }
            SampleB => {
                sampler.bias = self
                    .eval_src(operand(instr, 4)?, instr, program, global)?
                    .f32(0);
            }
            SampleC | SampleCLz | Gather4C => {
                lod_or_compare = self
                    .eval_src(operand(instr, 4)?, instr, program, global)?
                    .f32(0);
            }
            Gather4PoC => {
                lod_or_compare = self
                    .eval_src(operand(instr, 5)?, instr, program, global)?
                    .f32(0);
            }
            SampleD => {
                ddx = self.eval_src(operand(instr, 4)?, instr, program, global)?;
                ddy = self.eval_src(operand(instr, 5)?, instr, program, global)?;
            }
            LdMs => {
                multisample_index = self
                    .eval_src(operand(instr, 3)?, instr, program, global)?
                    .i32(0);
            }
            _ => {}
        }

        if po {
            // Programmable offsets replace the immediate ones.
            let off = self.eval_src(operand(instr, 2)?, instr, program, global)?;
            texel_offsets[0] = off.i32(0).clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8;
            texel_offsets[1] = off.i32(1).clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8;
        }

        // Implicit-derivative opcodes take the coarse quad derivative of the
        // coordinate; without a quad the derivatives are zero.
        if matches!(op, Sample | SampleB | SampleC | Lod) {
            match quad {
                Some(quad) => {
                    let qi = self.semantics.quad_index;
                    ddx = quad_difference(
                        quad, qi, &uv_op, instr, program, global, true, false,
                    )?;
                    ddy = quad_difference(
                        quad, qi, &uv_op, instr, program, global, false, false,
                    )?;
                }
                None => {
                    tracing::warn!(
                        pc = self.program_counter,
                        "implicit-derivative sample without a quad uses zero derivatives"
                    );
                }
            }
        }

        let args = SampleGatherArgs {
            opcode: op,
            resource,
            sampler,
            uv,
            ddx,
            ddy,
            texel_offsets,
            multisample_index,
            lod_or_compare,
            swizzle: res_op.comps,
            gather_channel,
            text: instr.display_text().to_owned(),
        };
        match api.sample_gather(args) {
            Some(result) => {
                self.flags |= StepFlags::SAMPLE_LOAD_GATHER;
                self.write_dst(operand(instr, 0)?, instr, program, global, result)?;
                Ok(Exec::Advance)
            }
            None => Ok(Exec::Stall),
        }
    }

    /// SAMPLE_INFO: the bound resource's sample count, unsigned or float per
    /// the return-type modifier.
    pub(super) fn exec_sample_info(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
        api: &mut dyn GpuHost,
    ) -> OpResult<()> {
        let res_op = operand(instr, 1)?.clone();
        let slot = self
            .resolve_indices(&res_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);
        let count = api.sample_info(res_op.operand_type, slot);
        let mut out = ShaderValue::zero();
        if instr.resinfo_ret_type == ResinfoRetType::UInt {
            out.var_type = VarType::UInt;
            out.value[0] = count;
        } else {
            out.set_f32(0, count as f32);
        }
        let swizzled = apply_swizzle(&out, &res_op);
        self.write_dst(operand(instr, 0)?, instr, program, global, swizzled)
    }

    /// SAMPLE_POS: standard sample positions for counts 2/4/8/16, expressed
    /// in 16ths of a pixel. Anything else zeroes the result.
    pub(super) fn exec_sample_pos(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
        api: &mut dyn GpuHost,
    ) -> OpResult<()> {
        let res_op = operand(instr, 1)?.clone();
        let slot = self
            .resolve_indices(&res_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);
        let count = api.sample_info(res_op.operand_type, slot);
        let index = self
            .eval_src(operand(instr, 2)?, instr, program, global)?
            .u32(0);

        let mut out = ShaderValue::zero();
        match standard_sample_pos(count, index) {
            Some((x, y)) => {
                out.set_f32(0, x as f32 / 16.0);
                out.set_f32(1, y as f32 / 16.0);
            }
            None => {
                tracing::warn!(count, index, "sample_pos out of range, result zeroed");
                api.add_debug_message(
                    DebugMessageCategory::Execution,
                    DebugMessageSeverity::Medium,
                    DebugMessageSource::RuntimeWarning,
                    format!(
                        "sample_pos: sample {index} of a {count}-sample resource is undefined"
                    ),
                );
            }
        }
        let swizzled = apply_swizzle(&out, &res_op);
        self.write_dst(operand(instr, 0)?, instr, program, global, swizzled)
    }

    /// BUFINFO: element count of the bound buffer.
    pub(super) fn exec_bufinfo(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
        api: &mut dyn GpuHost,
    ) -> OpResult<()> {
        let res_op = operand(instr, 1)?.clone();
        let slot = self
            .resolve_indices(&res_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);
        let count = api.buffer_info(res_op.operand_type, slot);
        let out = ShaderValue::from_u32s([count; 4]);
        let swizzled = apply_swizzle(&out, &res_op);
        self.write_dst(operand(instr, 0)?, instr, program, global, swizzled)
    }

    /// RESINFO: dimensions at the queried mip, with the return-type modifier
    /// steering uint/float/reciprocal-float. The reciprocal applies only to
    /// the lanes that are real dimensions of the resource.
    pub(super) fn exec_resinfo(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
        api: &mut dyn GpuHost,
    ) -> OpResult<()> {
        let res_op = operand(instr, 2)?.clone();
        let slot = self
            .resolve_indices(&res_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);
        let mip = self
            .eval_src(operand(instr, 1)?, instr, program, global)?
            .u32(0);
        let info = api.resource_info(res_op.operand_type, slot, mip);

        let mut out = ShaderValue::zero();
        match instr.resinfo_ret_type {
            ResinfoRetType::UInt => {
                out.var_type = VarType::UInt;
                out.value = info.dims;
            }
            ResinfoRetType::Float => {
                for lane in 0..4 {
                    out.set_f32(lane, info.dims[lane] as f32);
                }
            }
            ResinfoRetType::RcpFloat => {
                let real_dims = info.dim.dimension_count() as usize;
                for lane in 0..4 {
                    let v = info.dims[lane] as f32;
                    out.set_f32(lane, if lane < real_dims { v.recip() } else { v });
                }
            }
        }
        let swizzled = apply_swizzle(&out, &res_op);
        self.write_dst(operand(instr, 0)?, instr, program, global, swizzled)
    }

    /// EVAL_SNAPPED / EVAL_SAMPLE_INDEX / EVAL_CENTROID via the harness-fed
    /// evaluation cache; a miss falls back to the centre value.
    pub(super) fn exec_eval(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
        api: &mut dyn GpuHost,
    ) -> OpResult<()> {
        let input_op = operand(instr, 1)?.clone();
        let register = self
            .resolve_indices(&input_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);

        let (sample, offset) = match instr.opcode {
            Opcode::EvalSampleIndex => {
                let s = self
                    .eval_src(operand(instr, 2)?, instr, program, global)?
                    .i32(0);
                (s, (0, 0))
            }
            Opcode::EvalSnapped => {
                let o = self.eval_src(operand(instr, 2)?, instr, program, global)?;
                (-1, (o.i32(0), o.i32(1)))
            }
            _ => (-1, (0, 0)),
        };

        let (first_component, num_components) = if input_op.is_scalar_selector() {
            (input_op.comps[0], 1)
        } else {
            (0, 4)
        };
        let key = SampleEvalKey {
            quad_index: self.semantics.quad_index,
            input_register: register,
            first_component,
            num_components,
            sample,
            offset,
        };

        let out = match global.sample_eval_cache.get(&key) {
            Some(cached) => apply_swizzle(cached, &input_op),
            None => {
                tracing::warn!(
                    register,
                    sample,
                    "interpolant evaluation missing from the cache, using centre value"
                );
                api.add_debug_message(
                    DebugMessageCategory::Execution,
                    DebugMessageSeverity::Medium,
                    DebugMessageSource::RuntimeWarning,
                    format!(
                        "{}: evaluation of v{register} was not pre-computed, using the \
                         centre value",
                        instr.display_text()
                    ),
                );
                self.eval_src(&input_op, instr, program, global)?
            }
        };
        self.write_dst(operand(instr, 0)?, instr, program, global, out)
    }
}
