//! The per-step dispatcher: one behaviour per opcode.

use crate::api::GpuHost;
use crate::error::{OpResult, StepOutcome, TrapReason};
use crate::global::GlobalState;
use crate::interpreter::alu::{self, operand};
use crate::interpreter::convert::{float_to_half_lane, half_to_float_lane};
use crate::interpreter::{flow, Exec};
use crate::state::{InvocationState, StepFlags};
use crate::value::{nan_max, nan_max_f64, nan_min, nan_min_f64, round_ne};
use dxbc_asm::{Instruction, Opcode, Program, VarType};

/// Snapshot of the four quad lanes, indexed by `quad_index`, taken before
/// the step being executed.
pub type Quad = [InvocationState; 4];

impl InvocationState {
    /// Execute the instruction at the program counter and advance it.
    ///
    /// `quad` is required for derivative opcodes and implicit-derivative
    /// samples; the harness passes pre-step snapshots of all four lanes and
    /// is responsible for keeping them in lock step.
    #[tracing::instrument(name = "step", skip_all, fields(pc = self.program_counter))]
    pub fn step(
        &mut self,
        program: &Program,
        global: &mut GlobalState,
        api: &mut dyn GpuHost,
        quad: Option<&Quad>,
    ) -> StepOutcome {
        self.flags = StepFlags::empty();
        self.modified.clear();

        if self.finished(program) {
            return StepOutcome::Advanced;
        }

        let pc = self.program_counter;
        api.set_current_instruction(pc);
        // The program counter bound was just checked.
        let Some(instr) = program.instruction(pc) else {
            return StepOutcome::Advanced;
        };
        tracing::trace!(op = %instr.opcode, "executing");

        match self.exec_instruction(instr, program, global, api, quad) {
            Ok(Exec::Advance) => {
                self.program_counter = pc + 1;
                StepOutcome::Advanced
            }
            Ok(Exec::Jump(target)) => {
                self.program_counter = target;
                StepOutcome::Advanced
            }
            Ok(Exec::Stall) => StepOutcome::Stalled,
            Err(trap) => {
                tracing::error!(pc, op = %instr.opcode, %trap, "instruction trapped");
                StepOutcome::Trapped(trap)
            }
        }
    }

    fn exec_instruction(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
        api: &mut dyn GpuHost,
        quad: Option<&Quad>,
    ) -> OpResult<Exec> {
        use Opcode::*;

        match instr.opcode {
            Nop | Loop | Case | Default | EndSwitch | EndIf => {}

            // Float arithmetic.
            Add => self.float_binary(instr, program, global, |a, b| a + b)?,
            Mul => self.float_binary(instr, program, global, |a, b| a * b)?,
            Div => self.float_binary(instr, program, global, |a, b| a / b)?,
            Mad => self.float_ternary(instr, program, global, |a, b, c| a * b + c)?,
            Frc => self.float_unary(instr, program, global, |x| x - x.floor())?,
            Dp2 => self.dot(instr, program, global, 2)?,
            Dp3 => self.dot(instr, program, global, 3)?,
            Dp4 => self.dot(instr, program, global, 4)?,
            Min => self.float_binary(instr, program, global, nan_min)?,
            Max => self.float_binary(instr, program, global, nan_max)?,
            RoundPi => self.float_unary(instr, program, global, f32::ceil)?,
            RoundNi => self.float_unary(instr, program, global, f32::floor)?,
            RoundZ => self.float_unary(instr, program, global, f32::trunc)?,
            RoundNe => self.float_unary(instr, program, global, round_ne)?,

            Rcp | Rsq | Sqrt | Exp | Log => {
                let src = self.eval_srcs(instr, program, global, 1, 1)?.remove(0);
                let Some((result, _)) = api.math_intrinsic(instr.opcode, &src) else {
                    return Ok(Exec::Stall);
                };
                self.write_dst(operand(instr, 0)?, instr, program, global, result)?;
            }
            Sincos => {
                let src = self.eval_srcs(instr, program, global, 2, 1)?.remove(0);
                let Some((sin, cos)) = api.math_intrinsic(instr.opcode, &src) else {
                    return Ok(Exec::Stall);
                };
                self.write_dst(operand(instr, 0)?, instr, program, global, sin)?;
                self.write_dst(operand(instr, 1)?, instr, program, global, cos)?;
            }

            // Float comparison.
            Eq => self.float_compare(instr, program, global, |a, b| a == b)?,
            Ne => self.float_compare(instr, program, global, |a, b| a != b)?,
            Lt => self.float_compare(instr, program, global, |a, b| a < b)?,
            Ge => self.float_compare(instr, program, global, |a, b| a >= b)?,

            // Moves and selects: bit-pattern copies, denormals untouched.
            Mov => {
                self.lane_op(instr, program, global, 1, VarType::Float, |s, l| {
                    s[0].u32_bcast(l)
                })?;
            }
            Movc => {
                self.lane_op(instr, program, global, 3, VarType::Float, |s, l| {
                    if s[0].u32_bcast(l) != 0 {
                        s[1].u32_bcast(l)
                    } else {
                        s[2].u32_bcast(l)
                    }
                })?;
            }
            Swapc => {
                self.lane_op2(instr, program, global, 3, VarType::Float, |s, l| {
                    if s[0].u32_bcast(l) != 0 {
                        (s[2].u32_bcast(l), s[1].u32_bcast(l))
                    } else {
                        (s[1].u32_bcast(l), s[2].u32_bcast(l))
                    }
                })?;
            }

            // Integer arithmetic.
            IAdd => self.int_binary(instr, program, global, i32::wrapping_add)?,
            INeg => self.int_unary(instr, program, global, i32::wrapping_neg)?,
            IMin => self.int_binary(instr, program, global, i32::min)?,
            IMax => self.int_binary(instr, program, global, i32::max)?,
            IMad => self.lane_op(instr, program, global, 3, VarType::SInt, |s, l| {
                s[0].i32_bcast(l)
                    .wrapping_mul(s[1].i32_bcast(l))
                    .wrapping_add(s[2].i32_bcast(l)) as u32
            })?,
            UMin => self.uint_binary(instr, program, global, u32::min)?,
            UMax => self.uint_binary(instr, program, global, u32::max)?,
            UMad => self.uint_ternary(instr, program, global, |a, b, c| {
                a.wrapping_mul(b).wrapping_add(c)
            })?,
            IMul => self.lane_op2(instr, program, global, 2, VarType::SInt, |s, l| {
                let p = i64::from(s[0].i32_bcast(l)) * i64::from(s[1].i32_bcast(l));
                ((p >> 32) as u32, p as u32)
            })?,
            UMul => self.lane_op2(instr, program, global, 2, VarType::UInt, |s, l| {
                let p = u64::from(s[0].u32_bcast(l)) * u64::from(s[1].u32_bcast(l));
                ((p >> 32) as u32, p as u32)
            })?,
            UDiv => self.lane_op2(instr, program, global, 2, VarType::UInt, |s, l| {
                alu::udiv(s[0].u32_bcast(l), s[1].u32_bcast(l))
            })?,
            UAddc => self.lane_op2(instr, program, global, 2, VarType::UInt, |s, l| {
                alu::uaddc(s[0].u32_bcast(l), s[1].u32_bcast(l))
            })?,
            USubb => self.lane_op2(instr, program, global, 2, VarType::UInt, |s, l| {
                alu::usubb(s[0].u32_bcast(l), s[1].u32_bcast(l))
            })?,
            IShl => self.int_binary(instr, program, global, |a, b| {
                a.wrapping_shl(b as u32 & 31)
            })?,
            IShr => self.int_binary(instr, program, global, |a, b| a >> (b as u32 & 31))?,
            UShr => self.uint_binary(instr, program, global, |a, b| a >> (b & 31))?,

            // Integer comparison.
            IEq => self.int_compare(instr, program, global, |a, b| a == b)?,
            INe => self.int_compare(instr, program, global, |a, b| a != b)?,
            ILt => self.int_compare(instr, program, global, |a, b| a < b)?,
            IGe => self.int_compare(instr, program, global, |a, b| a >= b)?,
            ULt => self.uint_compare(instr, program, global, |a, b| a < b)?,
            UGe => self.uint_compare(instr, program, global, |a, b| a >= b)?,

            // Bit manipulation.
            And => self.uint_binary(instr, program, global, |a, b| a & b)?,
            Or => self.uint_binary(instr, program, global, |a, b| a | b)?,
            Xor => self.uint_binary(instr, program, global, |a, b| a ^ b)?,
            Not => self.uint_unary(instr, program, global, |a| !a)?,
            IBfe => self.lane_op(instr, program, global, 3, VarType::SInt, |s, l| {
                alu::ibfe(s[0].u32_bcast(l), s[1].u32_bcast(l), s[2].i32_bcast(l)) as u32
            })?,
            UBfe => self.uint_ternary(instr, program, global, alu::ubfe)?,
            Bfi => {
                self.lane_op(instr, program, global, 4, VarType::UInt, |s, l| {
                    alu::bfi(
                        s[0].u32_bcast(l),
                        s[1].u32_bcast(l),
                        s[2].u32_bcast(l),
                        s[3].u32_bcast(l),
                    )
                })?;
            }
            Bfrev => self.uint_unary(instr, program, global, u32::reverse_bits)?,
            Countbits => self.uint_unary(instr, program, global, u32::count_ones)?,
            FirstbitHi => self.uint_unary(instr, program, global, alu::firstbit_hi)?,
            FirstbitLo => self.uint_unary(instr, program, global, alu::firstbit_lo)?,
            FirstbitShi => self.uint_unary(instr, program, global, alu::firstbit_shi)?,

            // Conversions.
            Itof => self.convert_lanes(instr, program, global, VarType::Float, |s, l| {
                (s.i32_bcast(l) as f32).to_bits()
            })?,
            Utof => self.convert_lanes(instr, program, global, VarType::Float, |s, l| {
                (s.u32_bcast(l) as f32).to_bits()
            })?,
            Ftoi => self.convert_lanes(instr, program, global, VarType::SInt, |s, l| {
                s.f32_bcast(l) as i32 as u32
            })?,
            Ftou => self.convert_lanes(instr, program, global, VarType::UInt, |s, l| {
                s.f32_bcast(l) as u32
            })?,
            F16tof32 => {
                self.convert_lanes(instr, program, global, VarType::Float, half_to_float_lane)?;
            }
            F32tof16 => {
                self.convert_lanes(instr, program, global, VarType::UInt, float_to_half_lane)?;
            }
            Ftod => self.convert_to_double(instr, program, global, |s, l| {
                f64::from(s.f32(l))
            })?,
            Itod => self.convert_to_double(instr, program, global, |s, l| {
                f64::from(s.i32(l))
            })?,
            Utod => self.convert_to_double(instr, program, global, |s, l| {
                f64::from(s.u32(l))
            })?,
            Dtoi => self.convert_from_double(instr, program, global, VarType::SInt, |d| {
                d as i32 as u32
            })?,
            Dtou => self.convert_from_double(instr, program, global, VarType::UInt, |d| {
                d as u32
            })?,
            Dtof => self.convert_from_double(instr, program, global, VarType::Float, |d| {
                (d as f32).to_bits()
            })?,

            // Double arithmetic over the packed lane pairs.
            DAdd => self.double_op(instr, program, global, 2, |s, p| {
                s[0].double(p) + s[1].double(p)
            })?,
            DMul => self.double_op(instr, program, global, 2, |s, p| {
                s[0].double(p) * s[1].double(p)
            })?,
            DDiv => self.double_op(instr, program, global, 2, |s, p| {
                s[0].double(p) / s[1].double(p)
            })?,
            DFma => self.double_op(instr, program, global, 3, |s, p| {
                s[0].double(p).mul_add(s[1].double(p), s[2].double(p))
            })?,
            DMin => self.double_op(instr, program, global, 2, |s, p| {
                nan_min_f64(s[0].double(p), s[1].double(p))
            })?,
            DMax => self.double_op(instr, program, global, 2, |s, p| {
                nan_max_f64(s[0].double(p), s[1].double(p))
            })?,
            DRcp => self.double_op(instr, program, global, 1, |s, p| s[0].double(p).recip())?,
            DMov => self.double_op(instr, program, global, 1, |s, p| s[0].double(p))?,
            DMovc => {
                // Predicate lanes .x and .y steer result pairs .xy and .zw.
                self.double_op(instr, program, global, 3, |s, p| {
                    if s[0].u32(p) != 0 {
                        s[1].double(p)
                    } else {
                        s[2].double(p)
                    }
                })?;
            }
            DEq => self.double_compare(instr, program, global, |a, b| a == b)?,
            DNe => self.double_compare(instr, program, global, |a, b| a != b)?,
            DLt => self.double_compare(instr, program, global, |a, b| a < b)?,
            DGe => self.double_compare(instr, program, global, |a, b| a >= b)?,

            // Derivatives.
            DerivRtx | DerivRtxCoarse => {
                self.exec_derivative(instr, program, global, quad, true, false)?;
            }
            DerivRtxFine => self.exec_derivative(instr, program, global, quad, true, true)?,
            DerivRty | DerivRtyCoarse => {
                self.exec_derivative(instr, program, global, quad, false, false)?;
            }
            DerivRtyFine => self.exec_derivative(instr, program, global, quad, false, true)?,

            // Resource access.
            LdRaw | LdStructured => self.exec_buffer_load(instr, program, global)?,
            StoreRaw | StoreStructured => self.exec_buffer_store(instr, program, global)?,
            LdUavTyped | StoreUavTyped => self.exec_typed_uav(instr, program, global)?,
            AtomicIadd | AtomicImax | AtomicImin | AtomicUmax | AtomicUmin | AtomicAnd
            | AtomicOr | AtomicXor | AtomicCmpStore | ImmAtomicIadd | ImmAtomicImax
            | ImmAtomicImin | ImmAtomicUmax | ImmAtomicUmin | ImmAtomicAnd | ImmAtomicOr
            | ImmAtomicXor | ImmAtomicExch | ImmAtomicCmpExch => {
                self.exec_atomic(instr, program, global)?;
            }
            ImmAtomicAlloc | ImmAtomicConsume => self.exec_counter(instr, program, global)?,

            // Sampling and queries.
            Ld | LdMs | Sample | SampleL | SampleB | SampleD | SampleC | SampleCLz
            | Gather4 | Gather4C | Gather4Po | Gather4PoC | Lod => {
                return self.exec_sample(instr, program, global, api, quad);
            }
            SampleInfo => self.exec_sample_info(instr, program, global, api)?,
            SamplePos => self.exec_sample_pos(instr, program, global, api)?,
            Bufinfo => self.exec_bufinfo(instr, program, global, api)?,
            Resinfo => self.exec_resinfo(instr, program, global, api)?,
            EvalSnapped | EvalSampleIndex | EvalCentroid => {
                self.exec_eval(instr, program, global, api)?;
            }

            // Control flow.
            If => {
                if !self.predicate(instr, program, global)? {
                    return Ok(Exec::Jump(flow::after_if_false(
                        program,
                        self.program_counter,
                    )));
                }
            }
            Else => {
                return Ok(Exec::Jump(flow::after_endif(program, self.program_counter)));
            }
            Switch => {
                let value = self
                    .eval_src(operand(instr, 0)?, instr, program, global)?
                    .u32(0);
                return Ok(Exec::Jump(flow::switch_target(
                    program,
                    self.program_counter,
                    value,
                )));
            }
            EndLoop => {
                return Ok(Exec::Jump(flow::loop_start(program, self.program_counter)));
            }
            Break => {
                return Ok(Exec::Jump(flow::after_break(program, self.program_counter)));
            }
            Breakc => {
                if self.predicate(instr, program, global)? {
                    return Ok(Exec::Jump(flow::after_break(
                        program,
                        self.program_counter,
                    )));
                }
            }
            Continue => {
                return Ok(Exec::Jump(flow::loop_start(program, self.program_counter)));
            }
            Continuec => {
                if self.predicate(instr, program, global)? {
                    return Ok(Exec::Jump(flow::loop_start(
                        program,
                        self.program_counter,
                    )));
                }
            }
            Ret => self.done = true,
            Retc => {
                if self.predicate(instr, program, global)? {
                    self.done = true;
                }
            }
            Discard => {
                if self.predicate(instr, program, global)? {
                    self.done = true;
                }
            }

            // `Opcode` is open for the decoder's sake; anything the
            // dispatcher does not know is a fatal trap.
            _ => return Err(TrapReason::UnhandledOpcode(instr.opcode)),
        }

        Ok(Exec::Advance)
    }

    /// Evaluate a single-operand predicate under the instruction's polarity
    /// flag. The flag flips the truth of the bit pattern: with it clear a
    /// zero predicate fails the test.
    fn predicate(
        &self,
        instr: &Instruction,
        program: &Program,
        global: &GlobalState,
    ) -> OpResult<bool> {
        let bits = self
            .eval_src(operand(instr, 0)?, instr, program, global)?
            .u32(0);
        Ok((bits != 0) != instr.nonzero)
    }
}
