//! Raw, structured and typed view access plus the atomic RMW family.
//!
//! Out-of-bounds policy: reads yield zero, writes are dropped, nothing
//! faults. Helper lanes (`done == true`) never mutate view or groupshared
//! bytes; their loads still work so trace views stay meaningful.

use crate::codec;
use crate::error::{OpResult, TrapReason};
use crate::global::GlobalState;
use crate::interpreter::alu::operand;
use crate::interpreter::operands::apply_swizzle;
use crate::state::{InvocationState, StepFlags};
use crate::value::ShaderValue;
use dxbc_asm::{Instruction, Opcode, Operand, OperandType, Program, ResourceFormat, VarType};


/// How the address operand of a memory access is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Addressing {
    /// `.x` is a byte offset into the view window.
    Raw,
    /// `.x` is an element index, `.y` a byte offset within the element.
    Structured { stride: u32 },
    /// `.x` is an element index of a format-sized element.
    TypedBuffer { stride: u32 },
}

impl Addressing {
    /// Byte offset of an access within the view's backing bytes, or `None`
    /// when the access falls outside the view window.
    fn byte_offset(
        &self,
        addr: &ShaderValue,
        first_element: u32,
        num_elements: u32,
        bytes_wanted: u32,
    ) -> Option<u32> {
        match *self {
            Addressing::Raw => {
                // For raw addressing the window fields are byte-scaled.
                let offset = addr.u32(0);
                if offset.checked_add(bytes_wanted)? > num_elements {
                    return None;
                }
                first_element.checked_add(offset)
            }
            Addressing::Structured { stride } => {
                let element = addr.u32(0);
                let offset = addr.u32(1);
                if element >= num_elements {
                    return None;
                }
                first_element
                    .checked_add(element)?
                    .checked_mul(stride)?
                    .checked_add(offset)
            }
            Addressing::TypedBuffer { stride } => {
                let element = addr.u32(0);
                if element >= num_elements {
                    return None;
                }
                first_element.checked_add(element)?.checked_mul(stride)
            }
        }
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    match data.get(offset..offset + 4) {
        Some(b) => u32::from_le_bytes(b.try_into().unwrap()),
        None => 0,
    }
}

fn write_u32(data: &mut [u8], offset: usize, v: u32) {
    if let Some(b) = data.get_mut(offset..offset + 4) {
        b.copy_from_slice(&v.to_le_bytes());
    }
}

/// Resolved backing store of a memory operand.
struct Target<'a> {
    data: &'a mut Vec<u8>,
    first_element: u32,
    num_elements: u32,
    addressing: Addressing,
}

fn raw_element_scale(format: &ResourceFormat) -> u32 {
    format.byte_width.min(4).max(1)
}

/// Look up the view or groupshared block a memory operand names and work out
/// how its address operand is read. Loads may target SRVs; stores and
/// atomics only ever see UAVs and groupshared memory.
fn resolve_target<'a>(
    global: &'a mut GlobalState,
    program: &Program,
    mem_op: &Operand,
    slot: u32,
    structured: bool,
    typed: bool,
    instr_stride: u32,
) -> Option<Target<'a>> {
    match mem_op.operand_type {
        OperandType::ThreadGroupSharedMemory => {
            let block = global.groupshared.get_mut(slot as usize)?;
            let addressing = if block.structured {
                Addressing::Structured {
                    stride: block.byte_stride.max(1),
                }
            } else {
                Addressing::Raw
            };
            let num = if block.structured {
                block.count
            } else {
                block.data.len() as u32
            };
            Some(Target {
                first_element: 0,
                num_elements: num,
                addressing,
                data: &mut block.data,
            })
        }
        OperandType::UnorderedAccessView | OperandType::Resource => {
            let declared_stride = program.structured_stride(mem_op.operand_type, slot);
            let view = if mem_op.operand_type == OperandType::UnorderedAccessView {
                global.uavs.get_mut(&slot)?
            } else {
                global.srvs.get_mut(&slot)?
            };
            let format = view.format;
            let addressing = if typed {
                Addressing::TypedBuffer {
                    stride: format.element_stride().max(1),
                }
            } else if structured {
                // The declaration wins; the stride decoded off the
                // instruction itself is the fallback.
                let stride = declared_stride
                    .unwrap_or(if instr_stride != 0 {
                        instr_stride
                    } else {
                        format.element_stride()
                    });
                Addressing::Structured {
                    stride: stride.max(1),
                }
            } else {
                Addressing::Raw
            };
            // Raw views describe their window in format-sized units; the
            // byte window scales by min(4, byte_width).
            let scale = raw_element_scale(&format);
            let (first, num) = if addressing == Addressing::Raw {
                (
                    view.first_element.saturating_mul(scale),
                    view.num_elements.saturating_mul(scale),
                )
            } else {
                (view.first_element, view.num_elements)
            };
            Some(Target {
                first_element: first,
                num_elements: num,
                addressing,
                data: &mut view.data,
            })
        }
        _ => None,
    }
}

impl InvocationState {
    /// LD_RAW / LD_STRUCTURED: read up to four dwords, apply the resource
    /// operand's swizzle, and write through the destination mask.
    pub(super) fn exec_buffer_load(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
    ) -> OpResult<()> {
        let structured = instr.opcode == Opcode::LdStructured;
        let (addr_ops, res_index) = if structured { (2, 3) } else { (1, 2) };

        let mut addr = ShaderValue::zero();
        for (lane, op_index) in (1..=addr_ops).enumerate() {
            let v = self.eval_src(operand(instr, op_index)?, instr, program, global)?;
            addr.value[lane] = v.u32(0);
        }

        let res_op = operand(instr, res_index)?.clone();
        let slot = self
            .resolve_indices(&res_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);

        let mut words = [0u32; 4];
        match resolve_target(global, program, &res_op, slot, structured, false, instr.stride) {
            Some(target) => {
                for (w, word) in words.iter_mut().enumerate() {
                    let mut a = addr.clone();
                    let extra = (w as u32) * 4;
                    match target.addressing {
                        Addressing::Raw => a.value[0] = a.value[0].wrapping_add(extra),
                        _ => a.value[1] = a.value[1].wrapping_add(extra),
                    }
                    if let Some(off) = a_offset(&target, &a, 4) {
                        *word = read_u32(target.data, off as usize);
                    }
                }
            }
            None => {
                tracing::warn!(slot, "buffer load from an unbound view reads zero");
            }
        }

        self.flags |= StepFlags::SAMPLE_LOAD_GATHER;
        let loaded = ShaderValue {
            var_type: VarType::UInt,
            ..ShaderValue::from_words(words)
        };
        let swizzled = apply_swizzle(&loaded, &res_op);
        self.write_dst(operand(instr, 0)?, instr, program, global, swizzled)
    }

    /// STORE_RAW / STORE_STRUCTURED: write the masked count of dwords,
    /// contiguously from `.x`.
    pub(super) fn exec_buffer_store(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
    ) -> OpResult<()> {
        let structured = instr.opcode == Opcode::StoreStructured;
        let (addr_ops, value_index) = if structured { (2, 3) } else { (1, 2) };

        let mem_op = operand(instr, 0)?.clone();
        let slot = self
            .resolve_indices(&mem_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);

        let mut addr = ShaderValue::zero();
        for (lane, op_index) in (1..=addr_ops).enumerate() {
            let v = self.eval_src(operand(instr, op_index)?, instr, program, global)?;
            addr.value[lane] = v.u32(0);
        }
        let value = self.eval_src(operand(instr, value_index)?, instr, program, global)?;
        let count = mem_op.mask_components().count().max(1);

        if self.done {
            // Helper lanes never mutate shared memory.
            return Ok(());
        }
        if mem_op.operand_type == OperandType::Resource {
            return Err(TrapReason::ReadOnlyOperand(mem_op.operand_type));
        }

        let Some(target) = resolve_target(global, program, &mem_op, slot, structured, false, instr.stride)
        else {
            tracing::warn!(slot, "buffer store to an unbound view dropped");
            return Ok(());
        };

        for w in 0..count {
            let mut a = addr.clone();
            let extra = (w as u32) * 4;
            match target.addressing {
                Addressing::Raw => a.value[0] = a.value[0].wrapping_add(extra),
                _ => a.value[1] = a.value[1].wrapping_add(extra),
            }
            match a_offset(&target, &a, 4) {
                Some(off) => write_u32(target.data, off as usize, value.u32_bcast(w)),
                None => {
                    tracing::warn!(slot, "out-of-bounds buffer store dropped");
                }
            }
        }
        Ok(())
    }

    /// LD_UAV_TYPED / STORE_UAV_TYPED, and the codec half of buffer-typed
    /// LD on an SRV.
    pub(super) fn exec_typed_uav(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
    ) -> OpResult<()> {
        let load = instr.opcode == Opcode::LdUavTyped;
        let (mem_index, coord_index) = if load { (2, 1) } else { (0, 1) };

        let mem_op = operand(instr, mem_index)?.clone();
        let slot = self
            .resolve_indices(&mem_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);
        let coord = self.eval_src(operand(instr, coord_index)?, instr, program, global)?;

        if load {
            let value = match global.uavs.get(&slot) {
                Some(view) => typed_load(view, &coord),
                None => {
                    tracing::warn!(slot, "typed load from an unbound view reads zero");
                    ShaderValue::zero()
                }
            };
            self.flags |= StepFlags::SAMPLE_LOAD_GATHER;
            let swizzled = apply_swizzle(&value, &mem_op);
            return self.write_dst(operand(instr, 0)?, instr, program, global, swizzled);
        }

        let value = self.eval_src(operand(instr, 2)?, instr, program, global)?;
        if self.done {
            return Ok(());
        }
        let Some(view) = global.uavs.get_mut(&slot) else {
            tracing::warn!(slot, "typed store to an unbound view dropped");
            return Ok(());
        };
        let stride = view.format.element_stride().max(1);
        let offset = if view.is_texture {
            texture_offset(view.row_pitch, view.depth_pitch, stride, &coord)
        } else {
            let element = coord.u32(0);
            if element >= view.num_elements {
                None
            } else {
                Some((view.first_element.wrapping_add(element)).wrapping_mul(stride))
            }
        };
        let Some(offset) = offset else {
            tracing::warn!(slot, "out-of-bounds typed store dropped");
            return Ok(());
        };
        let mut element = [0u8; 16];
        codec::store_format(&view.format, &value, &mut element)?;
        let end = offset as usize + stride as usize;
        if let Some(dst) = view.data.get_mut(offset as usize..end) {
            dst.copy_from_slice(&element[..stride as usize]);
        } else {
            tracing::warn!(slot, "out-of-bounds typed store dropped");
        }
        Ok(())
    }

    /// The whole `atomic_*` / `imm_atomic_*` family, minus ALLOC/CONSUME.
    pub(super) fn exec_atomic(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
    ) -> OpResult<()> {
        let returns = has_atomic_return(instr.opcode);
        let base = usize::from(returns);
        let mem_op = operand(instr, base)?.clone();
        let addr_op = operand(instr, base + 1)?;

        if mem_op.operand_type == OperandType::Resource {
            return Err(TrapReason::ReadOnlyOperand(mem_op.operand_type));
        }
        let slot = self
            .resolve_indices(&mem_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);
        let addr = self.eval_src(addr_op, instr, program, global)?;
        let src0 = self
            .eval_src(operand(instr, base + 2)?, instr, program, global)?
            .u32(0);
        let src1 = match instr.operands.get(base + 3) {
            Some(op) => self.eval_src(op, instr, program, global)?.u32(0),
            None => 0,
        };

        let structured = program
            .structured_stride(mem_op.operand_type, slot)
            .is_some()
            || matches!(
                mem_op.operand_type,
                OperandType::ThreadGroupSharedMemory
            ) && global
                .groupshared
                .get(slot as usize)
                .map(|b| b.structured)
                .unwrap_or(false);
        let typed = mem_op.operand_type == OperandType::UnorderedAccessView
            && program.typed_uav_decl(slot).is_some();

        let mut old = 0u32;
        match resolve_target(global, program, &mem_op, slot, structured, typed, instr.stride) {
            Some(target) => {
                if let Some(off) = a_offset(&target, &addr, 4) {
                    old = read_u32(target.data, off as usize);
                    if !self.done {
                        let new = apply_atomic(instr.opcode, old, src0, src1);
                        if let Some(new) = new {
                            write_u32(target.data, off as usize, new);
                        }
                    }
                } else {
                    tracing::warn!(slot, "out-of-bounds atomic dropped");
                }
            }
            None => {
                tracing::warn!(slot, "atomic on an unbound view dropped");
            }
        }

        if returns {
            let out = ShaderValue::from_u32s([old; 4]);
            self.write_dst(operand(instr, 0)?, instr, program, global, out)?;
        }
        Ok(())
    }

    /// IMM_ATOMIC_ALLOC / IMM_ATOMIC_CONSUME on the view's hidden counter.
    pub(super) fn exec_counter(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &mut GlobalState,
    ) -> OpResult<()> {
        let mem_op = operand(instr, 1)?.clone();
        let slot = self
            .resolve_indices(&mem_op, instr, program, global)?
            .first()
            .copied()
            .unwrap_or(0);

        let result = match global.uavs.get_mut(&slot) {
            Some(view) => {
                if instr.opcode == Opcode::ImmAtomicAlloc {
                    let prior = view.hidden_counter;
                    if !self.done {
                        view.hidden_counter = view.hidden_counter.wrapping_add(1);
                    }
                    prior
                } else {
                    if !self.done {
                        view.hidden_counter = view.hidden_counter.wrapping_sub(1);
                    }
                    view.hidden_counter
                }
            }
            None => {
                tracing::warn!(slot, "counter op on an unbound view returns zero");
                0
            }
        };

        let out = ShaderValue::from_u32s([result; 4]);
        self.write_dst(operand(instr, 0)?, instr, program, global, out)
    }
}

fn a_offset(target: &Target<'_>, addr: &ShaderValue, bytes: u32) -> Option<u32> {
    let off = target.addressing.byte_offset(
        addr,
        target.first_element,
        target.num_elements,
        bytes,
    )?;
    // The structured window check is element-based; still refuse offsets
    // that leave the backing allocation.
    if off as usize + bytes as usize > target.data.len() {
        return None;
    }
    Some(off)
}

fn texture_offset(
    row_pitch: u32,
    depth_pitch: u32,
    stride: u32,
    coord: &ShaderValue,
) -> Option<u32> {
    coord
        .u32(0)
        .checked_mul(stride)?
        .checked_add(coord.u32(1).checked_mul(row_pitch)?)?
        .checked_add(coord.u32(2).checked_mul(depth_pitch)?)
}

pub(super) fn typed_load(view: &crate::global::ResourceView, coord: &ShaderValue) -> ShaderValue {
    let stride = view.format.element_stride().max(1);
    let offset = if view.is_texture {
        texture_offset(view.row_pitch, view.depth_pitch, stride, coord)
    } else {
        let element = coord.u32(0);
        if element >= view.num_elements {
            None
        } else {
            Some(view.first_element.wrapping_add(element).wrapping_mul(stride))
        }
    };
    let Some(offset) = offset else {
        return ShaderValue::zero();
    };
    match view.data.get(offset as usize..offset as usize + stride as usize) {
        Some(bytes) => {
            let mut padded = [0u8; 16];
            padded[..bytes.len()].copy_from_slice(bytes);
            codec::load_format(&view.format, &padded)
        }
        None => ShaderValue::zero(),
    }
}

const fn has_atomic_return(op: Opcode) -> bool {
    use Opcode::*;
    matches!(
        op,
        ImmAtomicIadd
            | ImmAtomicImax
            | ImmAtomicImin
            | ImmAtomicUmax
            | ImmAtomicUmin
            | ImmAtomicAnd
            | ImmAtomicOr
            | ImmAtomicXor
            | ImmAtomicExch
            | ImmAtomicCmpExch
    )
}

/// The read-modify-write half of an atomic; `None` means no write happens
/// (a failed compare).
fn apply_atomic(op: Opcode, old: u32, src0: u32, src1: u32) -> Option<u32> {
    use Opcode::*;
    match op {
        AtomicIadd | ImmAtomicIadd => Some(old.wrapping_add(src0)),
        AtomicImax | ImmAtomicImax => Some((old as i32).max(src0 as i32) as u32),
        AtomicImin | ImmAtomicImin => Some((old as i32).min(src0 as i32) as u32),
        AtomicUmax | ImmAtomicUmax => Some(old.max(src0)),
        AtomicUmin | ImmAtomicUmin => Some(old.min(src0)),
        AtomicAnd | ImmAtomicAnd => Some(old & src0),
        AtomicOr | ImmAtomicOr => Some(old | src0),
        AtomicXor | ImmAtomicXor => Some(old ^ src0),
        ImmAtomicExch => Some(src0),
        AtomicCmpStore | ImmAtomicCmpExch => (old == src0).then_some(src1),
        _ => None,
    }
}
