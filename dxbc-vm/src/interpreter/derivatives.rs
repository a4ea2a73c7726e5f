//! Screen-space derivatives over the 2x2 quad.
//!
//! `quad_index` encodes the lane's position: bit 0 is x, bit 1 is y. Coarse
//! derivatives always difference lanes (1,0) horizontally and (2,0)
//! vertically; fine derivatives difference the requesting lane's own
//! row/column pair.

use crate::error::OpResult;
use crate::global::GlobalState;
use crate::interpreter::alu::operand;
use crate::interpreter::Quad;
use crate::state::InvocationState;
use crate::value::ShaderValue;
use dxbc_asm::{Instruction, Operand, Program};

impl InvocationState {
    /// DERIV_RTX / DERIV_RTY and their coarse/fine forms. Without a quad the
    /// destination is left unchanged.
    pub(super) fn exec_derivative(
        &mut self,
        instr: &Instruction,
        program: &Program,
        global: &GlobalState,
        quad: Option<&Quad>,
        horizontal: bool,
        fine: bool,
    ) -> OpResult<()> {
        let Some(quad) = quad else {
            tracing::warn!(
                pc = self.program_counter,
                "derivative without a quad, destination unchanged"
            );
            return Ok(());
        };
        let src_op = operand(instr, 1)?.clone();
        let diff = quad_difference(
            quad,
            self.semantics.quad_index,
            &src_op,
            instr,
            program,
            global,
            horizontal,
            fine,
        )?;
        self.write_dst(operand(instr, 0)?, instr, program, global, diff)
    }
}

/// Evaluate `src_op` on the two relevant quad lanes and difference them.
#[allow(clippy::too_many_arguments)]
pub(super) fn quad_difference(
    quad: &Quad,
    quad_index: u8,
    src_op: &Operand,
    instr: &Instruction,
    program: &Program,
    global: &GlobalState,
    horizontal: bool,
    fine: bool,
) -> OpResult<ShaderValue> {
    let i = usize::from(quad_index & 3);
    let (low, high) = match (horizontal, fine) {
        (true, false) => (0, 1),
        (true, true) => (i & !1, i | 1),
        (false, false) => (0, 2),
        (false, true) => (i & !2, i | 2),
    };
    let a = quad[low].eval_src(src_op, instr, program, global)?;
    let b = quad[high].eval_src(src_op, instr, program, global)?;
    let mut out = ShaderValue::zero();
    for lane in 0..4 {
        out.set_f32(lane, b.f32(lane) - a.f32(lane));
    }
    Ok(out)
}
