//! Runtime interpreter error representation.

use dxbc_asm::{Opcode, OperandType};

/// Fatal interpreter faults.
///
/// A trap means the instruction could not be given meaning. Traps are logged
/// and reported through [`StepOutcome::Trapped`]; the invocation state is
/// left unchanged and remains well-formed, so a debugger front end can keep
/// rendering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrapReason {
    /// A destination operand named a read-only register file.
    #[error("write to read-only operand type {0:?}")]
    ReadOnlyOperand(OperandType),
    /// The dispatcher has no behaviour for this opcode.
    #[error("unhandled opcode {0}")]
    UnhandledOpcode(Opcode),
    /// The operand evaluator has no sourcing rule for this operand type.
    #[error("unhandled operand type {0:?}")]
    UnhandledOperandType(OperandType),
    /// 64-bit immediate literals are not supported.
    #[error("unsupported 64-bit immediate literal")]
    UnsupportedImmediate64,
    /// An operand declared a vector width other than scalar or 4-wide.
    #[error("operand vector width {0} is neither 1 nor 4")]
    InvalidVectorWidth(u8),
    /// The decoded instruction is missing a required operand.
    #[error("instruction is missing operand {0}")]
    MissingOperand(usize),
    /// Store into a format with no store path (R11G11B10).
    #[error("store to a {0}-packed view is not implemented")]
    UnimplementedFormatStore(&'static str),
}

/// Internal result alias for per-instruction execution paths.
pub(crate) type OpResult<T> = Result<T, TrapReason>;

/// Outcome of a single [`crate::state::InvocationState::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction executed and the program counter moved.
    Advanced,
    /// The host reported failure for a delegated intrinsic; the program
    /// counter is unchanged and the step may be retried.
    Stalled,
    /// A fatal fault; the state is unchanged.
    Trapped(TrapReason),
}

impl StepOutcome {
    /// Whether the harness should keep stepping this invocation.
    pub const fn should_continue(&self) -> bool {
        matches!(self, Self::Advanced)
    }
}
