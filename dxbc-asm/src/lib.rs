//! Atomic types of the DXBC shader ISA.
//!
//! This crate defines the decoded form of a shader-model instruction stream:
//! opcodes, operands (with swizzles, masks, modifiers and indirect indices),
//! resource declarations, IO signatures, and the [`Program`] container the
//! external binary parser produces. The interpreter in `dxbc-vm` consumes
//! these types; nothing here executes anything.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod decl;
mod instruction;
mod opcode;
mod operand;
mod program;
mod sig;
mod types;

pub use decl::Declaration;
pub use instruction::{Instruction, ResinfoRetType};
pub use opcode::Opcode;
pub use operand::{
    NumComponents, Operand, OperandIndex, OperandModifier, OperandType, COMP_NONE,
};
pub use program::{CBufferBinding, Program};
pub use sig::{SigParameter, SystemValue};
pub use types::{
    CompType, FormatPacking, ResourceDim, ResourceFormat, ResourceRetType, SamplerMode,
    VarType,
};
