//! DXBC shader debugger interpreter.
//!
//! A stepwise interpreter for the 4-wide SIMD shader-model ISA decoded into
//! [`dxbc_asm::Program`]. One [`state::InvocationState`] holds a single
//! invocation; a harness drives a quad of four of them in lock step and owns
//! the shared [`global::GlobalState`]. Texture sampling, gathers and
//! transcendental math are delegated to the host through [`api::GpuHost`].

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

pub mod api;
pub mod codec;
pub mod error;
pub mod global;
pub mod interpreter;
pub mod state;
pub mod value;

pub mod prelude {
    //! Re-exports required for full interpreter functionality.
    #[doc(no_inline)]
    pub use dxbc_asm::{
        CompType, Declaration, FormatPacking, Instruction, NumComponents, Opcode, Operand,
        OperandIndex, OperandModifier, OperandType, Program, ResinfoRetType, ResourceDim,
        ResourceFormat, ResourceRetType, SamplerMode, SigParameter, SystemValue, VarType,
    };

    pub use crate::{
        api::{
            DebugMessageCategory, DebugMessageSeverity, DebugMessageSource, GatherChannel,
            GpuHost, ResourceInfo, SampleGatherArgs, SampleGatherResourceData,
            SampleGatherSamplerData,
        },
        error::{StepOutcome, TrapReason},
        global::{
            ConstantBlock, GlobalState, ResourceView, SampleEvalKey, SharedBlock,
        },
        interpreter::Quad,
        state::{
            InvocationState, LaneInit, RegisterRef, RegisterSpace, Semantics, StepFlags,
        },
        value::ShaderValue,
    };
}
