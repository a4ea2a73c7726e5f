//! The host-graphics seam.
//!
//! Texture sampling, gathers, transcendental math and resource queries are
//! not interpreted; they are delegated to whatever API the debugger sits on
//! through [`GpuHost`]. A host returning `None` from a delegated calculation
//! halts the current step without advancing the program counter, so the
//! harness can surface the failure and retry.

use crate::value::ShaderValue;
use dxbc_asm::{Opcode, OperandType, ResourceDim, ResourceRetType, SamplerMode};

/// Category of a host-bound debug message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugMessageCategory {
    /// Instruction execution.
    Execution,
    /// Shader or resource definition.
    Shaders,
}

/// Severity of a host-bound debug message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugMessageSeverity {
    /// Probable bug in the debugged shader or its bindings.
    High,
    /// Suspicious but possibly intended.
    Medium,
    /// Informational.
    Info,
}

/// Origin of a host-bound debug message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugMessageSource {
    /// Raised while interpreting an instruction.
    RuntimeWarning,
    /// Raised by the debugger's own bookkeeping.
    DebugHost,
}

/// Channel selected by a gather operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GatherChannel {
    /// Red.
    #[default]
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Alpha.
    Alpha,
}

impl GatherChannel {
    /// Map a sampler-swizzle component index to a gather channel.
    pub const fn from_component(comp: u8) -> Self {
        match comp {
            1 => Self::Green,
            2 => Self::Blue,
            3 => Self::Alpha,
            _ => Self::Red,
        }
    }
}

/// Resource half of a delegated sample/gather request, assembled from the
/// declarations and the instruction's resource operand.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SampleGatherResourceData {
    /// Bind slot (`t#` or `u#`).
    pub slot: u32,
    /// Declared dimensionality.
    pub dim: ResourceDim,
    /// Declared first-component return type.
    pub ret_type: ResourceRetType,
    /// Declared sample count for multisampled resources.
    pub sample_count: u32,
}

/// Sampler half of a delegated sample/gather request.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SampleGatherSamplerData {
    /// Bind slot (`s#`).
    pub slot: u32,
    /// Declared mode.
    pub mode: SamplerMode,
    /// Level-of-detail bias for `sample_b`.
    pub bias: f32,
}

/// Everything a host needs to resolve one sample/gather/LOD request.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGatherArgs {
    /// The requesting opcode.
    pub opcode: Opcode,
    /// Resource description.
    pub resource: SampleGatherResourceData,
    /// Sampler description; meaningless for `ld`/`ld_ms`.
    pub sampler: SampleGatherSamplerData,
    /// Texture coordinate (or texel address for loads).
    pub uv: ShaderValue,
    /// Horizontal derivative of the coordinate.
    pub ddx: ShaderValue,
    /// Vertical derivative of the coordinate.
    pub ddy: ShaderValue,
    /// Immediate texel offsets from the instruction.
    pub texel_offsets: [i8; 3],
    /// Multisample index for `ld_ms`.
    pub multisample_index: i32,
    /// Explicit level of detail, bias, or comparison reference, depending on
    /// the opcode.
    pub lod_or_compare: f32,
    /// Resource-operand swizzle to apply to the fetched value.
    pub swizzle: [u8; 4],
    /// Channel for gather opcodes.
    pub gather_channel: GatherChannel,
    /// Disassembly of the requesting instruction, for host diagnostics.
    pub text: String,
}

/// Resource-dimension query result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Dimensionality of the bound resource.
    pub dim: ResourceDim,
    /// Width, height, depth-or-array-size, and mip count at the queried mip.
    pub dims: [u32; 4],
}

/// Host-graphics shim the interpreter delegates to.
///
/// This is the seam between the purely-interpreted core and the graphics API
/// the debugger runs against; implementations wrap a live device or a
/// capture replayer.
pub trait GpuHost {
    /// Record which instruction subsequent host work is attributed to.
    fn set_current_instruction(&mut self, index: usize);

    /// Evaluate a transcendental (`rcp`/`rsq`/`sqrt`/`exp`/`log`/`sincos`).
    ///
    /// Returns the primary and secondary results (`sincos` uses both), or
    /// `None` on failure, which stalls the step.
    fn math_intrinsic(
        &mut self,
        opcode: Opcode,
        src: &ShaderValue,
    ) -> Option<(ShaderValue, ShaderValue)>;

    /// Resolve a sample/gather/LOD/load request, or `None` on failure.
    fn sample_gather(&mut self, args: SampleGatherArgs) -> Option<ShaderValue>;

    /// Sample count of the resource bound at `slot`, or of the current
    /// render target for [`OperandType::Rasterizer`].
    fn sample_info(&mut self, operand_type: OperandType, slot: u32) -> u32;

    /// Element count of the buffer bound at `slot`.
    fn buffer_info(&mut self, operand_type: OperandType, slot: u32) -> u32;

    /// Dimensions of the resource bound at `slot`, at `mip`.
    fn resource_info(&mut self, operand_type: OperandType, slot: u32, mip: u32) -> ResourceInfo;

    /// Deliver a debug message to the host's message log.
    fn add_debug_message(
        &mut self,
        category: DebugMessageCategory,
        severity: DebugMessageSeverity,
        source: DebugMessageSource,
        text: String,
    );
}
