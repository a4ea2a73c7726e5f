use crate::{Operand, ResourceDim, ResourceFormat, ResourceRetType, SamplerMode};

/// One declaration from the shader's declaration block.
///
/// Declarations size the register files, describe bound resources, and carry
/// the compute group size; they are not executed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Declaration {
    /// `dcl_temps`: number of temporary registers.
    Temps {
        /// Register count.
        count: u32,
    },
    /// `dcl_indexableTemp`: one indexable temporary array.
    IndexableTemp {
        /// Array register number (`x#`).
        reg: u32,
        /// Element count.
        count: u32,
        /// Components per element, 1 to 4.
        components: u8,
    },
    /// `dcl_input`: an input register, kept for register-file sizing.
    Input {
        /// The declared operand.
        operand: Operand,
    },
    /// `dcl_output`: an output register, kept for register-file sizing.
    Output {
        /// The declared operand.
        operand: Operand,
    },
    /// `dcl_thread_group`: compute group dimensions.
    ThreadGroup {
        /// X, Y, Z group size.
        size: [u32; 3],
    },
    /// `dcl_resource`: a typed shader resource view.
    Resource {
        /// Bind slot (`t#`).
        slot: u32,
        /// Resource dimensionality.
        dim: ResourceDim,
        /// Per-component declared return type.
        ret_type: [ResourceRetType; 4],
        /// Sample count for multisampled dimensions.
        sample_count: u32,
    },
    /// `dcl_sampler`.
    Sampler {
        /// Bind slot (`s#`).
        slot: u32,
        /// Addressing/filter mode.
        mode: SamplerMode,
    },
    /// `dcl_resource_raw` / `dcl_uav_raw`: a byte-addressed buffer view.
    RawBuffer {
        /// Bind slot.
        slot: u32,
        /// Whether the view is writable (`u#` rather than `t#`).
        uav: bool,
    },
    /// `dcl_resource_structured` / `dcl_uav_structured`.
    StructuredBuffer {
        /// Bind slot.
        slot: u32,
        /// Bytes per element.
        stride: u32,
        /// Whether the view is writable.
        uav: bool,
        /// Whether the view carries a hidden append/consume counter.
        has_counter: bool,
    },
    /// `dcl_uav_typed`: a format-converted writable view.
    TypedUav {
        /// Bind slot (`u#`).
        slot: u32,
        /// Resource dimensionality.
        dim: ResourceDim,
        /// Element format.
        format: ResourceFormat,
    },
    /// `dcl_tgsm_raw`: byte-addressed groupshared allocation.
    GroupsharedRaw {
        /// Allocation slot (`g#`).
        slot: u32,
        /// Size in bytes.
        byte_count: u32,
    },
    /// `dcl_tgsm_structured`: structured groupshared allocation.
    GroupsharedStructured {
        /// Allocation slot (`g#`).
        slot: u32,
        /// Bytes per element.
        stride: u32,
        /// Element count.
        count: u32,
    },
}
