//! Shared machine state: resource-view backing stores, groupshared memory,
//! constant blocks, hidden counters and the pull-model evaluation cache.
//!
//! One `GlobalState` is shared read-write by all lanes of a quad. The only
//! mutators of view and groupshared bytes are the store and atomic opcodes;
//! everything else is read-only after setup.

use std::collections::HashMap;

use crate::value::ShaderValue;
use dxbc_asm::ResourceFormat;

/// Backing store of one shader-visible view (UAV or SRV).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResourceView {
    /// Raw backing bytes.
    pub data: Vec<u8>,
    /// First element visible through the view.
    pub first_element: u32,
    /// Number of elements visible through the view.
    pub num_elements: u32,
    /// Bytes per texture row.
    pub row_pitch: u32,
    /// Bytes per texture slice.
    pub depth_pitch: u32,
    /// Whether the view is a texture rather than a buffer.
    pub is_texture: bool,
    /// Element format.
    pub format: ResourceFormat,
    /// Hidden append/consume counter.
    pub hidden_counter: u32,
}

impl ResourceView {
    /// A structured or raw buffer view over `data`.
    pub fn buffer(data: Vec<u8>, first_element: u32, num_elements: u32, format: ResourceFormat) -> Self {
        Self {
            data,
            first_element,
            num_elements,
            format,
            ..Self::default()
        }
    }
}

/// One groupshared memory allocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SharedBlock {
    /// Raw backing bytes.
    pub data: Vec<u8>,
    /// Element count for structured allocations.
    pub count: u32,
    /// Bytes per element for structured allocations.
    pub byte_stride: u32,
    /// Whether the allocation is structured rather than raw.
    pub structured: bool,
}

/// Contents of one bound constant buffer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConstantBlock {
    /// Declared register number (`cb#`).
    pub register_number: u32,
    /// Buffer contents as 4-component vectors.
    pub members: Vec<ShaderValue>,
}

/// Cache key for pull-model interpolant evaluation.
///
/// The harness pre-evaluates the interpolants a shader asks for and seeds the
/// cache; the EVAL_* opcodes look results up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleEvalKey {
    /// Quad lane asking.
    pub quad_index: u8,
    /// Input register being evaluated.
    pub input_register: u32,
    /// First swizzled component.
    pub first_component: u8,
    /// Number of components read.
    pub num_components: u8,
    /// Sample index, or -1 for snapped/centroid evaluation.
    pub sample: i32,
    /// Snapped pixel offset in 16ths.
    pub offset: (i32, i32),
}

/// Shared mutable machine state for a quad.
#[derive(Debug, Default, Clone)]
pub struct GlobalState {
    /// Writable views by bind slot (`u#`).
    pub uavs: HashMap<u32, ResourceView>,
    /// Read-only views by bind slot (`t#`).
    pub srvs: HashMap<u32, ResourceView>,
    /// Groupshared allocations by slot (`g#`).
    pub groupshared: Vec<SharedBlock>,
    /// Constant blocks, looked up by declared register number.
    pub constant_buffers: Vec<ConstantBlock>,
    /// Pull-model evaluation results seeded by the harness.
    pub sample_eval_cache: HashMap<SampleEvalKey, ShaderValue>,
}

impl GlobalState {
    /// Constant block with the given declared register number.
    pub fn constant_block(&self, register_number: u32) -> Option<&ConstantBlock> {
        self.constant_buffers
            .iter()
            .find(|cb| cb.register_number == register_number)
    }
}
