//! Per-invocation machine state.

use crate::value::ShaderValue;
use dxbc_asm::Program;

use bitflags::bitflags;

bitflags! {
    /// Events raised while executing one step; cleared at the start of the
    /// next.
    pub struct StepFlags: u32 {
        /// A float or double operation produced NaN or infinity.
        const GENERATED_NAN_OR_INF = 0x01;
        /// The step went through a sample/load/gather path.
        const SAMPLE_LOAD_GATHER = 0x02;
    }
}

/// Register file a modified-register record points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterSpace {
    /// Temporary registers `r#`.
    Temp,
    /// Indexable temporary arrays `x#`.
    IndexableTemp,
    /// Outputs `o#`.
    Output,
}

/// One component write recorded during a step, for trace-view consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterRef {
    /// Register file.
    pub space: RegisterSpace,
    /// Register (or array register) index within the file.
    pub index: u32,
    /// Component index, 0 to 3.
    pub component: u8,
}

/// Built-in per-invocation values seeded by the harness.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Semantics {
    /// Global dispatch thread id.
    pub thread_id: [u32; 3],
    /// Compute group id.
    pub group_id: [u32; 3],
    /// Pixel coverage mask.
    pub coverage: u32,
    /// Primitive id.
    pub primitive_id: u32,
    /// Position in the 2x2 quad: bit 0 is x, bit 1 is y.
    pub quad_index: u8,
}

/// Harness-provided seed for one invocation.
#[derive(Debug, Default, Clone)]
pub struct LaneInit {
    /// Input registers in signature order.
    pub inputs: Vec<ShaderValue>,
    /// Built-in values.
    pub semantics: Semantics,
}

/// The complete mutable state of one shader invocation.
///
/// Created by [`InvocationState::new`] from the program's declarations,
/// mutated only by [`step`](InvocationState::step), and read by the trace
/// harness between steps.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationState {
    /// Index of the next instruction in the program's instruction table.
    pub program_counter: usize,
    /// Temporary registers, sized by `dcl_temps`.
    pub registers: Vec<ShaderValue>,
    /// Indexable temporary arrays, sized by `dcl_indexableTemp`.
    pub indexable_temps: Vec<Vec<ShaderValue>>,
    /// Output registers, sized by the output signature.
    pub outputs: Vec<ShaderValue>,
    /// Input registers, read-only, seeded by the harness.
    pub inputs: Vec<ShaderValue>,
    /// Built-in values.
    pub semantics: Semantics,
    /// Events raised by the most recent step.
    pub flags: StepFlags,
    /// Terminal flag; set by RET/RETC/DISCARD. A done lane is a helper lane
    /// and never mutates shared memory.
    pub done: bool,
    /// Component writes performed by the most recent step.
    pub modified: Vec<RegisterRef>,
}

impl InvocationState {
    /// Build the initial state for one invocation of `program`.
    pub fn new(program: &Program, init: LaneInit) -> Self {
        let registers = (0..program.num_temps())
            .map(|i| ShaderValue::named(format!("r{i}")))
            .collect();

        let indexable_temps = program
            .indexable_temps()
            .into_iter()
            .map(|(reg, count, _comps)| {
                (0..count)
                    .map(|i| ShaderValue::named(format!("x{reg}[{i}]")))
                    .collect()
            })
            .collect();

        let outputs = program
            .output_signature
            .iter()
            .enumerate()
            .map(|(i, sig)| {
                if sig.semantic_name.is_empty() {
                    ShaderValue::named(format!("o{i}"))
                } else {
                    ShaderValue::named(sig.semantic_name.clone())
                }
            })
            .collect();

        Self {
            program_counter: 0,
            registers,
            indexable_temps,
            outputs,
            inputs: init.inputs,
            semantics: init.semantics,
            flags: StepFlags::empty(),
            done: false,
            modified: Vec::new(),
        }
    }

    /// Whether this invocation has nothing left to execute.
    pub fn finished(&self, program: &Program) -> bool {
        self.done || self.program_counter >= program.num_instructions()
    }
}
