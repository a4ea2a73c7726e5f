use crate::{
    Declaration, Instruction, OperandType, ResourceDim, ResourceRetType, SamplerMode,
    SigParameter,
};

/// A bound constant buffer, addressed by its declared register number rather
/// than by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CBufferBinding {
    /// Declared register number (`cb#`).
    pub register_number: u32,
    /// Buffer name from reflection, may be empty.
    pub name: String,
}

/// A fully decoded shader program: the output of the external binary
/// container parser and the sole input of the interpreter.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    /// Declaration block, in declaration order.
    pub declarations: Vec<Declaration>,
    /// Flat executable instruction stream.
    pub instructions: Vec<Instruction>,
    /// Input signature; position maps to the input register array.
    pub input_signature: Vec<SigParameter>,
    /// Output signature; position maps to the output register array.
    pub output_signature: Vec<SigParameter>,
    /// Constant-buffer bindings in reflection order.
    pub cbuffers: Vec<CBufferBinding>,
    /// Raw 32-bit words of the immediate constant buffer.
    pub immediate_cbuffer: Vec<u32>,
}

impl Program {
    /// Number of declarations.
    pub fn num_declarations(&self) -> usize {
        self.declarations.len()
    }

    /// Declaration by index.
    pub fn declaration(&self, index: usize) -> Option<&Declaration> {
        self.declarations.get(index)
    }

    /// Number of executable instructions.
    pub fn num_instructions(&self) -> usize {
        self.instructions.len()
    }

    /// Instruction by index.
    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Declared temporary-register count (`dcl_temps`).
    pub fn num_temps(&self) -> u32 {
        self.declarations
            .iter()
            .find_map(|d| match d {
                Declaration::Temps { count } => Some(*count),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Declared indexable temporaries as `(reg, count, components)`,
    /// ordered by register number.
    pub fn indexable_temps(&self) -> Vec<(u32, u32, u8)> {
        let mut temps: Vec<_> = self
            .declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::IndexableTemp {
                    reg,
                    count,
                    components,
                } => Some((*reg, *count, *components)),
                _ => None,
            })
            .collect();
        temps.sort_by_key(|&(reg, ..)| reg);
        temps
    }

    /// Declared compute group size, `[1, 1, 1]` when absent.
    pub fn group_size(&self) -> [u32; 3] {
        self.declarations
            .iter()
            .find_map(|d| match d {
                Declaration::ThreadGroup { size } => Some(*size),
                _ => None,
            })
            .unwrap_or([1, 1, 1])
    }

    /// Declared stride of a structured view on `slot`, honouring whether the
    /// access goes through a UAV (`u#`) or an SRV (`t#`).
    pub fn structured_stride(&self, operand_type: OperandType, slot: u32) -> Option<u32> {
        let want_uav = operand_type == OperandType::UnorderedAccessView;
        self.declarations.iter().find_map(|d| match d {
            Declaration::StructuredBuffer {
                slot: s,
                stride,
                uav,
                ..
            } if *s == slot && *uav == want_uav => Some(*stride),
            _ => None,
        })
    }

    /// Typed resource declaration for `slot`, as
    /// `(dim, ret_type, sample_count)`.
    pub fn resource_decl(&self, slot: u32) -> Option<(ResourceDim, [ResourceRetType; 4], u32)> {
        self.declarations.iter().find_map(|d| match d {
            Declaration::Resource {
                slot: s,
                dim,
                ret_type,
                sample_count,
            } if *s == slot => Some((*dim, *ret_type, *sample_count)),
            _ => None,
        })
    }

    /// Typed UAV declaration for `slot`.
    pub fn typed_uav_decl(&self, slot: u32) -> Option<&Declaration> {
        self.declarations.iter().find(|d| {
            matches!(d, Declaration::TypedUav { slot: s, .. } if *s == slot)
        })
    }

    /// Declared sampler mode for `slot`.
    pub fn sampler_mode(&self, slot: u32) -> SamplerMode {
        self.declarations
            .iter()
            .find_map(|d| match d {
                Declaration::Sampler { slot: s, mode } if *s == slot => Some(*mode),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Position of the constant buffer declared with `register_number`, the
    /// lookup the ISA's `cb#[...]` addressing requires.
    pub fn cbuffer_position(&self, register_number: u32) -> Option<usize> {
        self.cbuffers
            .iter()
            .position(|cb| cb.register_number == register_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbuffer_lookup_is_by_register_not_position() {
        let program = Program {
            cbuffers: vec![
                CBufferBinding {
                    register_number: 7,
                    name: "globals".into(),
                },
                CBufferBinding {
                    register_number: 0,
                    name: "locals".into(),
                },
            ],
            ..Program::default()
        };
        assert_eq!(program.cbuffer_position(0), Some(1));
        assert_eq!(program.cbuffer_position(7), Some(0));
        assert_eq!(program.cbuffer_position(3), None);
    }

    #[test]
    fn structured_stride_distinguishes_uav_from_srv() {
        let program = Program {
            declarations: vec![
                Declaration::StructuredBuffer {
                    slot: 0,
                    stride: 16,
                    uav: false,
                    has_counter: false,
                },
                Declaration::StructuredBuffer {
                    slot: 0,
                    stride: 48,
                    uav: true,
                    has_counter: true,
                },
            ],
            ..Program::default()
        };
        assert_eq!(program.structured_stride(OperandType::Resource, 0), Some(16));
        assert_eq!(
            program.structured_stride(OperandType::UnorderedAccessView, 0),
            Some(48)
        );
    }
}
