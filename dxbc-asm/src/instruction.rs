use crate::{Opcode, Operand};

/// Return-type modifier carried by `resinfo` and `sample_info`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResinfoRetType {
    /// Dimensions as floats.
    #[default]
    Float,
    /// Reciprocal floats on the dimension lanes.
    RcpFloat,
    /// Raw unsigned integers.
    UInt,
}

/// One decoded instruction of the flat instruction stream.
///
/// The external container parser produces these; the interpreter never sees
/// raw token bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    /// Operation selector.
    pub opcode: Opcode,
    /// Destination operands first, then sources.
    pub operands: Vec<Operand>,
    /// Clamp the result to [0, 1] under the operation type.
    pub saturate: bool,
    /// Predicate polarity for IF / BREAKC / CONTINUEC / RETC / DISCARD; the
    /// flag flips the truth of the predicate's bit pattern.
    pub nonzero: bool,
    /// Structured stride override decoded from the instruction; resolution
    /// prefers the matching declaration.
    pub stride: u32,
    /// Immediate texel offset for sample/load/gather opcodes.
    pub texel_offsets: [i8; 3],
    /// Return-type modifier for `resinfo` / `sample_info`.
    pub resinfo_ret_type: ResinfoRetType,
    /// Disassembly text, used for host debug messages only.
    pub text: String,
}

impl Instruction {
    /// A bare instruction with no operands.
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            operands: Vec::new(),
            saturate: false,
            nonzero: false,
            stride: 0,
            texel_offsets: [0; 3],
            resinfo_ret_type: ResinfoRetType::default(),
            text: String::new(),
        }
    }

    /// Append an operand.
    pub fn push(mut self, operand: Operand) -> Self {
        self.operands.push(operand);
        self
    }

    /// Enable the saturate modifier.
    pub fn saturated(mut self) -> Self {
        self.saturate = true;
        self
    }

    /// Set the predicate polarity to nonzero-is-true.
    pub fn if_nonzero(mut self) -> Self {
        self.nonzero = true;
        self
    }

    /// Disassembly text shown in host debug messages.
    pub fn display_text(&self) -> &str {
        if self.text.is_empty() {
            self.opcode.mnemonic()
        } else {
            &self.text
        }
    }
}
