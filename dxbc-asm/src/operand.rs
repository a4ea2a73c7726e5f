//! Decoded operand model: register files, swizzles, masks, modifiers and
//! indirect indices.

/// Register file or data source an operand refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum OperandType {
    /// Temporary register `r#`.
    Temp,
    /// Indexable temporary array `x#[...]`.
    IndexableTemp,
    /// Per-invocation input `v#`.
    Input,
    /// Per-invocation output `o#`.
    Output,
    /// Constant buffer `cb#[...]`, addressed by declared register number.
    ConstantBuffer,
    /// The shader's embedded immediate constant buffer `icb[...]`.
    ImmediateConstantBuffer,
    /// 32-bit literal value(s) baked into the instruction.
    Immediate32,
    /// 64-bit literal; decoded but rejected by the interpreter.
    Immediate64,
    /// Compute group id `vThreadGroupID`.
    InputThreadGroupId,
    /// Global dispatch thread id `vThreadID`.
    InputThreadId,
    /// Thread id within the group `vThreadIDInGroup`.
    InputThreadIdInGroup,
    /// Flattened thread id within the group.
    InputThreadIdInGroupFlattened,
    /// Pixel coverage mask `vCoverage`.
    InputCoverageMask,
    /// Primitive id `vPrim`.
    InputPrimitiveId,
    /// Groupshared memory allocation `g#`.
    ThreadGroupSharedMemory,
    /// Shader resource view `t#`.
    Resource,
    /// Sampler `s#`.
    Sampler,
    /// Unordered access view `u#`.
    UnorderedAccessView,
    /// Rasterizer binding, used by sample-position queries.
    Rasterizer,
    /// Bit bucket destination / absent operand.
    Null,
}

impl OperandType {
    /// Whether float data read from this operand participates in denormal
    /// flushing. Binding-style operands carry a slot index, not lane data.
    pub const fn is_flushable(&self) -> bool {
        !matches!(
            self,
            OperandType::ThreadGroupSharedMemory
                | OperandType::Resource
                | OperandType::Sampler
                | OperandType::UnorderedAccessView
                | OperandType::Null
                | OperandType::Rasterizer
        )
    }
}

/// Per-source-operand absolute-value / negation modifier, applied after the
/// swizzle under the opcode's arithmetic type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperandModifier {
    /// No modification.
    #[default]
    None,
    /// Negate.
    Neg,
    /// Absolute value.
    Abs,
    /// Negated absolute value, `-|x|`.
    AbsNeg,
}

/// Declared component count of an operand.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumComponents {
    /// Operand carries no data components (e.g. NULL).
    None,
    /// Scalar operand.
    One,
    /// Full 4-wide operand.
    #[default]
    Four,
}

/// One dimension of an operand's register address.
///
/// `index` is the absolute part; when `relative` is present, the `.x` lane of
/// that operand's value is added at evaluation time.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperandIndex {
    /// Whether the absolute part is present.
    pub absolute: bool,
    /// Absolute index value; ignored when `absolute` is false.
    pub index: u32,
    /// Optional dynamic offset source.
    pub relative: Option<Box<Operand>>,
}

impl OperandIndex {
    /// A purely absolute index.
    pub const fn absolute(index: u32) -> Self {
        Self {
            absolute: true,
            index,
            relative: None,
        }
    }
}

impl From<u32> for OperandIndex {
    fn from(index: u32) -> Self {
        Self::absolute(index)
    }
}

/// Unused component selector slot.
pub const COMP_NONE: u8 = 0xff;

/// A decoded instruction operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operand {
    /// Register file this operand addresses.
    pub operand_type: OperandType,
    /// Register address, up to three dimensions deep.
    pub indices: Vec<OperandIndex>,
    /// Component selector. For sources this is the swizzle, for destinations
    /// the write mask; `0xff` marks an unused slot.
    pub comps: [u8; 4],
    /// Declared component count.
    pub num_components: NumComponents,
    /// Absolute-value / negation modifier.
    pub modifier: OperandModifier,
    /// Literal payload for immediate operands.
    pub values: [u32; 4],
}

impl Default for Operand {
    fn default() -> Self {
        Self {
            operand_type: OperandType::Null,
            indices: Vec::new(),
            comps: [0, 1, 2, 3],
            num_components: NumComponents::Four,
            modifier: OperandModifier::None,
            values: [0; 4],
        }
    }
}

impl Operand {
    /// A NULL operand (silent-discard destination or absent source).
    pub fn null() -> Self {
        Self {
            num_components: NumComponents::None,
            comps: [COMP_NONE; 4],
            ..Self::default()
        }
    }

    fn register(operand_type: OperandType, index: u32) -> Self {
        Self {
            operand_type,
            indices: vec![OperandIndex::absolute(index)],
            ..Self::default()
        }
    }

    /// Temporary register `r<index>` with identity swizzle.
    pub fn temp(index: u32) -> Self {
        Self::register(OperandType::Temp, index)
    }

    /// Indexable temporary `x<array>[<member>]`.
    pub fn indexable_temp(array: u32, member: u32) -> Self {
        Self {
            operand_type: OperandType::IndexableTemp,
            indices: vec![OperandIndex::absolute(array), OperandIndex::absolute(member)],
            ..Self::default()
        }
    }

    /// Input register `v<index>`.
    pub fn input(index: u32) -> Self {
        Self::register(OperandType::Input, index)
    }

    /// Output register `o<index>`.
    pub fn output(index: u32) -> Self {
        Self::register(OperandType::Output, index)
    }

    /// Constant-buffer element `cb<register>[<element>]`.
    pub fn cbuffer(register: u32, element: u32) -> Self {
        Self {
            operand_type: OperandType::ConstantBuffer,
            indices: vec![
                OperandIndex::absolute(register),
                OperandIndex::absolute(element),
            ],
            ..Self::default()
        }
    }

    /// Binding-style operand (resource, sampler, UAV, groupshared).
    pub fn binding(operand_type: OperandType, slot: u32) -> Self {
        Self::register(operand_type, slot)
    }

    /// Scalar 32-bit literal.
    pub fn imm32_scalar(value: u32) -> Self {
        Self {
            operand_type: OperandType::Immediate32,
            num_components: NumComponents::One,
            comps: [0, COMP_NONE, COMP_NONE, COMP_NONE],
            values: [value, 0, 0, 0],
            ..Self::default()
        }
    }

    /// 4-wide 32-bit literal.
    pub fn imm32(values: [u32; 4]) -> Self {
        Self {
            operand_type: OperandType::Immediate32,
            values,
            ..Self::default()
        }
    }

    /// Replace the component selector with a source swizzle.
    pub fn swizzle(mut self, comps: [u8; 4]) -> Self {
        self.comps = comps;
        self
    }

    /// Select a single source component, making the operand scalar.
    pub fn select(mut self, comp: u8) -> Self {
        self.comps = [comp, COMP_NONE, COMP_NONE, COMP_NONE];
        self
    }

    /// Replace the component selector with a destination write mask built
    /// from the listed component indices.
    pub fn mask(mut self, comps: &[u8]) -> Self {
        self.comps = [COMP_NONE; 4];
        for (slot, &c) in self.comps.iter_mut().zip(comps) {
            *slot = c;
        }
        self
    }

    /// Attach an absolute/negation modifier.
    pub fn modifier(mut self, modifier: OperandModifier) -> Self {
        self.modifier = modifier;
        self
    }

    /// Make the first index relative to another operand's `.x` lane.
    pub fn relative(mut self, offset: Operand) -> Self {
        if let Some(first) = self.indices.first_mut() {
            first.relative = Some(Box::new(offset));
        }
        self
    }

    /// Make the last (innermost) index relative to another operand's `.x`
    /// lane. Used for `x0[r1.x + 3]`-style addressing.
    pub fn relative_last(mut self, offset: Operand) -> Self {
        if let Some(last) = self.indices.last_mut() {
            last.relative = Some(Box::new(offset));
        }
        self
    }

    /// Whether the selector picks exactly one component.
    pub fn is_scalar_selector(&self) -> bool {
        self.comps[0] != COMP_NONE && self.comps[1..].iter().all(|&c| c == COMP_NONE)
    }

    /// Destination components named by the write mask, in slot order.
    pub fn mask_components(&self) -> impl Iterator<Item = u8> + '_ {
        self.comps.iter().copied().filter(|&c| c != COMP_NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_builder_orders_components() {
        let op = Operand::temp(0).mask(&[1, 3]);
        assert_eq!(op.comps, [1, 3, COMP_NONE, COMP_NONE]);
        assert_eq!(op.mask_components().collect::<Vec<_>>(), vec![1, 3]);
        assert!(!op.is_scalar_selector());
        assert!(Operand::temp(0).mask(&[2]).is_scalar_selector());
    }

    #[test]
    fn binding_operands_do_not_flush() {
        assert!(OperandType::Temp.is_flushable());
        assert!(OperandType::Immediate32.is_flushable());
        assert!(!OperandType::UnorderedAccessView.is_flushable());
        assert!(!OperandType::Null.is_flushable());
    }
}
