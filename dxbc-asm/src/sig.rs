use core::fmt;

/// System-value builtin a signature element maps to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum SystemValue {
    /// Plain user semantic.
    #[default]
    Undefined,
    /// Clip-space position.
    Position,
    /// Clip distance.
    ClipDistance,
    /// Cull distance.
    CullDistance,
    /// Render-target array index.
    RenderTargetIndex,
    /// Viewport array index.
    ViewportIndex,
    /// Vertex index.
    VertexIndex,
    /// Primitive index.
    PrimitiveIndex,
    /// Instance index.
    InstanceIndex,
    /// Front-facing flag.
    IsFrontFace,
    /// MSAA sample index.
    SampleIndex,
    /// Render-target colour output.
    Target,
    /// Depth output.
    Depth,
    /// Coverage output.
    Coverage,
    /// Conservative depth, greater-equal.
    DepthGreaterEqual,
    /// Conservative depth, less-equal.
    DepthLessEqual,
}

impl fmt::Display for SystemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One element of an input or output signature.
///
/// The position in the signature array is the position in the interpreter's
/// IO register arrays; `register` is the ISA register number it binds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SigParameter {
    /// Semantic name, e.g. `TEXCOORD`.
    pub semantic_name: String,
    /// Semantic index, e.g. the `3` of `TEXCOORD3`.
    pub semantic_index: u32,
    /// ISA register number.
    pub register: u32,
    /// System-value builtin, or [`SystemValue::Undefined`] for user data.
    pub system_value: SystemValue,
    /// Component mask the element occupies, low four bits.
    pub mask: u8,
}

impl SigParameter {
    /// A user-semantic element occupying all four components.
    pub fn user(semantic_name: impl Into<String>, semantic_index: u32, register: u32) -> Self {
        Self {
            semantic_name: semantic_name.into(),
            semantic_index,
            register,
            system_value: SystemValue::Undefined,
            mask: 0xf,
        }
    }

    /// A system-value element occupying all four components.
    pub fn system(system_value: SystemValue, register: u32) -> Self {
        Self {
            semantic_name: system_value.to_string(),
            semantic_index: 0,
            register,
            system_value,
            mask: 0xf,
        }
    }
}
