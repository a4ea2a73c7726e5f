//! Value and resource-view typing shared between the decoder and the
//! interpreter.

/// Interpretation of a 4-lane register value. The bit layout is always four
/// 32-bit words; the type only describes how operations read them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarType {
    /// 32-bit float lanes.
    #[default]
    Float,
    /// 32-bit signed integer lanes.
    SInt,
    /// 32-bit unsigned integer lanes.
    UInt,
    /// Two 64-bit doubles packed across the lane pairs .xy and .zw.
    Double,
}

/// Per-component storage type of a packed resource format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompType {
    /// Unsigned integer.
    #[default]
    UInt,
    /// Signed integer.
    SInt,
    /// Unsigned normalised to [0, 1].
    UNorm,
    /// Unsigned normalised with sRGB gamma on load/store.
    UNormSrgb,
    /// Signed normalised to [-1, 1].
    SNorm,
    /// IEEE float (half when 16-bit wide, single when 32).
    Float,
}

/// Bit-packing family of a resource format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatPacking {
    /// Each component occupies `byte_width` whole bytes.
    #[default]
    Regular,
    /// 10/10/10/2 bits in one 32-bit word.
    R10G10B10A2,
    /// 11/11/10-bit small floats in one 32-bit word; load only.
    R11G11B10,
}

/// Element format of a typed resource view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceFormat {
    /// Bytes per component for [`FormatPacking::Regular`] (1, 2 or 4).
    pub byte_width: u32,
    /// Component storage type.
    pub comp_type: CompType,
    /// Component count, 1 to 4.
    pub num_comps: u32,
    /// Bit-packing family.
    pub packing: FormatPacking,
}

impl ResourceFormat {
    /// A regular (byte-aligned) format.
    pub const fn regular(byte_width: u32, comp_type: CompType, num_comps: u32) -> Self {
        Self {
            byte_width,
            comp_type,
            num_comps,
            packing: FormatPacking::Regular,
        }
    }

    /// Bytes per element of this format.
    pub const fn element_stride(&self) -> u32 {
        match self.packing {
            FormatPacking::Regular => self.byte_width * self.num_comps,
            FormatPacking::R10G10B10A2 | FormatPacking::R11G11B10 => 4,
        }
    }
}

impl Default for ResourceFormat {
    fn default() -> Self {
        Self::regular(4, CompType::UInt, 4)
    }
}

/// Dimensionality of a declared resource.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ResourceDim {
    /// Not declared / unknown.
    #[default]
    Unknown,
    /// Typed or raw buffer.
    Buffer,
    /// 1D texture.
    Texture1D,
    /// 1D texture array.
    Texture1DArray,
    /// 2D texture.
    Texture2D,
    /// 2D texture array.
    Texture2DArray,
    /// Multisampled 2D texture.
    Texture2DMs,
    /// Multisampled 2D texture array.
    Texture2DMsArray,
    /// 3D texture.
    Texture3D,
    /// Cube texture.
    TextureCube,
    /// Cube texture array.
    TextureCubeArray,
}

impl ResourceDim {
    /// Number of meaningful width/height/depth lanes for `resinfo`.
    pub const fn dimension_count(&self) -> u32 {
        use ResourceDim::*;
        match self {
            Buffer | Texture1D => 1,
            Texture1DArray | Texture2D | Texture2DMs | TextureCube => 2,
            Texture2DArray | Texture2DMsArray | Texture3D | TextureCubeArray => 3,
            Unknown => 0,
        }
    }

    /// Whether the level-of-detail query is defined for this dimensionality.
    pub const fn supports_lod(&self) -> bool {
        use ResourceDim::*;
        matches!(
            self,
            Texture1D
                | Texture1DArray
                | Texture2D
                | Texture2DArray
                | Texture3D
                | TextureCube
                | TextureCubeArray
        )
    }
}

/// Declared return type of a resource view's components.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceRetType {
    /// Not declared.
    #[default]
    Unknown,
    /// Unsigned normalised.
    UNorm,
    /// Signed normalised.
    SNorm,
    /// Signed integer.
    SInt,
    /// Unsigned integer.
    UInt,
    /// Float.
    Float,
    /// Double.
    Double,
}

/// Declared addressing/filter mode of a sampler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SamplerMode {
    /// Plain filtering sampler.
    #[default]
    Default,
    /// Comparison sampler used by `sample_c` and friends.
    Comparison,
    /// Legacy mono sampler.
    Mono,
}
