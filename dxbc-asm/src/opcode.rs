use core::fmt;

/// Opcode of a decoded shader instruction.
///
/// Covers the executable subset of the shader-model ISA: declarations are
/// carried separately as [`crate::Declaration`] and never appear in the
/// instruction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Opcode {
    /// No operation.
    Nop,

    // Float arithmetic.
    /// Component-wise float addition.
    Add,
    /// Component-wise float multiplication.
    Mul,
    /// Component-wise float division.
    Div,
    /// Fused multiply-add, `a * b + c`.
    Mad,
    /// Fractional part, `x - floor(x)`.
    Frc,
    /// 2-component dot product.
    Dp2,
    /// 3-component dot product.
    Dp3,
    /// 4-component dot product.
    Dp4,
    /// NaN-preserving float minimum.
    Min,
    /// NaN-preserving float maximum.
    Max,
    /// Round toward positive infinity.
    RoundPi,
    /// Round toward negative infinity.
    RoundNi,
    /// Round toward zero.
    RoundZ,
    /// Round to nearest even.
    RoundNe,
    /// Reciprocal (host transcendental).
    Rcp,
    /// Reciprocal square root (host transcendental).
    Rsq,
    /// Square root (host transcendental).
    Sqrt,
    /// Base-2 exponential (host transcendental).
    Exp,
    /// Base-2 logarithm (host transcendental).
    Log,
    /// Simultaneous sine and cosine (host transcendental).
    Sincos,

    // Float comparison.
    /// Float equality, all-ones on true.
    Eq,
    /// Float inequality.
    Ne,
    /// Float less-than.
    Lt,
    /// Float greater-or-equal.
    Ge,

    // Moves and selects.
    /// Bit-pattern move; never alters denormals.
    Mov,
    /// Per-lane ternary select on the predicate's bit pattern.
    Movc,
    /// Two-output conditional swap.
    Swapc,

    // Integer arithmetic.
    /// Signed integer addition.
    IAdd,
    /// Signed integer negation.
    INeg,
    /// Signed 32x32 multiply with 64-bit hi/lo destinations.
    IMul,
    /// Signed multiply-add.
    IMad,
    /// Signed minimum.
    IMin,
    /// Signed maximum.
    IMax,
    /// Unsigned 32x32 multiply with 64-bit hi/lo destinations.
    UMul,
    /// Unsigned multiply-add.
    UMad,
    /// Unsigned minimum.
    UMin,
    /// Unsigned maximum.
    UMax,
    /// Unsigned divide writing quotient and remainder.
    UDiv,
    /// Unsigned add with carry-out.
    UAddc,
    /// Unsigned subtract with borrow-out.
    USubb,
    /// Shift left, count masked to 5 bits.
    IShl,
    /// Arithmetic shift right, count masked to 5 bits.
    IShr,
    /// Logical shift right, count masked to 5 bits.
    UShr,

    // Integer comparison.
    /// Signed integer equality.
    IEq,
    /// Signed integer inequality.
    INe,
    /// Signed less-than.
    ILt,
    /// Signed greater-or-equal.
    IGe,
    /// Unsigned less-than.
    ULt,
    /// Unsigned greater-or-equal.
    UGe,

    // Bit manipulation.
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Bitwise NOT.
    Not,
    /// Signed bitfield extract.
    IBfe,
    /// Unsigned bitfield extract.
    UBfe,
    /// Bitfield insert.
    Bfi,
    /// 32-bit bit reversal.
    Bfrev,
    /// Population count.
    Countbits,
    /// MSB-first set-bit index.
    FirstbitHi,
    /// LSB-first set-bit index.
    FirstbitLo,
    /// MSB-first index of the first bit differing from the sign bit.
    FirstbitShi,

    // Conversions.
    /// Signed integer to float.
    Itof,
    /// Unsigned integer to float.
    Utof,
    /// Float to signed integer, truncating toward zero.
    Ftoi,
    /// Float to unsigned integer, truncating toward zero.
    Ftou,
    /// Half float (low 16 bits) to float.
    F16tof32,
    /// Float to half float in the low 16 bits.
    F32tof16,
    /// Float to double pair.
    Ftod,
    /// Signed integer to double pair.
    Itod,
    /// Unsigned integer to double pair.
    Utod,
    /// Double pair to signed integers.
    Dtoi,
    /// Double pair to unsigned integers.
    Dtou,
    /// Double pair to floats.
    Dtof,

    // Double arithmetic, operating on the packed lane pairs.
    /// Double addition.
    DAdd,
    /// Double multiplication.
    DMul,
    /// Double division.
    DDiv,
    /// Double fused multiply-add.
    DFma,
    /// NaN-preserving double minimum.
    DMin,
    /// NaN-preserving double maximum.
    DMax,
    /// Double reciprocal.
    DRcp,
    /// Double move.
    DMov,
    /// Double conditional move; predicate lanes .x/.y steer pairs .xy/.zw.
    DMovc,
    /// Double equality.
    DEq,
    /// Double inequality.
    DNe,
    /// Double less-than.
    DLt,
    /// Double greater-or-equal.
    DGe,

    // Screen-space derivatives.
    /// Coarse horizontal derivative.
    DerivRtx,
    /// Coarse vertical derivative.
    DerivRty,
    /// Coarse horizontal derivative (explicit).
    DerivRtxCoarse,
    /// Fine horizontal derivative.
    DerivRtxFine,
    /// Coarse vertical derivative (explicit).
    DerivRtyCoarse,
    /// Fine vertical derivative.
    DerivRtyFine,

    // Resource access.
    /// Typed texel/element load.
    Ld,
    /// Typed multisampled load.
    LdMs,
    /// Raw byte-addressed load.
    LdRaw,
    /// Structured element load.
    LdStructured,
    /// Typed UAV load.
    LdUavTyped,
    /// Raw byte-addressed store.
    StoreRaw,
    /// Structured element store.
    StoreStructured,
    /// Typed UAV store.
    StoreUavTyped,

    // Sampling, delegated to the host.
    /// Sample with implicit derivatives.
    Sample,
    /// Sample with explicit level of detail.
    SampleL,
    /// Sample with level-of-detail bias.
    SampleB,
    /// Sample with explicit derivatives.
    SampleD,
    /// Comparison sample.
    SampleC,
    /// Comparison sample at level zero.
    SampleCLz,
    /// Four-texel gather.
    Gather4,
    /// Comparison gather.
    Gather4C,
    /// Gather with programmable offset.
    Gather4Po,
    /// Comparison gather with programmable offset.
    Gather4PoC,
    /// Level-of-detail query.
    Lod,
    /// Sample count / quality query.
    SampleInfo,
    /// Standard sample position query.
    SamplePos,
    /// Buffer size query.
    Bufinfo,
    /// Resource dimension query.
    Resinfo,
    /// Pull-model interpolant evaluation at a snapped offset.
    EvalSnapped,
    /// Pull-model interpolant evaluation at a sample index.
    EvalSampleIndex,
    /// Pull-model interpolant evaluation at the centroid.
    EvalCentroid,

    // Atomics on UAV or groupshared memory.
    /// Atomic integer add.
    AtomicIadd,
    /// Atomic signed maximum.
    AtomicImax,
    /// Atomic signed minimum.
    AtomicImin,
    /// Atomic unsigned maximum.
    AtomicUmax,
    /// Atomic unsigned minimum.
    AtomicUmin,
    /// Atomic AND.
    AtomicAnd,
    /// Atomic OR.
    AtomicOr,
    /// Atomic XOR.
    AtomicXor,
    /// Atomic compare-and-store.
    AtomicCmpStore,
    /// Atomic add returning the prior value.
    ImmAtomicIadd,
    /// Atomic signed maximum returning the prior value.
    ImmAtomicImax,
    /// Atomic signed minimum returning the prior value.
    ImmAtomicImin,
    /// Atomic unsigned maximum returning the prior value.
    ImmAtomicUmax,
    /// Atomic unsigned minimum returning the prior value.
    ImmAtomicUmin,
    /// Atomic AND returning the prior value.
    ImmAtomicAnd,
    /// Atomic OR returning the prior value.
    ImmAtomicOr,
    /// Atomic XOR returning the prior value.
    ImmAtomicXor,
    /// Atomic exchange returning the prior value.
    ImmAtomicExch,
    /// Atomic compare-exchange returning the prior value.
    ImmAtomicCmpExch,
    /// Post-increment of the view's hidden counter.
    ImmAtomicAlloc,
    /// Pre-decrement of the view's hidden counter.
    ImmAtomicConsume,

    // Structured control flow.
    /// Conditional block open; polarity comes from the instruction's
    /// `nonzero` flag.
    If,
    /// Alternative branch of the innermost open IF.
    Else,
    /// Conditional block close; label only.
    EndIf,
    /// Switch block open.
    Switch,
    /// Switch case label.
    Case,
    /// Switch default label.
    Default,
    /// Switch block close; label only.
    EndSwitch,
    /// Loop block open; label only.
    Loop,
    /// Loop block close; jumps back to the matching LOOP.
    EndLoop,
    /// Unconditional loop/switch exit.
    Break,
    /// Conditional loop/switch exit.
    Breakc,
    /// Unconditional jump to the loop head.
    Continue,
    /// Conditional jump to the loop head.
    Continuec,
    /// Unconditional return.
    Ret,
    /// Conditional return.
    Retc,
    /// Pixel discard; polarity from the `nonzero` flag.
    Discard,
}

impl Opcode {
    /// The assembly mnemonic for this opcode.
    pub const fn mnemonic(&self) -> &'static str {
        use Opcode::*;
        match self {
            Nop => "nop",
            Add => "add",
            Mul => "mul",
            Div => "div",
            Mad => "mad",
            Frc => "frc",
            Dp2 => "dp2",
            Dp3 => "dp3",
            Dp4 => "dp4",
            Min => "min",
            Max => "max",
            RoundPi => "round_pi",
            RoundNi => "round_ni",
            RoundZ => "round_z",
            RoundNe => "round_ne",
            Rcp => "rcp",
            Rsq => "rsq",
            Sqrt => "sqrt",
            Exp => "exp",
            Log => "log",
            Sincos => "sincos",
            Eq => "eq",
            Ne => "ne",
            Lt => "lt",
            Ge => "ge",
            Mov => "mov",
            Movc => "movc",
            Swapc => "swapc",
            IAdd => "iadd",
            INeg => "ineg",
            IMul => "imul",
            IMad => "imad",
            IMin => "imin",
            IMax => "imax",
            UMul => "umul",
            UMad => "umad",
            UMin => "umin",
            UMax => "umax",
            UDiv => "udiv",
            UAddc => "uaddc",
            USubb => "usubb",
            IShl => "ishl",
            IShr => "ishr",
            UShr => "ushr",
            IEq => "ieq",
            INe => "ine",
            ILt => "ilt",
            IGe => "ige",
            ULt => "ult",
            UGe => "uge",
            And => "and",
            Or => "or",
            Xor => "xor",
            Not => "not",
            IBfe => "ibfe",
            UBfe => "ubfe",
            Bfi => "bfi",
            Bfrev => "bfrev",
            Countbits => "countbits",
            FirstbitHi => "firstbit_hi",
            FirstbitLo => "firstbit_lo",
            FirstbitShi => "firstbit_shi",
            Itof => "itof",
            Utof => "utof",
            Ftoi => "ftoi",
            Ftou => "ftou",
            F16tof32 => "f16tof32",
            F32tof16 => "f32tof16",
            Ftod => "ftod",
            Itod => "itod",
            Utod => "utod",
            Dtoi => "dtoi",
            Dtou => "dtou",
            Dtof => "dtof",
            DAdd => "dadd",
            DMul => "dmul",
            DDiv => "ddiv",
            DFma => "dfma",
            DMin => "dmin",
            DMax => "dmax",
            DRcp => "drcp",
            DMov => "dmov",
            DMovc => "dmovc",
            DEq => "deq",
            DNe => "dne",
            DLt => "dlt",
            DGe => "dge",
            DerivRtx => "deriv_rtx",
            DerivRty => "deriv_rty",
            DerivRtxCoarse => "deriv_rtx_coarse",
            DerivRtxFine => "deriv_rtx_fine",
            DerivRtyCoarse => "deriv_rty_coarse",
            DerivRtyFine => "deriv_rty_fine",
            Ld => "ld",
            LdMs => "ld_ms",
            LdRaw => "ld_raw",
            LdStructured => "ld_structured",
            LdUavTyped => "ld_uav_typed",
            StoreRaw => "store_raw",
            StoreStructured => "store_structured",
            StoreUavTyped => "store_uav_typed",
            Sample => "sample",
            SampleL => "sample_l",
            SampleB => "sample_b",
            SampleD => "sample_d",
            SampleC => "sample_c",
            SampleCLz => "sample_c_lz",
            Gather4 => "gather4",
            Gather4C => "gather4_c",
            Gather4Po => "gather4_po",
            Gather4PoC => "gather4_po_c",
            Lod => "lod",
            SampleInfo => "sample_info",
            SamplePos => "sample_pos",
            Bufinfo => "bufinfo",
            Resinfo => "resinfo",
            EvalSnapped => "eval_snapped",
            EvalSampleIndex => "eval_sample_index",
            EvalCentroid => "eval_centroid",
            AtomicIadd => "atomic_iadd",
            AtomicImax => "atomic_imax",
            AtomicImin => "atomic_imin",
            AtomicUmax => "atomic_umax",
            AtomicUmin => "atomic_umin",
            AtomicAnd => "atomic_and",
            AtomicOr => "atomic_or",
            AtomicXor => "atomic_xor",
            AtomicCmpStore => "atomic_cmp_store",
            ImmAtomicIadd => "imm_atomic_iadd",
            ImmAtomicImax => "imm_atomic_imax",
            ImmAtomicImin => "imm_atomic_imin",
            ImmAtomicUmax => "imm_atomic_umax",
            ImmAtomicUmin => "imm_atomic_umin",
            ImmAtomicAnd => "imm_atomic_and",
            ImmAtomicOr => "imm_atomic_or",
            ImmAtomicXor => "imm_atomic_xor",
            ImmAtomicExch => "imm_atomic_exch",
            ImmAtomicCmpExch => "imm_atomic_cmp_exch",
            ImmAtomicAlloc => "imm_atomic_alloc",
            ImmAtomicConsume => "imm_atomic_consume",
            If => "if",
            Else => "else",
            EndIf => "endif",
            Switch => "switch",
            Case => "case",
            Default => "default",
            EndSwitch => "endswitch",
            Loop => "loop",
            EndLoop => "endloop",
            Break => "break",
            Breakc => "breakc",
            Continue => "continue",
            Continuec => "continuec",
            Ret => "ret",
            Retc => "retc",
            Discard => "discard",
        }
    }

    /// Whether this opcode is a structured-control-flow instruction or label.
    pub const fn is_flow(&self) -> bool {
        use Opcode::*;
        matches!(
            self,
            If | Else
                | EndIf
                | Switch
                | Case
                | Default
                | EndSwitch
                | Loop
                | EndLoop
                | Break
                | Breakc
                | Continue
                | Continuec
                | Ret
                | Retc
                | Discard
        )
    }

    /// Whether this opcode returns data through a sample/load/gather path.
    pub const fn is_sample_load_gather(&self) -> bool {
        use Opcode::*;
        matches!(
            self,
            Ld | LdMs
                | Sample
                | SampleL
                | SampleB
                | SampleD
                | SampleC
                | SampleCLz
                | Gather4
                | Gather4C
                | Gather4Po
                | Gather4PoC
                | Lod
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
