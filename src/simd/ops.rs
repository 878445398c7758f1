//! Closed operator sets for lane-wise, comparison, test and reduction operations.
//!
//! Each operator belongs to a domain: some apply to every element kind, some
//! only to integral kinds (bitwise and shift operators), some only to floating
//! kinds (transcendental functions). Using an operator outside its domain fails
//! with [`LanevecError::UnsupportedOperation`](crate::error::LanevecError)
//! before any lane is evaluated.
//!
//! The scalar meaning of every operator lives in
//! [`Element`](crate::simd::element::Element); that definition is the
//! authoritative one for every backend.

use std::fmt;

use crate::error::{unsupported_operation, Result};
use crate::simd::element::{Element, ElementKind};

/// Which element kinds an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpDomain {
    /// Every element kind.
    Any,
    /// `i8`, `i16`, `i32` and `i64` only.
    Integral,
    /// `f32` and `f64` only.
    Floating,
}

impl OpDomain {
    fn admits(self, kind: ElementKind) -> bool {
        match self {
            OpDomain::Any => true,
            OpDomain::Integral => !kind.is_floating(),
            OpDomain::Floating => kind.is_floating(),
        }
    }
}

/// Fails with `UnsupportedOperation` unless `op` is defined for `E`.
pub(crate) fn ensure_supported<E: Element>(op: impl Operator) -> Result<()> {
    if op.domain().admits(E::KIND) {
        Ok(())
    } else {
        Err(unsupported_operation(format!(
            "{op:?} is not defined for {} lanes",
            E::KIND
        )))
    }
}

/// Common metadata of every operator enum.
pub trait Operator: Copy + fmt::Debug {
    /// Element kinds this operator accepts.
    fn domain(self) -> OpDomain;
}

/// Lane-wise operators taking one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation (wrapping for integral kinds).
    Neg,
    /// Absolute value (wrapping for integral kinds, so `MIN` stays `MIN`).
    Abs,
    /// Bitwise complement.
    Not,
    /// Zero stays zero, anything else becomes all-ones.
    Zomo,
    /// Population count.
    BitCount,
    /// Count of leading zero bits.
    LeadingZerosCount,
    /// Count of trailing zero bits.
    TrailingZerosCount,
    /// Byte order reversal.
    ReverseBytes,
    Sqrt,
    Cbrt,
    Exp,
    /// `exp(x) - 1`, accurate near zero.
    Expm1,
    /// Natural logarithm.
    Log,
    /// `ln(1 + x)`, accurate near zero.
    Log1p,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
}

impl Operator for UnaryOp {
    fn domain(self) -> OpDomain {
        use UnaryOp::*;
        match self {
            Neg | Abs => OpDomain::Any,
            Not | Zomo | BitCount | LeadingZerosCount | TrailingZerosCount | ReverseBytes => {
                OpDomain::Integral
            }
            _ => OpDomain::Floating,
        }
    }
}

/// Lane-wise operators taking two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Addition (wrapping for integral kinds).
    Add,
    /// Subtraction (wrapping for integral kinds).
    Sub,
    /// Multiplication (wrapping for integral kinds).
    Mul,
    /// Division. Integral division by zero on an active lane is an error.
    Div,
    /// Minimum. Floating kinds propagate NaN and order `-0.0` below `+0.0`.
    Min,
    /// Maximum. Floating kinds propagate NaN and order `-0.0` below `+0.0`.
    Max,
    /// First operand unless its bit pattern is zero, else the second.
    FirstNonzero,
    And,
    Or,
    Xor,
    /// `a & !b`.
    AndNot,
    /// Shift left; the count is reduced modulo the lane bit width.
    Lshl,
    /// Arithmetic shift right; the count is reduced modulo the lane bit width.
    Ashr,
    /// Logical shift right; the count is reduced modulo the lane bit width.
    Lshr,
    /// Rotate left.
    Rol,
    /// Rotate right.
    Ror,
    /// Saturating addition.
    SaturatingAdd,
    /// Saturating subtraction.
    SaturatingSub,
    Pow,
    Atan2,
    Hypot,
}

impl BinaryOp {
    /// True for operators that can fault on an integral zero divisor.
    pub(crate) fn is_division(self) -> bool {
        matches!(self, BinaryOp::Div)
    }
}

impl Operator for BinaryOp {
    fn domain(self) -> OpDomain {
        use BinaryOp::*;
        match self {
            Add | Sub | Mul | Div | Min | Max | FirstNonzero => OpDomain::Any,
            And | Or | Xor | AndNot | Lshl | Ashr | Lshr | Rol | Ror | SaturatingAdd
            | SaturatingSub => OpDomain::Integral,
            Pow | Atan2 | Hypot => OpDomain::Floating,
        }
    }
}

/// Lane-wise operators taking three operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TernaryOp {
    /// Fused multiply-add `a * b + c` with a single rounding.
    Fma,
    /// `(a & !c) | (b & c)`: bits of `b` where `c` is set, else bits of `a`.
    BitwiseBlend,
}

impl Operator for TernaryOp {
    fn domain(self) -> OpDomain {
        match self {
            TernaryOp::Fma => OpDomain::Floating,
            TernaryOp::BitwiseBlend => OpDomain::Integral,
        }
    }
}

/// Lane-wise relations producing a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    /// Negation of `Eq`, so NaN lanes compare not-equal.
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    UnsignedLt,
    UnsignedLe,
    UnsignedGt,
    UnsignedGe,
}

impl Operator for Comparison {
    fn domain(self) -> OpDomain {
        use Comparison::*;
        match self {
            Eq | Ne | Lt | Le | Gt | Ge => OpDomain::Any,
            UnsignedLt | UnsignedLe | UnsignedGt | UnsignedGe => OpDomain::Integral,
        }
    }
}

/// Lane-wise predicates producing a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Test {
    /// Bit pattern is all zeros (`-0.0` is not default).
    IsDefault,
    /// Sign bit is set (`-0.0` is negative).
    IsNegative,
    IsFinite,
    IsNan,
    IsInfinite,
}

impl Operator for Test {
    fn domain(self) -> OpDomain {
        match self {
            Test::IsDefault | Test::IsNegative => OpDomain::Any,
            Test::IsFinite | Test::IsNan | Test::IsInfinite => OpDomain::Floating,
        }
    }
}

/// Associative operators usable as cross-lane reductions. All but `FirstNonzero`
/// are also commutative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociativeOp {
    Add,
    Mul,
    Min,
    Max,
    FirstNonzero,
    And,
    Or,
    Xor,
}

impl AssociativeOp {
    /// The equivalent lane-wise operator.
    pub fn as_binary(self) -> BinaryOp {
        match self {
            AssociativeOp::Add => BinaryOp::Add,
            AssociativeOp::Mul => BinaryOp::Mul,
            AssociativeOp::Min => BinaryOp::Min,
            AssociativeOp::Max => BinaryOp::Max,
            AssociativeOp::FirstNonzero => BinaryOp::FirstNonzero,
            AssociativeOp::And => BinaryOp::And,
            AssociativeOp::Or => BinaryOp::Or,
            AssociativeOp::Xor => BinaryOp::Xor,
        }
    }

    /// Value that leaves any lane unchanged when combined with it.
    pub fn identity<E: Element>(self) -> E {
        match self {
            AssociativeOp::Add
            | AssociativeOp::Or
            | AssociativeOp::Xor
            | AssociativeOp::FirstNonzero => E::ZERO,
            AssociativeOp::Mul => E::ONE,
            AssociativeOp::Min => E::MAX_VALUE,
            AssociativeOp::Max => E::MIN_VALUE,
            AssociativeOp::And => E::from_raw_bits(u64::MAX),
        }
    }
}

impl Operator for AssociativeOp {
    fn domain(self) -> OpDomain {
        self.as_binary().domain()
    }
}

/// Kind of lane conversion performed by `convert_shape`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// Numeric value conversion with Rust `as` semantics.
    Convert,
    /// Raw bit reinterpretation of the vector's bytes.
    Reinterpret,
}
