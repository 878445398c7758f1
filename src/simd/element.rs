//! Lane element kinds and their scalar semantics.
//!
//! [`Element`] is implemented for exactly six primitives: `i8`, `i16`, `i32`,
//! `i64`, `f32` and `f64`. Besides the usual numeric constants, each
//! implementation carries the per-lane definition of every operator in
//! [`ops`](crate::simd::ops). Those definitions are what the portable path
//! executes and what any accelerated backend must reproduce bit for bit.
//!
//! # Integral semantics
//!
//! - Arithmetic wraps (two's complement), including `MIN / -1` and `abs(MIN)`.
//! - Shift and rotate counts are reduced modulo the lane bit width, so a count
//!   of `-1` on `i8` lanes shifts by 7.
//! - Division by zero is rejected one level up, on active lanes only; here a
//!   zero divisor yields zero so inactive lanes can never fault.
//!
//! # Floating semantics
//!
//! - IEEE-754 arithmetic, NaN and infinities propagate and are never errors.
//! - `Min` / `Max` return NaN when either input is NaN and order `-0.0` below
//!   `+0.0`.
//! - `FirstNonzero`, `IsDefault` and `IsNegative` look at the raw bit pattern,
//!   so `-0.0` is non-zero and negative.

use std::fmt;
use std::sync::OnceLock;

use num::traits::AsPrimitive;

use crate::simd::memory::ByteOrder;
use crate::simd::ops::{BinaryOp, Comparison, TernaryOp, Test, UnaryOp};
use crate::simd::species::{Species, VectorShape};

/// Runtime tag for a lane element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ElementKind {
    /// Width of one lane in bits.
    pub const fn bit_size(self) -> usize {
        match self {
            ElementKind::I8 => 8,
            ElementKind::I16 => 16,
            ElementKind::I32 | ElementKind::F32 => 32,
            ElementKind::I64 | ElementKind::F64 => 64,
        }
    }

    /// Width of one lane in bytes.
    pub const fn byte_size(self) -> usize {
        self.bit_size() / 8
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, ElementKind::F32 | ElementKind::F64)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::I8 => "i8",
            ElementKind::I16 => "i16",
            ElementKind::I32 => "i32",
            ElementKind::I64 => "i64",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A primitive type that can occupy a vector lane.
///
/// The operator methods (`unary`, `binary`, ...) assume the operator's domain
/// has already been checked; an operator outside its domain returns the first
/// operand unchanged.
pub trait Element:
    sealed::Sealed
    + Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + Send
    + Sync
    + 'static
    + AsPrimitive<i8>
    + AsPrimitive<i16>
    + AsPrimitive<i32>
    + AsPrimitive<i64>
    + AsPrimitive<f32>
    + AsPrimitive<f64>
{
    const KIND: ElementKind;
    const ZERO: Self;
    const ONE: Self;
    /// Smallest value, `-inf` for floating kinds.
    const MIN_VALUE: Self;
    /// Largest value, `+inf` for floating kinds.
    const MAX_VALUE: Self;
    /// Size of one lane in bytes.
    const BYTES: usize;

    /// Converts any lane value with Rust `as` semantics.
    fn from_lane<S: Element>(value: S) -> Self;

    /// Lane value as `i64`, with Rust `as` semantics.
    fn to_i64(self) -> i64 {
        <Self as AsPrimitive<i64>>::as_(self)
    }

    /// Raw bit pattern, zero-extended.
    fn to_raw_bits(self) -> u64;

    /// Value from the low `BYTES * 8` bits of `bits`.
    fn from_raw_bits(bits: u64) -> Self;

    /// Writes `BYTES` bytes into the front of `dst`.
    fn write_bytes(self, dst: &mut [u8], order: ByteOrder);

    /// Reads `BYTES` bytes from the front of `src`.
    fn read_bytes(src: &[u8], order: ByteOrder) -> Self;

    fn unary(op: UnaryOp, a: Self) -> Self;

    fn binary(op: BinaryOp, a: Self, b: Self) -> Self;

    fn ternary(op: TernaryOp, a: Self, b: Self, c: Self) -> Self;

    fn compare(op: Comparison, a: Self, b: Self) -> bool;

    fn test(op: Test, a: Self) -> bool;

    /// Registry slot of the species with this element kind and `shape`.
    #[doc(hidden)]
    fn species_slot(shape: VectorShape) -> &'static OnceLock<Species<Self>>;

    #[doc(hidden)]
    fn as_f32_lanes(_lanes: &[Self]) -> Option<&[f32]> {
        None
    }

    #[doc(hidden)]
    fn as_f64_lanes(_lanes: &[Self]) -> Option<&[f64]> {
        None
    }

    #[doc(hidden)]
    fn from_f32_lanes(_lanes: Vec<f32>) -> Option<Vec<Self>> {
        None
    }

    #[doc(hidden)]
    fn from_f64_lanes(_lanes: Vec<f64>) -> Option<Vec<Self>> {
        None
    }
}

macro_rules! species_slots {
    ($t:ty) => {
        fn species_slot(shape: VectorShape) -> &'static OnceLock<Species<$t>> {
            static SLOTS: [OnceLock<Species<$t>>; VectorShape::COUNT] =
                [OnceLock::new(), OnceLock::new(), OnceLock::new(), OnceLock::new()];
            &SLOTS[shape.ordinal()]
        }
    };
}

macro_rules! byte_codec {
    ($t:ty) => {
        fn write_bytes(self, dst: &mut [u8], order: ByteOrder) {
            let bytes = match order {
                ByteOrder::LittleEndian => self.to_le_bytes(),
                ByteOrder::BigEndian => self.to_be_bytes(),
            };
            dst[..Self::BYTES].copy_from_slice(&bytes);
        }

        fn read_bytes(src: &[u8], order: ByteOrder) -> Self {
            let mut bytes = [0u8; std::mem::size_of::<$t>()];
            bytes.copy_from_slice(&src[..Self::BYTES]);
            match order {
                ByteOrder::LittleEndian => <$t>::from_le_bytes(bytes),
                ByteOrder::BigEndian => <$t>::from_be_bytes(bytes),
            }
        }
    };
}

macro_rules! integral_element {
    ($t:ty, $u:ty, $kind:ident) => {
        impl Element for $t {
            const KIND: ElementKind = ElementKind::$kind;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MIN_VALUE: Self = <$t>::MIN;
            const MAX_VALUE: Self = <$t>::MAX;
            const BYTES: usize = std::mem::size_of::<$t>();

            #[inline(always)]
            fn from_lane<S: Element>(value: S) -> Self {
                <S as AsPrimitive<$t>>::as_(value)
            }

            #[inline(always)]
            fn to_raw_bits(self) -> u64 {
                self as $u as u64
            }

            #[inline(always)]
            fn from_raw_bits(bits: u64) -> Self {
                bits as $u as $t
            }

            byte_codec!($t);

            #[inline]
            fn unary(op: UnaryOp, a: Self) -> Self {
                match op {
                    UnaryOp::Neg => a.wrapping_neg(),
                    UnaryOp::Abs => a.wrapping_abs(),
                    UnaryOp::Not => !a,
                    UnaryOp::Zomo => {
                        if a == 0 {
                            0
                        } else {
                            -1
                        }
                    }
                    UnaryOp::BitCount => a.count_ones() as $t,
                    UnaryOp::LeadingZerosCount => a.leading_zeros() as $t,
                    UnaryOp::TrailingZerosCount => a.trailing_zeros() as $t,
                    UnaryOp::ReverseBytes => a.swap_bytes(),
                    _ => a,
                }
            }

            #[inline]
            fn binary(op: BinaryOp, a: Self, b: Self) -> Self {
                // Counts wrap modulo the lane width
                let count = b as u32;
                match op {
                    BinaryOp::Add => a.wrapping_add(b),
                    BinaryOp::Sub => a.wrapping_sub(b),
                    BinaryOp::Mul => a.wrapping_mul(b),
                    BinaryOp::Div => {
                        if b == 0 {
                            0
                        } else {
                            a.wrapping_div(b)
                        }
                    }
                    BinaryOp::Min => a.min(b),
                    BinaryOp::Max => a.max(b),
                    BinaryOp::FirstNonzero => {
                        if a != 0 {
                            a
                        } else {
                            b
                        }
                    }
                    BinaryOp::And => a & b,
                    BinaryOp::Or => a | b,
                    BinaryOp::Xor => a ^ b,
                    BinaryOp::AndNot => a & !b,
                    BinaryOp::Lshl => a.wrapping_shl(count),
                    BinaryOp::Ashr => a.wrapping_shr(count),
                    BinaryOp::Lshr => (a as $u).wrapping_shr(count) as $t,
                    BinaryOp::Rol => a.rotate_left(count % <$t>::BITS),
                    BinaryOp::Ror => a.rotate_right(count % <$t>::BITS),
                    BinaryOp::SaturatingAdd => a.saturating_add(b),
                    BinaryOp::SaturatingSub => a.saturating_sub(b),
                    BinaryOp::Pow | BinaryOp::Atan2 | BinaryOp::Hypot => a,
                }
            }

            #[inline]
            fn ternary(op: TernaryOp, a: Self, b: Self, c: Self) -> Self {
                match op {
                    TernaryOp::BitwiseBlend => (a & !c) | (b & c),
                    TernaryOp::Fma => a,
                }
            }

            #[inline]
            fn compare(op: Comparison, a: Self, b: Self) -> bool {
                let (ua, ub) = (a as $u, b as $u);
                match op {
                    Comparison::Eq => a == b,
                    Comparison::Ne => a != b,
                    Comparison::Lt => a < b,
                    Comparison::Le => a <= b,
                    Comparison::Gt => a > b,
                    Comparison::Ge => a >= b,
                    Comparison::UnsignedLt => ua < ub,
                    Comparison::UnsignedLe => ua <= ub,
                    Comparison::UnsignedGt => ua > ub,
                    Comparison::UnsignedGe => ua >= ub,
                }
            }

            #[inline]
            fn test(op: Test, a: Self) -> bool {
                match op {
                    Test::IsDefault => a == 0,
                    Test::IsNegative => a < 0,
                    Test::IsFinite | Test::IsNan | Test::IsInfinite => false,
                }
            }

            species_slots!($t);
        }
    };
}

macro_rules! floating_element {
    ($t:ty, $kind:ident, $as_lanes:ident, $from_lanes:ident) => {
        impl Element for $t {
            const KIND: ElementKind = ElementKind::$kind;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const MIN_VALUE: Self = <$t>::NEG_INFINITY;
            const MAX_VALUE: Self = <$t>::INFINITY;
            const BYTES: usize = std::mem::size_of::<$t>();

            #[inline(always)]
            fn from_lane<S: Element>(value: S) -> Self {
                <S as AsPrimitive<$t>>::as_(value)
            }

            #[inline(always)]
            fn to_raw_bits(self) -> u64 {
                <$t>::to_bits(self) as u64
            }

            #[inline(always)]
            fn from_raw_bits(bits: u64) -> Self {
                // Truncation keeps the low lane bits
                <$t>::from_bits(bits as _)
            }

            byte_codec!($t);

            #[inline]
            fn unary(op: UnaryOp, a: Self) -> Self {
                match op {
                    UnaryOp::Neg => -a,
                    UnaryOp::Abs => a.abs(),
                    UnaryOp::Sqrt => a.sqrt(),
                    UnaryOp::Cbrt => a.cbrt(),
                    UnaryOp::Exp => a.exp(),
                    UnaryOp::Expm1 => a.exp_m1(),
                    UnaryOp::Log => a.ln(),
                    UnaryOp::Log1p => a.ln_1p(),
                    UnaryOp::Log10 => a.log10(),
                    UnaryOp::Sin => a.sin(),
                    UnaryOp::Cos => a.cos(),
                    UnaryOp::Tan => a.tan(),
                    UnaryOp::Asin => a.asin(),
                    UnaryOp::Acos => a.acos(),
                    UnaryOp::Atan => a.atan(),
                    UnaryOp::Sinh => a.sinh(),
                    UnaryOp::Cosh => a.cosh(),
                    UnaryOp::Tanh => a.tanh(),
                    UnaryOp::Not
                    | UnaryOp::Zomo
                    | UnaryOp::BitCount
                    | UnaryOp::LeadingZerosCount
                    | UnaryOp::TrailingZerosCount
                    | UnaryOp::ReverseBytes => a,
                }
            }

            #[inline]
            fn binary(op: BinaryOp, a: Self, b: Self) -> Self {
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Min => {
                        if a.is_nan() {
                            a
                        } else if b.is_nan() {
                            b
                        } else if a == b {
                            if a.is_sign_negative() {
                                a
                            } else {
                                b
                            }
                        } else if a < b {
                            a
                        } else {
                            b
                        }
                    }
                    BinaryOp::Max => {
                        if a.is_nan() {
                            a
                        } else if b.is_nan() {
                            b
                        } else if a == b {
                            if a.is_sign_negative() {
                                b
                            } else {
                                a
                            }
                        } else if a > b {
                            a
                        } else {
                            b
                        }
                    }
                    BinaryOp::FirstNonzero => {
                        if <$t>::to_bits(a) != 0 {
                            a
                        } else {
                            b
                        }
                    }
                    BinaryOp::Pow => a.powf(b),
                    BinaryOp::Atan2 => a.atan2(b),
                    BinaryOp::Hypot => a.hypot(b),
                    _ => a,
                }
            }

            #[inline]
            fn ternary(op: TernaryOp, a: Self, b: Self, c: Self) -> Self {
                match op {
                    TernaryOp::Fma => a.mul_add(b, c),
                    TernaryOp::BitwiseBlend => a,
                }
            }

            #[inline]
            fn compare(op: Comparison, a: Self, b: Self) -> bool {
                match op {
                    Comparison::Eq => a == b,
                    Comparison::Ne => a != b,
                    Comparison::Lt => a < b,
                    Comparison::Le => a <= b,
                    Comparison::Gt => a > b,
                    Comparison::Ge => a >= b,
                    _ => false,
                }
            }

            #[inline]
            fn test(op: Test, a: Self) -> bool {
                match op {
                    Test::IsDefault => <$t>::to_bits(a) == 0,
                    Test::IsNegative => a.is_sign_negative(),
                    Test::IsFinite => a.is_finite(),
                    Test::IsNan => a.is_nan(),
                    Test::IsInfinite => a.is_infinite(),
                }
            }

            species_slots!($t);

            fn $as_lanes(lanes: &[Self]) -> Option<&[$t]> {
                Some(lanes)
            }

            fn $from_lanes(lanes: Vec<$t>) -> Option<Vec<Self>> {
                Some(lanes)
            }
        }
    };
}

integral_element!(i8, u8, I8);
integral_element!(i16, u16, I16);
integral_element!(i32, u32, I32);
integral_element!(i64, u64, I64);
floating_element!(f32, F32, as_f32_lanes, from_f32_lanes);
floating_element!(f64, F64, as_f64_lanes, from_f64_lanes);
