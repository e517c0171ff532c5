//! Data types carried by ports, nets, variables and expressions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The type of a value in the model.
///
/// Equality is structural: two vectors are equal when their sizes match,
/// two arrays when element type and size match, and two records when they
/// map the same field names to equal types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// A single bit.
    Bit,
    /// An unsigned vector `[size-1:0]`.
    BitVector(u32),
    /// A two's-complement signed vector `[size-1:0]`.
    SignedBitVector(u32),
    /// An unsized integer, used for indices and constant arithmetic.
    Integer,
    /// An unsized real number.
    Float,
    /// A fixed-length array of one element type.
    Array {
        /// Type of each element.
        element: Box<DataType>,
        /// Number of elements.
        size: u32,
    },
    /// A named aggregate of fields.
    Record(BTreeMap<String, DataType>),
}

impl DataType {
    /// Returns the single-bit type.
    pub fn bit() -> Self {
        DataType::Bit
    }

    /// Returns an unsigned vector type of `size` bits.
    pub fn bitvector(size: u32) -> Self {
        DataType::BitVector(size)
    }

    /// Returns a signed vector type of `size` bits.
    pub fn signed_bitvector(size: u32) -> Self {
        DataType::SignedBitVector(size)
    }

    /// Returns the integer type.
    pub fn integer() -> Self {
        DataType::Integer
    }

    /// Returns the floating-point type.
    pub fn float() -> Self {
        DataType::Float
    }

    /// Returns an array of `size` elements of type `element`.
    pub fn array(element: DataType, size: u32) -> Self {
        DataType::Array {
            element: Box::new(element),
            size,
        }
    }

    /// Returns a record type from `(field name, type)` pairs.
    pub fn record<S: Into<String>>(fields: impl IntoIterator<Item = (S, DataType)>) -> Self {
        DataType::Record(
            fields
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }

    /// Returns the element count of a size-bearing type.
    ///
    /// Vectors report their bit count and arrays their element count. All
    /// other variants return `None`.
    pub fn size(&self) -> Option<u32> {
        match self {
            DataType::BitVector(n) | DataType::SignedBitVector(n) => Some(*n),
            DataType::Array { size, .. } => Some(*size),
            _ => None,
        }
    }

    /// Returns the bit width of a packed type (`Bit` is one bit wide).
    pub fn width(&self) -> Option<u32> {
        match self {
            DataType::Bit => Some(1),
            DataType::BitVector(n) | DataType::SignedBitVector(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns `true` for [`DataType::Bit`].
    pub fn is_bit(&self) -> bool {
        matches!(self, DataType::Bit)
    }

    /// Returns `true` for signed and unsigned vectors.
    pub fn is_vector(&self) -> bool {
        matches!(self, DataType::BitVector(_) | DataType::SignedBitVector(_))
    }

    /// Returns `true` for [`DataType::SignedBitVector`].
    pub fn is_signed(&self) -> bool {
        matches!(self, DataType::SignedBitVector(_))
    }

    /// Returns `true` for types with a fixed bit width: bits and vectors.
    ///
    /// These are the only types the writers can declare and the only
    /// operand types concatenation accepts.
    pub fn is_packed(&self) -> bool {
        self.width().is_some()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bit => write!(f, "Bit"),
            DataType::BitVector(n) => write!(f, "BitVector({n})"),
            DataType::SignedBitVector(n) => write!(f, "SignedBitVector({n})"),
            DataType::Integer => write!(f, "Integer"),
            DataType::Float => write!(f, "Float"),
            DataType::Array { element, size } => write!(f, "Array({element}, {size})"),
            DataType::Record(fields) => {
                write!(f, "Record{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Number of bits needed to hold every value in `0..=max`.
///
/// Equals `ceil(log2(max + 1))`, so `bitlen(0) == 0`, `bitlen(1) == 1`
/// and `bitlen(255) == 8`.
pub fn bitlen(max: u64) -> u32 {
    u64::BITS - max.leading_zeros()
}
