//! Expression trees.
//!
//! An [`Expr`] is an owned tree. Leaves refer to ports, nets and variables of
//! the owning entity by ID and carry their declared [`DataType`], so
//! [`Expr::data_type`] never needs to consult the entity. Composite nodes own
//! their operands; reusing a net in several places is done by cloning its
//! leaf.

use crate::ids::{NetId, PortId, VarId};
use crate::types::DataType;
use hdlgen_common::{RtlError, RtlResult};
use serde::{Deserialize, Serialize};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Bitwise NOT.
    Not,
    /// Reduction AND.
    ReduceAnd,
    /// Reduction NAND.
    ReduceNand,
    /// Reduction OR.
    ReduceOr,
    /// Reduction NOR.
    ReduceNor,
    /// Reduction XOR.
    ReduceXor,
    /// Reduction XNOR.
    ReduceXnor,
    /// Arithmetic negation.
    Neg,
    /// Logical NOT.
    LogicNot,
}

impl UnaryOp {
    /// Returns `true` for the six reduction operators.
    pub fn is_reduction(self) -> bool {
        matches!(
            self,
            UnaryOp::ReduceAnd
                | UnaryOp::ReduceNand
                | UnaryOp::ReduceOr
                | UnaryOp::ReduceNor
                | UnaryOp::ReduceXor
                | UnaryOp::ReduceXnor
        )
    }
}

/// Binary operators.
///
/// There is no greater-than variant: [`Expr::make_gt`] and [`Expr::make_ge`]
/// build [`BinaryOp::Lt`] and [`BinaryOp::Le`] with swapped operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Bitwise AND.
    And,
    /// Bitwise NAND.
    Nand,
    /// Bitwise OR.
    Or,
    /// Bitwise NOR.
    Nor,
    /// Bitwise XOR.
    Xor,
    /// Bitwise XNOR.
    Xnor,
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Modulo.
    Mod,
    /// Logical shift left.
    Shl,
    /// Logical shift right.
    Shr,
    /// Equality.
    Eq,
    /// Inequality.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Logical AND.
    LogicAnd,
    /// Logical OR.
    LogicOr,
}

impl BinaryOp {
    /// Returns `true` for `==`, `!=`, `<` and `<=`.
    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le)
    }

    /// Returns `true` for logical AND and OR.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::LogicAnd | BinaryOp::LogicOr)
    }
}

/// A typed integer literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constant {
    data_type: DataType,
    value: i64,
}

impl Constant {
    /// Creates a constant of the given type.
    pub fn new(data_type: DataType, value: i64) -> Self {
        Self { data_type, value }
    }

    /// Returns the constant's type.
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Returns the integer value.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Returns bit `pos` of the two's-complement value.
    ///
    /// Positions past the 64-bit value repeat the sign bit.
    pub fn bit(&self, pos: u32) -> bool {
        if pos >= i64::BITS {
            self.value < 0
        } else {
            (self.value >> pos) & 1 == 1
        }
    }

    /// Returns the MSB-first binary digits for a packed constant.
    pub fn bit_string(&self) -> Option<String> {
        let width = self.data_type.width()?;
        Some(
            (0..width)
                .rev()
                .map(|pos| if self.bit(pos) { '1' } else { '0' })
                .collect(),
        )
    }
}

/// A reference to a storage object of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Leaf {
    /// A port.
    Port(PortId),
    /// A net.
    Net(NetId),
    /// A variable.
    Var(VarId),
}

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// A port of the owning entity.
    Port {
        /// Port ID.
        id: PortId,
        /// Declared type.
        ty: DataType,
    },
    /// A net of the owning entity.
    Net {
        /// Net ID.
        id: NetId,
        /// Declared type.
        ty: DataType,
    },
    /// A variable of the owning entity.
    Var {
        /// Variable ID.
        id: VarId,
        /// Declared type.
        ty: DataType,
    },
    /// A literal.
    Constant(Constant),
    /// A unary operation. The result has the operand's type.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// A binary operation. The result has the left operand's type.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Selection of a single bit.
    BitSelect {
        /// The selected-from expression.
        primary: Box<Expr>,
        /// Bit index.
        index: Box<Expr>,
    },
    /// Selection of a contiguous bit range `[left:right]`.
    PartSelect {
        /// The selected-from expression.
        primary: Box<Expr>,
        /// First bound as written.
        left: u32,
        /// Second bound as written.
        right: u32,
    },
    /// Concatenation, first operand most significant.
    Concat(Vec<Expr>),
    /// Concatenation repeated `count` times.
    MultiConcat {
        /// Repetition count.
        count: u32,
        /// Concatenated operands.
        operands: Vec<Expr>,
    },
}

/// An operand handed to an expression builder.
///
/// Bare integers are turned into a [`Constant`] of the sibling operand's type
/// when the node is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// An already-built expression.
    Expr(Expr),
    /// An untyped integer.
    Int(i64),
}

impl Operand {
    /// Resolves the operand, typing a bare integer as `like`.
    pub fn into_expr(self, like: &DataType) -> Expr {
        match self {
            Operand::Expr(e) => e,
            Operand::Int(v) => Expr::constant(like.clone(), v),
        }
    }
}

impl From<Expr> for Operand {
    fn from(e: Expr) -> Self {
        Operand::Expr(e)
    }
}

impl From<&Expr> for Operand {
    fn from(e: &Expr) -> Self {
        Operand::Expr(e.clone())
    }
}

macro_rules! int_operand {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(v: $t) -> Self {
                    Operand::Int(v as i64)
                }
            }
        )*
    };
}

int_operand!(i32, i64, u32, u64);

impl Expr {
    /// Returns a leaf for a port.
    pub fn port(id: PortId, ty: DataType) -> Self {
        Expr::Port { id, ty }
    }

    /// Returns a leaf for a net.
    pub fn net(id: NetId, ty: DataType) -> Self {
        Expr::Net { id, ty }
    }

    /// Returns a leaf for a variable.
    pub fn var(id: VarId, ty: DataType) -> Self {
        Expr::Var { id, ty }
    }

    /// Returns a constant of the given type.
    pub fn constant(ty: DataType, value: i64) -> Self {
        Expr::Constant(Constant::new(ty, value))
    }

    /// Returns an [`DataType::Integer`] constant.
    pub fn int(value: i64) -> Self {
        Self::constant(DataType::Integer, value)
    }

    /// Returns the type of the value this expression produces.
    pub fn data_type(&self) -> DataType {
        match self {
            Expr::Port { ty, .. } | Expr::Net { ty, .. } | Expr::Var { ty, .. } => ty.clone(),
            Expr::Constant(c) => c.data_type().clone(),
            Expr::Unary { operand, .. } => operand.data_type(),
            Expr::Binary { lhs, .. } => lhs.data_type(),
            Expr::BitSelect { .. } => DataType::Bit,
            Expr::PartSelect { left, right, .. } => DataType::BitVector(left.abs_diff(*right) + 1),
            Expr::Concat(operands) => DataType::BitVector(packed_width(operands)),
            Expr::MultiConcat { count, operands } => {
                DataType::BitVector(count.saturating_mul(packed_width(operands)))
            }
        }
    }

    /// Returns the storage object a leaf refers to.
    pub fn as_leaf(&self) -> Option<Leaf> {
        match self {
            Expr::Port { id, .. } => Some(Leaf::Port(*id)),
            Expr::Net { id, .. } => Some(Leaf::Net(*id)),
            Expr::Var { id, .. } => Some(Leaf::Var(*id)),
            _ => None,
        }
    }

    /// Returns `true` for port, net and variable leaves.
    pub fn is_leaf(&self) -> bool {
        self.as_leaf().is_some()
    }

    /// Returns the literal if this is a constant.
    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Expr::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// Types `value` like this expression.
    pub fn coerce(&self, value: impl Into<Operand>) -> Expr {
        let value: Operand = value.into();
        value.into_expr(&self.data_type())
    }

    /// Builds a unary node.
    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Builds a binary node, coercing a bare integer `rhs` to `lhs`'s type.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: impl Into<Operand>) -> Expr {
        let rhs = lhs.coerce(rhs);
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Builds `a == b`.
    pub fn make_eq(a: Expr, b: impl Into<Operand>) -> Expr {
        Self::binary(BinaryOp::Eq, a, b)
    }

    /// Builds `a != b`.
    pub fn make_ne(a: Expr, b: impl Into<Operand>) -> Expr {
        Self::binary(BinaryOp::Ne, a, b)
    }

    /// Builds `a < b`.
    pub fn make_lt(a: Expr, b: impl Into<Operand>) -> Expr {
        Self::binary(BinaryOp::Lt, a, b)
    }

    /// Builds `a <= b`.
    pub fn make_le(a: Expr, b: impl Into<Operand>) -> Expr {
        Self::binary(BinaryOp::Le, a, b)
    }

    /// Builds `a > b` as `b < a`.
    pub fn make_gt(a: Expr, b: impl Into<Operand>) -> Expr {
        let b = a.coerce(b);
        Self::binary(BinaryOp::Lt, b, a)
    }

    /// Builds `a >= b` as `b <= a`.
    pub fn make_ge(a: Expr, b: impl Into<Operand>) -> Expr {
        let b = a.coerce(b);
        Self::binary(BinaryOp::Le, b, a)
    }

    /// `self == other`
    pub fn equal(&self, other: impl Into<Operand>) -> Expr {
        Self::make_eq(self.clone(), other)
    }

    /// `self != other`
    pub fn not_equal(&self, other: impl Into<Operand>) -> Expr {
        Self::make_ne(self.clone(), other)
    }

    /// `self < other`
    pub fn less(&self, other: impl Into<Operand>) -> Expr {
        Self::make_lt(self.clone(), other)
    }

    /// `self <= other`
    pub fn less_equal(&self, other: impl Into<Operand>) -> Expr {
        Self::make_le(self.clone(), other)
    }

    /// `self > other`
    pub fn greater(&self, other: impl Into<Operand>) -> Expr {
        Self::make_gt(self.clone(), other)
    }

    /// `self >= other`
    pub fn greater_equal(&self, other: impl Into<Operand>) -> Expr {
        Self::make_ge(self.clone(), other)
    }

    /// `self && other`
    pub fn logic_and(&self, other: impl Into<Operand>) -> Expr {
        Self::binary(BinaryOp::LogicAnd, self.clone(), other)
    }

    /// `self || other`
    pub fn logic_or(&self, other: impl Into<Operand>) -> Expr {
        Self::binary(BinaryOp::LogicOr, self.clone(), other)
    }

    /// `!self`
    pub fn logic_not(&self) -> Expr {
        Self::unary(UnaryOp::LogicNot, self.clone())
    }

    /// `~(self & other)`
    pub fn nand(&self, other: impl Into<Operand>) -> Expr {
        Self::binary(BinaryOp::Nand, self.clone(), other)
    }

    /// `~(self | other)`
    pub fn nor(&self, other: impl Into<Operand>) -> Expr {
        Self::binary(BinaryOp::Nor, self.clone(), other)
    }

    /// `~(self ^ other)`
    pub fn xnor(&self, other: impl Into<Operand>) -> Expr {
        Self::binary(BinaryOp::Xnor, self.clone(), other)
    }

    /// Reduction AND over all bits.
    pub fn reduce_and(&self) -> Expr {
        Self::unary(UnaryOp::ReduceAnd, self.clone())
    }

    /// Reduction NAND over all bits.
    pub fn reduce_nand(&self) -> Expr {
        Self::unary(UnaryOp::ReduceNand, self.clone())
    }

    /// Reduction OR over all bits.
    pub fn reduce_or(&self) -> Expr {
        Self::unary(UnaryOp::ReduceOr, self.clone())
    }

    /// Reduction NOR over all bits.
    pub fn reduce_nor(&self) -> Expr {
        Self::unary(UnaryOp::ReduceNor, self.clone())
    }

    /// Reduction XOR over all bits.
    pub fn reduce_xor(&self) -> Expr {
        Self::unary(UnaryOp::ReduceXor, self.clone())
    }

    /// Reduction XNOR over all bits.
    pub fn reduce_xnor(&self) -> Expr {
        Self::unary(UnaryOp::ReduceXnor, self.clone())
    }

    /// Returns the operator of a unary node.
    pub fn unary_op(&self) -> Option<UnaryOp> {
        match self {
            Expr::Unary { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Returns the operator of a binary node.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            Expr::Binary { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Returns the first operand of an operator node.
    pub fn operand1(&self) -> Option<&Expr> {
        match self {
            Expr::Unary { operand, .. } => Some(operand),
            Expr::Binary { lhs, .. } => Some(lhs),
            _ => None,
        }
    }

    /// Returns the second operand of a binary node.
    pub fn operand2(&self) -> Option<&Expr> {
        match self {
            Expr::Binary { rhs, .. } => Some(rhs),
            _ => None,
        }
    }

    /// Selects one bit of a vector.
    ///
    /// A bare integer index becomes an [`DataType::Integer`] constant. A
    /// constant index outside the vector is rejected.
    pub fn bit_select(&self, index: impl Into<Operand>) -> RtlResult<Expr> {
        let width = vector_width(self, "bit select")?;
        let index: Operand = index.into();
        let index = index.into_expr(&DataType::Integer);
        if let Some(c) = index.as_constant() {
            if c.value() < 0 || c.value() >= i64::from(width) {
                return Err(RtlError::structural(format!(
                    "bit select index {} is outside a {width}-bit vector",
                    c.value()
                )));
            }
        }
        Ok(Expr::BitSelect {
            primary: Box::new(self.clone()),
            index: Box::new(index),
        })
    }

    /// Selects the bit range `[left:right]` of a vector.
    ///
    /// `left > right` is a descending range, `left < right` ascending.
    pub fn part_select(&self, left: u32, right: u32) -> RtlResult<Expr> {
        let width = vector_width(self, "part select")?;
        if left.max(right) >= width {
            return Err(RtlError::structural(format!(
                "part select [{left}:{right}] is outside a {width}-bit vector"
            )));
        }
        Ok(Expr::PartSelect {
            primary: Box::new(self.clone()),
            left,
            right,
        })
    }

    /// Concatenates packed operands, first operand most significant.
    pub fn concat(operands: Vec<Expr>) -> RtlResult<Expr> {
        check_packed(&operands, "concatenation")?;
        checked_width(&operands, 1, "concatenation")?;
        Ok(Expr::Concat(operands))
    }

    /// Concatenates packed operands and repeats the result `count` times.
    pub fn multi_concat(count: u32, operands: Vec<Expr>) -> RtlResult<Expr> {
        if count == 0 {
            return Err(RtlError::structural("repeat count must be at least 1"));
        }
        check_packed(&operands, "repeat concatenation")?;
        checked_width(&operands, count, "repeat concatenation")?;
        Ok(Expr::MultiConcat { count, operands })
    }

    /// Widens to `width` bits by padding zeros above the value.
    ///
    /// Returns the expression unchanged when it already has that width.
    pub fn zero_extend(&self, width: u32) -> RtlResult<Expr> {
        let src = self.extension_source(width)?;
        if src == width {
            return Ok(self.clone());
        }
        let pad = Expr::constant(DataType::BitVector(width - src), 0);
        Expr::concat(vec![pad, self.clone()])
    }

    /// Widens to `width` bits by replicating the most significant bit.
    ///
    /// Returns the expression unchanged when it already has that width.
    pub fn sign_extend(&self, width: u32) -> RtlResult<Expr> {
        let src = self.extension_source(width)?;
        if src == width {
            return Ok(self.clone());
        }
        let msb = if self.data_type().is_vector() {
            self.bit_select(src - 1)?
        } else {
            self.clone()
        };
        let pad = Expr::multi_concat(width - src, vec![msb])?;
        Expr::concat(vec![pad, self.clone()])
    }

    fn extension_source(&self, width: u32) -> RtlResult<u32> {
        let ty = self.data_type();
        let src = ty.width().ok_or_else(|| {
            RtlError::structural(format!("cannot extend a value of type {ty}"))
        })?;
        if src == 0 {
            return Err(RtlError::structural("cannot extend a zero-width value"));
        }
        if width < src {
            return Err(RtlError::structural(format!(
                "cannot extend a {src}-bit value to {width} bits"
            )));
        }
        Ok(src)
    }

    /// Calls `f` for every leaf in the tree, in rendering order.
    pub fn for_each_leaf(&self, f: &mut dyn FnMut(Leaf)) {
        match self {
            Expr::Port { .. } | Expr::Net { .. } | Expr::Var { .. } => {
                if let Some(leaf) = self.as_leaf() {
                    f(leaf);
                }
            }
            Expr::Constant(_) => {}
            Expr::Unary { operand, .. } => operand.for_each_leaf(f),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.for_each_leaf(f);
                rhs.for_each_leaf(f);
            }
            Expr::BitSelect { primary, index } => {
                primary.for_each_leaf(f);
                index.for_each_leaf(f);
            }
            Expr::PartSelect { primary, .. } => primary.for_each_leaf(f),
            Expr::Concat(operands) | Expr::MultiConcat { operands, .. } => {
                for e in operands {
                    e.for_each_leaf(f);
                }
            }
        }
    }
}

fn packed_width(operands: &[Expr]) -> u32 {
    operands
        .iter()
        .filter_map(|e| e.data_type().width())
        .fold(0, u32::saturating_add)
}

fn checked_width(operands: &[Expr], count: u32, what: &str) -> RtlResult<u32> {
    operands
        .iter()
        .filter_map(|e| e.data_type().width())
        .try_fold(0u32, u32::checked_add)
        .and_then(|w| w.checked_mul(count))
        .ok_or_else(|| RtlError::structural(format!("{what} is wider than {} bits", u32::MAX)))
}

fn vector_width(primary: &Expr, what: &str) -> RtlResult<u32> {
    match primary.data_type() {
        DataType::BitVector(n) | DataType::SignedBitVector(n) => Ok(n),
        other => Err(RtlError::structural(format!(
            "{what} needs a vector operand, found {other}"
        ))),
    }
}

fn check_packed(operands: &[Expr], what: &str) -> RtlResult<()> {
    if operands.is_empty() {
        return Err(RtlError::structural(format!("{what} needs at least one operand")));
    }
    for e in operands {
        let ty = e.data_type();
        if !ty.is_packed() {
            return Err(RtlError::structural(format!(
                "{what} operand of type {ty} is not a vector"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(id: u32, ty: DataType) -> Expr {
        Expr::net(NetId::from_raw(id), ty)
    }

    #[test]
    fn constant_bits_msb_first() {
        let c = Constant::new(DataType::BitVector(4), 5);
        assert_eq!(c.bit_string().as_deref(), Some("0101"));
        let neg = Constant::new(DataType::SignedBitVector(4), -1);
        assert_eq!(neg.bit_string().as_deref(), Some("1111"));
        assert_eq!(Constant::new(DataType::Integer, 3).bit_string(), None);
    }

    #[test]
    fn constant_bits_past_64_use_sign() {
        let pos = Constant::new(DataType::BitVector(70), 1);
        let neg = Constant::new(DataType::BitVector(70), -2);
        assert!(!pos.bit(69));
        assert!(neg.bit(69));
        assert!(neg.bit(63));
        assert!(!neg.bit(0));
    }

    #[test]
    fn binary_coerces_int_to_lhs_type() {
        let a = net(0, DataType::BitVector(8));
        let sum = Expr::binary(BinaryOp::Add, a.clone(), 1);
        assert_eq!(sum.data_type(), DataType::BitVector(8));
        assert_eq!(
            sum.operand2(),
            Some(&Expr::constant(DataType::BitVector(8), 1))
        );
    }

    #[test]
    fn gt_swaps_operands_into_lt() {
        let a = net(0, DataType::BitVector(4));
        let b = net(1, DataType::BitVector(4));
        let gt = Expr::make_gt(a.clone(), b.clone());
        let lt = Expr::make_lt(b.clone(), a.clone());
        assert_eq!(gt, lt);
        assert_eq!(gt.binary_op(), Some(BinaryOp::Lt));
        assert_eq!(gt.operand1(), Some(&b));
        assert_eq!(gt.operand2(), Some(&a));
    }

    #[test]
    fn ge_swaps_operands_into_le() {
        let a = net(0, DataType::BitVector(4));
        let ge = a.greater_equal(3);
        assert_eq!(ge.binary_op(), Some(BinaryOp::Le));
        assert_eq!(
            ge.operand1(),
            Some(&Expr::constant(DataType::BitVector(4), 3))
        );
        assert_eq!(ge.operand2(), Some(&a));
    }

    #[test]
    fn unary_keeps_operand_type() {
        let a = net(0, DataType::SignedBitVector(6));
        assert_eq!(a.reduce_xor().data_type(), DataType::SignedBitVector(6));
        assert_eq!(a.reduce_xor().unary_op(), Some(UnaryOp::ReduceXor));
        assert!(UnaryOp::ReduceNor.is_reduction());
        assert!(!UnaryOp::Neg.is_reduction());
    }

    #[test]
    fn select_types() {
        let v = net(0, DataType::BitVector(8));
        assert_eq!(v.bit_select(3).unwrap().data_type(), DataType::Bit);
        assert_eq!(
            v.part_select(7, 4).unwrap().data_type(),
            DataType::BitVector(4)
        );
        assert_eq!(
            v.part_select(2, 5).unwrap().data_type(),
            DataType::BitVector(4)
        );
    }

    #[test]
    fn select_out_of_range_is_structural() {
        let v = net(0, DataType::BitVector(8));
        assert!(matches!(
            v.bit_select(8),
            Err(RtlError::StructuralViolation(_))
        ));
        assert!(matches!(
            v.part_select(8, 0),
            Err(RtlError::StructuralViolation(_))
        ));
        let b = net(1, DataType::Bit);
        assert!(b.bit_select(0).is_err());
    }

    #[test]
    fn concat_widths_add_up() {
        let a = net(0, DataType::BitVector(3));
        let b = net(1, DataType::Bit);
        let c = Expr::concat(vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(c.data_type(), DataType::BitVector(4));
        let m = Expr::multi_concat(3, vec![a, b]).unwrap();
        assert_eq!(m.data_type(), DataType::BitVector(12));
    }

    #[test]
    fn concat_rejects_non_vector() {
        let a = net(0, DataType::BitVector(3));
        let i = Expr::int(4);
        assert!(matches!(
            Expr::concat(vec![a, i]),
            Err(RtlError::StructuralViolation(_))
        ));
        assert!(Expr::concat(vec![]).is_err());
        assert!(Expr::multi_concat(0, vec![net(1, DataType::Bit)]).is_err());
    }

    #[test]
    fn oversized_concat_is_rejected() {
        let wide = net(0, DataType::BitVector(u32::MAX / 2 + 1));
        assert!(matches!(
            Expr::multi_concat(2, vec![wide.clone()]),
            Err(RtlError::StructuralViolation(_))
        ));
        assert!(matches!(
            Expr::concat(vec![wide.clone(), wide]),
            Err(RtlError::StructuralViolation(_))
        ));
        let ok = Expr::multi_concat(u32::MAX, vec![net(1, DataType::Bit)]).unwrap();
        assert_eq!(ok.data_type(), DataType::BitVector(u32::MAX));
    }

    #[test]
    fn zero_width_value_cannot_be_extended() {
        let empty = net(0, DataType::BitVector(0));
        assert!(matches!(
            empty.sign_extend(4),
            Err(RtlError::StructuralViolation(_))
        ));
        assert!(empty.zero_extend(4).is_err());
    }

    #[test]
    fn extension_to_same_width_is_identity() {
        let a = net(0, DataType::BitVector(8));
        assert_eq!(a.zero_extend(8).unwrap(), a);
        assert_eq!(a.sign_extend(8).unwrap(), a);
    }

    #[test]
    fn zero_extension_pads_zero_vector() {
        let a = net(0, DataType::BitVector(4));
        let z = a.zero_extend(6).unwrap();
        assert_eq!(z.data_type(), DataType::BitVector(6));
        assert_eq!(
            z,
            Expr::Concat(vec![Expr::constant(DataType::BitVector(2), 0), a])
        );
    }

    #[test]
    fn sign_extension_replicates_msb() {
        let a = net(0, DataType::SignedBitVector(4));
        let s = a.sign_extend(7).unwrap();
        assert_eq!(s.data_type(), DataType::BitVector(7));
        let msb = a.bit_select(3).unwrap();
        assert_eq!(
            s,
            Expr::Concat(vec![
                Expr::MultiConcat {
                    count: 3,
                    operands: vec![msb]
                },
                a
            ])
        );
    }

    #[test]
    fn narrowing_extension_is_rejected() {
        let a = net(0, DataType::BitVector(8));
        assert!(matches!(
            a.zero_extend(4),
            Err(RtlError::StructuralViolation(_))
        ));
        assert!(Expr::int(1).sign_extend(4).is_err());
    }

    #[test]
    fn leaves_in_order() {
        let a = net(0, DataType::BitVector(4));
        let b = Expr::port(PortId::from_raw(2), DataType::BitVector(4));
        let e = Expr::binary(BinaryOp::And, a, b).logic_not();
        let mut seen = Vec::new();
        e.for_each_leaf(&mut |l| seen.push(l));
        assert_eq!(
            seen,
            vec![Leaf::Net(NetId::from_raw(0)), Leaf::Port(PortId::from_raw(2))]
        );
    }

    #[test]
    fn operand_from_unsigned_keeps_bit_pattern() {
        assert_eq!(Operand::from(u64::MAX), Operand::Int(-1));
        assert_eq!(Operand::from(7u32), Operand::Int(7));
    }
}
