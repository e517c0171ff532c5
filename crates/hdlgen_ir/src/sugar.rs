//! Operator overloads for building expressions.
//!
//! `a + 1`, `&a & &b`, `!a` and friends build the same nodes as
//! [`Expr::binary`] and [`Expr::unary`]. Comparisons and logical operators
//! have no overloadable Rust operator and are methods on [`Expr`] instead.

use crate::expr::{BinaryOp, Expr, Operand, UnaryOp};
use std::ops;

macro_rules! binary_sugar {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl<T: Into<Operand>> ops::$trait<T> for Expr {
                type Output = Expr;

                fn $method(self, rhs: T) -> Expr {
                    Expr::binary(BinaryOp::$op, self, rhs)
                }
            }

            impl<T: Into<Operand>> ops::$trait<T> for &Expr {
                type Output = Expr;

                fn $method(self, rhs: T) -> Expr {
                    Expr::binary(BinaryOp::$op, self.clone(), rhs)
                }
            }
        )*
    };
}

binary_sugar! {
    BitAnd::bitand => And,
    BitOr::bitor => Or,
    BitXor::bitxor => Xor,
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    Rem::rem => Mod,
    Shl::shl => Shl,
    Shr::shr => Shr,
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::unary(UnaryOp::Not, self)
    }
}

impl ops::Not for &Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::unary(UnaryOp::Not, self.clone())
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self)
    }
}

impl ops::Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::{BinaryOp, Expr, UnaryOp};
    use crate::ids::NetId;
    use crate::types::DataType;

    fn vec8(id: u32) -> Expr {
        Expr::net(NetId::from_raw(id), DataType::BitVector(8))
    }

    #[test]
    fn add_with_int_coerces() {
        let a = vec8(0);
        let e = &a + 1;
        assert_eq!(e.binary_op(), Some(BinaryOp::Add));
        assert_eq!(
            e.operand2(),
            Some(&Expr::constant(DataType::BitVector(8), 1))
        );
    }

    #[test]
    fn bitwise_between_exprs() {
        let a = vec8(0);
        let b = vec8(1);
        assert_eq!((&a & &b).binary_op(), Some(BinaryOp::And));
        assert_eq!((&a | &b).binary_op(), Some(BinaryOp::Or));
        assert_eq!((a.clone() ^ b.clone()).binary_op(), Some(BinaryOp::Xor));
        assert_eq!((a % 3).binary_op(), Some(BinaryOp::Mod));
    }

    #[test]
    fn shifts_and_arith() {
        let a = vec8(0);
        assert_eq!((&a << 2).binary_op(), Some(BinaryOp::Shl));
        assert_eq!((&a >> 2).binary_op(), Some(BinaryOp::Shr));
        assert_eq!((&a - 1).binary_op(), Some(BinaryOp::Sub));
        assert_eq!((&a * 2).binary_op(), Some(BinaryOp::Mul));
        assert_eq!((&a / 2).binary_op(), Some(BinaryOp::Div));
    }

    #[test]
    fn unary_sugar() {
        let a = vec8(0);
        assert_eq!((!&a).unary_op(), Some(UnaryOp::Not));
        assert_eq!((-a).unary_op(), Some(UnaryOp::Neg));
    }
}
