//! Expression rendering for the Verilog and VHDL backends.
//!
//! Rendering is side-effect free: names come from the owning [`Entity`],
//! which must have had its anonymous names resolved. Both backends
//! parenthesize every binary operation and every unary operation whose
//! operand is not a port, net or variable.

use hdlgen_common::{RtlError, RtlResult};
use hdlgen_ir::{BinaryOp, Constant, DataType, Entity, Expr, Leaf, UnaryOp};

/// Renders an expression in either backend's syntax.
pub trait ExprRender {
    /// Verilog text of the expression.
    fn verilog_str(&self, entity: &Entity) -> RtlResult<String>;

    /// VHDL text of the expression.
    fn vhdl_str(&self, entity: &Entity) -> RtlResult<String>;

    /// VHDL text of the expression used as an `if` condition.
    ///
    /// Comparisons are already boolean. Logical operators recurse. Any other
    /// bit is compared with `'1'` and any other vector with all zeros.
    fn vhdl_cond_str(&self, entity: &Entity) -> RtlResult<String>;
}

impl ExprRender for Expr {
    fn verilog_str(&self, entity: &Entity) -> RtlResult<String> {
        Ok(match self {
            Expr::Port { .. } | Expr::Net { .. } | Expr::Var { .. } => {
                leaf_name(entity, self)?.to_string()
            }
            Expr::Constant(c) => verilog_constant(c)?,
            Expr::Unary { op, operand } => {
                let inner = operand.verilog_str(entity)?;
                let op = verilog_unary(*op);
                if operand.is_leaf() {
                    format!("{op}{inner}")
                } else {
                    format!("({op}{inner})")
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let a = lhs.verilog_str(entity)?;
                let b = rhs.verilog_str(entity)?;
                match op {
                    BinaryOp::Nand => format!("(~({a} & {b}))"),
                    BinaryOp::Nor => format!("(~({a} | {b}))"),
                    _ => format!("({a} {} {b})", verilog_binary(*op)),
                }
            }
            Expr::BitSelect { primary, index } => {
                format!(
                    "{}[{}]",
                    primary.verilog_str(entity)?,
                    index.verilog_str(entity)?
                )
            }
            Expr::PartSelect {
                primary,
                left,
                right,
            } => format!("{}[{left}:{right}]", primary.verilog_str(entity)?),
            Expr::Concat(operands) => format!("{{{}}}", verilog_list(operands, entity)?),
            Expr::MultiConcat { count, operands } => {
                format!("{{{count}{{{}}}}}", verilog_list(operands, entity)?)
            }
        })
    }

    fn vhdl_str(&self, entity: &Entity) -> RtlResult<String> {
        Ok(match self {
            Expr::Port { .. } | Expr::Net { .. } | Expr::Var { .. } => {
                leaf_name(entity, self)?.to_string()
            }
            Expr::Constant(c) => vhdl_constant(c)?,
            Expr::Unary { op, operand } => {
                let inner = operand.vhdl_str(entity)?;
                let op = vhdl_unary(*op);
                let sep = if op == "-" { "" } else { " " };
                if operand.is_leaf() {
                    format!("{op}{sep}{inner}")
                } else {
                    format!("({op}{sep}{inner})")
                }
            }
            Expr::Binary { op, lhs, rhs } => format!(
                "({} {} {})",
                lhs.vhdl_str(entity)?,
                vhdl_binary(*op),
                rhs.vhdl_str(entity)?
            ),
            Expr::BitSelect { primary, index } => format!(
                "{}({})",
                primary.vhdl_str(entity)?,
                index.vhdl_str(entity)?
            ),
            Expr::PartSelect {
                primary,
                left,
                right,
            } => {
                let dir = if left >= right { "downto" } else { "to" };
                format!("{}({left} {dir} {right})", primary.vhdl_str(entity)?)
            }
            Expr::Concat(operands) => vhdl_concat(operands.iter(), entity)?,
            Expr::MultiConcat { count, operands } => {
                let repeated = (0..*count).flat_map(|_| operands.iter());
                vhdl_concat(repeated, entity)?
            }
        })
    }

    fn vhdl_cond_str(&self, entity: &Entity) -> RtlResult<String> {
        vhdl_cond(self, entity, false)
    }
}

// `not` binds tighter than `=`, so a comparison under it is parenthesized.
fn vhdl_cond(expr: &Expr, entity: &Entity, under_not: bool) -> RtlResult<String> {
    match expr {
        Expr::Binary { op, .. } if op.is_comparison() => expr.vhdl_str(entity),
        Expr::Binary {
            op: op @ (BinaryOp::LogicAnd | BinaryOp::LogicOr),
            lhs,
            rhs,
        } => Ok(format!(
            "({} {} {})",
            vhdl_cond(lhs, entity, false)?,
            vhdl_binary(*op),
            vhdl_cond(rhs, entity, false)?
        )),
        Expr::Unary {
            op: UnaryOp::LogicNot,
            operand,
        } => Ok(format!("(not {})", vhdl_cond(operand, entity, true)?)),
        _ => {
            let value = expr.vhdl_str(entity)?;
            let ty = match expr {
                Expr::Unary { op, .. } if op.is_reduction() => DataType::Bit,
                _ => expr.data_type(),
            };
            let cond = match ty {
                DataType::Bit => format!("{value} = '1'"),
                DataType::BitVector(n) | DataType::SignedBitVector(n) => {
                    format!("{value} /= \"{}\"", "0".repeat(n as usize))
                }
                _ => format!("{value} /= 0"),
            };
            Ok(if under_not { format!("({cond})") } else { cond })
        }
    }
}

/// Returns the resolved name of a port, net or variable expression.
pub fn leaf_name<'e>(entity: &'e Entity, expr: &Expr) -> RtlResult<&'e str> {
    let leaf = expr
        .as_leaf()
        .ok_or_else(|| RtlError::structural("expected a port, net or variable"))?;
    entity.leaf_name(leaf).ok_or_else(|| {
        let (kind, index) = match leaf {
            Leaf::Port(id) => ("port", id.as_raw()),
            Leaf::Net(id) => ("net", id.as_raw()),
            Leaf::Var(id) => ("variable", id.as_raw()),
        };
        RtlError::config(format!(
            "{kind} #{index} of entity '{}' has no name",
            entity.name()
        ))
    })
}

fn verilog_list(operands: &[Expr], entity: &Entity) -> RtlResult<String> {
    let parts = operands
        .iter()
        .map(|e| e.verilog_str(entity))
        .collect::<RtlResult<Vec<_>>>()?;
    Ok(parts.join(", "))
}

fn vhdl_concat<'a>(
    operands: impl Iterator<Item = &'a Expr>,
    entity: &Entity,
) -> RtlResult<String> {
    let parts = operands
        .map(|e| e.vhdl_str(entity))
        .collect::<RtlResult<Vec<_>>>()?;
    Ok(format!("({})", parts.join(" & ")))
}

fn verilog_constant(c: &Constant) -> RtlResult<String> {
    match c.data_type() {
        DataType::Bit => Ok(format!("1'b{}", u8::from(c.bit(0)))),
        DataType::BitVector(n) => Ok(format!("{n}'b{}", bits(c))),
        DataType::SignedBitVector(n) => Ok(format!("{n}'sb{}", bits(c))),
        DataType::Integer | DataType::Float => Ok(c.value().to_string()),
        other => Err(unsupported_constant(other)),
    }
}

fn vhdl_constant(c: &Constant) -> RtlResult<String> {
    match c.data_type() {
        DataType::Bit => Ok(format!("'{}'", u8::from(c.bit(0)))),
        DataType::BitVector(_) | DataType::SignedBitVector(_) => {
            Ok(format!("\"{}\"", bits(c)))
        }
        DataType::Integer => Ok(c.value().to_string()),
        DataType::Float => Ok(format!("{}.0", c.value())),
        other => Err(unsupported_constant(other)),
    }
}

fn bits(c: &Constant) -> String {
    c.bit_string().unwrap_or_default()
}

fn unsupported_constant(ty: &DataType) -> RtlError {
    RtlError::config(format!("constants of type {ty} cannot be rendered"))
}

fn verilog_unary(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "~",
        UnaryOp::ReduceAnd => "&",
        UnaryOp::ReduceNand => "~&",
        UnaryOp::ReduceOr => "|",
        UnaryOp::ReduceNor => "~|",
        UnaryOp::ReduceXor => "^",
        UnaryOp::ReduceXnor => "~^",
        UnaryOp::Neg => "-",
        UnaryOp::LogicNot => "!",
    }
}

fn verilog_binary(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::And => "&",
        BinaryOp::Nand => "~&",
        BinaryOp::Or => "|",
        BinaryOp::Nor => "~|",
        BinaryOp::Xor => "^",
        BinaryOp::Xnor => "~^",
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::LogicAnd => "&&",
        BinaryOp::LogicOr => "||",
    }
}

fn vhdl_unary(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not | UnaryOp::LogicNot => "not",
        UnaryOp::ReduceAnd => "and",
        UnaryOp::ReduceNand => "nand",
        UnaryOp::ReduceOr => "or",
        UnaryOp::ReduceNor => "nor",
        UnaryOp::ReduceXor => "xor",
        UnaryOp::ReduceXnor => "xnor",
        UnaryOp::Neg => "-",
    }
}

fn vhdl_binary(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::And | BinaryOp::LogicAnd => "and",
        BinaryOp::Nand => "nand",
        BinaryOp::Or | BinaryOp::LogicOr => "or",
        BinaryOp::Nor => "nor",
        BinaryOp::Xor => "xor",
        BinaryOp::Xnor => "xnor",
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "mod",
        BinaryOp::Shl => "sll",
        BinaryOp::Shr => "srl",
        BinaryOp::Eq => "=",
        BinaryOp::Ne => "/=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
    }
}
