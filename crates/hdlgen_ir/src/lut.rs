//! Lookup tables rendered as case statements.

use crate::expr::{Constant, Expr, Operand};
use hdlgen_common::{RtlError, RtlResult};
use serde::{Deserialize, Serialize};

/// A LUT item: one input net, one register output and a table of
/// `(input value, output value)` rows.
///
/// Inputs not listed in the table fall through to a default arm that
/// assigns nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lut {
    input: Expr,
    output: Expr,
    rows: Vec<(Constant, Constant)>,
}

impl Lut {
    pub(crate) fn new(input: Expr, output: Expr) -> Self {
        Self {
            input,
            output,
            rows: Vec::new(),
        }
    }

    /// The input net.
    pub fn input(&self) -> &Expr {
        &self.input
    }

    /// The output net.
    pub fn output(&self) -> &Expr {
        &self.output
    }

    /// The table rows in insertion order.
    pub fn rows(&self) -> &[(Constant, Constant)] {
        &self.rows
    }

    /// Adds a row. Bare integers take the input and output types.
    ///
    /// Constants of any other type are rejected with
    /// [`RtlError::TypeMismatch`].
    pub fn add_data(
        &mut self,
        input: impl Into<Operand>,
        output: impl Into<Operand>,
    ) -> RtlResult<()> {
        let key = row_constant(&self.input, input)?;
        let value = row_constant(&self.output, output)?;
        self.rows.push((key, value));
        Ok(())
    }
}

fn row_constant(like: &Expr, value: impl Into<Operand>) -> RtlResult<Constant> {
    let expected = like.data_type();
    match like.coerce(value) {
        Expr::Constant(c) if *c.data_type() == expected => Ok(c),
        Expr::Constant(c) => Err(RtlError::mismatch(&expected, c.data_type())),
        other => Err(RtlError::structural(format!(
            "lookup table entries must be constants, found an expression of type {}",
            other.data_type()
        ))),
    }
}
