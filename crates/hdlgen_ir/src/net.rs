//! Nets and variables.

use crate::expr::Expr;
use crate::ids::BlockId;
use crate::namespace::Scope;
use crate::types::DataType;
use serde::{Deserialize, Serialize};

/// A signal inside an entity.
///
/// Register nets are assigned from processes and render as `reg` in
/// Verilog; all other nets are driven by continuous assignments or instance
/// outputs and render as `wire`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    pub(crate) name: Option<String>,
    /// Declared type.
    pub data_type: DataType,
    /// Storage flag.
    pub reg: bool,
    /// Namespace the net is declared in.
    pub scope: Scope,
}

impl Net {
    /// Returns the net name, `None` until anonymous names are resolved.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Process-local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub(crate) name: Option<String>,
    /// Declared type.
    pub data_type: DataType,
    /// Namespace the variable is declared in.
    pub scope: Scope,
}

impl Variable {
    /// Returns the variable name, `None` until anonymous names are resolved.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Parameters for [`Entity::add_net`](crate::Entity::add_net).
///
/// Without an explicit type the net takes the source's type, or `Bit`
/// when there is no source either.
///
/// ```
/// use hdlgen_ir::{DataType, NetDecl};
///
/// let decl = NetDecl::named("count").data_type(DataType::bitvector(8)).reg();
/// assert_eq!(decl.name(), Some("count"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetDecl {
    pub(crate) name: Option<String>,
    pub(crate) data_type: Option<DataType>,
    pub(crate) reg: bool,
    pub(crate) src: Option<Expr>,
    pub(crate) scope: Scope,
}

impl NetDecl {
    /// An anonymous wire of default type.
    pub fn new() -> Self {
        Self::default()
    }

    /// A named wire of default type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the type.
    pub fn data_type(mut self, ty: DataType) -> Self {
        self.data_type = Some(ty);
        self
    }

    /// Marks the net as a register.
    pub fn reg(mut self) -> Self {
        self.reg = true;
        self
    }

    /// Drives the net from `src` with a continuous assignment.
    pub fn src(mut self, src: Expr) -> Self {
        self.src = Some(src);
        self
    }

    /// Declares the net inside a named block.
    pub fn in_block(mut self, block: BlockId) -> Self {
        self.scope = Scope::Block(block);
        self
    }

    /// Returns the requested name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
