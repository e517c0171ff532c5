//! In-memory hardware model for the hdlgen code generator.
//!
//! Host code builds a design through the [`EntityManager`]: entities with
//! ports, nets, variables, processes, instances and lookup tables, wired
//! together with [`Expr`] trees. The model is backend neutral; the
//! `hdlgen_writer` crate renders it as Verilog or VHDL.
//!
//! Entities, ports and every other named object live in ID-indexed
//! [`Arena`]s. Expressions refer to storage by ID and carry their
//! [`DataType`] so that type queries never need the owning entity.

#![warn(missing_docs)]

pub mod arena;
pub mod components;
pub mod entity;
pub mod expr;
pub mod ids;
pub mod instance;
pub mod lut;
pub mod manager;
pub mod namespace;
pub mod net;
pub mod port;
pub mod process;
pub mod stmt;
pub mod sugar;
pub mod types;
pub mod usage;

pub use arena::{Arena, ArenaId};
pub use components::{Dff, DffDecl, LinearFsm};
pub use entity::{ContinuousAssign, Entity, Item, ItemKind, NamedBlock};
pub use expr::{BinaryOp, Constant, Expr, Leaf, Operand, UnaryOp};
pub use hdlgen_common::{Polarity, RtlError, RtlResult};
pub use ids::{BlockId, EntityId, ItemId, NetId, PortId, VarId};
pub use instance::{Instance, PortBinding};
pub use lut::Lut;
pub use manager::EntityManager;
pub use namespace::{NameKind, NameOwner, NameTable, NameTemplates, Scope};
pub use net::{Net, NetDecl, Variable};
pub use port::{Port, PortDirection};
pub use process::{ClockedControl, Process, ProcessKind};
pub use stmt::{Assign, CaseArm, CaseStatement, IfStatement, ScopedBlock, Statement, StatementBlock};
pub use types::{bitlen, DataType};
pub use usage::UsageMap;
