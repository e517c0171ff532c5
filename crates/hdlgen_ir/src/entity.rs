//! Entities: the unit of hierarchy in a design.
//!
//! An entity owns its ports, nets, variables, items and named blocks in
//! per-category arenas and keeps a single flat [`NameTable`] for all of
//! them. Every add-operation checks its name before touching anything, so a
//! failed call leaves the entity unchanged.

use crate::arena::Arena;
use crate::expr::{Expr, Leaf, Operand};
use crate::ids::{BlockId, EntityId, ItemId, NetId, PortId, VarId};
use crate::instance::{Instance, PortBinding};
use crate::lut::Lut;
use crate::namespace::{fresh_across, NameOwner, NameTable, NameTemplates, Scope};
use crate::net::{Net, NetDecl, Variable};
use crate::port::{Port, PortDirection};
use crate::process::Process;
use crate::types::DataType;
use hdlgen_common::{Polarity, RtlError, RtlResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A named block: a nested namespace for block-local nets and variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedBlock {
    pub(crate) name: Option<String>,
    /// The namespace the block's own name lives in.
    pub parent: Scope,
    pub(crate) names: NameTable,
}

impl NamedBlock {
    /// Returns the block name, `None` until anonymous names are resolved.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Names declared inside the block.
    pub fn names(&self) -> &NameTable {
        &self.names
    }
}

/// A continuous assignment `lhs = rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousAssign {
    /// Driven net or port.
    pub lhs: Expr,
    /// Driving expression.
    pub rhs: Expr,
}

/// What an item is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    /// A combinational or clocked process.
    Process(Process),
    /// An instance of another entity.
    Instance(Instance),
    /// A lookup table.
    Lut(Lut),
}

/// A named member of an entity's body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub(crate) name: Option<String>,
    /// The item itself.
    pub kind: ItemKind,
}

impl Item {
    /// Returns the item name, `None` until anonymous names are resolved.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A module (Verilog) or entity/architecture pair (VHDL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    name: String,
    ports: Arena<PortId, Port>,
    nets: Arena<NetId, Net>,
    vars: Arena<VarId, Variable>,
    items: Arena<ItemId, Item>,
    blocks: Arena<BlockId, NamedBlock>,
    assigns: Vec<ContinuousAssign>,
    names: NameTable,
    default_clock: Option<(Expr, Polarity)>,
    default_reset: Option<(Expr, Polarity)>,
    sealed: bool,
}

impl Entity {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ports: Arena::new(),
            nets: Arena::new(),
            vars: Arena::new(),
            items: Arena::new(),
            blocks: Arena::new(),
            assigns: Vec::new(),
            names: NameTable::new(),
            default_clock: None,
            default_reset: None,
            sealed: false,
        }
    }

    /// The entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds an input port.
    pub fn add_input_port(&mut self, name: Option<&str>, ty: DataType) -> RtlResult<Expr> {
        self.add_port(PortDirection::Input, name, ty, None)
    }

    /// Adds an output port, optionally driven by `src`.
    pub fn add_output_port(
        &mut self,
        name: Option<&str>,
        ty: DataType,
        src: Option<Expr>,
    ) -> RtlResult<Expr> {
        self.add_port(PortDirection::Output, name, ty, src)
    }

    /// Adds a bidirectional port, optionally driven by `src`.
    pub fn add_inout_port(
        &mut self,
        name: Option<&str>,
        ty: DataType,
        src: Option<Expr>,
    ) -> RtlResult<Expr> {
        self.add_port(PortDirection::InOut, name, ty, src)
    }

    /// Adds a port of any direction.
    ///
    /// Only output and inout ports may have a source.
    pub fn add_port(
        &mut self,
        direction: PortDirection,
        name: Option<&str>,
        ty: DataType,
        src: Option<Expr>,
    ) -> RtlResult<Expr> {
        self.check_name(Scope::Entity, name)?;
        if let Some(src) = &src {
            if direction == PortDirection::Input {
                return Err(RtlError::config(format!(
                    "input port of entity '{}' cannot be driven from inside",
                    self.name
                )));
            }
            check_assignable(&ty, src)?;
        }
        let id = self.ports.alloc(Port {
            name: name.map(str::to_string),
            direction,
            data_type: ty.clone(),
        });
        self.bind(Scope::Entity, name, NameOwner::Port(id));
        let port = Expr::port(id, ty);
        if let Some(src) = src {
            self.assigns.push(ContinuousAssign {
                lhs: port.clone(),
                rhs: src,
            });
        }
        trace!(entity = %self.name, port = ?name, ?direction, "added port");
        Ok(port)
    }

    /// Adds a net.
    ///
    /// An explicit type must agree with the source's type.
    pub fn add_net(&mut self, decl: NetDecl) -> RtlResult<Expr> {
        let NetDecl {
            name,
            data_type,
            reg,
            src,
            scope,
        } = decl;
        self.check_name(scope, name.as_deref())?;
        if src.is_some() && scope != Scope::Entity {
            return Err(RtlError::config(
                "block-local nets cannot be continuously assigned",
            ));
        }
        let ty = match (data_type, &src) {
            (Some(ty), Some(src)) => {
                check_assignable(&ty, src)?;
                ty
            }
            (Some(ty), None) => ty,
            (None, Some(src)) => src.data_type(),
            (None, None) => DataType::Bit,
        };
        let id = self.nets.alloc(Net {
            name: name.clone(),
            data_type: ty.clone(),
            reg,
            scope,
        });
        self.bind(scope, name.as_deref(), NameOwner::Net(id));
        let net = Expr::net(id, ty);
        if let Some(src) = src {
            self.assigns.push(ContinuousAssign {
                lhs: net.clone(),
                rhs: src,
            });
        }
        Ok(net)
    }

    /// Adds an entity-level variable.
    pub fn add_var(&mut self, name: Option<&str>, ty: DataType) -> RtlResult<Expr> {
        self.add_var_in(Scope::Entity, name, ty)
    }

    /// Adds a variable to `scope`.
    pub fn add_var_in(&mut self, scope: Scope, name: Option<&str>, ty: DataType) -> RtlResult<Expr> {
        self.check_name(scope, name)?;
        let id = self.vars.alloc(Variable {
            name: name.map(str::to_string),
            data_type: ty.clone(),
            scope,
        });
        self.bind(scope, name, NameOwner::Var(id));
        Ok(Expr::var(id, ty))
    }

    /// Creates a named block in `parent`.
    ///
    /// Place it in a process body with
    /// [`StatementBlock::add_scoped_block`](crate::StatementBlock::add_scoped_block).
    pub fn add_block(&mut self, name: Option<&str>, parent: Scope) -> RtlResult<BlockId> {
        self.check_name(parent, name)?;
        let id = self.blocks.alloc(NamedBlock {
            name: name.map(str::to_string),
            parent,
            names: NameTable::new(),
        });
        self.bind(parent, name, NameOwner::Block(id));
        Ok(id)
    }

    /// Adds the continuous assignment `lhs = rhs`.
    pub fn connect(&mut self, lhs: &Expr, rhs: impl Into<Operand>) -> RtlResult<()> {
        self.ensure_mutable()?;
        let rhs = lhs.coerce(rhs);
        check_assignable(&lhs.data_type(), &rhs)?;
        self.assigns.push(ContinuousAssign {
            lhs: lhs.clone(),
            rhs,
        });
        Ok(())
    }

    /// Adds an empty combinational process.
    pub fn add_comb_process(&mut self, name: Option<&str>) -> RtlResult<ItemId> {
        self.add_item(name, ItemKind::Process(Process::combinational()))
    }

    /// Adds an empty clocked process.
    ///
    /// An async control without a clock is rejected, as is a missing clock.
    pub fn add_clocked_process(
        &mut self,
        name: Option<&str>,
        clock: Option<(Expr, Polarity)>,
        async_ctl: Option<(Expr, Polarity)>,
    ) -> RtlResult<ItemId> {
        let Some((clock, edge)) = clock else {
            let message = if async_ctl.is_some() {
                "an asynchronous control signal requires a clock"
            } else {
                "a clocked process requires a clock"
            };
            return Err(RtlError::config(message));
        };
        self.add_item(
            name,
            ItemKind::Process(Process::clocked(clock, edge, async_ctl)),
        )
    }

    /// Adds a lookup table item.
    ///
    /// The input is either the existing net `input` or a fresh
    /// `BitVector(input_width)` net; giving both requires their widths to
    /// agree. The output is a fresh register net of type `output`.
    pub fn add_lut(
        &mut self,
        name: Option<&str>,
        input: Option<Expr>,
        input_width: Option<u32>,
        output: DataType,
    ) -> RtlResult<ItemId> {
        self.check_name(Scope::Entity, name)?;
        let input_type = match (&input, input_width) {
            (None, None) => {
                return Err(RtlError::config(
                    "lookup table needs an input net or an input width",
                ))
            }
            (Some(e), Some(w)) => {
                let ty = e.data_type();
                if ty.width() != Some(w) {
                    return Err(RtlError::mismatch(DataType::BitVector(w), ty));
                }
                ty
            }
            (Some(e), None) => e.data_type(),
            (None, Some(0)) => {
                return Err(RtlError::config("lookup table input width must be positive"))
            }
            (None, Some(w)) => DataType::BitVector(w),
        };
        let input = match input {
            Some(e) => e,
            None => self.alloc_net(input_type, false),
        };
        let output = self.alloc_net(output, true);
        self.add_item(name, ItemKind::Lut(Lut::new(input, output)))
    }

    pub(crate) fn add_instance_item(
        &mut self,
        name: Option<&str>,
        child: EntityId,
        child_name: String,
        ports: Vec<(PortId, Option<String>, DataType)>,
    ) -> RtlResult<ItemId> {
        self.check_name(Scope::Entity, name)?;
        let bindings = ports
            .into_iter()
            .map(|(port, port_name, data_type)| PortBinding {
                port,
                port_name,
                net: self.alloc_net(data_type.clone(), false),
                data_type,
            })
            .collect();
        debug!(entity = %self.name, child = %child_name, "instantiated entity");
        self.add_item(
            name,
            ItemKind::Instance(Instance::new(child, child_name, bindings)),
        )
    }

    fn add_item(&mut self, name: Option<&str>, kind: ItemKind) -> RtlResult<ItemId> {
        self.check_name(Scope::Entity, name)?;
        let id = self.items.alloc(Item {
            name: name.map(str::to_string),
            kind,
        });
        self.bind(Scope::Entity, name, NameOwner::Item(id));
        Ok(id)
    }

    fn alloc_net(&mut self, data_type: DataType, reg: bool) -> Expr {
        let id = self.nets.alloc(Net {
            name: None,
            data_type: data_type.clone(),
            reg,
            scope: Scope::Entity,
        });
        Expr::net(id, data_type)
    }

    /// Returns the process item `id`.
    pub fn process(&self, id: ItemId) -> Option<&Process> {
        match &self.items.try_get(id)?.kind {
            ItemKind::Process(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the process item `id` for filling in its body.
    pub fn process_mut(&mut self, id: ItemId) -> RtlResult<&mut Process> {
        self.ensure_mutable()?;
        match self.item_kind_mut(id)? {
            ItemKind::Process(p) => Ok(p),
            _ => Err(RtlError::config(format!("item {} is not a process", id.as_raw()))),
        }
    }

    /// Returns the LUT item `id`.
    pub fn lut(&self, id: ItemId) -> Option<&Lut> {
        match &self.items.try_get(id)?.kind {
            ItemKind::Lut(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the LUT item `id` for adding rows.
    pub fn lut_mut(&mut self, id: ItemId) -> RtlResult<&mut Lut> {
        self.ensure_mutable()?;
        match self.item_kind_mut(id)? {
            ItemKind::Lut(l) => Ok(l),
            _ => Err(RtlError::config(format!(
                "item {} is not a lookup table",
                id.as_raw()
            ))),
        }
    }

    /// Returns the instance item `id`.
    pub fn instance(&self, id: ItemId) -> Option<&Instance> {
        match &self.items.try_get(id)?.kind {
            ItemKind::Instance(i) => Some(i),
            _ => None,
        }
    }

    fn item_kind_mut(&mut self, id: ItemId) -> RtlResult<&mut ItemKind> {
        if self.items.try_get(id).is_none() {
            return Err(RtlError::config(format!(
                "entity '{}' has no item {}",
                self.name,
                id.as_raw()
            )));
        }
        Ok(&mut self.items[id].kind)
    }

    /// Sets the clock helper constructors fall back to.
    pub fn set_default_clock(&mut self, clock: Expr, polarity: Polarity) {
        self.default_clock = Some((clock, polarity));
    }

    /// Sets the reset helper constructors fall back to.
    pub fn set_default_reset(&mut self, reset: Expr, polarity: Polarity) {
        self.default_reset = Some((reset, polarity));
    }

    /// The default clock, if set.
    pub fn default_clock(&self) -> Option<&(Expr, Polarity)> {
        self.default_clock.as_ref()
    }

    /// The default reset, if set.
    pub fn default_reset(&self) -> Option<&(Expr, Polarity)> {
        self.default_reset.as_ref()
    }

    /// Ports in declaration order.
    pub fn ports(&self) -> impl Iterator<Item = (PortId, &Port)> {
        self.ports.iter()
    }

    /// Nets in declaration order, all scopes.
    pub fn nets(&self) -> impl Iterator<Item = (NetId, &Net)> {
        self.nets.iter()
    }

    /// Variables in declaration order, all scopes.
    pub fn vars(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.vars.iter()
    }

    /// Items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items.iter()
    }

    /// Named blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &NamedBlock)> {
        self.blocks.iter()
    }

    /// Continuous assignments in insertion order.
    pub fn assigns(&self) -> &[ContinuousAssign] {
        &self.assigns
    }

    /// Returns the port `id`.
    pub fn port(&self, id: PortId) -> &Port {
        &self.ports[id]
    }

    /// Returns the net `id`.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id]
    }

    /// Returns the variable `id`.
    pub fn var(&self, id: VarId) -> &Variable {
        &self.vars[id]
    }

    /// Returns the item `id`.
    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id]
    }

    /// Returns the named block `id`.
    pub fn block(&self, id: BlockId) -> &NamedBlock {
        &self.blocks[id]
    }

    /// Returns the number of ports.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// The entity-level namespace.
    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Returns the owner of an entity-level name.
    pub fn lookup(&self, name: &str) -> Option<NameOwner> {
        self.names.lookup(name)
    }

    /// Returns a leaf for the entity-level port, net or variable `name`.
    pub fn expr_by_name(&self, name: &str) -> Option<Expr> {
        match self.lookup(name)? {
            NameOwner::Port(id) => Some(Expr::port(id, self.ports[id].data_type.clone())),
            NameOwner::Net(id) => Some(Expr::net(id, self.nets[id].data_type.clone())),
            NameOwner::Var(id) => Some(Expr::var(id, self.vars[id].data_type.clone())),
            NameOwner::Item(_) | NameOwner::Block(_) => None,
        }
    }

    /// Returns the name of the object a leaf refers to.
    pub fn leaf_name(&self, leaf: Leaf) -> Option<&str> {
        match leaf {
            Leaf::Port(id) => self.ports.try_get(id)?.name(),
            Leaf::Net(id) => self.nets.try_get(id)?.name(),
            Leaf::Var(id) => self.vars.try_get(id)?.name(),
        }
    }

    /// Gives every anonymous object a name from `templates`.
    ///
    /// Ports, nets, variables, items and blocks are named in that order, each
    /// with the smallest counter of its template free in every namespace of
    /// the entity, and bound in its own namespace.
    /// Returns how many names were assigned; a second call assigns none.
    pub fn resolve_names(&mut self, templates: &NameTemplates) -> RtlResult<usize> {
        templates.validate()?;
        let Self {
            ports,
            nets,
            vars,
            items,
            blocks,
            names,
            ..
        } = &mut *self;
        let mut assigned = 0;

        for (id, port) in ports.iter_mut() {
            if port.name.is_none() {
                let owner = NameOwner::Port(id);
                port.name = Some(claim_fresh(names, blocks, Scope::Entity, &templates.port, owner));
                assigned += 1;
            }
        }
        for (id, net) in nets.iter_mut() {
            if net.name.is_none() {
                let owner = NameOwner::Net(id);
                net.name = Some(claim_fresh(names, blocks, net.scope, &templates.net, owner));
                assigned += 1;
            }
        }
        for (id, var) in vars.iter_mut() {
            if var.name.is_none() {
                let owner = NameOwner::Var(id);
                var.name = Some(claim_fresh(names, blocks, var.scope, &templates.var, owner));
                assigned += 1;
            }
        }
        for (id, item) in items.iter_mut() {
            if item.name.is_none() {
                let owner = NameOwner::Item(id);
                item.name = Some(claim_fresh(names, blocks, Scope::Entity, &templates.item, owner));
                assigned += 1;
            }
        }
        let unnamed: Vec<BlockId> = blocks
            .iter()
            .filter(|(_, b)| b.name.is_none())
            .map(|(id, _)| id)
            .collect();
        for id in unnamed {
            let parent = blocks[id].parent;
            let name = claim_fresh(names, blocks, parent, &templates.block, NameOwner::Block(id));
            blocks[id].name = Some(name);
            assigned += 1;
        }

        if assigned > 0 {
            debug!(entity = %self.name, assigned, "resolved anonymous names");
        }
        Ok(assigned)
    }

    /// Freezes the entity; further mutation fails.
    pub fn seal(&mut self) {
        if !self.sealed {
            trace!(entity = %self.name, "sealed");
        }
        self.sealed = true;
    }

    /// Returns `true` once rendering has started.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub(crate) fn ensure_mutable(&self) -> RtlResult<()> {
        if self.sealed {
            return Err(RtlError::config(format!(
                "entity '{}' is sealed for rendering",
                self.name
            )));
        }
        Ok(())
    }

    /// Fails if `name` is taken in `scope` or the entity is sealed.
    pub(crate) fn check_name(&self, scope: Scope, name: Option<&str>) -> RtlResult<()> {
        self.ensure_mutable()?;
        let table = match scope {
            Scope::Entity => &self.names,
            Scope::Block(id) => match self.blocks.try_get(id) {
                Some(block) => &block.names,
                None => {
                    return Err(RtlError::config(format!(
                        "entity '{}' has no block {}",
                        self.name,
                        id.as_raw()
                    )))
                }
            },
        };
        match name {
            Some(name) => table.check(&self.scope_label(scope), name),
            None => Ok(()),
        }
    }

    fn bind(&mut self, scope: Scope, name: Option<&str>, owner: NameOwner) {
        if let Some(name) = name {
            scope_table(&mut self.names, &mut self.blocks, scope).bind(name, owner);
        }
    }

    fn scope_label(&self, scope: Scope) -> String {
        match scope {
            Scope::Entity => self.name.clone(),
            Scope::Block(id) => {
                let block = self.blocks[id].name().unwrap_or("<anonymous block>");
                format!("{}.{block}", self.name)
            }
        }
    }
}

fn scope_table<'a>(
    names: &'a mut NameTable,
    blocks: &'a mut Arena<BlockId, NamedBlock>,
    scope: Scope,
) -> &'a mut NameTable {
    match scope {
        Scope::Entity => names,
        Scope::Block(id) => &mut blocks[id].names,
    }
}

fn claim_fresh(
    names: &mut NameTable,
    blocks: &mut Arena<BlockId, NamedBlock>,
    scope: Scope,
    template: &str,
    owner: NameOwner,
) -> String {
    let name = {
        let tables: Vec<&NameTable> = std::iter::once(&*names)
            .chain(blocks.values().map(|b| &b.names))
            .collect();
        fresh_across(template, &tables)
    };
    scope_table(names, blocks, scope).bind(&name, owner);
    name
}

/// Checks that `value` can drive a target of type `target`.
///
/// Packed types must agree in width; anything else must be equal.
pub(crate) fn check_assignable(target: &DataType, value: &Expr) -> RtlResult<()> {
    let found = value.data_type();
    let compatible = match (target.width(), found.width()) {
        (Some(a), Some(b)) => a == b,
        _ => *target == found,
    };
    if compatible {
        Ok(())
    } else {
        Err(RtlError::mismatch(target, &found))
    }
}
