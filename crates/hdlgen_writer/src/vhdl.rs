//! VHDL backend.
//!
//! Each entity becomes an `entity` declaration plus one architecture.
//! Instantiated entities are declared as components, nets become signals,
//! and every variable a process touches is declared in that process.
//! Named blocks have no VHDL counterpart and are flattened into the
//! enclosing process, so their locals must not share a name with anything
//! else the process sees.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;

use hdlgen_common::{Polarity, RtlError, RtlResult};
use hdlgen_ir::{
    CaseStatement, DataType, Entity, EntityId, EntityManager, Expr, IfStatement, Instance,
    ItemKind, Leaf, Lut, PortDirection, Process, ProcessKind, Scope, Statement, StatementBlock,
};
use tracing::{debug, trace};

use crate::error::WriteResult;
use crate::line::LineWriter;
use crate::render::ExprRender;
use crate::verilog::{msb, require_name};
use crate::{HdlWriter, WriterOptions};

/// Writes designs as VHDL.
pub struct VhdlWriter<W: Write> {
    out: LineWriter<W>,
    options: WriterOptions,
}

impl<W: Write> VhdlWriter<W> {
    /// Creates a writer with default options.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, WriterOptions::default())
    }

    /// Creates a writer with the given options.
    pub fn with_options(sink: W, options: WriterOptions) -> Self {
        Self {
            out: LineWriter::new(sink),
            options,
        }
    }

    /// Consumes the writer and returns the sink.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_context(&mut self, mgr: &EntityManager, ent: &Entity) -> WriteResult<()> {
        self.out.write_line("library IEEE;")?;
        self.out.write_line("use IEEE.std_logic_1164.all;")?;
        if uses_signed(mgr, ent) {
            self.out.write_line("use IEEE.numeric_std.all;")?;
        }
        for clause in &self.options.vhdl.use_clauses {
            self.out.write_line(&format!("use {clause};"))?;
        }
        self.out.write_line("")?;
        Ok(())
    }

    fn write_port_clause(&mut self, ent: &Entity) -> WriteResult<()> {
        if ent.port_count() == 0 {
            return Ok(());
        }
        let mut lines = Vec::new();
        for (_, port) in ent.ports() {
            let name = require_name(port.name(), "port", ent)?;
            let dir = match port.direction {
                PortDirection::Input => "in",
                PortDirection::Output => "out",
                PortDirection::InOut => "inout",
            };
            lines.push(vec![
                name.to_string(),
                ":".to_string(),
                dir.to_string(),
                vhdl_type(&port.data_type, name)?,
            ]);
        }
        self.out.open("port (")?;
        self.out.write_lines(&lines, ";", "")?;
        self.out.close(");")?;
        Ok(())
    }

    fn write_components(&mut self, mgr: &EntityManager, ent: &Entity) -> WriteResult<()> {
        let mut components = BTreeMap::new();
        for (_, item) in ent.items() {
            if let ItemKind::Instance(inst) = &item.kind {
                components.insert(inst.entity_name(), inst.entity());
            }
        }
        for (name, id) in components {
            self.out.open(&format!("component {name} is"))?;
            self.write_port_clause(mgr.entity(id))?;
            self.out.close(&format!("end component {name};"))?;
            self.out.write_line("")?;
        }
        Ok(())
    }

    fn write_signals(&mut self, ent: &Entity) -> WriteResult<()> {
        let mut lines = Vec::new();
        for (_, net) in ent.nets().filter(|(_, n)| n.scope == Scope::Entity) {
            let name = require_name(net.name(), "net", ent)?;
            lines.push(vec![
                "signal".to_string(),
                name.to_string(),
                ":".to_string(),
                vhdl_type(&net.data_type, name)?,
            ]);
        }
        self.out.write_lines(&lines, ";", ";")?;
        Ok(())
    }

    fn write_process(&mut self, ent: &Entity, name: &str, process: &Process) -> WriteResult<()> {
        let sensitivity = match process.clocking() {
            None => "all".to_string(),
            Some(ctl) => {
                let mut list = ctl.clock.vhdl_str(ent)?;
                if let Some((sig, _)) = &ctl.async_ctl {
                    list.push_str(", ");
                    list.push_str(&sig.vhdl_str(ent)?);
                }
                list
            }
        };
        let locals = process_variables(ent, name, process)?;
        let header = format!("{name}: process ( {sensitivity} )");
        if locals.is_empty() {
            self.out.open(&format!("{header} begin"))?;
        } else {
            self.out.open(&header)?;
            self.out.write_lines(&locals, ";", ";")?;
            self.out.dec_indent();
            self.out.open("begin")?;
        }

        match process.kind() {
            ProcessKind::Combinational => self.write_statements(ent, process.body())?,
            ProcessKind::Clocked(ctl) => {
                let mut keyword = "if";
                if let Some((sig, pol)) = &ctl.async_ctl {
                    self.out.open(&format!(
                        "if {} = {} then",
                        sig.vhdl_str(ent)?,
                        level(*pol)
                    ))?;
                    self.write_statements(ent, process.async_body())?;
                    self.out.dec_indent();
                    keyword = "elsif";
                }
                let func = match ctl.edge {
                    Polarity::Positive => "rising_edge",
                    Polarity::Negative => "falling_edge",
                };
                let mut cond = format!("{func}({})", ctl.clock.vhdl_str(ent)?);
                if let Some((sig, pol)) = &ctl.enable {
                    cond.push_str(&format!(" and {} = {}", sig.vhdl_str(ent)?, level(*pol)));
                }
                self.out.open(&format!("{keyword} {cond} then"))?;
                self.write_statements(ent, process.body())?;
                self.out.close("end if;")?;
            }
        }
        self.out.close(&format!("end process {name};"))?;
        Ok(())
    }

    fn write_statements(&mut self, ent: &Entity, block: &StatementBlock) -> WriteResult<()> {
        if block.is_null() {
            self.out.write_line("null;")?;
        }
        self.write_flattened(ent, block)
    }

    // Scoped blocks contribute their statements without a wrapper.
    fn write_flattened(&mut self, ent: &Entity, block: &StatementBlock) -> WriteResult<()> {
        for stmt in block.statements() {
            match stmt {
                Statement::Assign(a) => {
                    let op = if is_variable_target(ent, &a.lhs) { ":=" } else { "<=" };
                    self.out.write_line(&format!(
                        "{} {op} {};",
                        a.lhs.vhdl_str(ent)?,
                        a.rhs.vhdl_str(ent)?
                    ))?;
                }
                Statement::If(s) => self.write_if(ent, s)?,
                Statement::Case(c) => self.write_case(ent, c)?,
                Statement::Scoped(s) => self.write_flattened(ent, &s.body)?,
            }
        }
        Ok(())
    }

    fn write_if(&mut self, ent: &Entity, stmt: &IfStatement) -> WriteResult<()> {
        let mut current = stmt;
        let mut keyword = "if";
        loop {
            self.out.open(&format!(
                "{keyword} {} then",
                current.cond.vhdl_cond_str(ent)?
            ))?;
            self.write_statements(ent, current.then_body())?;
            self.out.dec_indent();
            let else_body = current.else_body();
            match else_body.statements() {
                [] => break,
                [Statement::If(nested)] => {
                    current = nested;
                    keyword = "elsif";
                }
                _ => {
                    self.out.open("else")?;
                    self.write_statements(ent, else_body)?;
                    self.out.dec_indent();
                    break;
                }
            }
        }
        self.out.write_line("end if;")?;
        Ok(())
    }

    fn write_case(&mut self, ent: &Entity, stmt: &CaseStatement) -> WriteResult<()> {
        self.out
            .open(&format!("case {} is", stmt.subject.vhdl_str(ent)?))?;
        for arm in stmt.arms() {
            self.out
                .open(&format!("when {} =>", arm.label.vhdl_str(ent)?))?;
            self.write_statements(ent, &arm.body)?;
            self.out.dec_indent();
        }
        self.out.open("when others =>")?;
        match stmt.default_body() {
            Some(body) => self.write_statements(ent, body)?,
            None => self.out.write_line("null;")?,
        }
        self.out.dec_indent();
        self.out.close("end case;")?;
        Ok(())
    }

    fn write_instance(
        &mut self,
        mgr: &EntityManager,
        ent: &Entity,
        name: &str,
        inst: &Instance,
    ) -> WriteResult<()> {
        if inst.port_count() == 0 {
            self.out
                .write_line(&format!("{name}: {};", inst.entity_name()))?;
            return Ok(());
        }
        let child = mgr.entity(inst.entity());
        let mut lines = Vec::new();
        for binding in inst.bindings() {
            let port = child
                .port(binding.port)
                .name()
                .or(binding.port_name.as_deref());
            let port = require_name(port, "port", child)?;
            lines.push(vec![
                port.to_string(),
                "=>".to_string(),
                binding.net.vhdl_str(ent)?,
            ]);
        }
        self.out
            .open(&format!("{name}: {} port map (", inst.entity_name()))?;
        self.out.write_lines(&lines, ",", "")?;
        self.out.close(");")?;
        Ok(())
    }

    fn write_lut(&mut self, ent: &Entity, name: &str, lut: &Lut) -> WriteResult<()> {
        let input = lut.input().vhdl_str(ent)?;
        let output = lut.output().vhdl_str(ent)?;
        let mut lines = Vec::new();
        for (key, value) in lut.rows() {
            let key = Expr::Constant(key.clone()).vhdl_str(ent)?;
            let value = Expr::Constant(value.clone()).vhdl_str(ent)?;
            lines.push(vec![
                format!("when {key}"),
                "=>".to_string(),
                format!("{output} <= {value}"),
            ]);
        }
        lines.push(vec![
            "when others".to_string(),
            "=>".to_string(),
            "null".to_string(),
        ]);

        self.out
            .open(&format!("{name}: process ( {input} ) begin"))?;
        self.out.open(&format!("case {input} is"))?;
        self.out.write_lines(&lines, ";", ";")?;
        self.out.close("end case;")?;
        self.out.close(&format!("end process {name};"))?;
        Ok(())
    }

    fn write_assigns(&mut self, ent: &Entity) -> WriteResult<()> {
        let mut lines = Vec::new();
        for assign in ent.assigns() {
            lines.push(vec![
                assign.lhs.vhdl_str(ent)?,
                "<=".to_string(),
                assign.rhs.vhdl_str(ent)?,
            ]);
        }
        self.out.write_lines(&lines, ";", ";")?;
        Ok(())
    }
}

impl<W: Write> HdlWriter for VhdlWriter<W> {
    fn language(&self) -> &'static str {
        "VHDL"
    }

    fn extension(&self) -> &'static str {
        "vhd"
    }

    fn options(&self) -> &WriterOptions {
        &self.options
    }

    fn render_entity(&mut self, mgr: &EntityManager, id: EntityId) -> WriteResult<()> {
        let ent = mgr.entity(id);
        let arch = self.options.vhdl.architecture.clone();
        debug!(entity = %ent.name(), architecture = %arch, "rendering VHDL entity");
        check_variable_owners(ent)?;

        self.write_context(mgr, ent)?;
        self.out.open(&format!("entity {} is", ent.name()))?;
        self.write_port_clause(ent)?;
        self.out.close(&format!("end entity {};", ent.name()))?;
        self.out.write_line("")?;

        self.out
            .open(&format!("architecture {arch} of {} is", ent.name()))?;
        self.write_components(mgr, ent)?;
        self.write_signals(ent)?;
        self.out.dec_indent();
        self.out.open("begin")?;
        for (_, item) in ent.items() {
            let name = require_name(item.name(), "item", ent)?;
            match &item.kind {
                ItemKind::Process(p) => self.write_process(ent, name, p)?,
                ItemKind::Instance(inst) => self.write_instance(mgr, ent, name, inst)?,
                ItemKind::Lut(lut) => self.write_lut(ent, name, lut)?,
            }
            self.out.write_line("")?;
        }
        self.write_assigns(ent)?;
        self.out.close(&format!("end architecture {arch};"))?;
        Ok(())
    }

    fn write_separator(&mut self) -> WriteResult<()> {
        self.out.write_line("")?;
        Ok(())
    }
}

/// Returns the VHDL subtype declaring `ty`.
///
/// Only bits and vectors can be declared; `name` identifies the object in
/// the error.
pub fn vhdl_type(ty: &DataType, name: &str) -> RtlResult<String> {
    match ty {
        DataType::Bit => Ok("std_logic".to_string()),
        DataType::BitVector(n) => Ok(format!("std_logic_vector({} downto 0)", msb(*n, name)?)),
        DataType::SignedBitVector(n) => Ok(format!("signed({} downto 0)", msb(*n, name)?)),
        other => Err(RtlError::config(format!(
            "'{name}' has type {other}, which cannot be declared in VHDL"
        ))),
    }
}

fn level(polarity: Polarity) -> &'static str {
    match polarity {
        Polarity::Positive => "'1'",
        Polarity::Negative => "'0'",
    }
}

fn uses_signed(mgr: &EntityManager, ent: &Entity) -> bool {
    let ports_signed = |e: &Entity| e.ports().any(|(_, p)| p.data_type.is_signed());
    ports_signed(ent)
        || ent.nets().any(|(_, n)| n.data_type.is_signed())
        || ent.vars().any(|(_, v)| v.data_type.is_signed())
        || ent.items().any(|(_, item)| match &item.kind {
            ItemKind::Instance(inst) => ports_signed(mgr.entity(inst.entity())),
            _ => false,
        })
}

/// Returns `true` for objects declared as process variables: entity
/// variables and everything local to a named block.
fn is_process_local(ent: &Entity, leaf: Leaf) -> bool {
    match leaf {
        Leaf::Var(_) => true,
        Leaf::Net(id) => ent.net(id).scope != Scope::Entity,
        Leaf::Port(_) => false,
    }
}

/// Returns `true` when everything `lhs` writes is a process variable, so
/// the assignment must use `:=`. Signals take `<=` in either form.
fn is_variable_target(ent: &Entity, lhs: &Expr) -> bool {
    fn visit(ent: &Entity, target: &Expr, any: &mut bool, all: &mut bool) {
        match target {
            Expr::BitSelect { primary, .. } | Expr::PartSelect { primary, .. } => {
                visit(ent, primary, any, all)
            }
            Expr::Concat(parts) => {
                for part in parts {
                    visit(ent, part, any, all);
                }
            }
            other => match other.as_leaf() {
                Some(leaf) => {
                    *any = true;
                    *all &= is_process_local(ent, leaf);
                }
                None => *all = false,
            },
        }
    }
    let (mut any, mut all) = (false, true);
    visit(ent, lhs, &mut any, &mut all);
    any && all
}

/// Rejects process variables that one process cannot own.
///
/// Each process declares its variables locally, so a variable read or
/// written by a second process, an instance, a LUT or a continuous
/// assignment would refer to nothing or to a different copy.
fn check_variable_owners(ent: &Entity) -> RtlResult<()> {
    let label = |leaf: Leaf| ent.leaf_name(leaf).unwrap_or("<anonymous>").to_string();
    let mut owners: HashMap<Leaf, &str> = HashMap::new();
    for (_, item) in ent.items() {
        let name = require_name(item.name(), "item", ent)?;
        let mut leaves = Vec::new();
        let mut collect = |e: &Expr| {
            e.for_each_leaf(&mut |leaf| {
                if is_process_local(ent, leaf) {
                    leaves.push(leaf);
                }
            })
        };
        match &item.kind {
            ItemKind::Process(p) => p.for_each_expr(&mut collect),
            ItemKind::Instance(inst) => inst.bindings().iter().for_each(|b| collect(&b.net)),
            ItemKind::Lut(lut) => {
                collect(lut.input());
                collect(lut.output());
            }
        }
        if !matches!(item.kind, ItemKind::Process(_)) {
            if let Some(&leaf) = leaves.first() {
                return Err(RtlError::config(format!(
                    "variable '{}' is used outside a process by '{name}'",
                    label(leaf)
                )));
            }
            continue;
        }
        for leaf in leaves {
            let owner = *owners.entry(leaf).or_insert(name);
            if owner != name {
                return Err(RtlError::config(format!(
                    "variable '{}' is shared by processes '{owner}' and '{name}'",
                    label(leaf)
                )));
            }
        }
    }
    for assign in ent.assigns() {
        let mut stray = None;
        for e in [&assign.lhs, &assign.rhs] {
            e.for_each_leaf(&mut |leaf| {
                if is_process_local(ent, leaf) {
                    stray.get_or_insert(leaf);
                }
            });
        }
        if let Some(leaf) = stray {
            return Err(RtlError::config(format!(
                "variable '{}' is used in a continuous assignment",
                label(leaf)
            )));
        }
    }
    Ok(())
}

/// Collects the variable declarations of `process`, in first-use order.
///
/// Variables and nets local to a named block are declared alongside the
/// entity's variables, so their names must be unique within the entity.
fn process_variables(
    ent: &Entity,
    process_name: &str,
    process: &Process,
) -> RtlResult<Vec<Vec<String>>> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    process.for_each_expr(&mut |e| {
        e.for_each_leaf(&mut |leaf| {
            if is_process_local(ent, leaf) && seen.insert(leaf) {
                order.push(leaf);
            }
        })
    });

    let mut names = HashSet::new();
    let mut lines = Vec::with_capacity(order.len());
    for leaf in order {
        let (name, ty, scope) = match leaf {
            Leaf::Var(id) => {
                let v = ent.var(id);
                (v.name(), &v.data_type, v.scope)
            }
            Leaf::Net(id) => {
                let n = ent.net(id);
                (n.name(), &n.data_type, n.scope)
            }
            Leaf::Port(_) => continue,
        };
        let name = require_name(name, "variable", ent)?;
        let clashes = scope != Scope::Entity && ent.lookup(name).is_some();
        if clashes || !names.insert(name) {
            return Err(RtlError::NameCollision {
                scope: format!("{}.{process_name}", ent.name()),
                name: name.to_string(),
            });
        }
        trace!(process = process_name, variable = name, "declaring process variable");
        lines.push(vec![
            "variable".to_string(),
            name.to_string(),
            ":".to_string(),
            vhdl_type(ty, name)?,
        ]);
    }
    Ok(lines)
}
