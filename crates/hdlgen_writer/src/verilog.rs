//! Verilog-HDL backend.
//!
//! Each entity becomes one `module`. Nets and entity-level variables are
//! declared as `reg`/`wire` right after the port list, processes become
//! `always` blocks, lookup tables become a `case` inside `always @*`, and
//! continuous assignments close the module as aligned `assign` lines.

use std::io::Write;

use hdlgen_common::{Polarity, RtlError, RtlResult};
use hdlgen_ir::{
    BlockId, CaseStatement, DataType, Entity, EntityId, EntityManager, Expr, IfStatement,
    Instance, ItemKind, Lut, PortDirection, Process, ProcessKind, Scope, Statement,
    StatementBlock,
};
use tracing::debug;

use crate::error::WriteResult;
use crate::line::LineWriter;
use crate::render::ExprRender;
use crate::{HdlWriter, WriterOptions};

/// Writes designs as Verilog-HDL.
pub struct VerilogWriter<W: Write> {
    out: LineWriter<W>,
    options: WriterOptions,
}

impl<W: Write> VerilogWriter<W> {
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

    fn write_header(&mut self, ent: &Entity) -> WriteResult<()> {
        if ent.port_count() == 0 {
            self.out.write_line(&format!("module {};", ent.name()))?;
            return Ok(());
        }
        self.out.write_line(&format!("module {}(", ent.name()))?;
        let mut lines = Vec::new();
        for (_, port) in ent.ports() {
            let name = require_name(port.name(), "port", ent)?;
            let dir = match port.direction {
                PortDirection::Input => "input",
                PortDirection::Output => "output",
                PortDirection::InOut => "inout",
            };
            let (signed, range) = type_fields(&port.data_type, name)?;
            lines.push(vec![dir.to_string(), signed.to_string(), range, name.to_string()]);
        }
        self.out.inc_indent();
        self.out.write_lines(&lines, ",", "")?;
        self.out.dec_indent();
        self.out.write_line(");")?;
        Ok(())
    }

    fn write_declarations(&mut self, ent: &Entity, scope: Scope) -> WriteResult<()> {
        let mut lines = Vec::new();
        for (_, net) in ent.nets().filter(|(_, n)| n.scope == scope) {
            let name = require_name(net.name(), "net", ent)?;
            // Only registers may be declared inside a named block.
            let kind = if net.reg || scope != Scope::Entity {
                "reg"
            } else {
                "wire"
            };
            let (signed, range) = type_fields(&net.data_type, name)?;
            lines.push(vec![kind.to_string(), signed.to_string(), range, name.to_string()]);
        }
        for (_, var) in ent.vars().filter(|(_, v)| v.scope == scope) {
            let name = require_name(var.name(), "variable", ent)?;
            let (signed, range) = type_fields(&var.data_type, name)?;
            lines.push(vec!["reg".to_string(), signed.to_string(), range, name.to_string()]);
        }
        self.out.write_lines(&lines, ";", ";")?;
        Ok(())
    }

    fn write_process(&mut self, ent: &Entity, process: &Process) -> WriteResult<()> {
        match process.kind() {
            ProcessKind::Combinational => {
                self.out.open("always @* begin")?;
                self.write_statements(ent, process.body())?;
            }
            ProcessKind::Clocked(ctl) => {
                let mut sense = format!(
                    "{} {}",
                    edge(ctl.edge),
                    ctl.clock.verilog_str(ent)?
                );
                if let Some((sig, pol)) = &ctl.async_ctl {
                    sense.push_str(&format!(" or {} {}", edge(*pol), sig.verilog_str(ent)?));
                }
                self.out.open(&format!("always @ ( {sense} ) begin"))?;
                let enable = match &ctl.enable {
                    Some((sig, pol)) => Some(level(sig, *pol, ent)?),
                    None => None,
                };
                match &ctl.async_ctl {
                    Some((sig, pol)) => {
                        let cond = level(sig, *pol, ent)?;
                        self.write_block(ent, &format!("if ( {cond} ) "), process.async_body())?;
                        match enable {
                            Some(en) => {
                                self.out.write_partial("else ")?;
                                self.write_block(ent, &format!("if ( {en} ) "), process.body())?;
                            }
                            None => self.write_block(ent, "else ", process.body())?,
                        }
                    }
                    None => match enable {
                        Some(en) => {
                            self.write_block(ent, &format!("if ( {en} ) "), process.body())?
                        }
                        None => self.write_statements(ent, process.body())?,
                    },
                }
            }
        }
        self.out.close("end")?;
        Ok(())
    }

    /// Writes `{prefix}begin`, the block, and `end`.
    fn write_block(
        &mut self,
        ent: &Entity,
        prefix: &str,
        block: &StatementBlock,
    ) -> WriteResult<()> {
        self.out.open(&format!("{prefix}begin"))?;
        self.write_statements(ent, block)?;
        self.out.close("end")?;
        Ok(())
    }

    fn write_statements(&mut self, ent: &Entity, block: &StatementBlock) -> WriteResult<()> {
        if block.is_null() {
            self.out.write_line(";")?;
        }
        for stmt in block.statements() {
            self.write_statement(ent, stmt)?;
        }
        Ok(())
    }

    fn write_statement(&mut self, ent: &Entity, stmt: &Statement) -> WriteResult<()> {
        match stmt {
            Statement::Assign(a) => {
                let op = if a.blocking { "=" } else { "<=" };
                self.out.write_line(&format!(
                    "{} {op} {};",
                    a.lhs.verilog_str(ent)?,
                    a.rhs.verilog_str(ent)?
                ))?;
            }
            Statement::If(s) => self.write_if(ent, s)?,
            Statement::Case(c) => self.write_case(ent, c)?,
            Statement::Scoped(s) => self.write_scoped(ent, s.block, &s.body)?,
        }
        Ok(())
    }

    fn write_if(&mut self, ent: &Entity, stmt: &IfStatement) -> WriteResult<()> {
        let cond = stmt.cond.verilog_str(ent)?;
        self.write_block(ent, &format!("if ( {cond} ) "), stmt.then_body())?;
        let else_body = stmt.else_body();
        if else_body.is_null() {
            return Ok(());
        }
        if let [Statement::If(nested)] = else_body.statements() {
            self.out.write_partial("else ")?;
            self.write_if(ent, nested)
        } else {
            self.write_block(ent, "else ", else_body)
        }
    }

    fn write_case(&mut self, ent: &Entity, stmt: &CaseStatement) -> WriteResult<()> {
        self.out
            .open(&format!("case ( {} )", stmt.subject.verilog_str(ent)?))?;
        for arm in stmt.arms() {
            let label = arm.label.verilog_str(ent)?;
            self.write_block(ent, &format!("{label}: "), &arm.body)?;
        }
        if let Some(body) = stmt.default_body() {
            self.write_block(ent, "default: ", body)?;
        }
        self.out.close("endcase")?;
        Ok(())
    }

    fn write_scoped(
        &mut self,
        ent: &Entity,
        block: BlockId,
        body: &StatementBlock,
    ) -> WriteResult<()> {
        let name = require_name(ent.block(block).name(), "block", ent)?;
        self.out.open(&format!("begin: {name}"))?;
        self.write_declarations(ent, Scope::Block(block))?;
        self.write_statements(ent, body)?;
        self.out.close("end")?;
        Ok(())
    }

    fn write_instance(
        &mut self,
        mgr: &EntityManager,
        ent: &Entity,
        name: &str,
        inst: &Instance,
    ) -> WriteResult<()> {
        let child = mgr.entity(inst.entity());
        if inst.port_count() == 0 {
            self.out
                .write_line(&format!("{} {name}();", inst.entity_name()))?;
            return Ok(());
        }
        let mut lines = Vec::new();
        for binding in inst.bindings() {
            let port = child
                .port(binding.port)
                .name()
                .or(binding.port_name.as_deref());
            let port = require_name(port, "port", child)?;
            lines.push(vec![format!(".{port}({})", binding.net.verilog_str(ent)?)]);
        }
        self.out.open(&format!("{} {name}(", inst.entity_name()))?;
        self.out.write_lines(&lines, ",", "")?;
        self.out.close(");")?;
        Ok(())
    }

    fn write_lut(&mut self, ent: &Entity, lut: &Lut) -> WriteResult<()> {
        let output = lut.output().verilog_str(ent)?;
        let mut lines = Vec::new();
        for (input, value) in lut.rows() {
            let input = Expr::Constant(input.clone()).verilog_str(ent)?;
            let value = Expr::Constant(value.clone()).verilog_str(ent)?;
            lines.push(vec![format!("{input}:"), format!("{output} <= {value}")]);
        }
        lines.push(vec!["default:".to_string(), String::new()]);

        self.out.open("always @* begin")?;
        self.out
            .open(&format!("case ( {} )", lut.input().verilog_str(ent)?))?;
        self.out.write_lines(&lines, ";", ";")?;
        self.out.close("endcase")?;
        self.out.close("end")?;
        Ok(())
    }

    fn write_assigns(&mut self, ent: &Entity) -> WriteResult<()> {
        let mut lines = Vec::new();
        for assign in ent.assigns() {
            lines.push(vec![
                "assign".to_string(),
                assign.lhs.verilog_str(ent)?,
                "=".to_string(),
                assign.rhs.verilog_str(ent)?,
            ]);
        }
        self.out.write_lines(&lines, ";", ";")?;
        Ok(())
    }
}

impl<W: Write> HdlWriter for VerilogWriter<W> {
    fn language(&self) -> &'static str {
        "Verilog"
    }

    fn extension(&self) -> &'static str {
        "v"
    }

    fn options(&self) -> &WriterOptions {
        &self.options
    }

    fn render_entity(&mut self, mgr: &EntityManager, id: EntityId) -> WriteResult<()> {
        let ent = mgr.entity(id);
        debug!(module = %ent.name(), "rendering Verilog module");
        self.write_header(ent)?;
        self.out.inc_indent();
        self.write_declarations(ent, Scope::Entity)?;
        for (_, item) in ent.items() {
            match &item.kind {
                ItemKind::Process(p) => self.write_process(ent, p)?,
                ItemKind::Instance(inst) => {
                    let name = require_name(item.name(), "instance", ent)?;
                    self.write_instance(mgr, ent, name, inst)?;
                }
                ItemKind::Lut(lut) => self.write_lut(ent, lut)?,
            }
            self.out.write_line("")?;
        }
        self.write_assigns(ent)?;
        self.out.dec_indent();
        self.out
            .write_line(&format!("endmodule // {}", ent.name()))?;
        Ok(())
    }

    fn write_separator(&mut self) -> WriteResult<()> {
        self.out.write_line("")?;
        Ok(())
    }
}

/// Returns the signedness and range fields declaring `ty`.
///
/// Only bits and vectors can be declared; `name` identifies the object in
/// the error.
pub fn type_fields(ty: &DataType, name: &str) -> RtlResult<(&'static str, String)> {
    match ty {
        DataType::Bit => Ok(("", String::new())),
        DataType::BitVector(n) => Ok(("", format!("[{}:0]", msb(*n, name)?))),
        DataType::SignedBitVector(n) => Ok(("signed", format!("[{}:0]", msb(*n, name)?))),
        other => Err(RtlError::config(format!(
            "'{name}' has type {other}, which cannot be declared in Verilog"
        ))),
    }
}

/// Index of the top bit of an `n`-bit vector; zero-width vectors cannot be
/// declared.
pub(crate) fn msb(n: u32, name: &str) -> RtlResult<u32> {
    n.checked_sub(1)
        .ok_or_else(|| RtlError::config(format!("'{name}' is a zero-width vector")))
}

pub(crate) fn require_name<'a>(
    name: Option<&'a str>,
    kind: &str,
    ent: &Entity,
) -> RtlResult<&'a str> {
    name.ok_or_else(|| {
        RtlError::config(format!("unnamed {kind} in entity '{}'", ent.name()))
    })
}

fn edge(polarity: Polarity) -> &'static str {
    match polarity {
        Polarity::Positive => "posedge",
        Polarity::Negative => "negedge",
    }
}

fn level(sig: &Expr, polarity: Polarity, ent: &Entity) -> RtlResult<String> {
    let sig = sig.verilog_str(ent)?;
    Ok(match polarity {
        Polarity::Positive => sig,
        Polarity::Negative => format!("!{sig}"),
    })
}
