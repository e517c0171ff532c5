//! Name tables and anonymous-name generation.
//!
//! Every entity has one flat namespace shared by its ports, nets,
//! variables, items and top-level named blocks. Each named block opens a
//! nested namespace for the nets, variables and blocks declared inside it.

use crate::ids::{BlockId, ItemId, NetId, PortId, VarId};
use hdlgen_common::{RtlError, RtlResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The object a name is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameOwner {
    /// A port.
    Port(PortId),
    /// A net.
    Net(NetId),
    /// A variable.
    Var(VarId),
    /// A process, instance or LUT.
    Item(ItemId),
    /// A named statement block.
    Block(BlockId),
}

/// Where a declaration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scope {
    /// The entity's own namespace.
    #[default]
    Entity,
    /// The namespace of a named block.
    Block(BlockId),
}

/// A namespace mapping names to the objects that own them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameTable {
    names: HashMap<String, NameOwner>,
}

impl NameTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `name` is taken.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Returns the owner of `name`.
    pub fn lookup(&self, name: &str) -> Option<NameOwner> {
        self.names.get(name).copied()
    }

    /// Fails with [`RtlError::NameCollision`] if `name` is taken.
    ///
    /// `scope` names the table's owner in the error message.
    pub fn check(&self, scope: &str, name: &str) -> RtlResult<()> {
        if self.contains(name) {
            return Err(RtlError::NameCollision {
                scope: scope.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Binds `name` to `owner` after a successful [`NameTable::check`].
    pub(crate) fn bind(&mut self, name: &str, owner: NameOwner) {
        self.names.insert(name.to_string(), owner);
    }

    /// Returns the first `template` expansion, counting up from 1, not in use.
    pub fn fresh(&self, template: &str) -> String {
        fresh_across(template, &[self])
    }

    /// Returns the number of bound names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over all bound names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }
}

/// Category of an anonymous object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// A port.
    Port,
    /// A net.
    Net,
    /// A variable.
    Var,
    /// A process, instance or LUT.
    Item,
    /// A named block.
    Block,
}

/// Templates used to name anonymous objects.
///
/// Each template contains exactly one `{}`, replaced by a counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTemplates {
    /// Template for ports.
    pub port: String,
    /// Template for nets.
    pub net: String,
    /// Template for variables.
    pub var: String,
    /// Template for items.
    pub item: String,
    /// Template for named blocks.
    pub block: String,
}

impl Default for NameTemplates {
    fn default() -> Self {
        Self {
            port: "port{}".to_string(),
            net: "net{}".to_string(),
            var: "var{}".to_string(),
            item: "item{}".to_string(),
            block: "block{}".to_string(),
        }
    }
}

impl NameTemplates {
    /// Returns the template for `kind`.
    pub fn template(&self, kind: NameKind) -> &str {
        match kind {
            NameKind::Port => &self.port,
            NameKind::Net => &self.net,
            NameKind::Var => &self.var,
            NameKind::Item => &self.item,
            NameKind::Block => &self.block,
        }
    }

    /// Checks that every template has exactly one `{}` placeholder.
    pub fn validate(&self) -> RtlResult<()> {
        for (field, template) in [
            ("port", &self.port),
            ("net", &self.net),
            ("var", &self.var),
            ("item", &self.item),
            ("block", &self.block),
        ] {
            if template.matches("{}").count() != 1 {
                return Err(RtlError::config(format!(
                    "{field} name template '{template}' must contain exactly one '{{}}'"
                )));
            }
        }
        Ok(())
    }
}

/// Returns the first `template` expansion, counting up from 1, taken in
/// none of `tables`.
pub fn fresh_across(template: &str, tables: &[&NameTable]) -> String {
    (1u32..)
        .map(|n| expand(template, n))
        .find(|candidate| tables.iter().all(|t| !t.contains(candidate)))
        .unwrap_or_default()
}

fn expand(template: &str, n: u32) -> String {
    template.replacen("{}", &n.to_string(), 1)
}
