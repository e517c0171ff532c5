//! Reference counting over an entity's expressions.
//!
//! The counts are a hint for hosts that want to know whether a value is
//! consumed more than once (and so deserves its own net). Writers do not
//! depend on them.

use crate::entity::{Entity, ItemKind};
use crate::expr::{Expr, Leaf};
use std::collections::HashMap;

/// How many times each port, net and variable is referenced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageMap {
    counts: HashMap<Leaf, usize>,
}

impl UsageMap {
    /// Counts every reference in `entity`: continuous assignments, process
    /// bodies and clocking, instance bindings and LUT nets.
    pub fn of(entity: &Entity) -> Self {
        let mut map = UsageMap::default();
        let mut record = |e: &Expr| {
            e.for_each_leaf(&mut |leaf| *map.counts.entry(leaf).or_default() += 1)
        };
        for assign in entity.assigns() {
            record(&assign.lhs);
            record(&assign.rhs);
        }
        for (_, item) in entity.items() {
            match &item.kind {
                ItemKind::Process(p) => p.for_each_expr(&mut record),
                ItemKind::Instance(inst) => {
                    for binding in inst.bindings() {
                        record(&binding.net);
                    }
                }
                ItemKind::Lut(lut) => {
                    record(lut.input());
                    record(lut.output());
                }
            }
        }
        map
    }

    /// Number of references to `leaf`.
    pub fn count(&self, leaf: Leaf) -> usize {
        self.counts.get(&leaf).copied().unwrap_or(0)
    }

    /// Returns `true` when `leaf` has more than one consumer.
    pub fn needs_net(&self, leaf: Leaf) -> bool {
        self.count(leaf) > 1
    }
}
