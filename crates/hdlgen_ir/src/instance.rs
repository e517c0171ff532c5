//! Instances of one entity inside another.

use crate::expr::Expr;
use crate::ids::{EntityId, PortId};
use crate::types::DataType;
use hdlgen_common::{RtlError, RtlResult};
use serde::{Deserialize, Serialize};

/// Connection of one port of the instantiated entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortBinding {
    /// The port on the instantiated entity.
    pub port: PortId,
    /// The port's name when the instance was created.
    pub port_name: Option<String>,
    /// The port's type.
    pub data_type: DataType,
    /// The net in the parent entity bound to the port.
    pub net: Expr,
}

/// An instance item.
///
/// Creating an instance allocates one net in the parent per port of the
/// instantiated entity, typed as that port. Host code wires the instance by
/// connecting those nets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    entity: EntityId,
    entity_name: String,
    bindings: Vec<PortBinding>,
}

impl Instance {
    pub(crate) fn new(entity: EntityId, entity_name: String, bindings: Vec<PortBinding>) -> Self {
        Self {
            entity,
            entity_name,
            bindings,
        }
    }

    /// The instantiated entity.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Name of the instantiated entity.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// All port bindings in port order.
    pub fn bindings(&self) -> &[PortBinding] {
        &self.bindings
    }

    /// Returns the binding of the port at `pos`.
    pub fn port(&self, pos: usize) -> Option<&PortBinding> {
        self.bindings.get(pos)
    }

    /// Returns the parent-side net bound to the port named `name`.
    ///
    /// Only names the child's ports had when the instance was created are
    /// known here; use
    /// [`EntityManager::instance_port`](crate::EntityManager::instance_port)
    /// to match resolved names.
    pub fn port_by_name(&self, name: &str) -> RtlResult<&Expr> {
        self.bindings
            .iter()
            .find(|b| b.port_name.as_deref() == Some(name))
            .map(|b| &b.net)
            .ok_or_else(|| RtlError::UnknownPort {
                entity: self.entity_name.clone(),
                port: name.to_string(),
            })
    }

    /// Returns the number of bound ports.
    pub fn port_count(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NetId;

    fn sample() -> Instance {
        Instance::new(
            EntityId::from_raw(1),
            "adder".to_string(),
            vec![
                PortBinding {
                    port: PortId::from_raw(0),
                    port_name: Some("a".to_string()),
                    data_type: DataType::bitvector(4),
                    net: Expr::net(NetId::from_raw(0), DataType::bitvector(4)),
                },
                PortBinding {
                    port: PortId::from_raw(1),
                    port_name: None,
                    data_type: DataType::Bit,
                    net: Expr::net(NetId::from_raw(1), DataType::Bit),
                },
            ],
        )
    }

    #[test]
    fn positional_access() {
        let inst = sample();
        assert_eq!(inst.port_count(), 2);
        assert_eq!(inst.port(1).map(|b| b.port), Some(PortId::from_raw(1)));
        assert!(inst.port(2).is_none());
    }

    #[test]
    fn keyed_access() {
        let inst = sample();
        assert_eq!(
            inst.port_by_name("a").unwrap(),
            &Expr::net(NetId::from_raw(0), DataType::bitvector(4))
        );
    }

    #[test]
    fn unknown_port_name() {
        let inst = sample();
        assert_eq!(
            inst.port_by_name("carry").unwrap_err(),
            RtlError::UnknownPort {
                entity: "adder".to_string(),
                port: "carry".to_string()
            }
        );
    }
}
