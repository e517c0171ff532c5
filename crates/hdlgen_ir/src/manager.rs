//! The entity manager: owner of every entity in a design.

use crate::arena::Arena;
use crate::entity::{Entity, ItemKind};
use crate::expr::Expr;
use crate::ids::{EntityId, ItemId};
use crate::namespace::NameTemplates;
use hdlgen_common::{RtlError, RtlResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Owns the entities of a design and the instance relations between them.
///
/// ```
/// use hdlgen_ir::{DataType, EntityManager};
///
/// let mut mgr = EntityManager::new();
/// let top = mgr.create_entity("top").unwrap();
/// let leaf = mgr.create_entity("leaf").unwrap();
/// mgr.entity_mut(leaf).add_input_port(Some("a"), DataType::Bit).unwrap();
/// mgr.add_instance(top, leaf, Some("u0")).unwrap();
/// assert_eq!(mgr.entity_list(top), vec![top, leaf]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityManager {
    entities: Arena<EntityId, Entity>,
    by_name: HashMap<String, EntityId>,
}

impl EntityManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty entity; entity names are unique per manager.
    pub fn create_entity(&mut self, name: &str) -> RtlResult<EntityId> {
        if name.is_empty() {
            return Err(RtlError::config("entity name must not be empty"));
        }
        if self.by_name.contains_key(name) {
            return Err(RtlError::NameCollision {
                scope: "design".to_string(),
                name: name.to_string(),
            });
        }
        let id = self.entities.alloc(Entity::new(name));
        self.by_name.insert(name.to_string(), id);
        debug!(entity = name, "created entity");
        Ok(id)
    }

    /// Returns the entity `id`.
    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id]
    }

    /// Returns the entity `id` mutably.
    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id]
    }

    /// Finds an entity by name.
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).copied()
    }

    /// Returns the number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity was created.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over all entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Instantiates `child` inside `parent`.
    ///
    /// One fresh net per port of `child` is added to `parent`, typed as the
    /// port. Port names are captured now; ports added to `child` later are
    /// not part of this instance.
    pub fn add_instance(
        &mut self,
        parent: EntityId,
        child: EntityId,
        name: Option<&str>,
    ) -> RtlResult<ItemId> {
        let child_entity = &self.entities[child];
        let child_name = child_entity.name().to_string();
        let ports = child_entity
            .ports()
            .map(|(id, p)| (id, p.name().map(str::to_string), p.data_type.clone()))
            .collect();
        self.entities[parent].add_instance_item(name, child, child_name, ports)
    }

    /// Returns the net in `parent` bound to the port named `name` of the
    /// instance `item`.
    ///
    /// Ports are matched by their current name, so a port that was anonymous
    /// when the instance was created is found by its resolved name.
    pub fn instance_port(&self, parent: EntityId, item: ItemId, name: &str) -> RtlResult<&Expr> {
        let owner = &self.entities[parent];
        let inst = owner.instance(item).ok_or_else(|| {
            RtlError::config(format!(
                "item {} of entity '{}' is not an instance",
                item.as_raw(),
                owner.name()
            ))
        })?;
        let child = &self.entities[inst.entity()];
        inst.bindings()
            .iter()
            .find(|b| child.port(b.port).name().or(b.port_name.as_deref()) == Some(name))
            .map(|b| &b.net)
            .ok_or_else(|| RtlError::UnknownPort {
                entity: inst.entity_name().to_string(),
                port: name.to_string(),
            })
    }

    /// Returns the entities instantiated directly by `id`, in item order.
    pub fn children(&self, id: EntityId) -> Vec<EntityId> {
        self.entities[id]
            .items()
            .filter_map(|(_, item)| match &item.kind {
                ItemKind::Instance(inst) => Some(inst.entity()),
                _ => None,
            })
            .collect()
    }

    /// Returns `top` and every entity reachable from it by instantiation.
    ///
    /// Depth-first in discovery order, `top` first, each entity once.
    pub fn entity_list(&self, top: EntityId) -> Vec<EntityId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        self.visit(top, &mut visited, &mut order);
        order
    }

    fn visit(&self, id: EntityId, visited: &mut HashSet<EntityId>, order: &mut Vec<EntityId>) {
        if !visited.insert(id) {
            return;
        }
        order.push(id);
        for child in self.children(id) {
            self.visit(child, visited, order);
        }
    }

    /// Resolves anonymous names in every entity reachable from `top`.
    pub fn resolve_names(&mut self, top: EntityId, templates: &NameTemplates) -> RtlResult<()> {
        for id in self.entity_list(top) {
            self.entities[id].resolve_names(templates)?;
        }
        Ok(())
    }

    /// Resolves names below `top`, seals those entities, and returns them in
    /// [`EntityManager::entity_list`] order.
    pub fn prepare_render(
        &mut self,
        top: EntityId,
        templates: &NameTemplates,
    ) -> RtlResult<Vec<EntityId>> {
        let list = self.entity_list(top);
        for &id in &list {
            let entity = &mut self.entities[id];
            entity.resolve_names(templates)?;
            entity.seal();
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn duplicate_entity_name() {
        let mut mgr = EntityManager::new();
        mgr.create_entity("a").unwrap();
        assert_eq!(
            mgr.create_entity("a").unwrap_err(),
            RtlError::NameCollision {
                scope: "design".to_string(),
                name: "a".to_string()
            }
        );
        assert_eq!(mgr.len(), 1);
        assert!(mgr.create_entity("").is_err());
    }

    #[test]
    fn find_by_name() {
        let mut mgr = EntityManager::new();
        let a = mgr.create_entity("a").unwrap();
        assert_eq!(mgr.find("a"), Some(a));
        assert_eq!(mgr.find("b"), None);
        assert_eq!(mgr.entity(a).name(), "a");
    }

    #[test]
    fn instance_allocates_typed_nets() {
        let mut mgr = EntityManager::new();
        let top = mgr.create_entity("top").unwrap();
        let add = mgr.create_entity("add").unwrap();
        mgr.entity_mut(add)
            .add_input_port(Some("a"), DataType::bitvector(4))
            .unwrap();
        mgr.entity_mut(add)
            .add_output_port(Some("s"), DataType::bitvector(5), None)
            .unwrap();
        let item = mgr.add_instance(top, add, Some("u_add")).unwrap();
        let inst = mgr.entity(top).instance(item).unwrap();
        assert_eq!(inst.port_count(), 2);
        assert_eq!(
            inst.port_by_name("s").unwrap().data_type(),
            DataType::bitvector(5)
        );
        assert!(matches!(
            inst.port_by_name("c"),
            Err(RtlError::UnknownPort { .. })
        ));
        assert_eq!(mgr.entity(top).nets().count(), 2);
    }

    #[test]
    fn instance_port_by_resolved_name() {
        let mut mgr = EntityManager::new();
        let top = mgr.create_entity("top").unwrap();
        let leaf = mgr.create_entity("leaf").unwrap();
        mgr.entity_mut(leaf).add_input_port(Some("a"), DataType::Bit).unwrap();
        mgr.entity_mut(leaf).add_input_port(None, DataType::bitvector(2)).unwrap();
        let item = mgr.add_instance(top, leaf, Some("u0")).unwrap();
        assert!(mgr.entity(top).instance(item).unwrap().port_by_name("port2").is_err());

        mgr.resolve_names(top, &NameTemplates::default()).unwrap();
        let net = mgr.instance_port(top, item, "port2").unwrap();
        assert_eq!(net.data_type(), DataType::bitvector(2));
        assert!(mgr.instance_port(top, item, "a").is_ok());
        assert!(matches!(
            mgr.instance_port(top, item, "b"),
            Err(RtlError::UnknownPort { .. })
        ));

        let p = mgr.entity_mut(top).add_comb_process(None).unwrap();
        assert!(matches!(
            mgr.instance_port(top, p, "a"),
            Err(RtlError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn instance_name_collision_allocates_nothing() {
        let mut mgr = EntityManager::new();
        let top = mgr.create_entity("top").unwrap();
        let leaf = mgr.create_entity("leaf").unwrap();
        mgr.entity_mut(leaf).add_input_port(Some("a"), DataType::Bit).unwrap();
        mgr.add_instance(top, leaf, Some("u0")).unwrap();
        assert!(mgr.add_instance(top, leaf, Some("u0")).is_err());
        assert_eq!(mgr.entity(top).nets().count(), 1);
    }

    #[test]
    fn entity_list_visits_diamond_once() {
        let mut mgr = EntityManager::new();
        let top = mgr.create_entity("top").unwrap();
        let l = mgr.create_entity("l").unwrap();
        let r = mgr.create_entity("r").unwrap();
        let bottom = mgr.create_entity("bottom").unwrap();
        mgr.add_instance(top, l, None).unwrap();
        mgr.add_instance(top, r, None).unwrap();
        mgr.add_instance(l, bottom, None).unwrap();
        mgr.add_instance(r, bottom, None).unwrap();
        assert_eq!(mgr.entity_list(top), vec![top, l, bottom, r]);
        assert_eq!(mgr.entity_list(r), vec![r, bottom]);
    }

    #[test]
    fn entity_list_survives_self_reference() {
        let mut mgr = EntityManager::new();
        let top = mgr.create_entity("top").unwrap();
        mgr.add_instance(top, top, None).unwrap();
        assert_eq!(mgr.entity_list(top), vec![top]);
    }

    #[test]
    fn prepare_render_seals_reachable_entities() {
        let mut mgr = EntityManager::new();
        let top = mgr.create_entity("top").unwrap();
        let leaf = mgr.create_entity("leaf").unwrap();
        let other = mgr.create_entity("other").unwrap();
        mgr.add_instance(top, leaf, None).unwrap();
        let list = mgr.prepare_render(top, &NameTemplates::default()).unwrap();
        assert_eq!(list, vec![top, leaf]);
        assert!(mgr.entity(top).is_sealed());
        assert!(mgr.entity(leaf).is_sealed());
        assert!(!mgr.entity(other).is_sealed());
        let item = mgr.entity(top).items().next().map(|(_, i)| i.name());
        assert_eq!(item, Some(Some("item1")));
    }
}
