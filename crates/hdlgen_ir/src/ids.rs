//! Opaque ID newtypes for model objects.
//!
//! Port, net, variable, item and block IDs are local to the entity that
//! allocated them; entity IDs are local to the [`EntityManager`](crate::EntityManager).

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// ID of an entity within an [`EntityManager`](crate::EntityManager).
    EntityId
);

define_id!(
    /// ID of a port on an entity.
    PortId
);

define_id!(
    /// ID of a net (wire or register) within an entity.
    NetId
);

define_id!(
    /// ID of a variable within an entity.
    VarId
);

define_id!(
    /// ID of an item (process, instance or LUT) within an entity.
    ItemId
);

define_id!(
    /// ID of a named statement block within an entity.
    BlockId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        assert_eq!(NetId::from_raw(42).as_raw(), 42);
        assert_eq!(<ItemId as ArenaId>::from_raw(3).as_raw(), 3);
    }

    #[test]
    fn ids_hash_by_value() {
        let mut set = HashSet::new();
        set.insert(PortId::from_raw(1));
        set.insert(PortId::from_raw(1));
        set.insert(PortId::from_raw(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn ids_order_by_index() {
        assert!(EntityId::from_raw(0) < EntityId::from_raw(1));
    }
}
