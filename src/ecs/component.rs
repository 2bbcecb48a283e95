//! Component kinds and per-kind storage

use std::any::Any;
use std::collections::HashMap;

use super::Entity;

/// Trait for components. A component is a plain value attached to at most
/// one entity per kind at a time.
pub trait Component: Send + Sync + 'static {}

/// A small integer identifying a component kind within one world. Assigned
/// on first use; stable for the lifetime of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId(pub(crate) u32);

impl KindId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Maximum number of distinct component kinds per world.
pub const MAX_KINDS: u32 = 128;

/// Bitset over component kinds. Filter matching reduces to containment and
/// disjointness tests on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KindSet(u128);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);

    pub fn insert(&mut self, kind: KindId) {
        self.0 |= 1u128 << kind.0;
    }

    pub fn remove(&mut self, kind: KindId) {
        self.0 &= !(1u128 << kind.0);
    }

    pub fn contains(&self, kind: KindId) -> bool {
        self.0 & (1u128 << kind.0) != 0
    }

    pub fn contains_all(&self, other: KindSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_disjoint(&self, other: KindSet) -> bool {
        self.0 & other.0 == 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Lowest kind id present in both sets, if any.
    pub fn first_common(&self, other: KindSet) -> Option<KindId> {
        let both = self.0 & other.0;
        if both == 0 {
            None
        } else {
            Some(KindId(both.trailing_zeros()))
        }
    }
}

/// Type-erased view of a storage, for operations the world applies across
/// every kind (entity destruction, presence checks).
pub(crate) trait ErasedStorage: Send + Sync {
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn has(&self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Concrete storage for a specific component type. The world exclusively
/// owns these; systems borrow values only for the duration of an access.
pub struct TypedStorage<T: Component> {
    data: HashMap<Entity, T>,
}

impl<T: Component> TypedStorage<T> {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Returns true when the entity did not already have this kind.
    pub fn insert(&mut self, entity: Entity, component: T) -> bool {
        self.data.insert(entity, component).is_none()
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        self.data.remove(&entity)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.data.get(&entity)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.data.get_mut(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.data.iter().map(|(entity, value)| (*entity, value))
    }
}

impl<T: Component> Default for TypedStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ErasedStorage for TypedStorage<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.data.remove(&entity).is_some()
    }

    fn has(&self, entity: Entity) -> bool {
        self.data.contains_key(&entity)
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
