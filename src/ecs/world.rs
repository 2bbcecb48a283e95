//! World - central container for entities, component stores and subscriptions

use std::any::TypeId;
use std::collections::HashMap;
use std::time::Duration;

use super::component::{Component, ErasedStorage, KindId, KindSet, TypedStorage, MAX_KINDS};
use super::entity::EntityAllocator;
use super::filter::{Filter, FilterBuilder};
use super::subscription::{Subscription, SubscriptionId};
use super::Entity;

/// Owns every component store, creates and destroys entities, and keeps all
/// subscription membership lists exact after every mutation.
///
/// Membership maintenance is incremental: adding or removing one component
/// on one entity re-evaluates that single entity against each registered
/// subscription. A full scan happens only when a new subscription seeds its
/// initial membership.
pub struct World {
    entities: EntityAllocator,
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
    kind_ids: HashMap<TypeId, KindId>,
    kind_names: Vec<&'static str>,
    present: HashMap<Entity, KindSet>,
    subscriptions: Vec<Subscription>,
    time_delta: Duration,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            storages: HashMap::new(),
            kind_ids: HashMap::new(),
            kind_names: Vec::new(),
            present: HashMap::new(),
            subscriptions: Vec::new(),
            time_delta: Duration::ZERO,
        }
    }

    /// Create a new entity with no components.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.allocate();
        self.present.insert(entity, KindSet::EMPTY);
        entity
    }

    /// Destroy an entity: every store drops its component, every
    /// subscription drops its membership, then the id is released for reuse.
    pub fn destroy_entity(&mut self, entity: Entity) {
        if !self.entities.is_alive(entity) {
            return;
        }
        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }
        self.present.remove(&entity);
        for subscription in &mut self.subscriptions {
            subscription.remove(entity);
        }
        self.entities.deallocate(entity);
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.count()
    }

    /// Kind id for a component type, assigned on first use.
    pub fn kind_id<T: Component>(&mut self) -> KindId {
        let type_id = TypeId::of::<T>();
        if let Some(kind) = self.kind_ids.get(&type_id) {
            return *kind;
        }
        let next = self.kind_names.len() as u32;
        assert!(next < MAX_KINDS, "component kind limit ({MAX_KINDS}) reached");
        let kind = KindId(next);
        self.kind_ids.insert(type_id, kind);
        self.kind_names.push(std::any::type_name::<T>());
        kind
    }

    pub(crate) fn kind_name(&self, kind: KindId) -> &'static str {
        self.kind_names[kind.raw() as usize]
    }

    /// Start building a filter against this world's component kinds.
    pub fn filter(&mut self) -> FilterBuilder<'_> {
        FilterBuilder::new(self)
    }

    /// Register a filter and seed its membership with one full scan. The
    /// returned handle stays valid for the lifetime of the world.
    pub fn subscribe(&mut self, filter: Filter) -> SubscriptionId {
        let mut subscription = Subscription::new(filter);
        let mut seed: Vec<(Entity, KindSet)> =
            self.present.iter().map(|(e, kinds)| (*e, *kinds)).collect();
        seed.sort_by_key(|(entity, _)| *entity);
        for (entity, kinds) in seed {
            if filter.matches(kinds) {
                subscription.update(entity, true);
            }
        }
        let id = SubscriptionId(self.subscriptions.len());
        self.subscriptions.push(subscription);
        id
    }

    /// Entities currently matching a subscription, in insertion order.
    pub fn entities(&self, subscription: SubscriptionId) -> &[Entity] {
        self.subscriptions[subscription.0].entities()
    }

    pub fn subscription_filter(&self, subscription: SubscriptionId) -> &Filter {
        self.subscriptions[subscription.0].filter()
    }

    /// Attach a component to an entity. Attaching a kind the entity already
    /// has replaces the value without touching subscriptions.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) {
        if !self.entities.is_alive(entity) {
            return;
        }
        let kind = self.kind_id::<T>();
        let storage = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypedStorage::<T>::new()));
        let storage = storage
            .as_any_mut()
            .downcast_mut::<TypedStorage<T>>()
            .expect("storage type matches its TypeId key");
        if storage.insert(entity, component) {
            self.on_kind_added(entity, kind);
        }
    }

    /// Detach and return a component. Removing an absent kind is a no-op.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        let kind = self.kind_id::<T>();
        let removed = self
            .typed_storage_mut::<T>()
            .and_then(|storage| storage.remove(entity));
        if removed.is_some() {
            self.on_kind_removed(entity, kind);
        }
        removed
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.typed_storage::<T>()?.get(entity)
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.typed_storage_mut::<T>()?.get_mut(entity)
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.typed_storage::<T>()
            .map(|storage| storage.has(entity))
            .unwrap_or(false)
    }

    /// The kinds currently present on an entity.
    pub fn kinds_of(&self, entity: Entity) -> KindSet {
        self.present.get(&entity).copied().unwrap_or(KindSet::EMPTY)
    }

    /// Elapsed wall time the current frame represents.
    pub fn time_delta(&self) -> Duration {
        self.time_delta
    }

    pub fn set_time_delta(&mut self, delta: Duration) {
        self.time_delta = delta;
    }

    fn typed_storage<T: Component>(&self) -> Option<&TypedStorage<T>> {
        self.storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<TypedStorage<T>>()
    }

    fn typed_storage_mut<T: Component>(&mut self) -> Option<&mut TypedStorage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<TypedStorage<T>>()
    }

    fn on_kind_added(&mut self, entity: Entity, kind: KindId) {
        if let Some(kinds) = self.present.get_mut(&entity) {
            kinds.insert(kind);
        }
        self.refresh_membership(entity);
    }

    fn on_kind_removed(&mut self, entity: Entity, kind: KindId) {
        if let Some(kinds) = self.present.get_mut(&entity) {
            kinds.remove(kind);
        }
        self.refresh_membership(entity);
    }

    /// Re-evaluate one entity against every subscription. O(subscriptions)
    /// per component mutation; never rescans other entities.
    fn refresh_membership(&mut self, entity: Entity) {
        let kinds = self.kinds_of(entity);
        for subscription in &mut self.subscriptions {
            let matching = subscription.filter().matches(kinds);
            subscription.update(entity, matching);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
