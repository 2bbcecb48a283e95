//! Subscriptions - live membership lists maintained by the world

use std::collections::HashSet;

use super::filter::Filter;
use super::Entity;

/// Handle to a subscription registered with a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) usize);

/// The entities currently satisfying one filter, in insertion order. Only
/// the world mutates this; systems read the list through the world.
pub(crate) struct Subscription {
    filter: Filter,
    members: Vec<Entity>,
    index: HashSet<Entity>,
}

impl Subscription {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            members: Vec::new(),
            index: HashSet::new(),
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn entities(&self) -> &[Entity] {
        &self.members
    }

    /// Reconcile one entity against the membership list.
    pub fn update(&mut self, entity: Entity, matching: bool) {
        if matching {
            if self.index.insert(entity) {
                self.members.push(entity);
            }
        } else {
            self.remove(entity);
        }
    }

    pub fn remove(&mut self, entity: Entity) {
        if self.index.remove(&entity) {
            self.members.retain(|member| *member != entity);
        }
    }
}
