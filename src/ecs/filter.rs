//! Filters - immutable predicates over an entity's component kinds

use thiserror::Error;

use super::component::{Component, KindSet};
use super::World;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("component kind '{kind}' is both required and forbidden")]
    RequiredAndForbidden { kind: &'static str },
}

/// Matches entities whose component-kind set contains every required kind
/// and none of the forbidden ones. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    required: KindSet,
    forbidden: KindSet,
}

impl Filter {
    pub fn matches(&self, present: KindSet) -> bool {
        present.contains_all(self.required) && present.is_disjoint(self.forbidden)
    }

    pub fn required(&self) -> KindSet {
        self.required
    }

    pub fn forbidden(&self) -> KindSet {
        self.forbidden
    }
}

/// Fluent filter construction, obtained from [`World::filter`]. Kind ids are
/// allocated in the world as a side effect, so a filter may name kinds no
/// entity carries yet.
pub struct FilterBuilder<'w> {
    world: &'w mut World,
    required: KindSet,
    forbidden: KindSet,
}

impl<'w> FilterBuilder<'w> {
    pub(crate) fn new(world: &'w mut World) -> Self {
        Self {
            world,
            required: KindSet::EMPTY,
            forbidden: KindSet::EMPTY,
        }
    }

    pub fn require<T: Component>(mut self) -> Self {
        let kind = self.world.kind_id::<T>();
        self.required.insert(kind);
        self
    }

    pub fn forbid<T: Component>(mut self) -> Self {
        let kind = self.world.kind_id::<T>();
        self.forbidden.insert(kind);
        self
    }

    pub fn build(self) -> Result<Filter, FilterError> {
        if let Some(kind) = self.required.first_common(self.forbidden) {
            return Err(FilterError::RequiredAndForbidden {
                kind: self.world.kind_name(kind),
            });
        }
        Ok(Filter {
            required: self.required,
            forbidden: self.forbidden,
        })
    }
}
