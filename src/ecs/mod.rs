//! Entity-component substrate: stores, filters and live subscriptions

mod component;
mod entity;
mod filter;
mod subscription;
mod world;

pub use component::{Component, KindId, KindSet, TypedStorage, MAX_KINDS};
pub use entity::{Entity, EntityAllocator};
pub use filter::{Filter, FilterBuilder, FilterError};
pub use subscription::SubscriptionId;
pub use world::World;
