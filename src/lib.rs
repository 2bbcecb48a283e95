pub mod components;
pub mod ecs;
pub mod fetch;
pub mod math;
pub mod object;
pub mod scheduler;
pub mod systems;

pub use ecs::{Entity, Filter, FilterError, SubscriptionId, World};
pub use scheduler::{FrameStats, Scheduler, System};
