use anyhow::Result;

use crate::components::{Position, Velocity};
use crate::ecs::{SubscriptionId, World};
use crate::scheduler::System;

/// Advances kinematic state: `position += velocity * dt` for every entity
/// carrying both components. No state transitions, no error conditions.
pub struct MovementSystem {
    moving: Option<SubscriptionId>,
}

impl MovementSystem {
    pub fn new() -> Self {
        Self { moving: None }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn init(&mut self, world: &mut World) -> Result<()> {
        let filter = world
            .filter()
            .require::<Position>()
            .require::<Velocity>()
            .build()?;
        self.moving = Some(world.subscribe(filter));
        Ok(())
    }

    fn process(&mut self, world: &mut World) -> Result<()> {
        let Some(moving) = self.moving else {
            return Ok(());
        };
        let dt = world.time_delta().as_secs_f64();
        let entities: Vec<_> = world.entities(moving).to_vec();
        for entity in entities {
            // The subscription guarantees both components; the re-check is
            // defensive, matching entities are skipped silently otherwise.
            let Some(velocity) = world.get_component::<Velocity>(entity).copied() else {
                continue;
            };
            let Some(position) = world.get_component_mut::<Position>(entity) else {
                continue;
            };
            position.0 += velocity.0 * dt;
        }
        Ok(())
    }
}
