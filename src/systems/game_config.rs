use std::ffi::OsStr;

use anyhow::Result;
use tracing::{info, warn};

use crate::components::{Dirty, FilePath, FileHandle, FileType, GameConfig};
use crate::ecs::{Entity, SubscriptionId, World};
use crate::scheduler::System;

/// Well-known name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Decodes the game configuration file and owns the `Dirty` flag on loaded
/// configs.
///
/// Two subscriptions: entities with an open handle that still lack a
/// config (candidates), and entities that already carry one (products).
/// Because the candidate filter forbids `GameConfig`, attaching the decoded
/// config atomically removes the entity from the candidate list — the
/// decode can only ever run once per entity.
///
/// Each frame the dirty-clear pass runs before the decode pass, so a fresh
/// decode reads as dirty for the remainder of its frame and as clean from
/// the next frame on.
pub struct GameConfigSystem {
    candidates: Option<SubscriptionId>,
    configs: Option<SubscriptionId>,
}

impl GameConfigSystem {
    pub fn new() -> Self {
        Self {
            candidates: None,
            configs: None,
        }
    }

    fn clear_dirty(&self, world: &mut World, entities: &[Entity]) {
        for &entity in entities {
            match world.get_component_mut::<Dirty>(entity) {
                Some(dirty) => dirty.is_dirty = false,
                // First observation: create the flag, as clean.
                None => world.add_component(entity, Dirty { is_dirty: false }),
            }
        }
    }

    fn check_for_new_config(&self, world: &mut World, entities: &[Entity]) {
        for &entity in entities {
            let is_config = world
                .get_component::<FilePath>(entity)
                .map(|fp| fp.path.file_name() == Some(OsStr::new(CONFIG_FILE_NAME)))
                .unwrap_or(false);
            let is_json = world.get_component::<FileType>(entity) == Some(&FileType::Json);
            if !is_config || !is_json {
                continue;
            }
            self.load_config(world, entity);
        }
    }

    fn load_config(&self, world: &mut World, entity: Entity) {
        let decoded = match world.get_component::<FileHandle>(entity) {
            Some(handle) => serde_json::from_slice::<GameConfig>(&handle.data),
            None => return,
        };
        match decoded {
            Ok(config) => {
                info!(entity = entity.index(), difficulty = %config.difficulty, "game config loaded");
                world.add_component(entity, config);
                match world.get_component_mut::<Dirty>(entity) {
                    Some(dirty) => dirty.is_dirty = true,
                    None => world.add_component(entity, Dirty { is_dirty: true }),
                }
            }
            // Nothing gets attached; the entity stays a candidate and the
            // failure never aborts sibling entities in this pass.
            Err(err) => warn!(entity = entity.index(), %err, "game config decode failed"),
        }
    }
}

impl Default for GameConfigSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for GameConfigSystem {
    fn name(&self) -> &str {
        "game_config"
    }

    fn init(&mut self, world: &mut World) -> Result<()> {
        let candidates = world
            .filter()
            .require::<FilePath>()
            .require::<FileType>()
            .require::<FileHandle>()
            .forbid::<GameConfig>()
            .build()?;
        let configs = world.filter().require::<GameConfig>().build()?;
        self.candidates = Some(world.subscribe(candidates));
        self.configs = Some(world.subscribe(configs));
        Ok(())
    }

    fn process(&mut self, world: &mut World) -> Result<()> {
        let (Some(candidates), Some(configs)) = (self.candidates, self.configs) else {
            return Ok(());
        };
        let loaded: Vec<_> = world.entities(configs).to_vec();
        self.clear_dirty(world, &loaded);

        let waiting: Vec<_> = world.entities(candidates).to_vec();
        self.check_for_new_config(world, &waiting);
        Ok(())
    }
}
