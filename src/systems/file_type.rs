use anyhow::Result;
use tracing::debug;

use crate::components::{FilePath, FileType};
use crate::ecs::{SubscriptionId, World};
use crate::scheduler::System;

/// First stage of the load pipeline: classifies files by extension.
/// Matches entities that have a path but no resolved type yet; attaching
/// the type moves the entity out of this subscription for good.
pub struct FileTypeResolver {
    unresolved: Option<SubscriptionId>,
}

impl FileTypeResolver {
    pub fn new() -> Self {
        Self { unresolved: None }
    }
}

impl Default for FileTypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl System for FileTypeResolver {
    fn name(&self) -> &str {
        "file_type"
    }

    fn init(&mut self, world: &mut World) -> Result<()> {
        let filter = world
            .filter()
            .require::<FilePath>()
            .forbid::<FileType>()
            .build()?;
        self.unresolved = Some(world.subscribe(filter));
        Ok(())
    }

    fn process(&mut self, world: &mut World) -> Result<()> {
        let Some(unresolved) = self.unresolved else {
            return Ok(());
        };
        let entities: Vec<_> = world.entities(unresolved).to_vec();
        for entity in entities {
            let file_type = match world.get_component::<FilePath>(entity) {
                Some(file_path) => FileType::from_path(&file_path.path),
                None => continue,
            };
            debug!(entity = entity.index(), ?file_type, "resolved file type");
            world.add_component(entity, file_type);
        }
        Ok(())
    }
}
