use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::components::{FilePath, FileSource, FileType};
use crate::ecs::{SubscriptionId, World};
use crate::scheduler::System;

/// Second stage: picks the source a file will be read from. The resolver
/// owns its list of root directories; an entity whose path exists under
/// none of them simply stays at this stage and is re-checked next frame.
pub struct FileSourceResolver {
    roots: Vec<PathBuf>,
    unresolved: Option<SubscriptionId>,
}

impl FileSourceResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            unresolved: None,
        }
    }
}

impl System for FileSourceResolver {
    fn name(&self) -> &str {
        "file_source"
    }

    fn init(&mut self, world: &mut World) -> Result<()> {
        let filter = world
            .filter()
            .require::<FilePath>()
            .require::<FileType>()
            .forbid::<FileSource>()
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
            let path = match world.get_component::<FilePath>(entity) {
                Some(file_path) => file_path.path.clone(),
                None => continue,
            };
            let root = self.roots.iter().find(|root| root.join(&path).is_file());
            if let Some(root) = root {
                debug!(entity = entity.index(), root = %root.display(), "resolved file source");
                world.add_component(entity, FileSource { root: root.clone() });
            }
        }
        Ok(())
    }
}
