use std::collections::HashSet;

use anyhow::Result;
use tracing::{debug, warn};

use crate::components::{FilePath, FileHandle, FileSource};
use crate::ecs::{Entity, SubscriptionId, World};
use crate::fetch::FileFetcher;
use crate::scheduler::System;

/// Third stage: turns a resolved source into opened bytes. All I/O goes
/// through the injected fetcher so the frame loop never blocks; a handle
/// component appears only once the complete payload has been polled back.
///
/// A failed fetch parks the entity: it keeps its earlier-stage components
/// and is not retried automatically.
pub struct FileHandleResolver {
    fetcher: Box<dyn FileFetcher>,
    unresolved: Option<SubscriptionId>,
    pending: HashSet<Entity>,
    failed: HashSet<Entity>,
}

impl FileHandleResolver {
    pub fn new(fetcher: Box<dyn FileFetcher>) -> Self {
        Self {
            fetcher,
            unresolved: None,
            pending: HashSet::new(),
            failed: HashSet::new(),
        }
    }
}

impl System for FileHandleResolver {
    fn name(&self) -> &str {
        "file_handle"
    }

    fn init(&mut self, world: &mut World) -> Result<()> {
        let filter = world
            .filter()
            .require::<FilePath>()
            .require::<FileSource>()
            .forbid::<FileHandle>()
            .build()?;
        self.unresolved = Some(world.subscribe(filter));
        Ok(())
    }

    fn process(&mut self, world: &mut World) -> Result<()> {
        let Some(unresolved) = self.unresolved else {
            return Ok(());
        };

        for result in self.fetcher.poll() {
            self.pending.remove(&result.entity);
            if !world.is_alive(result.entity) {
                continue;
            }
            match result.outcome {
                Ok(data) => {
                    debug!(
                        entity = result.entity.index(),
                        bytes = data.len(),
                        "file handle opened"
                    );
                    world.add_component(result.entity, FileHandle { data });
                }
                Err(err) => {
                    warn!(entity = result.entity.index(), %err, "fetch failed");
                    self.failed.insert(result.entity);
                }
            }
        }

        let entities: Vec<_> = world.entities(unresolved).to_vec();
        for entity in entities {
            if self.pending.contains(&entity) || self.failed.contains(&entity) {
                continue;
            }
            let full_path = match (
                world.get_component::<FilePath>(entity),
                world.get_component::<FileSource>(entity),
            ) {
                (Some(file_path), Some(source)) => source.root.join(&file_path.path),
                _ => continue,
            };
            self.fetcher.request(entity, full_path);
            self.pending.insert(entity);
        }
        Ok(())
    }
}
