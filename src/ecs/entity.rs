//! Entity identifiers and allocation

/// An entity is an opaque key into the world's component stores. The
/// generation counter distinguishes a reused index from the entity that
/// previously held it, so stale ids never match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Allocates entity ids. Indices are recycled through a free list, but only
/// after the world has dropped every component for the old entity; the
/// generation bump on deallocation makes the old id dead everywhere.
pub struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    count: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            alive: Vec::new(),
            free: Vec::new(),
            count: 0,
        }
    }

    pub fn allocate(&mut self) -> Entity {
        let index = if let Some(index) = self.free.pop() {
            self.alive[index as usize] = true;
            index
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            index
        };
        self.count += 1;
        Entity {
            index,
            generation: self.generations[index as usize],
        }
    }

    pub fn deallocate(&mut self, entity: Entity) {
        if !self.is_alive(entity) {
            return;
        }
        let slot = entity.index as usize;
        self.alive[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(entity.index);
        self.count -= 1;
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.index as usize;
        slot < self.alive.len() && self.alive[slot] && self.generations[slot] == entity.generation
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
