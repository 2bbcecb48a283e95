//! Scheduler - runs registered systems once per frame, in order

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::ecs::World;

/// A unit of per-frame logic. `init` runs once at registration and is where
/// a system builds its filters and subscriptions; `process` runs once per
/// frame. Systems execute strictly sequentially in registration order, so a
/// system always sees the complete effect of every system that ran before
/// it this frame, and never a partially-applied batch.
pub trait System {
    fn name(&self) -> &str;
    fn init(&mut self, world: &mut World) -> Result<()>;
    fn process(&mut self, world: &mut World) -> Result<()>;
}

/// Timing record for a single frame.
#[derive(Debug, Clone)]
pub struct FrameStats {
    pub frame: u64,
    pub duration: Duration,
    pub system_times: Vec<(String, Duration)>,
}

/// Owns the registered systems and drives the frame loop over a world.
pub struct Scheduler {
    systems: Vec<Box<dyn System>>,
    frame_count: u64,
    stats_history: Vec<FrameStats>,
    max_stats_history: usize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            frame_count: 0,
            stats_history: Vec::new(),
            max_stats_history: 100,
        }
    }

    /// Register a system, running its `init` hook against the world.
    pub fn add_system(&mut self, world: &mut World, system: impl System + 'static) -> Result<()> {
        let mut system = Box::new(system);
        system.init(world)?;
        self.systems.push(system);
        Ok(())
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Execute one frame: publish `dt` to the world, then run every system
    /// in registration order.
    pub fn frame(&mut self, world: &mut World, dt: Duration) -> Result<FrameStats> {
        let frame_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.systems.len());

        world.set_time_delta(dt);
        for system in &mut self.systems {
            let system_start = Instant::now();
            system.process(world)?;
            system_times.push((system.name().to_string(), system_start.elapsed()));
        }

        self.frame_count += 1;
        let stats = FrameStats {
            frame: self.frame_count,
            duration: frame_start.elapsed(),
            system_times,
        };

        self.stats_history.push(stats.clone());
        if self.stats_history.len() > self.max_stats_history {
            self.stats_history.remove(0);
        }

        Ok(stats)
    }

    /// Run a fixed number of frames with a constant `dt`.
    pub fn run(&mut self, world: &mut World, frames: u64, dt: Duration) -> Result<()> {
        for _ in 0..frames {
            self.frame(world, dt)?;
        }
        Ok(())
    }

    pub fn recent_stats(&self) -> &[FrameStats] {
        &self.stats_history
    }

    pub fn average_frame_time(&self) -> Option<Duration> {
        if self.stats_history.is_empty() {
            return None;
        }
        let total: Duration = self.stats_history.iter().map(|s| s.duration).sum();
        Some(total / self.stats_history.len() as u32)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSystem {
        initialized: bool,
        frames_seen: u32,
        observed_dt: Duration,
    }

    impl CountingSystem {
        fn new() -> Self {
            Self {
                initialized: false,
                frames_seen: 0,
                observed_dt: Duration::ZERO,
            }
        }
    }

    impl System for CountingSystem {
        fn name(&self) -> &str {
            "counting"
        }

        fn init(&mut self, _world: &mut World) -> Result<()> {
            self.initialized = true;
            Ok(())
        }

        fn process(&mut self, world: &mut World) -> Result<()> {
            assert!(self.initialized);
            self.frames_seen += 1;
            self.observed_dt = world.time_delta();
            Ok(())
        }
    }

    #[test]
    fn test_scheduler_runs_systems_each_frame() {
        let mut scheduler = Scheduler::new();
        let mut world = World::new();

        scheduler
            .add_system(&mut world, CountingSystem::new())
            .unwrap();
        assert_eq!(scheduler.frame_count(), 0);

        scheduler
            .run(&mut world, 3, Duration::from_millis(16))
            .unwrap();
        assert_eq!(scheduler.frame_count(), 3);
        assert_eq!(world.time_delta(), Duration::from_millis(16));
    }

    #[test]
    fn test_scheduler_records_stats() {
        let mut scheduler = Scheduler::new();
        let mut world = World::new();
        scheduler
            .add_system(&mut world, CountingSystem::new())
            .unwrap();

        let stats = scheduler
            .frame(&mut world, Duration::from_millis(16))
            .unwrap();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.system_times.len(), 1);
        assert_eq!(stats.system_times[0].0, "counting");

        assert_eq!(scheduler.recent_stats().len(), 1);
        assert!(scheduler.average_frame_time().is_some());
    }
}
