//! Non-blocking file fetching
//!
//! The frame loop must never stall on I/O, so the handle resolver talks to
//! a [`FileFetcher`]: `request` queues a read, `poll` drains whatever has
//! completed since the last frame. A handle component is attached only once
//! the full byte payload is back.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use thiserror::Error;

use crate::ecs::Entity;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{path}: not found")]
    NotFound { path: PathBuf },
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A completed fetch, tagged with the entity it was requested for.
pub struct FetchResult {
    pub entity: Entity,
    pub outcome: Result<Vec<u8>, FetchError>,
}

pub trait FileFetcher: Send {
    /// Queue a read of `path` on behalf of `entity`. Must not block.
    fn request(&mut self, entity: Entity, path: PathBuf);

    /// Drain every fetch that has completed so far. Must not block.
    fn poll(&mut self) -> Vec<FetchResult>;
}

/// Serves fetches from an in-memory table. Results become visible on the
/// poll after `delay_polls` further polls, which lets tests hold an entity
/// at the pre-handle stage for a controlled number of frames.
pub struct MemoryFetcher {
    files: HashMap<PathBuf, Vec<u8>>,
    delay_polls: u32,
    pending: Vec<(u32, FetchResult)>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            delay_polls: 0,
            pending: Vec::new(),
        }
    }

    pub fn with_delay(delay_polls: u32) -> Self {
        Self {
            delay_polls,
            ..Self::new()
        }
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }
}

impl Default for MemoryFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileFetcher for MemoryFetcher {
    fn request(&mut self, entity: Entity, path: PathBuf) {
        let outcome = match self.files.get(&path) {
            Some(data) => Ok(data.clone()),
            None => Err(FetchError::NotFound { path }),
        };
        self.pending
            .push((self.delay_polls, FetchResult { entity, outcome }));
    }

    fn poll(&mut self) -> Vec<FetchResult> {
        let mut ready = Vec::new();
        let mut waiting = Vec::new();
        for (polls_left, result) in self.pending.drain(..) {
            if polls_left == 0 {
                ready.push(result);
            } else {
                waiting.push((polls_left - 1, result));
            }
        }
        self.pending = waiting;
        ready
    }
}

/// Reads files on a worker thread and hands results back over a channel.
/// The worker exits when the fetcher is dropped.
pub struct DiskFetcher {
    jobs: mpsc::Sender<(Entity, PathBuf)>,
    results: mpsc::Receiver<FetchResult>,
}

impl DiskFetcher {
    pub fn spawn() -> Self {
        let (jobs_tx, jobs_rx) = mpsc::channel::<(Entity, PathBuf)>();
        let (results_tx, results_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok((entity, path)) = jobs_rx.recv() {
                let outcome = std::fs::read(&path).map_err(|source| {
                    if source.kind() == std::io::ErrorKind::NotFound {
                        FetchError::NotFound { path: path.clone() }
                    } else {
                        FetchError::Io {
                            path: path.clone(),
                            source,
                        }
                    }
                });
                if results_tx.send(FetchResult { entity, outcome }).is_err() {
                    break;
                }
            }
        });

        Self {
            jobs: jobs_tx,
            results: results_rx,
        }
    }
}

impl FileFetcher for DiskFetcher {
    fn request(&mut self, entity: Entity, path: PathBuf) {
        // A send only fails once the worker is gone, at which point the
        // fetcher itself is being torn down.
        let _ = self.jobs.send((entity, path));
    }

    fn poll(&mut self) -> Vec<FetchResult> {
        self.results.try_iter().collect()
    }
}
