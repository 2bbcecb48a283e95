//! Component kinds used by the resource pipeline and simulation systems

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ecs::Component;
use crate::math::Vec2;

/// Stage 1 of the load pipeline: the path a resource will be loaded from,
/// relative to whichever source ends up providing it.
#[derive(Debug, Clone)]
pub struct FilePath {
    pub path: PathBuf,
}

impl Component for FilePath {}

/// Stage 2: the resolved content type of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Json,
    DataTable,
    Unknown,
}

impl FileType {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => FileType::Json,
            Some("txt") | Some("tsv") => FileType::DataTable,
            _ => FileType::Unknown,
        }
    }
}

impl Component for FileType {}

/// Stage 3: the source the file will be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    pub root: PathBuf,
}

impl Component for FileSource {}

/// Stage 4: the fully-read bytes of the file. Attached only once the data
/// is complete, so consumers never see a partial stream.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub data: Vec<u8>,
}

impl Component for FileHandle {}

/// Stage 5 for the well-known configuration file: the decoded settings.
/// Every field defaults, so a partial config file still parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub difficulty: String,
    pub language: String,
    pub fullscreen: bool,
    pub vsync: bool,
    pub sfx_volume: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: "normal".to_string(),
            language: "en".to_string(),
            fullscreen: false,
            vsync: true,
            sfx_volume: 1.0,
        }
    }
}

impl Component for GameConfig {}

/// Marks derived state as changed this frame. Absence means "never
/// derived", which callers must distinguish from `is_dirty == false`.
/// Only the owning system clears the flag; producers set it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dirty {
    pub is_dirty: bool,
}

impl Component for Dirty {}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec2);

impl Component for Position {}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity(pub Vec2);

impl Component for Velocity {}
