mod file_handle;
mod file_source;
mod file_type;
mod game_config;
mod movement;

pub use file_handle::FileHandleResolver;
pub use file_source::FileSourceResolver;
pub use file_type::FileTypeResolver;
pub use game_config::{GameConfigSystem, CONFIG_FILE_NAME};
pub use movement::MovementSystem;
