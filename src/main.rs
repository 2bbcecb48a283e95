use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use loadstone::{
    components::{FilePath, GameConfig},
    fetch::DiskFetcher,
    systems::{
        FileHandleResolver, FileSourceResolver, FileTypeResolver, GameConfigSystem,
        CONFIG_FILE_NAME,
    },
    Scheduler, World,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Run the resource pipeline against a directory")]
struct Cli {
    /// Root directory searched for resource files
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Number of frames to run
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Simulated frame time in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let mut world = World::new();
    let mut scheduler = Scheduler::new();
    scheduler.add_system(&mut world, FileTypeResolver::new())?;
    scheduler.add_system(&mut world, FileSourceResolver::new(vec![cli.root.clone()]))?;
    scheduler.add_system(
        &mut world,
        FileHandleResolver::new(Box::new(DiskFetcher::spawn())),
    )?;
    scheduler.add_system(&mut world, GameConfigSystem::new())?;

    let config_entity = world.create_entity();
    world.add_component(
        config_entity,
        FilePath {
            path: PathBuf::from(CONFIG_FILE_NAME),
        },
    );

    scheduler.run(&mut world, cli.frames, Duration::from_millis(cli.frame_ms))?;

    match world.get_component::<GameConfig>(config_entity) {
        Some(config) => println!(
            "Loaded {} after {} frames: difficulty={}, language={}",
            CONFIG_FILE_NAME,
            scheduler.frame_count(),
            config.difficulty,
            config.language
        ),
        None => println!(
            "No {} loaded after {} frames under {}",
            CONFIG_FILE_NAME,
            scheduler.frame_count(),
            cli.root.display()
        ),
    }
    Ok(())
}
