//! # Delve Map Preview Tool
//!
//! Generates a single map from the command line and prints it as ASCII,
//! which is the quickest way to eyeball a seed or tune generation settings.

use clap::Parser;
use delve::{
    create_generator, generation::utils, DelveResult, GenerationConfig, GenerationMethod,
};
use log::info;

/// Command line arguments for the map preview tool.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Procedural roguelike map generation preview")]
#[command(version)]
struct Args {
    /// Random seed for map generation
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Map width in tiles
    #[arg(long, default_value_t = delve::config::DEFAULT_MAP_WIDTH)]
    width: i32,

    /// Map height in tiles
    #[arg(long, default_value_t = delve::config::DEFAULT_MAP_HEIGHT)]
    height: i32,

    /// Generation method (dungeon, cave, town)
    #[arg(short, long, default_value = "dungeon")]
    method: String,

    /// Generate with depth-scaled settings instead of the explicit method
    #[arg(short, long)]
    depth: Option<u32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    info!("Delve v{}", delve::VERSION);

    let config = match args.depth {
        Some(depth) => GenerationConfig::for_depth(args.seed, args.width, args.height, depth),
        None => {
            let mut config = GenerationConfig::new(args.seed);
            config.width = args.width;
            config.height = args.height;
            config.method = args.method.parse::<GenerationMethod>()?;
            config
        }
    };

    let generator = create_generator(config.method);
    info!(
        "Generating {}x{} map with {} (seed {})",
        config.width,
        config.height,
        generator.kind(),
        config.seed
    );

    let mut rng = utils::create_rng(&config);
    let map = generator.generate(&config, &mut rng);

    println!("{}", map.grid.to_ascii());
    info!(
        "Placed {} rooms, stairs up {:?}, stairs down {:?}",
        map.rooms.len(),
        map.stairs_up,
        map.stairs_down
    );

    Ok(())
}
