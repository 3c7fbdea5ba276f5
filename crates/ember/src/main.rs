use anyhow::{Context, Result};
use clap::Parser;
use ember_renderer::{render, RenderConfig};
use log::info;

mod cli;
mod logger;
mod scene;

use cli::Args;
use logger::init_logger;
use scene::{demo_scene, SceneDescription};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let (mut camera_config, scene) = match &args.scene {
        Some(path) => {
            info!("Loading scene from {}", path.display());
            SceneDescription::load(path)?.build()?
        }
        None => {
            info!("No scene file given, rendering the demo scene");
            demo_scene()?
        }
    };

    // Command line flags win over the scene file
    if let Some(width) = args.width {
        camera_config.image_width = width;
    }
    if let Some(samples) = args.samples {
        camera_config.samples_per_pixel = samples;
    }
    if let Some(depth) = args.depth {
        camera_config.max_depth = depth;
    }

    let camera = camera_config.initialize();
    let config = RenderConfig {
        rows_per_block: args.block_rows,
        threads: args.threads,
        seed: args.seed,
    };

    let image = render(&camera, &scene, &config);
    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
