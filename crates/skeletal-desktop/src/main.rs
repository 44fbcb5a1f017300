mod app;
mod cli;
mod gpu;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use skeletal::model::AnimatedModel;
use skeletal_asset::loader::{gltf::load_from_path, LoadParams};

use crate::{
    app::{AppContext, FrameSettings},
    cli::Cli,
    gpu::GpuContext,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.verbose, cli.quiet) {
        (0, true) => "error",
        (0, false) => "info",
        (1, _) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let scene = load_from_path(&cli.model, &LoadParams::default())
        .with_context(|| format!("Failed to load {}", cli.model.display()))?;
    let model = AnimatedModel::load(scene, &cli.import_params())
        .with_context(|| format!("Failed to build a skeleton for {}", cli.model.display()))?;

    let gpu = if cli.gpu {
        match GpuContext::new() {
            Ok(gpu) => Some(gpu),
            Err(err) => {
                error!("GPU upload disabled: {:#}", err);
                None
            }
        }
    } else {
        None
    };

    let settings = FrameSettings {
        frames: cli.frames,
        step: cli.step,
    };
    let mut app = AppContext::new(settings, gpu);
    app.add_model(model, cli.playback.into());
    for (index, summary) in app.run().iter().enumerate() {
        info!(
            "Model #{}: {} bones, posed {} of {} frames, first bone at {}",
            index, summary.bones, summary.frames_posed, settings.frames, summary.first_bone_origin
        );
    }
    Ok(())
}
