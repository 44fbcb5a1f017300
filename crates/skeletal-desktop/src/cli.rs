use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use skeletal::{
    clock::PlaybackState,
    import::{AnimationSelector, RootSelector, SkeletonImportParams, StructuralTransforms},
};

#[derive(Parser, Debug)]
#[command(name = "skeletal-desktop")]
#[command(about = "Plays a skinned glTF animation and computes its bone palette", long_about = None)]
#[command(version)]
pub struct Cli {
    /// glTF or GLB model to animate
    pub model: PathBuf,

    /// Index of the animation clip to play
    #[arg(short, long, conflicts_with = "clip")]
    pub animation: Option<usize>,

    /// Name of the animation clip to play
    #[arg(long)]
    pub clip: Option<String>,

    /// Node to use as the skeleton root instead of the first animated node
    #[arg(long)]
    pub root: Option<String>,

    /// Playback speed multiplier
    #[arg(short, long, default_value_t = 1.0)]
    pub speed: f32,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 120)]
    pub frames: u32,

    /// Wall-clock seconds between frames
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub step: f32,

    #[arg(long, value_enum, default_value_t = PlaybackMode::Repeat)]
    pub playback: PlaybackMode,

    /// Use the scene rest transform for nodes without animation
    #[arg(long)]
    pub rest_pose: bool,

    /// Rescale each vertex's bone weights to sum to one
    #[arg(long)]
    pub normalize_weights: bool,

    /// Upload the palette to a GPU uniform buffer every frame
    #[arg(long)]
    pub gpu: bool,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackMode {
    Once,
    Repeat,
    PingPong,
}

impl From<PlaybackMode> for PlaybackState {
    fn from(mode: PlaybackMode) -> Self {
        match mode {
            PlaybackMode::Once => PlaybackState::Once { start: 0.0 },
            PlaybackMode::Repeat => PlaybackState::Repeat { start: 0.0 },
            PlaybackMode::PingPong => PlaybackState::PingPong { start: 0.0 },
        }
    }
}

impl Cli {
    pub fn import_params(&self) -> SkeletonImportParams {
        let animation = match (&self.clip, self.animation) {
            (Some(name), _) => AnimationSelector::Name(name.clone()),
            (None, Some(index)) => AnimationSelector::Index(index),
            (None, None) => AnimationSelector::default(),
        };
        let root = match &self.root {
            Some(name) => RootSelector::Named(name.clone()),
            None => RootSelector::FirstAnimated,
        };
        let structural_transforms = if self.rest_pose {
            StructuralTransforms::RestPose
        } else {
            StructuralTransforms::Identity
        };
        SkeletonImportParams {
            animation,
            root,
            structural_transforms,
            normalize_weights: self.normalize_weights,
            speed: self.speed,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn flags_map_to_import_params() {
        let cli = Cli::parse_from([
            "skeletal-desktop",
            "model.glb",
            "--clip",
            "walk",
            "--root",
            "hips",
            "--speed",
            "10",
            "--rest-pose",
        ]);
        let params = cli.import_params();
        assert_eq!(params.animation, AnimationSelector::Name("walk".into()));
        assert_eq!(params.root, RootSelector::Named("hips".into()));
        assert_eq!(params.speed, 10.0);
        assert_eq!(params.structural_transforms, StructuralTransforms::RestPose);
        assert!(!params.normalize_weights);
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["skeletal-desktop", "model.gltf", "--playback", "ping-pong"]);
        assert_eq!(cli.import_params(), SkeletonImportParams::default());
        assert_eq!(
            PlaybackState::from(cli.playback),
            PlaybackState::PingPong { start: 0.0 }
        );
        assert_eq!(cli.frames, 120);
    }

    #[test]
    fn clip_and_index_conflict() {
        let result = Cli::try_parse_from(["skeletal-desktop", "m.glb", "-a", "1", "--clip", "x"]);
        assert!(result.is_err());
    }
}
