use glam::Vec3;
use log::{debug, info, trace};
use skeletal::{clock::PlaybackState, model::AnimatedModel};

use crate::gpu::GpuContext;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSettings {
    pub frames: u32,
    /// Wall-clock seconds per frame.
    pub step: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub bones: usize,
    pub frames_posed: u32,
    /// Where the first palette entry moves the origin after the last frame.
    pub first_bone_origin: Vec3,
}

struct ModelSlot {
    model: AnimatedModel,
    gpu_index: Option<usize>,
    frames_posed: u32,
}

/// Everything the frame loop touches, owned in one place.
pub struct AppContext {
    settings: FrameSettings,
    models: Vec<ModelSlot>,
    gpu: Option<GpuContext>,
    wall_seconds: f32,
}

impl AppContext {
    pub fn new(settings: FrameSettings, gpu: Option<GpuContext>) -> Self {
        Self {
            settings,
            models: Vec::new(),
            gpu,
            wall_seconds: 0.0,
        }
    }

    pub fn add_model(&mut self, mut model: AnimatedModel, state: PlaybackState) -> usize {
        model.set_state(state);
        let gpu_index = self.gpu.as_mut().map(|gpu| gpu.register(&model));
        if let (Some(gpu), Some(index)) = (&self.gpu, gpu_index) {
            debug!("Model uses {} vertices on the GPU", gpu.vertex_count(index));
        }
        self.models.push(ModelSlot {
            model,
            gpu_index,
            frames_posed: 0,
        });
        self.models.len() - 1
    }

    pub fn wall_seconds(&self) -> f32 {
        self.wall_seconds
    }

    /// Poses every model for the current time, then advances the clock.
    pub fn frame(&mut self) {
        for slot in &mut self.models {
            if slot.model.update(self.wall_seconds) {
                slot.frames_posed += 1;
                if let (Some(gpu), Some(index)) = (&self.gpu, slot.gpu_index) {
                    gpu.upload(index, slot.model.palette());
                }
            }
        }
        if let Some(gpu) = &self.gpu {
            gpu.flush();
        }
        trace!("Frame at {:.3}s", self.wall_seconds);
        self.wall_seconds += self.settings.step;
    }

    pub fn run(&mut self) -> Vec<ModelSummary> {
        for _ in 0..self.settings.frames {
            self.frame();
        }
        info!(
            "Ran {} frames over {:.3}s",
            self.settings.frames, self.wall_seconds
        );
        self.models
            .iter()
            .map(|slot| ModelSummary {
                bones: slot.model.skeleton().bone_count(),
                frames_posed: slot.frames_posed,
                first_bone_origin: slot.model.palette()[0].transform_point3(Vec3::ZERO),
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use skeletal::import::{AnimationSelector, SkeletonImportParams};
    use skeletal_asset::loader::{gltf::load_from_slice, LoadParams};

    use super::*;

    const TWO_BONES: &[u8] = include_bytes!("../../skeletal-asset/tests/data/two_bones.gltf");

    fn fly() -> AnimatedModel {
        let scene = load_from_slice(TWO_BONES, &LoadParams::default()).unwrap();
        let params = SkeletonImportParams {
            animation: AnimationSelector::Name("fly".into()),
            ..Default::default()
        };
        AnimatedModel::load(scene, &params).unwrap()
    }

    #[test]
    fn fixed_step_loop_poses_every_frame() {
        let settings = FrameSettings {
            frames: 4,
            step: 0.25,
        };
        let mut app = AppContext::new(settings, None);
        app.add_model(fly(), PlaybackState::Repeat { start: 0.0 });
        let summary = app.run();

        assert_eq!(app.wall_seconds(), 1.0);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].bones, 1);
        assert_eq!(summary[0].frames_posed, 4);
        // last frame was posed at 0.75s
        assert!(summary[0]
            .first_bone_origin
            .abs_diff_eq(Vec3::new(0.0, 0.75, 0.0), 1e-5));
    }

    #[test]
    fn once_playback_stops_posing() {
        let settings = FrameSettings {
            frames: 6,
            step: 0.5,
        };
        let mut app = AppContext::new(settings, None);
        app.add_model(fly(), PlaybackState::Once { start: 0.0 });
        let summary = app.run();
        // frames at 0.0, 0.5 and 1.0 fall inside the one-second clip
        assert_eq!(summary[0].frames_posed, 3);
    }
}
