use glam::{Mat4, Vec3};
use log::{info, warn};
use skeletal_asset::{mesh::MeshAsset, scene::SceneAsset};

use crate::{
    binding::{bind_mesh, BindingReport, VertexBoneBinding},
    clock::{AnimationClock, PlaybackState},
    import::{build_skeleton, select_animation, SkeletonError, SkeletonImportParams},
    palette::Palette,
    pose::evaluate,
    renderer::vertex::SkinnedVertex,
    skeleton::{BoneNode, Skeleton},
    skinning::skin_position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinningMode {
    /// Drawn with an identity palette.
    Static,
    Skinned,
}

#[derive(Debug, Clone)]
pub struct SkinnedMesh {
    pub mesh: MeshAsset,
    pub bindings: Vec<VertexBoneBinding>,
}

impl SkinnedMesh {
    pub fn vertices(&self) -> Vec<SkinnedVertex> {
        let mesh = &self.mesh;
        (0..mesh.vertex_count())
            .map(|index| {
                let vertex = SkinnedVertex {
                    position: mesh.position[index],
                    normal: mesh.normal.get(index).copied().unwrap_or_default(),
                    tex_coords: mesh.tex_coord.get(index).copied().unwrap_or_default(),
                    tangent: mesh.tangent.get(index).copied().unwrap_or_default(),
                    bitangent: mesh.bitangent.get(index).copied().unwrap_or_default(),
                    ..Default::default()
                };
                match self.bindings.get(index) {
                    Some(binding) => vertex.with_binding(binding),
                    None => vertex,
                }
            })
            .collect()
    }

    /// Bind-pose positions run through the palette on the CPU.
    pub fn skinned_positions(&self, palette: &Palette) -> Vec<Vec3> {
        self.mesh
            .position
            .iter()
            .enumerate()
            .map(|(index, position)| {
                let position = Vec3::from_array(*position);
                match self.bindings.get(index) {
                    Some(binding) => skin_position(palette, binding, position),
                    None => position,
                }
            })
            .collect()
    }
}

/// One skeleton with its meshes, palette and playback.
#[derive(Debug, Clone)]
pub struct AnimatedModel {
    skeleton: Skeleton,
    meshes: Vec<SkinnedMesh>,
    palette: Palette,
    clock: AnimationClock,
    state: PlaybackState,
    inverse_bind: Mat4,
    report: BindingReport,
}

impl AnimatedModel {
    /// Builds the skeleton for the selected clip and binds every mesh to it.
    ///
    /// A scene without animations loads as a static model.
    pub fn load(scene: SceneAsset, params: &SkeletonImportParams) -> Result<Self, SkeletonError> {
        let (skeleton, clock) = match select_animation(&scene, &params.animation) {
            Ok(animation) => {
                let clock = AnimationClock::new(
                    animation.duration,
                    animation.ticks_per_second,
                    params.speed,
                );
                let (skeleton, _) = build_skeleton(&scene, params)?;
                (skeleton, clock)
            }
            Err(SkeletonError::NoAnimations) => {
                info!("Scene has no animations, loading as a static model");
                let root = BoneNode::structural(&scene.root.name, Mat4::IDENTITY);
                (Skeleton::new(root), AnimationClock::new(0.0, 0.0, params.speed))
            }
            Err(err) => return Err(err),
        };

        let mut skeleton = skeleton;
        let mut report = BindingReport::default();
        let meshes: Vec<SkinnedMesh> = scene
            .meshes
            .into_iter()
            .map(|mesh| {
                let (bindings, mesh_report) =
                    bind_mesh(&mut skeleton, &mesh, params.normalize_weights);
                report.unknown_bones.extend(mesh_report.unknown_bones);
                report.unknown_influences += mesh_report.unknown_influences;
                report.dropped_influences += mesh_report.dropped_influences;
                report.out_of_range_vertices += mesh_report.out_of_range_vertices;
                SkinnedMesh { mesh, bindings }
            })
            .collect();
        if !report.is_clean() {
            warn!(
                "Binding dropped data: {} unknown bones ({} influences), {} influences past the limit, {} bad vertices",
                report.unknown_bones.len(),
                report.unknown_influences,
                report.dropped_influences,
                report.out_of_range_vertices
            );
        }

        let model = Self {
            skeleton,
            meshes,
            palette: Palette::default(),
            clock,
            state: PlaybackState::default(),
            inverse_bind: params.inverse_bind_transform,
            report,
        };
        info!(
            "Loaded model: {} meshes, {} bones, {:?}",
            model.meshes.len(),
            model.skeleton.bone_count(),
            model.skinning_mode()
        );
        Ok(model)
    }

    /// Poses the skeleton for `wall_seconds` when playback yields a time.
    /// Returns whether the palette was recomputed.
    pub fn update(&mut self, wall_seconds: f32) -> bool {
        if self.skeleton.bone_count() == 0 {
            return false;
        }
        match self.state.anim_time(&self.clock, wall_seconds) {
            Some(anim_time) => {
                self.evaluate_at(anim_time);
                true
            }
            None => false,
        }
    }

    /// Poses the skeleton at a clip time, bypassing the clock.
    pub fn evaluate_at(&mut self, anim_time: f32) -> usize {
        evaluate(
            &self.skeleton,
            Mat4::IDENTITY,
            self.inverse_bind,
            anim_time,
            &mut self.palette,
        )
    }

    pub fn skinning_mode(&self) -> SkinningMode {
        let skinned = self
            .meshes
            .iter()
            .any(|mesh| mesh.bindings.iter().any(|binding| binding.count > 0));
        if self.skeleton.bone_count() > 0 && skinned {
            SkinningMode::Skinned
        } else {
            SkinningMode::Static
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn meshes(&self) -> &[SkinnedMesh] {
        &self.meshes
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
    }

    pub fn binding_report(&self) -> &BindingReport {
        &self.report
    }
}
