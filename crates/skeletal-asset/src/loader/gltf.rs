use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
    path::Path,
};

use glam::{Mat4, Quat, Vec3};
use gltf::{
    animation::{util::ReadOutputs, Interpolation, Property},
    mesh::Mode,
    scene::Transform,
    Animation, Document, Gltf, Node, Primitive, Scene,
};
use log::{debug, info, warn};

use crate::{
    animation::{AnimationAsset, AnimationKeyFrame, NodeAnimationAsset},
    mesh::{BoneAsset, MeshAsset, VertexWeight},
    node::{DecomposedTransform, NodeAsset, NodeTransform},
    scene::SceneAsset,
    tangent::{calculate_normal, calculate_tangent},
};

use super::{clip_vec4_to_vec3, LoadParams};

#[derive(Debug)]
pub enum SceneLoadError {
    Gltf(gltf::Error),
    NoScene,
    SceneNotFound(usize),
    MissingPositions(Option<String>),
    BadJointWeightSets(usize, usize),
}

impl Display for SceneLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Gltf(error) => Display::fmt(error, f),
            SceneLoadError::NoScene => write!(f, "Model file contains no scene"),
            SceneLoadError::SceneNotFound(index) => write!(f, "Scene #{} not found", index),
            SceneLoadError::MissingPositions(mesh) => write!(
                f,
                "Mesh {} has no vertex positions",
                mesh.as_deref().unwrap_or("<unnamed>")
            ),
            SceneLoadError::BadJointWeightSets(joints, weights) => write!(
                f,
                "Unpaired joints and weights: joints {}, weights {}",
                joints, weights
            ),
        }
    }
}

impl Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SceneLoadError::Gltf(error) => Some(error),
            _ => None,
        }
    }
}

impl From<gltf::Error> for SceneLoadError {
    fn from(value: gltf::Error) -> Self {
        Self::Gltf(value)
    }
}

fn node_name(node: &Node) -> String {
    node.name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

struct GltfDocumentLoader<'a> {
    document: &'a Document,
    buffers: &'a [gltf::buffer::Data],
    params: &'a LoadParams,
    meshes: Vec<MeshAsset>,
}

impl<'a> GltfDocumentLoader<'a> {
    fn new(
        document: &'a Document,
        buffers: &'a [gltf::buffer::Data],
        params: &'a LoadParams,
    ) -> Self {
        Self {
            document,
            buffers,
            params,
            meshes: Vec::new(),
        }
    }

    fn buffer(&self, buffer: gltf::Buffer) -> Option<&'a [u8]> {
        self.buffers.get(buffer.index()).map(|data| data.0.as_slice())
    }

    fn load_transform(node: &Node) -> NodeTransform {
        match node.transform() {
            Transform::Matrix { matrix } => NodeTransform::Matrix(Mat4::from_cols_array_2d(&matrix)),
            Transform::Decomposed {
                translation,
                rotation,
                scale,
            } => NodeTransform::Decomposed(DecomposedTransform {
                translation: Vec3::from_array(translation),
                rotation: Quat::from_array(rotation),
                scale: Vec3::from_array(scale),
            }),
        }
    }

    fn load_bones(
        &self,
        node: &Node,
        primitive: &Primitive,
        vertex_count: usize,
    ) -> Result<Vec<BoneAsset>, SceneLoadError> {
        let Some(skin) = node.skin() else {
            return Ok(Vec::new());
        };
        let reader = primitive.reader(|buffer| self.buffer(buffer));

        let joint_sets = (0..)
            .take_while(|set| reader.read_joints(*set).is_some())
            .count();
        let weight_sets = (0..)
            .take_while(|set| reader.read_weights(*set).is_some())
            .count();
        if joint_sets != weight_sets {
            return Err(SceneLoadError::BadJointWeightSets(joint_sets, weight_sets));
        }

        let skin_reader = skin.reader(|buffer| self.buffer(buffer));
        let inverse_bind_matrices: Vec<Mat4> = skin_reader
            .read_inverse_bind_matrices()
            .map(|matrices| matrices.map(|matrix| Mat4::from_cols_array_2d(&matrix)).collect())
            .unwrap_or_default();
        let mut bones: Vec<BoneAsset> = skin
            .joints()
            .enumerate()
            .map(|(slot, joint)| BoneAsset {
                name: node_name(&joint),
                offset: inverse_bind_matrices
                    .get(slot)
                    .copied()
                    .unwrap_or(Mat4::IDENTITY),
                weights: Vec::new(),
            })
            .collect();

        for set in 0..joint_sets as u32 {
            let (Some(joints), Some(weights)) = (reader.read_joints(set), reader.read_weights(set))
            else {
                continue;
            };
            for (vertex, (joints, weights)) in joints
                .into_u16()
                .zip(weights.into_f32())
                .enumerate()
                .take(vertex_count)
            {
                for (joint, weight) in joints.into_iter().zip(weights) {
                    if weight <= 0.0 {
                        continue;
                    }
                    match bones.get_mut(joint as usize) {
                        Some(bone) => bone.weights.push(VertexWeight {
                            vertex: vertex as u32,
                            weight,
                        }),
                        None => warn!(
                            "Vertex #{} references joint #{} outside skin #{}",
                            vertex,
                            joint,
                            skin.index()
                        ),
                    }
                }
            }
        }

        bones.retain(|bone| !bone.weights.is_empty());
        Ok(bones)
    }

    fn load_primitive(
        &self,
        node: &Node,
        mesh_name: Option<&str>,
        primitive: &Primitive,
    ) -> Result<MeshAsset, SceneLoadError> {
        let reader = primitive.reader(|buffer| self.buffer(buffer));
        let position: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| SceneLoadError::MissingPositions(mesh_name.map(str::to_string)))?
            .collect();
        let indices: Vec<u32> = reader
            .read_indices()
            .map(|indices| indices.into_u32().collect())
            .unwrap_or_default();
        let tex_coord: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|coords| coords.into_f32().collect())
            .unwrap_or_default();

        let normal = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None if self.params.generate_tangents => calculate_normal(&position, &indices),
            None => vec![[0.0; 3]; position.len()],
        };

        let (tangent, bitangent) = match reader.read_tangents() {
            Some(tangents) => {
                let tangents: Vec<[f32; 4]> = tangents.collect();
                let bitangent = tangents
                    .iter()
                    .zip(&normal)
                    .map(|(tangent, normal)| {
                        let handedness = tangent[3];
                        (Vec3::from_array(*normal).cross(Vec3::new(
                            tangent[0], tangent[1], tangent[2],
                        )) * handedness)
                            .to_array()
                    })
                    .collect();
                (clip_vec4_to_vec3(&tangents), bitangent)
            }
            None if self.params.generate_tangents => {
                calculate_tangent(&position, &tex_coord, &normal, &indices)
            }
            None => (vec![[0.0; 3]; position.len()], vec![[0.0; 3]; position.len()]),
        };

        let bones = self.load_bones(node, primitive, position.len())?;

        Ok(MeshAsset {
            name: mesh_name.map(str::to_string),
            position,
            normal,
            tex_coord,
            tangent,
            bitangent,
            indices,
            bones,
        })
    }

    fn load_node(&mut self, node: Node) -> Result<NodeAsset, SceneLoadError> {
        let mut meshes = Vec::new();
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if primitive.mode() != Mode::Triangles {
                    warn!(
                        "Skipping primitive #{} of mesh {:?}: unsupported mode {:?}",
                        primitive.index(),
                        mesh.name(),
                        primitive.mode()
                    );
                    continue;
                }
                let asset = self.load_primitive(&node, mesh.name(), &primitive)?;
                meshes.push(self.meshes.len());
                self.meshes.push(asset);
            }
        }
        let children = node
            .children()
            .map(|child| self.load_node(child))
            .collect::<Result<_, _>>()?;

        Ok(NodeAsset {
            name: node_name(&node),
            transform: Self::load_transform(&node),
            meshes,
            children,
        })
    }

    fn load_animation(&self, animation: Animation) -> AnimationAsset {
        let label = animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("animation_{}", animation.index()));
        // node index -> channel, in order of first appearance
        let mut channels: Vec<(usize, NodeAnimationAsset)> = Vec::new();

        for (channel_index, channel) in animation.channels().enumerate() {
            let target = channel.target();
            let node = target.node();
            if matches!(target.property(), Property::MorphTargetWeights) {
                debug!("Skipping morph weight channel #{} of {}", channel_index, label);
                continue;
            }
            let reader = channel.reader(|buffer| self.buffer(buffer));
            let Some(inputs) = reader.read_inputs() else {
                warn!("Channel #{} of {} has no key times", channel_index, label);
                continue;
            };
            let times: Vec<f32> = inputs.collect();
            let interpolation = channel.sampler().interpolation();
            match interpolation {
                Interpolation::Linear => (),
                Interpolation::Step => debug!(
                    "Step channel #{} of {} will be sampled linearly",
                    channel_index,
                    label
                ),
                Interpolation::CubicSpline => debug!(
                    "Cubic spline channel #{} of {} keeps only its key values",
                    channel_index,
                    label
                ),
            }

            fn key_values<T>(values: Vec<T>, interpolation: Interpolation) -> Vec<T> {
                if interpolation == Interpolation::CubicSpline {
                    // in-tangent, value, out-tangent
                    values.into_iter().skip(1).step_by(3).collect()
                } else {
                    values
                }
            }

            fn keyframes<T: Debug + Clone>(
                times: &[f32],
                values: Vec<T>,
            ) -> Vec<AnimationKeyFrame<T>> {
                times
                    .iter()
                    .zip(values)
                    .map(|(time, value)| AnimationKeyFrame::new(*time, value))
                    .collect()
            }

            let position = match channels.iter().position(|(index, _)| *index == node.index()) {
                Some(position) => position,
                None => {
                    channels.push((node.index(), NodeAnimationAsset::new(node_name(&node))));
                    channels.len() - 1
                }
            };
            let asset = &mut channels[position].1;

            match (target.property(), reader.read_outputs()) {
                (Property::Translation, Some(ReadOutputs::Translations(values))) => {
                    let values = key_values(values.map(Vec3::from_array).collect(), interpolation);
                    asset.translation_keys = keyframes(&times, values);
                }
                (Property::Rotation, Some(ReadOutputs::Rotations(values))) => {
                    let values = key_values(
                        values
                            .into_f32()
                            .map(|value| Quat::from_array(value).normalize())
                            .collect(),
                        interpolation,
                    );
                    asset.rotation_keys = keyframes(&times, values);
                }
                (Property::Scale, Some(ReadOutputs::Scales(values))) => {
                    let values = key_values(values.map(Vec3::from_array).collect(), interpolation);
                    asset.scale_keys = keyframes(&times, values);
                }
                (property, _) => {
                    warn!(
                        "Channel #{} of {} has no output data for {:?}",
                        channel_index,
                        label,
                        property
                    );
                }
            }
        }

        let channels: Vec<NodeAnimationAsset> =
            channels.into_iter().map(|(_, channel)| channel).collect();
        let duration = channels
            .iter()
            .map(NodeAnimationAsset::length)
            .fold(0.0, f32::max);

        AnimationAsset {
            name: animation.name().map(str::to_string),
            duration,
            ticks_per_second: 1.0,
            channels,
        }
    }

    fn select_scene(&self) -> Result<Scene<'a>, SceneLoadError> {
        match self.params.scene {
            Some(index) => self
                .document
                .scenes()
                .nth(index)
                .ok_or(SceneLoadError::SceneNotFound(index)),
            None => self
                .document
                .default_scene()
                .or_else(|| self.document.scenes().next())
                .ok_or(SceneLoadError::NoScene),
        }
    }

    fn load(mut self) -> Result<SceneAsset, SceneLoadError> {
        let scene = self.select_scene()?;
        let animations: Vec<AnimationAsset> = self
            .document
            .animations()
            .map(|animation| self.load_animation(animation))
            .collect();
        let children = scene
            .nodes()
            .map(|node| self.load_node(node))
            .collect::<Result<_, _>>()?;
        let name = scene.name().map(str::to_string);
        let root = NodeAsset {
            name: name.clone().unwrap_or_else(|| String::from("<scene>")),
            children,
            ..Default::default()
        };
        info!(
            "Loaded scene {:?}: {} nodes, {} meshes, {} animations",
            name,
            root.count(),
            self.meshes.len(),
            animations.len()
        );
        Ok(SceneAsset {
            name,
            root,
            animations,
            meshes: self.meshes,
        })
    }
}

/// Load a GLTF or GLB file. Relative buffer URIs are resolved against the
/// file's directory. Images are not decoded.
pub fn load_from_path(
    path: impl AsRef<Path>,
    params: &LoadParams,
) -> Result<SceneAsset, SceneLoadError> {
    let path = path.as_ref();
    let gltf = Gltf::open(path)?;
    let buffers = gltf::import_buffers(&gltf.document, path.parent(), gltf.blob)?;
    GltfDocumentLoader::new(&gltf.document, &buffers, params).load()
}

/// Load a GLTF or GLB document held in memory. Only embedded (data URI or
/// GLB binary chunk) buffers are available.
pub fn load_from_slice(buffer: &[u8], params: &LoadParams) -> Result<SceneAsset, SceneLoadError> {
    let gltf = Gltf::from_slice(buffer)?;
    let buffers = gltf::import_buffers(&gltf.document, None, gltf.blob)?;
    GltfDocumentLoader::new(&gltf.document, &buffers, params).load()
}
