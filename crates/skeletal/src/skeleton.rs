use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use log::warn;

use crate::{
    import::StructuralTransforms,
    track::{RotationTrack, ScaleTrack, TranslationTrack},
};

/// Index of a node inside its skeleton's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneTracks {
    pub translation: TranslationTrack,
    pub scale: ScaleTrack,
    pub rotation: RotationTrack,
}

impl BoneTracks {
    /// Local transform at `time`: translate, then scale, then rotate.
    pub fn sample(&self, time: f32) -> Mat4 {
        let translation: Vec3 = self.translation.sample(time);
        let scale: Vec3 = self.scale.sample(time);
        let rotation: Quat = self.rotation.sample(time);
        Mat4::from_translation(translation) * Mat4::from_scale(scale) * Mat4::from_quat(rotation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoneNode {
    pub name: String,
    /// Slot in the palette; `None` for structural nodes.
    pub palette_index: Option<usize>,
    pub tracks: BoneTracks,
    /// Mesh space to bone space, at rest.
    pub bind_pose_offset: Mat4,
    pub rest_transform: Mat4,
    pub children: Vec<NodeId>,
}

impl BoneNode {
    pub fn structural(name: impl Into<String>, rest_transform: Mat4) -> Self {
        Self {
            name: name.into(),
            palette_index: None,
            tracks: BoneTracks::default(),
            bind_pose_offset: Mat4::IDENTITY,
            rest_transform,
            children: Vec::new(),
        }
    }

    pub fn bone(
        name: impl Into<String>,
        palette_index: usize,
        tracks: BoneTracks,
        rest_transform: Mat4,
    ) -> Self {
        Self {
            palette_index: Some(palette_index),
            tracks,
            ..Self::structural(name, rest_transform)
        }
    }

    pub fn is_bone(&self) -> bool {
        self.palette_index.is_some()
    }
}

/// Bone hierarchy stored as an arena. Node 0 is always the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    nodes: Vec<BoneNode>,
    bone_names: HashMap<String, usize>,
    /// Palette index -> node. Indices no node claimed stay empty.
    bones: Vec<Option<NodeId>>,
    structural_transforms: StructuralTransforms,
}

impl Skeleton {
    pub fn new(root: BoneNode) -> Self {
        let mut skeleton = Self {
            nodes: Vec::new(),
            bone_names: HashMap::new(),
            bones: Vec::new(),
            structural_transforms: StructuralTransforms::Identity,
        };
        skeleton.push(root);
        skeleton
    }

    pub fn with_structural_transforms(mut self, structural_transforms: StructuralTransforms) -> Self {
        self.structural_transforms = structural_transforms;
        self
    }

    pub fn structural_transforms(&self) -> StructuralTransforms {
        self.structural_transforms
    }

    /// Local transform of `node` at `time`.
    pub fn local_transform(&self, node: &BoneNode, time: f32) -> Mat4 {
        match (node.is_bone(), self.structural_transforms) {
            (true, _) => node.tracks.sample(time),
            (false, StructuralTransforms::Identity) => Mat4::IDENTITY,
            (false, StructuralTransforms::RestPose) => node.rest_transform,
        }
    }

    /// Appends a node and links it under `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: BoneNode) -> NodeId {
        let id = self.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push(&mut self, node: BoneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(index) = node.palette_index {
            if self.bones.len() <= index {
                self.bones.resize(index + 1, None);
            }
            if let Some(previous) = self.bones[index].replace(id) {
                warn!(
                    "Palette index {} moves from {} to {}",
                    index, self.nodes[previous.0].name, node.name
                );
            }
            self.bone_names.entry(node.name.clone()).or_insert(index);
        }
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &BoneNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut BoneNode {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &BoneNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.iter().flatten().count()
    }

    pub fn bone_mapping(&self) -> &HashMap<String, usize> {
        &self.bone_names
    }

    pub fn palette_index(&self, name: &str) -> Option<usize> {
        self.bone_names.get(name).copied()
    }

    pub fn bone(&self, palette_index: usize) -> Option<&BoneNode> {
        let id = (*self.bones.get(palette_index)?)?;
        Some(&self.nodes[id.0])
    }

    pub fn bone_mut(&mut self, palette_index: usize) -> Option<&mut BoneNode> {
        let id = (*self.bones.get(palette_index)?)?;
        Some(&mut self.nodes[id.0])
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(NodeId)
    }
}
