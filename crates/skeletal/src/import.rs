use std::{collections::HashMap, error::Error, fmt::Display};

use glam::Mat4;
use log::{debug, info, warn};
use skeletal_asset::{animation::AnimationAsset, node::NodeAsset, scene::SceneAsset};

use crate::{
    palette::MAX_BONES,
    skeleton::{BoneNode, BoneTracks, NodeId, Skeleton},
    track::KeyframeTrack,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationSelector {
    Index(usize),
    Name(String),
}

impl Default for AnimationSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RootSelector {
    /// First node, depth first, targeted by the selected clip.
    #[default]
    FirstAnimated,
    Named(String),
    SceneRoot,
}

/// Local transform used for nodes without animation channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StructuralTransforms {
    #[default]
    Identity,
    RestPose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonImportParams {
    pub animation: AnimationSelector,
    pub root: RootSelector,
    pub structural_transforms: StructuralTransforms,
    /// Rescale each vertex's retained weights to sum to one.
    pub normalize_weights: bool,
    pub inverse_bind_transform: Mat4,
    pub speed: f32,
}

impl Default for SkeletonImportParams {
    fn default() -> Self {
        Self {
            animation: Default::default(),
            root: Default::default(),
            structural_transforms: Default::default(),
            normalize_weights: false,
            inverse_bind_transform: Mat4::IDENTITY,
            speed: 1.0,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum SkeletonError {
    NoAnimations,
    AnimationNotFound(AnimationSelector),
    NoAnimatedRoot,
    RootNotFound(String),
    TooManyBones(usize),
}

impl Display for SkeletonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkeletonError::NoAnimations => write!(f, "Scene has no animations"),
            SkeletonError::AnimationNotFound(AnimationSelector::Index(index)) => {
                write!(f, "Animation #{} not found", index)
            }
            SkeletonError::AnimationNotFound(AnimationSelector::Name(name)) => {
                write!(f, "Animation \"{}\" not found", name)
            }
            SkeletonError::NoAnimatedRoot => {
                write!(f, "No node in the scene is targeted by the animation")
            }
            SkeletonError::RootNotFound(name) => write!(f, "Root node \"{}\" not found", name),
            SkeletonError::TooManyBones(count) => write!(
                f,
                "Skeleton has {} bones, at most {} are supported",
                count, MAX_BONES
            ),
        }
    }
}

impl Error for SkeletonError {}

pub fn select_animation<'a>(
    scene: &'a SceneAsset,
    selector: &AnimationSelector,
) -> Result<&'a AnimationAsset, SkeletonError> {
    if scene.animations.is_empty() {
        return Err(SkeletonError::NoAnimations);
    }
    let animation = match selector {
        AnimationSelector::Index(index) => scene.animations.get(*index),
        AnimationSelector::Name(name) => scene
            .animations
            .iter()
            .find(|animation| animation.name.as_deref() == Some(name.as_str())),
    };
    animation.ok_or_else(|| SkeletonError::AnimationNotFound(selector.clone()))
}

fn select_root<'a>(
    scene: &'a SceneAsset,
    animation: &AnimationAsset,
    selector: &RootSelector,
) -> Result<&'a NodeAsset, SkeletonError> {
    match selector {
        RootSelector::FirstAnimated => scene
            .root
            .find(&|node| animation.targets(&node.name))
            .ok_or(SkeletonError::NoAnimatedRoot),
        RootSelector::Named(name) => scene
            .root
            .find_by_name(name)
            .ok_or_else(|| SkeletonError::RootNotFound(name.clone())),
        RootSelector::SceneRoot => Ok(&scene.root),
    }
}

struct SkeletonBuilder<'a> {
    animation: &'a AnimationAsset,
    next_palette_index: usize,
}

impl SkeletonBuilder<'_> {
    fn create_node(&mut self, node: &NodeAsset, skeleton: Option<&Skeleton>) -> BoneNode {
        let rest_transform = node.local_matrix();
        let Some(channel) = self.animation.channel(&node.name) else {
            return BoneNode::structural(&node.name, rest_transform);
        };

        let tracks = BoneTracks {
            translation: KeyframeTrack::new(channel.translation_keys.clone()),
            scale: KeyframeTrack::new(channel.scale_keys.clone()),
            rotation: KeyframeTrack::new(channel.rotation_keys.clone()),
        };
        if !(tracks.translation.is_strictly_ordered()
            && tracks.scale.is_strictly_ordered()
            && tracks.rotation.is_strictly_ordered())
        {
            warn!("Keys of bone {} are not strictly ordered by time", node.name);
        }

        let palette_index = self.next_palette_index;
        self.next_palette_index += 1;
        if let Some(existing) = skeleton.and_then(|skeleton| skeleton.palette_index(&node.name)) {
            warn!(
                "Duplicate bone name {}, palette index {} keeps the name",
                node.name, existing
            );
        }
        debug!("Bone {} -> palette index {}", node.name, palette_index);
        BoneNode::bone(&node.name, palette_index, tracks, rest_transform)
    }

    fn add_children(&mut self, skeleton: &mut Skeleton, parent: NodeId, node: &NodeAsset) {
        for child in &node.children {
            let bone = self.create_node(child, Some(skeleton));
            let id = skeleton.add_child(parent, bone);
            self.add_children(skeleton, id, child);
        }
    }

    fn build(mut self, root: &NodeAsset) -> Skeleton {
        let root_node = self.create_node(root, None);
        let mut skeleton = Skeleton::new(root_node);
        let root_id = skeleton.root();
        self.add_children(&mut skeleton, root_id, root);
        skeleton
    }
}

/// Builds the bone tree for the selected clip.
///
/// Nodes targeted by the clip become bones and get palette indices in
/// depth-first pre-order. Every other node below the root is kept as a
/// structural node so parent chains stay intact.
pub fn build_skeleton(
    scene: &SceneAsset,
    params: &SkeletonImportParams,
) -> Result<(Skeleton, HashMap<String, usize>), SkeletonError> {
    let animation = select_animation(scene, &params.animation)?;
    let root = select_root(scene, animation, &params.root)?;

    let skeleton = SkeletonBuilder {
        animation,
        next_palette_index: 0,
    }
    .build(root)
    .with_structural_transforms(params.structural_transforms);

    if skeleton.bone_count() > MAX_BONES {
        return Err(SkeletonError::TooManyBones(skeleton.bone_count()));
    }
    for channel in &animation.channels {
        if skeleton.palette_index(&channel.node_name).is_none() {
            debug!(
                "Channel for {} is outside the skeleton rooted at {}",
                channel.node_name, root.name
            );
        }
    }

    info!(
        "Built skeleton rooted at {}: {} nodes, {} bones",
        root.name,
        skeleton.len(),
        skeleton.bone_count()
    );
    let mapping = skeleton.bone_mapping().clone();
    Ok((skeleton, mapping))
}

#[cfg(test)]
mod test {
    use glam::Vec3;
    use pretty_assertions::assert_eq;
    use skeletal_asset::animation::{AnimationKeyFrame, NodeAnimationAsset};

    use super::*;

    fn channel(name: &str) -> NodeAnimationAsset {
        let mut channel = NodeAnimationAsset::new(name);
        channel.translation_keys = vec![
            AnimationKeyFrame::new(0.0, Vec3::ZERO),
            AnimationKeyFrame::new(1.0, Vec3::Y),
        ];
        channel
    }

    fn scene(channels: Vec<NodeAnimationAsset>) -> SceneAsset {
        SceneAsset {
            name: None,
            root: NodeAsset::new("scene").with_children(vec![
                NodeAsset::new("mesh"),
                NodeAsset::new("hips").with_children(vec![
                    NodeAsset::new("spine").with_children(vec![NodeAsset::new("head")]),
                    NodeAsset::new("socket").with_children(vec![NodeAsset::new("leg")]),
                ]),
            ]),
            animations: vec![AnimationAsset {
                name: Some("walk".into()),
                duration: 1.0,
                ticks_per_second: 24.0,
                channels,
            }],
            meshes: vec![],
        }
    }

    #[test]
    fn palette_indices_follow_pre_order() {
        let scene = scene(vec![channel("leg"), channel("head"), channel("hips")]);
        let (skeleton, mapping) = build_skeleton(&scene, &Default::default()).unwrap();

        let names: Vec<_> = skeleton.nodes().map(|(_, node)| node.name.as_str()).collect();
        assert_eq!(names, vec!["hips", "spine", "head", "socket", "leg"]);
        assert_eq!(mapping.get("hips"), Some(&0));
        assert_eq!(mapping.get("head"), Some(&1));
        assert_eq!(mapping.get("leg"), Some(&2));
        assert_eq!(skeleton.bone_count(), 3);
        assert!(!skeleton.node(skeleton.find("socket").unwrap()).is_bone());
    }

    #[test]
    fn scene_root_keeps_every_node() {
        let scene = scene(vec![channel("spine")]);
        let params = SkeletonImportParams {
            root: RootSelector::SceneRoot,
            ..Default::default()
        };
        let (skeleton, mapping) = build_skeleton(&scene, &params).unwrap();
        assert_eq!(skeleton.len(), 7);
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn named_root_must_exist() {
        let scene = scene(vec![channel("spine")]);
        let params = SkeletonImportParams {
            root: RootSelector::Named("tail".into()),
            ..Default::default()
        };
        assert_eq!(
            build_skeleton(&scene, &params).unwrap_err(),
            SkeletonError::RootNotFound("tail".into())
        );
    }

    #[test]
    fn animation_selection_errors() {
        let mut empty = scene(vec![]);
        assert_eq!(
            build_skeleton(&empty, &Default::default()).unwrap_err(),
            SkeletonError::NoAnimatedRoot
        );

        let params = SkeletonImportParams {
            animation: AnimationSelector::Name("run".into()),
            ..Default::default()
        };
        let err = build_skeleton(&empty, &params).unwrap_err();
        assert_eq!(err.to_string(), "Animation \"run\" not found");

        empty.animations.clear();
        assert_eq!(
            build_skeleton(&empty, &Default::default()).unwrap_err(),
            SkeletonError::NoAnimations
        );
    }
}
