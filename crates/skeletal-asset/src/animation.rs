use std::fmt::Debug;

use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationKeyFrame<T: Debug + Clone> {
    /// Clip-local time in ticks.
    pub time: f32,
    pub value: T,
}

impl<T: Debug + Clone> AnimationKeyFrame<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// All keyframes of one animated node, grouped per transform component.
///
/// Key arrays are kept in source order. Importers deliver them sorted by
/// time; nothing downstream re-sorts them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAnimationAsset {
    pub node_name: String,
    pub translation_keys: Vec<AnimationKeyFrame<Vec3>>,
    pub rotation_keys: Vec<AnimationKeyFrame<Quat>>,
    pub scale_keys: Vec<AnimationKeyFrame<Vec3>>,
}

impl NodeAnimationAsset {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            ..Default::default()
        }
    }

    /// Time of the latest key over all three components.
    pub fn length(&self) -> f32 {
        let translation = self.translation_keys.iter().map(|key| key.time);
        let rotation = self.rotation_keys.iter().map(|key| key.time);
        let scale = self.scale_keys.iter().map(|key| key.time);
        translation
            .chain(rotation)
            .chain(scale)
            .fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationAsset {
    pub name: Option<String>,
    /// Clip length in ticks.
    pub duration: f32,
    /// Zero when the source format leaves it unspecified.
    pub ticks_per_second: f32,
    pub channels: Vec<NodeAnimationAsset>,
}

impl AnimationAsset {
    /// Channel targeting `node_name`. When several channels target the same
    /// node the last one wins.
    pub fn channel(&self, node_name: &str) -> Option<&NodeAnimationAsset> {
        self.channels
            .iter()
            .rev()
            .find(|channel| channel.node_name == node_name)
    }

    pub fn targets(&self, node_name: &str) -> bool {
        self.channel(node_name).is_some()
    }
}
