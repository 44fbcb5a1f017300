use super::{animation::AnimationAsset, mesh::MeshAsset, node::NodeAsset};

#[derive(Debug, Clone, Default)]
pub struct SceneAsset {
    pub name: Option<String>,
    pub root: NodeAsset,
    pub animations: Vec<AnimationAsset>,
    pub meshes: Vec<MeshAsset>,
}
