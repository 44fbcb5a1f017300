use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct DecomposedTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for DecomposedTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeTransform {
    Matrix(Mat4),
    Decomposed(DecomposedTransform),
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::Decomposed(DecomposedTransform::default())
    }
}

impl From<DecomposedTransform> for Mat4 {
    fn from(value: DecomposedTransform) -> Self {
        Mat4::from_translation(value.translation)
            * Mat4::from_quat(value.rotation)
            * Mat4::from_scale(value.scale)
    }
}

impl From<&NodeTransform> for Mat4 {
    fn from(value: &NodeTransform) -> Self {
        match value {
            NodeTransform::Matrix(matrix) => *matrix,
            NodeTransform::Decomposed(decomposed) => decomposed.clone().into(),
        }
    }
}

/// A node of the imported scene graph.
///
/// Names are always present: loaders synthesize one for formats that allow
/// anonymous nodes, because animation channels target nodes by name.
#[derive(Debug, Clone, Default)]
pub struct NodeAsset {
    pub name: String,
    pub transform: NodeTransform,
    /// Indices into [`SceneAsset::meshes`](crate::scene::SceneAsset::meshes).
    pub meshes: Vec<usize>,
    pub children: Vec<NodeAsset>,
}

impl NodeAsset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<NodeAsset>) -> Self {
        self.children = children;
        self
    }

    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from(&self.transform)
    }

    /// Depth-first, pre-order search preserving child order.
    pub fn find(&self, predicate: &impl Fn(&NodeAsset) -> bool) -> Option<&NodeAsset> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&NodeAsset> {
        self.find(&|node| node.name == name)
    }

    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeAsset::count).sum::<usize>()
    }
}
