use glam::Mat4;

pub type Position = Vec<[f32; 3]>;
pub type Normal = Vec<[f32; 3]>;
pub type TexCoord = Vec<[f32; 2]>;
pub type Tangent = Vec<[f32; 3]>;
pub type Bitangent = Vec<[f32; 3]>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

/// One bone's influence over a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneAsset {
    /// Name of the scene node driving this bone.
    pub name: String,
    /// Maps mesh-space bind-pose coordinates into the bone's local space.
    pub offset: Mat4,
    pub weights: Vec<VertexWeight>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshAsset {
    pub name: Option<String>,
    pub position: Position,
    pub normal: Normal,
    pub tex_coord: TexCoord,
    pub tangent: Tangent,
    pub bitangent: Bitangent,
    pub indices: Vec<u32>,
    pub bones: Vec<BoneAsset>,
}

impl MeshAsset {
    pub fn vertex_count(&self) -> usize {
        self.position.len()
    }

    pub fn is_skinned(&self) -> bool {
        !self.bones.is_empty()
    }
}
