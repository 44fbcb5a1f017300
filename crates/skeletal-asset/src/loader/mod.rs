/// GLTF loader with `gltf` crate.
#[cfg(feature = "gltf")]
pub mod gltf;

#[derive(Debug, Clone)]
pub struct LoadParams {
    /// Scene to import; the document's default scene (or its first scene)
    /// when unset.
    pub scene: Option<usize>,
    /// Generate normals and tangent space for meshes that lack them.
    pub generate_tangents: bool,
}

impl Default for LoadParams {
    fn default() -> Self {
        Self {
            scene: None,
            generate_tangents: true,
        }
    }
}

#[inline]
fn clip_vec4_to_vec3(data: &[[f32; 4]]) -> Vec<[f32; 3]> {
    data.iter().map(|[x, y, z, _w]| [*x, *y, *z]).collect()
}
