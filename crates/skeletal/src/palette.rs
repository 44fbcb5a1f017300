use std::ops::{Index, IndexMut};

use glam::Mat4;

/// Number of matrices in the palette and in the GPU uniform block.
pub const MAX_BONES: usize = 110;

/// Per-bone skinning matrices, overwritten every frame.
///
/// Slots start as identity and are never cleared; a slot no bone writes keeps
/// its previous value.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    matrices: Box<[Mat4; MAX_BONES]>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            matrices: Box::new([Mat4::IDENTITY; MAX_BONES]),
        }
    }
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matrices(&self) -> &[Mat4; MAX_BONES] {
        &self.matrices
    }

    pub fn get(&self, index: usize) -> Option<&Mat4> {
        self.matrices.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Mat4> {
        self.matrices.get_mut(index)
    }

    /// Column-major floats, the layout of the WGSL `mat4x4<f32>` array.
    pub fn to_cols_arrays(&self) -> Vec<[f32; 16]> {
        self.matrices.iter().map(Mat4::to_cols_array).collect()
    }
}

impl Index<usize> for Palette {
    type Output = Mat4;

    fn index(&self, index: usize) -> &Mat4 {
        &self.matrices[index]
    }
}

impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, index: usize) -> &mut Mat4 {
        &mut self.matrices[index]
    }
}
