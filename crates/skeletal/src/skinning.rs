//! CPU reference of the weighted palette sum done by the skinning shader.

use glam::Vec3;

use crate::{binding::VertexBoneBinding, palette::Palette};

/// `sum(weight_i * palette[index_i] * position)`. A vertex without influences
/// is returned unchanged.
pub fn skin_position(palette: &Palette, binding: &VertexBoneBinding, position: Vec3) -> Vec3 {
    if binding.count == 0 {
        return position;
    }
    binding
        .influences()
        .filter_map(|(index, weight)| Some((palette.get(index as usize)?, weight)))
        .fold(Vec3::ZERO, |sum, (matrix, weight)| {
            sum + matrix.transform_point3(position) * weight
        })
}

pub fn skin_normal(palette: &Palette, binding: &VertexBoneBinding, normal: Vec3) -> Vec3 {
    if binding.count == 0 {
        return normal;
    }
    binding
        .influences()
        .filter_map(|(index, weight)| Some((palette.get(index as usize)?, weight)))
        .fold(Vec3::ZERO, |sum, (matrix, weight)| {
            sum + matrix.transform_vector3(normal) * weight
        })
        .normalize_or_zero()
}
