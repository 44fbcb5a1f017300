//! Normal and tangent-space generation for meshes that arrive without it.

use glam::{Vec2, Vec3};

const UV_DETERMINANT_LIMIT: f32 = 1e-8;

fn triangles(vertex_count: usize, indices: &[u32]) -> Vec<[usize; 3]> {
    let triangle = |chunk: &[usize]| [chunk[0], chunk[1], chunk[2]];
    if indices.is_empty() {
        let all: Vec<usize> = (0..vertex_count).collect();
        all.chunks_exact(3).map(triangle).collect()
    } else {
        indices
            .chunks_exact(3)
            .map(|chunk| [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize])
            .filter(|triangle| triangle.iter().all(|index| *index < vertex_count))
            .collect()
    }
}

/// Area-weighted smooth normals of an indexed triangle list.
pub fn calculate_normal(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for [a, b, c] in triangles(positions.len(), indices) {
        let (pa, pb, pc) = (
            Vec3::from_array(positions[a]),
            Vec3::from_array(positions[b]),
            Vec3::from_array(positions[c]),
        );
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|normal| normal.normalize_or_zero().to_array())
        .collect()
}

/// Per-vertex tangents and bitangents derived from texture coordinates,
/// orthogonalized against the given normals.
pub fn calculate_tangent(
    positions: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
    normals: &[[f32; 3]],
    indices: &[u32],
) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
    let count = positions.len();
    let mut tangents = vec![Vec3::ZERO; count];
    let mut bitangents = vec![Vec3::ZERO; count];
    if tex_coords.len() == count {
        for [a, b, c] in triangles(count, indices) {
            let p0 = Vec3::from_array(positions[a]);
            let edge1 = Vec3::from_array(positions[b]) - p0;
            let edge2 = Vec3::from_array(positions[c]) - p0;
            let uv0 = Vec2::from_array(tex_coords[a]);
            let duv1 = Vec2::from_array(tex_coords[b]) - uv0;
            let duv2 = Vec2::from_array(tex_coords[c]) - uv0;
            let determinant = duv1.x * duv2.y - duv2.x * duv1.y;
            if determinant.abs() < UV_DETERMINANT_LIMIT {
                continue;
            }
            let r = 1.0 / determinant;
            let tangent = (edge1 * duv2.y - edge2 * duv1.y) * r;
            let bitangent = (edge2 * duv1.x - edge1 * duv2.x) * r;
            for index in [a, b, c] {
                tangents[index] += tangent;
                bitangents[index] += bitangent;
            }
        }
    }

    let tangents = tangents
        .into_iter()
        .enumerate()
        .map(|(index, tangent)| {
            let normal = normals
                .get(index)
                .map(|normal| Vec3::from_array(*normal))
                .unwrap_or(Vec3::ZERO);
            (tangent - normal * normal.dot(tangent))
                .normalize_or_zero()
                .to_array()
        })
        .collect();
    let bitangents = bitangents
        .into_iter()
        .map(|bitangent| bitangent.normalize_or_zero().to_array())
        .collect();
    (tangents, bitangents)
}
