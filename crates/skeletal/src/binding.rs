use log::{debug, warn};
use skeletal_asset::mesh::MeshAsset;

use crate::skeleton::Skeleton;

pub const MAX_BONES_PER_VERTEX: usize = 4;

/// Bone influences of one vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VertexBoneBinding {
    pub indices: [u32; MAX_BONES_PER_VERTEX],
    pub weights: [f32; MAX_BONES_PER_VERTEX],
    pub count: usize,
}

impl VertexBoneBinding {
    /// Returns false when the vertex already has its full set of influences.
    pub fn push(&mut self, palette_index: u32, weight: f32) -> bool {
        if self.count == MAX_BONES_PER_VERTEX {
            return false;
        }
        self.indices[self.count] = palette_index;
        self.weights[self.count] = weight;
        self.count += 1;
        true
    }

    pub fn influences(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .take(self.count)
    }

    pub fn total_weight(&self) -> f32 {
        self.weights[..self.count].iter().sum()
    }

    pub fn normalize(&mut self) {
        let total = self.total_weight();
        if total > 0.0 {
            for weight in &mut self.weights[..self.count] {
                *weight /= total;
            }
        }
    }
}

/// Problems found while binding a mesh; none of them abort loading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingReport {
    /// Bone names in the weight data with no bone in the skeleton.
    pub unknown_bones: Vec<String>,
    /// Influences dropped because their bone is unknown.
    pub unknown_influences: usize,
    /// Influences past the per-vertex limit.
    pub dropped_influences: usize,
    pub out_of_range_vertices: usize,
}

impl BindingReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_bones.is_empty()
            && self.unknown_influences == 0
            && self.dropped_influences == 0
            && self.out_of_range_vertices == 0
    }
}

/// Scatters the mesh's per-bone weight lists onto its vertices and stores
/// each bone's offset matrix in the skeleton.
pub fn bind_mesh(
    skeleton: &mut Skeleton,
    mesh: &MeshAsset,
    normalize_weights: bool,
) -> (Vec<VertexBoneBinding>, BindingReport) {
    let mut bindings = vec![VertexBoneBinding::default(); mesh.vertex_count()];
    let mut report = BindingReport::default();

    for bone in &mesh.bones {
        let Some(palette_index) = skeleton.palette_index(&bone.name) else {
            for weight in bone.weights.iter().filter(|weight| weight.weight > 0.0) {
                warn!(
                    "Mesh {} weights vertex {} by unknown bone {}",
                    mesh.name.as_deref().unwrap_or("<unnamed>"),
                    weight.vertex,
                    bone.name
                );
                report.unknown_influences += 1;
            }
            report.unknown_bones.push(bone.name.clone());
            continue;
        };
        if let Some(node) = skeleton.bone_mut(palette_index) {
            node.bind_pose_offset = bone.offset;
        }

        for weight in bone.weights.iter().filter(|weight| weight.weight > 0.0) {
            let Some(binding) = bindings.get_mut(weight.vertex as usize) else {
                warn!(
                    "Bone {} weights vertex {} but the mesh has {} vertices",
                    bone.name,
                    weight.vertex,
                    mesh.vertex_count()
                );
                report.out_of_range_vertices += 1;
                continue;
            };
            if !binding.push(palette_index as u32, weight.weight) {
                report.dropped_influences += 1;
            }
        }
    }

    if report.dropped_influences > 0 {
        debug!(
            "Dropped {} influences past {} per vertex",
            report.dropped_influences, MAX_BONES_PER_VERTEX
        );
    }
    if normalize_weights {
        bindings.iter_mut().for_each(VertexBoneBinding::normalize);
    }
    (bindings, report)
}

#[cfg(test)]
mod test {
    use glam::{Mat4, Vec3};
    use pretty_assertions::assert_eq;
    use skeletal_asset::mesh::{BoneAsset, VertexWeight};

    use super::*;
    use crate::skeleton::{BoneNode, BoneTracks};

    fn skeleton(bones: usize) -> Skeleton {
        let mut skeleton = Skeleton::new(BoneNode::structural("root", Mat4::IDENTITY));
        let root = skeleton.root();
        for index in 0..bones {
            skeleton.add_child(
                root,
                BoneNode::bone(format!("b{}", index), index, BoneTracks::default(), Mat4::IDENTITY),
            );
        }
        skeleton
    }

    fn bone(name: &str, weights: &[(u32, f32)]) -> BoneAsset {
        BoneAsset {
            name: name.into(),
            offset: Mat4::from_translation(Vec3::X),
            weights: weights
                .iter()
                .map(|(vertex, weight)| VertexWeight {
                    vertex: *vertex,
                    weight: *weight,
                })
                .collect(),
        }
    }

    fn mesh(vertices: usize, bones: Vec<BoneAsset>) -> MeshAsset {
        MeshAsset {
            position: vec![[0.0; 3]; vertices],
            bones,
            ..Default::default()
        }
    }

    #[test]
    fn stores_offsets_and_skips_zero_weights() {
        let mut skeleton = skeleton(2);
        let mesh = mesh(2, vec![bone("b1", &[(0, 0.0), (1, 0.25)])]);
        let (bindings, report) = bind_mesh(&mut skeleton, &mesh, false);

        assert!(report.is_clean());
        assert_eq!(bindings[0].count, 0);
        assert_eq!(bindings[1].influences().collect::<Vec<_>>(), vec![(1, 0.25)]);
        assert_eq!(
            skeleton.bone(1).unwrap().bind_pose_offset,
            Mat4::from_translation(Vec3::X)
        );
        assert_eq!(skeleton.bone(0).unwrap().bind_pose_offset, Mat4::IDENTITY);
    }

    #[test]
    fn unknown_bones_and_bad_vertices_are_reported() {
        let mut skeleton = skeleton(1);
        let mesh = mesh(
            1,
            vec![bone("ghost", &[(0, 1.0)]), bone("b0", &[(0, 0.5), (7, 0.5)])],
        );
        let (bindings, report) = bind_mesh(&mut skeleton, &mesh, false);

        assert_eq!(report.unknown_bones, vec!["ghost".to_string()]);
        assert_eq!(report.unknown_influences, 1);
        assert_eq!(report.out_of_range_vertices, 1);
        assert_eq!(bindings[0].influences().collect::<Vec<_>>(), vec![(0, 0.5)]);
    }

    #[test]
    fn every_influence_of_an_unknown_bone_is_reported() {
        let mut skeleton = skeleton(1);
        let mesh = mesh(3, vec![bone("ghost", &[(0, 1.0), (1, 0.5), (2, 0.25), (1, 0.0)])]);
        let (bindings, report) = bind_mesh(&mut skeleton, &mesh, false);

        assert_eq!(report.unknown_influences, 3);
        assert_eq!(report.unknown_bones.len(), 1);
        assert!(!report.is_clean());
        assert!(bindings.iter().all(|binding| binding.count == 0));
    }

    #[test]
    fn normalization_is_opt_in() {
        let bones = vec![bone("b0", &[(0, 0.2)]), bone("b1", &[(0, 0.2)])];

        let (raw, _) = bind_mesh(&mut skeleton(2), &mesh(1, bones.clone()), false);
        assert!((raw[0].total_weight() - 0.4).abs() < 1e-6);

        let (normalized, _) = bind_mesh(&mut skeleton(2), &mesh(1, bones), true);
        assert_eq!(normalized[0].weights[..2], [0.5, 0.5]);
    }
}
