use glam::Mat4;
use log::{trace, warn};

use crate::{
    palette::{Palette, MAX_BONES},
    skeleton::{NodeId, Skeleton},
};

/// Walks the skeleton once and writes every bone's skinning matrix,
/// `inverse_bind * global * bind_pose_offset`, into its palette slot.
///
/// Slots without a bone are left untouched. Returns the number of slots
/// written, which is the skeleton's bone count.
pub fn evaluate(
    skeleton: &Skeleton,
    parent_global: Mat4,
    inverse_bind: Mat4,
    anim_time: f32,
    palette: &mut Palette,
) -> usize {
    let written = evaluate_node(
        skeleton,
        skeleton.root(),
        parent_global,
        inverse_bind,
        anim_time,
        palette,
    );
    trace!("Evaluated {} bones at t={}", written, anim_time);
    written
}

fn evaluate_node(
    skeleton: &Skeleton,
    id: NodeId,
    parent_global: Mat4,
    inverse_bind: Mat4,
    anim_time: f32,
    palette: &mut Palette,
) -> usize {
    let node = skeleton.node(id);
    let global = parent_global * skeleton.local_transform(node, anim_time);

    let mut written = 0;
    if let Some(index) = node.palette_index {
        match palette.get_mut(index) {
            Some(entry) => {
                *entry = inverse_bind * global * node.bind_pose_offset;
                written += 1;
            }
            None => warn!(
                "Bone {} has palette index {}, past the {} palette slots",
                node.name, index, MAX_BONES
            ),
        }
    }
    for child in &node.children {
        written += evaluate_node(skeleton, *child, global, inverse_bind, anim_time, palette);
    }
    written
}

#[cfg(test)]
mod test {
    use glam::Vec3;
    use skeletal_asset::animation::AnimationKeyFrame;

    use super::*;
    use crate::{
        import::StructuralTransforms,
        skeleton::{BoneNode, BoneTracks},
        track::KeyframeTrack,
    };

    fn raised(value: Vec3) -> BoneTracks {
        BoneTracks {
            translation: KeyframeTrack::new(vec![
                AnimationKeyFrame::new(0.0, value),
                AnimationKeyFrame::new(10.0, value),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn structural_nodes_use_rest_pose_when_asked() {
        let shift = Mat4::from_translation(Vec3::Z);
        let mut skeleton = Skeleton::new(BoneNode::structural("root", shift));
        let root = skeleton.root();
        skeleton.add_child(root, BoneNode::bone("b", 0, raised(Vec3::Y), shift));

        let mut palette = Palette::new();
        evaluate(&skeleton, Mat4::IDENTITY, Mat4::IDENTITY, 1.0, &mut palette);
        assert!(palette[0]
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::Y, 1e-6));

        let skeleton = skeleton.with_structural_transforms(StructuralTransforms::RestPose);
        evaluate(&skeleton, Mat4::IDENTITY, Mat4::IDENTITY, 1.0, &mut palette);
        assert!(palette[0]
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(0.0, 1.0, 1.0), 1e-6));
    }

    #[test]
    fn untouched_slots_keep_their_value() {
        let skeleton = Skeleton::new(BoneNode::bone("b", 0, raised(Vec3::X), Mat4::IDENTITY));
        let mut palette = Palette::new();
        let marker = Mat4::from_scale(Vec3::splat(3.0));
        palette[5] = marker;

        let written = evaluate(&skeleton, Mat4::IDENTITY, Mat4::IDENTITY, 0.5, &mut palette);
        assert_eq!(written, 1);
        assert_eq!(palette[5], marker);
        assert_eq!(palette[1], Mat4::IDENTITY);
    }

    #[test]
    fn bone_past_the_palette_is_skipped() {
        let mut skeleton = Skeleton::new(BoneNode::bone("b", 0, raised(Vec3::X), Mat4::IDENTITY));
        let root = skeleton.root();
        skeleton.add_child(
            root,
            BoneNode::bone("overflow", MAX_BONES, raised(Vec3::Y), Mat4::IDENTITY),
        );

        let mut palette = Palette::new();
        let written = evaluate(&skeleton, Mat4::IDENTITY, Mat4::IDENTITY, 0.0, &mut palette);
        assert_eq!(written, 1);
        assert!(palette[0]
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::X, 1e-6));
        assert_eq!(palette[MAX_BONES - 1], Mat4::IDENTITY);
    }

    #[test]
    fn inverse_bind_and_offset_wrap_the_global_transform() {
        let mut node = BoneNode::bone("b", 0, raised(Vec3::X), Mat4::IDENTITY);
        node.bind_pose_offset = Mat4::from_translation(Vec3::Y);
        let skeleton = Skeleton::new(node);
        let inverse_bind = Mat4::from_scale(Vec3::splat(2.0));

        let mut palette = Palette::new();
        evaluate(&skeleton, Mat4::IDENTITY, inverse_bind, 0.0, &mut palette);
        let moved = palette[0].transform_point3(Vec3::ZERO);
        assert!(moved.abs_diff_eq(Vec3::new(2.0, 2.0, 0.0), 1e-6));
    }
}
