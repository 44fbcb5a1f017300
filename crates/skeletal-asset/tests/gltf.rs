use glam::{Mat4, Quat, Vec3};
use pretty_assertions::assert_eq;
use skeletal_asset::{
    loader::{gltf::load_from_slice, LoadParams},
    mesh::VertexWeight,
};

const TWO_BONES: &[u8] = include_bytes!("data/two_bones.gltf");

#[test]
fn loads_node_tree_with_names() {
    let scene = load_from_slice(TWO_BONES, &LoadParams::default()).unwrap();
    assert_eq!(scene.root.name, "Scene");
    assert_eq!(scene.root.children.len(), 1);
    let armature = &scene.root.children[0];
    let names: Vec<&str> = armature.children.iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names, vec!["Root", "Body"]);
    assert_eq!(armature.children[0].children[0].name, "Child");
    assert_eq!(scene.root.find_by_name("Body").unwrap().meshes, vec![0]);
}

#[test]
fn inverts_vertex_joints_into_bone_weight_lists() {
    let scene = load_from_slice(TWO_BONES, &LoadParams::default()).unwrap();
    assert_eq!(scene.meshes.len(), 1);
    let mesh = &scene.meshes[0];
    assert_eq!(mesh.vertex_count(), 3);
    assert!(mesh.is_skinned());

    let root = &mesh.bones[0];
    assert_eq!(root.name, "Root");
    assert_eq!(root.offset, Mat4::IDENTITY);
    assert_eq!(
        root.weights,
        vec![
            VertexWeight { vertex: 0, weight: 1.0 },
            VertexWeight { vertex: 2, weight: 0.5 },
        ]
    );
    let child = &mesh.bones[1];
    assert_eq!(child.name, "Child");
    assert_eq!(
        child.weights,
        vec![
            VertexWeight { vertex: 1, weight: 1.0 },
            VertexWeight { vertex: 2, weight: 0.5 },
        ]
    );
}

#[test]
fn generates_missing_normals() {
    let scene = load_from_slice(TWO_BONES, &LoadParams::default()).unwrap();
    for normal in &scene.meshes[0].normal {
        assert!(Vec3::from_array(*normal).abs_diff_eq(Vec3::Z, 1e-6));
    }
}

#[test]
fn merges_channels_per_node_and_reads_timing() {
    let scene = load_from_slice(TWO_BONES, &LoadParams::default()).unwrap();
    assert_eq!(scene.animations.len(), 2);

    let idle = &scene.animations[0];
    assert_eq!(idle.name.as_deref(), Some("idle"));
    assert_eq!(idle.duration, 2.0);
    assert_eq!(idle.ticks_per_second, 1.0);
    let channel = idle.channel("Child").unwrap();
    assert!(channel.translation_keys.is_empty());
    assert_eq!(channel.rotation_keys.len(), 2);
    assert_eq!(channel.rotation_keys[1].time, 2.0);
    assert!(channel.rotation_keys[1]
        .value
        .abs_diff_eq(Quat::from_xyzw(0.0, 1.0, 0.0, 0.0), 1e-6));

    let fly = &scene.animations[1];
    assert_eq!(fly.duration, 1.0);
    let channel = fly.channel("Root").unwrap();
    assert_eq!(channel.translation_keys[1].value, Vec3::Y);
}

#[test]
fn rejects_garbage() {
    assert!(load_from_slice(b"not a model", &LoadParams::default()).is_err());
}

#[test]
fn missing_scene_index_is_reported() {
    let params = LoadParams {
        scene: Some(4),
        ..Default::default()
    };
    let error = load_from_slice(TWO_BONES, &params).unwrap_err();
    assert_eq!(error.to_string(), "Scene #4 not found");
}

const SPLINE_TANGENTS: &[u8] = include_bytes!("data/spline_tangents.gltf");

#[test]
fn unnamed_nodes_are_named_by_index() {
    let scene = load_from_slice(SPLINE_TANGENTS, &LoadParams::default()).unwrap();
    let hips = &scene.root.children[0];
    let names: Vec<&str> = hips.children.iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names, vec!["node_1", "Skin"]);

    let bones: Vec<&str> = scene.meshes[0].bones.iter().map(|bone| bone.name.as_str()).collect();
    assert_eq!(bones, vec!["Hips", "node_1"]);
}

#[test]
fn cubic_spline_keeps_the_value_of_each_triple() {
    let scene = load_from_slice(SPLINE_TANGENTS, &LoadParams::default()).unwrap();
    let mixed = &scene.animations[0];
    let channel = mixed.channel("node_1").unwrap();
    let values: Vec<Vec3> = channel.translation_keys.iter().map(|key| key.value).collect();
    assert_eq!(values, vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)]);
    assert_eq!(channel.translation_keys[1].time, 1.0);
    assert_eq!(mixed.duration, 1.0);
}

#[test]
fn step_keys_are_loaded_as_plain_keys() {
    let scene = load_from_slice(SPLINE_TANGENTS, &LoadParams::default()).unwrap();
    let channel = scene.animations[0].channel("Hips").unwrap();
    let values: Vec<Vec3> = channel.scale_keys.iter().map(|key| key.value).collect();
    assert_eq!(values, vec![Vec3::ONE, Vec3::splat(2.0)]);
    assert!(channel.translation_keys.is_empty());
}

#[test]
fn morph_weight_channels_are_skipped() {
    let scene = load_from_slice(SPLINE_TANGENTS, &LoadParams::default()).unwrap();
    let mixed = &scene.animations[0];
    assert!(mixed.channel("Skin").is_none());
    assert!(!mixed.targets("Skin"));
    assert_eq!(mixed.channels.len(), 2);
}

#[test]
fn bitangent_follows_tangent_handedness() {
    let scene = load_from_slice(SPLINE_TANGENTS, &LoadParams::default()).unwrap();
    let mesh = &scene.meshes[0];
    assert_eq!(mesh.tangent, vec![[1.0, 0.0, 0.0]; 3]);
    for bitangent in &mesh.bitangent {
        // cross(+Z, +X) = +Y, flipped by w = -1
        assert!(Vec3::from_array(*bitangent).abs_diff_eq(Vec3::NEG_Y, 1e-6));
    }
}
