//! Scene import abstraction for the skeletal animation core.
//!
//! The types here describe an imported scene the way the animation core
//! wants to see it: one root node with named children, animation clips
//! whose channels target nodes by name, and meshes that carry their
//! vertex attributes plus per-bone vertex weight lists. Loaders turn a
//! concrete file format into a [`scene::SceneAsset`].

pub mod animation;
/// Model loaders for supported formats
pub mod loader;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod tangent;
