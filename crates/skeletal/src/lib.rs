//! Skeletal animation: bone hierarchy import, keyframe sampling and the
//! per-frame bone matrix palette consumed by vertex skinning.

pub mod binding;
pub mod clock;
pub mod import;
pub mod model;
pub mod palette;
pub mod pose;
pub mod renderer;
pub mod skeleton;
pub mod skinning;
pub mod track;
