use wgpu::{include_wgsl, Device, ShaderModule};

/// WGSL source declaring the palette block and skinned vertex inputs.
pub const SKINNING_WGSL: &str = include_str!("../shader/skinning.wgsl");

pub fn skinning_shader(device: &Device) -> ShaderModule {
    device.create_shader_module(include_wgsl!("../shader/skinning.wgsl"))
}
