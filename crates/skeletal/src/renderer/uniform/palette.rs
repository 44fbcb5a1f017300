use bytemuck::cast_slice;
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType, BufferUsages, Device, Queue,
    ShaderStages,
};

use crate::palette::{Palette, MAX_BONES};

/// Binding slot of the palette inside its bind group.
pub const PALETTE_BINDING: u32 = 0;

/// Size in bytes of the palette block, `MAX_BONES` column-major 4x4 floats.
pub const PALETTE_SIZE: usize = MAX_BONES * 16 * 4;

pub fn palette_bind_group_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        entries: &[BindGroupLayoutEntry {
            binding: PALETTE_BINDING,
            visibility: ShaderStages::VERTEX,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("Palette Bind Group Layout"),
    })
}

#[derive(Debug)]
pub struct PaletteUniformBuffer {
    buffer: Buffer,
    bind_group: BindGroup,
}

impl PaletteUniformBuffer {
    pub fn new(device: &Device, layout: &BindGroupLayout, palette: &Palette) -> Self {
        let buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Palette Uniform Buffer"),
            contents: cast_slice(&palette.to_cols_arrays()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            layout,
            entries: &[BindGroupEntry {
                binding: PALETTE_BINDING,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Palette Bind Group"),
        });
        Self { buffer, bind_group }
    }

    /// Palette of identity matrices, for meshes drawn without skinning.
    pub fn identity(device: &Device, layout: &BindGroupLayout) -> Self {
        Self::new(device, layout, &Palette::default())
    }

    pub fn update(&self, queue: &Queue, palette: &Palette) {
        queue.write_buffer(&self.buffer, 0, cast_slice(&palette.to_cols_arrays()));
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn bind_group(&self) -> &BindGroup {
        &self.bind_group
    }
}
