use std::mem::size_of;

use bytemuck::{cast_slice, Pod, Zeroable};
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    vertex_attr_array, Buffer, BufferAddress, BufferUsages, Device, VertexAttribute,
    VertexBufferLayout, VertexStepMode,
};

use crate::binding::VertexBoneBinding;

pub trait Vertex: Copy + Clone + Pod + Zeroable {
    const ATTRIBS: &[VertexAttribute];

    fn desc<'a>() -> VertexBufferLayout<'a> {
        VertexBufferLayout {
            array_stride: size_of::<Self>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub bone_ids: [u32; 4],
    pub bone_weights: [f32; 4],
}

impl SkinnedVertex {
    /// Unused influence slots carry index 0 with weight 0.
    pub fn with_binding(mut self, binding: &VertexBoneBinding) -> Self {
        self.bone_ids = [0; 4];
        self.bone_weights = [0.0; 4];
        for (slot, (index, weight)) in binding.influences().enumerate() {
            self.bone_ids[slot] = index;
            self.bone_weights[slot] = weight;
        }
        self
    }
}

impl Vertex for SkinnedVertex {
    const ATTRIBS: &[VertexAttribute] = &vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
        4 => Float32x3,
        5 => Uint32x4,
        6 => Float32x4
    ];
}

#[derive(Debug)]
pub struct VertexBuffer {
    buffer: Buffer,
    vertices: usize,
}

impl VertexBuffer {
    pub fn new<T: Vertex>(device: &Device, vertices: &[T], label: Option<&str>) -> Self {
        let buffer = device.create_buffer_init(&BufferInitDescriptor {
            label,
            contents: cast_slice(vertices),
            usage: BufferUsages::VERTEX,
        });
        Self {
            buffer,
            vertices: vertices.len(),
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn vertices(&self) -> usize {
        self.vertices
    }
}
