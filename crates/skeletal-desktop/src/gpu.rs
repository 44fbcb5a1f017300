use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use skeletal::{
    model::{AnimatedModel, SkinningMode},
    palette::Palette,
    renderer::{
        shader::skinning_shader,
        uniform::palette::{palette_bind_group_layout, PaletteUniformBuffer},
        vertex::VertexBuffer,
    },
};
use wgpu::{
    BindGroupLayout, Device, DeviceDescriptor, Instance, InstanceDescriptor, Maintain, Queue,
    RequestAdapterOptions, ShaderModule,
};

/// GPU resources of one model: its palette block and mesh vertex buffers.
#[derive(Debug)]
struct ModelResources {
    palette: PaletteUniformBuffer,
    mode: SkinningMode,
    vertex_buffers: Vec<VertexBuffer>,
}

/// Headless device that receives every model's palette once per frame.
pub struct GpuContext {
    device: Device,
    queue: Queue,
    layout: BindGroupLayout,
    _shader: ShaderModule,
    models: Vec<ModelResources>,
}

impl GpuContext {
    pub fn new() -> Result<Self> {
        pollster::block_on(Self::create())
    }

    async fn create() -> Result<Self> {
        let instance = Instance::new(InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                compatible_surface: None,
                ..Default::default()
            })
            .await
            .ok_or_else(|| anyhow!("Failed to acquire a graphic adapter"))?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("Device"),
                    ..Default::default()
                },
                None,
            )
            .await
            .context("Failed to acquire a device")?;

        let layout = palette_bind_group_layout(&device);
        let shader = skinning_shader(&device);
        Ok(Self {
            device,
            queue,
            layout,
            _shader: shader,
            models: Vec::new(),
        })
    }

    /// Creates the palette block and vertex buffers for `model`.
    pub fn register(&mut self, model: &AnimatedModel) -> usize {
        let mode = model.skinning_mode();
        let palette = match mode {
            SkinningMode::Skinned => PaletteUniformBuffer::new(&self.device, &self.layout, model.palette()),
            SkinningMode::Static => PaletteUniformBuffer::identity(&self.device, &self.layout),
        };
        let vertex_buffers = model
            .meshes()
            .iter()
            .map(|mesh| {
                VertexBuffer::new(&self.device, &mesh.vertices(), mesh.mesh.name.as_deref())
            })
            .collect::<Vec<_>>();
        debug!("Registered model with {} vertex buffers", vertex_buffers.len());
        self.models.push(ModelResources {
            palette,
            mode,
            vertex_buffers,
        });
        self.models.len() - 1
    }

    /// Writes the palette of a registered model. Static models keep their
    /// identity block.
    pub fn upload(&self, index: usize, palette: &Palette) {
        if let Some(resources) = self.models.get(index) {
            if resources.mode == SkinningMode::Skinned {
                resources.palette.update(&self.queue, palette);
            }
        }
    }

    pub fn vertex_count(&self, index: usize) -> usize {
        self.models
            .get(index)
            .map(|resources| resources.vertex_buffers.iter().map(VertexBuffer::vertices).sum())
            .unwrap_or_default()
    }

    /// Submits pending writes and waits for the device.
    pub fn flush(&self) {
        self.queue.submit([]);
        self.device.poll(Maintain::Wait);
    }
}
