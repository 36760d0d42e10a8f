use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::bytes_of;
use log::{error, info};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use super::common::{GlobalUniform, ObjectConstants};
use super::shaders::{MARKER_SHADER, MODEL_SHADER};
use super::textures::{self, GpuTexture};
use crate::app::{FrameState, CLEAR_COLOR};
use crate::assets::{SceneAssets, TextureEntry};
use crate::model::{MaterialMaps, MeshData, VERTEX_STRIDE};
use crate::scene::{ModelId, SHININESS};
use crate::texture::TextureData;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

/// GPU renderer backed by wgpu that draws the scene models and light markers.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: DepthBuffer,
    model_pipeline: wgpu::RenderPipeline,
    marker_pipeline: wgpu::RenderPipeline,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    black: GpuTexture,
    texture_cache: HashMap<PathBuf, GpuTexture>,
    missing_textures: HashSet<PathBuf>,
    cube: MeshBuffers,
    placeholder_material: wgpu::BindGroup,
    models: HashMap<ModelId, Vec<GpuMesh>>,
}

impl Renderer {
    /// Initializes the GPU renderer for the provided window.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("renderer-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;
        info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = pick_surface_format(&surface_caps.formats)
            .context("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let global_layout = uniform_layout::<GlobalUniform>(&device, "global-bind-layout");
        let object_layout = uniform_layout::<ObjectConstants>(&device, "object-bind-layout");
        let material_layout = textures::material_layout(&device);

        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("global-uniform"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("global-bind-group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        let model_pipeline = create_pipeline(
            &device,
            surface_format,
            PipelineKind::Model,
            &[&global_layout, &object_layout, &material_layout],
        );
        let marker_pipeline = create_pipeline(
            &device,
            surface_format,
            PipelineKind::Marker,
            &[&global_layout, &object_layout],
        );

        let sampler = textures::create_sampler(&device);
        let white = GpuTexture::upload(&device, &queue, &TextureData::solid(WHITE), "white");
        let black = GpuTexture::upload(&device, &queue, &TextureData::solid(BLACK), "black");
        let placeholder_material = textures::material_bind_group(
            &device,
            &material_layout,
            &sampler,
            &white,
            &black,
            "placeholder-material",
        );
        let cube = MeshBuffers::from_mesh(&device, &MeshData::cube(), "cube");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth,
            model_pipeline,
            marker_pipeline,
            global_buffer,
            global_bind_group,
            object_layout,
            material_layout,
            sampler,
            white,
            black,
            texture_cache: HashMap::new(),
            missing_textures: HashSet::new(),
            cube,
            placeholder_material,
            models: HashMap::new(),
        })
    }

    /// Uploads every scene model. A model that failed to load is drawn as a
    /// cube wearing the container textures.
    pub fn upload_scene(&mut self, assets: &SceneAssets) {
        let diffuse = self.upload_standalone(&assets.diffuse_map, "container-diffuse");
        let specular = self.upload_standalone(&assets.specular_map, "container-specular");
        self.placeholder_material = textures::material_bind_group(
            &self.device,
            &self.material_layout,
            &self.sampler,
            diffuse.as_ref().unwrap_or(&self.white),
            specular.as_ref().unwrap_or(&self.black),
            "placeholder-material",
        );

        for entry in &assets.models {
            let meshes = match &entry.model {
                Ok(model) => model
                    .meshes
                    .iter()
                    .map(|mesh| self.upload_mesh(mesh))
                    .collect(),
                Err(_) => vec![GpuMesh {
                    buffers: MeshBuffers::from_mesh(
                        &self.device,
                        &MeshData::cube(),
                        entry.id.path(),
                    ),
                    material: self.placeholder_material.clone(),
                }],
            };
            self.models.insert(entry.id, meshes);
        }
        info!(
            "uploaded {} models ({} textures)",
            self.models.len(),
            self.texture_cache.len()
        );
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Exposes the inner window for event handling.
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn aspect(&self) -> f32 {
        if self.size.height == 0 {
            1.0
        } else {
            self.size.width as f32 / self.size.height as f32
        }
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Reconfigures the surface at its current size after it was lost.
    pub fn reconfigure(&mut self) {
        let size = self.window.inner_size();
        self.resize(size);
    }

    /// Draws every scene object followed by the light markers.
    pub fn render(&mut self, frame: &FrameState) -> Result<(), wgpu::SurfaceError> {
        let uniform = GlobalUniform::new(&frame.camera, &frame.light, SHININESS);
        self.queue
            .write_buffer(&self.global_buffer, 0, bytes_of(&uniform));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer-encoder"),
            });

        let model_groups: Vec<_> = frame
            .draws
            .iter()
            .map(|draw| (draw.model, self.object_bind_group(draw.transform)))
            .collect();
        let marker_groups: Vec<_> = frame
            .markers
            .iter()
            .map(|transform| self.object_bind_group(*transform))
            .collect();

        let [r, g, b, a] = CLEAR_COLOR;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("main-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.model_pipeline);
        pass.set_bind_group(0, &self.global_bind_group, &[]);
        for (model, object_group) in &model_groups {
            let Some(meshes) = self.models.get(model) else {
                continue;
            };
            pass.set_bind_group(1, object_group, &[]);
            for mesh in meshes {
                pass.set_bind_group(2, &mesh.material, &[]);
                mesh.buffers.draw(&mut pass);
            }
        }

        pass.set_pipeline(&self.marker_pipeline);
        pass.set_bind_group(0, &self.global_bind_group, &[]);
        for object_group in &marker_groups {
            pass.set_bind_group(1, object_group, &[]);
            self.cube.draw(&mut pass);
        }

        drop(pass);
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn object_bind_group(&self, model: glam::Mat4) -> wgpu::BindGroup {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("object-uniform"),
                contents: bytes_of(&ObjectConstants::new(model)),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object-bind-group"),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    fn upload_standalone(&self, entry: &TextureEntry, label: &str) -> Option<GpuTexture> {
        entry
            .texture
            .as_ref()
            .ok()
            .map(|data| GpuTexture::upload(&self.device, &self.queue, data, label))
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> GpuMesh {
        GpuMesh {
            buffers: MeshBuffers::from_mesh(&self.device, mesh, &mesh.name),
            material: self.material_for(&mesh.material, &mesh.name),
        }
    }

    fn material_for(&mut self, maps: &MaterialMaps, label: &str) -> wgpu::BindGroup {
        for path in [&maps.diffuse, &maps.specular].into_iter().flatten() {
            self.ensure_texture_loaded(path);
        }
        let diffuse = maps
            .diffuse
            .as_ref()
            .and_then(|path| self.texture_cache.get(path))
            .unwrap_or(&self.white);
        let specular = maps
            .specular
            .as_ref()
            .and_then(|path| self.texture_cache.get(path))
            .unwrap_or(&self.black);
        textures::material_bind_group(
            &self.device,
            &self.material_layout,
            &self.sampler,
            diffuse,
            specular,
            &format!("{label}-material"),
        )
    }

    fn ensure_texture_loaded(&mut self, path: &Path) {
        if self.texture_cache.contains_key(path) || self.missing_textures.contains(path) {
            return;
        }
        match TextureData::load(path) {
            Ok(data) => {
                let label = path.display().to_string();
                let texture = GpuTexture::upload(&self.device, &self.queue, &data, &label);
                self.texture_cache.insert(path.to_path_buf(), texture);
            }
            Err(err) => {
                error!("{err}");
                self.missing_textures.insert(path.to_path_buf());
            }
        }
    }
}

struct GpuMesh {
    buffers: MeshBuffers,
    material: wgpu::BindGroup,
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Prefers a linear format so clear colors and shaded output are stored
/// without sRGB encoding.
fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|format| !format.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

fn uniform_layout<T>(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
            },
            count: None,
        }],
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PipelineKind {
    Model,
    Marker,
}

fn create_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    kind: PipelineKind,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let (label, source) = match kind {
        PipelineKind::Model => ("model-pipeline", MODEL_SHADER),
        PipelineKind::Marker => ("marker-pipeline", MARKER_SHADER),
    };
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    let model_attributes = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];
    let marker_attributes = wgpu::vertex_attr_array![0 => Float32x3];
    let attributes: &[wgpu::VertexAttribute] = match kind {
        PipelineKind::Model => &model_attributes,
        PipelineKind::Marker => &marker_attributes,
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: (VERTEX_STRIDE * std::mem::size_of::<f32>()) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            }],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_format_skips_srgb_variants() {
        let formats = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        assert_eq!(
            pick_surface_format(&formats),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
    }

    #[test]
    fn surface_format_falls_back_to_first_reported() {
        let formats = [wgpu::TextureFormat::Rgba8UnormSrgb];
        assert_eq!(
            pick_surface_format(&formats),
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(pick_surface_format(&[]), None);
    }
}
