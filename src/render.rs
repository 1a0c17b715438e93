// Instanced wgpu renderer: one draw call per mesh kind.
// Instance data is gathered from the ECS world each frame.

use std::sync::Arc;

use anyhow::Context;
use bevy_ecs::prelude::*;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::engine::debug_overlay::{DebugOverlay, DebugStats, OverlayState};
use crate::engine::mesh::{self, GpuVertex, RenderMesh};
use crate::engine::scenery::{GROUND_HALF_EXTENT, MOON_POSITION};
use crate::engine::{Color, DetailLabel, Emissive, MeshKind, Transform};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SKY_COLOR: wgpu::Color = wgpu::Color { r: 0.02, g: 0.03, b: 0.07, a: 1.0 };
/// Fog ramps from clear at FOG_START to sky colour at FOG_END.
const FOG_START: f32 = 25.0;
const FOG_END: f32 = 110.0;

// ============================================================================
// INSTANCE DATA (per-entity)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    model: [[f32; 4]; 4],
    /// rgb + lit flag in alpha (1 = lit and fogged, 0 = emissive)
    color: [f32; 4],
}

impl InstanceData {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance, // One per instance, not per vertex
            attributes: &Self::ATTRIBUTES,
        }
    }
}

// ============================================================================
// UNIFORM DATA
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    moon_dir: [f32; 4],
    /// (start, end, unused, unused)
    fog: [f32; 4],
}

// ============================================================================
// MESH BATCHES
// ============================================================================

const MESH_KINDS: [MeshKind; 7] = [
    MeshKind::Ground,
    MeshKind::Headstone,
    MeshKind::Plaque,
    MeshKind::Tree,
    MeshKind::Mote,
    MeshKind::Star,
    MeshKind::Moon,
];

fn slot(kind: MeshKind) -> usize {
    match kind {
        MeshKind::Ground => 0,
        MeshKind::Headstone => 1,
        MeshKind::Plaque => 2,
        MeshKind::Tree => 3,
        MeshKind::Mote => 4,
        MeshKind::Star => 5,
        MeshKind::Moon => 6,
    }
}

fn build_mesh(kind: MeshKind) -> RenderMesh {
    match kind {
        MeshKind::Ground => mesh::triangulate_flat(&mesh::ground(GROUND_HALF_EXTENT)),
        MeshKind::Headstone => mesh::triangulate_flat(&mesh::headstone()),
        MeshKind::Plaque => mesh::triangulate_flat(&mesh::plaque()),
        MeshKind::Tree => mesh::triangulate_flat(&mesh::tree()),
        MeshKind::Mote => mesh::triangulate_flat(&mesh::octahedron(0.06)),
        MeshKind::Star => mesh::triangulate_flat(&mesh::octahedron(0.7)),
        MeshKind::Moon => mesh::triangulate_smooth(&mesh::uv_sphere(1.0, 16, 24)),
    }
}

/// Shared geometry for one mesh kind plus a growable instance buffer.
struct MeshBatch {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    instance_count: u32,
}

impl MeshBatch {
    fn new(device: &wgpu::Device, kind: MeshKind) -> Self {
        let render_mesh = build_mesh(kind);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: render_mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: render_mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        let capacity = 64;
        Self {
            vertex_buffer,
            index_buffer,
            index_count: render_mesh.index_count() as u32,
            instance_buffer: Self::instance_buffer(device, capacity),
            capacity,
            instance_count: 0,
        }
    }

    fn instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (capacity * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[InstanceData]) {
        if instances.len() > self.capacity {
            self.capacity = instances.len().next_power_of_two();
            self.instance_buffer = Self::instance_buffer(device, self.capacity);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
        self.instance_count = instances.len() as u32;
    }
}

// ============================================================================
// RENDERER
// ============================================================================

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_view: wgpu::TextureView,
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    batches: Vec<MeshBatch>,
    staging: Vec<Vec<InstanceData>>,
}

impl Renderer {
    pub async fn new(window: Arc<winit::window::Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .context("requesting GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_instanced.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::desc(), InstanceData::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let batches = MESH_KINDS.iter().map(|&kind| MeshBatch::new(&device, kind)).collect();

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_view,
            render_pipeline,
            uniform_buffer,
            uniform_bind_group,
            batches,
            staging: vec![Vec::new(); MESH_KINDS.len()],
        })
    }

    pub fn device(&self) -> &wgpu::Device { &self.device }
    pub fn surface_format(&self) -> wgpu::TextureFormat { self.config.format }
    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> { self.size }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }

    /// Collect instances from the world and upload them with the camera uniforms.
    pub fn prepare(&mut self, world: &mut World, view_proj: Mat4, eye: Vec3) {
        for list in &mut self.staging {
            list.clear();
        }

        let mut query = world.query::<(&Transform, &Color, &MeshKind, Has<Emissive>, Option<&DetailLabel>)>();
        for (transform, color, kind, emissive, label) in query.iter(world) {
            if label.is_some_and(|l| !l.visible) {
                continue;
            }
            self.staging[slot(*kind)].push(InstanceData {
                model: transform.matrix().to_cols_array_2d(),
                color: [color.r, color.g, color.b, if emissive { 0.0 } else { 1.0 }],
            });
        }

        for (batch, instances) in self.batches.iter_mut().zip(&self.staging) {
            batch.upload(&self.device, &self.queue, instances);
        }

        let uniforms = Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: eye.extend(1.0).to_array(),
            moon_dir: MOON_POSITION.normalize().extend(0.0).to_array(),
            fog: [FOG_START, FOG_END, 0.0, 0.0],
        };
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    pub fn render(
        &mut self,
        window: &winit::window::Window,
        overlay: &mut DebugOverlay,
        overlay_state: &OverlayState,
        stats: &DebugStats,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SKY_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            for batch in self.batches.iter().filter(|b| b.instance_count > 0) {
                render_pass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, batch.instance_buffer.slice(..));
                render_pass.set_index_buffer(batch.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..batch.index_count, 0, 0..batch.instance_count);
            }
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };
        overlay.render(
            &self.device,
            &self.queue,
            &mut encoder,
            window,
            &view,
            &screen_descriptor,
            overlay_state,
            stats,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Draw calls issued per frame (one per non-empty batch).
    pub fn draw_calls(&self) -> u32 {
        self.batches.iter().filter(|b| b.instance_count > 0).count() as u32
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
