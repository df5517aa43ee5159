//! Renderer: wgpu init, depth buffer, textured posable objects.
//! wgpu = 23.x, winit = 0.30.x

use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Mat4, Vec4};
use wgpu::{
    BindGroupLayout, BlendState, ColorTargetState, ColorWrites, CommandEncoderDescriptor,
    DepthBiasState, DepthStencilState, Device, DeviceDescriptor, Extent3d, Features,
    FragmentState, Instance, InstanceDescriptor, Limits, LoadOp, Operations,
    PipelineLayoutDescriptor, PowerPreference, PresentMode, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, ShaderModuleDescriptor,
    ShaderSource, StoreOp, Surface, SurfaceConfiguration, SurfaceError, TextureDescriptor,
    TextureDimension, TextureFormat, TextureUsages, TextureView, TextureViewDescriptor,
    VertexState,
};
use winit::{dpi::PhysicalSize, window::Window};

use asset::{MeshBuffer, TextureData};

mod object;

pub use object::{ObjectUniform, VERTEX_LAYOUT};
use object::{GpuObject, object_bind_group_layout};

/// Maps OpenGL clip depth [-1, 1] onto wgpu's [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// One object to draw this frame.
#[derive(Clone, Copy, Debug)]
pub struct DrawItem {
    pub object: usize,
    pub model: Mat4,
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipeline
    pipeline: RenderPipeline,
    object_bgl: BindGroupLayout,
    objects: Vec<GpuObject>,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window>.
    pub async fn new(window: Arc<Window>, backends: wgpu::Backends) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .with_context(|| format!("No suitable GPU adapter for {backends:?}"))?;
        log::info!("Adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("Duopose Device"),
                    required_features: Features::empty(),
                    required_limits: Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no formats")?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Mesh WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let object_bgl = object_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Mesh PipelineLayout"),
            bind_group_layouts: &[&object_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VERTEX_LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            object_bgl,
            objects: Vec::new(),
            depth_view,
            width,
            height,
        })
    }

    /// Upload a set of meshes sharing one texture; returns the object index for `DrawItem`.
    pub fn upload_object(
        &mut self,
        label: &str,
        meshes: &[MeshBuffer],
        texture: &TextureData,
    ) -> usize {
        let object = GpuObject::new(
            &self.device,
            &self.queue,
            &self.object_bgl,
            label,
            meshes,
            texture,
        );
        log::info!(
            "Uploaded '{label}': {} meshes, {} vertices, texture {}x{}",
            object.meshes.len(),
            object.vertex_count(),
            texture.width,
            texture.height
        );
        self.objects.push(object);
        self.objects.len() - 1
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame. `projection` is in OpenGL clip convention.
    pub fn render(&mut self, items: &[DrawItem], projection: Mat4) -> Result<(), SurfaceError> {
        let projection = OPENGL_TO_WGPU * projection;
        for item in items {
            match self.objects.get(item.object) {
                Some(obj) => {
                    let u = ObjectUniform::new(projection * item.model, item.model, Vec4::ONE);
                    self.queue
                        .write_buffer(&obj.uniform_buf, 0, bytemuck::bytes_of(&u));
                }
                None => log::warn!("Draw of unknown object {}", item.object),
            }
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: 0.05,
                            g: 0.05,
                            b: 0.08,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(&self.pipeline);
            for item in items {
                let Some(obj) = self.objects.get(item.object) else {
                    continue;
                };
                rpass.set_bind_group(0, &obj.bind_group, &[]);
                for mesh in &obj.meshes {
                    rpass.set_vertex_buffer(0, mesh.buffer.slice(..));
                    rpass.draw(0..mesh.vertex_count, 0..1);
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_range_maps_to_zero_one() {
        let near = OPENGL_TO_WGPU * Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = OPENGL_TO_WGPU * Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near.z / near.w, 0.0);
        assert_eq!(far.z / far.w, 1.0);
    }

    #[test]
    fn xy_are_untouched() {
        let p = OPENGL_TO_WGPU * Vec4::new(0.3, -0.7, 0.0, 1.0);
        assert_eq!((p.x, p.y, p.w), (0.3, -0.7, 1.0));
    }
}
