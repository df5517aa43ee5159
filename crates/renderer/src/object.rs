//! GPU-side object: one vertex buffer per mesh, one texture, one uniform.

use std::num::NonZeroU64;

use asset::mesh::{NORMAL_OFFSET, POSITION_OFFSET, UV_OFFSET, VERTEX_STRIDE};
use asset::{MeshBuffer, TextureData};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    Buffer, BufferBindingType, BufferUsages, Device, Queue, SamplerBindingType, ShaderStages,
    TextureSampleType, TextureViewDimension, VertexAttribute, VertexBufferLayout, VertexFormat,
    VertexStepMode,
};

/// Per-object uniform block (std140-compatible, 144 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ObjectUniform {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(mvp: Mat4, model: Mat4, color: Vec4) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

const ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: POSITION_OFFSET as u64,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: NORMAL_OFFSET as u64,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: UV_OFFSET as u64,
        shader_location: 2,
    },
];

/// Interleaved position / normal / uv, exactly as `MeshBuffer` stores it.
pub const VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: VERTEX_STRIDE as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &ATTRIBUTES,
};

pub(crate) fn object_bind_group_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Object BGL"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(ObjectUniform::SIZE),
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub(crate) struct GpuMesh {
    pub buffer: Buffer,
    pub vertex_count: u32,
}

/// Everything needed to draw one posable object.
pub(crate) struct GpuObject {
    pub meshes: Vec<GpuMesh>,
    pub uniform_buf: Buffer,
    pub bind_group: BindGroup,
}

impl GpuObject {
    pub fn new(
        device: &Device,
        queue: &Queue,
        layout: &BindGroupLayout,
        label: &str,
        meshes: &[MeshBuffer],
        texture: &TextureData,
    ) -> Self {
        let meshes = meshes
            .iter()
            .filter(|m| m.vertex_count() > 0)
            .map(|m| GpuMesh {
                buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(m.name()),
                    contents: bytemuck::cast_slice(m.as_slice()),
                    usage: BufferUsages::VERTEX,
                }),
                vertex_count: m.vertex_count() as u32,
            })
            .collect::<Vec<_>>();

        let uniform = ObjectUniform::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec4::ONE);
        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} UBO")),
            contents: bytemuck::bytes_of(&uniform),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        let view = upload_texture(device, queue, label, texture);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} sampler")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} BG")),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            meshes,
            uniform_buf,
            bind_group,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.vertex_count).sum()
    }
}

fn upload_texture(
    device: &Device,
    queue: &Queue,
    label: &str,
    texture: &TextureData,
) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: texture.width,
        height: texture.height,
        depth_or_array_layers: 1,
    };
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&format!("{label} texture")),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &tex,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &texture.data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(texture.bytes_per_row()),
            rows_per_image: Some(texture.height),
        },
        size,
    );
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}
