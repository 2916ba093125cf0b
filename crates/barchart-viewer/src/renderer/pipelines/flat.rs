// Single-colour meshes: the ground plane (lit) and the AR reticle (unlit).

use super::with_lighting;
use crate::data::types::{FlatUniformStd140 as FlatUniform, MeshVertex};
use glam::Mat4;
use wgpu::util::DeviceExt;

pub struct FlatPipeline {
    pipeline:   wgpu::RenderPipeline,
    mesh_layout: wgpu::BindGroupLayout,
}

/// One mesh with its own colour and uniform buffer.
pub struct FlatMesh {
    vb:             wgpu::Buffer,
    vertex_count:   u32,
    uniform_buffer: wgpu::Buffer,
    bind_group:     wgpu::BindGroup,
    color:          [f32; 3],
    lit:            bool,
}

impl FlatPipeline {
    pub fn new(
        device:    &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
    ) -> Self {
        let mesh_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label:   Some("Flat Mesh BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding:    0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty:                 wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size:   None,
                },
                count: None,
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("Flat WGSL"),
            source: wgpu::ShaderSource::Wgsl(with_lighting(FLAT_WGSL).into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label:                Some("Flat Pipeline Layout"),
            bind_group_layouts:   &[&mesh_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label:  Some("Flat Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module:      &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as u64,
                    step_mode:    wgpu::VertexStepMode::Vertex,
                    attributes:   &[
                        wgpu::VertexAttribute {
                            shader_location: 0,
                            format:          wgpu::VertexFormat::Float32x3,
                            offset:          0,
                        },
                        wgpu::VertexAttribute {
                            shader_location: 1,
                            format:          wgpu::VertexFormat::Float32x3,
                            offset:          12,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module:      &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format:     color_fmt,
                    blend:      None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            // Flat meshes are seen from below too; no culling.
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format:              depth_fmt,
                depth_write_enabled: true,
                depth_compare:       wgpu::CompareFunction::LessEqual,
                stencil:             wgpu::StencilState::default(),
                // Pull coplanar meshes (reticle on the floor) slightly forward.
                bias: wgpu::DepthBiasState {
                    constant:    -2,
                    slope_scale: -1.0,
                    clamp:       0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview:   None,
        });

        Self { pipeline, mesh_layout }
    }

    /// Upload a mesh drawn in `color` (sRGB), lit or unlit.
    pub fn create_mesh(
        &self,
        device:   &wgpu::Device,
        label:    &str,
        vertices: &[MeshVertex],
        color:    [f32; 3],
        lit:      bool,
    ) -> FlatMesh {
        let vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage:    wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some(label),
            size:               std::mem::size_of::<FlatUniform>() as u64,
            usage:              wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some(label),
            layout:  &self.mesh_layout,
            entries: &[wgpu::BindGroupEntry {
                binding:  0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        FlatMesh {
            vb,
            vertex_count: vertices.len() as u32,
            uniform_buffer,
            bind_group,
            color,
            lit,
        }
    }

    pub fn draw<'a>(
        &'a self,
        rpass:     &mut wgpu::RenderPass<'a>,
        queue:     &wgpu::Queue,
        mesh:      &'a FlatMesh,
        view_proj: Mat4,
        model:     Mat4,
    ) {
        let uniforms = FlatUniform {
            view_proj: view_proj.to_cols_array_2d(),
            model:     model.to_cols_array_2d(),
            color:     [mesh.color[0], mesh.color[1], mesh.color[2], 1.0],
            lit:       if mesh.lit { 1.0 } else { 0.0 },
            _pad:      [0.0; 3],
        };
        queue.write_buffer(&mesh.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &mesh.bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vb.slice(..));
        rpass.draw(0..mesh.vertex_count, 0..1);
    }
}

pub const FLAT_WGSL: &str = r#"
struct FlatUniform {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color: vec4<f32>,
    lit: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};
@group(0) @binding(0) var<uniform> U: FlatUniform;

struct VSOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
}

@vertex
fn vs_main(@location(0) pos: vec3<f32>, @location(1) normal: vec3<f32>) -> VSOut {
    var out: VSOut;
    out.clip = U.view_proj * U.model * vec4<f32>(pos, 1.0);
    out.normal = (U.model * vec4<f32>(normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_main(in: VSOut) -> @location(0) vec4<f32> {
    let albedo = srgb_to_linear(U.color.rgb);
    let shaded = lambert(albedo, normalize(in.normal));
    return vec4<f32>(mix(albedo, shaded, U.lit), 1.0);
}
"#;
