use super::with_lighting;
use crate::data::types::{BarInstance, BarsGpu, MeshVertex, SceneUniformStd140 as SceneUniform};
use crate::renderer::meshes;
use wgpu::util::DeviceExt;

/// Instanced lit boxes: one unit cube stretched and placed per bar.
pub struct BarPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    cube_vb: wgpu::Buffer,
    cube_len: u32,
}

impl BarPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bar Scene UBO"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bar Scene UBO Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SceneUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bar Scene BindGroup"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bars WGSL"),
            source: wgpu::ShaderSource::Wgsl(with_lighting(BARS_WGSL).into()),
        });

        let cube = meshes::unit_cube();
        let cube_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Unit Cube VB"),
            contents: bytemuck::cast_slice(&cube),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Vertex buffer layouts: cube vertices + per-bar instance data
        let vbuf_layouts = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute {
                        shader_location: 0,
                        offset: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        shader_location: 1,
                        offset: 12,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                ],
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<BarInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    // center
                    wgpu::VertexAttribute {
                        shader_location: 2,
                        offset: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    // size
                    wgpu::VertexAttribute {
                        shader_location: 3,
                        offset: 12,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    // color
                    wgpu::VertexAttribute {
                        shader_location: 4,
                        offset: 24,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    // highlight
                    wgpu::VertexAttribute {
                        shader_location: 5,
                        offset: 36,
                        format: wgpu::VertexFormat::Float32,
                    },
                ],
            },
        ];

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bar PipelineLayout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Bar Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &vbuf_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_fmt,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            cube_vb,
            cube_len: cube.len() as u32,
        }
    }

    pub fn draw<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        queue: &wgpu::Queue,
        uniform: &SceneUniform,
        bars: &'a BarsGpu,
    ) {
        if bars.instances_len == 0 {
            return;
        }
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniform));

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.cube_vb.slice(..));
        rpass.set_vertex_buffer(1, bars.vtx.slice(..));
        rpass.draw(0..self.cube_len, 0..bars.instances_len);
    }
}

pub const BARS_WGSL: &str = r#"
struct SceneUniform {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> U: SceneUniform;

struct VSIn {
    @location(0) pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) center: vec3<f32>,
    @location(3) size: vec3<f32>,
    @location(4) color: vec3<f32>,
    @location(5) highlight: f32,
}

struct VSOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) highlight: f32,
}

@vertex
fn vs_main(in: VSIn) -> VSOut {
    let local = in.center + in.pos * in.size;
    var out: VSOut;
    out.clip = U.view_proj * U.model * vec4<f32>(local, 1.0);
    // Chart transform is rotation + uniform scale, so it maps normals directly.
    out.normal = (U.model * vec4<f32>(in.normal, 0.0)).xyz;
    out.color = in.color;
    out.highlight = in.highlight;
    return out;
}

@fragment
fn fs_main(in: VSOut) -> @location(0) vec4<f32> {
    let albedo = srgb_to_linear(in.color);
    let lit = lambert(albedo, normalize(in.normal));
    let rgb = mix(lit, vec3<f32>(1.0, 1.0, 1.0), in.highlight * 0.35);
    return vec4<f32>(rgb, 1.0);
}
"#;
