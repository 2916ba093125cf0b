//! Core data types for the viewer, focused on GPU data representation.

/// Position + normal of a static mesh vertex (unit cube, ground plane, reticle ring).
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Per-bar instance data. Must match the instance inputs of `BARS_WGSL`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct BarInstance {
    /// Box centre in chart space.
    pub center: [f32; 3],
    /// Box extents (width, height, depth).
    pub size: [f32; 3],
    /// sRGB colour.
    pub color: [f32; 3],
    /// 1.0 for the hovered bar, else 0.0.
    pub highlight: f32,
}

/// Scene uniform for the bar pass, std140.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniformStd140 {
    pub view_proj: [[f32; 4]; 4],
    /// Chart-to-world transform (placement, rotation, scale).
    pub model: [[f32; 4]; 4],
}

/// Uniform for one flat mesh draw (ground, reticle), std140.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlatUniformStd140 {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// sRGB colour, alpha unused.
    pub color: [f32; 4],
    /// 1.0 = hemisphere + directional lighting, 0.0 = unlit.
    pub lit: f32,
    pub _pad: [f32; 3],
}

// Buffer sizes must match the WGSL structs.
const _: [(); 128] = [(); core::mem::size_of::<SceneUniformStd140>()];
const _: [(); 160] = [(); core::mem::size_of::<FlatUniformStd140>()];
const _: [(); 40] = [(); core::mem::size_of::<BarInstance>()];

/// GPU instance buffer for the bars of the current layout.
#[derive(Debug)]
pub struct BarsGpu {
    /// Vertex buffer containing `BarInstance` data.
    pub vtx: wgpu::Buffer,
    /// Capacity of `vtx`, in instances.
    pub capacity: u32,
    pub instances_len: u32,
    /// Layout revision and hovered bar the buffer was last written for.
    pub synced: Option<(u64, Option<usize>)>,
}
