//! GPU-side layouts shared by the mesh renderer.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};

use crate::assets::{FilterMode, TextureSampling, WrapMode};
use crate::geometry::Geometry;

// ── blend ─────────────────────────────────────────────────────────────────

/// Straight-alpha blending; opaque materials write alpha 1 and blend away.
pub(super) fn alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState::ALPHA_BLENDING
}

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // uv
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Interleaves positions and uvs. Missing uvs read as zero.
pub(super) fn interleave(geometry: &Geometry) -> Vec<MeshVertex> {
    geometry
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| MeshVertex {
            position,
            uv: geometry.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

// ── per-draw uniform ──────────────────────────────────────────────────────

/// One mesh draw. `uv` holds the columns of the 3x3 UV matrix, each padded to
/// 16 bytes as WGSL uniform layout requires.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct DrawUniform {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub uv: [[f32; 4]; 3],
}

impl DrawUniform {
    pub(super) fn new(mvp: Mat4, color: [f32; 4], uv: Mat3) -> Self {
        let col = |v: glam::Vec3| [v.x, v.y, v.z, 0.0];
        Self {
            mvp: mvp.to_cols_array_2d(),
            color,
            uv: [col(uv.x_axis), col(uv.y_axis), col(uv.z_axis)],
        }
    }
}

pub(super) const DRAW_UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniform>() as u64;

/// Stride between dynamic-offset slots.
pub(super) fn uniform_stride(min_alignment: u32) -> u64 {
    let align = u64::from(min_alignment.max(1));
    DRAW_UNIFORM_SIZE.div_ceil(align) * align
}

pub(super) fn draw_uniform_min_binding_size() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(DRAW_UNIFORM_SIZE)
}

// ── sampling ──────────────────────────────────────────────────────────────

pub(super) fn address_mode(wrap: WrapMode) -> wgpu::AddressMode {
    match wrap {
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}

pub(super) fn filter_mode(filter: FilterMode) -> wgpu::FilterMode {
    match filter {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

pub(super) fn sampler_descriptor(sampling: &TextureSampling) -> wgpu::SamplerDescriptor<'static> {
    wgpu::SamplerDescriptor {
        label: Some("lumen texture sampler"),
        address_mode_u: address_mode(sampling.wrap_s),
        address_mode_v: address_mode(sampling.wrap_t),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter_mode(sampling.mag_filter),
        min_filter: filter_mode(sampling.min_filter),
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    }
}
