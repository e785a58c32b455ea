use glam::{Mat3, Mat4};
use wgpu::util::DeviceExt;

use crate::assets::{ColorSpace, ResourceId, TextureHandle, TextureUpload};
use crate::geometry::{Geometry, GeometryHandle};
use crate::paint::Color;
use crate::scene::{MaterialHandle, SceneGraph};

use super::cache::ResourceCache;
use super::common::{
    alpha_blend, draw_uniform_min_binding_size, interleave, sampler_descriptor, uniform_stride,
    DrawUniform, MeshVertex, DRAW_UNIFORM_SIZE,
};
use super::ctx::{RenderCtx, RenderTarget};

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Remaps OpenGL clip depth `[-1, 1]` onto wgpu's `[0, 1]`.
#[rustfmt::skip]
const GL_TO_WGPU: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

struct GpuGeometry {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
    wire_ibo: wgpu::Buffer,
    wire_count: u32,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// One visible mesh, resolved for this frame.
struct DrawItem {
    uniform: DrawUniform,
    geometry: ResourceId,
    texture: Option<ResourceId>,
    wireframe: bool,
    transparent: bool,
}

/// Unlit mesh renderer: material color times an optional texture.
///
/// Geometries and textures are uploaded the first frame they are seen with
/// `needs_upload`, and released when their CPU resource is disposed.
/// Textures that are pending, errored or disposed sample a 1x1 white
/// placeholder.
#[derive(Default)]
pub struct MeshRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    fill_pipeline: Option<wgpu::RenderPipeline>,
    wire_pipeline: Option<wgpu::RenderPipeline>,

    draw_bgl: Option<wgpu::BindGroupLayout>,
    texture_bgl: Option<wgpu::BindGroupLayout>,

    draw_ubo: Option<wgpu::Buffer>,
    draw_bind_group: Option<wgpu::BindGroup>,
    draw_capacity: usize,
    draw_stride: u64,

    placeholder: Option<GpuTexture>,

    geometries: ResourceCache<GeometryHandle, GpuGeometry>,
    textures: ResourceCache<TextureHandle, GpuTexture>,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the target to `clear` and draws every visible mesh of `scene`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &SceneGraph,
        view_projection: Mat4,
        clear: Color,
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_placeholder(ctx);

        let released = self.geometries.prune() + self.textures.prune();
        if released > 0 {
            log::debug!("render: released {released} disposed GPU resources");
        }

        let mut meshes = Vec::new();
        scene.traverse_visible(scene.root(), |_, node, world| {
            if let Some(mesh) = node.mesh() {
                meshes.push((mesh.geometry.clone(), mesh.material.clone(), *world));
            }
        });

        let clip = GL_TO_WGPU * view_projection;
        let mut items: Vec<DrawItem> = meshes
            .iter()
            .filter_map(|(geometry, material, world)| self.prepare(ctx, geometry, material, clip * *world))
            .collect();
        // Opaque first so blended meshes composite over them.
        items.sort_by_key(|item| item.transparent);

        self.ensure_draw_capacity(ctx, items.len());
        self.write_uniforms(ctx, &items);

        let Some(fill_pipeline) = self.fill_pipeline.as_ref() else { return };
        let Some(wire_pipeline) = self.wire_pipeline.as_ref() else { return };
        let Some(draw_bind_group) = self.draw_bind_group.as_ref() else { return };
        let Some(placeholder) = self.placeholder.as_ref() else { return };

        let [r, g, b] = clear.to_linear();
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(r),
                        g: f64::from(g),
                        b: f64::from(b),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for (i, item) in items.iter().enumerate() {
            let Some(geometry) = self.geometries.get(item.geometry) else { continue };
            let texture = item
                .texture
                .and_then(|id| self.textures.get(id))
                .unwrap_or(placeholder);

            let offset = (i as u64 * self.draw_stride) as wgpu::DynamicOffset;
            rpass.set_bind_group(0, draw_bind_group, &[offset]);
            rpass.set_bind_group(1, &texture.bind_group, &[]);
            rpass.set_vertex_buffer(0, geometry.vbo.slice(..));

            if item.wireframe {
                rpass.set_pipeline(wire_pipeline);
                rpass.set_index_buffer(geometry.wire_ibo.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..geometry.wire_count, 0, 0..1);
            } else {
                rpass.set_pipeline(fill_pipeline);
                rpass.set_index_buffer(geometry.ibo.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..geometry.index_count, 0, 0..1);
            }
        }
    }

    /// Uploads what the mesh needs and builds its draw item. `None` skips the
    /// mesh (disposed or empty geometry).
    fn prepare(
        &mut self,
        ctx: &RenderCtx<'_>,
        geometry: &GeometryHandle,
        material: &MaterialHandle,
        mvp: Mat4,
    ) -> Option<DrawItem> {
        if geometry.is_disposed() {
            return None;
        }
        if let Some(data) = geometry.take_upload() {
            self.upload_geometry(ctx, geometry, &data);
        }
        self.geometries.get(geometry.id())?;

        let material = material.borrow();
        let mut texture = None;
        let mut uv = Mat3::IDENTITY;
        if let Some(map) = &material.map {
            if let Some(upload) = map.take_upload() {
                self.upload_texture(ctx, map, upload);
            }
            if map.is_available() && self.textures.get(map.id()).is_some() {
                texture = Some(map.id());
                uv = map.sampling().uv_transform();
            }
        }

        let [r, g, b] = material.color.to_linear();
        let opacity = material.opacity.clamp(0.0, 1.0);
        Some(DrawItem {
            uniform: DrawUniform::new(mvp, [r, g, b, opacity], uv),
            geometry: geometry.id(),
            texture,
            wireframe: material.wireframe,
            transparent: material.is_transparent(),
        })
    }

    fn upload_geometry(&mut self, ctx: &RenderCtx<'_>, handle: &GeometryHandle, data: &Geometry) {
        let vertices = interleave(data);
        let indices = data.triangle_indices();
        let wire = data.wireframe_indices();
        if vertices.is_empty() || indices.is_empty() {
            log::debug!("render: geometry {} is empty, not uploading", handle.id());
            return;
        }

        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen mesh vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen mesh ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let wire_ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen mesh wire ibo"),
            contents: bytemuck::cast_slice(&wire),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "render: uploaded geometry {} ({} vertices, {} triangles)",
            handle.id(),
            vertices.len(),
            indices.len() / 3
        );
        self.geometries.insert(
            handle.clone(),
            GpuGeometry {
                vbo,
                ibo,
                index_count: indices.len() as u32,
                wire_ibo,
                wire_count: wire.len() as u32,
            },
        );
    }

    fn upload_texture(&mut self, ctx: &RenderCtx<'_>, handle: &TextureHandle, upload: TextureUpload) {
        let Some(layout) = self.texture_bgl.as_ref() else { return };
        let TextureUpload { id, image, sampling } = upload;

        let format = match sampling.color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };
        let texture = create_rgba_texture(ctx, "lumen texture", format, image.width(), image.height(), image.rgba());
        let bind_group = texture_bind_group(ctx, layout, &texture, &ctx.device.create_sampler(&sampler_descriptor(&sampling)));

        log::debug!("render: uploaded texture {id} ({}x{})", image.width(), image.height());
        self.textures.insert(handle.clone(), GpuTexture { _texture: texture, bind_group });
    }

    fn ensure_placeholder(&mut self, ctx: &RenderCtx<'_>) {
        if self.placeholder.is_some() {
            return;
        }
        let Some(layout) = self.texture_bgl.as_ref() else { return };

        let texture = create_rgba_texture(
            ctx,
            "lumen placeholder texture",
            wgpu::TextureFormat::Rgba8UnormSrgb,
            1,
            1,
            &[255, 255, 255, 255],
        );
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen placeholder sampler"),
            ..Default::default()
        });
        let bind_group = texture_bind_group(ctx, layout, &texture, &sampler);
        self.placeholder = Some(GpuTexture { _texture: texture, bind_group });
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.fill_pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        self.ensure_layouts(ctx);
        let (Some(draw_bgl), Some(texture_bgl)) = (self.draw_bgl.as_ref(), self.texture_bgl.as_ref()) else {
            return;
        };

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen mesh pipeline layout"),
            bind_group_layouts: &[draw_bgl, texture_bgl],
            immediate_size: 0,
        });

        let pipeline = |label: &str, topology: wgpu::PrimitiveTopology, cull_mode: Option<wgpu::Face>| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[MeshVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(alpha_blend()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
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
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        self.fill_pipeline = Some(pipeline(
            "lumen mesh fill pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            Some(wgpu::Face::Back),
        ));
        self.wire_pipeline = Some(pipeline("lumen mesh wire pipeline", wgpu::PrimitiveTopology::LineList, None));
        self.pipeline_format = Some(ctx.surface_format);
    }

    /// Bind group layouts do not depend on the surface format, so they (and
    /// every bind group built from them) outlive pipeline rebuilds.
    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) {
        if self.draw_bgl.is_some() && self.texture_bgl.is_some() {
            return;
        }

        let draw_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen draw bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: draw_uniform_min_binding_size(),
                },
                count: None,
            }],
        });

        let texture_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        self.draw_bgl = Some(draw_bgl);
        self.texture_bgl = Some(texture_bgl);
    }

    fn ensure_draw_capacity(&mut self, ctx: &RenderCtx<'_>, draws: usize) {
        if draws <= self.draw_capacity && self.draw_bind_group.is_some() {
            return;
        }
        let Some(layout) = self.draw_bgl.as_ref() else { return };

        let capacity = draws.next_power_of_two().max(16);
        let stride = uniform_stride(ctx.device.limits().min_uniform_buffer_offset_alignment);

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen draw ubo"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen draw bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: draw_uniform_min_binding_size(),
                }),
            }],
        });

        self.draw_ubo = Some(ubo);
        self.draw_bind_group = Some(bind_group);
        self.draw_capacity = capacity;
        self.draw_stride = stride;
    }

    fn write_uniforms(&self, ctx: &RenderCtx<'_>, items: &[DrawItem]) {
        let Some(ubo) = self.draw_ubo.as_ref() else { return };
        if items.is_empty() {
            return;
        }

        let stride = self.draw_stride as usize;
        let mut bytes = vec![0u8; stride * items.len()];
        for (slot, item) in bytes.chunks_exact_mut(stride).zip(items) {
            slot[..DRAW_UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&item.uniform));
        }
        ctx.queue.write_buffer(ubo, 0, &bytes);
    }
}

fn create_rgba_texture(
    ctx: &RenderCtx<'_>,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> wgpu::Texture {
    let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    texture
}

fn texture_bind_group(
    ctx: &RenderCtx<'_>,
    layout: &wgpu::BindGroupLayout,
    texture: &wgpu::Texture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("lumen texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
            wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(sampler) },
        ],
    })
}
