use std::num::NonZeroU64;

use crate::device::WgpuBackend;
use crate::frame::{FrameError, FrameResource, MaterialConstants, ObjectConstants, PassConstants};
use crate::render::{GpuMesh, RenderCtx, RenderTarget};
use crate::scene::Scene;

use super::mesh::vertex_layout;

/// Bind groups pointing at one frame resource's constant buffers.
struct SlotBindings {
    pass: wgpu::BindGroup,
    object: wgpu::BindGroup,
    material: wgpu::BindGroup,
}

/// Opaque lit-geometry renderer.
///
/// Bind group layout:
/// - group 0: pass constants (one slot)
/// - group 1: object constants, dynamic offset per render item
/// - group 2: material constants, dynamic offset per material
///
/// Each ring slot gets its own bind groups, so a frame only ever binds the
/// constant buffers of the frame resource it was recorded for.
pub struct LitRenderer {
    pipeline: wgpu::RenderPipeline,
    slots: Vec<SlotBindings>,
}

impl LitRenderer {
    pub fn new<'r>(
        ctx: &RenderCtx<'_>,
        resources: impl IntoIterator<Item = &'r FrameResource<WgpuBackend>>,
    ) -> Self {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("colonnade lit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/lit.wgsl").into()),
        });

        let pass_layout = uniform_layout::<PassConstants>(ctx.device, "colonnade pass bgl", false);
        let object_layout =
            uniform_layout::<ObjectConstants>(ctx.device, "colonnade object bgl", true);
        let material_layout =
            uniform_layout::<MaterialConstants>(ctx.device, "colonnade material bgl", true);

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("colonnade lit pipeline layout"),
                bind_group_layouts: &[&pass_layout, &object_layout, &material_layout],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("colonnade lit pipeline"),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout()],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                // Generated meshes mix windings, so nothing is culled.
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: Some(wgpu::DepthStencilState {
                    format: ctx.depth_format,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),

                multiview_mask: None,
                cache: None,
            });

        let slots = resources
            .into_iter()
            .enumerate()
            .map(|(i, frame)| SlotBindings {
                pass: uniform_bind_group::<PassConstants>(
                    ctx.device,
                    &format!("frame {i} pass bind group"),
                    &pass_layout,
                    frame.pass_cb.memory().buffer(),
                ),
                object: uniform_bind_group::<ObjectConstants>(
                    ctx.device,
                    &format!("frame {i} object bind group"),
                    &object_layout,
                    frame.object_cb.memory().buffer(),
                ),
                material: uniform_bind_group::<MaterialConstants>(
                    ctx.device,
                    &format!("frame {i} material bind group"),
                    &material_layout,
                    frame.material_cb.memory().buffer(),
                ),
            })
            .collect();

        Self { pipeline, slots }
    }

    /// Clears `target` and draws every render item of `scene`, reading
    /// constants from `frame` (ring slot `slot`).
    pub fn draw(
        &self,
        target: &mut RenderTarget<'_>,
        slot: usize,
        frame: &FrameResource<WgpuBackend>,
        scene: &Scene,
        mesh: &GpuMesh,
        clear: wgpu::Color,
    ) -> Result<(), FrameError> {
        let bindings = self.slots.get(slot).ok_or(FrameError::SlotOutOfRange {
            index: slot,
            capacity: self.slots.len(),
        })?;

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("colonnade lit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
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

        if mesh.index_count == 0 {
            return Ok(());
        }

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bindings.pass, &[]);
        rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        let geometry = scene.geometry();
        for item in scene.items() {
            let object_offset = frame.object_cb.dynamic_offset(item.id().index())?;
            let material_offset = frame.material_cb.dynamic_offset(item.material().index())?;

            rpass.set_bind_group(1, &bindings.object, &[object_offset]);
            rpass.set_bind_group(2, &bindings.material, &[material_offset]);

            let sub = geometry.submesh(item.mesh());
            rpass.draw_indexed(
                sub.start_index..sub.start_index + sub.index_count,
                sub.base_vertex,
                0..1,
            );
        }

        Ok(())
    }
}

fn binding_size<T>() -> Option<NonZeroU64> {
    NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

fn uniform_layout<T>(device: &wgpu::Device, label: &str, dynamic: bool) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: binding_size::<T>(),
            },
            count: None,
        }],
    })
}

/// Binds one `T`-sized window of `buffer`; dynamic offsets slide it.
fn uniform_bind_group<T>(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: binding_size::<T>(),
            }),
        }],
    })
}
