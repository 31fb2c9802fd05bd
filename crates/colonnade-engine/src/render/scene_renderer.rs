use crate::device::{Gpu, SurfaceErrorAction, WgpuBackend, WgpuTimeline};
use crate::frame::{CommandAllocator, FrameError, FramePipeline, PassConstants, PipelineConfig};
use crate::render::{GpuMesh, LitRenderer, RenderCtx, RenderTarget};
use crate::scene::Scene;

/// Scene renderer configuration.
#[derive(Debug, Clone, Copy)]
pub struct RendererConfig {
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        // LightSteelBlue
        Self {
            clear_color: wgpu::Color {
                r: 0.690,
                g: 0.769,
                b: 0.871,
                a: 1.0,
            },
        }
    }
}

/// What happened to one `render_frame` call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// No swap-chain image this frame; the frame was still closed with a
    /// fence signal.
    Skipped,
    /// The surface cannot be recovered.
    SurfaceLost,
}

/// Draws a `Scene` through a ring of frame resources.
///
/// The ring size comes from the scene, so every dirty counter in the scene
/// spans exactly the number of frame resources that hold a copy.
pub struct SceneRenderer {
    pipeline: FramePipeline<WgpuBackend, WgpuTimeline>,
    lit: LitRenderer,
    mesh: GpuMesh,
    config: RendererConfig,
}

impl SceneRenderer {
    pub fn new(gpu: &Gpu<'_>, scene: &Scene, config: RendererConfig) -> Result<Self, FrameError> {
        let pipeline = FramePipeline::new(
            &gpu.backend(),
            gpu.timeline(),
            PipelineConfig {
                frames_in_flight: scene.frames_in_flight(),
            },
            scene.resource_desc(),
        )?;

        let ctx = RenderCtx::new(
            gpu.device(),
            gpu.queue(),
            gpu.surface_format(),
            gpu.depth_format(),
        );
        let lit = LitRenderer::new(&ctx, pipeline.resources().iter());
        let mesh = GpuMesh::new(gpu.device(), scene.geometry());

        log::info!(
            "scene renderer ready: {} items, {} materials, {} frames in flight",
            scene.items().len(),
            scene.materials().len(),
            pipeline.frames_in_flight()
        );

        Ok(Self {
            pipeline,
            lit,
            mesh,
            config,
        })
    }

    /// Runs one frame of the protocol:
    /// advance + wait, dirty uploads, pass upload, allocator reset, record,
    /// submit, signal.
    pub fn render_frame(
        &mut self,
        gpu: &mut Gpu<'_>,
        scene: &mut Scene,
        pass: &PassConstants,
    ) -> Result<FrameOutcome, FrameError> {
        self.pipeline.begin_frame()?;
        scene.upload_dirty(&mut self.pipeline)?;
        self.pipeline.current_mut()?.pass_cb.copy_data(0, pass)?;
        let slot = self.pipeline.current_index();

        let outcome = match gpu.begin_frame() {
            Ok(surface) => {
                let frame = self.pipeline.current_mut()?;
                let mut encoder = frame.allocator.reset()?;
                {
                    let mut target =
                        RenderTarget::new(&mut encoder, &surface.view, gpu.depth_view());
                    self.lit.draw(
                        &mut target,
                        slot,
                        frame,
                        scene,
                        &self.mesh,
                        self.config.clear_color,
                    )?;
                }
                gpu.submit(surface, encoder);
                FrameOutcome::Presented
            }
            Err(err) => {
                let reason = err.to_string();
                match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface lost: {reason}");
                        FrameOutcome::SurfaceLost
                    }
                    action => {
                        log::debug!("frame skipped: {reason} ({action:?})");
                        FrameOutcome::Skipped
                    }
                }
            }
        };

        self.pipeline.end_frame()?;
        Ok(outcome)
    }

    pub fn pipeline(&self) -> &FramePipeline<WgpuBackend, WgpuTimeline> {
        &self.pipeline
    }

    /// Blocks until the GPU has finished everything submitted so far.
    pub fn flush(&mut self) -> Result<(), FrameError> {
        self.pipeline.flush()
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        if let Err(e) = self.pipeline.flush() {
            log::error!("failed to flush frame pipeline on shutdown: {e}");
        }
    }
}
