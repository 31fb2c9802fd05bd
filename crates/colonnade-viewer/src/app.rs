use anyhow::Context;

use colonnade_engine::core::{App, AppControl, FrameCtx};
use colonnade_engine::input::{Key, MouseButton};
use colonnade_engine::render::{FrameOutcome, RendererConfig, SceneRenderer};
use colonnade_engine::scene::{
    build_pass_constants, LightRig, OrbitCamera, PassInputs, Projection, Scene,
};

use crate::scene::{self, Animated};

/// Radians per second.
const DIAMOND_SPIN_RATE: f32 = 1.0;

/// Pixels of drag one wheel line is worth.
const WHEEL_LINE_PIXELS: f32 = 20.0;

/// Log pipeline stats this often.
const STATS_EVERY: u64 = 600;

/// Orbit viewer for the lit columns scene.
///
/// Controls: left drag orbits, right drag or the wheel zooms, Space pauses the
/// diamond spin, R toggles the gold pulse, Escape quits.
pub struct ColumnsApp {
    scene: Scene,
    animated: Animated,

    // Created on the first frame, once a GPU exists.
    renderer: Option<SceneRenderer>,
    renderer_config: RendererConfig,

    camera: OrbitCamera,
    projection: Projection,
    lights: LightRig,

    spin_paused: bool,
    spin_angle: f32,
    gold_pulse: bool,
}

impl ColumnsApp {
    pub fn new(frames_in_flight: usize) -> Self {
        let (scene, animated) = scene::build(frames_in_flight);
        Self {
            scene,
            animated,
            renderer: None,
            renderer_config: RendererConfig::default(),
            camera: OrbitCamera::default(),
            projection: Projection::default(),
            lights: LightRig::default(),
            spin_paused: false,
            spin_angle: 0.0,
            gold_pulse: false,
        }
    }

    fn handle_keys(&mut self, ctx: &FrameCtx<'_, '_>) -> AppControl {
        let frame = ctx.input_frame;

        if frame.key_pressed(Key::Escape) {
            log::info!("escape pressed, exiting");
            return AppControl::Exit;
        }

        if frame.key_pressed(Key::Space) {
            self.spin_paused = !self.spin_paused;
            log::info!("diamond spin {}", if self.spin_paused { "paused" } else { "resumed" });
        }

        if frame.key_pressed(Key::R) {
            self.gold_pulse = !self.gold_pulse;
            if !self.gold_pulse {
                let gold = self.animated.gold;
                self.scene
                    .material_mut(gold)
                    .set_diffuse_albedo(self.animated.gold_albedo);
            }
            log::info!("gold pulse {}", if self.gold_pulse { "on" } else { "off" });
        }

        AppControl::Continue
    }

    fn update_camera(&mut self, ctx: &FrameCtx<'_, '_>) {
        let (dx, dy) = ctx.input_frame.pointer_delta;

        if ctx.input.button_down(MouseButton::Left) {
            self.camera.orbit(dx, dy);
        } else if ctx.input.button_down(MouseButton::Right) {
            self.camera.zoom(dx, dy);
        }

        let wheel = ctx.input_frame.wheel_lines;
        if wheel != 0.0 {
            self.camera.zoom(0.0, wheel * WHEEL_LINE_PIXELS);
        }
    }

    /// Per-frame scene edits. Each one marks its object or material dirty.
    fn animate(&mut self, dt: f32, total: f32) {
        if !self.spin_paused {
            self.spin_angle += DIAMOND_SPIN_RATE * dt;
            for (i, placement) in self.animated.diamonds.iter().enumerate() {
                // Counter-rotate the pair.
                let angle = if i == 0 { self.spin_angle } else { -self.spin_angle };
                self.scene
                    .item_mut(placement.item)
                    .set_world(placement.world(angle));
            }
        }

        if self.gold_pulse {
            let k = 0.75 + 0.25 * (4.0 * total).sin();
            let base = self.animated.gold_albedo;
            let albedo = (base * k).with_w(base.w);
            let gold = self.animated.gold;
            self.scene.material_mut(gold).set_diffuse_albedo(albedo);
        }
    }
}

impl App for ColumnsApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<AppControl> {
        if self.handle_keys(ctx) == AppControl::Exit {
            return Ok(AppControl::Exit);
        }

        self.update_camera(ctx);
        self.animate(ctx.time.dt, ctx.time.total);

        if ctx.window.is_minimized() {
            return Ok(AppControl::Continue);
        }

        if self.renderer.is_none() {
            let renderer = SceneRenderer::new(ctx.gpu, &self.scene, self.renderer_config)
                .context("failed to create scene renderer")?;
            self.renderer = Some(renderer);
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let size = ctx.gpu.size();
        let pass = build_pass_constants(&PassInputs {
            camera: &self.camera,
            projection: &self.projection,
            target_size: [size.width, size.height],
            total_time: ctx.time.total,
            delta_time: ctx.time.dt,
            lights: &self.lights,
        });

        let outcome = renderer
            .render_frame(ctx.gpu, &mut self.scene, &pass)
            .with_context(|| format!("frame {} failed", ctx.time.frame_index))?;

        if outcome == FrameOutcome::SurfaceLost {
            anyhow::bail!("surface lost at frame {}", ctx.time.frame_index);
        }

        let pipeline = renderer.pipeline();
        if pipeline.frame_count() % STATS_EVERY == 0 {
            log::debug!(
                "{} frames, {} stalls on {} frames in flight",
                pipeline.frame_count(),
                pipeline.stall_count(),
                pipeline.frames_in_flight()
            );
        }

        Ok(AppControl::Continue)
    }
}

#[cfg(test)]
mod tests {
    use colonnade_engine::frame::ConstantSource;

    use super::*;

    #[test]
    fn spin_edits_mark_diamonds_dirty() {
        let mut app = ColumnsApp::new(3);
        let diamond = app.animated.diamonds[0].item;

        // Pretend every ring slot already holds the built transform.
        while app.scene.item_mut(diamond).dirty_mut().consume() {}

        let before = app.scene.item(diamond).world();
        app.animate(0.5, 0.5);

        assert_ne!(app.scene.item(diamond).world(), before);
        assert_eq!(app.scene.item(diamond).dirty().remaining(), 3);
    }

    #[test]
    fn paused_spin_leaves_transforms_alone() {
        let mut app = ColumnsApp::new(3);
        app.spin_paused = true;
        let diamond = app.animated.diamonds[1].item;

        let before = app.scene.item(diamond).world();
        app.animate(0.5, 0.5);

        assert_eq!(app.scene.item(diamond).world(), before);
    }

    #[test]
    fn pulse_scales_gold_albedo() {
        let mut app = ColumnsApp::new(2);
        app.gold_pulse = true;
        app.spin_paused = true;

        // sin(4 * pi/8) = 1, so the pulse peaks at full albedo.
        app.animate(0.0, std::f32::consts::PI / 8.0);
        let peak = app.scene.material(app.animated.gold).desc().diffuse_albedo;
        assert!(peak.abs_diff_eq(app.animated.gold_albedo, 1e-5));

        // sin(4 * 3pi/8) = -1: half brightness, opaque.
        app.animate(0.0, 3.0 * std::f32::consts::PI / 8.0);
        let low = app.scene.material(app.animated.gold).desc().diffuse_albedo;
        assert!((low.x - 0.5 * app.animated.gold_albedo.x).abs() < 1e-5);
        assert_eq!(low.w, 1.0);
    }
}
