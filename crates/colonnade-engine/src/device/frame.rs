/// An acquired swap-chain image.
///
/// Short-lived: holding the surface texture prevents acquisition of
/// subsequent frames. Commands are recorded into the encoder handed out by
/// the current frame resource, not into this object.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}
