use crate::helpers::create_target;

/// Offscreen color targets: a full-resolution HDR scene plus two
/// half-resolution bloom ping-pong buffers.
pub(crate) struct RenderTargets {
    _hdr: wgpu::Texture,
    pub(crate) hdr_view: wgpu::TextureView,
    _bloom_a: wgpu::Texture,
    pub(crate) bloom_a_view: wgpu::TextureView,
    _bloom_b: wgpu::Texture,
    pub(crate) bloom_b_view: wgpu::TextureView,
    pub(crate) bloom_size: (u32, u32),
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (_hdr, hdr_view) = create_target(device, "hdr_tex", width, height);
        let bloom_size = ((width.max(1) / 2).max(1), (height.max(1) / 2).max(1));
        let (_bloom_a, bloom_a_view) = create_target(device, "bloom_a", bloom_size.0, bloom_size.1);
        let (_bloom_b, bloom_b_view) = create_target(device, "bloom_b", bloom_size.0, bloom_size.1);
        Self {
            _hdr,
            hdr_view,
            _bloom_a,
            bloom_a_view,
            _bloom_b,
            bloom_b_view,
            bloom_size,
        }
    }
}
