//! wgpu backend: scene pass into an HDR target, then bright/blur/composite bloom.

mod helpers;
mod post;
mod scene;
mod targets;

use hyperspeed_core::{Frame, FrameRenderer, RenderError};
use post::{PostBindGroups, PostResources, PostUniforms};
use scene::ScenePass;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use targets::RenderTargets;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    scene: ScenePass,
    post: PostResources,
    targets: RenderTargets,
    groups: PostBindGroups,
    device_lost: Arc<AtomicBool>,
}

impl GpuRenderer {
    /// Acquire adapter, device and surface for `target`.
    ///
    /// `max_instances` sizes the instance buffer up front so steady-state
    /// frames never reallocate it.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        max_instances: usize,
    ) -> anyhow::Result<Self> {
        let width = width.max(1);
        let height = height.max(1);
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(target)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("hyperspeed_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device error: {e:?}"))?;

        let device_lost = Arc::new(AtomicBool::new(false));
        let flag = device_lost.clone();
        device.set_device_lost_callback(move |reason, msg| {
            log::warn!("[gpu] device lost ({reason:?}): {msg}");
            flag.store(true, Ordering::Release);
        });

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(POST_WGSL.into()),
        });
        let scene = ScenePass::new(&device, &scene_shader, max_instances);
        let post = PostResources::new(&device, &post_shader, format);
        let targets = RenderTargets::new(&device, width, height);
        let groups = post.bind_groups(&device, &targets);
        log::info!(
            "[gpu] ready: {:?} {}x{}, {} instance slots",
            format,
            width,
            height,
            max_instances
        );
        Ok(Self {
            surface,
            device,
            queue,
            config,
            scene,
            post,
            targets,
            groups,
            device_lost,
        })
    }
}

impl FrameRenderer for GpuRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.targets = RenderTargets::new(&self.device, width, height);
        self.groups = self.post.bind_groups(&self.device, &self.targets);
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        if self.device_lost.load(Ordering::Acquire) {
            return Err(RenderError::ContextLost);
        }
        let surface_tex = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost) => return Err(RenderError::ContextLost),
            Err(wgpu::SurfaceError::Outdated) | Err(wgpu::SurfaceError::Timeout) => {
                return Err(RenderError::Outdated)
            }
            Err(e) => return Err(RenderError::Fatal(e.to_string())),
        };
        let view = surface_tex
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let u = frame.uniforms;
        self.scene.reserve(&self.device, frame.instances.len());
        self.queue
            .write_buffer(&self.scene.uniform_buffer, 0, bytemuck::bytes_of(u));
        if !frame.instances.is_empty() {
            self.queue.write_buffer(
                &self.scene.instance_buffer,
                0,
                bytemuck::cast_slice(frame.instances),
            );
        }
        let (bw, bh) = self.targets.bloom_size;
        let mut post = PostUniforms {
            resolution: [bw as f32, bh as f32],
            time: u.time,
            intensity: u.color_intensity,
            blur_dir: [1.0, 0.0],
            bloom_strength: u.bloom_strength,
            threshold: u.bloom_threshold,
        };
        let [h_buf, v_buf] = &self.post.uniform_buffers;
        self.queue.write_buffer(h_buf, 0, bytemuck::bytes_of(&post));
        post.blur_dir = [0.0, 1.0];
        self.queue.write_buffer(v_buf, 0, bytemuck::bytes_of(&post));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        self.scene.draw(
            &mut encoder,
            &self.targets.hdr_view,
            helpers::to_wgpu_color(u.background),
            frame.instances.len() as u32,
        );
        post::blit(
            &mut encoder,
            "bright_pass",
            &self.targets.bloom_a_view,
            &self.post.bright_pipeline,
            &self.groups.hdr,
            None,
        );
        post::blit(
            &mut encoder,
            "blur_h",
            &self.targets.bloom_b_view,
            &self.post.blur_pipeline,
            &self.groups.from_bloom_a,
            None,
        );
        post::blit(
            &mut encoder,
            "blur_v",
            &self.targets.bloom_a_view,
            &self.post.blur_pipeline,
            &self.groups.from_bloom_b,
            None,
        );
        post::blit(
            &mut encoder,
            "composite",
            &view,
            &self.post.composite_pipeline,
            &self.groups.hdr,
            Some(&self.groups.bloom_a_only),
        );
        self.queue.submit(Some(encoder.finish()));
        surface_tex.present();
        Ok(())
    }
}
