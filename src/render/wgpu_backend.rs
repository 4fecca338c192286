use super::{
    FrameInputs, FrameScene, FrameSubmission, RenderBackend, RenderError, RenderResult, Viewport,
};
use crate::materials::AssetGraph;
use crate::texture::LabelTexture;
use pollster::block_on;
use std::sync::Arc;
use winit::window::Window;

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const LABEL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

enum Target {
    Offscreen {
        texture: wgpu::Texture,
        size: [u32; 2],
    },
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
}

/// Clears the frame to the scene background and keeps the current label
/// resident as a sampled texture. Draws offscreen unless built for a window.
pub struct WgpuBackend {
    _instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: Option<Target>,
    label: Option<wgpu::Texture>,
}

impl WgpuBackend {
    pub fn initialize() -> RenderResult<Self> {
        let instance = wgpu::Instance::default();
        block_on(Self::initialize_async(instance, None))
    }

    pub fn initialize_for_window(window: Arc<Window>, enable_vsync: bool) -> RenderResult<Self> {
        let instance = wgpu::Instance::default();
        let size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .map_err(|_| RenderError::Backend("failed to create wgpu surface from window"))?;

        let mut backend = block_on(Self::initialize_async(instance, Some(&surface)))?;

        let capabilities = surface.get_capabilities(&backend.adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or(RenderError::Backend("surface reports no texture formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if enable_vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&backend.device, &config);
        log::info!(
            "[render] window surface configured ({}x{}, format: {:?})",
            size.width,
            size.height,
            format
        );

        backend.target = Some(Target::Surface { surface, config });
        Ok(backend)
    }

    async fn initialize_async(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'static>>,
    ) -> RenderResult<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::Backend(
                "failed to find a compatible GPU adapter",
            ))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Flavor Studio Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .map_err(|_| RenderError::Backend("failed to create wgpu device"))?;

        Ok(Self {
            _instance: instance,
            adapter,
            device,
            queue,
            target: None,
            label: None,
        })
    }

    fn create_offscreen(&self, size: [u32; 2]) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Preview Color Target"),
            size: wgpu::Extent3d {
                width: size[0].max(1),
                height: size[1].max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    fn clear(&self, view: &wgpu::TextureView, color: [f32; 3]) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Preview Frame Encoder"),
            });
        {
            let [r, g, b] = color;
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Preview Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl RenderBackend for WgpuBackend {
    fn label(&self) -> &'static str {
        "WGPU Backend"
    }

    fn resize(&mut self, viewport: Viewport) -> RenderResult<()> {
        let size = viewport.physical_size();
        match self.target.take() {
            Some(Target::Surface { surface, mut config }) => {
                config.width = size[0];
                config.height = size[1];
                surface.configure(&self.device, &config);
                self.target = Some(Target::Surface { surface, config });
            }
            Some(Target::Offscreen {
                texture,
                size: current,
            }) if current == size => {
                self.target = Some(Target::Offscreen { texture, size });
            }
            previous => {
                if let Some(Target::Offscreen { texture, .. }) = previous {
                    texture.destroy();
                }
                let texture = self.create_offscreen(size);
                self.target = Some(Target::Offscreen { texture, size });
            }
        }
        log::debug!("[render] target resized to {}x{}", size[0], size[1]);
        Ok(())
    }

    fn upload_label(&mut self, texture: &LabelTexture) -> RenderResult<()> {
        let extent = wgpu::Extent3d {
            width: texture.width(),
            height: texture.height(),
            depth_or_array_layers: 1,
        };
        let gpu_texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Label Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LABEL_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &gpu_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            texture.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * texture.width()),
                rows_per_image: Some(texture.height()),
            },
            extent,
        );
        if let Some(previous) = self.label.replace(gpu_texture) {
            previous.destroy();
        }
        log::debug!(
            "[render] uploaded {}x{} label texture",
            texture.width(),
            texture.height()
        );
        Ok(())
    }

    fn render_frame(
        &mut self,
        inputs: &FrameInputs,
        scene: &FrameScene<'_>,
    ) -> RenderResult<FrameSubmission> {
        if self.target.is_none() {
            self.resize(Viewport::default())?;
        }

        match &self.target {
            Some(Target::Surface { surface, .. }) => {
                let frame = surface
                    .get_current_texture()
                    .map_err(|_| RenderError::Backend("failed to acquire surface texture"))?;
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.clear(&view, scene.clear_color);
                frame.present();
            }
            Some(Target::Offscreen { texture, .. }) => {
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                self.clear(&view, scene.clear_color);
            }
            None => return Err(RenderError::Backend("no render target configured")),
        }

        Ok(FrameSubmission {
            frame_index: inputs.frame_index,
            draw_calls: 1,
        })
    }

    fn release_asset(&mut self, asset: &AssetGraph) -> usize {
        match self.label.take() {
            Some(texture) => {
                texture.destroy();
                log::debug!("[render] released label texture of {:?}", asset.source());
                1
            }
            None => 0,
        }
    }

    fn dispose(&mut self) {
        if let Some(Target::Offscreen { texture, .. }) = self.target.take() {
            texture.destroy();
        }
        if let Some(texture) = self.label.take() {
            texture.destroy();
        }
    }
}
