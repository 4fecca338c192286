#[cfg(feature = "render-wgpu")]
pub mod wgpu_backend;
#[cfg(feature = "render-wgpu")]
pub mod window;

use crate::materials::{AssetGraph, RegionClass, classify};
use crate::scene::{LightRig, Platform};
use crate::texture::LabelTexture;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Null,
    Wgpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RendererConfig {
    pub backend: BackendKind,
    pub enable_vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Null,
            enable_vsync: true,
        }
    }
}

/// Size of the output surface in CSS-style logical pixels plus the device
/// pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn physical_size(&self) -> [u32; 2] {
        [
            ((self.width as f32 * self.pixel_ratio).round() as u32).max(1),
            ((self.height as f32 * self.pixel_ratio).round() as u32).max(1),
        ]
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720, 1.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameInputs {
    pub frame_index: u64,
    pub delta_seconds: f32,
    pub elapsed_seconds: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub mesh: String,
    pub slot: String,
    pub region: RegionClass,
    pub color: [f32; 3],
    pub label_fingerprint: Option<u64>,
}

pub struct FrameScene<'a> {
    pub view_projection: Mat4,
    pub eye: Vec3,
    pub clear_color: [f32; 3],
    pub lights: &'a LightRig,
    pub platform: &'a Platform,
    pub draws: Vec<DrawItem>,
}

impl FrameScene<'_> {
    pub fn collect_draws(asset: Option<&AssetGraph>) -> Vec<DrawItem> {
        let Some(asset) = asset else {
            return Vec::new();
        };
        asset
            .nodes()
            .iter()
            .flat_map(|node| {
                node.slots().iter().map(move |slot| DrawItem {
                    mesh: node.name().to_string(),
                    slot: slot.name().to_string(),
                    region: classify(node.name(), slot.name()),
                    color: slot.color().to_unit(),
                    label_fingerprint: slot.map().map(|texture| texture.fingerprint()),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSubmission {
    pub frame_index: u64,
    pub draw_calls: usize,
}

#[derive(Debug)]
pub enum RenderError {
    FrameOutOfOrder { expected: u64, got: u64 },
    Backend(&'static str),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::FrameOutOfOrder { expected, got } => write!(
                f,
                "renderer expected frame {expected} but backend produced {got}"
            ),
            RenderError::Backend(reason) => write!(f, "gpu backend failure: {reason}"),
        }
    }
}

impl std::error::Error for RenderError {}

pub type RenderResult<T> = Result<T, RenderError>;

pub trait RenderBackend: Send {
    fn label(&self) -> &'static str;

    fn resize(&mut self, viewport: Viewport) -> RenderResult<()>;

    fn upload_label(&mut self, texture: &LabelTexture) -> RenderResult<()>;

    fn render_frame(
        &mut self,
        inputs: &FrameInputs,
        scene: &FrameScene<'_>,
    ) -> RenderResult<FrameSubmission>;

    /// Frees GPU buffers held for `asset`; returns how many were released.
    fn release_asset(&mut self, asset: &AssetGraph) -> usize;

    fn dispose(&mut self);
}

pub struct Renderer {
    config: RendererConfig,
    backend: Box<dyn RenderBackend>,
    frame_index: u64,
    elapsed_seconds: f32,
    uploaded_label: Option<u64>,
}

impl Renderer {
    pub fn new(config: RendererConfig, backend: Box<dyn RenderBackend>) -> Self {
        Self {
            config,
            backend,
            frame_index: 0,
            elapsed_seconds: 0.0,
            uploaded_label: None,
        }
    }

    pub fn render(
        &mut self,
        delta_seconds: f32,
        scene: &FrameScene<'_>,
    ) -> RenderResult<FrameSubmission> {
        let next_index = self.frame_index + 1;
        let elapsed = self.elapsed_seconds + delta_seconds;
        let inputs = FrameInputs {
            frame_index: next_index,
            delta_seconds,
            elapsed_seconds: elapsed,
        };

        let submission = self.backend.render_frame(&inputs, scene)?;
        if submission.frame_index != next_index {
            return Err(RenderError::FrameOutOfOrder {
                expected: next_index,
                got: submission.frame_index,
            });
        }

        self.frame_index = next_index;
        self.elapsed_seconds = elapsed;
        Ok(submission)
    }

    /// Uploads every label texture flagged on `asset` once, then clears the
    /// flags. Returns the number of distinct textures sent to the backend.
    pub fn upload_pending(&mut self, asset: &mut AssetGraph) -> RenderResult<usize> {
        let mut seen = HashSet::new();
        let mut uploaded = 0;
        for (_, slot) in asset.pending_uploads() {
            let Some(texture) = slot.map() else {
                continue;
            };
            if !seen.insert(texture.fingerprint()) {
                continue;
            }
            if self.uploaded_label == Some(texture.fingerprint()) {
                continue;
            }
            self.backend.upload_label(texture)?;
            self.uploaded_label = Some(texture.fingerprint());
            uploaded += 1;
        }
        asset.mark_all_uploaded();
        Ok(uploaded)
    }

    pub fn resize(&mut self, viewport: Viewport) -> RenderResult<()> {
        self.backend.resize(viewport)
    }

    pub fn release_asset(&mut self, asset: &AssetGraph) -> usize {
        self.uploaded_label = None;
        self.backend.release_asset(asset)
    }

    pub fn dispose(&mut self) {
        self.backend.dispose();
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend_label(&self) -> &'static str {
        self.backend.label()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

#[derive(Default)]
pub struct NullBackend {
    viewport: Option<Viewport>,
    labels_uploaded: usize,
    disposed: bool,
}

impl RenderBackend for NullBackend {
    fn label(&self) -> &'static str {
        "Null Backend"
    }

    fn resize(&mut self, viewport: Viewport) -> RenderResult<()> {
        self.viewport = Some(viewport);
        Ok(())
    }

    fn upload_label(&mut self, texture: &LabelTexture) -> RenderResult<()> {
        self.labels_uploaded += 1;
        log::trace!(
            "[render] null backend received {}x{} label",
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
        if self.disposed {
            return Err(RenderError::Backend("null backend already disposed"));
        }
        log::trace!(
            "[render] frame {} (Δ {:.3} s) - {} draw(s)",
            inputs.frame_index,
            inputs.delta_seconds,
            scene.draws.len()
        );
        Ok(FrameSubmission {
            frame_index: inputs.frame_index,
            draw_calls: scene.draws.len() + 1,
        })
    }

    fn release_asset(&mut self, asset: &AssetGraph) -> usize {
        asset.slot_count()
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}

/// Builds the backend named by `kind`, falling back to [`NullBackend`] when
/// the GPU path is unavailable.
pub fn create_backend(kind: BackendKind) -> Box<dyn RenderBackend> {
    match kind {
        BackendKind::Null => Box::new(NullBackend::default()),
        BackendKind::Wgpu => {
            #[cfg(feature = "render-wgpu")]
            {
                match wgpu_backend::WgpuBackend::initialize() {
                    Ok(backend) => Box::new(backend) as Box<dyn RenderBackend>,
                    Err(err) => {
                        log::warn!(
                            "[render] failed to initialize wgpu backend ({err}); falling back to Null"
                        );
                        Box::new(NullBackend::default())
                    }
                }
            }

            #[cfg(not(feature = "render-wgpu"))]
            {
                log::warn!(
                    "[render] wgpu backend requested but 'render-wgpu' feature is disabled; falling back to Null"
                );
                Box::new(NullBackend::default())
            }
        }
    }
}
