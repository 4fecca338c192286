pub mod camera;
pub mod container;
pub mod frame_loop;
pub mod lights;
pub mod loader;

pub use camera::{CameraRig, CameraSettings};
pub use container::{Container, HeadlessContainer, ListenerId, ListenerKind};
pub use frame_loop::{FrameLoop, FrameToken, ManualRefreshDriver, RefreshDriver};
pub use lights::{AmbientLight, DirectionalLight, LightRig, Platform, PointLight};
pub use loader::{AssetSource, BytesSource, FileSource, LoadError, decode_asset};

use crate::config::StudioConfig;
use crate::design::{DesignConfig, DesignDelta, Rgb, lighten_background};
use crate::materials::{self, AssetGraph, RegionSummary, RouteOutcome};
use crate::render::{
    FrameScene, FrameSubmission, RenderBackend, RenderError, Renderer, Viewport, create_backend,
};
use crate::texture::{LabelCache, LabelSynthesizer, LabelTexture};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_BACKGROUND: Rgb = Rgb::from_u32(0x1A1A1A);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Uninitialized,
    Ready,
    AssetLoaded,
    LoadFailed,
    Running,
    Disposed,
}

impl RuntimeState {
    fn accepts_load(self) -> bool {
        matches!(self, RuntimeState::Ready | RuntimeState::LoadFailed)
    }
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuntimeState::Uninitialized => "uninitialized",
            RuntimeState::Ready => "ready",
            RuntimeState::AssetLoaded => "asset-loaded",
            RuntimeState::LoadFailed => "load-failed",
            RuntimeState::Running => "running",
            RuntimeState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("cannot {operation} while the scene is {state}")]
    InvalidState {
        operation: &'static str,
        state: RuntimeState,
    },
    #[error("scene has been torn down")]
    Disposed,
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneInput {
    Resized { width: u32, height: u32 },
    /// The window moved to a display with a different scale factor.
    PixelRatioChanged { pixel_ratio: f32 },
    PointerDown { x: f32, y: f32 },
    PointerMoved { x: f32, y: f32 },
    PointerUp,
    Wheel { steps: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub delta: DesignDelta,
    pub body: Option<RouteOutcome>,
    pub label: Option<RouteOutcome>,
}

pub struct SceneRuntime {
    state: RuntimeState,
    container: Option<Box<dyn Container>>,
    listeners: Vec<ListenerId>,
    viewport: Viewport,
    camera: CameraRig,
    lights: LightRig,
    platform: Platform,
    background: [f32; 3],
    renderer: Renderer,
    frames: FrameLoop,
    asset: Option<AssetGraph>,
    labels: LabelCache,
    applied: Option<DesignConfig>,
    drag_origin: Option<(f32, f32)>,
}

impl SceneRuntime {
    pub fn new(
        config: &StudioConfig,
        backend: Box<dyn RenderBackend>,
        driver: Box<dyn RefreshDriver>,
    ) -> Self {
        let viewport = Viewport::default();
        Self {
            state: RuntimeState::Uninitialized,
            container: None,
            listeners: Vec::new(),
            viewport,
            camera: CameraRig::new(config.camera, viewport.aspect()),
            lights: LightRig::default(),
            platform: Platform::default(),
            background: DEFAULT_BACKGROUND.to_unit(),
            renderer: Renderer::new(config.renderer, backend),
            frames: FrameLoop::new(driver),
            asset: None,
            labels: LabelCache::new(LabelSynthesizer::new(config.label)),
            applied: None,
            drag_origin: None,
        }
    }

    pub fn from_config(config: &StudioConfig, driver: Box<dyn RefreshDriver>) -> Self {
        Self::new(config, create_backend(config.renderer.backend), driver)
    }

    fn ensure_live(&self) -> Result<(), SceneError> {
        if self.state == RuntimeState::Disposed {
            Err(SceneError::Disposed)
        } else {
            Ok(())
        }
    }

    fn invalid(&self, operation: &'static str) -> SceneError {
        if self.state == RuntimeState::Disposed {
            SceneError::Disposed
        } else {
            SceneError::InvalidState {
                operation,
                state: self.state,
            }
        }
    }

    pub fn initialize(&mut self, mut container: Box<dyn Container>) -> Result<(), SceneError> {
        if self.state != RuntimeState::Uninitialized {
            return Err(self.invalid("initialize"));
        }

        let (width, height) = container.size();
        self.viewport = Viewport::new(width, height, container.pixel_ratio());
        self.camera.set_aspect(self.viewport.aspect());
        self.renderer.resize(self.viewport)?;

        self.listeners = ListenerKind::ALL
            .iter()
            .map(|kind| container.add_listener(*kind))
            .collect();
        self.container = Some(container);
        self.state = RuntimeState::Ready;

        log::info!(
            "[scene] initialized {}x{} @{}x on {}",
            width,
            height,
            self.viewport.pixel_ratio,
            self.renderer.backend_label()
        );
        Ok(())
    }

    /// Loads the preview model. On failure the runtime moves to
    /// [`RuntimeState::LoadFailed`] and keeps accepting retries.
    pub async fn load_asset<S: AssetSource>(
        &mut self,
        source: &S,
    ) -> Result<RegionSummary, SceneError> {
        if !self.state.accepts_load() {
            return Err(self.invalid("load an asset"));
        }

        let asset = match loader::load(source).await {
            Ok(asset) => asset,
            Err(err) => {
                log::error!("[scene] failed to load {:?}: {err}", source.name());
                self.state = RuntimeState::LoadFailed;
                return Err(err.into());
            }
        };

        let summary = asset.validate_regions();
        if summary.label == 0 {
            log::warn!(
                "[scene] {:?} has no label regions; the label will not be visible",
                asset.source()
            );
        }
        self.asset = Some(asset);
        self.state = RuntimeState::AssetLoaded;

        if let Some(design) = self.applied.clone() {
            let _ = materials::apply_body_color(self.asset.as_mut(), design.bag_color);
            let _ = self.route_label(&design);
        }
        log::info!(
            "[scene] asset ready: {} label / {} logo / {} body slot(s)",
            summary.label,
            summary.logo,
            summary.body
        );
        Ok(summary)
    }

    pub fn start_loop(&mut self) -> Result<FrameToken, SceneError> {
        match self.state {
            RuntimeState::Running => match self.frames.pending() {
                Some(token) => Ok(token),
                None => Ok(self.frames.request()),
            },
            RuntimeState::AssetLoaded => {
                self.state = RuntimeState::Running;
                log::debug!("[scene] render loop started");
                Ok(self.frames.request())
            }
            _ => Err(self.invalid("start the render loop")),
        }
    }

    /// Cancels the pending frame. Calling it when the loop is not running is a
    /// no-op.
    pub fn stop_loop(&mut self) -> Result<(), SceneError> {
        self.ensure_live()?;
        self.frames.cancel();
        if self.state == RuntimeState::Running {
            self.state = RuntimeState::AssetLoaded;
            log::debug!("[scene] render loop stopped");
        }
        Ok(())
    }

    /// Renders one frame if `token` is the outstanding request, then requests
    /// the next one. Stale tokens render nothing.
    pub fn on_frame(
        &mut self,
        token: FrameToken,
        delta_seconds: f32,
    ) -> Result<Option<FrameSubmission>, SceneError> {
        self.ensure_live()?;
        if self.state != RuntimeState::Running || !self.frames.accept(token) {
            log::trace!("[scene] ignoring stale frame {token:?}");
            return Ok(None);
        }

        self.camera.advance();
        if let Some(asset) = self.asset.as_mut() {
            self.renderer.upload_pending(asset)?;
        }

        let scene = FrameScene {
            view_projection: self.camera.view_projection(),
            eye: self.camera.eye_position(),
            clear_color: self.background,
            lights: &self.lights,
            platform: &self.platform,
            draws: FrameScene::collect_draws(self.asset.as_ref()),
        };
        let submission = self.renderer.render(delta_seconds, &scene)?;
        self.frames.request();
        Ok(Some(submission))
    }

    pub fn teardown(&mut self) {
        if self.state == RuntimeState::Disposed {
            return;
        }

        self.frames.cancel();
        if let Some(container) = self.container.as_mut() {
            for id in self.listeners.drain(..) {
                if !container.remove_listener(id) {
                    log::warn!("[scene] listener {id:?} was already removed");
                }
            }
        }
        self.container = None;

        if let Some(asset) = self.asset.take() {
            let released = self.renderer.release_asset(&asset);
            log::debug!("[scene] released {released} GPU resource(s) of {:?}", asset.source());
        }
        self.renderer.dispose();
        self.labels.clear();
        self.drag_origin = None;
        self.state = RuntimeState::Disposed;
        log::info!("[scene] torn down");
    }

    pub fn update_background(&mut self, color: Rgb) -> Result<(), SceneError> {
        self.ensure_live()?;
        self.background = lighten_background(color);
        Ok(())
    }

    pub fn apply_body_color(&mut self, color: Rgb) -> Result<RouteOutcome, SceneError> {
        self.ensure_live()?;
        Ok(materials::apply_body_color(self.asset.as_mut(), color))
    }

    /// Builds the label for `design` and routes it to the label regions.
    /// Nothing is synthesized while no model is loaded.
    pub fn apply_label_texture(&mut self, design: &DesignConfig) -> Result<RouteOutcome, SceneError> {
        self.ensure_live()?;
        Ok(self.route_label(design))
    }

    fn route_label(&mut self, design: &DesignConfig) -> RouteOutcome {
        if self.asset.is_none() {
            log::warn!("[scene] label for {:?} deferred until the model loads", design.name);
            return RouteOutcome::NotReady;
        }
        let texture = self.labels.get_or_synthesize(&design.label_key());
        materials::apply_label_texture(self.asset.as_mut(), &texture)
    }

    /// Applies whatever changed since the last synced design. The first sync
    /// applies everything.
    pub fn sync_design(&mut self, design: &DesignConfig) -> Result<SyncReport, SceneError> {
        self.ensure_live()?;
        let delta = match &self.applied {
            Some(previous) => design.delta_from(previous),
            None => DesignDelta::ALL,
        };

        if delta.background {
            self.background = lighten_background(design.bag_color);
        }
        let body = delta
            .body_color
            .then(|| materials::apply_body_color(self.asset.as_mut(), design.bag_color));
        let label = delta.label.then(|| self.route_label(design));

        self.applied = Some(design.clone());
        Ok(SyncReport { delta, body, label })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SceneError> {
        self.ensure_live()?;
        self.viewport = Viewport::new(width, height, self.viewport.pixel_ratio);
        self.camera.set_aspect(self.viewport.aspect());
        self.renderer.resize(self.viewport)?;
        log::debug!("[scene] resized to {width}x{height}");
        Ok(())
    }

    pub fn resize_from_container(&mut self) -> Result<(), SceneError> {
        self.ensure_live()?;
        let Some(container) = self.container.as_ref() else {
            return Err(self.invalid("resize from the container"));
        };
        let (width, height) = container.size();
        self.viewport.pixel_ratio = container.pixel_ratio();
        self.resize(width, height)
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) -> Result<(), SceneError> {
        self.ensure_live()?;
        self.viewport.pixel_ratio = pixel_ratio;
        self.resize(self.viewport.width, self.viewport.height)
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.drag_origin = Some((x, y));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let Some((last_x, last_y)) = self.drag_origin {
            self.camera.orbit(x - last_x, y - last_y);
            self.drag_origin = Some((x, y));
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag_origin = None;
    }

    pub fn scroll(&mut self, steps: f32) {
        self.camera.zoom(steps);
    }

    pub fn handle_input(&mut self, input: SceneInput) -> Result<(), SceneError> {
        self.ensure_live()?;
        match input {
            SceneInput::Resized { width, height } => self.resize(width, height)?,
            SceneInput::PixelRatioChanged { pixel_ratio } => self.set_pixel_ratio(pixel_ratio)?,
            SceneInput::PointerDown { x, y } => self.pointer_down(x, y),
            SceneInput::PointerMoved { x, y } => self.pointer_move(x, y),
            SceneInput::PointerUp => self.pointer_up(),
            SceneInput::Wheel { steps } => self.scroll(steps),
        }
        Ok(())
    }

    pub fn state(&self) -> RuntimeState {
        self.state
    }

    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.frames.pending()
    }

    pub fn asset(&self) -> Option<&AssetGraph> {
        self.asset.as_ref()
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn background(&self) -> [f32; 3] {
        self.background
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn current_label(&self) -> Option<&Arc<LabelTexture>> {
        self.labels.current()
    }

    pub fn label_cache(&self) -> &LabelCache {
        &self.labels
    }

    pub fn frame_index(&self) -> u64 {
        self.renderer.frame_index()
    }
}

impl Drop for SceneRuntime {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::loader::fixtures::{BAG_GLTF, NO_MESH_GLTF};
    use super::*;
    use crate::texture::LabelLayout;
    use pollster::block_on;

    fn small_config() -> StudioConfig {
        StudioConfig {
            label: LabelLayout {
                canvas_width: 256,
                canvas_height: 128,
                max_font_size: 48.0,
                min_font_size: 16.0,
                font_step: 8.0,
                max_text_width: 240.0,
                line_spacing: 6.0,
                flip_vertical: false,
            },
            ..StudioConfig::default()
        }
    }

    fn runtime() -> (SceneRuntime, HeadlessContainer) {
        let mut runtime =
            SceneRuntime::from_config(&small_config(), Box::new(ManualRefreshDriver::new()));
        let host = HeadlessContainer::new(800, 600, 2.0);
        runtime.initialize(Box::new(host.clone())).unwrap();
        (runtime, host)
    }

    fn loaded() -> (SceneRuntime, HeadlessContainer) {
        let (mut runtime, host) = runtime();
        block_on(runtime.load_asset(&BytesSource::new("bag.gltf", BAG_GLTF))).unwrap();
        (runtime, host)
    }

    #[test]
    fn initialize_registers_every_listener_kind() {
        let (runtime, host) = runtime();
        assert_eq!(runtime.state(), RuntimeState::Ready);
        for kind in ListenerKind::ALL {
            assert_eq!(host.listeners_of(kind), 1);
        }
        assert!((runtime.camera().aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn pixel_ratio_change_keeps_logical_size() {
        let (mut runtime, _host) = runtime();
        assert_eq!(runtime.viewport().physical_size(), [1600, 1200]);

        runtime
            .handle_input(SceneInput::PixelRatioChanged { pixel_ratio: 1.0 })
            .unwrap();
        assert_eq!(runtime.viewport().physical_size(), [800, 600]);

        runtime.handle_input(SceneInput::Resized { width: 400, height: 300 }).unwrap();
        assert_eq!(runtime.viewport().physical_size(), [400, 300]);

        runtime.set_pixel_ratio(0.0).unwrap();
        assert_eq!(runtime.viewport().pixel_ratio, 1.0);
    }

    #[test]
    fn second_initialize_is_rejected() {
        let (mut runtime, host) = runtime();
        let err = runtime.initialize(Box::new(host)).unwrap_err();
        assert!(matches!(
            err,
            SceneError::InvalidState {
                state: RuntimeState::Ready,
                ..
            }
        ));
    }

    #[test]
    fn failed_load_can_be_retried() {
        let (mut runtime, _host) = runtime();
        let err = block_on(runtime.load_asset(&BytesSource::new("empty", NO_MESH_GLTF)))
            .unwrap_err();
        assert!(matches!(err, SceneError::Load(LoadError::Empty(_))));
        assert_eq!(runtime.state(), RuntimeState::LoadFailed);

        let summary =
            block_on(runtime.load_asset(&BytesSource::new("bag.gltf", BAG_GLTF))).unwrap();
        assert_eq!(summary.label, 1);
        assert_eq!(runtime.state(), RuntimeState::AssetLoaded);
    }

    #[test]
    fn design_before_load_is_applied_on_load() {
        let (mut runtime, _host) = runtime();
        let mut design = DesignConfig::default();
        design.set_bag_color_hex("#DC4419").unwrap();

        let report = runtime.sync_design(&design).unwrap();
        assert_eq!(report.body, Some(RouteOutcome::NotReady));
        assert_eq!(report.label, Some(RouteOutcome::NotReady));
        assert!(runtime.current_label().is_none());

        block_on(runtime.load_asset(&BytesSource::new("bag.gltf", BAG_GLTF))).unwrap();
        let asset = runtime.asset().unwrap();
        assert_eq!(asset.mesh("Bag_Body").unwrap().slots()[0].color(), design.bag_color);
        assert!(asset.mesh("Label_Front").unwrap().slots()[0].map().is_some());
    }

    #[test]
    fn sync_only_touches_what_changed() {
        let (mut runtime, _host) = loaded();
        let mut design = DesignConfig::default();
        runtime.sync_design(&design).unwrap();
        let misses = runtime.label_cache().misses();

        design.add_flavor_note("Smoky").unwrap();
        let report = runtime.sync_design(&design).unwrap();
        assert!(report.delta.is_empty());
        assert_eq!(runtime.label_cache().misses(), misses);

        design.set_name("Dill Pickle");
        let report = runtime.sync_design(&design).unwrap();
        assert_eq!(report.body, None);
        assert!(matches!(report.label, Some(RouteOutcome::Applied { slots: 1 })));
    }

    #[test]
    fn background_is_lightened_bag_color() {
        let (mut runtime, _host) = runtime();
        runtime.update_background(Rgb::BLACK).unwrap();
        assert_eq!(runtime.background(), [0.35, 0.35, 0.35]);
    }

    #[test]
    fn loop_renders_only_current_token() {
        let (mut runtime, _host) = loaded();
        let first = runtime.start_loop().unwrap();
        assert_eq!(runtime.state(), RuntimeState::Running);

        let submitted = runtime.on_frame(first, 0.016).unwrap();
        assert_eq!(submitted.map(|s| s.frame_index), Some(1));
        assert!(runtime.on_frame(first, 0.016).unwrap().is_none());

        let next = runtime.pending_frame().unwrap();
        runtime.stop_loop().unwrap();
        runtime.stop_loop().unwrap();
        assert_eq!(runtime.state(), RuntimeState::AssetLoaded);
        assert!(runtime.on_frame(next, 0.016).unwrap().is_none());
        assert_eq!(runtime.frame_index(), 1);
    }

    #[test]
    fn loop_requires_a_loaded_asset() {
        let (mut runtime, _host) = runtime();
        assert!(matches!(
            runtime.start_loop(),
            Err(SceneError::InvalidState { .. })
        ));
    }

    #[test]
    fn drag_orbits_camera_over_frames() {
        let (mut runtime, _host) = loaded();
        let token = runtime.start_loop().unwrap();
        runtime.handle_input(SceneInput::PointerDown { x: 100.0, y: 100.0 }).unwrap();
        runtime.handle_input(SceneInput::PointerMoved { x: 50.0, y: 100.0 }).unwrap();
        runtime.handle_input(SceneInput::PointerUp).unwrap();
        runtime.handle_input(SceneInput::PointerMoved { x: 0.0, y: 0.0 }).unwrap();
        assert_eq!(runtime.camera().yaw(), 0.0);

        runtime.on_frame(token, 0.016).unwrap();
        assert!(runtime.camera().yaw() > 0.0);
    }

    #[test]
    fn resize_follows_container() {
        let (mut runtime, host) = runtime();
        host.set_size(1000, 500);
        runtime.resize_from_container().unwrap();
        assert_eq!(runtime.viewport().width, 1000);
        assert!((runtime.camera().aspect() - 2.0).abs() < 1e-6);

        runtime.resize(640, 0).unwrap();
        assert_eq!(runtime.camera().aspect(), 1.0);
    }

    #[test]
    fn teardown_is_idempotent_and_terminal() {
        let (mut runtime, host) = loaded();
        runtime.start_loop().unwrap();

        runtime.teardown();
        runtime.teardown();
        assert_eq!(runtime.state(), RuntimeState::Disposed);
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.removals(), ListenerKind::ALL.len());
        assert!(runtime.asset().is_none());
        assert!(runtime.pending_frame().is_none());

        assert!(matches!(runtime.apply_body_color(Rgb::WHITE), Err(SceneError::Disposed)));
        assert!(matches!(runtime.start_loop(), Err(SceneError::Disposed)));
        assert!(matches!(
            block_on(runtime.load_asset(&BytesSource::new("bag.gltf", BAG_GLTF))),
            Err(SceneError::Disposed)
        ));
    }
}
