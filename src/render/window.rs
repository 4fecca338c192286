use super::{RenderError, RenderResult, wgpu_backend::WgpuBackend};
use crate::config::StudioConfig;
use crate::design::DesignConfig;
use crate::scene::{
    Container, FileSource, FrameToken, ListenerId, ListenerKind, RefreshDriver, SceneInput,
    SceneRuntime,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{EventLoop, EventLoopWindowTarget},
    window::Window,
};

/// Pixels of a trackpad scroll that count as one wheel step.
const PIXELS_PER_WHEEL_STEP: f64 = 100.0;

#[derive(Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Flavor Studio".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
        }
    }
}

pub struct WindowContainer {
    window: Arc<Window>,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    next_id: u64,
}

impl WindowContainer {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            listeners: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.listeners.values().any(|registered| *registered == kind)
    }
}

impl Container for WindowContainer {
    fn size(&self) -> (u32, u32) {
        let logical: LogicalSize<u32> = self
            .window
            .inner_size()
            .to_logical(self.window.scale_factor());
        (logical.width, logical.height)
    }

    fn pixel_ratio(&self) -> f32 {
        self.window.scale_factor() as f32
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.insert(id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }
}

pub struct WindowRefreshDriver {
    window: Arc<Window>,
    next_token: u64,
}

impl WindowRefreshDriver {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_token: 0,
        }
    }
}

impl RefreshDriver for WindowRefreshDriver {
    fn request_frame(&mut self) -> FrameToken {
        self.next_token += 1;
        self.window.request_redraw();
        FrameToken(self.next_token)
    }

    fn cancel_frame(&mut self, _token: FrameToken) {
        // winit cannot retract a redraw request; the runtime drops the stale
        // token when it arrives.
    }
}

#[derive(Debug, Clone)]
pub struct InputTranslator {
    scale_factor: f64,
    cursor: (f32, f32),
}

impl InputTranslator {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            cursor: (0.0, 0.0),
        }
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<SceneInput> {
        match event {
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                Some(self.scale_changed(*scale_factor))
            }
            WindowEvent::Resized(size) => Some(self.resized(*size)),
            WindowEvent::CursorMoved { position, .. } => Some(self.cursor_moved(*position)),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => Some(self.left_button(*state)),
            WindowEvent::CursorLeft { .. } => Some(SceneInput::PointerUp),
            WindowEvent::MouseWheel { delta, .. } => Some(wheel(*delta)),
            _ => None,
        }
    }

    fn scale_changed(&mut self, scale_factor: f64) -> SceneInput {
        self.scale_factor = scale_factor;
        SceneInput::PixelRatioChanged {
            pixel_ratio: scale_factor as f32,
        }
    }

    fn resized(&self, size: PhysicalSize<u32>) -> SceneInput {
        let logical: LogicalSize<u32> = size.to_logical(self.scale_factor);
        SceneInput::Resized {
            width: logical.width,
            height: logical.height,
        }
    }

    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> SceneInput {
        let logical = position.to_logical::<f64>(self.scale_factor);
        self.cursor = (logical.x as f32, logical.y as f32);
        SceneInput::PointerMoved {
            x: self.cursor.0,
            y: self.cursor.1,
        }
    }

    fn left_button(&self, state: ElementState) -> SceneInput {
        match state {
            ElementState::Pressed => SceneInput::PointerDown {
                x: self.cursor.0,
                y: self.cursor.1,
            },
            ElementState::Released => SceneInput::PointerUp,
        }
    }
}

fn wheel(delta: MouseScrollDelta) -> SceneInput {
    let steps = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_WHEEL_STEP) as f32,
    };
    SceneInput::Wheel { steps }
}

pub struct PreviewOptions {
    pub window: WindowConfig,
    pub studio: StudioConfig,
    pub asset_path: PathBuf,
    pub design: DesignConfig,
}

struct PreviewApp {
    runtime: SceneRuntime,
    translator: InputTranslator,
    last_frame: Instant,
}

impl PreviewApp {
    fn new(target: &EventLoopWindowTarget<()>, options: &PreviewOptions) -> RenderResult<Self> {
        let window = winit::window::WindowBuilder::new()
            .with_title(options.window.title.clone())
            .with_inner_size(LogicalSize::new(options.window.width, options.window.height))
            .with_resizable(options.window.resizable)
            .build(target)
            .map_err(|_| RenderError::Backend("failed to create window"))?;
        let window = Arc::new(window);

        let backend = WgpuBackend::initialize_for_window(
            Arc::clone(&window),
            options.studio.renderer.enable_vsync,
        )?;
        let mut runtime = SceneRuntime::new(
            &options.studio,
            Box::new(backend),
            Box::new(WindowRefreshDriver::new(Arc::clone(&window))),
        );

        let ready = runtime
            .initialize(Box::new(WindowContainer::new(Arc::clone(&window))))
            .and_then(|()| runtime.sync_design(&options.design).map(|_| ()));
        if let Err(err) = ready {
            log::error!("[render] preview setup failed: {err}");
            return Err(RenderError::Backend("failed to initialize the preview scene"));
        }

        let source = FileSource::new(&options.asset_path);
        match pollster::block_on(runtime.load_asset(&source)) {
            Ok(_) => {
                if let Err(err) = runtime.start_loop() {
                    log::error!("[render] could not start the render loop: {err}");
                }
            }
            Err(err) => log::error!("[render] preview has no model: {err}"),
        }

        Ok(Self {
            runtime,
            translator: InputTranslator::new(window.scale_factor()),
            last_frame: Instant::now(),
        })
    }

    fn handle_window_event(&mut self, target: &EventLoopWindowTarget<()>, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("[render] window close requested");
                self.runtime.teardown();
                target.exit();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_seconds = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;

                if let Some(token) = self.runtime.pending_frame() {
                    if let Err(err) = self.runtime.on_frame(token, delta_seconds) {
                        log::error!("[render] redraw failed: {err}");
                    }
                }
            }
            other => {
                if let Some(input) = self.translator.translate(&other) {
                    if let Err(err) = self.runtime.handle_input(input) {
                        log::warn!("[render] input dropped: {err}");
                    }
                }
            }
        }
    }
}

pub fn run_preview(options: PreviewOptions) -> RenderResult<()> {
    use winit::event::{Event, StartCause};

    let event_loop =
        EventLoop::new().map_err(|_| RenderError::Backend("failed to create event loop"))?;
    let mut app: Option<PreviewApp> = None;

    event_loop
        .run(move |event, target| match event {
            Event::NewEvents(StartCause::Init) => match PreviewApp::new(target, &options) {
                Ok(new_app) => {
                    log::info!("[render] preview window initialized");
                    app = Some(new_app);
                }
                Err(err) => {
                    log::error!("[render] failed to initialize preview window: {err}");
                    target.exit();
                }
            },
            Event::WindowEvent { event, .. } => {
                if let Some(app) = app.as_mut() {
                    app.handle_window_event(target, event);
                }
            }
            _ => {}
        })
        .map_err(|_| RenderError::Backend("event loop terminated with error"))
}
