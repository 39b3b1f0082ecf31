//! Frame loop and application event handling.
//!
//! [`App`] owns the window, the GPU [`Context`], the [`Scene`] and a
//! [`FrameDriver`]. Once the context exists the asset pipeline is started in
//! the background; its results arrive back on the event loop as
//! [`AppEvent::Scene`] and are applied there, between frames.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and the context
//! 2. the asset pipeline is spawned and reports each stage as an event
//! 3. every `RedrawRequested` advances the controls, presents a frame and asks for the next one
//! 4. `Resized` updates the camera aspect and the surface before the next frame

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use crate::{
    camera::{Camera, OrbitControls},
    config::{AssetConfig, SceneConfig},
    context::{Context, GpuScene},
    data_structures::texture::Texture,
    pipeline,
    resources::loaders::{GpuLoader, ImageLoader},
    scene::{Scene, SceneEvent},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Per-frame camera state, independent of any window or GPU.
#[derive(Debug)]
pub struct FrameDriver {
    pub camera: Camera,
    pub controls: OrbitControls,
    viewport: Viewport,
}

impl FrameDriver {
    pub fn new(config: &SceneConfig, width: u32, height: u32) -> Self {
        let viewport = Viewport {
            width: width.max(1),
            height: height.max(1),
        };
        let camera = Camera::new(&config.camera, viewport.aspect());
        let mut controls = OrbitControls::new(config.controls.clone(), config.camera.target);
        controls.set_viewport_height(viewport.height);
        Self {
            camera,
            controls,
            viewport,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Adopt a new viewport size. Returns `false` and changes nothing if either side is zero.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::debug!("ignoring resize to {width}x{height}");
            return false;
        }
        self.viewport = Viewport { width, height };
        self.camera.aspect = self.viewport.aspect();
        self.controls.set_viewport_height(height);
        true
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.controls.handle_window_event(&self.camera, event)
    }

    /// Step the controls by one frame. Returns `true` if the camera moved.
    pub fn advance(&mut self, dt: Duration) -> bool {
        log::trace!("frame after {:?}", dt);
        self.controls.update(&mut self.camera)
    }
}

pub enum AppEvent {
    /// The context finished initialising on the web, where it cannot be awaited in place.
    #[allow(dead_code)]
    Initialized(Box<Context>),
    Scene(SceneEvent<Arc<Texture>, Arc<Texture>>),
}

impl std::fmt::Debug for AppEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Scene(SceneEvent::Environment(_)) => f.write_str("Scene(Environment)"),
            Self::Scene(SceneEvent::ModelLoaded(model)) => {
                f.debug_tuple("Scene(ModelLoaded)").field(&model.name).finish()
            }
            Self::Scene(SceneEvent::TexturesLoaded { model, textures }) => f
                .debug_struct("Scene(TexturesLoaded)")
                .field("model", model)
                .field("folder", &textures.folder)
                .finish(),
        }
    }
}

/// Run the asset pipeline to completion, forwarding every stage to the event loop.
async fn load_assets(loader: GpuLoader, assets: AssetConfig, proxy: EventLoopProxy<AppEvent>) {
    let result = pipeline::run(&loader, &assets, |event| {
        if proxy.send_event(AppEvent::Scene(event)).is_err() {
            log::warn!("event loop closed before the scene event could be delivered");
        }
    })
    .await;
    match result {
        Ok(report) => log::info!("asset pipeline finished: {:?}", report),
        Err(e) => log::error!("asset pipeline stopped: {e}"),
    }
}

/// Runs the asset pipeline on a blocking thread, off the event loop.
#[cfg(not(target_arch = "wasm32"))]
pub struct LoadRuntime {
    runtime: tokio::runtime::Runtime,
}

#[cfg(not(target_arch = "wasm32"))]
impl LoadRuntime {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            runtime: tokio::runtime::Runtime::new()?,
        })
    }

    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// The future is built on the blocking thread, so it need not be `Send`.
    pub fn spawn<F, Fut>(&self, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()>,
    {
        let handle = self.runtime.handle().clone();
        self.runtime.spawn_blocking(move || handle.block_on(job()));
    }

    /// Returns at once; loads still in flight are abandoned.
    pub fn shutdown(self) {
        self.runtime.shutdown_background();
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: LoadRuntime,
    proxy: EventLoopProxy<AppEvent>,
    config: SceneConfig,
    ctx: Option<Context>,
    scene: GpuScene,
    driver: FrameDriver,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = LoadRuntime::new()?;
        let scene = Scene::new(&config);
        let driver = FrameDriver::new(&config, 1, 1);
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            ctx: None,
            scene,
            driver,
            last_time: Instant::now(),
        })
    }

    /// Take ownership of a ready context, size everything to the window and start loading.
    fn install(&mut self, mut ctx: Context) {
        let size = ctx.window().inner_size();
        self.driver.resize(size.width, size.height);
        ctx.resize(size.width, size.height);

        let loader = GpuLoader::new(
            ImageLoader::from_config(&self.config.assets),
            ctx.device.clone(),
            ctx.queue.clone(),
        );
        let assets = self.config.assets.clone();
        let proxy = self.proxy.clone();

        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime
            .spawn(move || load_assets(loader, assets, proxy));

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load_assets(loader, assets, proxy));

        ctx.window().request_redraw();
        self.ctx = Some(ctx);
    }

    fn shutdown(self) {
        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.shutdown();
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.ctx.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("showroom");

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            window_attributes = match canvas {
                Some(canvas) => window_attributes.with_canvas(Some(canvas.unchecked_into())),
                None => window_attributes.with_append(true),
            };
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(Context::new(window)) {
                Ok(ctx) => self.install(ctx),
                Err(e) => {
                    log::error!("could not create the graphics context: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match Context::new(window).await {
                    Ok(ctx) => {
                        if proxy.send_event(AppEvent::Initialized(Box::new(ctx))).is_err() {
                            log::error!("event loop closed during initialisation");
                        }
                    }
                    Err(e) => log::error!("could not create the graphics context: {e:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        log::debug!("{:?}", event);
        match event {
            AppEvent::Initialized(ctx) => self.install(*ctx),
            AppEvent::Scene(event) => {
                self.scene.apply(event);
                if let Some(ctx) = &self.ctx {
                    ctx.window().request_redraw();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(ctx) = &mut self.ctx else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if self.driver.resize(size.width, size.height) {
                    ctx.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                self.driver.advance(dt);

                match ctx.render(&mut self.scene, &self.driver.camera) {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = ctx.window().inner_size();
                        ctx.resize(size.width, size.height);
                    }
                    Err(e) => log::error!("Unable to render {}", e),
                }
                ctx.window().request_redraw();
            }
            other => {
                self.driver.handle_window_event(&other);
            }
        }
    }
}

/// Open a window and show the scene described by `config` until it is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| anyhow::anyhow!("could not initialize logger: {e}"))?;
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    let result = event_loop.run_app(&mut app);
    app.shutdown();
    result?;

    Ok(())
}
