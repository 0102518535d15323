//! Globe Widget
//!
//! Browser host for `GlobeRenderer`: sizes the canvas, drives the
//! `requestAnimationFrame` loop, forwards mouse input and loads the land
//! dots. Mouse-down is taken on the canvas; move and up are taken on the
//! document so a drag keeps working outside the widget.

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent, Window};

use agent_client::ApiClient;
use globe_core::projection::ScreenPoint;
use globe_core::{DrawingSurface, GlobeConfig, GlobeRenderer, SurfaceLayout, ViewportRequest};

use crate::api::use_api_client;

/// Canvas 2D context as a drawing surface
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// `None` when the canvas has no 2D context
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { ctx })
    }

    /// Size the backing store in device pixels and draw in logical pixels
    fn apply_layout(&self, canvas: &HtmlCanvasElement, layout: &SurfaceLayout) {
        canvas.set_width(layout.pixel_width);
        canvas.set_height(layout.pixel_height);
        let _ = canvas.set_attribute(
            "style",
            &format!("width: {}px; height: {}px;", layout.width, layout.height),
        );

        let ratio = layout.pixel_ratio;
        if let Err(e) = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0) {
            tracing::warn!("Could not scale globe canvas: {:?}", e);
        }
    }
}

impl DrawingSurface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_circle(&mut self, (x, y): ScreenPoint, radius: f64, color: &str) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(x, y, radius, 0.0, TAU);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, (x, y): ScreenPoint, radius: f64, color: &str, line_width: f64) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(x, y, radius, 0.0, TAU);
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke();
    }

    fn stroke_paths(&mut self, paths: &[Vec<ScreenPoint>], color: &str, line_width: f64, alpha: f64) {
        self.ctx.begin_path();
        for path in paths {
            let Some(((x0, y0), rest)) = path.split_first() else {
                continue;
            };
            self.ctx.move_to(*x0, *y0);
            for (x, y) in rest {
                self.ctx.line_to(*x, *y);
            }
        }
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.set_global_alpha(alpha);
        self.ctx.stroke();
        self.ctx.set_global_alpha(1.0);
    }
}

type SharedRenderer = Rc<RefCell<GlobeRenderer<CanvasSurface>>>;
type FrameLoop = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Everything the widget attaches to the page.
///
/// Dropping the host tears it down.
struct GlobeHost {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    renderer: SharedRenderer,
    alive: Rc<Cell<bool>>,
    frame_id: Rc<Cell<Option<i32>>>,
    frame_loop: FrameLoop,
    on_mousedown: Closure<dyn FnMut(MouseEvent)>,
    on_mousemove: Closure<dyn FnMut(MouseEvent)>,
    on_mouseup: Closure<dyn FnMut(MouseEvent)>,
    on_resize: Closure<dyn FnMut()>,
}

impl GlobeHost {
    /// Attach to a mounted canvas. `None` (nothing rendered) when the page
    /// offers no window, document or 2D context.
    fn mount(canvas: HtmlCanvasElement, size: (f64, f64), config: GlobeConfig) -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let Some(surface) = CanvasSurface::new(&canvas) else {
            tracing::debug!("Globe canvas has no 2D context; not rendering");
            return None;
        };

        let layout = match SurfaceLayout::resolve(viewport_request(&window, size)) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!("Globe not rendered: {}", e);
                return None;
            }
        };
        surface.apply_layout(&canvas, &layout);

        let mut renderer = GlobeRenderer::new(surface, layout, config);
        renderer.start();
        let renderer: SharedRenderer = Rc::new(RefCell::new(renderer));

        let alive = Rc::new(Cell::new(true));
        let frame_id = Rc::new(Cell::new(None));
        let frame_loop: FrameLoop = Rc::new(RefCell::new(None));

        *frame_loop.borrow_mut() = Some({
            let renderer = renderer.clone();
            let alive = alive.clone();
            let frame_id = frame_id.clone();
            let frame_loop = frame_loop.clone();
            let window = window.clone();
            Closure::wrap(Box::new(move |now: f64| {
                frame_id.set(None);
                if !alive.get() {
                    return;
                }
                renderer.borrow_mut().frame(now);
                if let Some(tick) = frame_loop.borrow().as_ref()
                    && let Ok(id) = window.request_animation_frame(tick.as_ref().unchecked_ref())
                {
                    frame_id.set(Some(id));
                }
            }) as Box<dyn FnMut(f64)>)
        });

        let on_mousedown = {
            let renderer = renderer.clone();
            Closure::wrap(Box::new(move |e: MouseEvent| {
                renderer.borrow_mut().pointer_down(client_point(&e));
            }) as Box<dyn FnMut(_)>)
        };
        let on_mousemove = {
            let renderer = renderer.clone();
            Closure::wrap(Box::new(move |e: MouseEvent| {
                renderer.borrow_mut().pointer_move(client_point(&e));
            }) as Box<dyn FnMut(_)>)
        };
        let on_mouseup = {
            let renderer = renderer.clone();
            let window = window.clone();
            Closure::wrap(Box::new(move |_e: MouseEvent| {
                renderer.borrow_mut().pointer_up(clock(&window));
            }) as Box<dyn FnMut(_)>)
        };
        let on_resize = {
            let renderer = renderer.clone();
            let window = window.clone();
            let canvas = canvas.clone();
            Closure::wrap(Box::new(move || {
                let Ok(layout) = SurfaceLayout::resolve(viewport_request(&window, size)) else {
                    return;
                };
                let mut renderer = renderer.borrow_mut();
                renderer.surface().apply_layout(&canvas, &layout);
                renderer.resize(layout);
            }) as Box<dyn FnMut()>)
        };

        let _ = canvas.add_event_listener_with_callback("mousedown", on_mousedown.as_ref().unchecked_ref());
        let _ = document.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        let _ = document.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
        let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());

        if let Some(tick) = frame_loop.borrow().as_ref()
            && let Ok(id) = window.request_animation_frame(tick.as_ref().unchecked_ref())
        {
            frame_id.set(Some(id));
        }

        tracing::info!(
            "Globe mounted at {}x{} (radius {:.0}, ratio {})",
            layout.width,
            layout.height,
            layout.radius,
            layout.pixel_ratio
        );

        Some(Self {
            window,
            document,
            canvas,
            renderer,
            alive,
            frame_id,
            frame_loop,
            on_mousedown,
            on_mousemove,
            on_mouseup,
            on_resize,
        })
    }

    /// Stop the renderer, cancel the pending frame and detach listeners.
    /// Safe to call more than once.
    fn teardown(&mut self) {
        if !self.alive.replace(false) {
            return;
        }

        if let Some(id) = self.frame_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        let tick = self.frame_loop.borrow_mut().take();
        drop(tick);

        let _ = self
            .canvas
            .remove_event_listener_with_callback("mousedown", self.on_mousedown.as_ref().unchecked_ref());
        let _ = self
            .document
            .remove_event_listener_with_callback("mousemove", self.on_mousemove.as_ref().unchecked_ref());
        let _ = self
            .document
            .remove_event_listener_with_callback("mouseup", self.on_mouseup.as_ref().unchecked_ref());
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref());

        if let Ok(mut renderer) = self.renderer.try_borrow_mut() {
            renderer.stop();
        }
        tracing::debug!("Globe torn down");
    }
}

impl Drop for GlobeHost {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn viewport_request(window: &Window, (width, height): (f64, f64)) -> ViewportRequest {
    let inner = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(f64::INFINITY)
    };

    ViewportRequest::new(width, height)
        .available(inner(window.inner_width()), inner(window.inner_height()))
        .pixel_ratio(window.device_pixel_ratio())
}

fn client_point(e: &MouseEvent) -> ScreenPoint {
    (f64::from(e.client_x()), f64::from(e.client_y()))
}

/// Same clock as the animation frame timestamps
fn clock(window: &Window) -> f64 {
    window.performance().map_or(0.0, |p| p.now())
}

/// Rotating dotted-land globe
#[component]
pub fn Globe(
    /// Requested logical width
    #[prop(default = 800.0)]
    width: f64,
    /// Requested logical height
    #[prop(default = 600.0)]
    height: f64,
    #[prop(optional)] config: Option<GlobeConfig>,
) -> impl IntoView {
    let canvas_ref = NodeRef::<Canvas>::new();
    let api = use_api_client();
    let host = StoredValue::new_local(None::<GlobeHost>);
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(None::<String>);
    let config = config.unwrap_or_default();

    Effect::new(move |_| {
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        if host.with_value(Option::is_some) {
            return;
        }
        let Some(mounted) = GlobeHost::mount(canvas, (width, height), config.clone()) else {
            set_loading.set(false);
            return;
        };

        let renderer = mounted.renderer.clone();
        let alive = mounted.alive.clone();
        host.set_value(Some(mounted));

        let Some(client) = api.get_value() else {
            set_loading.set(false);
            return;
        };
        wasm_bindgen_futures::spawn_local(load_land(client, renderer, alive, set_loading, set_error));
    });

    on_cleanup(move || {
        host.try_update_value(|slot| {
            if let Some(mut mounted) = slot.take() {
                mounted.teardown();
            }
        });
    });

    view! {
        <div class="globe">
            <Show when=move || error.get().is_some()>
                <div class="globe-error">
                    <p class="globe-error-title">"Error loading Earth visualization"</p>
                    <p class="globe-error-detail">{move || error.get().unwrap_or_default()}</p>
                </div>
            </Show>
            <div class="globe-frame" class:hidden=move || error.get().is_some()>
                <canvas node_ref=canvas_ref class="globe-canvas" class:hidden=move || loading.get()></canvas>
                <Show when=move || loading.get()>
                    <div class="globe-spinner"></div>
                </Show>
            </div>
            <p class="globe-caption">"Interactive Neural Globe"</p>
        </div>
    }
}

/// Fetch the land dots and hand them to the renderer, unless it was torn
/// down while the request was in flight
async fn load_land(
    client: ApiClient,
    renderer: SharedRenderer,
    alive: Rc<Cell<bool>>,
    set_loading: WriteSignal<bool>,
    set_error: WriteSignal<Option<String>>,
) {
    let result = client.load_land().await;
    if !alive.get() {
        tracing::debug!("Land data arrived after teardown; dropped");
        return;
    }

    match result {
        Ok(points) => {
            renderer.borrow_mut().load_points(points);
        }
        Err(e) => {
            renderer.borrow_mut().fail(e.to_string());
            set_error.set(Some(e.user_message()));
        }
    }
    set_loading.set(false);
}
