use std::{cell::RefCell, rc::Rc};

use glam::Vec2;
use gloo::render::{request_animation_frame, AnimationFrame};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use yew::prelude::*;

use crate::browser::device_pixel_ratio;
use crate::scene::{start_scene, LiveScene, SceneConfig, SceneError, SurfaceProvider};

const MAX_PIXEL_RATIO: f64 = 2.0;
const LINE_WIDTH: f64 = 1.0;

/// Latest values from the page, read once at the start of each frame.
#[derive(Clone, Copy, Default)]
struct FrameInputs {
    scroll_offset: f64,
    pointer: Vec2,
}

/// The mounted canvas, if any, as a source of 2D drawing surfaces.
struct CanvasProvider(Option<HtmlCanvasElement>);

struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl SurfaceProvider for CanvasProvider {
    type Surface = CanvasSurface;

    fn acquire(self) -> Result<CanvasSurface, SceneError> {
        let canvas = self.0.ok_or(SceneError::MissingCanvas)?;
        let context = canvas
            .get_context("2d")
            .map_err(|error| SceneError::ContextRejected(format!("{error:?}")))?
            .ok_or(SceneError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SceneError::ContextUnavailable)?;

        Ok(CanvasSurface { canvas, context })
    }
}

struct Renderer {
    scene: LiveScene<CanvasSurface>,
    inputs: Rc<RefCell<FrameInputs>>,
}

impl Renderer {
    /// Matches the backing store to the CSS box; returns the CSS size.
    fn fit_to_box(&self) -> Vec2 {
        let CanvasSurface { canvas, context } = &self.scene.surface;
        let ratio = device_pixel_ratio().clamp(1.0, MAX_PIXEL_RATIO);
        let width = f64::from(canvas.client_width());
        let height = f64::from(canvas.client_height());
        let backing_width = (width * ratio) as u32;
        let backing_height = (height * ratio) as u32;

        if canvas.width() != backing_width || canvas.height() != backing_height {
            canvas.set_width(backing_width);
            canvas.set_height(backing_height);
        }
        let _ = context.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0);

        Vec2::new(width as f32, height as f32)
    }

    fn draw(&mut self) {
        let inputs = *self.inputs.borrow();
        let viewport = self.fit_to_box();
        let LiveScene { composer, surface } = &mut self.scene;
        let frame = composer.advance(inputs.scroll_offset);
        let context = &surface.context;

        context.clear_rect(0.0, 0.0, f64::from(viewport.x), f64::from(viewport.y));
        context.set_line_width(LINE_WIDTH);

        for stroke in composer.strokes(&frame, viewport, inputs.pointer) {
            context.set_global_alpha(f64::from(stroke.alpha));
            context.set_stroke_style_str(stroke.color);
            context.begin_path();
            for [from, to] in &stroke.segments {
                context.move_to(f64::from(from.x), f64::from(from.y));
                context.line_to(f64::from(to.x), f64::from(to.y));
            }
            context.stroke();
        }
    }
}

/// Owns the pending animation-frame request; dropping it stops the loop.
struct RenderLoop {
    pending: Rc<RefCell<Option<AnimationFrame>>>,
}

impl RenderLoop {
    fn start(renderer: Renderer) -> Self {
        let pending = Rc::new(RefCell::new(None));
        schedule(Rc::new(RefCell::new(renderer)), Rc::clone(&pending));
        Self { pending }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.pending.borrow_mut().take();
    }
}

fn schedule(renderer: Rc<RefCell<Renderer>>, pending: Rc<RefCell<Option<AnimationFrame>>>) {
    let slot = Rc::clone(&pending);
    let handle = request_animation_frame(move |_timestamp| {
        slot.borrow_mut().take();
        renderer.borrow_mut().draw();
        schedule(renderer, slot);
    });
    *pending.borrow_mut() = Some(handle);
}

#[derive(Properties, PartialEq)]
pub struct SceneCanvasProps {
    pub config: &'static SceneConfig,
    pub scroll_offset: f64,
    #[prop_or_default]
    pub pointer: Vec2,
}

/// Decorative backdrop. A scene whose graphics context cannot be acquired
/// renders nothing from then on.
#[function_component(SceneCanvas)]
pub fn scene_canvas(props: &SceneCanvasProps) -> Html {
    let canvas_ref = use_node_ref();
    let inputs = use_mut_ref(FrameInputs::default);
    let disabled = use_state(|| false);

    {
        let mut current = inputs.borrow_mut();
        current.scroll_offset = props.scroll_offset;
        current.pointer = props.pointer;
    }

    {
        let canvas_ref = canvas_ref.clone();
        let inputs = inputs.clone();
        let disabled = disabled.clone();
        let config = props.config;
        use_effect_with((), move |_| {
            let provider = CanvasProvider(canvas_ref.cast::<HtmlCanvasElement>());
            let running = start_scene(config, provider)
                .map(|scene| RenderLoop::start(Renderer { scene, inputs }));
            if running.is_none() {
                disabled.set(true);
            }

            move || drop(running)
        });
    }

    if *disabled {
        return html! {};
    }

    html! {
        <canvas ref={canvas_ref} class="scene-canvas" aria-hidden="true" />
    }
}
