#![cfg(target_arch = "wasm32")]
//! Browser front-end: mounts a scene description onto live DOM elements, drives
//! it from requestAnimationFrame and draws it with WebGPU (shader effects) and
//! Canvas2D (cables, nodes, particles).

mod canvas2d;
mod constants;
mod dom;
mod events;
mod frame;
mod hit;
mod paint;
mod render;

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use instant::Instant;
use scrollfx_core::effects::EffectKind;
use scrollfx_core::graph::CableId;
use scrollfx_core::scene::{FrameReport, Scene, SceneInput};
use scrollfx_core::SceneDesc;
use wasm_bindgen::prelude::*;
use web_sys as web;

use canvas2d::Overlay;
use constants::{CABLE_HIT_TOLERANCE_PX, NODE_HIT_SLOP_PX, PARTICLE_COLOR};
use dom::{apply_pose, canvas_by_id, sync_canvas_backing_size, window_document, DomMeasure};
use events::ListenerSet;
use frame::FrameLoop;
use hit::{client_to_surface, hover_transition, pick_disc, pick_polyline, HitDisc};
use render::GpuState;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("scrollfx-web loaded");
    Ok(())
}

/// Everything one mounted section owns. Shared between the frame loop and
/// the DOM listeners; never touched by another section.
pub(crate) struct Section {
    pub(crate) scene: Scene,
    pub(crate) pointer: Option<Vec2>,
    measure: DomMeasure,
    gpu: Option<GpuState>,
    effects_canvas: Option<web::HtmlCanvasElement>,
    overlay: Option<Overlay>,
    graph_hover: Option<String>,
    last_instant: Instant,
}

impl Section {
    /// One animation frame. Returns false once the section is torn down.
    pub(crate) fn frame(&mut self) -> bool {
        if !self.scene.is_alive() {
            return false;
        }
        let now = Instant::now();
        let dt = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;

        self.update_graph_hover();
        let report = self.scene.frame(dt, &self.measure);
        log_report(&report);

        let document = self.measure.document();
        for slot in self.scene.spinners() {
            apply_pose(document, &slot.id, slot.pose);
        }

        if let Some(overlay) = self.overlay.as_mut() {
            if overlay.begin() {
                overlay.draw_graph(self.scene.graph());
                overlay.draw_particles(self.scene.particles(), Vec3::from_array(PARTICLE_COLOR));
            }
        }

        if let (Some(gpu), Some(canvas)) = (self.gpu.as_mut(), self.effects_canvas.as_ref()) {
            let ((w, h), _) = sync_canvas_backing_size(canvas);
            gpu.resize_if_needed(w, h);
            let uniforms = self.scene.effect_uniforms(gpu.resolution());
            match gpu.render(&uniforms) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::debug!("surface lost; reconfiguring next frame");
                }
                Err(e) => log::error!("render error: {:?}", e),
            }
        }
        report.alive
    }

    /// Canvas hit-test for nodes and cables, turned into hover edges.
    fn update_graph_hover(&mut self) {
        let Some(overlay) = self.overlay.as_ref() else {
            return;
        };
        let rect = overlay.canvas().get_bounding_client_rect();
        let origin = Vec2::new(rect.left() as f32, rect.top() as f32);
        let size = Vec2::new(rect.width() as f32, rect.height() as f32);
        let next = self
            .pointer
            .and_then(|p| client_to_surface(p, origin, size))
            .and_then(|p| self.pick_graph(p));
        let (left, entered) = hover_transition(self.graph_hover.as_deref(), next.as_deref());
        let left = left.map(str::to_owned);
        let entered = entered.map(str::to_owned);
        if let Some(id) = left {
            self.scene.set_hover(id, false);
        }
        if let Some(id) = entered {
            self.scene.set_hover(id, true);
        }
        self.graph_hover = next;
    }

    fn pick_graph(&self, p: Vec2) -> Option<String> {
        let graph = self.scene.graph();
        let discs: Vec<HitDisc> = graph
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.revealed)
            .filter_map(|(i, n)| {
                n.projected().map(|center| HitDisc {
                    index: i,
                    center,
                    radius: n.radius,
                })
            })
            .collect();
        if let Some(i) = pick_disc(&discs, p, NODE_HIT_SLOP_PX) {
            return graph.nodes().get(i).map(|n| n.name.clone());
        }
        let lines = graph
            .cables()
            .iter()
            .enumerate()
            .filter(|(i, _)| graph.cable_visible(CableId(*i)))
            .filter_map(|(i, c)| c.geometry().map(|g| (i, g.points.as_slice())));
        pick_polyline(lines, p, CABLE_HIT_TOLERANCE_PX)
            .and_then(|i| graph.cables().get(i))
            .map(|c| c.name.clone())
    }

    fn teardown(&mut self) {
        self.scene.teardown();
        if let Some(mut gpu) = self.gpu.take() {
            gpu.destroy();
        }
        if let Some(overlay) = self.overlay.take() {
            overlay.clear();
        }
        self.effects_canvas = None;
        self.pointer = None;
    }
}

fn log_report(report: &FrameReport) {
    for (what, reason) in &report.skipped {
        log::trace!("skipped {what}: {reason}");
    }
    if !report.fired.is_empty() {
        log::debug!("fired {:?}", report.fired);
    }
    for ev in &report.guide_events {
        log::debug!("guide {:?}", ev);
    }
}

/// Handle returned to the host page. Dropping it without `teardown` still
/// detaches listeners and stops the loop.
#[wasm_bindgen]
pub struct SectionHandle {
    section: Rc<RefCell<Section>>,
    frame_loop: FrameLoop,
    listeners: ListenerSet,
}

#[wasm_bindgen]
impl SectionHandle {
    fn push(&self, input: SceneInput) {
        match self.section.try_borrow_mut() {
            Ok(mut s) => s.scene.push_input(input),
            Err(_) => log::warn!("section busy; input dropped"),
        }
    }

    /// Stop the frame loop, detach every listener and release GPU resources.
    pub fn teardown(&mut self) {
        self.frame_loop.cancel();
        self.listeners.clear();
        match self.section.try_borrow_mut() {
            Ok(mut s) => s.teardown(),
            Err(_) => log::warn!("teardown while section busy"),
        }
        log::info!("section torn down");
    }

    /// Rewind the guided walkthrough (e.g. when a modal closes).
    #[wasm_bindgen(js_name = resetGuide)]
    pub fn reset_guide(&self) {
        self.push(SceneInput::ResetGuide);
    }

    #[wasm_bindgen(js_name = setHover)]
    pub fn set_hover(&self, id: String, hovered: bool) {
        self.push(SceneInput::Hover { id, hovered });
    }

    pub fn fire(&self, component: String) {
        self.push(SceneInput::Fire { component });
    }

    /// Feed an external boolean; only false -> true fires.
    #[wasm_bindgen(js_name = setTrigger)]
    pub fn set_trigger(&self, component: String, value: bool) {
        self.push(SceneInput::Trigger { component, value });
    }

    #[wasm_bindgen(js_name = triggerFinale)]
    pub fn trigger_finale(&self) {
        self.push(SceneInput::Finale);
    }

    /// Last applied scroll progress, if the timeline has been evaluated.
    pub fn progress(&self) -> Option<f32> {
        self.section
            .try_borrow()
            .ok()
            .and_then(|s| s.scene.director().and_then(|d| d.progress()))
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }
}

/// Mount a section described by `scene_json`. `effects_canvas_id` hosts the
/// WebGPU shader layer, `overlay_canvas_id` the Canvas2D cables/particles.
#[wasm_bindgen(js_name = mountSection)]
pub async fn mount_section(
    scene_json: String,
    effects_canvas_id: Option<String>,
    overlay_canvas_id: Option<String>,
) -> Result<SectionHandle, JsValue> {
    mount(&scene_json, effects_canvas_id, overlay_canvas_id)
        .await
        .map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

async fn mount(
    scene_json: &str,
    effects_canvas_id: Option<String>,
    overlay_canvas_id: Option<String>,
) -> anyhow::Result<SectionHandle> {
    let (window, document) =
        window_document().ok_or_else(|| anyhow::anyhow!("no window/document"))?;
    let desc = SceneDesc::from_json(scene_json)?;
    let mut scene = Scene::from_desc(&desc)?;
    if desc.surface_id.is_none() {
        scene.set_surface_id(overlay_canvas_id.clone());
    }

    let overlay = match &overlay_canvas_id {
        Some(id) => Some(Overlay::new(canvas_by_id(&document, id)?)?),
        None => None,
    };

    let (gpu, effects_canvas) = match &effects_canvas_id {
        Some(id) if !desc.effects.is_empty() => {
            let canvas = canvas_by_id(&document, id)?;
            sync_canvas_backing_size(&canvas);
            let kinds: Vec<EffectKind> = desc.effects.iter().map(|e| e.kind).collect();
            match GpuState::new(&canvas, &kinds).await {
                Ok(g) => (Some(g), Some(canvas)),
                Err(e) => {
                    // Sections still scroll and draw their overlay without WebGPU.
                    log::error!("WebGPU init error: {:?}", e);
                    (None, None)
                }
            }
        }
        _ => (None, None),
    };

    let mut hover_ids: Vec<String> = Vec::new();
    let dom_hover = scene
        .effects()
        .iter()
        .map(|s| &s.hover_id)
        .chain(scene.spinners().iter().map(|s| &s.hover_id));
    for id in dom_hover {
        let drawn_on_canvas =
            scene.graph().node_id(id).is_some() || scene.graph().cable_id(id).is_some();
        if !drawn_on_canvas && !hover_ids.contains(id) {
            hover_ids.push(id.clone());
        }
    }

    let section = Rc::new(RefCell::new(Section {
        scene,
        pointer: None,
        measure: DomMeasure::new(window.clone(), document.clone()),
        gpu,
        effects_canvas,
        overlay,
        graph_hover: None,
        last_instant: Instant::now(),
    }));

    let mut listeners = ListenerSet::default();
    events::wire_layout(&mut listeners, &window, &section)?;
    events::wire_hover_regions(&mut listeners, &document, &section, &hover_ids)?;
    if overlay_canvas_id.is_some() {
        events::wire_pointer(&mut listeners, &window, &section)?;
    }
    let frame_loop = frame::start_loop(section.clone());
    log::info!(
        "section mounted: {} listeners, shader layer {}",
        listeners.len(),
        if section.borrow().gpu.is_some() { "on" } else { "off" }
    );

    Ok(SectionHandle {
        section,
        frame_loop,
        listeners,
    })
}
