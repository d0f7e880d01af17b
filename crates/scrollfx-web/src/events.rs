use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::Section;

struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

/// Every DOM listener one section registered, so teardown can detach them all.
#[derive(Default)]
pub struct ListenerSet {
    entries: Vec<Listener>,
}

impl ListenerSet {
    pub fn add(
        &mut self,
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> anyhow::Result<()> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("addEventListener({kind}) failed: {e:?}"))?;
        self.entries.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        for l in self.entries.drain(..) {
            let _ = l
                .target
                .remove_event_listener_with_callback(l.kind, l.closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for ListenerSet {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Scroll and resize only mark the timeline dirty; the next frame measures.
pub fn wire_layout(
    listeners: &mut ListenerSet,
    window: &web::Window,
    section: &Rc<RefCell<Section>>,
) -> anyhow::Result<()> {
    for kind in ["scroll", "resize"] {
        let s = section.clone();
        listeners.add(window, kind, move |_ev| {
            if let Ok(mut s) = s.try_borrow_mut() {
                s.scene.request_evaluation();
            }
        })?;
    }
    Ok(())
}

/// Pointer enter/leave on each DOM element that engages an effect or spinner.
/// Absent elements are logged and skipped.
pub fn wire_hover_regions(
    listeners: &mut ListenerSet,
    document: &web::Document,
    section: &Rc<RefCell<Section>>,
    ids: &[String],
) -> anyhow::Result<()> {
    for id in ids {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("hover region #{id} not found; hover disabled for it");
            continue;
        };
        for (kind, hovered) in [("pointerenter", true), ("pointerleave", false)] {
            let s = section.clone();
            let id = id.clone();
            listeners.add(&el, kind, move |_ev| {
                if let Ok(mut s) = s.try_borrow_mut() {
                    s.scene.set_hover(id.clone(), hovered);
                }
            })?;
        }
    }
    Ok(())
}

/// Track the pointer in client space for overlay hit-testing in the frame.
pub fn wire_pointer(
    listeners: &mut ListenerSet,
    window: &web::Window,
    section: &Rc<RefCell<Section>>,
) -> anyhow::Result<()> {
    let s = section.clone();
    listeners.add(window, "pointermove", move |ev| {
        let Some(ev) = ev.dyn_ref::<web::MouseEvent>() else {
            return;
        };
        if let Ok(mut s) = s.try_borrow_mut() {
            s.pointer = Some(Vec2::new(ev.client_x() as f32, ev.client_y() as f32));
        }
    })?;
    let s = section.clone();
    let root = window
        .document()
        .and_then(|d| d.document_element())
        .ok_or_else(|| anyhow::anyhow!("no document element"))?;
    listeners.add(&root, "pointerleave", move |_ev| {
        if let Ok(mut s) = s.try_borrow_mut() {
            s.pointer = None;
        }
    })?;
    Ok(())
}
