use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::Section;

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// requestAnimationFrame loop for one section. Stops by itself once the
/// scene is torn down, or immediately on `cancel`.
pub struct FrameLoop {
    tick: Tick,
    handle: Rc<Cell<Option<i32>>>,
}

fn request(tick: &Tick) -> Option<i32> {
    let w = web::window()?;
    let tick = tick.borrow();
    let closure = tick.as_ref()?;
    w.request_animation_frame(closure.as_ref().unchecked_ref()).ok()
}

pub fn start_loop(section: Rc<RefCell<Section>>) -> FrameLoop {
    let tick: Tick = Rc::new(RefCell::new(None));
    let handle = Rc::new(Cell::new(None));
    let tick_clone = tick.clone();
    let handle_clone = handle.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        handle_clone.set(None);
        let alive = match section.try_borrow_mut() {
            Ok(mut s) => s.frame(),
            // Re-entered from a listener; try again next frame.
            Err(_) => true,
        };
        if alive {
            handle_clone.set(request(&tick_clone));
        } else {
            log::debug!("frame loop stopped");
        }
    }) as Box<dyn FnMut()>));
    handle.set(request(&tick));
    FrameLoop { tick, handle }
}

impl FrameLoop {
    pub fn cancel(&self) {
        if let (Some(h), Some(w)) = (self.handle.take(), web::window()) {
            let _ = w.cancel_animation_frame(h);
        }
        // Dropping the closure breaks its self-reference.
        self.tick.borrow_mut().take();
    }

    pub fn is_running(&self) -> bool {
        self.tick.borrow().is_some()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}
