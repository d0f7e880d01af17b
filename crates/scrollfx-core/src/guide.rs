/// Ordered hover-to-reveal walkthrough.
///
/// `step_index` starts at -1 (only the entry point, index -1, is revealed)
/// and climbs by one each time the element carrying the current index is
/// hovered. Reaching `total_steps` is the finale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideState {
    step_index: i32,
    total_steps: i32,
    finale_fired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideEvent {
    Advanced { from: i32, to: i32 },
    /// The last step was taken; run the finale once.
    FinaleStarted { from: i32 },
    /// Wrong element for the current step.
    Ignored,
    AlreadyComplete,
}

impl GuideState {
    pub fn new(total_steps: u32) -> Self {
        Self {
            step_index: -1,
            total_steps: total_steps.min(i32::MAX as u32) as i32,
            finale_fired: false,
        }
    }

    pub fn step_index(&self) -> i32 {
        self.step_index
    }

    pub fn total_steps(&self) -> i32 {
        self.total_steps
    }

    pub fn is_complete(&self) -> bool {
        self.step_index >= self.total_steps
    }

    pub fn finale_fired(&self) -> bool {
        self.finale_fired
    }

    /// Whether an element unlocked at `guide_index` is visible.
    pub fn is_revealed(&self, guide_index: i32) -> bool {
        guide_index <= self.step_index
    }

    pub fn hover(&mut self, index: i32) -> GuideEvent {
        if self.is_complete() {
            return GuideEvent::AlreadyComplete;
        }
        if index != self.step_index {
            return GuideEvent::Ignored;
        }
        let from = self.step_index;
        self.step_index += 1;
        log::debug!("guide advanced {from} -> {}", self.step_index);
        if self.step_index == self.total_steps {
            self.finale_fired = true;
            GuideEvent::FinaleStarted { from }
        } else {
            GuideEvent::Advanced {
                from,
                to: self.step_index,
            }
        }
    }

    /// Jump straight to the finale. Idempotent.
    pub fn trigger_finale(&mut self) -> bool {
        if self.finale_fired {
            return false;
        }
        self.step_index = self.total_steps;
        self.finale_fired = true;
        true
    }

    /// Back to the start. Only ever called explicitly by the host.
    pub fn reset(&mut self) {
        self.step_index = -1;
        self.finale_fired = false;
    }
}
