use crate::constants::BLAST_DURATION;

/// One-shot decaying pulse. `life` runs from 1 down to 0 over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blast {
    life: f32,
    duration: f32,
}

impl Blast {
    pub fn new(duration: f32) -> Self {
        Self {
            life: 0.0,
            duration: if duration.is_finite() && duration > 0.0 {
                duration
            } else {
                BLAST_DURATION
            },
        }
    }

    /// Start the pulse. Ignored (returns false) while one is still decaying.
    pub fn fire(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.life = 1.0;
        true
    }

    pub fn tick(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 && self.life > 0.0 {
            self.life = (self.life - dt / self.duration).max(0.0);
        }
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    pub fn is_active(&self) -> bool {
        self.life > 0.0
    }

    pub fn clear(&mut self) {
        self.life = 0.0;
    }
}

impl Default for Blast {
    fn default() -> Self {
        Self::new(BLAST_DURATION)
    }
}

/// Turns a sampled boolean into discrete fire events: true only on the
/// false -> true transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RisingEdge {
    prev: bool,
}

impl RisingEdge {
    pub fn new(initial: bool) -> Self {
        Self { prev: initial }
    }

    pub fn update(&mut self, value: bool) -> bool {
        let fired = value && !self.prev;
        self.prev = value;
        fired
    }

    pub fn value(&self) -> bool {
        self.prev
    }
}
