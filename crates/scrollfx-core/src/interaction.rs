use fnv::FnvHashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub hovered: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverChange {
    Entered,
    Left,
    Unchanged,
}

/// Shared hover/active flags keyed by element id. Layers read from here
/// instead of calling each other.
#[derive(Debug, Clone, Default)]
pub struct InteractionContext {
    states: FnvHashMap<String, InteractionState>,
}

impl InteractionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> InteractionState {
        self.states.get(id).copied().unwrap_or_default()
    }

    pub fn is_hovered(&self, id: &str) -> bool {
        self.get(id).hovered
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.get(id).active
    }

    pub fn set_hovered(&mut self, id: &str, hovered: bool) -> HoverChange {
        let entry = self.states.entry(id.to_string()).or_default();
        if entry.hovered == hovered {
            return HoverChange::Unchanged;
        }
        entry.hovered = hovered;
        if hovered {
            HoverChange::Entered
        } else {
            HoverChange::Left
        }
    }

    pub fn set_active(&mut self, id: &str, active: bool) {
        self.states.entry(id.to_string()).or_default().active = active;
    }

    /// Ids currently hovered.
    pub fn hovered(&self) -> impl Iterator<Item = &str> {
        self.states
            .iter()
            .filter(|(_, s)| s.hovered)
            .map(|(k, _)| k.as_str())
    }

    /// Drop every hover flag, e.g. when the pointer leaves the section.
    pub fn clear_hover(&mut self) -> Vec<String> {
        let mut left = Vec::new();
        for (id, s) in &mut self.states {
            if s.hovered {
                s.hovered = false;
                left.push(id.clone());
            }
        }
        left
    }
}
