use crate::route::RouteId;
use crate::store::RouteStore;

pub const HIGHLIGHT_WEIGHT: f64 = 8.0;
pub const HIGHLIGHT_OPACITY: f64 = 1.0;
pub const BASE_WEIGHT: f64 = 5.0;
pub const BASE_OPACITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    Idle,
    Active(RouteId),
}

/// Stroke parameters for a route polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emphasis {
    pub weight: f64,
    pub opacity: f64,
}

/// Hover emphasis for at most one route at a time.
#[derive(Debug, Default)]
pub struct HighlightController {
    state: Highlight,
}

impl HighlightController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_enter(&mut self, id: RouteId) {
        self.state = Highlight::Active(id);
    }

    /// Only leaving the active row clears the highlight; a late leave from a
    /// row that already lost it is ignored.
    pub fn pointer_leave(&mut self, id: RouteId) {
        if self.state == Highlight::Active(id) {
            self.state = Highlight::Idle;
        }
    }

    pub fn clear(&mut self) {
        self.state = Highlight::Idle;
    }

    pub fn state(&self) -> Highlight {
        self.state
    }

    /// The active id, provided it still names a loaded route.
    pub fn active_in(&self, store: &RouteStore) -> Option<RouteId> {
        match self.state {
            Highlight::Active(id) if store.contains(id) => Some(id),
            _ => None,
        }
    }
}

pub fn emphasis(id: RouteId, active: Option<RouteId>) -> Emphasis {
    if active == Some(id) {
        Emphasis {
            weight: HIGHLIGHT_WEIGHT,
            opacity: HIGHLIGHT_OPACITY,
        }
    } else {
        Emphasis {
            weight: BASE_WEIGHT,
            opacity: BASE_OPACITY,
        }
    }
}
