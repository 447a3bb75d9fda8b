//! Derives `movestart`/`moveend` and `zoomstart`/`zoomend` from raw engine
//! move notifications.
//!
//! Engines report "a move started" and "a move ended" without telling whether
//! the center or the zoom actually changed. The tracker keeps one snapshot per
//! gesture edge and only emits the events whose value differs from it.

use crate::input::events::{PositionEvent, ViewState};

/// Gesture edge reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEdge {
    Start,
    End,
}

#[derive(Debug, Default)]
pub struct PositionTracker {
    start: Option<ViewState>,
    end: Option<ViewState>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds both snapshots, typically right after the native map is created
    pub fn reset(&mut self, view: ViewState) {
        self.start = Some(view);
        self.end = Some(view);
    }

    /// Compares `current` with the snapshot for `edge`, returns the events to
    /// emit (zoom first) and records `current` as the new snapshot.
    pub fn update(&mut self, edge: MoveEdge, current: ViewState) -> Vec<PositionEvent> {
        let slot = match edge {
            MoveEdge::Start => &mut self.start,
            MoveEdge::End => &mut self.end,
        };
        let mem = slot.unwrap_or_default();
        let mut events = Vec::new();

        if mem.zoom != current.zoom {
            events.push(match edge {
                MoveEdge::Start => PositionEvent::ZoomStart(current),
                MoveEdge::End => PositionEvent::ZoomEnd(current),
            });
        }

        let moved = match (mem.center, current.center) {
            (Some(a), Some(b)) => a.lng != b.lng || a.lat != b.lat,
            (None, None) => false,
            _ => true,
        };
        if moved {
            events.push(match edge {
                MoveEdge::Start => PositionEvent::MoveStart(current),
                MoveEdge::End => PositionEvent::MoveEnd(current),
            });
        }

        *slot = Some(current);
        events
    }
}
