use glam::Vec2;

use crate::action::Action;

/// Raw pointer input in window coordinates (pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
}

/// Turns raw pointer events into drag [`Action`]s.
///
/// Tracks whether a drag is in progress and where the pointer was last seen,
/// so each move yields the delta since the previous event.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    dragging: bool,
    origin: Vec2,
    last: Vec2,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Where the current (or most recent) drag started.
    pub fn drag_origin(&self) -> Vec2 {
        self.origin
    }

    pub fn handle(&mut self, event: PointerEvent) -> Action {
        match event {
            PointerEvent::Down(at) => {
                self.dragging = true;
                self.origin = at;
                self.last = at;
                tracing::debug!(x = at.x, y = at.y, "drag start");
                Action::BeginDrag
            }
            PointerEvent::Move(at) => {
                if !self.dragging {
                    return Action::Noop;
                }
                let delta = at - self.last;
                self.last = at;
                tracing::trace!(dx = delta.x, dy = delta.y, "drag move");
                Action::Drag(delta)
            }
            PointerEvent::Up => {
                if !self.dragging {
                    return Action::Noop;
                }
                self.dragging = false;
                tracing::debug!("drag end");
                Action::EndDrag
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_without_press_is_noop() {
        let mut t = PointerTracker::new();
        assert_eq!(t.handle(PointerEvent::Move(Vec2::new(10.0, 10.0))), Action::Noop);
        assert!(!t.is_dragging());
    }

    #[test]
    fn drag_sequence_reports_incremental_deltas() {
        let mut t = PointerTracker::new();
        assert_eq!(
            t.handle(PointerEvent::Down(Vec2::new(100.0, 50.0))),
            Action::BeginDrag
        );
        assert!(t.is_dragging());
        assert_eq!(t.drag_origin(), Vec2::new(100.0, 50.0));

        assert_eq!(
            t.handle(PointerEvent::Move(Vec2::new(110.0, 45.0))),
            Action::Drag(Vec2::new(10.0, -5.0))
        );
        assert_eq!(
            t.handle(PointerEvent::Move(Vec2::new(115.0, 45.0))),
            Action::Drag(Vec2::new(5.0, 0.0))
        );
        assert_eq!(t.handle(PointerEvent::Up), Action::EndDrag);
        assert!(!t.is_dragging());

        // Moves after release no longer drag.
        assert_eq!(t.handle(PointerEvent::Move(Vec2::new(0.0, 0.0))), Action::Noop);
    }

    #[test]
    fn release_without_press_is_noop() {
        let mut t = PointerTracker::new();
        assert_eq!(t.handle(PointerEvent::Up), Action::Noop);
    }

    #[test]
    fn new_press_resets_origin() {
        let mut t = PointerTracker::new();
        t.handle(PointerEvent::Down(Vec2::new(1.0, 1.0)));
        t.handle(PointerEvent::Up);
        t.handle(PointerEvent::Down(Vec2::new(50.0, 60.0)));
        assert_eq!(
            t.handle(PointerEvent::Move(Vec2::new(52.0, 60.0))),
            Action::Drag(Vec2::new(2.0, 0.0))
        );
        assert_eq!(t.drag_origin(), Vec2::new(50.0, 60.0));
    }
}
