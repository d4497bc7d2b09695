use glam::Vec2;

/// A high-level camera action produced from raw pointer input.
///
/// The scene consumes actions, never raw window events, so the camera logic
/// can be driven from tests and scripts as easily as from a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// A drag started; any return-to-rest motion is cancelled.
    BeginDrag,
    /// The pointer moved by this screen-space delta (pixels, y down) while dragging.
    Drag(Vec2),
    /// The drag ended; the camera starts easing back to its rest pose.
    EndDrag,
    /// Input that has no effect on the scene.
    Noop,
}

impl Action {
    pub fn is_noop(&self) -> bool {
        matches!(self, Action::Noop)
    }
}
