//! Platform-independent input events the scene reacts to.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// A typed character.
    Char(char),
    /// Pointer position in window pixels.
    PointerMoved { x: f32, y: f32, left_down: bool },
    /// Wheel steps; positive zooms in.
    Scroll { dy: f32 },
    Resize { width: u32, height: u32 },
    Quit,
}
