//! winit window event translation.

use glam::Vec2;
use graphscope_core::{MouseButton, OffscreenBuffer};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};

use crate::view::GraphView;

/// Pixels per scroll line for wheel events reported in lines.
const PIXELS_PER_LINE: f32 = 20.0;

/// Maps a winit mouse button.
#[must_use]
pub fn map_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(n) => MouseButton::Other(n),
    }
}

/// Converts a scroll delta to pixels.
#[must_use]
pub fn wheel_delta(delta: &MouseScrollDelta) -> Vec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y) * PIXELS_PER_LINE,
        #[allow(clippy::cast_possible_truncation)]
        MouseScrollDelta::PixelDelta(pos) => Vec2::new(pos.x as f32, pos.y as f32),
    }
}

impl<B: OffscreenBuffer + 'static> GraphView<B> {
    /// Feeds a window event to the view. Returns true if it was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(size) => {
                self.resize(size.width, size.height);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                #[allow(clippy::cast_possible_truncation)]
                self.mouse
                    .pointer_moved(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_button(*button);
                match state {
                    ElementState::Pressed => self.mouse.button_pressed(button),
                    ElementState::Released => self.mouse.button_released(button),
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse.wheel(wheel_delta(delta));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphscope_core::{CpuPickBuffer, PickingOptions};
    use winit::dpi::{PhysicalPosition, PhysicalSize};

    #[test]
    fn test_map_button() {
        assert_eq!(map_button(winit::event::MouseButton::Left), MouseButton::Left);
        assert_eq!(
            map_button(winit::event::MouseButton::Back),
            MouseButton::Other(3)
        );
        assert_eq!(
            map_button(winit::event::MouseButton::Other(9)),
            MouseButton::Other(9)
        );
    }

    #[test]
    fn test_wheel_delta() {
        assert_eq!(
            wheel_delta(&MouseScrollDelta::LineDelta(0.0, 1.0)),
            Vec2::new(0.0, 20.0)
        );
        assert_eq!(
            wheel_delta(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(3.0, -4.0))),
            Vec2::new(3.0, -4.0)
        );
    }

    #[test]
    fn test_resize_event() {
        let mut view = GraphView::new(CpuPickBuffer::new(4, 4), PickingOptions::default());
        assert!(view.handle_window_event(&WindowEvent::Resized(PhysicalSize::new(32, 16))));
        assert_eq!(view.picking().buffer().size(), (32, 16));
        assert!(!view.handle_window_event(&WindowEvent::Focused(true)));
    }
}
