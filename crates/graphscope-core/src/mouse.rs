//! Pointer input normalization.
//!
//! The [`MouseHandler`] turns raw pointer updates into typed [`MouseEvent`]s.
//! Positions in events use the framebuffer convention: device pixels with
//! the origin at the bottom-left of the viewport, so they can be handed to
//! [`OffscreenBuffer::read_pixel`](crate::buffer::OffscreenBuffer::read_pixel)
//! directly.

use glam::Vec2;

use crate::events::{Event, EventEmitter, ListenerId};

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
    /// Any other button, by platform index.
    Other(u16),
}

impl MouseButton {
    /// Returns the conventional button index (0 = left, 1 = middle, 2 = right).
    #[must_use]
    pub fn index(self) -> u16 {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
            Self::Other(i) => i,
        }
    }

    /// Returns a human-readable button name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Middle => "middle",
            Self::Right => "right",
            Self::Other(_) => "other",
        }
    }
}

/// Snapshot of the pointer at the time an event was emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MouseState {
    /// Pointer position in device pixels, origin bottom-left.
    pub position: Vec2,
    /// Buttons currently held down.
    pub pressed: Vec<MouseButton>,
    /// Pointer travel since the last button press.
    pub drag_distance: f32,
}

impl MouseState {
    /// Returns true if `button` is held down.
    #[must_use]
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }
}

/// Kinds of normalized mouse events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// Pointer motion.
    Move,
    /// Button press.
    Down,
    /// Button release.
    Up,
    /// Press and release without a drag.
    Click,
    /// Wheel scroll.
    Wheel,
}

/// A normalized mouse event.
#[derive(Debug, Clone, PartialEq)]
pub enum MouseEvent {
    /// The pointer moved by `delta` to `position`.
    Move {
        state: MouseState,
        delta: Vec2,
        position: Vec2,
    },
    /// A button was pressed.
    Down { state: MouseState, button: MouseButton },
    /// A button was released.
    Up { state: MouseState, button: MouseButton },
    /// A button was pressed and released without dragging.
    Click { state: MouseState, button: MouseButton },
    /// The wheel was scrolled.
    Wheel { state: MouseState, delta: Vec2 },
}

impl MouseEvent {
    /// Returns the pointer snapshot carried by the event.
    #[must_use]
    pub fn state(&self) -> &MouseState {
        match self {
            Self::Move { state, .. }
            | Self::Down { state, .. }
            | Self::Up { state, .. }
            | Self::Click { state, .. }
            | Self::Wheel { state, .. } => state,
        }
    }
}

impl Event for MouseEvent {
    type Kind = MouseEventKind;

    fn kind(&self) -> MouseEventKind {
        match self {
            Self::Move { .. } => MouseEventKind::Move,
            Self::Down { .. } => MouseEventKind::Down,
            Self::Up { .. } => MouseEventKind::Up,
            Self::Click { .. } => MouseEventKind::Click,
            Self::Wheel { .. } => MouseEventKind::Wheel,
        }
    }
}

/// Tracks pointer state and emits [`MouseEvent`]s.
#[derive(Debug)]
pub struct MouseHandler {
    state: MouseState,
    viewport: (u32, u32),
    click_drag_threshold: f32,
    emitter: EventEmitter<MouseEvent>,
}

impl MouseHandler {
    /// Creates a handler. Drags longer than `click_drag_threshold` device
    /// pixels do not produce clicks.
    #[must_use]
    pub fn new(click_drag_threshold: f32) -> Self {
        Self {
            state: MouseState::default(),
            viewport: (0, 0),
            click_drag_threshold,
            emitter: EventEmitter::new(),
        }
    }

    /// Returns the current pointer state.
    #[must_use]
    pub fn state(&self) -> &MouseState {
        &self.state
    }

    /// Sets the viewport size in device pixels, used to flip window y.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    /// Subscribes to mouse events of `kind`.
    pub fn on(
        &mut self,
        kind: MouseEventKind,
        callback: impl FnMut(&MouseEvent) + 'static,
    ) -> ListenerId {
        self.emitter.on(kind, callback)
    }

    /// Unsubscribes a listener.
    pub fn off(&mut self, kind: MouseEventKind, id: ListenerId) -> bool {
        self.emitter.off(kind, id)
    }

    /// Returns the number of listeners for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: MouseEventKind) -> usize {
        self.emitter.listener_count(kind)
    }

    /// Records a pointer move to window coordinates (device pixels, origin
    /// top-left).
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let height = self.viewport.1 as f32;
        // Window row floor(y) is framebuffer row height - 1 - floor(y).
        // Rows outside the viewport stay out of range and read as no hit.
        let position = Vec2::new(x, height - 1.0 - y.floor());
        let delta = position - self.state.position;
        self.state.position = position;
        if !self.state.pressed.is_empty() {
            self.state.drag_distance += delta.x.abs() + delta.y.abs();
        }
        let event = MouseEvent::Move {
            state: self.state.clone(),
            delta,
            position,
        };
        self.emitter.emit(&event);
    }

    /// Records a button press.
    pub fn button_pressed(&mut self, button: MouseButton) {
        if !self.state.is_pressed(button) {
            self.state.pressed.push(button);
        }
        self.state.drag_distance = 0.0;
        let event = MouseEvent::Down {
            state: self.state.clone(),
            button,
        };
        self.emitter.emit(&event);
    }

    /// Records a button release, emitting `Click` when the pointer did not
    /// drag while the button was held.
    pub fn button_released(&mut self, button: MouseButton) {
        let was_pressed = self.state.is_pressed(button);
        self.state.pressed.retain(|b| *b != button);

        let up = MouseEvent::Up {
            state: self.state.clone(),
            button,
        };
        self.emitter.emit(&up);

        if was_pressed && self.state.drag_distance <= self.click_drag_threshold {
            let click = MouseEvent::Click {
                state: self.state.clone(),
                button,
            };
            self.emitter.emit(&click);
        }
    }

    /// Records a wheel scroll.
    pub fn wheel(&mut self, delta: Vec2) {
        let event = MouseEvent::Wheel {
            state: self.state.clone(),
            delta,
        };
        self.emitter.emit(&event);
    }
}
