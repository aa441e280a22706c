//! Picking manager: pointer events in, element hover/click events out.
//!
//! The manager owns the id allocator and the pick buffer of one viewport.
//! While enabled it listens to a [`MouseHandler`]; on every pointer move it
//! reads the pick buffer under the pointer and emits `HoverOff` / `HoverOn`
//! when the element under the pointer changes, and on every click over an
//! element it emits `Click`.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use glam::Vec2;

use crate::allocator::{IndexAllocator, PickingColors};
use crate::buffer::OffscreenBuffer;
use crate::error::Result;
use crate::events::{EventEmitter, ListenerId, PickEvent, PickEventKind};
use crate::mouse::{MouseEvent, MouseEventKind, MouseHandler};
use crate::options::PickingOptions;
use crate::pick::{color_id_to_index, decode_color_id, NO_HIT};

struct PickingState<B> {
    allocator: IndexAllocator,
    buffer: B,
    emitter: EventEmitter<PickEvent>,
    /// Raw color id under the pointer at the last move (0 = nothing).
    hover_color_id: u32,
    hover_enabled: bool,
}

impl<B: OffscreenBuffer> PickingState<B> {
    fn color_id_at(&self, position: Vec2) -> u32 {
        if !(position.x >= 0.0 && position.y >= 0.0) {
            return NO_HIT;
        }
        // Truncation picks the pixel containing the position.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (x, y) = (position.x as u32, position.y as u32);
        decode_color_id(self.buffer.read_pixel(x, y))
    }

    fn set_hover(&mut self, color_id: u32) {
        if color_id == self.hover_color_id {
            return;
        }
        let previous = std::mem::replace(&mut self.hover_color_id, color_id);
        if let Some(id) = color_id_to_index(previous) {
            log::trace!("hover off {id}");
            self.emitter.emit(&PickEvent::HoverOff(id));
        }
        if let Some(id) = color_id_to_index(color_id) {
            log::trace!("hover on {id}");
            self.emitter.emit(&PickEvent::HoverOn(id));
        }
    }

    fn on_move(&mut self, position: Vec2) {
        if !self.hover_enabled {
            return;
        }
        let color_id = self.color_id_at(position);
        self.set_hover(color_id);
    }

    fn on_click(&mut self, position: Vec2) {
        if let Some(id) = color_id_to_index(self.color_id_at(position)) {
            log::trace!("click {id}");
            self.emitter.emit(&PickEvent::Click(id));
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Subscription {
    on_move: ListenerId,
    on_click: ListenerId,
}

/// Bridges pointer input to per-element pick events for one viewport.
///
/// Pick event listeners run while the manager is mid-dispatch, so they must
/// not call back into the manager that emitted the event.
pub struct PickingManager<B: OffscreenBuffer> {
    state: Rc<RefCell<PickingState<B>>>,
    subscription: Option<Subscription>,
}

impl<B: OffscreenBuffer + 'static> PickingManager<B> {
    /// Creates a disabled manager that owns `buffer`.
    pub fn new(buffer: B, options: &PickingOptions) -> Self {
        let state = PickingState {
            allocator: IndexAllocator::with_id_space_end(options.id_space_end),
            buffer,
            emitter: EventEmitter::new(),
            hover_color_id: NO_HIT,
            hover_enabled: options.hover,
        };
        Self {
            state: Rc::new(RefCell::new(state)),
            subscription: None,
        }
    }

    /// Allocates pick ids and colors for `count` elements.
    pub fn allocate_picking_colors(&mut self, count: usize) -> Result<PickingColors> {
        self.state.borrow_mut().allocator.allocate(count)
    }

    /// Returns the ids of `allocation` to the allocator and clears it.
    ///
    /// If the hovered element is among the released ids, the hover is
    /// forgotten without a `HoverOff`, so a later owner of the same id gets
    /// a fresh `HoverOn`.
    pub fn deallocate_picking_colors(&mut self, allocation: &mut PickingColors) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let releases_hovered = color_id_to_index(state.hover_color_id)
            .is_some_and(|id| allocation.index_of(id).is_some());
        state.allocator.deallocate(allocation)?;
        if releases_hovered {
            state.hover_color_id = NO_HIT;
        }
        Ok(())
    }

    /// Returns the number of free pick ids.
    #[must_use]
    pub fn free_capacity(&self) -> u64 {
        self.state.borrow().allocator.free_capacity()
    }

    /// Subscribes to pick events of `kind`.
    pub fn on(
        &mut self,
        kind: PickEventKind,
        callback: impl FnMut(&PickEvent) + 'static,
    ) -> ListenerId {
        self.state.borrow_mut().emitter.on(kind, callback)
    }

    /// Unsubscribes a pick event listener.
    pub fn off(&mut self, kind: PickEventKind, id: ListenerId) -> bool {
        self.state.borrow_mut().emitter.off(kind, id)
    }

    /// Returns the number of listeners subscribed to `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: PickEventKind) -> usize {
        self.state.borrow().emitter.listener_count(kind)
    }

    /// Returns whether the manager is listening to pointer input.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.subscription.is_some()
    }

    /// Starts listening to `mouse` move and click events. Enabling an
    /// already enabled manager does nothing.
    pub fn enable(&mut self, mouse: &mut MouseHandler) {
        if self.subscription.is_some() {
            return;
        }

        let weak: Weak<RefCell<PickingState<B>>> = Rc::downgrade(&self.state);
        let on_move = mouse.on(MouseEventKind::Move, move |event| {
            if let (MouseEvent::Move { position, .. }, Some(state)) = (event, weak.upgrade()) {
                state.borrow_mut().on_move(*position);
            }
        });

        let weak = Rc::downgrade(&self.state);
        let on_click = mouse.on(MouseEventKind::Click, move |event| {
            if let (MouseEvent::Click { state: pointer, .. }, Some(state)) =
                (event, weak.upgrade())
            {
                state.borrow_mut().on_click(pointer.position);
            }
        });

        self.subscription = Some(Subscription { on_move, on_click });
        log::debug!("picking enabled");
    }

    /// Stops listening to `mouse`. If an element is hovered, a final
    /// `HoverOff` is emitted for it. Disabling twice does nothing.
    ///
    /// `mouse` must be the handler passed to [`enable`](Self::enable).
    pub fn disable(&mut self, mouse: &mut MouseHandler) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        mouse.off(MouseEventKind::Move, subscription.on_move);
        mouse.off(MouseEventKind::Click, subscription.on_click);
        self.state.borrow_mut().set_hover(NO_HIT);
        log::debug!("picking disabled");
    }

    /// Enables or disables hover hit-testing on pointer moves.
    pub fn set_hover_enabled(&mut self, enabled: bool) {
        let mut state = self.state.borrow_mut();
        state.hover_enabled = enabled;
        if !enabled {
            state.set_hover(NO_HIT);
        }
    }

    /// Returns the id of the element currently under the pointer.
    #[must_use]
    pub fn hovered(&self) -> Option<u32> {
        color_id_to_index(self.state.borrow().hover_color_id)
    }

    /// Handles a pointer move at `position` (device pixels, origin
    /// bottom-left) as if it came from the mouse handler.
    pub fn handle_move(&mut self, position: Vec2) {
        self.state.borrow_mut().on_move(position);
    }

    /// Handles a click at `position` as if it came from the mouse handler.
    pub fn handle_click(&mut self, position: Vec2) {
        self.state.borrow_mut().on_click(position);
    }

    /// Reads and decodes the pick buffer at `position` without emitting.
    #[must_use]
    pub fn pick_at(&self, position: Vec2) -> Option<u32> {
        color_id_to_index(self.state.borrow().color_id_at(position))
    }

    /// Clears the pick buffer ahead of a pick pass.
    pub fn prepare(&mut self) {
        self.state.borrow_mut().buffer.prepare();
    }

    /// Resizes the pick buffer to the viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("pick buffer resized to {width}x{height}");
        self.state.borrow_mut().buffer.resize(width, height);
    }

    /// Borrows the pick buffer.
    #[must_use]
    pub fn buffer(&self) -> Ref<'_, B> {
        Ref::map(self.state.borrow(), |s| &s.buffer)
    }

    /// Mutably borrows the pick buffer.
    #[must_use]
    pub fn buffer_mut(&self) -> RefMut<'_, B> {
        RefMut::map(self.state.borrow_mut(), |s| &mut s.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::CpuPickBuffer;
    use crate::mouse::MouseButton;
    use crate::pick::encode_pick_id;
    use proptest::prelude::*;

    fn recording_manager() -> (PickingManager<CpuPickBuffer>, Rc<RefCell<Vec<PickEvent>>>) {
        let mut manager =
            PickingManager::new(CpuPickBuffer::new(16, 16), &PickingOptions::default());
        let events = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            PickEventKind::HoverOn,
            PickEventKind::HoverOff,
            PickEventKind::Click,
        ] {
            let sink = Rc::clone(&events);
            manager.on(kind, move |e| sink.borrow_mut().push(*e));
        }
        (manager, events)
    }

    #[test]
    fn test_hover_transitions() {
        let (mut manager, events) = recording_manager();
        manager.buffer_mut().write_pixel(1, 1, encode_pick_id(5));

        manager.handle_move(Vec2::new(0.0, 0.0));
        manager.handle_move(Vec2::new(1.5, 1.5));
        manager.handle_move(Vec2::new(1.0, 1.0));
        assert_eq!(manager.hovered(), Some(5));
        manager.handle_move(Vec2::new(3.0, 3.0));

        assert_eq!(
            *events.borrow(),
            vec![PickEvent::HoverOn(5), PickEvent::HoverOff(5)]
        );
        assert_eq!(manager.hovered(), None);
    }

    #[test]
    fn test_released_hover_is_forgotten_silently() {
        let (mut manager, events) = recording_manager();
        let mut first = manager.allocate_picking_colors(3).unwrap();
        manager.buffer_mut().write_pixel(2, 2, encode_pick_id(1));
        manager.handle_move(Vec2::new(2.0, 2.0));
        assert_eq!(manager.hovered(), Some(1));

        manager.deallocate_picking_colors(&mut first).unwrap();
        assert_eq!(manager.hovered(), None);

        // The same ids go to a new owner drawn at the same spot.
        let second = manager.allocate_picking_colors(3).unwrap();
        assert_eq!(second.index_of(1), Some(1));
        manager.handle_move(Vec2::new(2.0, 2.0));

        assert_eq!(
            *events.borrow(),
            vec![PickEvent::HoverOn(1), PickEvent::HoverOn(1)]
        );
    }

    #[test]
    fn test_release_of_other_ids_keeps_hover() {
        let (mut manager, events) = recording_manager();
        let _hovered = manager.allocate_picking_colors(1).unwrap();
        let mut other = manager.allocate_picking_colors(2).unwrap();
        manager.buffer_mut().write_pixel(0, 0, encode_pick_id(0));
        manager.handle_move(Vec2::ZERO);

        manager.deallocate_picking_colors(&mut other).unwrap();
        assert_eq!(manager.hovered(), Some(0));
        manager.handle_move(Vec2::new(5.0, 5.0));
        assert_eq!(
            *events.borrow(),
            vec![PickEvent::HoverOn(0), PickEvent::HoverOff(0)]
        );
    }

    #[test]
    fn test_hover_off_precedes_hover_on() {
        let (mut manager, events) = recording_manager();
        manager.buffer_mut().write_pixel(1, 1, encode_pick_id(2));
        manager.buffer_mut().write_pixel(2, 1, encode_pick_id(3));

        manager.handle_move(Vec2::new(1.0, 1.0));
        manager.handle_move(Vec2::new(2.0, 1.0));

        assert_eq!(
            *events.borrow(),
            vec![
                PickEvent::HoverOn(2),
                PickEvent::HoverOff(2),
                PickEvent::HoverOn(3)
            ]
        );
    }

    #[test]
    fn test_click_on_background_is_silent() {
        let (mut manager, events) = recording_manager();
        manager.buffer_mut().write_pixel(4, 4, encode_pick_id(7));

        manager.handle_click(Vec2::new(0.0, 0.0));
        assert!(events.borrow().is_empty());

        manager.handle_click(Vec2::new(4.0, 4.0));
        assert_eq!(*events.borrow(), vec![PickEvent::Click(7)]);
    }

    #[test]
    fn test_unsized_buffer_is_no_hit() {
        let mut manager = PickingManager::new(CpuPickBuffer::default(), &PickingOptions::default());
        assert_eq!(manager.pick_at(Vec2::new(3.0, 3.0)), None);
        assert_eq!(manager.pick_at(Vec2::new(-1.0, 3.0)), None);
        manager.handle_move(Vec2::new(3.0, 3.0));
        assert_eq!(manager.hovered(), None);
    }

    #[test]
    fn test_enable_is_idempotent() {
        let (mut manager, events) = recording_manager();
        let mut mouse = MouseHandler::new(4.0);
        mouse.set_viewport(16, 16);
        // Window row 14 is framebuffer row 1.
        manager.buffer_mut().write_pixel(1, 1, encode_pick_id(5));

        manager.enable(&mut mouse);
        manager.enable(&mut mouse);
        assert!(manager.is_enabled());
        assert_eq!(mouse.listener_count(MouseEventKind::Move), 1);
        assert_eq!(mouse.listener_count(MouseEventKind::Click), 1);

        mouse.pointer_moved(1.0, 14.0);
        mouse.button_pressed(MouseButton::Left);
        mouse.button_released(MouseButton::Left);
        assert_eq!(
            *events.borrow(),
            vec![PickEvent::HoverOn(5), PickEvent::Click(5)]
        );

        manager.disable(&mut mouse);
        manager.disable(&mut mouse);
        assert!(!manager.is_enabled());
        assert_eq!(mouse.listener_count(MouseEventKind::Move), 0);
        assert_eq!(events.borrow().last(), Some(&PickEvent::HoverOff(5)));

        let before = events.borrow().len();
        mouse.pointer_moved(2.0, 2.0);
        mouse.button_pressed(MouseButton::Left);
        mouse.button_released(MouseButton::Left);
        assert_eq!(events.borrow().len(), before);
    }

    #[test]
    fn test_hover_disabled_ignores_moves() {
        let (mut manager, events) = recording_manager();
        manager.buffer_mut().write_pixel(0, 0, encode_pick_id(1));
        manager.set_hover_enabled(false);
        manager.handle_move(Vec2::ZERO);
        assert!(events.borrow().is_empty());
        manager.handle_click(Vec2::ZERO);
        assert_eq!(*events.borrow(), vec![PickEvent::Click(1)]);
    }

    #[test]
    fn test_dropped_manager_leaves_mouse_usable() {
        let mut mouse = MouseHandler::new(4.0);
        {
            let mut manager =
                PickingManager::new(CpuPickBuffer::new(4, 4), &PickingOptions::default());
            manager.enable(&mut mouse);
        }
        mouse.pointer_moved(1.0, 1.0);
    }

    #[test]
    fn test_allocation_passthrough() {
        let (mut manager, _) = recording_manager();
        let before = manager.free_capacity();
        let mut allocation = manager.allocate_picking_colors(3).unwrap();
        assert_eq!(manager.free_capacity(), before - 3);
        manager.deallocate_picking_colors(&mut allocation).unwrap();
        assert_eq!(manager.free_capacity(), before);
    }

    proptest! {
        #[test]
        fn prop_at_most_one_element_hovered(ids in prop::collection::vec(0u32..4, 1..64)) {
            let (mut manager, events) = recording_manager();
            // Column x holds element x; column 0 is background.
            for x in 1..4 {
                manager.buffer_mut().fill_rect(x, 0, 1, 16, encode_pick_id(x));
            }

            let mut balance = 0i64;
            for x in ids {
                events.borrow_mut().clear();
                manager.handle_move(Vec2::new(x as f32, 0.0));
                for event in events.borrow().iter() {
                    match event {
                        PickEvent::HoverOn(_) => balance += 1,
                        PickEvent::HoverOff(_) => balance -= 1,
                        PickEvent::Click(_) => {}
                    }
                    prop_assert!(balance == 0 || balance == 1);
                }
                prop_assert_eq!(balance == 1, manager.hovered().is_some());
            }
        }
    }
}
