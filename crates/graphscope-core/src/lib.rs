//! Core picking abstractions for graphscope-rs.
//!
//! This crate contains everything about element picking that does not touch
//! the GPU:
//! - [`IndexAllocator`] hands out collision-free pick ids and recycles them
//! - [`encode_pick_id`] / [`decode_pick_color`] pack ids into RGBA colors
//! - [`PickingManager`] turns pointer events into hover/click events
//! - [`PickAdapter`] maps decoded ids back to caller element ids
//! - [`OffscreenBuffer`] is the contract a pick render target implements

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod adapter;
pub mod allocator;
pub mod buffer;
pub mod error;
pub mod events;
pub mod manager;
pub mod mouse;
pub mod options;
pub mod pick;

pub use adapter::{ElementId, ElementKind, LayerEvent, LayerEventSink, PickAdapter};
pub use allocator::{IndexAllocator, IndexRange, PickingColors};
pub use buffer::{CpuPickBuffer, OffscreenBuffer};
pub use error::{GraphscopeError, Result};
pub use events::{Event, EventEmitter, ListenerId, PickEvent, PickEventKind};
pub use manager::PickingManager;
pub use mouse::{MouseButton, MouseEvent, MouseEventKind, MouseHandler, MouseState};
pub use options::PickingOptions;
pub use pick::{
    color_id_to_index, decode_color_id, decode_pick_color, encode_pick_id, ID_SPACE_END, NO_HIT,
};

// Re-export glam types for convenience
pub use glam::{Vec2, Vec4};
