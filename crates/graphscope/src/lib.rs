//! graphscope-rs: GPU graph visualization with per-element picking.
//!
//! Nodes, edges, and labels are grouped into named layers. Each element gets
//! a unique pick color that is drawn into an offscreen buffer; reading that
//! buffer under the pointer tells which element is hovered or clicked.
//!
//! # Quick Start
//!
//! ```no_run
//! use graphscope::*;
//!
//! init_logging();
//!
//! let (engine, mut view) = headless_view(800, 600, PickingOptions::default()).unwrap();
//! let data = GraphData {
//!     nodes: vec![NodeData::new("a", Vec2::ZERO).with_size(0.2)],
//!     ..GraphData::default()
//! };
//! view.add_layer("graph", &data).unwrap();
//! view.on(PickEventKind::Click, |event| {
//!     println!("clicked {} {}", event.element.as_str(), event.id);
//! });
//! view.render_pick_pass(&engine, Mat4::IDENTITY).unwrap();
//! ```

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod data;
mod headless;
mod input;
mod layer;
mod view;

pub use data::{EdgeData, GraphData, LabelData, NodeData};
pub use headless::{headless_view, pick_element};
pub use input::{map_button, wheel_delta};
pub use layer::GraphLayer;
pub use view::GraphView;

pub use graphscope_core::{
    CpuPickBuffer, ElementId, ElementKind, GraphscopeError, LayerEvent, ListenerId, MouseButton,
    MouseEvent, MouseEventKind, MouseHandler, OffscreenBuffer, PickEvent, PickEventKind,
    PickingManager, PickingOptions, Result,
};
pub use graphscope_render::{PickBuffer, RenderEngine};

pub use glam::{Mat4, Vec2};

/// Initializes logging from `RUST_LOG`. Calling it more than once is harmless.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::debug!("logging initialized");
    }
}
