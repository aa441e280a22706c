//! Headless GPU picking.
//!
//! Creates a render engine without a window, for tests and batch tools that
//! need to hit-test a scene offscreen.

use glam::{Mat4, Vec2};
use graphscope_core::{ElementId, ElementKind, GraphscopeError, PickingOptions, Result};
use graphscope_render::{PickBuffer, RenderEngine};
use pollster::FutureExt;

use crate::view::GraphView;

/// Creates a headless engine and a view of the given size on it.
pub fn headless_view(
    width: u32,
    height: u32,
    options: PickingOptions,
) -> Result<(RenderEngine, GraphView<PickBuffer>)> {
    let engine = RenderEngine::new_headless().block_on().map_err(|e| {
        GraphscopeError::RenderError(format!("Failed to create headless engine: {e}"))
    })?;
    let view = GraphView::with_engine(&engine, width, height, options);
    Ok((engine, view))
}

/// Draws the view's pick pass and resolves the element at `position`
/// (device pixels, origin bottom-left).
///
/// Returns the layer name, element kind, and caller id of the hit, or
/// `None` over background.
pub fn pick_element(
    view: &mut GraphView<PickBuffer>,
    engine: &RenderEngine,
    view_proj: Mat4,
    position: Vec2,
) -> Result<Option<(String, ElementKind, ElementId)>> {
    view.render_pick_pass(engine, view_proj)?;
    let Some(pick_id) = view.picking().pick_at(position) else {
        return Ok(None);
    };
    Ok(view.layers().find_map(|layer| {
        layer
            .resolve(pick_id)
            .map(|(kind, id)| (layer.name().to_string(), kind, id))
    }))
}
