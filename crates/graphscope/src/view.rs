//! The view controller tying input, picking, and layers together.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Mat4;
use graphscope_core::{
    EventEmitter, GraphscopeError, LayerEvent, LayerEventSink, ListenerId, MouseHandler,
    OffscreenBuffer, PickEventKind, PickingManager, PickingOptions, Result,
};
use graphscope_render::{PickBuffer, RenderEngine};

use crate::data::GraphData;
use crate::layer::GraphLayer;

/// A viewport showing layers of pickable graph elements.
///
/// The view owns the pointer state, the picking manager, and every layer.
/// Pick events from all layers are re-published on the view's emitter with
/// the layer name and the caller's element id.
pub struct GraphView<B: OffscreenBuffer + 'static> {
    pub(crate) mouse: MouseHandler,
    manager: PickingManager<B>,
    layers: Vec<GraphLayer>,
    events: LayerEventSink,
    options: PickingOptions,
}

impl<B: OffscreenBuffer + 'static> GraphView<B> {
    /// Creates a view drawing picks into `buffer`.
    pub fn new(buffer: B, options: PickingOptions) -> Self {
        let (width, height) = buffer.size();
        let mut mouse = MouseHandler::new(options.click_drag_threshold);
        mouse.set_viewport(width, height);

        let mut manager = PickingManager::new(buffer, &options);
        if options.enabled {
            manager.enable(&mut mouse);
        }

        Self {
            mouse,
            manager,
            layers: Vec::new(),
            events: Rc::new(RefCell::new(EventEmitter::new())),
            options,
        }
    }

    /// Returns the options the view was created with.
    #[must_use]
    pub fn options(&self) -> &PickingOptions {
        &self.options
    }

    /// Adds a layer on top of the existing ones.
    ///
    /// Fails without side effects if the name is taken or the id space
    /// cannot hold every element of `data`.
    pub fn add_layer(&mut self, name: &str, data: &GraphData) -> Result<&GraphLayer> {
        if self.layers.iter().any(|l| l.name() == name) {
            return Err(GraphscopeError::LayerExists(name.to_string()));
        }
        let layer = GraphLayer::new(&mut self.manager, name, data, &self.events)?;
        log::info!("added layer '{name}'");
        self.layers.push(layer);
        Ok(&self.layers[self.layers.len() - 1])
    }

    /// Removes a layer and releases its pick ids.
    pub fn remove_layer(&mut self, name: &str) -> Result<()> {
        let index = self
            .layers
            .iter()
            .position(|l| l.name() == name)
            .ok_or_else(|| GraphscopeError::LayerNotFound(name.to_string()))?;
        let layer = self.layers.remove(index);
        layer.destroy(&mut self.manager)?;
        log::info!("removed layer '{name}'");
        Ok(())
    }

    /// Removes every layer and releases their pick ids.
    ///
    /// All layers are removed even if releasing one fails; the first error
    /// is returned.
    pub fn clear_layers(&mut self) -> Result<()> {
        let mut result = Ok(());
        for layer in std::mem::take(&mut self.layers) {
            let name = layer.name().to_string();
            if let Err(e) = layer.destroy(&mut self.manager) {
                log::warn!("failed to release layer '{name}': {e}");
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    /// Returns a layer by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&GraphLayer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    /// Returns the layers in draw order.
    pub fn layers(&self) -> impl Iterator<Item = &GraphLayer> {
        self.layers.iter()
    }

    /// Turns pointer-driven picking on or off.
    pub fn set_picking_enabled(&mut self, enabled: bool) {
        if enabled {
            self.manager.enable(&mut self.mouse);
        } else {
            self.manager.disable(&mut self.mouse);
        }
    }

    /// Returns whether pointer-driven picking is on.
    #[must_use]
    pub fn is_picking_enabled(&self) -> bool {
        self.manager.is_enabled()
    }

    /// Resizes the pick buffer and the pointer viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.manager.resize(width, height);
        self.mouse.set_viewport(width, height);
    }

    /// Subscribes to pick events from every layer.
    ///
    /// Listeners must not call back into the view.
    pub fn on(
        &self,
        kind: PickEventKind,
        callback: impl FnMut(&LayerEvent) + 'static,
    ) -> ListenerId {
        self.events.borrow_mut().on(kind, callback)
    }

    /// Unsubscribes a view listener.
    pub fn off(&self, kind: PickEventKind, id: ListenerId) -> bool {
        self.events.borrow_mut().off(kind, id)
    }

    /// Returns the pointer handler. Hosts without winit feed input here.
    pub fn mouse_mut(&mut self) -> &mut MouseHandler {
        &mut self.mouse
    }

    /// Returns the picking manager.
    #[must_use]
    pub fn picking(&self) -> &PickingManager<B> {
        &self.manager
    }

    /// Returns the picking manager mutably.
    pub fn picking_mut(&mut self) -> &mut PickingManager<B> {
        &mut self.manager
    }
}

impl<B: OffscreenBuffer + 'static> Drop for GraphView<B> {
    fn drop(&mut self) {
        // Layers must hand their ids back before the manager goes away.
        let _ = self.clear_layers();
    }
}

impl GraphView<PickBuffer> {
    /// Creates a view with a GPU pick buffer on `engine`'s device.
    pub fn with_engine(
        engine: &RenderEngine,
        width: u32,
        height: u32,
        options: PickingOptions,
    ) -> Self {
        Self::new(engine.create_pick_buffer(width, height), options)
    }

    /// Clears the pick buffer and draws every layer's pick colors into it.
    ///
    /// Layers upload their instance buffers on first use.
    pub fn render_pick_pass(&mut self, engine: &RenderEngine, view_proj: Mat4) -> Result<()> {
        for layer in &mut self.layers {
            layer
                .init_gpu_resources(&engine.device)
                .map_err(|e| GraphscopeError::RenderError(e.to_string()))?;
        }

        self.manager.prepare();
        let buffer = self.manager.buffer();
        engine.render_pick_pass(
            &buffer,
            view_proj,
            self.layers.iter().flat_map(GraphLayer::render_data),
        );
        Ok(())
    }
}
