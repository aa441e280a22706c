//! Named layers of pickable graph elements.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use graphscope_core::{
    ElementId, ElementKind, EventEmitter, LayerEvent, LayerEventSink, ListenerId, OffscreenBuffer,
    PickAdapter, PickEventKind, PickingManager, Result,
};
use graphscope_render::{PickPrimitive, PickRenderData, PickShape, RenderResult};

/// One element kind of a layer: pick bookkeeping plus its GPU instances.
struct PickableSet {
    adapter: PickAdapter,
    shapes: Vec<PickShape>,
    primitive: PickPrimitive,
    render_data: Option<PickRenderData>,
}

impl PickableSet {
    fn new<B: OffscreenBuffer + 'static>(
        manager: &mut PickingManager<B>,
        layer: &str,
        kind: ElementKind,
        elements: Vec<(ElementId, PickShape)>,
        sink: &LayerEventSink,
    ) -> Result<Option<Self>> {
        if elements.is_empty() {
            return Ok(None);
        }
        let (ids, shapes): (Vec<_>, Vec<_>) = elements.into_iter().unzip();
        let adapter = PickAdapter::new(manager, layer, kind, ids, sink)?;
        let primitive = match kind {
            ElementKind::Edge => PickPrimitive::Segment,
            ElementKind::Node | ElementKind::Label => PickPrimitive::Quad,
        };
        Ok(Some(Self {
            adapter,
            shapes,
            primitive,
            render_data: None,
        }))
    }

    fn init_gpu_resources(&mut self, device: &wgpu::Device) -> RenderResult<()> {
        if self.render_data.is_none() {
            let colors = self.adapter.colors();
            let data = PickRenderData::new(device, self.primitive, &self.shapes, &colors)?;
            drop(colors);
            self.render_data = Some(data);
        }
        Ok(())
    }
}

/// A named group of nodes, edges, and labels.
///
/// Pick events for the layer's elements are published on the layer's own
/// emitter and forwarded to the view.
pub struct GraphLayer {
    name: String,
    // Draw order: edges under nodes under labels.
    sets: Vec<PickableSet>,
    events: LayerEventSink,
}

impl GraphLayer {
    /// Allocates pick ids for every element of `data`.
    ///
    /// Creation is all-or-nothing: if any allocation fails, the ids already
    /// taken for this layer are returned before the error is.
    pub(crate) fn new<B: OffscreenBuffer + 'static>(
        manager: &mut PickingManager<B>,
        name: &str,
        data: &crate::GraphData,
        view_sink: &LayerEventSink,
    ) -> Result<Self> {
        let events: LayerEventSink = Rc::new(RefCell::new(EventEmitter::new()));
        for kind in [
            PickEventKind::HoverOn,
            PickEventKind::HoverOff,
            PickEventKind::Click,
        ] {
            let view_sink = Rc::clone(view_sink);
            events
                .borrow_mut()
                .on(kind, move |event| view_sink.borrow_mut().emit(event));
        }

        let groups = [
            (
                ElementKind::Edge,
                data.edges
                    .iter()
                    .map(|e| (e.id.clone(), e.pick_shape()))
                    .collect::<Vec<_>>(),
            ),
            (
                ElementKind::Node,
                data.nodes.iter().map(|n| (n.id.clone(), n.pick_shape())).collect(),
            ),
            (
                ElementKind::Label,
                data.labels.iter().map(|l| (l.id.clone(), l.pick_shape())).collect(),
            ),
        ];

        let mut sets = Vec::with_capacity(groups.len());
        for (kind, elements) in groups {
            match PickableSet::new(manager, name, kind, elements, &events) {
                Ok(Some(set)) => sets.push(set),
                Ok(None) => {}
                Err(e) => {
                    for set in sets {
                        let kind = set.adapter.kind();
                        if let Err(rollback) = set.adapter.destroy(manager) {
                            log::error!(
                                "layer '{name}': rollback of {} ids failed: {rollback}",
                                kind.as_str()
                            );
                        }
                    }
                    return Err(e);
                }
            }
        }

        log::debug!("layer '{name}' created with {} element set(s)", sets.len());
        Ok(Self {
            name: name.to_string(),
            sets,
            events,
        })
    }

    /// Returns the layer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribes to this layer's pick events.
    ///
    /// Listeners must not subscribe or unsubscribe while an event is being
    /// dispatched.
    pub fn on(
        &self,
        kind: PickEventKind,
        callback: impl FnMut(&LayerEvent) + 'static,
    ) -> ListenerId {
        self.events.borrow_mut().on(kind, callback)
    }

    /// Unsubscribes a listener.
    pub fn off(&self, kind: PickEventKind, id: ListenerId) -> bool {
        self.events.borrow_mut().off(kind, id)
    }

    fn set(&self, kind: ElementKind) -> Option<&PickableSet> {
        self.sets.iter().find(|s| s.adapter.kind() == kind)
    }

    /// Returns the number of elements of `kind`.
    #[must_use]
    pub fn element_count(&self, kind: ElementKind) -> usize {
        self.set(kind).map_or(0, |s| s.adapter.len())
    }

    /// Returns the pick colors of `kind`, four bytes per element in
    /// ingestion order.
    #[must_use]
    pub fn pick_colors(&self, kind: ElementKind) -> Option<Ref<'_, [u8]>> {
        self.set(kind).map(|s| s.adapter.colors())
    }

    /// Resolves a decoded pick id to an element of this layer.
    #[must_use]
    pub fn resolve(&self, pick_id: u32) -> Option<(ElementKind, ElementId)> {
        self.sets
            .iter()
            .find_map(|s| s.adapter.resolve(pick_id).map(|id| (s.adapter.kind(), id)))
    }

    /// Uploads pick instances for any element set that has none yet.
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device) -> RenderResult<()> {
        for set in &mut self.sets {
            set.init_gpu_resources(device)?;
        }
        Ok(())
    }

    /// Drops GPU resources so they are rebuilt on the next pick pass.
    pub fn clear_gpu_resources(&mut self) {
        for set in &mut self.sets {
            set.render_data = None;
        }
    }

    /// Returns the uploaded pick render data in draw order.
    pub fn render_data(&self) -> impl Iterator<Item = &PickRenderData> {
        self.sets.iter().filter_map(|s| s.render_data.as_ref())
    }

    /// Releases the layer's pick ids and listeners.
    pub(crate) fn destroy<B: OffscreenBuffer + 'static>(
        self,
        manager: &mut PickingManager<B>,
    ) -> Result<()> {
        self.events.borrow_mut().clear();
        for set in self.sets {
            set.adapter.destroy(manager)?;
        }
        log::debug!("layer '{}' destroyed", self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use graphscope_core::{CpuPickBuffer, EventEmitter, GraphscopeError, PickingOptions};

    use crate::data::{EdgeData, GraphData, LabelData, NodeData};

    fn manager(id_space_end: u32) -> PickingManager<CpuPickBuffer> {
        let options = PickingOptions {
            id_space_end,
            ..PickingOptions::default()
        };
        PickingManager::new(CpuPickBuffer::new(4, 4), &options)
    }

    fn data() -> GraphData {
        GraphData {
            nodes: vec![NodeData::new(1_i64, Vec2::ZERO), NodeData::new(2_i64, Vec2::ONE)],
            edges: vec![EdgeData::new("e", Vec2::ZERO, Vec2::ONE)],
            labels: vec![LabelData::new("l", Vec2::ZERO, Vec2::ONE)],
        }
    }

    #[test]
    fn test_failed_creation_rolls_back_every_set() {
        // Edges and nodes fit, labels do not.
        let mut manager = manager(3);
        let sink: LayerEventSink = Rc::new(RefCell::new(EventEmitter::new()));

        let result = GraphLayer::new(&mut manager, "g", &data(), &sink);
        assert!(matches!(
            result,
            Err(GraphscopeError::CapacityExhausted {
                requested: 1,
                available: 0
            })
        ));
        assert_eq!(manager.free_capacity(), 3);
        assert_eq!(manager.listener_count(PickEventKind::HoverOn), 0);
    }

    #[test]
    fn test_sets_follow_draw_order() {
        let mut manager = manager(16);
        let sink: LayerEventSink = Rc::new(RefCell::new(EventEmitter::new()));
        let layer = GraphLayer::new(&mut manager, "g", &data(), &sink).unwrap();

        assert_eq!(layer.resolve(0), Some((ElementKind::Edge, ElementId::from("e"))));
        assert_eq!(layer.resolve(2), Some((ElementKind::Node, ElementId::from(2_i64))));
        assert_eq!(layer.resolve(3), Some((ElementKind::Label, ElementId::from("l"))));
        assert_eq!(layer.element_count(ElementKind::Node), 2);

        layer.destroy(&mut manager).unwrap();
        assert_eq!(manager.free_capacity(), 16);
    }
}
