//! Glue between pickable renderables and the picking manager.
//!
//! A renderable (node set, edge set, label set) allocates one pick id per
//! element when it is created, draws those ids as colors during the pick
//! pass, and turns decoded ids from the manager back into the caller's own
//! element ids. [`PickAdapter`] implements that bookkeeping once for all
//! element kinds.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::allocator::PickingColors;
use crate::buffer::OffscreenBuffer;
use crate::error::Result;
use crate::events::{Event, EventEmitter, ListenerId, PickEvent, PickEventKind};
use crate::manager::PickingManager;

/// The kind of graph element a renderable draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Edge,
    Label,
}

impl ElementKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Label => "label",
        }
    }
}

/// A caller-supplied element identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
    Number(i64),
    Name(String),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ElementId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::Name(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

/// A pick event resolved to a caller element, scoped by layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEvent {
    /// Name of the layer that owns the element.
    pub layer: String,
    /// The kind of element.
    pub element: ElementKind,
    /// The caller-supplied element id.
    pub id: ElementId,
    /// What happened.
    pub action: PickEventKind,
}

impl Event for LayerEvent {
    type Kind = PickEventKind;

    fn kind(&self) -> PickEventKind {
        self.action
    }
}

/// Shared emitter that adapters publish [`LayerEvent`]s to.
pub type LayerEventSink = Rc<RefCell<EventEmitter<LayerEvent>>>;

#[derive(Debug)]
struct AdapterState {
    layer: String,
    kind: ElementKind,
    allocation: PickingColors,
    ids: Vec<ElementId>,
}

impl AdapterState {
    fn resolve(&self, pick_id: u32) -> Option<&ElementId> {
        self.allocation
            .index_of(pick_id)
            .and_then(|ordinal| self.ids.get(ordinal))
    }
}

const PICK_KINDS: [PickEventKind; 3] = [
    PickEventKind::HoverOn,
    PickEventKind::HoverOff,
    PickEventKind::Click,
];

/// Pick bookkeeping for one renderable.
///
/// Call [`destroy`](Self::destroy) with the same manager to return the ids;
/// dropping the adapter without it leaks them.
#[derive(Debug)]
pub struct PickAdapter {
    state: Rc<RefCell<AdapterState>>,
    listeners: Vec<(PickEventKind, ListenerId)>,
}

impl PickAdapter {
    /// Allocates one pick id per entry of `ids` and subscribes to the
    /// manager's pick events, re-emitting matches to `sink`.
    ///
    /// `ids` are the caller's element ids in ingestion order; element `i`
    /// is drawn with the `i`-th pick color.
    pub fn new<B: OffscreenBuffer + 'static>(
        manager: &mut PickingManager<B>,
        layer: &str,
        kind: ElementKind,
        ids: Vec<ElementId>,
        sink: &LayerEventSink,
    ) -> Result<Self> {
        let allocation = manager.allocate_picking_colors(ids.len())?;
        let state = Rc::new(RefCell::new(AdapterState {
            layer: layer.to_string(),
            kind,
            allocation,
            ids,
        }));

        let listeners = PICK_KINDS
            .into_iter()
            .map(|pick_kind| {
                let weak: Weak<RefCell<AdapterState>> = Rc::downgrade(&state);
                let sink = Rc::clone(sink);
                let id = manager.on(pick_kind, move |event: &PickEvent| {
                    let Some(state) = weak.upgrade() else {
                        return;
                    };
                    // Ids owned by other renderables resolve to nothing here.
                    let resolved = {
                        let state = state.borrow();
                        state.resolve(event.id()).map(|id| LayerEvent {
                            layer: state.layer.clone(),
                            element: state.kind,
                            id: id.clone(),
                            action: event.kind(),
                        })
                    };
                    if let Some(layer_event) = resolved {
                        sink.borrow_mut().emit(&layer_event);
                    }
                });
                (pick_kind, id)
            })
            .collect();

        log::debug!("{} pick adapter created for layer '{layer}'", kind.as_str());
        Ok(Self { state, listeners })
    }

    /// Returns the element kind.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.state.borrow().kind
    }

    /// Returns the owning layer name.
    #[must_use]
    pub fn layer(&self) -> Ref<'_, str> {
        Ref::map(self.state.borrow(), |s| s.layer.as_str())
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().ids.len()
    }

    /// Returns true if the adapter covers no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the RGBA pick colors in element order, four bytes each.
    #[must_use]
    pub fn colors(&self) -> Ref<'_, [u8]> {
        Ref::map(self.state.borrow(), |s| s.allocation.colors())
    }

    /// Resolves a decoded pick id to the caller's element id.
    #[must_use]
    pub fn resolve(&self, pick_id: u32) -> Option<ElementId> {
        self.state.borrow().resolve(pick_id).cloned()
    }

    /// Unsubscribes from the manager and returns the pick ids.
    pub fn destroy<B: OffscreenBuffer + 'static>(
        self,
        manager: &mut PickingManager<B>,
    ) -> Result<()> {
        for (kind, id) in &self.listeners {
            manager.off(*kind, *id);
        }
        let mut state = self.state.borrow_mut();
        manager.deallocate_picking_colors(&mut state.allocation)?;
        log::debug!(
            "{} pick adapter destroyed for layer '{}'",
            state.kind.as_str(),
            state.layer
        );
        Ok(())
    }
}

impl Drop for PickAdapter {
    fn drop(&mut self) {
        if let Ok(state) = self.state.try_borrow() {
            if !state.allocation.is_empty() {
                log::warn!(
                    "{} pick adapter for layer '{}' dropped without releasing its ids",
                    state.kind.as_str(),
                    state.layer
                );
            }
        }
    }
}
