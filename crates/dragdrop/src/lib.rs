//! Taskspace DragDrop Utilities
//!
//! Pointer gesture tracking for ordered containers, and translation of a
//! finished drag into reorder batches.
//! Uses movement threshold to distinguish click from drag.

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// A slot inside an ordered container
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropLocation<S> {
    pub scope: S,
    pub index: usize,
}

impl<S> DropLocation<S> {
    pub fn new(scope: S, index: usize) -> Self {
        Self { scope, index }
    }
}

/// A finished drag as reported by the view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragEnd<S> {
    pub dragged_id: u32,
    pub source: DropLocation<S>,
    /// None when released outside any container
    pub destination: Option<DropLocation<S>>,
}

/// Reorder batches a drop turns into
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropPlan<S> {
    Noop,
    /// Same container: one reorder
    Reorder { scope: S, ordered_ids: Vec<u32> },
    /// Between containers: shortened source and lengthened destination
    Move {
        item_id: u32,
        source: S,
        source_ids: Vec<u32>,
        destination: S,
        destination_ids: Vec<u32>,
    },
}

impl<S> DropPlan<S> {
    pub fn is_noop(&self) -> bool {
        matches!(self, DropPlan::Noop)
    }
}

/// Index of `id` in `ids`, trusting `hint` when it already points at it
fn locate(ids: &[u32], hint: usize, id: u32) -> Option<usize> {
    if ids.get(hint) == Some(&id) {
        Some(hint)
    } else {
        ids.iter().position(|x| *x == id)
    }
}

/// Move the element at `from` to `to` (clamped)
pub fn reorder(ids: &[u32], from: usize, to: usize) -> Vec<u32> {
    let mut next = ids.to_vec();
    if from >= next.len() {
        return next;
    }
    let moved = next.remove(from);
    let to = to.min(next.len());
    next.insert(to, moved);
    next
}

/// Translate a drag into reorder batches.
///
/// `ids_in` returns the currently rendered id order of a container.
pub fn plan_drop<S, F>(end: &DragEnd<S>, ids_in: F) -> DropPlan<S>
where
    S: Clone + PartialEq,
    F: Fn(&S) -> Vec<u32>,
{
    let Some(dest) = &end.destination else {
        return DropPlan::Noop;
    };
    if dest.scope == end.source.scope && dest.index == end.source.index {
        return DropPlan::Noop;
    }

    let source_ids = ids_in(&end.source.scope);
    let Some(from) = locate(&source_ids, end.source.index, end.dragged_id) else {
        return DropPlan::Noop;
    };

    if dest.scope == end.source.scope {
        let ordered_ids = reorder(&source_ids, from, dest.index);
        if ordered_ids == source_ids {
            return DropPlan::Noop;
        }
        return DropPlan::Reorder {
            scope: dest.scope.clone(),
            ordered_ids,
        };
    }

    let mut shortened = source_ids;
    shortened.remove(from);

    let mut lengthened: Vec<u32> = ids_in(&dest.scope)
        .into_iter()
        .filter(|id| *id != end.dragged_id)
        .collect();
    let at = dest.index.min(lengthened.len());
    lengthened.insert(at, end.dragged_id);

    DropPlan::Move {
        item_id: end.dragged_id,
        source: end.source.scope.clone(),
        source_ids: shortened,
        destination: dest.scope.clone(),
        destination_ids: lengthened,
    }
}

/// Gesture phase
#[derive(Clone, Debug, PartialEq)]
enum Phase<S> {
    Idle,
    /// Pressed but not yet moved past the threshold
    Pending {
        item_id: u32,
        source: DropLocation<S>,
        start_x: i32,
        start_y: i32,
    },
    Dragging {
        item_id: u32,
        source: DropLocation<S>,
        over: Option<DropLocation<S>>,
    },
}

/// Press → drag → release tracking for one pointer
#[derive(Clone, Debug)]
pub struct DragSession<S> {
    phase: Phase<S>,
}

impl<S: Clone> Default for DragSession<S> {
    fn default() -> Self {
        Self { phase: Phase::Idle }
    }
}

impl<S: Clone> DragSession<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary button press on a draggable item
    pub fn press(&mut self, item_id: u32, source: DropLocation<S>, x: i32, y: i32, button: i16) {
        if button != 0 {
            return;
        }
        self.phase = Phase::Pending {
            item_id,
            source,
            start_x: x,
            start_y: y,
        };
    }

    /// Pointer moved; returns true when this move started the drag
    pub fn motion(&mut self, x: i32, y: i32) -> bool {
        let (item_id, source) = match &self.phase {
            Phase::Pending { item_id, source, start_x, start_y } => {
                let dx = (x - start_x).abs();
                let dy = (y - start_y).abs();
                if dx <= DRAG_THRESHOLD_PX && dy <= DRAG_THRESHOLD_PX {
                    return false;
                }
                (*item_id, source.clone())
            }
            _ => return false,
        };
        self.phase = Phase::Dragging {
            item_id,
            source,
            over: None,
        };
        true
    }

    /// Pointer entered (Some) or left (None) a drop slot
    pub fn hover(&mut self, location: Option<DropLocation<S>>) {
        if let Phase::Dragging { over, .. } = &mut self.phase {
            *over = location;
        }
    }

    pub fn dragging_id(&self) -> Option<u32> {
        match &self.phase {
            Phase::Dragging { item_id, .. } => Some(*item_id),
            _ => None,
        }
    }

    pub fn pending_id(&self) -> Option<u32> {
        match &self.phase {
            Phase::Pending { item_id, .. } => Some(*item_id),
            _ => None,
        }
    }

    /// Button released. A press that never passed the threshold is a click
    /// and yields None.
    pub fn release(&mut self) -> Option<DragEnd<S>> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Dragging { item_id, source, over } => Some(DragEnd {
                dragged_id: item_id,
                source,
                destination: over,
            }),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}
