#![forbid(unsafe_code)]

//! In-memory [`BoardHost`].
//!
//! [`Board`] keeps an ordered list of [`BoardItem`]s and lays them out the
//! way a browser would: either one full-width column ([`Flow::Stack`]) or a
//! wrapping grid of equal columns ([`Flow::Grid`]) in which wide items take a
//! whole row. Layout is recomputed on every read, so a mutation is visible to
//! the next geometry query.
//!
//! Every call the engine makes is appended to [`Board::calls`], and any of
//! the fallible operations can be told to fail through [`Board::fail`].

use std::collections::BTreeSet;

use cardshift_core::geometry::{Rect, Sides};
use cardshift_drag::{
    BoardHost, CardGroup, CardId, CardSnapshot, HostError, NoteKind, RegionId, UserMessage,
};
use tracing::debug;

/// How items flow inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// One full-width column.
    Stack,
    /// Wrapping rows of `columns` equal columns.
    Grid { columns: usize },
}

/// One entry of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardItem {
    pub id: CardId,
    /// Border-box height; margins come from the board.
    pub height: f64,
    /// Takes a whole grid row.
    pub wide: bool,
    pub kind: NoteKind,
    pub blank: bool,
    pub renderable: bool,
    pub group: Option<CardGroup>,
}

impl BoardItem {
    #[must_use]
    pub fn new(id: u64, height: f64) -> Self {
        Self {
            id: CardId(id),
            height,
            wide: false,
            kind: NoteKind::Other,
            blank: false,
            renderable: true,
            group: None,
        }
    }

    #[must_use]
    pub fn wide(mut self) -> Self {
        self.wide = true;
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: NoteKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.renderable = false;
        self
    }

    /// Turn the item into a linked group; the first member becomes its id.
    #[must_use]
    pub fn group(mut self, members: &[u64]) -> Self {
        if let Some(group) = CardGroup::new(members.iter().copied().map(CardId)) {
            self.id = group.representative();
            self.group = Some(group);
        }
        self
    }

    fn contains(&self, id: CardId) -> bool {
        self.id == id || self.group.as_ref().is_some_and(|g| g.contains(id))
    }
}

/// Host operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    Move,
    Link,
    Save,
}

/// How often an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    Once,
    Always,
}

/// A call the engine made, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    MoveItem { card: CardId, index: usize },
    Link { dragged: Vec<CardId>, target: CardId },
    Save,
    CapturePointer,
    ReleasePointerCapture,
    Highlight(Option<CardId>),
    Notify(UserMessage),
}

/// Scriptable board.
#[derive(Debug, Clone)]
pub struct Board {
    bounds: Rect,
    flow: Flow,
    margin: Sides,
    items: Vec<BoardItem>,
    editable: BTreeSet<u64>,
    handles: BTreeSet<u64>,
    failures: Vec<(HostOp, FailMode)>,
    calls: Vec<HostCall>,
    captured: bool,
    highlight: Option<CardId>,
    saves: usize,
}

impl Board {
    /// Empty board `width` wide.
    #[must_use]
    pub fn new(width: f64, flow: Flow) -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, width, 10_000.0),
            flow,
            margin: Sides::default(),
            items: Vec::new(),
            editable: BTreeSet::new(),
            handles: BTreeSet::new(),
            failures: Vec::new(),
            calls: Vec::new(),
            captured: false,
            highlight: None,
            saves: 0,
        }
    }

    /// Single column of `count` items, ids `1..=count`, all `height` tall.
    #[must_use]
    pub fn stack(width: f64, count: u64, height: f64) -> Self {
        Self::new(width, Flow::Stack).with_items((1..=count).map(|id| BoardItem::new(id, height)))
    }

    /// Grid of `count` single-width items, ids `1..=count`.
    #[must_use]
    pub fn grid(width: f64, columns: usize, count: u64, height: f64) -> Self {
        Self::new(width, Flow::Grid { columns })
            .with_items((1..=count).map(|id| BoardItem::new(id, height)))
    }

    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = BoardItem>) -> Self {
        self.items.extend(items);
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: BoardItem) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn with_margin(mut self, margin: impl Into<Sides>) -> Self {
        self.margin = margin.into();
        self
    }

    /// Mark a region as an embedded editor.
    #[must_use]
    pub fn with_editable_region(mut self, region: RegionId) -> Self {
        self.editable.insert(region.0);
        self
    }

    /// Mark a region as a nested drag handle.
    #[must_use]
    pub fn with_drag_handle(mut self, region: RegionId) -> Self {
        self.handles.insert(region.0);
        self
    }

    /// Make `op` fail, once or until [`Board::heal`].
    pub fn fail(&mut self, op: HostOp, mode: FailMode) {
        self.failures.push((op, mode));
    }

    /// Drop every injected failure.
    pub fn heal(&mut self) {
        self.failures.clear();
    }

    /// Drop the item containing `id`, as if another view deleted it.
    pub fn remove(&mut self, id: u64) -> Option<BoardItem> {
        let pos = self.items.iter().position(|i| i.contains(CardId(id)))?;
        Some(self.items.remove(pos))
    }

    /// The platform took pointer capture away.
    pub fn lose_capture(&mut self) {
        self.captured = false;
    }

    /// Resize the container; items rewrap on the next read.
    pub fn resize(&mut self, width: f64) {
        self.bounds.width = width;
    }

    /// Ids of renderable entries in display order.
    #[must_use]
    pub fn order(&self) -> Vec<u64> {
        self.items
            .iter()
            .filter(|i| i.renderable)
            .map(|i| i.id.0)
            .collect()
    }

    #[must_use]
    pub fn margin(&self) -> Sides {
        self.margin
    }

    #[must_use]
    pub fn items(&self) -> &[BoardItem] {
        &self.items
    }

    /// Layout bounds of the item containing `id`.
    #[must_use]
    pub fn rect(&self, id: u64) -> Option<Rect> {
        let id = CardId(id);
        self.layout()
            .into_iter()
            .find(|(item, _)| item.contains(id))
            .map(|(_, rect)| rect)
    }

    #[must_use]
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Messages shown so far.
    #[must_use]
    pub fn messages(&self) -> Vec<&UserMessage> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Notify(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    /// Completed saves.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    #[must_use]
    pub fn highlight(&self) -> Option<CardId> {
        self.highlight
    }

    fn take_failure(&mut self, op: HostOp) -> bool {
        let Some(pos) = self.failures.iter().position(|(o, _)| *o == op) else {
            return false;
        };
        if self.failures[pos].1 == FailMode::Once {
            self.failures.remove(pos);
        }
        true
    }

    /// Renderable items with their layout rectangles.
    fn layout(&self) -> Vec<(&BoardItem, Rect)> {
        let margin = self.margin;
        let left = self.bounds.x + margin.left;
        let full = (self.bounds.width - margin.horizontal_sum()).max(0.0);
        let mut out = Vec::with_capacity(self.items.len());
        let mut top = self.bounds.y;

        match self.flow {
            Flow::Stack => {
                for item in self.items.iter().filter(|i| i.renderable) {
                    out.push((item, Rect::new(left, top + margin.top, full, item.height)));
                    top += item.height + margin.vertical_sum();
                }
            }
            Flow::Grid { columns } => {
                let columns = columns.max(1);
                let stride = self.bounds.width / columns as f64;
                let cell = (stride - margin.horizontal_sum()).max(0.0);
                let mut column = 0usize;
                let mut row_height = 0.0f64;
                for item in self.items.iter().filter(|i| i.renderable) {
                    let outer_height = item.height + margin.vertical_sum();
                    if item.wide {
                        if column > 0 {
                            top += row_height;
                        }
                        out.push((item, Rect::new(left, top + margin.top, full, item.height)));
                        top += outer_height;
                        column = 0;
                        row_height = 0.0;
                        continue;
                    }
                    let x = self.bounds.x + column as f64 * stride + margin.left;
                    out.push((item, Rect::new(x, top + margin.top, cell, item.height)));
                    row_height = row_height.max(outer_height);
                    column += 1;
                    if column == columns {
                        top += row_height;
                        column = 0;
                        row_height = 0.0;
                    }
                }
            }
        }
        out
    }

    fn snapshot(item: &BoardItem, rect: Rect) -> CardSnapshot {
        let mut card = CardSnapshot::new(item.id, rect)
            .with_kind(item.kind)
            .with_blank(item.blank)
            .with_renderable(item.renderable);
        if let Some(group) = &item.group {
            card = card.with_group(group.clone());
        }
        card
    }
}

impl BoardHost for Board {
    fn container_bounds(&self) -> Rect {
        self.bounds
    }

    fn card_geometry(&self, id: CardId) -> Option<Rect> {
        self.rect(id.0)
    }

    fn all_cards(&self) -> Vec<CardSnapshot> {
        let laid_out = self.layout();
        self.items
            .iter()
            .map(|item| {
                let rect = laid_out
                    .iter()
                    .find(|(i, _)| i.id == item.id)
                    .map_or(Rect::default(), |(_, rect)| *rect);
                Self::snapshot(item, rect)
            })
            .collect()
    }

    fn move_item_to_index(&mut self, id: CardId, index: usize) -> Result<(), HostError> {
        self.calls.push(HostCall::MoveItem { card: id, index });
        if self.take_failure(HostOp::Move) {
            return Err(HostError::unavailable("board is read-only"));
        }
        let Some(from) = self.items.iter().position(|i| i.contains(id)) else {
            return Err(HostError::not_found(format!("{id} is not on the board")));
        };
        let item = self.items.remove(from);
        let visible: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.renderable)
            .map(|(pos, _)| pos)
            .collect();
        let at = match visible.get(index) {
            Some(&pos) => pos,
            None if index == visible.len() => visible.last().map_or(self.items.len(), |p| p + 1),
            None => {
                self.items.insert(from, item);
                return Err(HostError::rejected(format!(
                    "index {index} past the end of {} cards",
                    visible.len() + 1
                )));
            }
        };
        self.items.insert(at, item);
        debug!(card = %id, index, "board reordered");
        Ok(())
    }

    fn link_items(&mut self, dragged: &[CardId], target: CardId) -> Result<(), HostError> {
        self.calls.push(HostCall::Link {
            dragged: dragged.to_vec(),
            target,
        });
        if self.take_failure(HostOp::Link) {
            return Err(HostError::rejected("link refused"));
        }
        if dragged.contains(&target) {
            return Err(HostError::rejected("cannot link a card to itself"));
        }
        let Some(target_pos) = self.items.iter().position(|i| i.contains(target)) else {
            return Err(HostError::not_found(format!("{target} is not on the board")));
        };
        let mut members: Vec<CardId> = self.items[target_pos]
            .group
            .as_ref()
            .map_or_else(|| vec![self.items[target_pos].id], |g| g.members().to_vec());
        for id in dragged {
            if !members.contains(id) {
                members.push(*id);
            }
        }
        let target_id = self.items[target_pos].id;
        self.items
            .retain(|i| i.id == target_id || !dragged.iter().any(|id| i.contains(*id)));
        if let Some(item) = self.items.iter_mut().find(|i| i.id == target_id) {
            item.group = CardGroup::new(members);
        }
        Ok(())
    }

    fn save(&mut self) -> Result<(), HostError> {
        self.calls.push(HostCall::Save);
        if self.take_failure(HostOp::Save) {
            return Err(HostError::unavailable("storage offline"));
        }
        self.saves += 1;
        Ok(())
    }

    fn is_editable_region(&self, region: RegionId) -> bool {
        self.editable.contains(&region.0)
    }

    fn is_drag_handle_region(&self, region: RegionId) -> bool {
        self.handles.contains(&region.0)
    }

    fn capture_pointer(&mut self) {
        self.captured = true;
        self.calls.push(HostCall::CapturePointer);
    }

    fn release_pointer_capture(&mut self) {
        self.captured = false;
        self.calls.push(HostCall::ReleasePointerCapture);
    }

    fn set_link_highlight(&mut self, target: Option<CardId>) {
        self.highlight = target;
        self.calls.push(HostCall::Highlight(target));
    }

    fn notify(&mut self, message: UserMessage) {
        self.calls.push(HostCall::Notify(message));
    }
}
