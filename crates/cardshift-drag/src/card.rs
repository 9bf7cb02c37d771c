#![forbid(unsafe_code)]

//! What the host reports about each draggable unit.
//!
//! A [`CardSnapshot`] is one entry of the host's current display order. A
//! linked group of cards is reported as a single snapshot whose `id` is the
//! group's representative; the engine moves, targets, and animates it as one
//! unit and only expands it to its members when asking the host to link.

use cardshift_core::geometry::Rect;
use cardshift_layout::LayoutItem;
use serde::{Deserialize, Serialize};

pub use cardshift_core::event::{CardId, RegionId};

/// Discriminant used to filter link targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Order,
    /// Never a link target for a dragged [`NoteKind::Order`].
    StickyNote,
    #[default]
    Other,
}

/// Cards merged into one visual unit. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CardId>", into = "Vec<CardId>")]
pub struct CardGroup {
    members: Vec<CardId>,
}

impl CardGroup {
    /// A group of `members` in display order. `None` when empty.
    #[must_use]
    pub fn new(members: impl IntoIterator<Item = CardId>) -> Option<Self> {
        let members: Vec<CardId> = members.into_iter().collect();
        if members.is_empty() {
            None
        } else {
            Some(Self { members })
        }
    }

    /// The first member; stands in for the whole group.
    #[must_use]
    pub fn representative(&self) -> CardId {
        self.members[0]
    }

    #[must_use]
    pub fn members(&self) -> &[CardId] {
        &self.members
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.members.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl TryFrom<Vec<CardId>> for CardGroup {
    type Error = &'static str;

    fn try_from(members: Vec<CardId>) -> Result<Self, Self::Error> {
        Self::new(members).ok_or("card group needs at least one member")
    }
}

impl From<CardGroup> for Vec<CardId> {
    fn from(group: CardGroup) -> Self {
        group.members
    }
}

/// One entry of the host's display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub id: CardId,
    /// Layout bounds in container coordinates, without animation offsets.
    pub rect: Rect,
    /// Columns occupied as reported by the host. Placement recomputes this.
    pub span: usize,
    /// Hidden entries are dropped before any geometry is computed.
    pub renderable: bool,
    pub kind: NoteKind,
    /// A placeholder with no content.
    pub blank: bool,
    pub group: Option<CardGroup>,
}

impl CardSnapshot {
    #[must_use]
    pub fn new(id: CardId, rect: Rect) -> Self {
        Self {
            id,
            rect,
            span: 1,
            renderable: true,
            kind: NoteKind::Other,
            blank: false,
            group: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: NoteKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: usize) -> Self {
        self.span = span.max(1);
        self
    }

    #[must_use]
    pub fn with_blank(mut self, blank: bool) -> Self {
        self.blank = blank;
        self
    }

    #[must_use]
    pub fn with_renderable(mut self, renderable: bool) -> Self {
        self.renderable = renderable;
        self
    }

    /// Attach a group; the snapshot takes the group's representative id.
    #[must_use]
    pub fn with_group(mut self, group: CardGroup) -> Self {
        self.id = group.representative();
        self.group = Some(group);
        self
    }

    /// Whether `id` is this card or one of its group members.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.id == id || self.group.as_ref().is_some_and(|g| g.contains(id))
    }

    /// Ids handed to the host when this unit is the drag source.
    #[must_use]
    pub fn dragged_ids(&self) -> Vec<CardId> {
        match &self.group {
            Some(group) => group.members().to_vec(),
            None => vec![self.id],
        }
    }
}

impl LayoutItem for CardSnapshot {
    fn id(&self) -> CardId {
        self.id
    }

    fn rect(&self) -> Rect {
        self.rect
    }
}

/// Keep only the entries that take part in layout.
#[must_use]
pub fn renderable(cards: Vec<CardSnapshot>) -> Vec<CardSnapshot> {
    cards.into_iter().filter(|c| c.renderable).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_group_is_rejected() {
        assert!(CardGroup::new(Vec::new()).is_none());
    }

    #[test]
    fn group_snapshot_uses_representative() {
        let group = CardGroup::new([CardId(7), CardId(3)]).unwrap();
        let card = CardSnapshot::new(CardId(99), Rect::new(0.0, 0.0, 10.0, 10.0)).with_group(group);
        assert_eq!(card.id, CardId(7));
        assert!(card.contains(CardId(3)));
        assert!(!card.contains(CardId(99)));
        assert_eq!(card.dragged_ids(), vec![CardId(7), CardId(3)]);
    }

    #[test]
    fn empty_group_fails_to_deserialize() {
        assert!(serde_json::from_str::<CardGroup>("[]").is_err());
        let group: CardGroup = serde_json::from_str("[4, 5]").unwrap();
        assert_eq!(group.representative(), CardId(4));
    }

    #[test]
    fn single_card_drags_itself() {
        let card = CardSnapshot::new(CardId(1), Rect::default());
        assert_eq!(card.dragged_ids(), vec![CardId(1)]);
    }

    #[test]
    fn renderable_filters_hidden() {
        let cards = vec![
            CardSnapshot::new(CardId(1), Rect::default()),
            CardSnapshot::new(CardId(2), Rect::default()).with_renderable(false),
        ];
        let kept = renderable(cards);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, CardId(1));
    }

    #[test]
    fn span_is_at_least_one() {
        assert_eq!(CardSnapshot::new(CardId(1), Rect::default()).with_span(0).span, 1);
    }
}
