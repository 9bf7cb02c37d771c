#![forbid(unsafe_code)]

//! What the controller needs from the board that owns the cards.
//!
//! The engine owns no storage and no visuals. Geometry, hit classification,
//! ordering, persistence, and messaging all go through [`BoardHost`].
//!
//! # Contract
//!
//! - Geometry is layout geometry: rectangles never include the offsets
//!   applied through the [`AnimationDriver`](crate::AnimationDriver).
//! - `move_item_to_index` is synchronous. The next geometry read must
//!   already reflect the new order.
//! - Indices count renderable entries of [`BoardHost::all_cards`] only.
//! - `link_items` and `save` are fire-and-forget: returning `Ok` means the
//!   request was accepted. Hosts with real asynchrony queue internally.

use cardshift_core::geometry::Rect;

use crate::card::{CardId, CardSnapshot, RegionId};
use crate::error::{HostError, UserMessage};

/// Host-side collaborator of [`DragController`](crate::DragController).
pub trait BoardHost {
    /// Bounds of the scrollable card container, in container coordinates.
    fn container_bounds(&self) -> Rect;

    /// Layout bounds of one card (or group representative).
    fn card_geometry(&self, id: CardId) -> Option<Rect>;

    /// Every card and group in display order.
    fn all_cards(&self) -> Vec<CardSnapshot>;

    /// Move `id` so it ends up at `index`.
    fn move_item_to_index(&mut self, id: CardId, index: usize) -> Result<(), HostError>;

    /// Merge `dragged` into `target`.
    fn link_items(&mut self, dragged: &[CardId], target: CardId) -> Result<(), HostError>;

    /// Persist the current order.
    fn save(&mut self) -> Result<(), HostError>;

    /// The region hosts an embedded text editor; presses there are not drags.
    fn is_editable_region(&self, _region: RegionId) -> bool {
        false
    }

    /// The region runs its own drag gesture; presses there are not card drags
    /// unless a link modifier is held.
    fn is_drag_handle_region(&self, _region: RegionId) -> bool {
        false
    }

    /// Route all pointer input to the board until released.
    fn capture_pointer(&mut self) {}

    fn release_pointer_capture(&mut self) {}

    /// Show (or clear, with `None`) the link-target highlight.
    fn set_link_highlight(&mut self, _target: Option<CardId>) {}

    /// Show a dismissible message.
    fn notify(&mut self, message: UserMessage);
}
