#![forbid(unsafe_code)]

//! Canonical input types fed to the drag engine.
//!
//! The host translates its toolkit's pointer and keyboard events into these
//! types. Hit testing happens on the host side: a [`PointerEvent`] already
//! carries the card (and nested region) under the pointer, so the engine
//! never walks a visual tree.
//!
//! # Design Notes
//!
//! - Coordinates are container-local, the same space as card rectangles.
//! - `Modifiers` use bitflags for easy combination.
//! - Capture loss and focus loss are distinct inputs; both end a drag.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Stable identity of one card.
///
/// Identity survives reorders; the rectangle does not belong to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u64);

impl CardId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

/// Identity of a nested interactive region inside a card (a text field, a
/// sub-drag handle, ...). Only the host knows what each region is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u64);

/// What the host found under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitTarget {
    /// Card (or group representative) under the pointer.
    pub card: Option<CardId>,
    /// Innermost region under the pointer, if any.
    pub region: Option<RegionId>,
}

impl HitTarget {
    /// Nothing under the pointer.
    pub const NONE: Self = Self {
        card: None,
        region: None,
    };

    /// Hit on a card body.
    #[must_use]
    pub const fn card(id: CardId) -> Self {
        Self {
            card: Some(id),
            region: None,
        }
    }

    /// Hit on a nested region of a card.
    #[must_use]
    pub const fn region(id: CardId, region: RegionId) -> Self {
        Self {
            card: Some(id),
            region: Some(region),
        }
    }
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Pointer event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Press,
    Move,
    Release,
}

/// A pointer event in container-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    pub hit: HitTarget,
}

impl PointerEvent {
    /// Primary-button event with no modifiers and no hit target.
    #[must_use]
    pub const fn new(kind: PointerEventKind, position: Point) -> Self {
        Self {
            kind,
            position,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            hit: HitTarget::NONE,
        }
    }

    /// Primary press at `position` on `hit`.
    #[must_use]
    pub const fn press(position: Point, hit: HitTarget) -> Self {
        Self::new(PointerEventKind::Press, position).with_hit(hit)
    }

    /// Pointer move to `position`.
    #[must_use]
    pub const fn moved(position: Point) -> Self {
        Self::new(PointerEventKind::Move, position)
    }

    /// Primary release at `position`.
    #[must_use]
    pub const fn release(position: Point) -> Self {
        Self::new(PointerEventKind::Release, position)
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub const fn with_hit(mut self, hit: HitTarget) -> Self {
        self.hit = hit;
        self
    }
}

/// Keys the drag engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    /// Either Control key.
    Control,
    /// Either Meta/Command/Super key.
    Meta,
    Shift,
    Alt,
    /// Anything else; ignored by the engine.
    Other,
}

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Release,
}

/// A keyboard event.
///
/// `modifiers` is the modifier state *after* the event was applied, so a
/// release of Control carries a snapshot without `CTRL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub kind: KeyEventKind,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Key press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            kind: KeyEventKind::Press,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether this event changes modifier state.
    #[must_use]
    pub const fn is_modifier(&self) -> bool {
        matches!(
            self.code,
            KeyCode::Control | KeyCode::Meta | KeyCode::Shift | KeyCode::Alt
        )
    }
}

/// Everything the drag controller consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragInput {
    Pointer(PointerEvent),
    Key(KeyEvent),
    /// Pointer capture was taken away by the platform.
    CaptureLost,
    /// The hosting window lost focus.
    FocusLost,
}

impl From<PointerEvent> for DragInput {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

impl From<KeyEvent> for DragInput {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_combine() {
        let mods = Modifiers::CTRL | Modifiers::SHIFT;
        assert!(mods.contains(Modifiers::CTRL));
        assert!(mods.intersects(Modifiers::CTRL | Modifiers::SUPER));
        assert!(!mods.contains(Modifiers::SUPER));
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn pointer_builders() {
        let ev = PointerEvent::press(Point::new(1.0, 2.0), HitTarget::card(CardId(7)))
            .with_modifiers(Modifiers::CTRL);
        assert_eq!(ev.kind, PointerEventKind::Press);
        assert_eq!(ev.hit.card, Some(CardId(7)));
        assert_eq!(ev.hit.region, None);
        assert_eq!(ev.modifiers, Modifiers::CTRL);
        assert_eq!(ev.button, PointerButton::Primary);
    }

    #[test]
    fn key_modifier_classification() {
        assert!(KeyEvent::new(KeyCode::Control).is_modifier());
        assert!(KeyEvent::new(KeyCode::Meta).is_modifier());
        assert!(!KeyEvent::new(KeyCode::Escape).is_modifier());
        assert!(!KeyEvent::new(KeyCode::Other).is_modifier());
    }

    #[test]
    fn card_id_display() {
        assert_eq!(CardId(42).to_string(), "card#42");
    }

    #[test]
    fn drag_input_from_conversions() {
        let input: DragInput = KeyEvent::new(KeyCode::Escape).into();
        assert!(matches!(input, DragInput::Key(k) if k.code == KeyCode::Escape));
        let input: DragInput = PointerEvent::moved(Point::ORIGIN).into();
        assert!(matches!(input, DragInput::Pointer(_)));
    }
}
