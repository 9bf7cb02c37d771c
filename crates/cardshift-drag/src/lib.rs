#![forbid(unsafe_code)]

//! Drag-to-reorder engine for card boards.
//!
//! The host feeds pointer and key input into a [`DragController`]; the
//! controller reads geometry through [`BoardHost`], proposes single-position
//! moves back to it, and describes card motion to an [`AnimationDriver`].
//!
//! # Module map
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`card`] | [`CardSnapshot`], [`CardGroup`], [`NoteKind`] |
//! | [`host`] | [`BoardHost`] |
//! | [`animator`] | [`AnimationDriver`], [`AnimationScheduler`] |
//! | [`swap`] | [`SwapReorderEngine`] |
//! | [`session`] | [`DragSession`], [`DragPhase`], [`DragMode`] |
//! | [`controller`] | [`DragController`] and its transition types |
//! | [`config`] | [`DragConfig`] |
//! | [`error`] | [`DragError`], [`HostError`], [`UserMessage`] |

pub mod animator;
pub mod card;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod session;
pub mod swap;

pub use animator::{AnimationCompletion, AnimationDriver, AnimationScheduler, OffsetAnimation};
pub use card::{CardGroup, CardId, CardSnapshot, NoteKind, RegionId};
pub use config::{ConfigError, DragConfig, ReorderStrategy};
pub use controller::{
    CancelReason, DragController, DragEffect, DragTransition, NoopReason, RejectReason,
};
pub use error::{DragError, HostError, HostErrorKind, Severity, UserMessage};
pub use host::BoardHost;
pub use session::{DragMode, DragPhase, DragSession, PendingPress, Settling};
pub use swap::{NeighborShift, SwapDecision, SwapRejection, SwapReorderEngine};
