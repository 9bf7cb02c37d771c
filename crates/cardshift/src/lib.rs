#![forbid(unsafe_code)]

//! cardshift public facade.
//!
//! Re-exports the types a host needs to wire a board to the drag engine and
//! offers a prelude for day-to-day use. The layered crates stay reachable
//! under [`core`], [`layout`], and [`drag`].

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use cardshift_core::animation::{Easing, StaggerMode};
pub use cardshift_core::event::{
    CardId, DragInput, HitTarget, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerButton,
    PointerEvent, PointerEventKind, RegionId,
};
pub use cardshift_core::geometry::{Axis, Offset, Point, Rect, Sides, Size};
pub use cardshift_core::Instant;

// --- Layout re-exports -----------------------------------------------------

pub use cardshift_layout::{
    GridLayout, GridPlacementSolver, LayoutConfig, LayoutItem, Placement,
    calculate_insertion_index, move_target,
};

// --- Drag re-exports -------------------------------------------------------

pub use cardshift_drag::{
    AnimationDriver, AnimationScheduler, BoardHost, CancelReason, CardGroup, CardSnapshot,
    ConfigError, DragConfig, DragController, DragEffect, DragError, DragMode, DragPhase,
    DragTransition, HostError, HostErrorKind, NoopReason, NoteKind, OffsetAnimation,
    RejectReason, ReorderStrategy, Severity, SwapReorderEngine, UserMessage,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error for hosts that funnel every cardshift failure into one type.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// A drag gesture failed.
    Drag(DragError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Drag(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Drag(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<DragError> for Error {
    fn from(err: DragError) -> Self {
        Self::Drag(err)
    }
}

/// Standard result type for cardshift APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Controller for `config`, rejecting invalid settings.
pub fn controller(config: DragConfig) -> Result<DragController> {
    Ok(DragController::try_new(config)?)
}

/// Controller configured from a TOML document.
#[cfg(feature = "config")]
pub fn controller_from_toml(source: &str) -> Result<DragController> {
    controller(DragConfig::from_toml_str(source)?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BoardHost, CardId, CardSnapshot, DragConfig, DragController, DragEffect, DragInput,
        DragMode, DragPhase, Error, HitTarget, HostError, Instant, KeyCode, KeyEvent, Modifiers,
        NoteKind, Offset, Point, PointerEvent, Rect, Result, UserMessage,
    };

    pub use crate::{core, drag, layout};
}

pub use cardshift_core as core;
pub use cardshift_drag as drag;
#[cfg(feature = "harness")]
pub use cardshift_harness as harness;
pub use cardshift_layout as layout;
