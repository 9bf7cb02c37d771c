#![forbid(unsafe_code)]

//! Core: geometry, input events, and animation primitives.
//!
//! # Role in cardshift
//! `cardshift-core` is the framework-free bottom layer. It knows nothing
//! about cards, boards, or any particular UI toolkit; it only defines the
//! numeric vocabulary the layout solvers and the drag engine speak.
//!
//! # Primary responsibilities
//! - **Geometry**: `Rect`, `Point`, `Size`, `Offset`, `Sides` in container-local units.
//! - **Input**: pointer and key events with modifier snapshots, already hit-tested
//!   by the host.
//! - **Animation**: easing curves, springs, tweens, and stagger schedules.
//!
//! # How it fits in the system
//! `cardshift-layout` turns card rectangles into slot assignments,
//! `cardshift-drag` turns input events into ordering mutations and animation
//! requests. Both depend on this crate and nothing above it.

pub mod animation;
pub mod event;
pub mod geometry;
pub mod logging;

pub use web_time::Instant;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
