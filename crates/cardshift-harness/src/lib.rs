#![forbid(unsafe_code)]

//! Test support for cardshift.
//!
//! - [`Board`]: an in-memory [`BoardHost`](cardshift_drag::BoardHost) with
//!   stack and grid flows, call recording, and failure injection.
//! - [`ManualClock`]: time that only moves when told to.
//! - [`DragRig`]: a controller wired to a board and a clock, driven by
//!   scripted pointer and key input, with a JSONL transcript of every
//!   transition.

pub mod board;
pub mod clock;
pub mod rig;

pub use board::{Board, BoardItem, FailMode, Flow, HostCall, HostOp};
pub use clock::ManualClock;
pub use rig::{DragRig, FRAME};
