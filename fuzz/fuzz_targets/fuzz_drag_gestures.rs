#![no_main]

use arbitrary::Arbitrary;
use cardshift_core::event::{DragInput, KeyCode, KeyEventKind, Modifiers};
use cardshift_core::geometry::Sides;
use cardshift_harness::{Board, DragRig, FailMode, HostOp};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Step {
    Press { card: u8, link: bool },
    Move { dx: i16, dy: i16 },
    Release,
    Escape,
    Ctrl { down: bool },
    CaptureLost,
    FocusLost,
    Wait { frames: u8 },
    Fail { op: u8 },
}

#[derive(Debug, Arbitrary)]
struct Script {
    count: u8,
    grid: bool,
    steps: Vec<Step>,
}

fuzz_target!(|script: Script| {
    let count = u64::from(script.count % 12) + 1;
    let board = if script.grid {
        Board::grid(600.0, 3, count, 90.0)
    } else {
        Board::stack(300.0, count, 70.0)
    }
    .with_margin(Sides::vertical(4.0));
    let mut rig = DragRig::new(board);

    for step in script.steps.into_iter().take(256) {
        match step {
            Step::Press { card, link } => {
                let modifiers = if link { Modifiers::CTRL } else { Modifiers::NONE };
                rig.press_on_with(u64::from(card) % count + 1, modifiers);
            }
            Step::Move { dx, dy } => {
                rig.move_by(f64::from(dx), f64::from(dy));
            }
            Step::Release => {
                rig.release();
            }
            Step::Escape => {
                rig.escape();
            }
            Step::Ctrl { down } => {
                let (kind, modifiers) = if down {
                    (KeyEventKind::Press, Modifiers::CTRL)
                } else {
                    (KeyEventKind::Release, Modifiers::NONE)
                };
                rig.key(KeyCode::Control, kind, modifiers);
            }
            Step::CaptureLost => {
                rig.lose_capture();
            }
            Step::FocusLost => {
                rig.send(DragInput::FocusLost);
            }
            Step::Wait { frames } => {
                for _ in 0..frames % 32 {
                    rig.step(cardshift_harness::FRAME);
                }
            }
            Step::Fail { op } => {
                let op = match op % 3 {
                    0 => HostOp::Move,
                    1 => HostOp::Link,
                    _ => HostOp::Save,
                };
                rig.board_mut().fail(op, FailMode::Once);
            }
        }
    }

    rig.board_mut().heal();
    rig.release();
    rig.escape();
    assert!(rig.settle(), "gesture never settled");
    assert!(!rig.board().is_captured());
});
