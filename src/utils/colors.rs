//! ANSI color helper utilities for terminal output.

use crate::models::event_kind::EventKind;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

/// Row colour for an event in `list`/`dump`:
/// high water → blue, low water → cyan, currents → green,
/// sun → yellow, moon → magenta, unknown → grey.
pub fn color_for_kind(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::HighTide => BLUE,
        EventKind::LowTide => CYAN,
        EventKind::MaxFloodCurrent | EventKind::MaxEbbCurrent | EventKind::SlackTide => GREEN,
        EventKind::Sunrise | EventKind::Sunset => YELLOW,
        EventKind::Unknown(_) => GREY,
        _ => MAGENTA,
    }
}
