//! Color styling for CLI output.
//!
//! Only actionable states get color: active statuses and the two highest
//! priorities. Terminal lifecycle states render dimmed, everything else as
//! standard text.

use owo_colors::OwoColorize;
use shirokuma_core::enums::Priority;

use crate::terminal::supports_color;

const ACTIVE: (u8, u8, u8) = (0xff, 0xb4, 0x54); // yellow
const DONE: (u8, u8, u8) = (0x80, 0x90, 0xa0); // dimmed
const CRITICAL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // red
const HIGH: (u8, u8, u8) = (0xff, 0x8f, 0x40); // orange

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

/// Renders a status name, coloring active work and dimming closed states.
pub fn render_status(name: &str, is_closable: bool) -> String {
    if is_closable {
        color_str(name, DONE)
    } else if name == "In Progress" || name == "Review" || name == "Testing" {
        color_str(name, ACTIVE)
    } else {
        name.to_owned()
    }
}

/// Renders a priority label; only CRITICAL and HIGH get color.
pub fn render_priority(priority: Priority) -> String {
    match priority {
        Priority::Critical => color_str(priority.as_str(), CRITICAL),
        Priority::High => color_str(priority.as_str(), HIGH),
        _ => priority.as_str().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_when_color_unsupported() {
        // Test runners are not TTYs, so output falls back to plain text.
        unsafe { std::env::set_var("NO_COLOR", "1") };
        assert_eq!(render_status("Open", false), "Open");
        assert_eq!(render_priority(Priority::Medium), "MEDIUM");
        assert_eq!(render_priority(Priority::Critical), "CRITICAL");
        unsafe { std::env::remove_var("NO_COLOR") };
    }
}
