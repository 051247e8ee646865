use crossterm::style::Color;

/// Design tokens for tsflow output.
///
/// Only 5 semantic colors; every icon is sourced from this module.
pub mod colors {
    use super::Color;

    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const WARNING: Color = Color::Yellow;
    pub const INFO: Color = Color::Cyan;
    pub const DIM: Color = Color::DarkGrey;
}

pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const ARROW: &str = "↳";
    pub const GENERATE: &str = "⚙";
    pub const VERIFY: &str = "🔍";
    pub const DIFF: &str = "Δ";
}

pub mod icons_ascii {
    pub const SUCCESS: &str = "[OK]";
    pub const ERROR: &str = "[FAIL]";
    pub const WARNING: &str = "[WARN]";
    pub const ARROW: &str = "[>]";
    pub const GENERATE: &str = "[GENERATE]";
    pub const VERIFY: &str = "[VERIFY]";
    pub const DIFF: &str = "[DIFF]";
}
