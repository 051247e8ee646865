use tsflow::config::ConfigWarning;

use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;

pub fn print_config_warnings(ui: &UiContext, warnings: &[ConfigWarning]) {
    if ui.json {
        return;
    }
    for warning in warnings {
        eprintln!("{} {}", Icon::Warning.colored(ui.color, ui.unicode), warning);
    }
}
