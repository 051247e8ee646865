//! Opening lines of a run: mode, output directory and package count

use std::path::Path;

use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

#[derive(Debug, Clone)]
pub struct RunHeader {
    verify: bool,
    out_dir: String,
    packages: usize,
}

impl RunHeader {
    pub fn new(verify: bool, out_dir: &Path, packages: usize) -> Self {
        Self {
            verify,
            out_dir: out_dir.display().to_string(),
            packages,
        }
    }

    fn mode(&self) -> (Icon, &'static str) {
        if self.verify {
            (Icon::Verify, "tsflow verify")
        } else {
            (Icon::Generate, "tsflow generate")
        }
    }

    pub fn render(&self, supports_color: bool, supports_unicode: bool) -> String {
        let (icon, title) = self.mode();
        let noun = if self.packages == 1 { "package" } else { "packages" };
        format!(
            "{} {}\n{}  {} {}\n",
            icon.colored(supports_color, supports_unicode),
            ColoredText::info(title).bold().render(supports_color),
            ColoredText::dim(format!("{}/", self.out_dir.trim_end_matches('/')))
                .render(supports_color),
            self.packages,
            noun
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_verify_header_in_ascii() {
        let header = RunHeader::new(true, Path::new("flow-typed"), 2);
        assert_eq!(
            header.render(false, false),
            "[VERIFY] tsflow verify\nflow-typed/  2 packages\n"
        );
    }

    #[test]
    fn singular_package_count() {
        let header = RunHeader::new(false, Path::new("out/"), 1);
        assert_eq!(
            header.render(false, false),
            "[GENERATE] tsflow generate\nout/  1 package\n"
        );
    }
}
