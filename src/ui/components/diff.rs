use crossterm::style::Stylize;
use similar::{ChangeTag, TextDiff};

use crate::ui::theme;

/// Lines of unchanged context around each hunk
const CONTEXT_LINES: usize = 3;

/// Unified diff from the committed file to the freshly generated one
pub fn render_drift_diff(path: &str, existing: &str, generated: &str, supports_color: bool) -> String {
    let diff = TextDiff::from_lines(existing, generated);
    let width = existing
        .lines()
        .count()
        .max(generated.lines().count())
        .max(1)
        .to_string()
        .len();

    let mut out = String::new();
    push_line(&mut out, &format!("--- a/{}", path), Style::Header, supports_color);
    push_line(&mut out, &format!("+++ b/{}", path), Style::Header, supports_color);

    for (idx, group) in diff.grouped_ops(CONTEXT_LINES).iter().enumerate() {
        if idx > 0 {
            push_line(&mut out, "...", Style::Header, supports_color);
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (old_no, new_no, sign) = match change.tag() {
                    ChangeTag::Delete => (change.old_index(), None, "-"),
                    ChangeTag::Insert => (None, change.new_index(), "+"),
                    ChangeTag::Equal => (change.old_index(), change.new_index(), " "),
                };
                let column = |n: Option<usize>| {
                    n.map(|i| format!("{:>width$}", i + 1, width = width))
                        .unwrap_or_else(|| " ".repeat(width))
                };
                let line = format!(
                    "{} {} {} {}",
                    column(old_no),
                    column(new_no),
                    sign,
                    change.value().trim_end_matches('\n')
                );
                push_line(&mut out, &line, Style::Change(change.tag()), supports_color);
            }
        }
    }

    out
}

#[derive(Debug, Clone, Copy)]
enum Style {
    Header,
    Change(ChangeTag),
}

fn push_line(out: &mut String, s: &str, style: Style, supports_color: bool) {
    if supports_color {
        let color = match style {
            Style::Header => theme::colors::INFO,
            Style::Change(ChangeTag::Delete) => theme::colors::ERROR,
            Style::Change(ChangeTag::Insert) => theme::colors::SUCCESS,
            Style::Change(ChangeTag::Equal) => theme::colors::DIM,
        };
        out.push_str(&format!("{}", s.with(color)));
    } else {
        out.push_str(s);
    }
    out.push('\n');
}
