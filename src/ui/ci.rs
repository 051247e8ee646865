//! GitHub Actions workflow commands

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationLevel {
    Warning,
    Error,
}

pub fn github_actions_annotation(
    level: AnnotationLevel,
    message: &str,
    file: Option<&str>,
    line: Option<usize>,
    title: Option<&str>,
) -> String {
    let level_str = match level {
        AnnotationLevel::Warning => "warning",
        AnnotationLevel::Error => "error",
    };

    let mut props = Vec::new();
    if let Some(file) = file {
        props.push(format!("file={}", escape_property(file)));
    }
    if let Some(line) = line {
        props.push(format!("line={}", line));
    }
    if let Some(title) = title {
        props.push(format!("title={}", escape_property(title)));
    }

    let prop_str = if props.is_empty() {
        String::new()
    } else {
        format!(" {}", props.join(","))
    };

    format!("::{}{}::{}", level_str, prop_str, escape_data(message))
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

// Properties additionally reserve ':' and ','.
fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_escapes_newlines() {
        let rendered = github_actions_annotation(
            AnnotationLevel::Error,
            "Line1\nLine2",
            Some("flow-typed/a.js.flow"),
            Some(3),
            Some("DriftError"),
        );
        assert_eq!(
            rendered,
            "::error file=flow-typed/a.js.flow,line=3,title=DriftError::Line1%0ALine2"
        );
    }

    #[test]
    fn annotation_without_properties() {
        let rendered =
            github_actions_annotation(AnnotationLevel::Warning, "50% done", None, None, None);
        assert_eq!(rendered, "::warning::50%25 done");
    }

    #[test]
    fn annotation_escapes_property_separators() {
        let rendered = github_actions_annotation(
            AnnotationLevel::Error,
            "x",
            Some("C:\\a,b"),
            None,
            None,
        );
        assert!(rendered.starts_with("::error file=C%3A\\a%2Cb::"));
    }
}
