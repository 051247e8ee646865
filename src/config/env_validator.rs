//! Environment variable validation with helpful error messages
//!
//! Invalid values never abort a run: the variable is ignored, a warning is
//! written, and the closest valid spelling is suggested when there is one.

use std::io::Write;

/// Validator for environment variable values
pub struct EnvVarValidator<'a> {
    var_name: &'a str,
    valid_values: &'a [&'a str],
}

impl<'a> EnvVarValidator<'a> {
    pub fn new(var_name: &'a str, valid_values: &'a [&'a str]) -> Self {
        Self {
            var_name,
            valid_values,
        }
    }

    /// Parse a value, warning on stderr and returning `None` if invalid
    pub fn parse<T, F>(&self, value: &str, parser: F) -> Option<T>
    where
        F: Fn(&str) -> Option<T>,
    {
        self.parse_with_writer(value, parser, &mut std::io::stderr())
    }

    /// Parse with a custom writer (for testing)
    pub fn parse_with_writer<T, F, W>(&self, value: &str, parser: F, writer: &mut W) -> Option<T>
    where
        F: Fn(&str) -> Option<T>,
        W: Write,
    {
        let parsed = parser(value);
        if parsed.is_none() {
            let _ = writeln!(
                writer,
                "Warning: Invalid {} value '{}'{}",
                self.var_name,
                value,
                self.suggest(value)
            );
            if !self.valid_values.is_empty() {
                let _ = writeln!(writer, "Valid values: {}", self.valid_values.join(", "));
            }
        }
        parsed
    }

    fn suggest(&self, value: &str) -> String {
        match closest(&value.to_lowercase(), self.valid_values) {
            Some(suggested) => format!(". Did you mean '{}'?", suggested),
            None => String::new(),
        }
    }
}

/// The candidate within two edits of `input`, if any
pub fn closest<'c>(input: &str, candidates: &[&'c str]) -> Option<&'c str> {
    let mut best: Option<(&str, usize)> = None;
    for &candidate in candidates {
        let dist = levenshtein(input, candidate);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((candidate, dist)),
        }
    }
    match best {
        Some((candidate, dist)) if dist <= 2 && dist > 0 => Some(candidate),
        _ => None,
    }
}

/// Levenshtein distance over bytes
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    if a_bytes.is_empty() {
        return b_bytes.len();
    }
    if b_bytes.is_empty() {
        return a_bytes.len();
    }

    let mut prev_row: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr_row: Vec<usize> = vec![0; b_bytes.len() + 1];

    for (i, a_char) in a_bytes.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b_bytes.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_bytes.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_typos() {
        assert_eq!(levenshtein("test", "test"), 0);
        assert_eq!(levenshtein("alwys", "always"), 1);
        assert_eq!(levenshtein("nevre", "never"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn test_env_validator_valid_value() {
        let validator = EnvVarValidator::new("TSFLOW_COLOR", &["auto", "always", "never"]);
        let mut output = Vec::new();
        let result = validator.parse_with_writer("auto", |s| (s == "auto").then_some(1), &mut output);
        assert_eq!(result, Some(1));
        assert!(output.is_empty());
    }

    #[test]
    fn test_env_validator_warning_suggests_correction() {
        let validator = EnvVarValidator::new("TSFLOW_COLOR", &["auto", "always", "never"]);
        let mut output = Vec::new();
        let result: Option<()> = validator.parse_with_writer("alwys", |_| None, &mut output);
        assert_eq!(result, None);

        let msg = String::from_utf8(output).unwrap();
        assert!(msg.contains("Warning: Invalid TSFLOW_COLOR value 'alwys'"));
        assert!(msg.contains("Did you mean 'always'?"), "{}", msg);
        assert!(msg.contains("Valid values: auto, always, never"), "{}", msg);
    }

    #[test]
    fn test_env_validator_no_suggestion_for_distant_value() {
        let validator = EnvVarValidator::new("TSFLOW_KEEP_TEMP", &["true", "false"]);
        let mut output = Vec::new();
        let _: Option<()> =
            validator.parse_with_writer("something_completely_different", |_| None, &mut output);

        let msg = String::from_utf8(output).unwrap();
        assert!(!msg.contains("Did you mean"), "{}", msg);
    }
}
