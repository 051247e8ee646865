//! Declaration file lexer
//!
//! Produces a flat token stream. Punctuation is deliberately coarse: apart
//! from `=>` and `...` every symbol is its own token, so generic closers
//! like `>>` never need to be split by the parser.

use super::SyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    /// Single or double quoted string literal (raw text, quotes included)
    Str,
    /// Template literal including any `${}` substitutions
    Template,
    Number,
    BigInt,
    Punct,
    /// `/** ... */`
    DocComment,
    /// `/// <reference ... />`
    Directive,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    pub line: usize,
    pub column: usize,
    /// A line break separates this token from the previous one
    pub newline_before: bool,
}

impl Token {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }

    pub fn is_punct(&self, source: &str, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text(source) == punct
    }

    pub fn is_ident(&self, source: &str, ident: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(source) == ident
    }
}

/// Tokenize a whole source file; the last token is always `Eof`
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    saw_newline: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            saw_newline: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.saw_newline = true;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn bump_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        loop {
            self.bump_while(|c| c.is_whitespace() || c == '\u{feff}');

            let (start, line, column) = (self.pos, self.line, self.column);
            let Some(c) = self.peek() else {
                return Ok(self.token(TokenKind::Eof, start, line, column));
            };

            let kind = match c {
                '/' if self.peek_nth(1) == Some('/') => {
                    let is_directive = self
                        .rest()
                        .strip_prefix("///")
                        .is_some_and(|after| after.trim_start().starts_with("<reference"));
                    self.bump_while(|c| c != '\n');
                    if !is_directive {
                        continue;
                    }
                    TokenKind::Directive
                }
                '/' if self.peek_nth(1) == Some('*') => {
                    let is_doc = self.rest().starts_with("/**") && !self.rest().starts_with("/**/");
                    self.block_comment(line, column)?;
                    if !is_doc {
                        continue;
                    }
                    TokenKind::DocComment
                }
                '"' | '\'' => {
                    self.string(c, line, column)?;
                    TokenKind::Str
                }
                '`' => {
                    self.template(line, column)?;
                    TokenKind::Template
                }
                '0'..='9' => self.number(),
                '.' if self.peek_nth(1).is_some_and(|d| d.is_ascii_digit()) => self.number(),
                c if is_ident_start(c) => {
                    self.bump();
                    self.bump_while(is_ident_part);
                    TokenKind::Ident
                }
                '=' if self.peek_nth(1) == Some('>') => {
                    self.bump();
                    self.bump();
                    TokenKind::Punct
                }
                '.' if self.rest().starts_with("...") => {
                    self.bump();
                    self.bump();
                    self.bump();
                    TokenKind::Punct
                }
                c if c.is_ascii_punctuation() => {
                    self.bump();
                    TokenKind::Punct
                }
                other => {
                    return Err(SyntaxError::new(
                        line,
                        column,
                        format!("unexpected character '{}'", other.escape_debug()),
                    ))
                }
            };
            return Ok(self.token(kind, start, line, column));
        }
    }

    fn token(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) -> Token {
        let newline_before = std::mem::take(&mut self.saw_newline);
        Token {
            kind,
            start,
            end: self.pos,
            line,
            column,
            newline_before,
        }
    }

    fn block_comment(&mut self, line: usize, column: usize) -> Result<(), SyntaxError> {
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(SyntaxError::new(line, column, "unterminated comment")),
            }
        }
    }

    fn string(&mut self, quote: char, line: usize, column: usize) -> Result<(), SyntaxError> {
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => return Ok(()),
                Some('\n') | None => {
                    return Err(SyntaxError::new(line, column, "unterminated string literal"))
                }
                Some(_) => {}
            }
        }
    }

    fn template(&mut self, line: usize, column: usize) -> Result<(), SyntaxError> {
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('`') => return Ok(()),
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    self.substitution(line, column)?;
                }
                Some(_) => {}
                None => {
                    return Err(SyntaxError::new(line, column, "unterminated template literal"))
                }
            }
        }
    }

    /// Skip a `${ ... }` body, honouring nested braces, strings and templates
    fn substitution(&mut self, line: usize, column: usize) -> Result<(), SyntaxError> {
        let mut depth = 1usize;
        while depth > 0 {
            let (l, c) = (self.line, self.column);
            match self.peek() {
                Some('{') => {
                    self.bump();
                    depth += 1;
                }
                Some('}') => {
                    self.bump();
                    depth -= 1;
                }
                Some(q @ ('"' | '\'')) => self.string(q, l, c)?,
                Some('`') => self.template(l, c)?,
                Some(_) => {
                    self.bump();
                }
                None => {
                    return Err(SyntaxError::new(line, column, "unterminated template literal"))
                }
            }
        }
        Ok(())
    }

    fn number(&mut self) -> TokenKind {
        let radix_prefix = self.peek() == Some('0')
            && matches!(
                self.peek_nth(1),
                Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')
            );
        if radix_prefix {
            self.bump();
            self.bump();
            self.bump_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else {
            self.bump_while(|c| c.is_ascii_digit() || c == '_');
            if self.peek() == Some('.') && self.peek_nth(1) != Some('.') {
                self.bump();
                self.bump_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let signed = matches!(self.peek_nth(1), Some('+' | '-'));
                let digit_at = if signed { 2 } else { 1 };
                if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                    if signed {
                        self.bump();
                    }
                    self.bump_while(|c| c.is_ascii_digit() || c == '_');
                }
            }
        }
        if self.peek() == Some('n') {
            self.bump();
            TokenKind::BigInt
        } else {
            TokenKind::Number
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$' || c == '#'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\u{200c}' || c == '\u{200d}'
}

/// Decode a quoted string literal into its value
pub fn unquote(raw: &str) -> String {
    let mut chars = raw.chars();
    let quote = chars.next();
    let mut body: Vec<char> = chars.collect();
    if body.last().copied() == quote {
        body.pop();
    }

    let mut out = String::with_capacity(body.len());
    let mut iter = body.into_iter().peekable();
    while let Some(c) = iter.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match iter.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some('x') => {
                let hex: String = iter.by_ref().take(2).collect();
                push_code_point(&mut out, &hex);
            }
            Some('u') => {
                let hex: String = if iter.peek() == Some(&'{') {
                    iter.next();
                    iter.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    iter.by_ref().take(4).collect()
                };
                push_code_point(&mut out, &hex);
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_code_point(out: &mut String, hex: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => out.push('\u{fffd}'),
    }
}

/// Render a value as a double-quoted string literal
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds_and_text(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| (t.kind, t.text(source).to_string()))
            .collect()
    }

    #[test]
    fn punctuation_is_split_except_arrow_and_spread() {
        let tokens = kinds_and_text("Map<A, B<C>>; (...x) => y");
        let texts: Vec<&str> = tokens.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Map", "<", "A", ",", "B", "<", "C", ">", ">", ";", "(", "...", "x", ")", "=>", "y"]
        );
    }

    #[test]
    fn keeps_doc_comments_and_directives_but_skips_other_comments() {
        let source = "/// <reference types=\"node\" />\n// plain\n/* block */\n/** Docs */\nexport {};";
        let tokens = kinds_and_text(source);
        assert_eq!(tokens[0].0, TokenKind::Directive);
        assert_eq!(tokens[0].1, "/// <reference types=\"node\" />");
        assert_eq!(tokens[1], (TokenKind::DocComment, "/** Docs */".to_string()));
        assert_eq!(tokens[2], (TokenKind::Ident, "export".to_string()));
    }

    #[test]
    fn template_literals_with_nested_substitutions_are_one_token() {
        let tokens = kinds_and_text("type T = `a-${`b${'}'}`}-c`;");
        assert_eq!(tokens[3], (TokenKind::Template, "`a-${`b${'}'}`}-c`".to_string()));
        assert_eq!(tokens[4].1, ";");
    }

    #[test]
    fn numbers_and_bigints() {
        let tokens = kinds_and_text("0xFF 1_000 1.5e-3 10n .5");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Number, "0xFF".to_string()),
                (TokenKind::Number, "1_000".to_string()),
                (TokenKind::Number, "1.5e-3".to_string()),
                (TokenKind::BigInt, "10n".to_string()),
                (TokenKind::Number, ".5".to_string()),
            ]
        );
    }

    #[test]
    fn private_names_are_identifiers() {
        let tokens = kinds_and_text("#private;");
        assert_eq!(tokens[0], (TokenKind::Ident, "#private".to_string()));
    }

    #[test]
    fn tracks_line_column_and_newlines() {
        let source = "a\n  b";
        let tokens = tokenize(source).unwrap();
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
        assert!(tokens[1].newline_before);
        assert!(!tokens[0].newline_before);
    }

    #[test]
    fn reports_unterminated_string_position() {
        let err = tokenize("let a: 'x\n").unwrap_err();
        assert_eq!((err.line, err.column), (1, 8));
        assert_eq!(err.message, "unterminated string literal");
    }

    #[test]
    fn reports_unterminated_comment() {
        let err = tokenize("/* never closed").unwrap_err();
        assert_eq!(err.message, "unterminated comment");
    }

    #[test]
    fn unquote_decodes_escapes() {
        assert_eq!(unquote(r#""a\"b""#), "a\"b");
        assert_eq!(unquote(r"'\x41B\u{43}\n'"), "ABC\n");
        assert_eq!(unquote("'./util'"), "./util");
    }

    #[test]
    fn quote_escapes_for_double_quotes() {
        assert_eq!(quote("it's \"x\""), r#""it's \"x\"""#);
    }

    proptest! {
        #[test]
        fn tokenize_never_panics(source in "\\PC{0,64}") {
            let _ = tokenize(&source);
        }

        #[test]
        fn token_spans_are_ordered(source in "[a-z0-9 ;:{}<>=,.()\\[\\]|&'\"\n]{0,48}") {
            if let Ok(tokens) = tokenize(&source) {
                let mut last_end = 0;
                for token in &tokens {
                    prop_assert!(token.start >= last_end);
                    prop_assert!(token.end >= token.start);
                    last_end = token.end;
                }
            }
        }
    }
}
