//! Declaration bundling
//!
//! `tsc` writes one `.d.ts` per source file. The bundler walks the relative
//! imports of the primary declaration, wraps every file it reaches in a
//! `declare module "<package>/<id>"` block and rewrites the specifiers to
//! those ids, so the projector sees one self-contained file.
//!
//! The walk works on the token stream rather than the AST: it only needs
//! the byte spans of specifiers, `declare` modifiers and directives. Each
//! file is still parsed once so that syntax errors are reported against the
//! emitted file rather than the bundle.

use std::collections::{HashMap, VecDeque};
use std::ops::Range;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::domain::ports::{bundle_path, DeclarationBundler};
use crate::domain::value_objects::PackageName;
use crate::error::BundleError;
use crate::syntax::{parse, quote, tokenize, unquote, Token, TokenKind};

/// Declarations that take a `declare` modifier at the top of a file but
/// must not carry one inside a `declare module` block
const STRIPPED_AFTER_DECLARE: &[&str] = &[
    "const",
    "let",
    "var",
    "function",
    "class",
    "enum",
    "abstract",
    "namespace",
    "interface",
    "type",
];

const SOURCE_MAP_COMMENT: &str = "//# sourceMappingURL=";

#[derive(Debug, Clone, Default)]
pub struct DtsBundler {
    keep_intermediates: bool,
}

impl DtsBundler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave consumed declaration files on disk
    pub fn with_keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }
}

impl DeclarationBundler for DtsBundler {
    async fn bundle(
        &self,
        package: &PackageName,
        declaration: &Path,
    ) -> Result<PathBuf, BundleError> {
        if !is_file(declaration).await {
            return Err(BundleError::MissingEntry {
                path: declaration.to_path_buf(),
            });
        }

        let primary = normalize(declaration);
        let base_dir = primary.parent().unwrap_or_else(|| Path::new("")).to_path_buf();

        let mut ids: HashMap<PathBuf, String> = HashMap::new();
        ids.insert(primary.clone(), package.as_str().to_string());
        let mut queue = VecDeque::from([primary.clone()]);
        let mut modules: Vec<(String, String)> = Vec::new();
        let mut hoisted: Vec<String> = Vec::new();
        let mut consumed: Vec<PathBuf> = Vec::new();

        while let Some(file) = queue.pop_front() {
            let source = fs::read_to_string(&file)
                .await
                .map_err(|source| BundleError::Io {
                    path: file.clone(),
                    source,
                })?;
            let scan = scan(&source).map_err(|message| BundleError::Malformed {
                path: file.clone(),
                message,
            })?;
            parse(&source).map_err(|e| BundleError::Malformed {
                path: file.clone(),
                message: e.to_string(),
            })?;

            let mut edits = scan.removals;
            for specifier in &scan.specifiers {
                let target = resolve_specifier(&file, &specifier.value)
                    .await
                    .ok_or_else(|| BundleError::UnresolvedImport {
                        specifier: specifier.value.clone(),
                        from: file.clone(),
                    })?;
                let id = module_id(&mut ids, &mut queue, package, &base_dir, target);
                edits.push((specifier.span.clone(), quote(&id)));
            }
            for reference in &scan.references {
                let target = resolve_specifier(&file, reference)
                    .await
                    .ok_or_else(|| BundleError::UnresolvedImport {
                        specifier: reference.clone(),
                        from: file.clone(),
                    })?;
                module_id(&mut ids, &mut queue, package, &base_dir, target);
            }
            for directive in scan.hoisted {
                if !hoisted.contains(&directive) {
                    hoisted.push(directive);
                }
            }

            let id = ids.get(&file).cloned().unwrap_or_else(|| package.to_string());
            debug!(package = %package, module = %id, "bundling {}", file.display());
            modules.push((id, apply_edits(&source, edits)));
            consumed.push(file);
        }

        let bundled = render(&hoisted, &modules);
        let target = bundle_path(package, declaration);
        fs::write(&target, bundled)
            .await
            .map_err(|source| BundleError::Io {
                path: target.clone(),
                source,
            })?;
        debug!(
            package = %package,
            modules = modules.len(),
            "wrote bundle {}",
            target.display()
        );

        if !self.keep_intermediates {
            remove_intermediates(&consumed, &base_dir).await;
        }

        Ok(target)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Specifier {
    value: String,
    /// Span of the string literal token, quotes included
    span: Range<usize>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Scan {
    specifiers: Vec<Specifier>,
    /// `/// <reference path>` targets
    references: Vec<String>,
    /// `/// <reference types|lib>` directives, verbatim
    hoisted: Vec<String>,
    removals: Vec<(Range<usize>, String)>,
}

fn scan(source: &str) -> Result<Scan, String> {
    let tokens = tokenize(source).map_err(|e| e.to_string())?;
    let mut scan = Scan::default();
    let mut depth = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let next = tokens.get(i + 1);
        match token.kind {
            TokenKind::Punct if token.is_punct(source, "{") => depth += 1,
            TokenKind::Punct if token.is_punct(source, "}") => depth = depth.saturating_sub(1),
            TokenKind::Directive => {
                let text = token.text(source).trim_end();
                scan.removals.push((token.start..token.end, String::new()));
                match reference_attribute(text) {
                    Some(("path", value)) => scan.references.push(value.to_string()),
                    Some(_) => scan.hoisted.push(text.to_string()),
                    None => {}
                }
            }
            TokenKind::Ident if token.is_ident(source, "declare") && depth == 0 => {
                let follows_dot = i > 0 && tokens[i - 1].is_punct(source, ".");
                if let Some(next) = next.filter(|n| {
                    n.kind == TokenKind::Ident
                        && STRIPPED_AFTER_DECLARE.contains(&n.text(source))
                }) {
                    if !follows_dot {
                        scan.removals.push((token.start..next.start, String::new()));
                    }
                }
            }
            TokenKind::Ident if token.is_ident(source, "from") => {
                push_relative(&mut scan, source, next);
            }
            TokenKind::Ident if token.is_ident(source, "import") => match next {
                Some(n) if n.kind == TokenKind::Str => push_relative(&mut scan, source, next),
                Some(n) if n.is_punct(source, "(") => {
                    push_relative(&mut scan, source, tokens.get(i + 2))
                }
                _ => {}
            },
            TokenKind::Ident if token.is_ident(source, "require") => {
                if next.is_some_and(|n| n.is_punct(source, "(")) {
                    push_relative(&mut scan, source, tokens.get(i + 2));
                }
            }
            _ => {}
        }
    }

    Ok(scan)
}

fn push_relative(scan: &mut Scan, source: &str, token: Option<&Token>) {
    let Some(token) = token.filter(|t| t.kind == TokenKind::Str) else {
        return;
    };
    let value = unquote(token.text(source));
    if is_relative(&value) {
        scan.specifiers.push(Specifier {
            value,
            span: token.start..token.end,
        });
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// `("path", "./x.d.ts")` from `/// <reference path="./x.d.ts" />`
fn reference_attribute(directive: &str) -> Option<(&'static str, &str)> {
    ["path", "types", "lib"].into_iter().find_map(|attr| {
        let at = directive.find(&format!("{}=", attr))?;
        let preceded_by_space = directive[..at].ends_with(char::is_whitespace);
        let rest = &directive[at + attr.len() + 1..];
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = rest[1..].split(quote).next()?;
        preceded_by_space.then_some((attr, value))
    })
}

/// Id for `target`, registering and queueing it on first sight
fn module_id(
    ids: &mut HashMap<PathBuf, String>,
    queue: &mut VecDeque<PathBuf>,
    package: &PackageName,
    base_dir: &Path,
    target: PathBuf,
) -> String {
    if let Some(id) = ids.get(&target) {
        return id.clone();
    }
    let relative = target.strip_prefix(base_dir).unwrap_or(&target);
    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if let Some(last) = parts.last_mut() {
        if let Some(stem) = [".d.ts", ".d.mts", ".d.cts"]
            .iter()
            .find_map(|ext| last.strip_suffix(ext))
        {
            *last = stem.to_string();
        }
    }
    let id = format!("{}/{}", package.as_str(), parts.join("/"));
    ids.insert(target.clone(), id.clone());
    queue.push_back(target);
    id
}

async fn resolve_specifier(from: &Path, specifier: &str) -> Option<PathBuf> {
    let dir = from.parent().unwrap_or_else(|| Path::new(""));
    let base = normalize(&dir.join(specifier));
    for candidate in candidates(&base) {
        if is_file(&candidate).await {
            return Some(candidate);
        }
    }
    None
}

fn candidates(base: &Path) -> Vec<PathBuf> {
    let raw = base.to_string_lossy();
    if [".d.ts", ".d.mts", ".d.cts"].iter().any(|ext| raw.ends_with(ext)) {
        return vec![base.to_path_buf()];
    }

    let mut out = Vec::new();
    for (js, dts) in [(".js", ".d.ts"), (".mjs", ".d.mts"), (".cjs", ".d.cts")] {
        if let Some(stem) = raw.strip_suffix(js) {
            out.push(PathBuf::from(format!("{}{}", stem, dts)));
        }
    }
    out.push(PathBuf::from(format!("{}.d.ts", raw)));
    out.push(base.join("index.d.ts"));
    out
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn apply_edits(source: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(range, _)| range.start);
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for (range, replacement) in edits {
        if range.start < cursor {
            continue;
        }
        out.push_str(&source[cursor..range.start]);
        out.push_str(&replacement);
        cursor = range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

fn render(hoisted: &[String], modules: &[(String, String)]) -> String {
    let mut out = String::new();
    for directive in hoisted {
        out.push_str(directive);
        out.push('\n');
    }
    if !hoisted.is_empty() {
        out.push('\n');
    }

    for (i, (id, body)) in modules.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str("declare module ");
        out.push_str(&quote(id));
        out.push_str(" {\n");
        for line in body
            .lines()
            .filter(|line| !line.trim_start().starts_with(SOURCE_MAP_COMMENT))
            .skip_while(|line| line.trim().is_empty())
        {
            let line = line.trim_end();
            if !line.is_empty() {
                out.push_str("  ");
                out.push_str(line);
            }
            out.push('\n');
        }
        while out.ends_with("\n\n") {
            out.pop();
        }
        out.push_str("}\n");
    }
    out
}

async fn remove_intermediates(consumed: &[PathBuf], base_dir: &Path) {
    for file in consumed {
        if let Err(err) = fs::remove_file(file).await {
            warn!(path = %file.display(), error = %err, "failed to remove intermediate declaration");
        }
    }

    // Deepest first, so parents are empty by the time they are reached
    let mut dirs: Vec<&Path> = consumed
        .iter()
        .filter_map(|file| file.parent())
        .filter(|dir| dir.starts_with(base_dir))
        .collect();
    dirs.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
    dirs.dedup();
    for dir in dirs {
        let mut current = Some(dir);
        while let Some(d) = current.filter(|d| d.starts_with(base_dir)) {
            if fs::remove_dir(d).await.is_err() {
                break;
            }
            current = d.parent();
        }
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
