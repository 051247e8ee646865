//! Flow text generation
//!
//! Walks the declaration AST and prints Flow library definitions. Output is
//! a pure function of the input: no timestamps, and maps are only used for
//! lookups, never iterated into the output.

use std::collections::{HashMap, HashSet};

use crate::syntax::ast::*;
use crate::syntax::quote;

const INDENT: &str = "  ";
const GLOBAL_OMITTED: &str = "// tsflow: declare global block omitted";
const CONSTRUCT_OMITTED: &str = "// tsflow: construct signature omitted";

/// Render a whole declaration file, header included
pub fn print_file(file: &SourceFile, stem: &str) -> String {
    let mut printer = Printer::default();
    let chunks = printer.body(&file.items, 0);

    let mut out = header(stem);
    if !chunks.is_empty() {
        out.push('\n');
        out.push_str(&join_chunks(&chunks));
        out.push('\n');
    }
    out
}

fn header(stem: &str) -> String {
    format!(
        "/**\n * Flow type definitions for {}\n * Generated by tsflow from TypeScript declarations. Do not edit by hand.\n *\n * @flow\n */\n",
        stem
    )
}

/// Single-line chunks sit together; anything spanning lines gets air
fn join_chunks(chunks: &[String]) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            let prev = &chunks[i - 1];
            if prev.contains('\n') || chunk.contains('\n') {
                out.push_str("\n\n");
            } else {
                out.push('\n');
            }
        }
        out.push_str(chunk);
    }
    out
}

fn pad(depth: usize) -> String {
    INDENT.repeat(depth)
}

/// Re-indent a raw doc comment to `pad`
fn doc_comment(raw: &str, pad: &str) -> String {
    raw.lines()
        .enumerate()
        .map(|(i, line)| {
            let line = line.trim();
            if i == 0 {
                format!("{}{}", pad, line)
            } else if line.starts_with('*') {
                format!("{} {}", pad, line)
            } else {
                format!("{} * {}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn with_doc(doc: &Option<String>, pad: &str, text: String) -> String {
    match doc {
        Some(raw) => format!("{}\n{}", doc_comment(raw, pad), text),
        None => text,
    }
}

/// What a module body declares, for export decisions
#[derive(Default)]
struct Context {
    exports_all: bool,
    types: HashSet<String>,
    values: HashSet<String>,
}

impl Context {
    fn of(items: &[Item]) -> Self {
        let mut ctx = Context {
            exports_all: !items.iter().any(|item| {
                item.exported
                    || matches!(
                        item.kind,
                        ItemKind::Export(_) | ItemKind::ExportDefault(_) | ItemKind::ExportAssignment(_)
                    )
            }),
            ..Context::default()
        };
        for item in items {
            match &item.kind {
                ItemKind::Interface(decl) => {
                    ctx.types.insert(decl.name.clone());
                }
                ItemKind::TypeAlias(decl) => {
                    ctx.types.insert(decl.name.clone());
                }
                kind => {
                    for name in value_names(kind) {
                        ctx.values.insert(name);
                    }
                }
            }
        }
        ctx
    }

    fn is_type_only(&self, name: &str) -> bool {
        self.types.contains(name) && !self.values.contains(name)
    }
}

/// Names a declaration binds in value space
fn value_names(kind: &ItemKind) -> Vec<String> {
    match kind {
        ItemKind::Class(decl) => decl.name.iter().cloned().collect(),
        ItemKind::Function(decl) => decl.name.iter().cloned().collect(),
        ItemKind::Enum(decl) => vec![decl.name.clone()],
        ItemKind::Variable(decl) => decl.declarators.iter().map(|d| d.name.clone()).collect(),
        ItemKind::ImportEquals {
            name,
            target: ImportTarget::Entity(_),
        } => vec![name.clone()],
        _ => Vec::new(),
    }
}

/// A copy of `kind` with every declared name passed through `rename`
fn renamed(kind: &ItemKind, rename: impl Fn(&str) -> String) -> Option<ItemKind> {
    let mut kind = kind.clone();
    match &mut kind {
        ItemKind::Interface(decl) => decl.name = rename(&decl.name),
        ItemKind::TypeAlias(decl) => decl.name = rename(&decl.name),
        ItemKind::Enum(decl) => decl.name = rename(&decl.name),
        ItemKind::Class(decl) => decl.name = Some(rename(decl.name.as_deref()?)),
        ItemKind::Function(decl) => decl.name = Some(rename(decl.name.as_deref()?)),
        ItemKind::Variable(decl) => {
            for declarator in &mut decl.declarators {
                declarator.name = rename(&declarator.name);
            }
        }
        _ => return None,
    }
    Some(kind)
}

/// A printed interface or class member
enum Printed {
    Member(String),
    /// No Flow counterpart; a comment in multi-line blocks, dropped inline
    Omitted(&'static str),
}

#[derive(Default)]
struct Printer {
    /// Every flattened namespace member name (`NS$Member`)
    flattened: HashSet<String>,
    /// Flattened names of interfaces and type aliases
    flattened_types: HashSet<String>,
    /// Innermost last; local name to flattened name
    scopes: Vec<HashMap<String, String>>,
}

impl Printer {
    fn body(&mut self, items: &[Item], depth: usize) -> Vec<String> {
        let ctx = Context::of(items);

        let mut scope = HashMap::new();
        for item in items {
            if let ItemKind::Namespace { path, body } = &item.kind {
                if let Some(first) = path.first() {
                    scope.insert(first.clone(), first.clone());
                    self.register_namespace(None, path, body);
                }
            }
        }
        self.scopes.push(scope);

        let mut chunks = Vec::new();
        for item in items {
            self.item(item, &ctx, depth, &mut chunks);
        }

        self.scopes.pop();
        chunks
    }

    fn register_namespace(&mut self, parent: Option<&str>, path: &[String], body: &[Item]) {
        let mut prefix = parent.map(str::to_string);
        for segment in path {
            let next = match &prefix {
                Some(p) => format!("{}${}", p, segment),
                None => segment.clone(),
            };
            self.flattened.insert(next.clone());
            prefix = Some(next);
        }
        let Some(prefix) = prefix else { return };

        for item in body {
            match &item.kind {
                ItemKind::Namespace { path, body } => {
                    self.register_namespace(Some(&prefix), path, body)
                }
                ItemKind::Interface(decl) => {
                    self.flattened_types.insert(format!("{}${}", prefix, decl.name));
                    self.flattened.insert(format!("{}${}", prefix, decl.name));
                }
                ItemKind::TypeAlias(decl) => {
                    self.flattened_types.insert(format!("{}${}", prefix, decl.name));
                    self.flattened.insert(format!("{}${}", prefix, decl.name));
                }
                kind => {
                    for name in value_names(kind) {
                        self.flattened.insert(format!("{}${}", prefix, name));
                    }
                }
            }
        }
    }

    /// Flattened name for a (possibly qualified) reference, if it points
    /// into a namespace
    fn resolve(&self, segments: &[String]) -> Option<String> {
        let first = segments.first()?;
        let base = self.scopes.iter().rev().find_map(|scope| scope.get(first))?;
        if segments.len() == 1 {
            return Some(base.clone());
        }
        let candidate = format!("{}${}", base, segments[1..].join("$"));
        self.flattened.contains(&candidate).then_some(candidate)
    }

    /// Target of `import A = N.Y` when it names an interface or type alias
    fn aliased_type(&self, segments: &[String], ctx: &Context) -> Option<String> {
        match self.resolve(segments) {
            Some(flat) => self.flattened_types.contains(&flat).then_some(flat),
            None => match segments {
                [name] if ctx.is_type_only(name) => Some(name.clone()),
                _ => None,
            },
        }
    }

    fn resolve_or_dotted(&self, segments: &[String]) -> String {
        self.resolve(segments)
            .unwrap_or_else(|| segments.join("."))
    }

    fn item(&mut self, item: &Item, ctx: &Context, depth: usize, out: &mut Vec<String>) {
        let p = pad(depth);
        let exported = item.exported || ctx.exports_all;
        let decl = if exported { "declare export " } else { "declare " };

        match &item.kind {
            ItemKind::Module { name, body } => {
                let inner = self.body(body, depth + 1);
                let text = if inner.is_empty() {
                    format!("{}declare module {} {{}}", p, quote(name))
                } else {
                    format!(
                        "{}declare module {} {{\n{}\n{}}}",
                        p,
                        quote(name),
                        join_chunks(&inner),
                        p
                    )
                };
                out.push(with_doc(&item.doc, &p, text));
            }
            ItemKind::Namespace { path, body } => {
                self.namespace(item, path, body, None, exported, ctx, depth, out);
            }
            ItemKind::Global(_) => out.push(format!("{}{}", p, GLOBAL_OMITTED)),
            ItemKind::Import(import) => {
                out.extend(self.import(import).into_iter().map(|line| format!("{}{}", p, line)))
            }
            ItemKind::ImportEquals { name, target } => match target {
                ImportTarget::Require(module) => {
                    out.push(format!("{}import * as {} from {};", p, name, quote(module)))
                }
                ImportTarget::Entity(path) => {
                    let line = match self.aliased_type(path, ctx) {
                        Some(target) => format!("{}{}type {} = {};", p, decl, name, target),
                        None => format!(
                            "{}{}var {}: typeof {};",
                            p,
                            decl,
                            name,
                            self.resolve_or_dotted(path)
                        ),
                    };
                    out.push(line);
                }
            },
            ItemKind::Export(export) => {
                if let Some(line) = export_line(export) {
                    out.push(format!("{}{}", p, line));
                }
            }
            ItemKind::ExportDefault(path) => out.push(format!(
                "{}declare export default {};",
                p,
                self.exported_value(path, ctx)
            )),
            ItemKind::ExportAssignment(path) => out.push(format!(
                "{}declare module.exports: {};",
                p,
                self.exported_value(path, ctx)
            )),
            ItemKind::ExportAsNamespace(_) => {}
            ItemKind::Interface(interface) => {
                let text = format!("{}{}{}", p, decl, self.interface(interface, depth));
                out.push(with_doc(&item.doc, &p, text));
                if item.default {
                    out.push(format!("{}declare export default {};", p, interface.name));
                }
            }
            ItemKind::TypeAlias(alias) => {
                let text = format!(
                    "{}{}type {}{} = {};",
                    p,
                    decl,
                    alias.name,
                    self.type_params(&alias.type_params),
                    self.ty(&alias.ty)
                );
                out.push(with_doc(&item.doc, &p, text));
            }
            ItemKind::Function(function) => {
                let text = match (&function.name, item.default) {
                    (Some(name), true) => format!(
                        "{}declare export default function {}{};",
                        p,
                        name,
                        self.signature(&function.signature)
                    ),
                    (None, _) => format!(
                        "{}declare export default {};",
                        p,
                        self.function_type(&function.signature)
                    ),
                    (Some(name), false) => format!(
                        "{}{}function {}{};",
                        p,
                        decl,
                        name,
                        self.signature(&function.signature)
                    ),
                };
                out.push(with_doc(&item.doc, &p, text));
            }
            ItemKind::Class(class) => {
                let head = if item.default {
                    "declare export default "
                } else {
                    decl
                };
                let text = format!("{}{}{}", p, head, self.class(class, depth));
                out.push(with_doc(&item.doc, &p, text));
            }
            ItemKind::Enum(decl_enum) => {
                let text = format!(
                    "{}{}var {}: {};",
                    p,
                    decl,
                    decl_enum.name,
                    enum_object(decl_enum, depth)
                );
                out.push(with_doc(&item.doc, &p, text));
            }
            ItemKind::Variable(variable) => {
                let lines: Vec<String> = variable
                    .declarators
                    .iter()
                    .map(|d| {
                        format!(
                            "{}{}{} {}: {};",
                            p,
                            decl,
                            variable.kind.as_str(),
                            d.name,
                            self.declarator_type(variable.kind, d)
                        )
                    })
                    .collect();
                out.push(with_doc(&item.doc, &p, lines.join("\n")));
            }
        }
    }

    /// `declare export default X` / `module.exports` target
    fn exported_value(&self, path: &[String], ctx: &Context) -> String {
        let name = self.resolve_or_dotted(path);
        let type_only = match path {
            [single] => ctx.is_type_only(single) || self.flattened_types.contains(&name),
            _ => self.flattened_types.contains(&name),
        };
        if type_only {
            name
        } else {
            format!("typeof {}", name)
        }
    }

    fn import(&self, import: &ImportDecl) -> Vec<String> {
        if import.is_side_effect() {
            return Vec::new();
        }
        let source = quote(&import.source);
        let mut lines = Vec::new();
        if let Some(namespace) = &import.namespace {
            lines.push(format!("import * as {} from {};", namespace, source));
        }

        let named: Vec<String> = import
            .named
            .iter()
            .map(|spec| match &spec.alias {
                Some(alias) => format!("{} as {}", spec.name, alias),
                None => spec.name.clone(),
            })
            .collect();
        let clause = match (&import.default, named.is_empty()) {
            (Some(default), true) => Some(default.clone()),
            (Some(default), false) => Some(format!("{}, {{ {} }}", default, named.join(", "))),
            (None, false) => Some(format!("{{ {} }}", named.join(", "))),
            (None, true) => None,
        };
        if let Some(clause) = clause {
            lines.push(format!("import type {} from {};", clause, source));
        }
        lines
    }

    #[allow(clippy::too_many_arguments)]
    fn namespace(
        &mut self,
        item: &Item,
        path: &[String],
        body: &[Item],
        parent: Option<&str>,
        exported: bool,
        ctx: &Context,
        depth: usize,
        out: &mut Vec<String>,
    ) -> bool {
        let Some((name, rest)) = path.split_first() else {
            return false;
        };
        let flat = match parent {
            Some(parent) => format!("{}${}", parent, name),
            None => name.clone(),
        };
        let p = pad(depth);
        let decl = if exported { "declare export " } else { "declare " };

        let mut value_members: Vec<String> = Vec::new();
        if rest.is_empty() {
            let mut scope = HashMap::new();
            for child in body {
                match &child.kind {
                    ItemKind::Namespace { path, .. } => {
                        if let Some(first) = path.first() {
                            scope.insert(first.clone(), format!("{}${}", flat, first));
                        }
                    }
                    ItemKind::Interface(decl) => {
                        scope.insert(decl.name.clone(), format!("{}${}", flat, decl.name));
                    }
                    ItemKind::TypeAlias(decl) => {
                        scope.insert(decl.name.clone(), format!("{}${}", flat, decl.name));
                    }
                    kind => {
                        for value in value_names(kind) {
                            scope.insert(value.clone(), format!("{}${}", flat, value));
                        }
                    }
                }
            }
            self.scopes.push(scope);

            let inner_ctx = Context::default();
            for child in body {
                match &child.kind {
                    ItemKind::Namespace { path, body } => {
                        let child_name = path.first().cloned().unwrap_or_default();
                        let has_values = self.namespace(
                            child,
                            path,
                            body,
                            Some(flat.as_str()),
                            exported,
                            &inner_ctx,
                            depth,
                            out,
                        );
                        if has_values {
                            push_member(&mut value_members, &child_name, &flat);
                        }
                    }
                    ItemKind::ImportEquals {
                        name: alias,
                        target: ImportTarget::Entity(target),
                    } => match self.aliased_type(target, &inner_ctx) {
                        Some(aliased) => out.push(format!(
                            "{}{}type {}${} = {};",
                            p, decl, flat, alias, aliased
                        )),
                        None => {
                            out.push(format!(
                                "{}{}var {}${}: typeof {};",
                                p,
                                decl,
                                flat,
                                alias,
                                self.resolve_or_dotted(target)
                            ));
                            push_member(&mut value_members, alias, &flat);
                        }
                    },
                    kind => {
                        let Some(kind) = renamed(kind, |n| format!("{}${}", flat, n)) else {
                            continue;
                        };
                        let flattened = Item {
                            doc: child.doc.clone(),
                            exported,
                            default: false,
                            kind,
                        };
                        self.item(&flattened, &inner_ctx, depth, out);
                        for value in value_names(&child.kind) {
                            push_member(&mut value_members, &value, &flat);
                        }
                    }
                }
            }
            self.scopes.pop();
        } else {
            let nested = Item {
                doc: None,
                exported: true,
                default: false,
                kind: ItemKind::Namespace {
                    path: rest.to_vec(),
                    body: body.to_vec(),
                },
            };
            if self.namespace(&nested, rest, body, Some(flat.as_str()), exported, ctx, depth, out) {
                push_member(&mut value_members, &rest[0], &flat);
            }
        }

        // A function or class of the same name already owns the value binding
        let merged = parent.is_none() && ctx.values.contains(name);
        if value_members.is_empty() || merged {
            return !value_members.is_empty();
        }

        let members: String = value_members
            .iter()
            .map(|member| format!("{}{}{},\n", p, INDENT, member))
            .collect();
        let text = format!("{}{}var {}: {{\n{}{}}};", p, decl, flat, members, p);
        let doc = if parent.is_none() { &item.doc } else { &None };
        out.push(with_doc(doc, &p, text));
        true
    }

    fn interface(&self, interface: &InterfaceDecl, depth: usize) -> String {
        let mut head = format!(
            "interface {}{}",
            interface.name,
            self.type_params(&interface.type_params)
        );
        if !interface.extends.is_empty() {
            let parents: Vec<String> = interface.extends.iter().map(|t| self.ty(t)).collect();
            head.push_str(&format!(" extends {}", parents.join(", ")));
        }
        format!("{} {}", head, self.block(&interface.members, false, depth))
    }

    fn class(&self, class: &ClassDecl, depth: usize) -> String {
        let name = class.name.as_deref().unwrap_or("Default");
        let mut head = format!("class {}{}", name, self.type_params(&class.type_params));
        if let Some(base) = &class.extends {
            head.push_str(&format!(" extends {}", self.ty(base)));
        }
        if !class.implements.is_empty() {
            let interfaces: Vec<String> = class.implements.iter().map(|t| self.ty(t)).collect();
            head.push_str(&format!(" implements {}", interfaces.join(", ")));
        }
        format!("{} {}", head, self.block(&class.members, true, depth))
    }

    /// Multi-line member block for interfaces and classes
    fn block(&self, members: &[Member], in_class: bool, depth: usize) -> String {
        let printed = self.members(members, in_class);
        if printed.is_empty() {
            return "{}".to_string();
        }
        let inner = pad(depth + 1);
        let mut out = String::from("{\n");
        for (doc, text) in printed {
            let line = match text {
                Printed::Member(text) => format!("{}{};", inner, text),
                Printed::Omitted(comment) => format!("{}{}", inner, comment),
            };
            out.push_str(&with_doc(doc, &inner, line));
            out.push('\n');
        }
        out.push_str(&pad(depth));
        out.push('}');
        out
    }

    fn members<'m>(&self, members: &'m [Member], in_class: bool) -> Vec<(&'m Option<String>, Printed)> {
        let mut accessors: HashMap<(String, bool), (Option<&Type>, Option<&Type>, bool, bool)> =
            HashMap::new();
        for member in members {
            let (name, getter, ty) = match &member.kind {
                MemberKind::Getter { name, ty } => (name, true, ty),
                MemberKind::Setter { name, ty } => (name, false, ty),
                _ => continue,
            };
            let Some(key) = prop_name(name) else { continue };
            let entry = accessors
                .entry((key, member.modifiers.is_static))
                .or_insert((None, None, false, false));
            if getter {
                entry.0 = ty.as_ref();
                entry.2 = true;
            } else {
                entry.1 = ty.as_ref();
                entry.3 = true;
            }
        }

        let mut seen_accessors: HashSet<(String, bool)> = HashSet::new();
        let mut out = Vec::new();
        for member in members {
            if member.modifiers.accessibility == Accessibility::Private {
                continue;
            }
            let is_static = in_class && member.modifiers.is_static;
            let stat = if is_static { "static " } else { "" };
            let variance = if member.modifiers.readonly { "+" } else { "" };

            let text = match &member.kind {
                MemberKind::Property { name, optional, ty } => {
                    let Some(key) = prop_name(name) else { continue };
                    format!(
                        "{}{}{}{}: {}",
                        stat,
                        variance,
                        key,
                        if *optional { "?" } else { "" },
                        self.opt_ty(ty.as_ref())
                    )
                }
                MemberKind::Method {
                    name,
                    optional,
                    signature,
                } => {
                    let Some(key) = prop_name(name) else { continue };
                    if *optional {
                        format!("{}{}?: {}", stat, key, self.function_type(signature))
                    } else {
                        format!("{}{}{}", stat, key, self.signature(signature))
                    }
                }
                MemberKind::Call(signature) => format!("{}{}", stat, self.signature(signature)),
                MemberKind::Construct(_) => {
                    out.push((&member.doc, Printed::Omitted(CONSTRUCT_OMITTED)));
                    continue;
                }
                MemberKind::Index { param, key, value } => format!(
                    "{}{}[{}: {}]: {}",
                    stat,
                    variance,
                    param,
                    self.ty(key),
                    self.ty(value)
                ),
                MemberKind::Getter { name, .. } | MemberKind::Setter { name, .. } => {
                    let Some(key) = prop_name(name) else { continue };
                    let id = (key.clone(), member.modifiers.is_static);
                    if !seen_accessors.insert(id.clone()) {
                        continue;
                    }
                    let Some((get_ty, set_ty, has_get, has_set)) = accessors.get(&id) else {
                        continue;
                    };
                    let variance = match (*has_get, *has_set) {
                        (true, false) => "+",
                        (false, true) => "-",
                        _ => "",
                    };
                    format!(
                        "{}{}{}: {}",
                        stat,
                        variance,
                        key,
                        self.opt_ty((*get_ty).or(*set_ty))
                    )
                }
                MemberKind::Constructor(params) => {
                    if !in_class {
                        continue;
                    }
                    format!("constructor({}): void", self.params(params))
                }
            };
            out.push((&member.doc, Printed::Member(text)));
        }
        out
    }

    fn declarator_type(&self, kind: VarKind, declarator: &Declarator) -> String {
        match (&declarator.ty, &declarator.init) {
            (Some(ty), _) => self.ty(ty),
            (None, Some(literal)) if kind == VarKind::Const => literal_type(literal),
            (None, Some(literal)) => widened_type(literal).to_string(),
            (None, None) => "any".to_string(),
        }
    }

    fn type_params(&self, params: &[TypeParam]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let printed: Vec<String> = params
            .iter()
            .map(|param| {
                let mut out = param.name.clone();
                if let Some(constraint) = &param.constraint {
                    out.push_str(": ");
                    out.push_str(&self.ty(constraint));
                }
                if let Some(default) = &param.default {
                    out.push_str(" = ");
                    out.push_str(&self.ty(default));
                }
                out
            })
            .collect();
        format!("<{}>", printed.join(", "))
    }

    fn params(&self, params: &[Param]) -> String {
        params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let name = param
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("arg{}", i));
                format!(
                    "{}{}{}: {}",
                    if param.rest { "..." } else { "" },
                    name,
                    if param.optional && !param.rest { "?" } else { "" },
                    self.opt_ty(param.ty.as_ref())
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `<T>(a: A): R`, for declarations and methods
    fn signature(&self, signature: &Signature) -> String {
        format!(
            "{}({}): {}",
            self.type_params(&signature.type_params),
            self.params(&signature.params),
            self.opt_ty(signature.ret.as_deref())
        )
    }

    /// `<T>(a: A) => R`
    fn function_type(&self, signature: &Signature) -> String {
        format!(
            "{}({}) => {}",
            self.type_params(&signature.type_params),
            self.params(&signature.params),
            self.opt_ty(signature.ret.as_deref())
        )
    }

    fn opt_ty(&self, ty: Option<&Type>) -> String {
        ty.map(|t| self.ty(t)).unwrap_or_else(|| "any".to_string())
    }

    fn ty(&self, ty: &Type) -> String {
        match ty {
            Type::Keyword(keyword) => keyword_type(*keyword).to_string(),
            Type::Reference { name, args } => self.reference(name, args),
            Type::Literal(literal) => literal_type(literal),
            Type::Template => "string".to_string(),
            Type::Array(element) => format!("{}[]", self.ty(element)),
            Type::Tuple(elements) => {
                let printed: Vec<String> = elements.iter().map(|e| self.tuple_element(e)).collect();
                format!("[{}]", printed.join(", "))
            }
            Type::Union(types) => self.join(types, " | "),
            Type::Intersection(types) => self.join(types, " & "),
            Type::Function(signature) => self.function_type(signature),
            Type::Constructor { signature, .. } => {
                format!("Class<{}>", self.opt_ty(signature.ret.as_deref()))
            }
            Type::Object(members) => {
                let printed: Vec<String> = self
                    .members(members, false)
                    .into_iter()
                    .filter_map(|(_, text)| match text {
                        Printed::Member(text) => Some(text),
                        Printed::Omitted(_) => None,
                    })
                    .collect();
                if printed.is_empty() {
                    "{...}".to_string()
                } else {
                    format!("{{ {}, ... }}", printed.join(", "))
                }
            }
            Type::Operator { op, ty } => match op {
                TypeOperator::Keyof => format!("$Keys<{}>", self.ty(ty)),
                TypeOperator::Unique => "Symbol".to_string(),
                TypeOperator::Readonly => match ty.as_ref() {
                    Type::Array(element) => format!("$ReadOnlyArray<{}>", self.ty(element)),
                    other => format!("$ReadOnly<{}>", self.ty(other)),
                },
            },
            Type::Query { name, .. } => format!("typeof {}", self.resolve_or_dotted(name)),
            Type::Import {
                module, qualifier, ..
            } => {
                let mut out = format!("$Exports<{}>", quote(module));
                for segment in qualifier {
                    out = format!("$PropertyType<{}, {}>", out, quote(segment));
                }
                out
            }
            Type::IndexedAccess { object, index } => {
                format!("{}[{}]", self.ty(object), self.ty(index))
            }
            Type::Conditional {
                check,
                extends,
                then,
                otherwise,
            } => format!(
                "{} extends {} ? {} : {}",
                self.ty(check),
                self.ty(extends),
                self.ty(then),
                self.ty(otherwise)
            ),
            Type::Infer { name, constraint } => match constraint {
                Some(constraint) => format!("infer {} extends {}", name, self.ty(constraint)),
                None => format!("infer {}", name),
            },
            Type::Mapped {
                readonly,
                param,
                constraint,
                optional,
                value,
            } => {
                let variance = if *readonly == Some(MappedModifier::Add) { "+" } else { "" };
                let optional = if *optional == Some(MappedModifier::Add) { "?" } else { "" };
                let constraint = match constraint.as_ref() {
                    Type::Operator {
                        op: TypeOperator::Keyof,
                        ty,
                    } => format!("keyof {}", self.ty(ty)),
                    other => self.ty(other),
                };
                format!(
                    "{{ {}[{} in {}]{}: {} }}",
                    variance,
                    param,
                    constraint,
                    optional,
                    self.opt_ty(value.as_deref())
                )
            }
            Type::Predicate { asserts, .. } => {
                let ty = if *asserts { "void" } else { "boolean" };
                ty.to_string()
            }
            Type::Paren(inner) => format!("({})", self.ty(inner)),
        }
    }

    fn join(&self, types: &[Type], separator: &str) -> String {
        types
            .iter()
            .map(|t| self.ty(t))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn type_args(&self, args: &[Type]) -> String {
        if args.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.join(args, ", "))
        }
    }

    fn reference(&self, name: &[String], args: &[Type]) -> String {
        if let Some(flattened) = self.resolve(name) {
            return format!("{}{}", flattened, self.type_args(args));
        }

        let printed: Vec<String> = args.iter().map(|t| self.ty(t)).collect();
        match (name, printed.as_slice()) {
            ([n], [t]) if n == "ReadonlyArray" => format!("$ReadOnlyArray<{}>", t),
            ([n], [t]) if n == "Readonly" => format!("$ReadOnly<{}>", t),
            ([n], [t]) if n == "Partial" => format!("$Rest<{}, {{...}}>", t),
            ([n], [t]) if n == "NonNullable" => format!("$NonMaybeType<{}>", t),
            ([n], [k, v]) if n == "Record" => format!("{{ [key: {}]: {}, ... }}", k, v),
            ([n], [t, k]) if n == "Omit" => {
                format!("$Diff<{}, {{ [key: {}]: mixed, ... }}>", t, k)
            }
            ([n], _) if n == "ReadonlyMap" => format!("$ReadOnlyMap{}", self.type_args(args)),
            ([n], _) if n == "ReadonlySet" => format!("$ReadOnlySet{}", self.type_args(args)),
            _ => format!("{}{}", name.join("."), self.type_args(args)),
        }
    }

    fn tuple_element(&self, element: &TupleElement) -> String {
        let ty = self.ty(&element.ty);
        match (&element.label, element.rest, element.optional) {
            (Some(label), true, _) => format!("...{}: {}", label, ty),
            (Some(label), false, optional) => {
                format!("{}{}: {}", label, if optional { "?" } else { "" }, ty)
            }
            (None, true, _) => format!("...{}", ty),
            (None, false, true) => format!("{} | void", ty),
            (None, false, false) => ty,
        }
    }
}

fn push_member(members: &mut Vec<String>, name: &str, flat: &str) {
    let member = format!("{}: typeof {}${}", name, flat, name);
    if !members.contains(&member) {
        members.push(member);
    }
}

fn export_line(export: &ExportDecl) -> Option<String> {
    match export {
        ExportDecl::Named {
            specifiers, source, ..
        } => {
            if specifiers.is_empty() {
                return None;
            }
            let names: Vec<String> = specifiers
                .iter()
                .map(|spec| match &spec.alias {
                    Some(alias) => format!("{} as {}", spec.name, alias),
                    None => spec.name.clone(),
                })
                .collect();
            Some(match source {
                Some(source) => format!(
                    "declare export {{ {} }} from {};",
                    names.join(", "),
                    quote(source)
                ),
                None => format!("declare export {{ {} }};", names.join(", ")),
            })
        }
        ExportDecl::All { alias, source } => Some(match alias {
            Some(alias) => format!("declare export * as {} from {};", alias, quote(source)),
            None => format!("declare export * from {};", quote(source)),
        }),
    }
}

fn enum_object(decl: &EnumDecl, depth: usize) -> String {
    let mut next: Option<i64> = Some(0);
    let members: Vec<(&Option<String>, String)> = decl
        .members
        .iter()
        .map(|member| {
            let value = match &member.value {
                Some(literal) => {
                    next = match literal {
                        Literal::Number(n) => n.parse::<i64>().ok().map(|n| n + 1),
                        _ => None,
                    };
                    literal_type(literal)
                }
                None => match next {
                    Some(n) => {
                        next = Some(n + 1);
                        n.to_string()
                    }
                    None => "number".to_string(),
                },
            };
            (&member.doc, format!("+{}: {}", enum_key(&member.name), value))
        })
        .collect();

    if members.is_empty() {
        return "{||}".to_string();
    }
    if members.iter().all(|(doc, _)| doc.is_none()) {
        let inline: Vec<String> = members.into_iter().map(|(_, text)| text).collect();
        return format!("{{| {} |}}", inline.join(", "));
    }

    let inner = pad(depth + 1);
    let mut out = String::from("{|\n");
    for (doc, text) in members {
        out.push_str(&with_doc(doc, &inner, format!("{}{},", inner, text)));
        out.push('\n');
    }
    out.push_str(&pad(depth));
    out.push_str("|}");
    out
}

fn enum_key(name: &str) -> String {
    let is_ident = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if is_ident {
        name.to_string()
    } else {
        quote(name)
    }
}

fn prop_name(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(_) if name.is_private_name() => None,
        PropName::Ident(ident) => Some(ident.clone()),
        PropName::Str(value) => Some(quote(value)),
        PropName::Number(value) => Some(value.clone()),
        PropName::Computed(path) => match path.as_slice() {
            [symbol, well_known] if symbol == "Symbol" => Some(format!("@@{}", well_known)),
            _ => None,
        },
    }
}

fn keyword_type(keyword: Keyword) -> &'static str {
    match keyword {
        Keyword::Any => "any",
        Keyword::Unknown => "mixed",
        Keyword::Never => "empty",
        Keyword::Void | Keyword::Undefined => "void",
        Keyword::Null => "null",
        Keyword::String => "string",
        Keyword::Number => "number",
        Keyword::Boolean => "boolean",
        Keyword::BigInt => "bigint",
        Keyword::Symbol => "Symbol",
        Keyword::Object => "{...}",
        Keyword::This => "this",
    }
}

fn literal_type(literal: &Literal) -> String {
    match literal {
        Literal::Str(value) => quote(value),
        Literal::Number(value) | Literal::BigInt(value) => value.clone(),
        Literal::Bool(value) => value.to_string(),
    }
}

fn widened_type(literal: &Literal) -> &'static str {
    match literal {
        Literal::Str(_) => "string",
        Literal::Number(_) => "number",
        Literal::BigInt(_) => "bigint",
        Literal::Bool(_) => "boolean",
    }
}
