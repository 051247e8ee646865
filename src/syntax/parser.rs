//! Recursive-descent parser for declaration files

use super::ast::*;
use super::lexer::{tokenize, unquote, Token, TokenKind};
use super::SyntaxError;

type PResult<T> = Result<T, SyntaxError>;

/// Parse a declaration file
pub fn parse(source: &str) -> Result<SourceFile, SyntaxError> {
    let mut tokens = Vec::new();
    let mut docs = Vec::new();
    let mut directives = Vec::new();
    let mut pending_doc = None;

    for token in tokenize(source)? {
        match token.kind {
            TokenKind::Directive => directives.push(token.text(source).trim_end().to_string()),
            TokenKind::DocComment => pending_doc = Some(token.text(source).to_string()),
            _ => {
                docs.push(pending_doc.take());
                tokens.push(token);
            }
        }
    }

    let mut parser = Parser {
        source,
        tokens,
        docs,
        pos: 0,
    };
    let items = parser.items(None)?;
    Ok(SourceFile { directives, items })
}

struct Parser<'a> {
    source: &'a str,
    /// Never empty: the lexer always ends the stream with `Eof`
    tokens: Vec<Token>,
    /// Doc comment directly preceding each token
    docs: Vec<Option<String>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    // ---- token cursor -------------------------------------------------

    fn tok(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)]
    }

    fn text_at(&self, n: usize) -> &'a str {
        let token = self.tok(n);
        let (start, end) = (token.start, token.end);
        &self.source[start..end]
    }

    fn kind_at(&self, n: usize) -> TokenKind {
        self.tok(n).kind
    }

    fn punct_at(&self, n: usize, punct: &str) -> bool {
        self.kind_at(n) == TokenKind::Punct && self.text_at(n) == punct
    }

    fn ident_at(&self, n: usize, ident: &str) -> bool {
        self.kind_at(n) == TokenKind::Ident && self.text_at(n) == ident
    }

    fn at(&self, punct: &str) -> bool {
        self.punct_at(0, punct)
    }

    fn at_kw(&self, ident: &str) -> bool {
        self.ident_at(0, ident)
    }

    fn at_eof(&self) -> bool {
        self.kind_at(0) == TokenKind::Eof
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, punct: &str) -> bool {
        let hit = self.at(punct);
        if hit {
            self.advance();
        }
        hit
    }

    fn eat_kw(&mut self, ident: &str) -> bool {
        let hit = self.at_kw(ident);
        if hit {
            self.advance();
        }
        hit
    }

    fn expect(&mut self, punct: &str) -> PResult<()> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", punct)))
        }
    }

    fn expect_kw(&mut self, ident: &str) -> PResult<()> {
        if self.eat_kw(ident) {
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", ident)))
        }
    }

    fn semi(&mut self) {
        self.eat(";");
    }

    fn doc(&self) -> Option<String> {
        self.docs.get(self.pos).cloned().flatten()
    }

    fn error(&self, expected: &str) -> SyntaxError {
        let token = self.tok(0);
        let found = if token.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("'{}'", self.text_at(0))
        };
        SyntaxError::new(
            token.line,
            token.column,
            format!("expected {}, found {}", expected, found),
        )
    }

    fn ident(&mut self) -> PResult<String> {
        if self.kind_at(0) != TokenKind::Ident {
            return Err(self.error("identifier"));
        }
        let name = self.text_at(0).to_string();
        self.advance();
        Ok(name)
    }

    fn string(&mut self) -> PResult<String> {
        if self.kind_at(0) != TokenKind::Str {
            return Err(self.error("string literal"));
        }
        let value = unquote(self.text_at(0));
        self.advance();
        Ok(value)
    }

    /// Identifier or string literal (`export { "a-b" as c }`)
    fn module_export_name(&mut self) -> PResult<String> {
        if self.kind_at(0) == TokenKind::Str {
            self.string()
        } else {
            self.ident()
        }
    }

    fn entity_name(&mut self) -> PResult<Vec<String>> {
        let mut path = vec![self.ident()?];
        while self.at(".") && self.kind_at(1) == TokenKind::Ident {
            self.advance();
            path.push(self.ident()?);
        }
        Ok(path)
    }

    /// Offset of the bracket closing the one at offset `n`
    fn balanced_end(&self, n: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut offset = n;
        loop {
            match self.kind_at(offset) {
                TokenKind::Eof => return None,
                TokenKind::Punct => match self.text_at(offset) {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return Some(offset);
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
            offset += 1;
        }
    }

    fn skip_balanced(&mut self) -> PResult<()> {
        match self.balanced_end(0) {
            Some(end) => {
                for _ in 0..=end {
                    self.advance();
                }
                Ok(())
            }
            None => Err(self.error("closing bracket")),
        }
    }

    // ---- items ---------------------------------------------------------

    fn items(&mut self, closing: Option<&str>) -> PResult<Vec<Item>> {
        let mut items = Vec::new();
        loop {
            if self.eat(";") {
                continue;
            }
            if let Some(closing) = closing {
                if self.eat(closing) {
                    return Ok(items);
                }
                if self.at_eof() {
                    return Err(self.error(&format!("'{}'", closing)));
                }
            } else if self.at_eof() {
                return Ok(items);
            }
            items.push(self.item()?);
        }
    }

    fn item(&mut self) -> PResult<Item> {
        let doc = self.doc();
        let mut exported = false;
        let mut default = false;

        if self.at_kw("export") {
            if self.punct_at(1, "=") {
                self.advance();
                self.advance();
                let path = self.entity_name()?;
                self.semi();
                return Ok(Item {
                    doc,
                    exported: true,
                    default: false,
                    kind: ItemKind::ExportAssignment(path),
                });
            }
            if self.ident_at(1, "as") && self.ident_at(2, "namespace") {
                self.advance();
                self.advance();
                self.advance();
                let name = self.ident()?;
                self.semi();
                return Ok(Item {
                    doc,
                    exported: true,
                    default: false,
                    kind: ItemKind::ExportAsNamespace(name),
                });
            }
            let export_list = self.punct_at(1, "*")
                || self.punct_at(1, "{")
                || (self.ident_at(1, "type") && (self.punct_at(2, "{") || self.punct_at(2, "*")));
            if export_list {
                self.advance();
                let export = self.export_decl()?;
                return Ok(Item {
                    doc,
                    exported: true,
                    default: false,
                    kind: ItemKind::Export(export),
                });
            }

            self.advance();
            exported = true;
            if self.eat_kw("default") {
                default = true;
                if !self.at_declaration_start() {
                    let path = self.entity_name()?;
                    self.semi();
                    return Ok(Item {
                        doc,
                        exported,
                        default,
                        kind: ItemKind::ExportDefault(path),
                    });
                }
            }
        }

        while self.at_kw("declare") || (self.at_kw("async") && self.ident_at(1, "function")) {
            self.advance();
        }

        let kind = self.declaration()?;
        Ok(Item {
            doc,
            exported,
            default,
            kind,
        })
    }

    fn at_declaration_start(&self) -> bool {
        ["function", "class", "abstract", "interface", "declare", "async", "enum"]
            .iter()
            .any(|kw| self.at_kw(kw))
    }

    fn declaration(&mut self) -> PResult<ItemKind> {
        if self.kind_at(0) != TokenKind::Ident {
            return Err(self.error("declaration"));
        }
        match self.text_at(0) {
            "import" => self.import_decl(),
            "module" if self.kind_at(1) == TokenKind::Str => {
                self.advance();
                let name = self.string()?;
                let body = if self.eat("{") {
                    self.items(Some("}"))?
                } else {
                    self.semi();
                    Vec::new()
                };
                Ok(ItemKind::Module { name, body })
            }
            "module" | "namespace" if self.kind_at(1) == TokenKind::Ident => {
                self.advance();
                let path = self.entity_name()?;
                self.expect("{")?;
                let body = self.items(Some("}"))?;
                Ok(ItemKind::Namespace { path, body })
            }
            "global" if self.punct_at(1, "{") => {
                self.advance();
                self.advance();
                Ok(ItemKind::Global(self.items(Some("}"))?))
            }
            "interface" => self.interface_decl(),
            "type" if self.kind_at(1) == TokenKind::Ident => self.type_alias_decl(),
            "function" => self.function_decl(),
            "abstract" if self.ident_at(1, "class") => {
                self.advance();
                self.class_decl(true)
            }
            "class" => self.class_decl(false),
            "enum" => self.enum_decl(false),
            "const" if self.ident_at(1, "enum") => {
                self.advance();
                self.enum_decl(true)
            }
            "const" | "let" | "var" => self.variable_decl(),
            _ => Err(self.error("declaration")),
        }
    }

    fn import_decl(&mut self) -> PResult<ItemKind> {
        self.expect_kw("import")?;

        if self.kind_at(0) == TokenKind::Str {
            let source = self.string()?;
            self.skip_import_attributes()?;
            self.semi();
            return Ok(ItemKind::Import(ImportDecl {
                type_only: false,
                default: None,
                namespace: None,
                named: Vec::new(),
                source,
            }));
        }

        let type_only = self.at_kw("type")
            && (self.punct_at(1, "{")
                || self.punct_at(1, "*")
                || (self.kind_at(1) == TokenKind::Ident && !self.ident_at(1, "from")));
        if type_only {
            self.advance();
        }

        let mut default = None;
        if self.kind_at(0) == TokenKind::Ident {
            let name = self.ident()?;
            if self.eat("=") {
                let target = if self.at_kw("require") && self.punct_at(1, "(") {
                    self.advance();
                    self.advance();
                    let source = self.string()?;
                    self.expect(")")?;
                    ImportTarget::Require(source)
                } else {
                    ImportTarget::Entity(self.entity_name()?)
                };
                self.semi();
                return Ok(ItemKind::ImportEquals { name, target });
            }
            default = Some(name);
            self.eat(",");
        }

        let mut namespace = None;
        let mut named = Vec::new();
        if self.eat("*") {
            self.expect_kw("as")?;
            namespace = Some(self.ident()?);
        } else if self.eat("{") {
            while !self.eat("}") {
                if self.at_eof() {
                    return Err(self.error("'}'"));
                }
                let spec_type_only = self.at_kw("type")
                    && self.kind_at(1) != TokenKind::Punct
                    && !self.ident_at(1, "as");
                if spec_type_only {
                    self.advance();
                }
                let name = self.module_export_name()?;
                let alias = if self.eat_kw("as") {
                    Some(self.ident()?)
                } else {
                    None
                };
                named.push(ImportSpecifier {
                    name,
                    alias,
                    type_only: spec_type_only,
                });
                if !self.eat(",") {
                    self.expect("}")?;
                    break;
                }
            }
        }

        self.expect_kw("from")?;
        let source = self.string()?;
        self.skip_import_attributes()?;
        self.semi();
        Ok(ItemKind::Import(ImportDecl {
            type_only,
            default,
            namespace,
            named,
            source,
        }))
    }

    fn skip_import_attributes(&mut self) -> PResult<()> {
        if (self.at_kw("with") || self.at_kw("assert")) && self.punct_at(1, "{") {
            self.advance();
            self.skip_balanced()?;
        }
        Ok(())
    }

    /// Parses everything after `export` in `export { ... }` / `export * ...`
    fn export_decl(&mut self) -> PResult<ExportDecl> {
        let type_only = self.eat_kw("type");

        if self.eat("*") {
            let alias = if self.eat_kw("as") {
                Some(self.module_export_name()?)
            } else {
                None
            };
            self.expect_kw("from")?;
            let source = self.string()?;
            self.skip_import_attributes()?;
            self.semi();
            return Ok(ExportDecl::All { alias, source });
        }

        self.expect("{")?;
        let mut specifiers = Vec::new();
        while !self.eat("}") {
            if self.at_eof() {
                return Err(self.error("'}'"));
            }
            if self.at_kw("type") && self.kind_at(1) != TokenKind::Punct && !self.ident_at(1, "as")
            {
                self.advance();
            }
            let name = self.module_export_name()?;
            let alias = if self.eat_kw("as") {
                Some(self.module_export_name()?)
            } else {
                None
            };
            specifiers.push(ExportSpecifier { name, alias });
            if !self.eat(",") {
                self.expect("}")?;
                break;
            }
        }

        let source = if self.eat_kw("from") {
            Some(self.string()?)
        } else {
            None
        };
        self.skip_import_attributes()?;
        self.semi();
        Ok(ExportDecl::Named {
            type_only,
            specifiers,
            source,
        })
    }

    fn interface_decl(&mut self) -> PResult<ItemKind> {
        self.expect_kw("interface")?;
        let name = self.ident()?;
        let type_params = self.type_params()?;
        let mut extends = Vec::new();
        if self.eat_kw("extends") {
            loop {
                extends.push(self.heritage_type()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect("{")?;
        let members = self.members()?;
        Ok(ItemKind::Interface(InterfaceDecl {
            name,
            type_params,
            extends,
            members,
        }))
    }

    fn type_alias_decl(&mut self) -> PResult<ItemKind> {
        self.expect_kw("type")?;
        let name = self.ident()?;
        let type_params = self.type_params()?;
        self.expect("=")?;
        let ty = self.type_()?;
        self.semi();
        Ok(ItemKind::TypeAlias(TypeAliasDecl {
            name,
            type_params,
            ty,
        }))
    }

    fn function_decl(&mut self) -> PResult<ItemKind> {
        self.expect_kw("function")?;
        self.eat("*");
        let name = if self.kind_at(0) == TokenKind::Ident {
            Some(self.ident()?)
        } else {
            None
        };
        let signature = self.signature(false)?;
        self.semi();
        Ok(ItemKind::Function(FunctionDecl { name, signature }))
    }

    fn class_decl(&mut self, is_abstract: bool) -> PResult<ItemKind> {
        self.expect_kw("class")?;
        let name = if self.kind_at(0) == TokenKind::Ident
            && !self.at_kw("extends")
            && !self.at_kw("implements")
        {
            Some(self.ident()?)
        } else {
            None
        };
        let type_params = self.type_params()?;
        let extends = if self.eat_kw("extends") {
            Some(self.heritage_type()?)
        } else {
            None
        };
        let mut implements = Vec::new();
        if self.eat_kw("implements") {
            loop {
                implements.push(self.heritage_type()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect("{")?;
        let members = self.members()?;
        Ok(ItemKind::Class(ClassDecl {
            name,
            is_abstract,
            type_params,
            extends,
            implements,
            members,
        }))
    }

    fn heritage_type(&mut self) -> PResult<Type> {
        let name = self.entity_name()?;
        let args = if self.at("<") {
            self.type_args()?
        } else {
            Vec::new()
        };
        Ok(Type::Reference { name, args })
    }

    fn enum_decl(&mut self, is_const: bool) -> PResult<ItemKind> {
        self.expect_kw("enum")?;
        let name = self.ident()?;
        self.expect("{")?;
        let mut members = Vec::new();
        while !self.eat("}") {
            if self.at_eof() {
                return Err(self.error("'}'"));
            }
            let doc = self.doc();
            let member_name = match self.kind_at(0) {
                TokenKind::Str => self.string()?,
                TokenKind::Number => {
                    let text = self.text_at(0).to_string();
                    self.advance();
                    text
                }
                _ => self.ident()?,
            };
            let value = if self.eat("=") {
                self.initializer(&[",", "}"])
            } else {
                None
            };
            members.push(EnumMember {
                doc,
                name: member_name,
                value,
            });
            if !self.eat(",") {
                self.expect("}")?;
                break;
            }
        }
        Ok(ItemKind::Enum(EnumDecl {
            name,
            is_const,
            members,
        }))
    }

    fn variable_decl(&mut self) -> PResult<ItemKind> {
        let kind = match self.text_at(0) {
            "const" => VarKind::Const,
            "let" => VarKind::Let,
            _ => VarKind::Var,
        };
        self.advance();

        let mut declarators = Vec::new();
        loop {
            let name = self.ident()?;
            self.eat("!");
            let ty = if self.eat(":") {
                Some(self.type_()?)
            } else {
                None
            };
            let init = if self.eat("=") {
                self.initializer(&[",", ";"])
            } else {
                None
            };
            declarators.push(Declarator { name, ty, init });
            if !self.eat(",") {
                break;
            }
        }
        self.semi();
        Ok(ItemKind::Variable(VariableDecl { kind, declarators }))
    }

    /// Literal at the cursor and how many tokens it spans
    fn literal_here(&self) -> Option<(Literal, usize)> {
        match self.kind_at(0) {
            TokenKind::Str => Some((Literal::Str(unquote(self.text_at(0))), 1)),
            TokenKind::Number => Some((Literal::Number(self.text_at(0).to_string()), 1)),
            TokenKind::BigInt => Some((Literal::BigInt(self.text_at(0).to_string()), 1)),
            TokenKind::Ident if self.at_kw("true") => Some((Literal::Bool(true), 1)),
            TokenKind::Ident if self.at_kw("false") => Some((Literal::Bool(false), 1)),
            TokenKind::Punct if self.at("-") => match self.kind_at(1) {
                TokenKind::Number => Some((Literal::Number(format!("-{}", self.text_at(1))), 2)),
                TokenKind::BigInt => Some((Literal::BigInt(format!("-{}", self.text_at(1))), 2)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Consume an initializer expression up to one of `stops`, keeping it if
    /// it is a single literal
    fn initializer(&mut self, stops: &[&str]) -> Option<Literal> {
        if let Some((literal, len)) = self.literal_here() {
            let ends = self.kind_at(len) == TokenKind::Eof
                || stops.iter().any(|stop| self.punct_at(len, stop));
            if ends {
                for _ in 0..len {
                    self.advance();
                }
                return Some(literal);
            }
        }

        let mut depth = 0usize;
        while !self.at_eof() {
            if self.kind_at(0) == TokenKind::Punct {
                let text = self.text_at(0);
                if depth == 0 && stops.contains(&text) {
                    break;
                }
                match text {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    }
                    _ => {}
                }
            }
            self.advance();
        }
        None
    }

    // ---- members -------------------------------------------------------

    /// Members up to and including the closing `}`
    fn members(&mut self) -> PResult<Vec<Member>> {
        let mut members = Vec::new();
        loop {
            while self.eat(";") || self.eat(",") {}
            if self.eat("}") {
                return Ok(members);
            }
            if self.at_eof() {
                return Err(self.error("'}'"));
            }
            members.push(self.member()?);
        }
    }

    fn starts_member_name(&self, n: usize) -> bool {
        match self.kind_at(n) {
            TokenKind::Ident | TokenKind::Str | TokenKind::Number => true,
            TokenKind::Punct => self.text_at(n) == "[",
            _ => false,
        }
    }

    fn member(&mut self) -> PResult<Member> {
        let doc = self.doc();
        let mut modifiers = Modifiers::default();
        while self.kind_at(0) == TokenKind::Ident && self.starts_member_name(1) {
            match self.text_at(0) {
                "public" => modifiers.accessibility = Accessibility::Public,
                "protected" => modifiers.accessibility = Accessibility::Protected,
                "private" => modifiers.accessibility = Accessibility::Private,
                "static" => modifiers.is_static = true,
                "readonly" => modifiers.readonly = true,
                "abstract" => modifiers.is_abstract = true,
                "declare" | "override" | "accessor" | "async" => {}
                _ => break,
            }
            self.advance();
        }
        let kind = self.member_kind()?;
        Ok(Member {
            doc,
            modifiers,
            kind,
        })
    }

    fn member_kind(&mut self) -> PResult<MemberKind> {
        if self.at("(") || self.at("<") {
            return Ok(MemberKind::Call(self.signature(false)?));
        }
        if self.at_kw("new") && (self.punct_at(1, "(") || self.punct_at(1, "<")) {
            self.advance();
            return Ok(MemberKind::Construct(self.signature(false)?));
        }
        if self.at_kw("constructor") && self.punct_at(1, "(") {
            self.advance();
            let signature = self.signature(false)?;
            return Ok(MemberKind::Constructor(signature.params));
        }
        if (self.at_kw("get") || self.at_kw("set")) && self.starts_member_name(1) {
            let is_getter = self.at_kw("get");
            self.advance();
            let name = self.prop_name()?;
            let signature = self.signature(false)?;
            return Ok(if is_getter {
                MemberKind::Getter {
                    name,
                    ty: signature.ret.map(|ty| *ty),
                }
            } else {
                MemberKind::Setter {
                    name,
                    ty: signature.params.into_iter().next().and_then(|p| p.ty),
                }
            });
        }
        if self.at("[") && self.kind_at(1) == TokenKind::Ident && self.punct_at(2, ":") {
            self.advance();
            let param = self.ident()?;
            self.expect(":")?;
            let key = self.type_()?;
            self.expect("]")?;
            let value = if self.eat(":") {
                self.type_()?
            } else {
                Type::Keyword(Keyword::Any)
            };
            return Ok(MemberKind::Index { param, key, value });
        }

        let name = self.prop_name()?;
        let optional = self.eat("?");
        self.eat("!");
        if self.at("(") || self.at("<") {
            let signature = self.signature(false)?;
            return Ok(MemberKind::Method {
                name,
                optional,
                signature,
            });
        }
        let mut ty = if self.eat(":") {
            Some(self.type_()?)
        } else {
            None
        };
        if self.eat("=") {
            let init = self.initializer(&[";", ",", "}"]);
            if ty.is_none() {
                ty = init.map(Type::Literal);
            }
        }
        Ok(MemberKind::Property { name, optional, ty })
    }

    fn prop_name(&mut self) -> PResult<PropName> {
        match self.kind_at(0) {
            TokenKind::Ident => Ok(PropName::Ident(self.ident()?)),
            TokenKind::Str => Ok(PropName::Str(self.string()?)),
            TokenKind::Number => {
                let text = self.text_at(0).to_string();
                self.advance();
                Ok(PropName::Number(text))
            }
            TokenKind::Punct if self.at("[") => {
                self.advance();
                let name = match self.kind_at(0) {
                    TokenKind::Str => PropName::Str(self.string()?),
                    TokenKind::Number => {
                        let text = self.text_at(0).to_string();
                        self.advance();
                        PropName::Number(text)
                    }
                    _ => PropName::Computed(self.entity_name()?),
                };
                self.expect("]")?;
                Ok(name)
            }
            _ => Err(self.error("property name")),
        }
    }

    // ---- signatures ----------------------------------------------------

    /// `<T>(params): Ret`, or `<T>(params) => Ret` when `arrow` is set
    fn signature(&mut self, arrow: bool) -> PResult<Signature> {
        let type_params = self.type_params()?;
        self.expect("(")?;
        let params = self.params()?;
        let ret = if arrow {
            self.expect("=>")?;
            Some(Box::new(self.return_type()?))
        } else if self.eat(":") {
            Some(Box::new(self.return_type()?))
        } else {
            None
        };
        Ok(Signature {
            type_params,
            params,
            ret,
        })
    }

    /// Parameters up to and including the closing `)`
    fn params(&mut self) -> PResult<Vec<Param>> {
        let mut params = Vec::new();
        loop {
            if self.eat(")") {
                break;
            }
            if self.at_eof() {
                return Err(self.error("')'"));
            }
            while self.kind_at(0) == TokenKind::Ident
                && matches!(
                    self.text_at(0),
                    "public" | "private" | "protected" | "readonly" | "override"
                )
                && (self.kind_at(1) == TokenKind::Ident
                    || self.punct_at(1, "{")
                    || self.punct_at(1, "["))
            {
                self.advance();
            }
            let rest = self.eat("...");
            let name = if self.at("{") || self.at("[") {
                self.skip_balanced()?;
                None
            } else {
                Some(self.ident()?)
            };
            let optional = self.eat("?");
            let ty = if self.eat(":") {
                Some(self.type_()?)
            } else {
                None
            };
            if self.eat("=") {
                self.initializer(&[",", ")"]);
            }
            params.push(Param {
                name,
                optional,
                rest,
                ty,
            });
            if !self.eat(",") {
                self.expect(")")?;
                break;
            }
        }
        Ok(params)
    }

    fn type_params(&mut self) -> PResult<Vec<TypeParam>> {
        let mut params = Vec::new();
        if !self.eat("<") {
            return Ok(params);
        }
        loop {
            if self.eat(">") {
                break;
            }
            while (self.at_kw("in") || self.at_kw("out") || self.at_kw("const"))
                && self.kind_at(1) == TokenKind::Ident
            {
                self.advance();
            }
            let name = self.ident()?;
            let constraint = if self.eat_kw("extends") {
                Some(self.type_()?)
            } else {
                None
            };
            let default = if self.eat("=") {
                Some(self.type_()?)
            } else {
                None
            };
            params.push(TypeParam {
                name,
                constraint,
                default,
            });
            if !self.eat(",") {
                self.expect(">")?;
                break;
            }
        }
        Ok(params)
    }

    fn type_args(&mut self) -> PResult<Vec<Type>> {
        self.expect("<")?;
        let mut args = Vec::new();
        loop {
            if self.eat(">") {
                break;
            }
            args.push(self.type_()?);
            if !self.eat(",") {
                self.expect(">")?;
                break;
            }
        }
        Ok(args)
    }

    fn return_type(&mut self) -> PResult<Type> {
        if self.at_kw("asserts")
            && self.kind_at(1) == TokenKind::Ident
            && !self.tok(1).newline_before
        {
            self.advance();
            let param = self.ident()?;
            let ty = if self.eat_kw("is") {
                Some(Box::new(self.type_()?))
            } else {
                None
            };
            return Ok(Type::Predicate {
                asserts: true,
                param,
                ty,
            });
        }
        if self.kind_at(0) == TokenKind::Ident
            && self.ident_at(1, "is")
            && !self.tok(1).newline_before
        {
            let param = self.ident()?;
            self.advance();
            let ty = self.type_()?;
            return Ok(Type::Predicate {
                asserts: false,
                param,
                ty: Some(Box::new(ty)),
            });
        }
        self.type_()
    }

    // ---- types ---------------------------------------------------------

    fn type_(&mut self) -> PResult<Type> {
        self.type_inner(true)
    }

    fn type_inner(&mut self, allow_conditional: bool) -> PResult<Type> {
        if self.is_function_type_start() {
            return Ok(Type::Function(self.signature(true)?));
        }
        if self.at_kw("new") || (self.at_kw("abstract") && self.ident_at(1, "new")) {
            let is_abstract = self.eat_kw("abstract");
            self.advance();
            return Ok(Type::Constructor {
                is_abstract,
                signature: self.signature(true)?,
            });
        }

        let check = self.union_type()?;
        if allow_conditional && self.at_kw("extends") && !self.tok(0).newline_before {
            self.advance();
            let extends = self.type_inner(false)?;
            self.expect("?")?;
            let then = self.type_()?;
            self.expect(":")?;
            let otherwise = self.type_()?;
            return Ok(Type::Conditional {
                check: Box::new(check),
                extends: Box::new(extends),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }
        Ok(check)
    }

    fn is_function_type_start(&self) -> bool {
        if self.at("<") {
            return true;
        }
        if !self.at("(") {
            return false;
        }
        if self.punct_at(1, ")") || self.punct_at(1, "...") {
            return true;
        }
        let after_param = if self.punct_at(1, "{") || self.punct_at(1, "[") {
            match self.balanced_end(1) {
                Some(end) => end + 1,
                None => return false,
            }
        } else if self.kind_at(1) == TokenKind::Ident {
            2
        } else {
            return false;
        };
        [":", ",", "?", "="]
            .iter()
            .any(|p| self.punct_at(after_param, p))
            || (self.punct_at(after_param, ")") && self.punct_at(after_param + 1, "=>"))
    }

    fn union_type(&mut self) -> PResult<Type> {
        self.eat("|");
        let mut types = vec![self.intersection_type()?];
        while self.eat("|") {
            types.push(self.intersection_type()?);
        }
        Ok(if types.len() == 1 {
            types.remove(0)
        } else {
            Type::Union(types)
        })
    }

    fn intersection_type(&mut self) -> PResult<Type> {
        self.eat("&");
        let mut types = vec![self.operator_type()?];
        while self.eat("&") {
            types.push(self.operator_type()?);
        }
        Ok(if types.len() == 1 {
            types.remove(0)
        } else {
            Type::Intersection(types)
        })
    }

    fn operator_type(&mut self) -> PResult<Type> {
        let op = if self.at_kw("keyof") {
            Some(TypeOperator::Keyof)
        } else if self.at_kw("unique") && self.kind_at(1) == TokenKind::Ident {
            Some(TypeOperator::Unique)
        } else if self.at_kw("readonly") {
            Some(TypeOperator::Readonly)
        } else {
            None
        };
        if let Some(op) = op {
            self.advance();
            let ty = self.operator_type()?;
            return Ok(Type::Operator {
                op,
                ty: Box::new(ty),
            });
        }

        if self.at_kw("infer") && self.kind_at(1) == TokenKind::Ident {
            self.advance();
            let name = self.ident()?;
            let save = self.pos;
            let constraint = if self.eat_kw("extends") {
                match self.type_inner(false) {
                    Ok(constraint) if !self.at("?") => Some(Box::new(constraint)),
                    _ => {
                        self.pos = save;
                        None
                    }
                }
            } else {
                None
            };
            return Ok(Type::Infer { name, constraint });
        }

        self.postfix_type()
    }

    fn postfix_type(&mut self) -> PResult<Type> {
        let mut ty = self.primary_type()?;
        while self.at("[") && !self.tok(0).newline_before {
            self.advance();
            if self.eat("]") {
                ty = Type::Array(Box::new(ty));
            } else {
                let index = self.type_()?;
                self.expect("]")?;
                ty = Type::IndexedAccess {
                    object: Box::new(ty),
                    index: Box::new(index),
                };
            }
        }
        Ok(ty)
    }

    fn primary_type(&mut self) -> PResult<Type> {
        match self.kind_at(0) {
            TokenKind::Template => {
                self.advance();
                Ok(Type::Template)
            }
            TokenKind::Str | TokenKind::Number | TokenKind::BigInt => self.literal_type(),
            TokenKind::Punct => match self.text_at(0) {
                "(" => {
                    self.advance();
                    let inner = self.type_()?;
                    self.expect(")")?;
                    Ok(Type::Paren(Box::new(inner)))
                }
                "{" if self.is_mapped_type_start() => self.mapped_type(),
                "{" => {
                    self.advance();
                    Ok(Type::Object(self.members()?))
                }
                "[" => self.tuple_type(),
                "-" => self.literal_type(),
                _ => Err(self.error("type")),
            },
            TokenKind::Ident => match self.text_at(0) {
                "true" | "false" => self.literal_type(),
                "typeof" => {
                    self.advance();
                    if self.at_kw("import") {
                        return self.import_type(true);
                    }
                    let name = self.entity_name()?;
                    let args = if self.at("<") && !self.tok(0).newline_before {
                        self.type_args()?
                    } else {
                        Vec::new()
                    };
                    Ok(Type::Query { name, args })
                }
                "import" if self.punct_at(1, "(") => self.import_type(false),
                text => {
                    if let Some(keyword) = Keyword::from_ident(text) {
                        if !self.punct_at(1, ".") {
                            self.advance();
                            return Ok(Type::Keyword(keyword));
                        }
                    }
                    let name = self.entity_name()?;
                    let args = if self.at("<") {
                        self.type_args()?
                    } else {
                        Vec::new()
                    };
                    Ok(Type::Reference { name, args })
                }
            },
            _ => Err(self.error("type")),
        }
    }

    fn literal_type(&mut self) -> PResult<Type> {
        match self.literal_here() {
            Some((literal, len)) => {
                for _ in 0..len {
                    self.advance();
                }
                Ok(Type::Literal(literal))
            }
            None => Err(self.error("literal type")),
        }
    }

    fn import_type(&mut self, is_typeof: bool) -> PResult<Type> {
        self.expect_kw("import")?;
        self.expect("(")?;
        let module = self.string()?;
        self.expect(")")?;
        let mut qualifier = Vec::new();
        while self.eat(".") {
            qualifier.push(self.ident()?);
        }
        let args = if self.at("<") {
            self.type_args()?
        } else {
            Vec::new()
        };
        Ok(Type::Import {
            is_typeof,
            module,
            qualifier,
            args,
        })
    }

    fn tuple_type(&mut self) -> PResult<Type> {
        self.expect("[")?;
        let mut elements = Vec::new();
        loop {
            if self.eat("]") {
                break;
            }
            let rest = self.eat("...");
            let labelled = self.kind_at(0) == TokenKind::Ident
                && (self.punct_at(1, ":") || (self.punct_at(1, "?") && self.punct_at(2, ":")));
            let (label, label_optional) = if labelled {
                let label = self.ident()?;
                let optional = self.eat("?");
                self.expect(":")?;
                (Some(label), optional)
            } else {
                (None, false)
            };
            let ty = self.type_()?;
            let optional = if label.is_some() {
                label_optional
            } else {
                self.eat("?")
            };
            elements.push(TupleElement {
                label,
                optional,
                rest,
                ty,
            });
            if !self.eat(",") {
                self.expect("]")?;
                break;
            }
        }
        Ok(Type::Tuple(elements))
    }

    fn is_mapped_type_start(&self) -> bool {
        let mut n = 1;
        if self.punct_at(n, "+") || self.punct_at(n, "-") {
            n += 1;
        }
        if self.ident_at(n, "readonly") {
            n += 1;
        }
        self.punct_at(n, "[") && self.kind_at(n + 1) == TokenKind::Ident && self.ident_at(n + 2, "in")
    }

    fn mapped_modifier(&mut self, keyword: Option<&str>) -> PResult<Option<MappedModifier>> {
        let modifier = if self.eat("+") {
            Some(MappedModifier::Add)
        } else if self.eat("-") {
            Some(MappedModifier::Remove)
        } else {
            None
        };
        let present = match keyword {
            Some(kw) => self.eat_kw(kw),
            None => self.eat("?"),
        };
        match (modifier, present) {
            (Some(modifier), true) => Ok(Some(modifier)),
            (None, true) => Ok(Some(MappedModifier::Add)),
            (None, false) => Ok(None),
            (Some(_), false) => Err(self.error(keyword.unwrap_or("'?'"))),
        }
    }

    fn mapped_type(&mut self) -> PResult<Type> {
        self.expect("{")?;
        let readonly = self.mapped_modifier(Some("readonly"))?;
        self.expect("[")?;
        let param = self.ident()?;
        self.expect_kw("in")?;
        let constraint = self.type_()?;
        if self.eat_kw("as") {
            self.type_()?;
        }
        self.expect("]")?;
        let optional = self.mapped_modifier(None)?;
        let value = if self.eat(":") {
            Some(Box::new(self.type_()?))
        } else {
            None
        };
        self.eat(";");
        self.eat(",");
        self.expect("}")?;
        Ok(Type::Mapped {
            readonly,
            param,
            constraint: Box::new(constraint),
            optional,
            value,
        })
    }
}
